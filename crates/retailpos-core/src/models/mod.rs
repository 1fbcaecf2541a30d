//! Wire types for the Smart Retail POS backend.
//!
//! - `LoginRequest`, `LoginResponse`, `RegisterRequest`, `RegisterResponse`:
//!   credential submission
//! - `Product`: product listing

pub mod auth;
pub mod product;

pub use auth::{LoginRequest, LoginResponse, LoginUser, RegisterRequest, RegisterResponse};
pub use product::Product;
