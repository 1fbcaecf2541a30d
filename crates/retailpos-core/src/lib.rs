//! Client library for the Smart Retail POS backend.
//!
//! The heart of the crate is [`auth::TokenStore`], which keeps the single
//! bearer token of the logged in user in an injectable key/value storage and
//! reads display claims out of it. [`api::ApiClient`] sends requests through
//! an interceptor chain; [`auth::Session`] wires the two together so every
//! request carries the stored token.

pub mod api;
pub mod auth;
pub mod config;
pub mod models;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthError, Claims, Session, TokenStore};
pub use config::{Config, StorageBackend};
