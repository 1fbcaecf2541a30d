//! REST API client module for the Smart Retail POS backend.
//!
//! This module provides the `ApiClient` for credential submission and
//! product listing, plus the request interceptor chain every request
//! passes through before it is sent.
//!
//! The backend uses JWT bearer token authentication; the token is obtained
//! from the login endpoint and attached by the `BearerAuth` interceptor.

pub mod client;
pub mod error;
pub mod interceptor;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use interceptor::{BearerAuth, InterceptorChain, RequestInterceptor};
