//! Authentication module for managing the session token.
//!
//! This module provides:
//! - `TokenStore`: the single stored bearer token and its claims
//! - `KeyValueStorage`: the storage capability the token store is built on,
//!   with memory, file and OS keychain backends
//! - `Session`: login, register and logout flows over the API client
//!
//! Tokens are never refreshed or expired on the client.

pub mod claims;
pub mod error;
pub mod session;
pub mod storage;
pub mod token_store;

pub use claims::{Claims, ClaimsError};
pub use error::AuthError;
pub use session::Session;
pub use storage::{FileStorage, KeyValueStorage, KeyringStorage, MemoryStorage, StorageError};
pub use token_store::{TokenStore, TOKEN_KEY};
