use tracing::{trace, warn};

use super::claims::Claims;
use super::error::AuthError;
use super::storage::{KeyValueStorage, StorageError};

/// Storage key the bearer token is kept under
pub const TOKEN_KEY: &str = "jwt";

/// Holds the single bearer token for the current user.
///
/// The store is either anonymous (no token) or authenticated (a token is
/// stored). Nothing here checks expiry or signature; the server decides
/// whether a token is still good.
pub struct TokenStore {
    storage: Box<dyn KeyValueStorage>,
}

impl TokenStore {
    pub fn new(storage: impl KeyValueStorage + 'static) -> Self {
        Self {
            storage: Box::new(storage),
        }
    }

    pub fn from_boxed(storage: Box<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Get the stored token, if any
    pub fn token(&self) -> Option<String> {
        match self.storage.get(TOKEN_KEY) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        }
    }

    /// Check whether a token is stored
    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Like [`is_authenticated`](Self::is_authenticated), for callers that
    /// bail out to a login prompt
    pub fn ensure_authenticated(&self) -> Result<(), AuthError> {
        if self.is_authenticated() {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Store `token`, replacing any previous one. The token is not inspected.
    pub fn store(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(TOKEN_KEY, token)
    }

    /// Forget the stored token. Clearing an empty store does nothing.
    pub fn clear(&self) -> Result<(), StorageError> {
        self.storage.remove(TOKEN_KEY)
    }

    /// Claims from the stored token's payload.
    ///
    /// Returns None when there is no token or the token can't be decoded.
    pub fn current_claims(&self) -> Option<Claims> {
        let token = self.token()?;
        match Claims::from_token(&token) {
            Ok(claims) => Some(claims),
            Err(e) => {
                trace!(reason = %e, "Stored token has no readable claims");
                None
            }
        }
    }

    /// `Authorization` header value for the stored token
    pub fn authorization_header_value(&self) -> Option<String> {
        self.token().map(|token| format!("Bearer {}", token))
    }
}
