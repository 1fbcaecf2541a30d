use std::sync::Arc;

use tracing::{info, warn};

use crate::api::{ApiClient, ApiError, BearerAuth};
use crate::models::{LoginResponse, Product, RegisterRequest, RegisterResponse};

use super::claims::Claims;
use super::error::AuthError;
use super::token_store::TokenStore;

/// Login, registration and logout on top of the API client and token store.
pub struct Session {
    api: ApiClient,
    tokens: Arc<TokenStore>,
}

impl Session {
    /// Attaches a [`BearerAuth`] interceptor for `tokens` to `api`.
    pub fn new(mut api: ApiClient, tokens: Arc<TokenStore>) -> Self {
        api.attach(BearerAuth::new(Arc::clone(&tokens)));
        Self { api, tokens }
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Submit credentials and store the returned token.
    ///
    /// A response without a token is a rejected login; the stored token, if
    /// any, is left as it was.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, AuthError> {
        let response = self.api.login(username, password).await?;

        match response.token.as_deref() {
            Some(token) if !token.is_empty() => {
                self.tokens.store(token)?;
                info!(username, "Logged in");
                Ok(response)
            }
            _ => {
                warn!(username, "Login response carried no token");
                Err(AuthError::LoginRejected(
                    response
                        .message
                        .unwrap_or_else(|| "no token in response".to_string()),
                ))
            }
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, AuthError> {
        let response = self.api.register(request).await?;
        info!(username = %request.username, employee_id = ?response.employee_id, "Registered account");
        Ok(response)
    }

    /// Forget the stored token. Nothing is sent to the server.
    pub fn logout(&self) -> Result<(), AuthError> {
        self.tokens.clear()?;
        info!("Logged out");
        Ok(())
    }

    /// Claims of the logged in user, for display
    pub fn current_user(&self) -> Option<Claims> {
        self.tokens.current_claims()
    }

    /// Product listing. Sent with or without a token; the server decides.
    pub async fn products(&self) -> Result<Vec<Product>, ApiError> {
        self.api.fetch_products().await
    }
}
