//! API client for the Smart Retail POS backend.
//!
//! Every request goes through the client's [`InterceptorChain`] after it is
//! built and before it is sent; that is where the bearer token gets attached.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::models::{LoginRequest, LoginResponse, Product, RegisterRequest, RegisterResponse};

use super::interceptor::{InterceptorChain, RequestInterceptor};
use super::ApiError;

/// Backend address used when nothing is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

const LOGIN_PATH: &str = "/api/login";
const REGISTER_PATH: &str = "/api/register";
const PRODUCTS_PATH: &str = "/api/products/";

/// API client for the POS backend.
/// Clone is cheap - reqwest::Client and the interceptors are reference counted.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    interceptors: InterceptorChain,
}

impl ApiClient {
    /// Create a new API client with no interceptors
    pub fn new(base_url: impl Into<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self::from_client(client, base_url))
    }

    /// Wrap an already configured reqwest client
    pub fn from_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            interceptors: InterceptorChain::new(),
        }
    }

    /// Register a hook to run before every request
    pub fn attach(&mut self, interceptor: impl RequestInterceptor + 'static) -> &mut Self {
        self.interceptors.attach(interceptor);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Submit username and password. The caller decides what to do with the token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.url(LOGIN_PATH)).json(&body);
        self.send_json(request).await
    }

    /// Create a new employee account
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let builder = self.client.post(self.url(REGISTER_PATH)).json(request);
        self.send_json(builder).await
    }

    /// List all products that aren't deleted
    pub async fn fetch_products(&self) -> Result<Vec<Product>, ApiError> {
        let request = self.client.get(self.url(PRODUCTS_PATH));
        let products: Vec<Product> = self.send_json(request).await?;
        debug!(count = products.len(), "Fetched products");
        Ok(products)
    }

    /// Build the request, run the interceptors over it, then send it
    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let mut request = builder.build()?;
        self.interceptors.apply(&mut request);

        debug!(method = %request.method(), url = %request.url(), "Sending request");
        let response = self.client.execute(request).await?;
        Self::check_response(response).await
    }

    async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let response = self.send(builder).await?;
        let url = response.url().to_string();
        let text = response.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }
}
