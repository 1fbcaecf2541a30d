//! Hooks run against every outgoing request before it is sent.

use std::sync::Arc;

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use tracing::{trace, warn};

use crate::auth::TokenStore;

/// Called with each request just before dispatch. The request carries the
/// method, URL, body and a mutable header map.
pub trait RequestInterceptor: Send + Sync {
    fn before_request(&self, request: &mut Request);
}

impl<F> RequestInterceptor for F
where
    F: Fn(&mut Request) + Send + Sync,
{
    fn before_request(&self, request: &mut Request) {
        self(request)
    }
}

/// Ordered list of interceptors, applied in registration order.
#[derive(Clone, Default)]
pub struct InterceptorChain {
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl InterceptorChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an interceptor at the end of the chain
    pub fn attach(&mut self, interceptor: impl RequestInterceptor + 'static) -> &mut Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    pub fn apply(&self, request: &mut Request) {
        trace!(method = %request.method(), url = %request.url(), hooks = self.len(), "Running request interceptors");
        for interceptor in &self.interceptors {
            interceptor.before_request(request);
        }
    }
}

/// Adds `Authorization: Bearer <token>` when a token is stored.
pub struct BearerAuth {
    tokens: Arc<TokenStore>,
}

impl BearerAuth {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        Self { tokens }
    }
}

impl RequestInterceptor for BearerAuth {
    fn before_request(&self, request: &mut Request) {
        let Some(value) = self.tokens.authorization_header_value() else {
            return;
        };
        match HeaderValue::from_str(&value) {
            Ok(mut header) => {
                header.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, header);
            }
            Err(e) => {
                warn!(error = %e, url = %request.url(), "Stored token is not a valid header value, sending without it");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use reqwest::header::HeaderName;
    use reqwest::Client;

    fn request() -> Request {
        Client::new()
            .get("http://localhost:8080/api/products/")
            .build()
            .unwrap()
    }

    fn tokens() -> Arc<TokenStore> {
        Arc::new(TokenStore::new(MemoryStorage::new()))
    }

    #[test]
    fn test_bearer_added_when_token_stored() {
        let tokens = tokens();
        tokens.store("abc").unwrap();

        let mut req = request();
        BearerAuth::new(Arc::clone(&tokens)).before_request(&mut req);
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer abc");
    }

    #[test]
    fn test_no_header_when_anonymous() {
        let mut req = request();
        BearerAuth::new(tokens()).before_request(&mut req);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_header_follows_store_changes() {
        let tokens = tokens();
        let mut chain = InterceptorChain::new();
        chain.attach(BearerAuth::new(Arc::clone(&tokens)));

        tokens.store("first").unwrap();
        let mut req = request();
        chain.apply(&mut req);
        assert_eq!(req.headers().get(AUTHORIZATION).unwrap(), "Bearer first");

        tokens.clear().unwrap();
        let mut req = request();
        chain.apply(&mut req);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_invalid_header_token_is_skipped() {
        let tokens = tokens();
        tokens.store("bad\ntoken").unwrap();

        let mut req = request();
        BearerAuth::new(tokens).before_request(&mut req);
        assert!(req.headers().get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_chain_runs_in_registration_order() {
        let trace = HeaderName::from_static("x-trace");
        let mut chain = InterceptorChain::new();
        chain
            .attach(|req: &mut Request| {
                req.headers_mut().insert("x-trace", HeaderValue::from_static("first"));
            })
            .attach(|req: &mut Request| {
                let seen = req.headers().get("x-trace").cloned();
                assert_eq!(seen.as_ref().map(|v| v.as_bytes()), Some(&b"first"[..]));
                req.headers_mut().insert("x-trace", HeaderValue::from_static("second"));
            });
        assert_eq!(chain.len(), 2);

        let mut req = request();
        chain.apply(&mut req);
        assert_eq!(req.headers().get(&trace).unwrap(), "second");
    }
}
