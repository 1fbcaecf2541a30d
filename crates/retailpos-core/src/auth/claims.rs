//! Decoding of the payload segment of a compact JWT.
//!
//! Only the payload is read. The signature is never checked on the client;
//! claims are used for display (current username, role) and nothing else.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Base64URL with optional padding, as JWTs are issued
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Standard alphabet fallback for tokens minted with plain base64
const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Number of dot-separated segments in a compact token
const TOKEN_SEGMENTS: usize = 3;

#[derive(Error, Debug)]
pub enum ClaimsError {
    #[error("Expected 3 token segments, found {0}")]
    SegmentCount(usize),

    #[error("Payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Payload is not a JSON object")]
    NotAnObject,
}

/// Claim names mapped to their values, as carried in a token payload.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Claims(Map<String, Value>);

impl Claims {
    /// Decode the payload segment of `token`.
    pub fn from_token(token: &str) -> Result<Self, ClaimsError> {
        let segments: Vec<&str> = token.split('.').collect();
        if segments.len() != TOKEN_SEGMENTS {
            return Err(ClaimsError::SegmentCount(segments.len()));
        }

        let payload = decode_segment(segments[1])?;
        match serde_json::from_slice(&payload)? {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(ClaimsError::NotAnObject),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// The backend's `user_id` claim. Numeric ids are rendered as strings.
    pub fn user_id(&self) -> Option<String> {
        match self.0.get("user_id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn username(&self) -> Option<&str> {
        self.get_str("username")
    }

    pub fn role(&self) -> Option<&str> {
        self.get_str("role")
    }

    pub fn subject(&self) -> Option<&str> {
        self.get_str("sub")
    }

    /// `exp` as seconds since the epoch
    pub fn expires_at(&self) -> Option<i64> {
        self.0.get("exp").and_then(Value::as_i64)
    }

    /// `iat` as seconds since the epoch
    pub fn issued_at(&self) -> Option<i64> {
        self.0.get("iat").and_then(Value::as_i64)
    }

    /// Best available name for display: username, then subject, then user id
    pub fn display_name(&self) -> Option<String> {
        self.username()
            .or_else(|| self.subject())
            .map(str::to_string)
            .or_else(|| self.user_id())
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_inner(self) -> Map<String, Value> {
        self.0
    }
}

impl From<Map<String, Value>> for Claims {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

fn decode_segment(segment: &str) -> Result<Vec<u8>, base64::DecodeError> {
    URL_SAFE_LENIENT
        .decode(segment)
        .or_else(|url_err| STANDARD_LENIENT.decode(segment).map_err(|_| url_err))
}
