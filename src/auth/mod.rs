//! The authentication gate.
//!
//! Forwarding routes take an [`ApiToken`] argument. Extraction fails with
//! [`ApiError::MissingCredential`] before any body parsing or upstream call
//! when the `x-apify-token` header is missing or blank. The token itself is
//! never checked here; the upstream decides whether it is valid.

use std::fmt;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::consts::TOKEN_HEADER;
use crate::server::error::ApiError;

/// A caller-supplied Apify API token. Lives for one request only.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiToken(String);

impl ApiToken {
    /// Read the token header. Missing, blank and non-UTF-8 values yield `None`.
    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        let raw = headers.get(TOKEN_HEADER)?.to_str().ok()?.trim();
        if raw.is_empty() {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiToken(<redacted>)")
    }
}

impl<S> FromRequestParts<S> for ApiToken
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Self::from_headers(&parts.headers).ok_or(ApiError::MissingCredential)
    }
}
