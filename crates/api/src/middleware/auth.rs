//! Bearer token gate for the customer routes.
//!
//! Requests must carry `Authorization: Bearer <token>` where `<token>` equals
//! the configured API token.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header::AUTHORIZATION, request::Parts},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use tracing::warn;

use crate::error::{ErrorBody, error_response};
use crate::state::AppState;

/// Extractor that requires a valid API token.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_: RequireApiToken) -> impl IntoResponse {
///     "secret stuff"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireApiToken;

/// Error returned when the API token check fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenRejection {
    /// No `Authorization` header.
    Missing,
    /// Header present but not `Bearer <token>`.
    InvalidFormat,
    /// Well-formed token that does not match.
    Invalid,
}

impl TokenRejection {
    const fn reason(self) -> &'static str {
        match self {
            Self::Missing => "missing_token",
            Self::InvalidFormat => "invalid_token_format",
            Self::Invalid => "invalid_token",
        }
    }

    const fn message(self) -> &'static str {
        match self {
            Self::Missing => "Authentication token not provided, use Authorization: Bearer <token>",
            Self::InvalidFormat => "Invalid token format, use Authorization: Bearer <token>",
            Self::Invalid => "The provided token is not valid",
        }
    }
}

impl IntoResponse for TokenRejection {
    fn into_response(self) -> Response {
        let status = match self {
            Self::Missing | Self::InvalidFormat => StatusCode::UNAUTHORIZED,
            Self::Invalid => StatusCode::FORBIDDEN,
        };
        error_response(
            status,
            ErrorBody::new(self.reason(), self.message()),
            format!("token rejected: {}", self.reason()),
        )
    }
}

impl FromRequestParts<AppState> for RequireApiToken {
    type Rejection = TokenRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(TokenRejection::Missing)?
            .to_str()
            .map_err(|_| TokenRejection::InvalidFormat)?;

        let token = bearer_token(header).ok_or(TokenRejection::InvalidFormat)?;

        if !constant_time_compare(token, state.config().api_token.expose_secret()) {
            warn!(path = %parts.uri.path(), "Rejected request with invalid API token");
            return Err(TokenRejection::Invalid);
        }

        Ok(Self)
    }
}

/// Extract `<token>` from `Bearer <token>`.
///
/// Exactly one space-separated token after the scheme is accepted.
fn bearer_token(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) => Some(token),
        _ => None,
    }
}

/// Constant-time string comparison to prevent timing attacks.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}
