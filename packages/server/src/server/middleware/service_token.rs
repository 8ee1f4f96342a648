use axum::{
    http::header::AUTHORIZATION,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use tracing::warn;

use crate::server::error::ApiError;

/// Guard for the worker callback routes.
///
/// The generation worker sends `Authorization: Bearer <accept token>`; that
/// token is separate from user JWTs. Anything else gets 401.
pub async fn require_service_token(
    accept_token: Arc<str>,
    request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let presented = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim);

    match presented {
        Some(token) if tokens_match(token, &accept_token) => next.run(request).await,
        Some(_) => {
            warn!(path = %request.uri().path(), "Rejected worker callback with wrong token");
            ApiError::unauthorized("Invalid service token").into_response()
        }
        None => ApiError::unauthorized("Service token required").into_response(),
    }
}

/// Compare without exiting at the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    let (a, b) = (presented.as_bytes(), expected.as_bytes());
    if a.is_empty() || a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_token() {
        assert!(tokens_match("worker-secret", "worker-secret"));
    }

    #[test]
    fn mismatched_tokens() {
        assert!(!tokens_match("worker-secreT", "worker-secret"));
        assert!(!tokens_match("worker-secret-2", "worker-secret"));
        assert!(!tokens_match("worker", "worker-secret"));
    }

    #[test]
    fn empty_token_never_matches() {
        assert!(!tokens_match("", ""));
        assert!(!tokens_match("", "worker-secret"));
    }
}
