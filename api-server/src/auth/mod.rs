//! API key authentication for `/api` routes

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use sha2::{Digest, Sha256};
use tracing::warn;

use crate::routes::ErrorResponse;
use crate::state::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Hex SHA-256 digest of an API key; keys are only ever compared this way
pub fn digest_api_key(key: &str) -> String {
    hex::encode(Sha256::digest(key.as_bytes()))
}

fn extract_api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

/// Check a request's headers against the configured key digest
pub fn is_authorized(expected_digest: Option<&str>, headers: &HeaderMap) -> bool {
    match expected_digest {
        None => true,
        Some(expected) => {
            extract_api_key(headers).is_some_and(|key| digest_api_key(key) == expected)
        }
    }
}

/// Middleware rejecting requests without a matching `x-api-key`
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    if is_authorized(state.api_key_digest(), request.headers()) {
        return next.run(request).await;
    }

    warn!(
        "Rejected {} {}: invalid or missing API key",
        request.method(),
        request.uri().path()
    );
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: "Unauthorized: invalid or missing API key".to_string(),
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_open_when_no_key_configured() {
        assert!(is_authorized(None, &HeaderMap::new()));
    }

    #[test]
    fn test_missing_header_rejected() {
        let digest = digest_api_key("secret");
        assert!(!is_authorized(Some(&digest), &HeaderMap::new()));
    }

    #[test]
    fn test_matching_header_accepted() {
        let digest = digest_api_key("secret");
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("secret"));
        assert!(is_authorized(Some(&digest), &headers));
    }

    #[test]
    fn test_wrong_header_rejected() {
        let digest = digest_api_key("secret");
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("guess"));
        assert!(!is_authorized(Some(&digest), &headers));
    }

    #[test]
    fn test_digest_is_stable_hex() {
        let digest = digest_api_key("secret");
        assert_eq!(digest.len(), 64);
        assert_eq!(digest, digest_api_key("secret"));
        assert_ne!(digest, digest_api_key("Secret"));
    }
}
