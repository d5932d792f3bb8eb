//! Route handlers

pub mod catalog;
pub mod health;
pub mod openai;
pub mod tools;

use axum::{http::StatusCode, middleware, Json, Router};
use serde::Serialize;
use tracing::error;

use crate::auth::require_api_key;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

pub type RouteError = (StatusCode, Json<ErrorResponse>);

pub fn route_error(status: StatusCode, error: impl Into<String>) -> RouteError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

pub fn not_found(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::NOT_FOUND, error)
}

pub fn bad_request(error: impl Into<String>) -> RouteError {
    route_error(StatusCode::BAD_REQUEST, error)
}

/// Map a core error onto an HTTP status
pub fn core_error(err: inventu_core::Error) -> RouteError {
    if err.is_not_found() {
        not_found(err.to_string())
    } else if err.is_invalid_input() {
        bad_request(err.to_string())
    } else {
        error!("Request failed: {}", err);
        route_error(StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// Full application router.
///
/// Everything under `/api` passes through the API key check; `/` and
/// `/health` stay public.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .merge(tools::router())
        .merge(catalog::router())
        .merge(openai::router())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_api_key,
        ));

    Router::new()
        .merge(health::router())
        .merge(api)
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, Response},
    };
    use inventu_core::openai::SimulationConfig;
    use inventu_core::storage::LocalStorage;
    use serde_json::Value;

    use crate::auth::digest_api_key;
    use crate::state::AppState;

    pub async fn build_state(api_key: Option<&str>) -> AppState {
        let simulation = SimulationConfig::default()
            .with_delays(5..=10, 5..=10)
            .with_failure_rate(0.0);
        AppState::with_storage(
            LocalStorage::in_memory(),
            api_key.map(digest_api_key),
            simulation,
        )
        .await
        .unwrap()
    }

    pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    pub async fn body_json(response: Response<Body>) -> Value {
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&body).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use super::test_support::{body_json, build_state, empty_request, json_request};
    use super::build_router;

    #[tokio::test]
    async fn api_routes_require_key_when_configured() {
        let app = build_router(build_state(Some("secret-key")).await);

        let missing = app
            .clone()
            .oneshot(json_request("POST", "/api/tools/weather", json!({})))
            .await
            .unwrap();
        assert_eq!(missing.status(), StatusCode::UNAUTHORIZED);
        let payload = body_json(missing).await;
        assert!(payload["error"].as_str().unwrap().contains("API key"));

        let mut wrong = json_request("POST", "/api/tools/weather", json!({}));
        wrong
            .headers_mut()
            .insert("x-api-key", "not-it".parse().unwrap());
        let wrong = app.clone().oneshot(wrong).await.unwrap();
        assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

        let mut valid = json_request("POST", "/api/tools/weather", json!({}));
        valid
            .headers_mut()
            .insert("x-api-key", "secret-key".parse().unwrap());
        let valid = app.oneshot(valid).await.unwrap();
        assert_eq!(valid.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn api_routes_open_without_configured_key() {
        let app = build_router(build_state(None).await);

        let response = app
            .oneshot(json_request("POST", "/api/tools/search", json!({"query": "rust"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn health_stays_public_with_key_configured() {
        let app = build_router(build_state(Some("secret-key")).await);

        let health = app
            .clone()
            .oneshot(empty_request("GET", "/health"))
            .await
            .unwrap();
        assert_eq!(health.status(), StatusCode::OK);

        let root = app.oneshot(empty_request("GET", "/")).await.unwrap();
        assert_eq!(root.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn admin_routes_require_key_when_configured() {
        let app = build_router(build_state(Some("secret-key")).await);

        let response = app
            .oneshot(empty_request("GET", "/api/admin/agents"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
