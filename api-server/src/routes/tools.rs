//! Mock tool endpoint
//!
//! `POST /api/tools/{toolName}` answers with canned data so the chat UI can
//! exercise tool calls without a real backend.

use axum::{
    body::Bytes,
    extract::Path,
    routing::post,
    Json, Router,
};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use super::{bad_request, RouteError};
use crate::state::AppState;

const DEFAULT_LOCATION: &str = "San Francisco";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub tool: String,
    pub result: Value,
    pub timestamp: String,
}

fn parse_body(body: &Bytes) -> Result<Value, RouteError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(json!({}));
    }
    serde_json::from_slice(body).map_err(|e| bad_request(format!("Invalid JSON body: {}", e)))
}

fn weather_result(params: &Value) -> Value {
    let location = params["location"]
        .as_str()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(DEFAULT_LOCATION);

    json!({
        "location": location,
        "temperature": 72,
        "unit": "fahrenheit",
        "conditions": "Sunny",
        "humidity": 45,
    })
}

fn search_result(params: &Value) -> Value {
    let query = params["query"].as_str().unwrap_or_default();
    let encoded = urlencoding::encode(query);

    let results: Vec<Value> = (1..=3)
        .map(|i| {
            json!({
                "title": format!("Result {} for \"{}\"", i, query),
                "url": format!("https://example.com/search?q={}&page={}", encoded, i),
                "snippet": format!("Mock search snippet {} about {}.", i, query),
            })
        })
        .collect();

    json!({
        "query": query,
        "results": results,
    })
}

fn generic_result(tool: &str, params: Value) -> Value {
    json!({
        "message": format!("Mock response from tool '{}'", tool),
        "input": params,
    })
}

/// POST /api/tools/{toolName} - Invoke a mock tool
async fn call_tool(
    Path(tool_name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>, RouteError> {
    let params = parse_body(&body)?;
    info!("Mock tool call: {}", tool_name);

    let result = match tool_name.as_str() {
        "weather" => weather_result(&params),
        "search" => search_result(&params),
        other => generic_result(other, params),
    };

    Ok(Json(ToolResponse {
        tool: tool_name,
        result,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/api/tools/{tool_name}", post(call_tool))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::routes::test_support::{body_json, build_state, empty_request, json_request};

    async fn app() -> axum::Router {
        super::router().with_state(build_state(None).await)
    }

    #[tokio::test]
    async fn weather_uses_requested_location() {
        let response = app()
            .await
            .oneshot(json_request(
                "POST",
                "/api/tools/weather",
                json!({"location": "Lisbon"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload = body_json(response).await;
        assert_eq!(payload["tool"], "weather");
        assert_eq!(payload["result"]["location"], "Lisbon");
        assert_eq!(payload["result"]["conditions"], "Sunny");
    }

    #[tokio::test]
    async fn weather_without_body_uses_default_location() {
        let response = app()
            .await
            .oneshot(empty_request("POST", "/api/tools/weather"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload = body_json(response).await;
        assert_eq!(payload["result"]["location"], "San Francisco");
    }

    #[tokio::test]
    async fn search_returns_three_results() {
        let response = app()
            .await
            .oneshot(json_request(
                "POST",
                "/api/tools/search",
                json!({"query": "rust async"}),
            ))
            .await
            .unwrap();

        let payload = body_json(response).await;
        let results = payload["result"]["results"].as_array().unwrap();
        assert_eq!(results.len(), 3);
        assert!(results[0]["url"]
            .as_str()
            .unwrap()
            .contains("q=rust%20async"));
    }

    #[tokio::test]
    async fn unknown_tool_echoes_input() {
        let response = app()
            .await
            .oneshot(json_request(
                "POST",
                "/api/tools/translator",
                json!({"text": "hola"}),
            ))
            .await
            .unwrap();

        let payload = body_json(response).await;
        assert_eq!(payload["tool"], "translator");
        assert_eq!(payload["result"]["input"]["text"], "hola");
        assert!(payload["result"]["message"]
            .as_str()
            .unwrap()
            .contains("translator"));
    }

    #[tokio::test]
    async fn invalid_json_is_rejected() {
        let request = axum::http::Request::builder()
            .method("POST")
            .uri("/api/tools/search")
            .header("Content-Type", "application/json")
            .body(axum::body::Body::from("{not json"))
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
