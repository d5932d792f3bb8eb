//! OpenAI agent team endpoints
//!
//! Registry CRUD, simulated team runs, and a server-sent event stream of
//! registry changes.

use std::convert::Infallible;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use tokio_stream::{wrappers::BroadcastStream, Stream, StreamExt};
use tracing::debug;

use inventu_core::openai::{
    CreateOpenAIAgentRequest, CreateTeamRequest, OpenAIAgentConfig, OpenAIAgentTeam,
    OpenAIRunStatus, OrchestratorNotification, RunTeamRequest, UpdateOpenAIAgentRequest,
    UpdateTeamRequest,
};

use super::{core_error, not_found, RouteError};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunsQuery {
    #[serde(default)]
    pub team_id: Option<String>,
}

// ============================================================================
// Agents
// ============================================================================

/// GET /api/openai/agents
async fn list_agents(State(state): State<AppState>) -> Json<Vec<OpenAIAgentConfig>> {
    Json(state.agents().list_agents().await)
}

/// POST /api/openai/agents
async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateOpenAIAgentRequest>,
) -> Result<(StatusCode, Json<OpenAIAgentConfig>), RouteError> {
    let agent = state.agents().create_agent(req).await.map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /api/openai/agents/{id}
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OpenAIAgentConfig>, RouteError> {
    state
        .agents()
        .get_agent(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Agent {} not found", id)))
}

/// PUT /api/openai/agents/{id}
async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateOpenAIAgentRequest>,
) -> Result<Json<OpenAIAgentConfig>, RouteError> {
    state
        .agents()
        .update_agent(&id, req)
        .await
        .map(Json)
        .map_err(core_error)
}

/// DELETE /api/openai/agents/{id} - also scrubs the agent from teams
async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    match state.agents().delete_agent(&id).await.map_err(core_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found(format!("Agent {} not found", id))),
    }
}

// ============================================================================
// Teams
// ============================================================================

/// GET /api/openai/teams
async fn list_teams(State(state): State<AppState>) -> Json<Vec<OpenAIAgentTeam>> {
    Json(state.agents().list_teams().await)
}

/// POST /api/openai/teams
async fn create_team(
    State(state): State<AppState>,
    Json(req): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<OpenAIAgentTeam>), RouteError> {
    let team = state.agents().create_team(req).await.map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(team)))
}

/// GET /api/openai/teams/{id}
async fn get_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OpenAIAgentTeam>, RouteError> {
    state
        .agents()
        .get_team(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Team {} not found", id)))
}

/// PUT /api/openai/teams/{id}
async fn update_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateTeamRequest>,
) -> Result<Json<OpenAIAgentTeam>, RouteError> {
    state
        .agents()
        .update_team(&id, req)
        .await
        .map(Json)
        .map_err(core_error)
}

/// DELETE /api/openai/teams/{id}
async fn delete_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    match state.agents().delete_team(&id).await.map_err(core_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found(format!("Team {} not found", id))),
    }
}

// ============================================================================
// Runs
// ============================================================================

/// POST /api/openai/teams/{id}/runs - Start a simulated run
async fn run_team(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<RunTeamRequest>,
) -> Result<(StatusCode, Json<OpenAIRunStatus>), RouteError> {
    let run = state
        .agents()
        .run_agent_team(&id, req.input)
        .await
        .map_err(core_error)?;
    Ok((StatusCode::ACCEPTED, Json(run)))
}

/// GET /api/openai/teams/{id}/runs
async fn list_team_runs(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Json<Vec<OpenAIRunStatus>> {
    Json(state.agents().list_runs(Some(&id)).await)
}

/// GET /api/openai/runs?teamId=
async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<RunsQuery>,
) -> Json<Vec<OpenAIRunStatus>> {
    Json(state.agents().list_runs(query.team_id.as_deref()).await)
}

/// GET /api/openai/runs/{id}
async fn get_run(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<OpenAIRunStatus>, RouteError> {
    state
        .agents()
        .get_run(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Run {} not found", id)))
}

/// GET /api/openai/notifications/latest
async fn latest_notification(
    State(state): State<AppState>,
) -> Result<Json<Option<OrchestratorNotification>>, RouteError> {
    state
        .agents()
        .latest_notification()
        .await
        .map(Json)
        .map_err(core_error)
}

/// GET /api/openai/events - Registry changes as server-sent events
async fn events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let stream = BroadcastStream::new(state.agents().subscribe()).filter_map(|message| {
        match message {
            Ok(event) => Event::default().json_data(&event).ok().map(Ok),
            Err(lagged) => {
                debug!("Event subscriber fell behind: {}", lagged);
                None
            }
        }
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/openai/agents", get(list_agents).post(create_agent))
        .route(
            "/api/openai/agents/{id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/api/openai/teams", get(list_teams).post(create_team))
        .route(
            "/api/openai/teams/{id}",
            get(get_team).put(update_team).delete(delete_team),
        )
        .route(
            "/api/openai/teams/{id}/runs",
            get(list_team_runs).post(run_team),
        )
        .route("/api/openai/runs", get(list_runs))
        .route("/api/openai/runs/{id}", get(get_run))
        .route("/api/openai/notifications/latest", get(latest_notification))
        .route("/api/openai/events", get(events))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::http::StatusCode;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::routes::test_support::{body_json, build_state, empty_request, json_request};

    async fn create(app: &axum::Router, uri: &str, body: Value) -> Value {
        let response = app
            .clone()
            .oneshot(json_request("POST", uri, body))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
        body_json(response).await
    }

    #[tokio::test]
    async fn team_run_reaches_terminal_state() {
        let app = super::router().with_state(build_state(None).await);

        let lead = create(&app, "/api/openai/agents", json!({"name": "Lead"})).await;
        let helper = create(&app, "/api/openai/agents", json!({"name": "Helper"})).await;
        let team = create(
            &app,
            "/api/openai/teams",
            json!({
                "name": "Research",
                "orchestratorId": lead["id"],
                "assistantIds": [helper["id"]]
            }),
        )
        .await;
        let team_id = team["id"].as_str().unwrap();

        let started = app
            .clone()
            .oneshot(json_request(
                "POST",
                &format!("/api/openai/teams/{}/runs", team_id),
                json!({"input": "Find three sources"}),
            ))
            .await
            .unwrap();
        assert_eq!(started.status(), StatusCode::ACCEPTED);
        let run = body_json(started).await;
        assert_eq!(run["status"], "queued");
        let run_id = run["id"].as_str().unwrap().to_string();

        let mut status = Value::Null;
        for _ in 0..200 {
            let response = app
                .clone()
                .oneshot(empty_request("GET", &format!("/api/openai/runs/{}", run_id)))
                .await
                .unwrap();
            let run = body_json(response).await;
            status = run["status"].clone();
            if status == "completed" || status == "failed" {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(status, "completed");

        let listed = app
            .oneshot(empty_request(
                "GET",
                &format!("/api/openai/runs?teamId={}", team_id),
            ))
            .await
            .unwrap();
        assert_eq!(body_json(listed).await.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn run_without_orchestrator_is_bad_request() {
        let app = super::router().with_state(build_state(None).await);
        let team = create(&app, "/api/openai/teams", json!({"name": "Leaderless"})).await;

        let response = app
            .oneshot(json_request(
                "POST",
                &format!("/api/openai/teams/{}/runs", team["id"].as_str().unwrap()),
                json!({"input": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn run_for_missing_team_is_not_found() {
        let app = super::router().with_state(build_state(None).await);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/openai/teams/missing/runs",
                json!({"input": "hello"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn deleting_orchestrator_clears_team() {
        let app = super::router().with_state(build_state(None).await);

        let lead = create(&app, "/api/openai/agents", json!({"name": "Lead"})).await;
        let team = create(
            &app,
            "/api/openai/teams",
            json!({"name": "Ops", "orchestratorId": lead["id"], "assistantIds": [lead["id"]]}),
        )
        .await;

        let deleted = app
            .clone()
            .oneshot(empty_request(
                "DELETE",
                &format!("/api/openai/agents/{}", lead["id"].as_str().unwrap()),
            ))
            .await
            .unwrap();
        assert_eq!(deleted.status(), StatusCode::NO_CONTENT);

        let team = app
            .oneshot(empty_request(
                "GET",
                &format!("/api/openai/teams/{}", team["id"].as_str().unwrap()),
            ))
            .await
            .unwrap();
        let team = body_json(team).await;
        assert!(team["orchestratorId"].is_null());
        assert_eq!(team["assistantIds"], json!([]));
    }

    #[tokio::test]
    async fn events_endpoint_streams_sse() {
        let app = super::router().with_state(build_state(None).await);

        let response = app
            .oneshot(empty_request("GET", "/api/openai/events"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["content-type"],
            "text/event-stream"
        );
    }
}
