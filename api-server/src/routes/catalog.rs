//! Admin catalog endpoints
//!
//! CRUD for agents, model providers and MCP tools behind the admin dashboard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};

use inventu_core::catalog::{
    AIModelSummary, Agent, CreateAgentRequest, CreateModelRequest, CreateToolRequest, McpTool,
    UpdateAgentRequest, UpdateModelRequest, UpdateToolRequest,
};

use super::{core_error, not_found, RouteError};
use crate::state::AppState;

// ============================================================================
// Agents
// ============================================================================

/// GET /api/admin/agents
async fn list_agents(State(state): State<AppState>) -> Json<Vec<Agent>> {
    Json(state.catalog().list_agents().await)
}

/// POST /api/admin/agents
async fn create_agent(
    State(state): State<AppState>,
    Json(req): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>), RouteError> {
    let agent = state.catalog().create_agent(req).await.map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(agent)))
}

/// GET /api/admin/agents/{id}
async fn get_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Agent>, RouteError> {
    state
        .catalog()
        .get_agent(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("Agent {} not found", id)))
}

/// PUT /api/admin/agents/{id}
async fn update_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateAgentRequest>,
) -> Result<Json<Agent>, RouteError> {
    state
        .catalog()
        .update_agent(&id, req)
        .await
        .map(Json)
        .map_err(core_error)
}

/// DELETE /api/admin/agents/{id}
async fn delete_agent(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    match state.catalog().delete_agent(&id).await.map_err(core_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found(format!("Agent {} not found", id))),
    }
}

// ============================================================================
// Models
// ============================================================================

/// GET /api/admin/models
async fn list_models(State(state): State<AppState>) -> Json<Vec<AIModelSummary>> {
    Json(state.catalog().list_models().await)
}

/// POST /api/admin/models
async fn create_model(
    State(state): State<AppState>,
    Json(req): Json<CreateModelRequest>,
) -> Result<(StatusCode, Json<AIModelSummary>), RouteError> {
    let model = state.catalog().create_model(req).await.map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(model)))
}

/// GET /api/admin/models/{id} - masked view
async fn get_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<AIModelSummary>, RouteError> {
    state
        .catalog()
        .get_model(&id)
        .await
        .map(|model| Json(AIModelSummary::from(&model)))
        .ok_or_else(|| not_found(format!("Model {} not found", id)))
}

/// PUT /api/admin/models/{id}
async fn update_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateModelRequest>,
) -> Result<Json<AIModelSummary>, RouteError> {
    state
        .catalog()
        .update_model(&id, req)
        .await
        .map(Json)
        .map_err(core_error)
}

/// DELETE /api/admin/models/{id}
async fn delete_model(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    match state.catalog().delete_model(&id).await.map_err(core_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found(format!("Model {} not found", id))),
    }
}

// ============================================================================
// MCP tools
// ============================================================================

/// GET /api/admin/mcp-tools
async fn list_tools(State(state): State<AppState>) -> Json<Vec<McpTool>> {
    Json(state.catalog().list_tools().await)
}

/// POST /api/admin/mcp-tools
async fn create_tool(
    State(state): State<AppState>,
    Json(req): Json<CreateToolRequest>,
) -> Result<(StatusCode, Json<McpTool>), RouteError> {
    let tool = state.catalog().create_tool(req).await.map_err(core_error)?;
    Ok((StatusCode::CREATED, Json(tool)))
}

/// GET /api/admin/mcp-tools/{id}
async fn get_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<McpTool>, RouteError> {
    state
        .catalog()
        .get_tool(&id)
        .await
        .map(Json)
        .ok_or_else(|| not_found(format!("MCP tool {} not found", id)))
}

/// PUT /api/admin/mcp-tools/{id}
async fn update_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateToolRequest>,
) -> Result<Json<McpTool>, RouteError> {
    state
        .catalog()
        .update_tool(&id, req)
        .await
        .map(Json)
        .map_err(core_error)
}

/// DELETE /api/admin/mcp-tools/{id}
async fn delete_tool(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, RouteError> {
    match state.catalog().delete_tool(&id).await.map_err(core_error)? {
        true => Ok(StatusCode::NO_CONTENT),
        false => Err(not_found(format!("MCP tool {} not found", id))),
    }
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/agents", get(list_agents).post(create_agent))
        .route(
            "/api/admin/agents/{id}",
            get(get_agent).put(update_agent).delete(delete_agent),
        )
        .route("/api/admin/models", get(list_models).post(create_model))
        .route(
            "/api/admin/models/{id}",
            get(get_model).put(update_model).delete(delete_model),
        )
        .route("/api/admin/mcp-tools", get(list_tools).post(create_tool))
        .route(
            "/api/admin/mcp-tools/{id}",
            get(get_tool).put(update_tool).delete(delete_tool),
        )
}
