use std::time::Duration;

use inventu_core::catalog::{
    AIModelSummary, Agent, CreateAgentRequest, CreateModelRequest, CreateToolRequest, McpTool,
    UpdateAgentRequest, UpdateModelRequest, UpdateToolRequest,
};
use inventu_core::openai::{
    CreateOpenAIAgentRequest, CreateTeamRequest, OpenAIAgentConfig, OpenAIAgentTeam,
    OpenAIRunStatus, OrchestratorNotification, RunTeamRequest, UpdateOpenAIAgentRequest,
    UpdateTeamRequest,
};
use inventu_core::storage::{keys, LocalStorage};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Method, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::config::{normalize_base_url, ApiConfig};
use crate::error::{ApiError, Result};

const API_KEY_HEADER: &str = "x-api-key";

/// `GET /health` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: String,
    #[serde(default)]
    pub api_key_required: bool,
}

/// `POST /api/tools/{toolName}` payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResponse {
    pub tool: String,
    pub result: Value,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn tool_path(tool_name: &str) -> String {
    format!("/api/tools/{}", urlencoding::encode(tool_name))
}

fn record_path(collection: &str, id: &str) -> String {
    format!("{}/{}", collection, urlencoding::encode(id))
}

fn team_runs_path(team_id: &str) -> String {
    format!("/api/openai/teams/{}/runs", urlencoding::encode(team_id))
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// REST client for the Inventu API
pub struct ApiService {
    client: Client,
    storage: LocalStorage,
    config: RwLock<ApiConfig>,
}

impl ApiService {
    /// Create a client configured from storage and the environment
    pub async fn new(storage: LocalStorage) -> Result<Self> {
        let config = ApiConfig::resolve(&storage).await?;
        Ok(Self::with_config(storage, config))
    }

    pub fn with_config(storage: LocalStorage, config: ApiConfig) -> Self {
        Self {
            client: Client::new(),
            storage,
            config: RwLock::new(config),
        }
    }

    pub async fn config(&self) -> ApiConfig {
        self.config.read().await.clone()
    }

    pub async fn base_url(&self) -> String {
        self.config.read().await.base_url.clone()
    }

    /// Point the client at another server and remember it
    pub async fn set_base_url(&self, base_url: &str) -> Result<()> {
        let normalized = normalize_base_url(base_url)?;
        self.storage.set(keys::API_BASE_URL, &normalized).await?;
        info!("API base URL set to {}", normalized);
        self.config.write().await.base_url = normalized;
        Ok(())
    }

    /// Store the bearer token used for subsequent requests
    pub async fn set_token(&self, token: &str) -> Result<()> {
        self.storage.set(keys::API_TOKEN, token).await?;
        self.config.write().await.token = Some(token.to_string());
        Ok(())
    }

    pub async fn clear_token(&self) -> Result<()> {
        self.storage.remove(keys::API_TOKEN).await?;
        self.config.write().await.token = None;
        Ok(())
    }

    /// Set the `x-api-key` header for tool calls; not persisted
    pub async fn set_api_key(&self, api_key: Option<String>) {
        self.config.write().await.api_key = api_key.filter(|k| !k.is_empty());
    }

    fn default_headers(config: &ApiConfig) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        if let Some(token) = &config.token {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => warn!("Stored API token is not a valid header value; skipping"),
            }
        }
        if let Some(api_key) = &config.api_key {
            match HeaderValue::from_str(api_key) {
                Ok(value) => {
                    headers.insert(API_KEY_HEADER, value);
                }
                Err(_) => warn!("API key is not a valid header value; skipping"),
            }
        }
        headers
    }

    async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<Response> {
        let (url, headers) = {
            let config = self.config.read().await;
            (
                format!("{}{}", config.base_url, path),
                Self::default_headers(&config),
            )
        };

        debug!("{} {}", method, url);
        let mut request = self.client.request(method, &url).headers(headers);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|body| body.error)
            .ok()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(text).filter(|t| !t.trim().is_empty()))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());

        warn!("{} failed with {}: {}", path, status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(ApiError::Decode)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.send::<()>(Method::GET, path, None).await?;
        Self::decode(response).await
    }

    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::POST, path, Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(Method::PUT, path, Some(body)).await?;
        Self::decode(response).await
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.send::<()>(Method::DELETE, path, None).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Typed endpoints
    // ------------------------------------------------------------------

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    pub async fn call_tool(&self, tool_name: &str, params: &Value) -> Result<ToolResponse> {
        self.post(&tool_path(tool_name), params).await
    }

    // Admin catalog

    pub async fn list_agents(&self) -> Result<Vec<Agent>> {
        self.get("/api/admin/agents").await
    }

    pub async fn get_agent(&self, id: &str) -> Result<Agent> {
        self.get(&record_path("/api/admin/agents", id)).await
    }

    pub async fn create_agent(&self, request: &CreateAgentRequest) -> Result<Agent> {
        self.post("/api/admin/agents", request).await
    }

    pub async fn update_agent(&self, id: &str, request: &UpdateAgentRequest) -> Result<Agent> {
        self.put(&record_path("/api/admin/agents", id), request).await
    }

    pub async fn delete_agent(&self, id: &str) -> Result<()> {
        self.delete(&record_path("/api/admin/agents", id)).await
    }

    /// Models come back with their API keys masked
    pub async fn list_models(&self) -> Result<Vec<AIModelSummary>> {
        self.get("/api/admin/models").await
    }

    pub async fn get_model(&self, id: &str) -> Result<AIModelSummary> {
        self.get(&record_path("/api/admin/models", id)).await
    }

    pub async fn create_model(&self, request: &CreateModelRequest) -> Result<AIModelSummary> {
        self.post("/api/admin/models", request).await
    }

    pub async fn update_model(
        &self,
        id: &str,
        request: &UpdateModelRequest,
    ) -> Result<AIModelSummary> {
        self.put(&record_path("/api/admin/models", id), request).await
    }

    pub async fn delete_model(&self, id: &str) -> Result<()> {
        self.delete(&record_path("/api/admin/models", id)).await
    }

    pub async fn list_mcp_tools(&self) -> Result<Vec<McpTool>> {
        self.get("/api/admin/mcp-tools").await
    }

    pub async fn get_mcp_tool(&self, id: &str) -> Result<McpTool> {
        self.get(&record_path("/api/admin/mcp-tools", id)).await
    }

    pub async fn create_mcp_tool(&self, request: &CreateToolRequest) -> Result<McpTool> {
        self.post("/api/admin/mcp-tools", request).await
    }

    pub async fn update_mcp_tool(&self, id: &str, request: &UpdateToolRequest) -> Result<McpTool> {
        self.put(&record_path("/api/admin/mcp-tools", id), request).await
    }

    pub async fn delete_mcp_tool(&self, id: &str) -> Result<()> {
        self.delete(&record_path("/api/admin/mcp-tools", id)).await
    }

    // OpenAI agent teams

    pub async fn list_openai_agents(&self) -> Result<Vec<OpenAIAgentConfig>> {
        self.get("/api/openai/agents").await
    }

    pub async fn get_openai_agent(&self, id: &str) -> Result<OpenAIAgentConfig> {
        self.get(&record_path("/api/openai/agents", id)).await
    }

    pub async fn create_openai_agent(
        &self,
        request: &CreateOpenAIAgentRequest,
    ) -> Result<OpenAIAgentConfig> {
        self.post("/api/openai/agents", request).await
    }

    pub async fn update_openai_agent(
        &self,
        id: &str,
        request: &UpdateOpenAIAgentRequest,
    ) -> Result<OpenAIAgentConfig> {
        self.put(&record_path("/api/openai/agents", id), request).await
    }

    /// Also removes the agent from every team on the server
    pub async fn delete_openai_agent(&self, id: &str) -> Result<()> {
        self.delete(&record_path("/api/openai/agents", id)).await
    }

    pub async fn list_teams(&self) -> Result<Vec<OpenAIAgentTeam>> {
        self.get("/api/openai/teams").await
    }

    pub async fn get_team(&self, id: &str) -> Result<OpenAIAgentTeam> {
        self.get(&record_path("/api/openai/teams", id)).await
    }

    pub async fn create_team(&self, request: &CreateTeamRequest) -> Result<OpenAIAgentTeam> {
        self.post("/api/openai/teams", request).await
    }

    pub async fn update_team(
        &self,
        id: &str,
        request: &UpdateTeamRequest,
    ) -> Result<OpenAIAgentTeam> {
        self.put(&record_path("/api/openai/teams", id), request).await
    }

    pub async fn delete_team(&self, id: &str) -> Result<()> {
        self.delete(&record_path("/api/openai/teams", id)).await
    }

    pub async fn run_team(&self, team_id: &str, input: &str) -> Result<OpenAIRunStatus> {
        let request = RunTeamRequest {
            input: input.to_string(),
        };
        self.post(&team_runs_path(team_id), &request).await
    }

    /// Runs newest first, optionally limited to one team
    pub async fn list_runs(&self, team_id: Option<&str>) -> Result<Vec<OpenAIRunStatus>> {
        match team_id {
            Some(team_id) => self.get(&team_runs_path(team_id)).await,
            None => self.get("/api/openai/runs").await,
        }
    }

    pub async fn get_run(&self, run_id: &str) -> Result<OpenAIRunStatus> {
        self.get(&record_path("/api/openai/runs", run_id)).await
    }

    pub async fn latest_notification(&self) -> Result<Option<OrchestratorNotification>> {
        self.get("/api/openai/notifications/latest").await
    }

    /// Poll a run until it completes or fails
    pub async fn wait_for_run(&self, run_id: &str, poll_interval: Duration) -> Result<OpenAIRunStatus> {
        loop {
            let run = self.get_run(run_id).await?;
            if run.is_terminal() {
                return Ok(run);
            }
            debug!("Run {} is {}", run_id, run.status.as_str());
            tokio::time::sleep(poll_interval).await;
        }
    }
}
