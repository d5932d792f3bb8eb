//! Catalog persistent store
//!
//! Keeps agents, models and MCP tools in memory and mirrors each list to
//! local storage after every mutation.

use chrono::Utc;
use tokio::sync::RwLock;
use tracing::info;
use uuid::Uuid;

use crate::error::require_name;
use crate::storage::{keys, LocalStorage};
use crate::{Error, Result};

use super::model::{
    normalize_parameters, parse_config_json, AIModel, AIModelSummary, Agent, CreateAgentRequest,
    CreateModelRequest, CreateToolRequest, McpTool, UpdateAgentRequest, UpdateModelRequest,
    UpdateToolRequest,
};

/// Thread-safe catalog store
pub struct CatalogStore {
    storage: LocalStorage,
    agents: RwLock<Vec<Agent>>,
    models: RwLock<Vec<AIModel>>,
    tools: RwLock<Vec<McpTool>>,
}

impl CatalogStore {
    /// Load the catalog from storage
    pub async fn load(storage: LocalStorage) -> Result<Self> {
        let agents = storage.get_list(keys::CATALOG_AGENTS).await?;
        let models = storage.get_list(keys::CATALOG_MODELS).await?;
        let tools = storage.get_list(keys::CATALOG_MCP_TOOLS).await?;

        Ok(Self {
            storage,
            agents: RwLock::new(agents),
            models: RwLock::new(models),
            tools: RwLock::new(tools),
        })
    }

    async fn persist_agents(&self) -> Result<()> {
        let agents = self.agents.read().await;
        self.storage.set(keys::CATALOG_AGENTS, &*agents).await
    }

    async fn persist_models(&self) -> Result<()> {
        let models = self.models.read().await;
        self.storage.set(keys::CATALOG_MODELS, &*models).await
    }

    async fn persist_tools(&self) -> Result<()> {
        let tools = self.tools.read().await;
        self.storage.set(keys::CATALOG_MCP_TOOLS, &*tools).await
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    pub async fn list_agents(&self) -> Vec<Agent> {
        self.agents.read().await.clone()
    }

    pub async fn get_agent(&self, id: &str) -> Option<Agent> {
        self.agents.read().await.iter().find(|a| a.id == id).cloned()
    }

    pub async fn create_agent(&self, request: CreateAgentRequest) -> Result<Agent> {
        let mut agent = Agent::new(require_name(&request.name, "Agent name")?);
        if let Some(raw) = request.config_json.as_deref() {
            agent.config_json = parse_config_json(raw)?;
        }
        agent.description = request.description.unwrap_or_default();
        agent.model_id = request.model_id.filter(|id| !id.is_empty());
        agent.tool_ids = request.tool_ids.unwrap_or_default();

        self.agents.write().await.push(agent.clone());
        self.persist_agents().await?;

        info!("Created agent {} ({})", agent.name, agent.id);
        Ok(agent)
    }

    pub async fn update_agent(&self, id: &str, request: UpdateAgentRequest) -> Result<Agent> {
        let config = request
            .config_json
            .as_deref()
            .map(parse_config_json)
            .transpose()?;
        let name = request
            .name
            .as_deref()
            .map(|n| require_name(n, "Agent name"))
            .transpose()?;

        let updated = {
            let mut agents = self.agents.write().await;
            let agent = agents
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| Error::AgentNotFound(id.to_string()))?;

            if let Some(name) = name {
                agent.name = name;
            }
            if let Some(description) = request.description {
                agent.description = description;
            }
            if let Some(model_id) = request.model_id {
                agent.model_id = Some(model_id).filter(|id| !id.is_empty());
            }
            if let Some(config) = config {
                agent.config_json = config;
            }
            if let Some(tool_ids) = request.tool_ids {
                agent.tool_ids = tool_ids;
            }
            agent.updated_at = Utc::now();
            agent.clone()
        };

        self.persist_agents().await?;
        Ok(updated)
    }

    pub async fn delete_agent(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut agents = self.agents.write().await;
            let before = agents.len();
            agents.retain(|a| a.id != id);
            agents.len() != before
        };

        if removed {
            self.persist_agents().await?;
            info!("Deleted agent {}", id);
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Models
    // ------------------------------------------------------------------

    pub async fn list_models(&self) -> Vec<AIModelSummary> {
        self.models
            .read()
            .await
            .iter()
            .map(AIModelSummary::from)
            .collect()
    }

    /// Full model record, including the API key
    pub async fn get_model(&self, id: &str) -> Option<AIModel> {
        self.models.read().await.iter().find(|m| m.id == id).cloned()
    }

    pub async fn create_model(&self, request: CreateModelRequest) -> Result<AIModelSummary> {
        let model = AIModel {
            id: Uuid::new_v4().to_string(),
            provider: require_name(&request.provider, "Provider")?,
            provider_id: require_name(&request.provider_id, "Provider model id")?,
            api_key: request.api_key,
            description: request.description.unwrap_or_default(),
        };
        let summary = AIModelSummary::from(&model);

        self.models.write().await.push(model);
        self.persist_models().await?;

        info!("Created model {}/{}", summary.provider, summary.provider_id);
        Ok(summary)
    }

    pub async fn update_model(
        &self,
        id: &str,
        request: UpdateModelRequest,
    ) -> Result<AIModelSummary> {
        let provider = request
            .provider
            .as_deref()
            .map(|p| require_name(p, "Provider"))
            .transpose()?;
        let provider_id = request
            .provider_id
            .as_deref()
            .map(|p| require_name(p, "Provider model id"))
            .transpose()?;

        let summary = {
            let mut models = self.models.write().await;
            let model = models
                .iter_mut()
                .find(|m| m.id == id)
                .ok_or_else(|| Error::NotFound(format!("Model {} not found", id)))?;

            if let Some(provider) = provider {
                model.provider = provider;
            }
            if let Some(provider_id) = provider_id {
                model.provider_id = provider_id;
            }
            if let Some(api_key) = request.api_key.filter(|k| !k.is_empty()) {
                model.api_key = api_key;
            }
            if let Some(description) = request.description {
                model.description = description;
            }
            AIModelSummary::from(&*model)
        };

        self.persist_models().await?;
        Ok(summary)
    }

    /// Delete a model and unbind it from every agent that used it
    pub async fn delete_model(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut models = self.models.write().await;
            let before = models.len();
            models.retain(|m| m.id != id);
            models.len() != before
        };
        if !removed {
            return Ok(false);
        }
        self.persist_models().await?;

        let unbound = {
            let mut agents = self.agents.write().await;
            let mut count = 0;
            for agent in agents.iter_mut() {
                if agent.model_id.as_deref() == Some(id) {
                    agent.model_id = None;
                    agent.updated_at = Utc::now();
                    count += 1;
                }
            }
            count
        };
        if unbound > 0 {
            self.persist_agents().await?;
        }

        info!("Deleted model {} ({} agents unbound)", id, unbound);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // MCP tools
    // ------------------------------------------------------------------

    pub async fn list_tools(&self) -> Vec<McpTool> {
        self.tools.read().await.clone()
    }

    pub async fn get_tool(&self, id: &str) -> Option<McpTool> {
        self.tools.read().await.iter().find(|t| t.id == id).cloned()
    }

    pub async fn create_tool(&self, request: CreateToolRequest) -> Result<McpTool> {
        let tool = McpTool {
            id: Uuid::new_v4().to_string(),
            name: require_name(&request.name, "Tool name")?,
            parameters: normalize_parameters(request.parameters.as_deref().unwrap_or(""))?,
        };

        self.tools.write().await.push(tool.clone());
        self.persist_tools().await?;

        info!("Created MCP tool {} ({})", tool.name, tool.id);
        Ok(tool)
    }

    pub async fn update_tool(&self, id: &str, request: UpdateToolRequest) -> Result<McpTool> {
        let name = request
            .name
            .as_deref()
            .map(|n| require_name(n, "Tool name"))
            .transpose()?;
        let parameters = request
            .parameters
            .as_deref()
            .map(normalize_parameters)
            .transpose()?;

        let updated = {
            let mut tools = self.tools.write().await;
            let tool = tools
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::NotFound(format!("MCP tool {} not found", id)))?;

            if let Some(name) = name {
                tool.name = name;
            }
            if let Some(parameters) = parameters {
                tool.parameters = parameters;
            }
            tool.clone()
        };

        self.persist_tools().await?;
        Ok(updated)
    }

    /// Delete a tool and detach it from every agent
    pub async fn delete_tool(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut tools = self.tools.write().await;
            let before = tools.len();
            tools.retain(|t| t.id != id);
            tools.len() != before
        };
        if !removed {
            return Ok(false);
        }
        self.persist_tools().await?;

        let detached = {
            let mut agents = self.agents.write().await;
            let mut changed = false;
            for agent in agents.iter_mut() {
                let before = agent.tool_ids.len();
                agent.tool_ids.retain(|t| t != id);
                if agent.tool_ids.len() != before {
                    agent.updated_at = Utc::now();
                    changed = true;
                }
            }
            changed
        };
        if detached {
            self.persist_agents().await?;
        }

        info!("Deleted MCP tool {}", id);
        Ok(true)
    }
}
