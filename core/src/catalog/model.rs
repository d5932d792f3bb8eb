//! Catalog model definitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::{Error, Result};

/// An agent persona configured by an admin.
///
/// Bound to at most one model and any number of MCP tools. References are
/// not checked on write; deletes of models and tools clean them up instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub model_id: Option<String>,
    /// Free-form configuration object
    #[serde(default = "empty_object")]
    pub config_json: Value,
    #[serde(default)]
    pub tool_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Agent {
    pub fn new(name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: String::new(),
            model_id: None,
            config_json: empty_object(),
            tool_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A configured model provider
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIModel {
    pub id: String,
    /// Provider name, e.g. "openai" or "anthropic"
    pub provider: String,
    /// Model identifier at the provider, e.g. "gpt-4o"
    pub provider_id: String,
    pub api_key: String,
    #[serde(default)]
    pub description: String,
}

/// Listing view of a model; never carries the full API key
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AIModelSummary {
    pub id: String,
    pub provider: String,
    pub provider_id: String,
    pub api_key: String,
    pub description: String,
}

impl From<&AIModel> for AIModelSummary {
    fn from(model: &AIModel) -> Self {
        Self {
            id: model.id.clone(),
            provider: model.provider.clone(),
            provider_id: model.provider_id.clone(),
            api_key: mask_api_key(&model.api_key),
            description: model.description.clone(),
        }
    }
}

/// An MCP tool integration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct McpTool {
    pub id: String,
    pub name: String,
    /// JSON-encoded parameter schema
    pub parameters: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAgentRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    /// Raw JSON text as typed in the config editor
    #[serde(default)]
    pub config_json: Option<String>,
    #[serde(default)]
    pub tool_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAgentRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub model_id: Option<String>,
    #[serde(default)]
    pub config_json: Option<String>,
    #[serde(default)]
    pub tool_ids: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateModelRequest {
    pub provider: String,
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateModelRequest {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub provider_id: Option<String>,
    /// Left unchanged when absent or empty
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateToolRequest {
    pub name: String,
    #[serde(default)]
    pub parameters: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateToolRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
}

fn empty_object() -> Value {
    Value::Object(Default::default())
}

/// Parse an agent config editor value; blank text means an empty object
pub fn parse_config_json(raw: &str) -> Result<Value> {
    if raw.trim().is_empty() {
        return Ok(empty_object());
    }

    let value: Value =
        serde_json::from_str(raw).map_err(|e| Error::invalid_config("configJson", &e))?;
    if !value.is_object() {
        return Err(Error::InvalidConfig {
            field: "configJson".to_string(),
            message: "expected a JSON object".to_string(),
        });
    }
    Ok(value)
}

/// Validate a tool parameter schema; blank text becomes `{}`
pub fn normalize_parameters(raw: &str) -> Result<String> {
    if raw.trim().is_empty() {
        return Ok("{}".to_string());
    }
    serde_json::from_str::<Value>(raw).map_err(|e| Error::invalid_config("parameters", &e))?;
    Ok(raw.to_string())
}

/// Shortest key that is shown with a prefix and suffix rather than fully starred
const MASK_REVEAL_MIN_LEN: usize = 13;

/// Mask an API key for display, keeping a short prefix and suffix
pub fn mask_api_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() < MASK_REVEAL_MIN_LEN {
        return "*".repeat(chars.len());
    }
    let prefix: String = chars[..4].iter().collect();
    let suffix: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", prefix, suffix)
}
