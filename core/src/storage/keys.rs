//! Well-known storage keys

pub const API_BASE_URL: &str = "inventu_api_base_url";
pub const API_TOKEN: &str = "inventu_api_token";
pub const USER: &str = "inventu_user";

pub const OPENAI_AGENTS: &str = "openai_agents";
pub const OPENAI_TEAMS: &str = "openai_agent_teams";
pub const OPENAI_RUNS: &str = "openai_agent_runs";
pub const ORCHESTRATOR_NOTIFICATION: &str = "orchestrator-memory-notification";

pub const CATALOG_AGENTS: &str = "inventu_agents";
pub const CATALOG_MODELS: &str = "inventu_models";
pub const CATALOG_MCP_TOOLS: &str = "inventu_mcp_tools";
