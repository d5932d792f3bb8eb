//! Application state

use std::sync::Arc;

use chrono::{DateTime, Utc};
use inventu_core::catalog::CatalogStore;
use inventu_core::openai::{OpenAIAgentService, SimulationConfig};
use inventu_core::storage::LocalStorage;

use crate::config::ServerConfig;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    catalog: CatalogStore,
    agents: OpenAIAgentService,
    api_key_digest: Option<String>,
    started_at: DateTime<Utc>,
}

impl AppState {
    /// Create a new AppState persisting under the configured data directory
    pub async fn new(config: &ServerConfig) -> inventu_core::Result<Self> {
        let storage = LocalStorage::on_disk(&config.data_dir);
        Self::with_storage(
            storage,
            config.api_key_digest.clone(),
            config.simulation.clone(),
        )
        .await
    }

    /// Create an AppState over an existing storage handle
    pub async fn with_storage(
        storage: LocalStorage,
        api_key_digest: Option<String>,
        simulation: SimulationConfig,
    ) -> inventu_core::Result<Self> {
        let catalog = CatalogStore::load(storage.clone()).await?;
        let agents = OpenAIAgentService::load(storage, simulation).await?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                catalog,
                agents,
                api_key_digest,
                started_at: Utc::now(),
            }),
        })
    }

    pub fn catalog(&self) -> &CatalogStore {
        &self.inner.catalog
    }

    pub fn agents(&self) -> &OpenAIAgentService {
        &self.inner.agents
    }

    pub fn api_key_digest(&self) -> Option<&str> {
        self.inner.api_key_digest.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.inner.started_at
    }
}
