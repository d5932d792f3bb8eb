//! OpenAI agent team registry
//!
//! Keeps assistants, teams and runs in memory, mirrors every mutation to
//! local storage, and simulates team runs on detached timers.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::require_name;
use crate::storage::{keys, LocalStorage};
use crate::{Error, Result};

use super::model::{
    AgentServiceEvent, CreateOpenAIAgentRequest, CreateTeamRequest, OpenAIAgentConfig,
    OpenAIAgentTeam, OpenAIRunStatus, OrchestratorNotification, RunState,
    UpdateOpenAIAgentRequest, UpdateTeamRequest,
};
use super::simulation::SimulationConfig;

const DEFAULT_MODEL: &str = "gpt-4o";

/// Shared handle to the agent registry
#[derive(Clone)]
pub struct OpenAIAgentService {
    inner: Arc<ServiceInner>,
}

struct ServiceInner {
    storage: LocalStorage,
    simulation: SimulationConfig,
    agents: RwLock<Vec<OpenAIAgentConfig>>,
    teams: RwLock<Vec<OpenAIAgentTeam>>,
    runs: RwLock<Vec<OpenAIRunStatus>>,
    event_tx: broadcast::Sender<AgentServiceEvent>,
}

impl OpenAIAgentService {
    /// Load the registry from storage.
    ///
    /// Runs left `queued` or `in_progress` by a previous process are
    /// scheduled again so they still reach a terminal state.
    pub async fn load(storage: LocalStorage, simulation: SimulationConfig) -> Result<Self> {
        let agents: Vec<OpenAIAgentConfig> = storage.get_list(keys::OPENAI_AGENTS).await?;
        let teams: Vec<OpenAIAgentTeam> = storage.get_list(keys::OPENAI_TEAMS).await?;
        let runs: Vec<OpenAIRunStatus> = storage.get_list(keys::OPENAI_RUNS).await?;

        let pending: Vec<String> = runs
            .iter()
            .filter(|r| !r.is_terminal())
            .map(|r| r.id.clone())
            .collect();

        info!(
            "Loaded OpenAI agent registry: {} agents, {} teams, {} runs",
            agents.len(),
            teams.len(),
            runs.len()
        );

        let (event_tx, _) = broadcast::channel(256);
        let service = Self {
            inner: Arc::new(ServiceInner {
                storage,
                simulation,
                agents: RwLock::new(agents),
                teams: RwLock::new(teams),
                runs: RwLock::new(runs),
                event_tx,
            }),
        };

        for run_id in pending {
            info!("Resuming unfinished run {}", run_id);
            service.spawn_simulation(run_id);
        }

        Ok(service)
    }

    /// Subscribe to registry change notifications
    pub fn subscribe(&self) -> broadcast::Receiver<AgentServiceEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit(&self, event: AgentServiceEvent) {
        // No subscribers is fine
        let _ = self.inner.event_tx.send(event);
    }

    async fn persist_agents(&self) -> Result<()> {
        let agents = self.inner.agents.read().await;
        self.inner.storage.set(keys::OPENAI_AGENTS, &*agents).await
    }

    async fn persist_teams(&self) -> Result<()> {
        let teams = self.inner.teams.read().await;
        self.inner.storage.set(keys::OPENAI_TEAMS, &*teams).await
    }

    async fn persist_runs(&self) -> Result<()> {
        let runs = self.inner.runs.read().await;
        self.inner.storage.set(keys::OPENAI_RUNS, &*runs).await
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    pub async fn list_agents(&self) -> Vec<OpenAIAgentConfig> {
        self.inner.agents.read().await.clone()
    }

    pub async fn get_agent(&self, id: &str) -> Option<OpenAIAgentConfig> {
        self.inner
            .agents
            .read()
            .await
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }

    pub async fn create_agent(&self, request: CreateOpenAIAgentRequest) -> Result<OpenAIAgentConfig> {
        let now = Utc::now();
        let agent = OpenAIAgentConfig {
            id: Uuid::new_v4().to_string(),
            name: require_name(&request.name, "Agent name")?,
            description: request.description.unwrap_or_default(),
            instructions: request.instructions.unwrap_or_default(),
            model: request
                .model
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            tools: request.tools.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.inner.agents.write().await.push(agent.clone());
        self.persist_agents().await?;
        self.emit(AgentServiceEvent::AgentsChanged);

        info!("Created OpenAI agent {} ({})", agent.name, agent.id);
        Ok(agent)
    }

    pub async fn update_agent(
        &self,
        id: &str,
        request: UpdateOpenAIAgentRequest,
    ) -> Result<OpenAIAgentConfig> {
        let name = request
            .name
            .as_deref()
            .map(|n| require_name(n, "Agent name"))
            .transpose()?;

        let updated = {
            let mut agents = self.inner.agents.write().await;
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
            if let Some(instructions) = request.instructions {
                agent.instructions = instructions;
            }
            if let Some(model) = request.model.filter(|m| !m.trim().is_empty()) {
                agent.model = model;
            }
            if let Some(tools) = request.tools {
                agent.tools = tools;
            }
            agent.updated_at = Utc::now();
            agent.clone()
        };

        self.persist_agents().await?;
        self.emit(AgentServiceEvent::AgentsChanged);
        Ok(updated)
    }

    /// Delete an agent and scrub it from every team.
    ///
    /// The agent is removed from each team's assistants, and any team it
    /// orchestrated is left without an orchestrator.
    pub async fn delete_agent(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut agents = self.inner.agents.write().await;
            let before = agents.len();
            agents.retain(|a| a.id != id);
            agents.len() != before
        };
        if !removed {
            return Ok(false);
        }

        {
            let mut teams = self.inner.teams.write().await;
            for team in teams.iter_mut() {
                let mut changed = false;
                if team.assistant_ids.iter().any(|a| a == id) {
                    team.assistant_ids.retain(|a| a != id);
                    changed = true;
                }
                if team.orchestrator_id.as_deref() == Some(id) {
                    team.orchestrator_id = None;
                    changed = true;
                }
                if changed {
                    team.updated_at = Utc::now();
                    debug!("Removed agent {} from team {}", id, team.id);
                }
            }
        }

        self.persist_agents().await?;
        self.persist_teams().await?;
        self.emit(AgentServiceEvent::AgentsChanged);
        self.emit(AgentServiceEvent::TeamsChanged);

        info!("Deleted OpenAI agent {}", id);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Teams
    // ------------------------------------------------------------------

    pub async fn list_teams(&self) -> Vec<OpenAIAgentTeam> {
        self.inner.teams.read().await.clone()
    }

    pub async fn get_team(&self, id: &str) -> Option<OpenAIAgentTeam> {
        self.inner
            .teams
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn create_team(&self, request: CreateTeamRequest) -> Result<OpenAIAgentTeam> {
        let now = Utc::now();
        let team = OpenAIAgentTeam {
            id: Uuid::new_v4().to_string(),
            name: require_name(&request.name, "Team name")?,
            description: request.description.unwrap_or_default(),
            orchestrator_id: request.orchestrator_id.filter(|id| !id.is_empty()),
            assistant_ids: request.assistant_ids.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        self.inner.teams.write().await.push(team.clone());
        self.persist_teams().await?;
        self.emit(AgentServiceEvent::TeamsChanged);

        info!("Created team {} ({})", team.name, team.id);
        Ok(team)
    }

    pub async fn update_team(&self, id: &str, request: UpdateTeamRequest) -> Result<OpenAIAgentTeam> {
        let name = request
            .name
            .as_deref()
            .map(|n| require_name(n, "Team name"))
            .transpose()?;

        let updated = {
            let mut teams = self.inner.teams.write().await;
            let team = teams
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| Error::TeamNotFound(id.to_string()))?;

            if let Some(name) = name {
                team.name = name;
            }
            if let Some(description) = request.description {
                team.description = description;
            }
            if let Some(orchestrator_id) = request.orchestrator_id {
                team.orchestrator_id = Some(orchestrator_id).filter(|id| !id.is_empty());
            }
            if let Some(assistant_ids) = request.assistant_ids {
                team.assistant_ids = assistant_ids;
            }
            team.updated_at = Utc::now();
            team.clone()
        };

        self.persist_teams().await?;
        self.emit(AgentServiceEvent::TeamsChanged);
        Ok(updated)
    }

    /// Delete a team together with its runs
    pub async fn delete_team(&self, id: &str) -> Result<bool> {
        let removed = {
            let mut teams = self.inner.teams.write().await;
            let before = teams.len();
            teams.retain(|t| t.id != id);
            teams.len() != before
        };
        if !removed {
            return Ok(false);
        }

        self.inner.runs.write().await.retain(|r| r.team_id != id);

        self.persist_teams().await?;
        self.persist_runs().await?;
        self.emit(AgentServiceEvent::TeamsChanged);

        info!("Deleted team {}", id);
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Runs
    // ------------------------------------------------------------------

    pub async fn get_run(&self, id: &str) -> Option<OpenAIRunStatus> {
        self.inner
            .runs
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    /// List runs newest first, optionally for a single team
    pub async fn list_runs(&self, team_id: Option<&str>) -> Vec<OpenAIRunStatus> {
        let runs = self.inner.runs.read().await;
        let mut runs: Vec<OpenAIRunStatus> = runs
            .iter()
            .filter(|r| team_id.map_or(true, |t| r.team_id == t))
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        runs
    }

    /// Start a simulated run of a team.
    ///
    /// The team, its orchestrator and every assistant must exist. The run
    /// is returned in `queued`; progress arrives through [`Self::subscribe`].
    pub async fn run_agent_team(
        &self,
        team_id: &str,
        input: impl Into<String>,
    ) -> Result<OpenAIRunStatus> {
        let input = input.into();
        if input.trim().is_empty() {
            return Err(Error::InvalidInput("Run input cannot be empty".to_string()));
        }

        let team = self
            .get_team(team_id)
            .await
            .ok_or_else(|| Error::TeamNotFound(team_id.to_string()))?;
        let orchestrator_id = team.orchestrator_id.as_deref().ok_or_else(|| {
            Error::InvalidInput(format!("Team {} has no orchestrator", team.name))
        })?;

        {
            let agents = self.inner.agents.read().await;
            let exists = |id: &str| agents.iter().any(|a| a.id == id);

            if !exists(orchestrator_id) {
                return Err(Error::AgentNotFound(orchestrator_id.to_string()));
            }
            if let Some(missing) = team.assistant_ids.iter().find(|id| !exists(id.as_str())) {
                return Err(Error::AgentNotFound(missing.clone()));
            }
        }

        let run = OpenAIRunStatus::queued(&team.id, input);
        self.inner.runs.write().await.push(run.clone());
        self.persist_runs().await?;
        self.emit(AgentServiceEvent::RunUpdated { run: run.clone() });

        info!("Queued run {} for team {}", run.id, team.name);
        self.spawn_simulation(run.id.clone());
        Ok(run)
    }

    fn spawn_simulation(&self, run_id: String) {
        let service = self.clone();
        tokio::spawn(async move { service.simulate_run(&run_id).await });
    }

    /// Walk a run through its timeline.
    ///
    /// Storage failures are logged and never stop the run short of a
    /// terminal state.
    async fn simulate_run(&self, run_id: &str) {
        let timeline = self.inner.simulation.sample();

        tokio::time::sleep(timeline.queue_delay).await;
        let started = self
            .update_run(run_id, |run| {
                if run.status == RunState::Queued {
                    run.mark_in_progress();
                }
            })
            .await;
        if started.is_none() {
            debug!("Run {} disappeared while queued", run_id);
            return;
        }

        tokio::time::sleep(timeline.processing_delay).await;

        let Some(run) = self.get_run(run_id).await else {
            debug!("Run {} disappeared while in progress", run_id);
            return;
        };
        let outcome = self.build_outcome(&run, timeline.fails).await;

        let finished = self
            .update_run(run_id, |run| match &outcome {
                Ok(response) => run.mark_completed(response.clone()),
                Err(error) => run.mark_failed(error.clone()),
            })
            .await;

        if let Some(run) = finished {
            info!("Run {} finished as {}", run.id, run.status.as_str());
            if run.status == RunState::Completed {
                if let Err(e) = self.record_orchestrator_memory(&run).await {
                    warn!("Failed to record orchestrator memory for run {}: {}", run.id, e);
                }
            }
        }
    }

    /// Produce the response text, or the failure reason, for a finished run
    async fn build_outcome(
        &self,
        run: &OpenAIRunStatus,
        fails: bool,
    ) -> std::result::Result<String, String> {
        let Some(team) = self.get_team(&run.team_id).await else {
            return Err(format!("Team {} no longer exists", run.team_id));
        };

        let agents = self.inner.agents.read().await;
        let name_of = |id: &str| {
            agents
                .iter()
                .find(|a| a.id == id)
                .map(|a| a.name.clone())
        };

        let Some(orchestrator) = team.orchestrator_id.as_deref().and_then(name_of) else {
            return Err(format!("Team {} lost its orchestrator during the run", team.name));
        };

        if fails {
            return Err(format!(
                "Orchestrator {} could not complete the request",
                orchestrator
            ));
        }

        let assistants: Vec<String> = team
            .assistant_ids
            .iter()
            .filter_map(|id| name_of(id.as_str()))
            .collect();

        Ok(render_response(&team.name, &orchestrator, &assistants, &run.input))
    }

    /// Apply `apply` to a run in memory, then persist and broadcast it.
    ///
    /// A failed write is logged; the in-memory state stays authoritative
    /// and the next successful write catches storage up.
    async fn update_run<F>(&self, run_id: &str, apply: F) -> Option<OpenAIRunStatus>
    where
        F: FnOnce(&mut OpenAIRunStatus),
    {
        let updated = {
            let mut runs = self.inner.runs.write().await;
            runs.iter_mut().find(|r| r.id == run_id).map(|run| {
                apply(run);
                run.clone()
            })
        };

        if let Some(run) = &updated {
            if let Err(e) = self.persist_runs().await {
                warn!("Failed to persist run {}: {}", run.id, e);
            }
            self.emit(AgentServiceEvent::RunUpdated { run: run.clone() });
        }
        updated
    }

    async fn record_orchestrator_memory(&self, run: &OpenAIRunStatus) -> Result<()> {
        let Some(orchestrator_id) = self
            .get_team(&run.team_id)
            .await
            .and_then(|t| t.orchestrator_id)
        else {
            return Ok(());
        };

        let notification = OrchestratorNotification {
            team_id: run.team_id.clone(),
            run_id: run.id.clone(),
            orchestrator_id,
            message: format!("Stored run summary for \"{}\"", preview(&run.input, 60)),
            timestamp: Utc::now(),
        };

        self.inner
            .storage
            .set(keys::ORCHESTRATOR_NOTIFICATION, &notification)
            .await?;
        self.emit(AgentServiceEvent::OrchestratorMemory { notification });
        Ok(())
    }

    /// Most recent orchestrator memory notification, if any
    pub async fn latest_notification(&self) -> Result<Option<OrchestratorNotification>> {
        self.inner.storage.get(keys::ORCHESTRATOR_NOTIFICATION).await
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

fn render_response(team: &str, orchestrator: &str, assistants: &[String], input: &str) -> String {
    let delegated = if assistants.is_empty() {
        "no assistants, handled directly".to_string()
    } else {
        assistants.join(", ")
    };

    format!(
        "🧠 {orchestrator} is analyzing the request for team {team}\n\
         📋 Delegating subtasks to: {delegated}\n\
         ⚙️ Assistants are working on: {input}\n\
         ✅ Results consolidated by {orchestrator}\n\
         \n\
         ## Summary\n\
         \n\
         Team **{team}** processed \"{input}\" with {count} assistant(s).",
        count = assistants.len(),
    )
}
