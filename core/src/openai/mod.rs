//! OpenAI agent teams
//!
//! A registry of assistants and teams whose runs are simulated locally:
//! nothing is sent to OpenAI.

mod model;
mod service;
mod simulation;

pub use model::*;
pub use service::OpenAIAgentService;
pub use simulation::SimulationConfig;
