//! Admin catalog
//!
//! Agents, model providers and MCP tool integrations configured from the
//! admin dashboard.

mod model;
mod store;

pub use model::*;
pub use store::*;
