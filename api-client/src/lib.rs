//! Inventu API client
//!
//! A thin HTTP wrapper used by the chat UI: base URL resolution, default
//! headers, bearer-token injection, and the signed-in user session, all
//! persisted in local storage.

mod client;
mod config;
mod error;
mod session;

pub use client::{ApiService, HealthStatus, ToolResponse};
pub use config::{ApiConfig, BASE_URL_ENV, DEFAULT_BASE_URL};
pub use error::{ApiError, Result};
pub use session::{Session, User, UserRole};
