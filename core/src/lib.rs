//! Core library for the Inventu Super Agent backend
//!
//! This crate contains the domain logic shared by the server and client:
//! - Local key/value storage
//! - Admin catalog (agents, model providers, MCP tools)
//! - OpenAI agent team registry with simulated runs
//! - Processing-step segmentation for streamed answers

pub mod catalog;
pub mod error;
pub mod openai;
pub mod processing;
pub mod storage;

pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;
