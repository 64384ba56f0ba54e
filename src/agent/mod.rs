//! Agent module for docquery
//!
//! This module contains the client abstraction for the remote
//! document-search agent, its HTTP implementation, the wire codec,
//! and an in-process fake used by tests.

pub mod fake;
pub mod http;
pub mod wire;

pub use fake::{FakeAgentClient, FakeAgentGate};
pub use http::HttpAgentClient;
pub use wire::{AgentReply, RawCitation, RawMetadata, RawSearchResponse};

use crate::config::AgentConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Outbound collaborator that answers natural-language queries
///
/// A single call corresponds to exactly one request. Implementations
/// never retry on their own.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Send a query and decode the agent's reply
    ///
    /// # Errors
    ///
    /// Returns error on transport failure, non-success status, or an
    /// undecodable payload.
    async fn query(&self, message: &str) -> Result<AgentReply>;
}

/// Create the agent client described by the configuration
///
/// # Errors
///
/// Returns error if the HTTP client cannot be built
pub fn create_agent_client(config: &AgentConfig) -> Result<Arc<dyn AgentClient>> {
    Ok(Arc::new(HttpAgentClient::new(config.clone())?))
}
