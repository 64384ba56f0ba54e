//! HTTP agent client
//!
//! POSTs `{ message, agent_id }` to the configured endpoint and decodes
//! the reply envelope.

use crate::agent::wire::{self, AgentReply, AgentRequest};
use crate::agent::AgentClient;
use crate::config::AgentConfig;
use crate::error::{DocQueryError, Result};

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Agent client backed by `reqwest`
///
/// # Examples
///
/// ```
/// use docquery::agent::HttpAgentClient;
/// use docquery::config::AgentConfig;
///
/// let client = HttpAgentClient::new(AgentConfig::default());
/// assert!(client.is_ok());
/// ```
pub struct HttpAgentClient {
    client: Client,
    config: AgentConfig,
}

impl HttpAgentClient {
    /// Create a new client for the configured endpoint
    ///
    /// # Errors
    ///
    /// Returns error if HTTP client initialization fails
    pub fn new(config: AgentConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(concat!("docquery/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder
            .build()
            .map_err(|e| DocQueryError::Agent(format!("Failed to create HTTP client: {}", e)))?;

        tracing::info!(
            "Initialized agent client: endpoint={}, agent_id={}",
            config.endpoint,
            config.agent_id
        );

        Ok(Self { client, config })
    }

    /// Endpoint queries are sent to
    pub fn endpoint(&self) -> &str {
        &self.config.endpoint
    }
}

#[async_trait]
impl AgentClient for HttpAgentClient {
    async fn query(&self, message: &str) -> Result<AgentReply> {
        let request = AgentRequest {
            message,
            agent_id: &self.config.agent_id,
        };

        tracing::debug!("Sending query to agent: {}", self.config.endpoint);

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Failed to reach agent: {}", e);
                DocQueryError::Agent(format!("Failed to reach agent endpoint: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Agent returned error {}: {}", status, error_text);
            return Err(DocQueryError::Agent(format!(
                "Agent returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let body = response.text().await.map_err(|e| {
            tracing::error!("Failed to read agent response body: {}", e);
            DocQueryError::Agent(format!("Failed to read agent response: {}", e))
        })?;

        let reply = wire::decode_reply(&body)?;
        tracing::debug!(
            no_documents = matches!(reply, AgentReply::NoDocuments),
            "Agent reply decoded"
        );
        Ok(reply)
    }
}
