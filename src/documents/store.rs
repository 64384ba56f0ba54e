//! Document store backing deletion
//!
//! The registry only tracks metadata; removing a document from the
//! backend goes through a [`DocumentStore`]. Without a configured
//! documents endpoint the local store accepts every delete.

use crate::config::AgentConfig;
use crate::documents::DocId;
use crate::error::{DocQueryError, Result};

use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Backend that owns stored documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Delete a document from the backend
    ///
    /// # Errors
    ///
    /// Returns error when the backend rejects or cannot be reached
    async fn delete(&self, id: &DocId) -> Result<()>;
}

/// Store with no backend; every delete succeeds
#[derive(Debug, Default, Clone)]
pub struct LocalDocumentStore;

#[async_trait]
impl DocumentStore for LocalDocumentStore {
    async fn delete(&self, id: &DocId) -> Result<()> {
        tracing::debug!(id = %id, "Local store delete");
        Ok(())
    }
}

/// Store that issues `DELETE {base}/documents/{id}`
pub struct HttpDocumentStore {
    client: Client,
    base: Url,
}

impl HttpDocumentStore {
    /// Create a store rooted at `base`
    ///
    /// # Errors
    ///
    /// Returns error if `base` is not a valid URL or the HTTP client
    /// cannot be built
    pub fn new(base: &str, timeout_seconds: Option<u64>) -> Result<Self> {
        let base = Url::parse(base).map_err(|e| {
            DocQueryError::Config(format!("Invalid documents endpoint {}: {}", base, e))
        })?;

        let mut builder =
            Client::builder().user_agent(concat!("docquery/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| {
            DocQueryError::DocumentStore(format!("Failed to create HTTP client: {}", e))
        })?;

        Ok(Self { client, base })
    }

    /// URL a delete for `id` is sent to
    ///
    /// # Errors
    ///
    /// Returns error if the base URL cannot carry path segments
    pub fn document_url(&self, id: &DocId) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| {
                DocQueryError::DocumentStore(format!("{} cannot be a base URL", self.base))
            })?
            .pop_if_empty()
            .push("documents")
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn delete(&self, id: &DocId) -> Result<()> {
        let url = self.document_url(id)?;
        tracing::debug!("Deleting document: {}", url);

        let response = self.client.delete(url).send().await.map_err(|e| {
            DocQueryError::DocumentStore(format!("Failed to reach document store: {}", e))
        })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Document store returned error {}: {}", status, error_text);
            return Err(DocQueryError::DocumentStore(format!(
                "Document store returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        Ok(())
    }
}

/// Create the store described by the configuration
///
/// # Errors
///
/// Returns error if the configured documents endpoint is unusable
pub fn create_document_store(config: &AgentConfig) -> Result<Arc<dyn DocumentStore>> {
    match &config.documents_endpoint {
        Some(endpoint) => {
            tracing::info!("Using document store at {}", endpoint);
            Ok(Arc::new(HttpDocumentStore::new(
                endpoint,
                config.timeout_seconds,
            )?))
        }
        None => Ok(Arc::new(LocalDocumentStore)),
    }
}
