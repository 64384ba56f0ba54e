//! Chat session
//!
//! A [`Session`] composes the document registry, the conversation, the
//! upload simulator and the outbound collaborators. Timer ticks and
//! agent replies arrive as [`SessionEvent`]s on channels; the owner pulls
//! them with [`Session::next_event`] and applies them one at a time with
//! [`Session::handle_event`], so every mutation happens on one task.

use crate::agent::{AgentClient, AgentReply};
use crate::config::{ChatConfig, Config};
use crate::conversation::{ChatMessage, Conversation, QueryState, QueryTicket};
use crate::documents::{
    DeleteConfirmation, DocId, Document, DocumentRegistry, DocumentStore, UploadEvent,
    UploadFile, UploadSimulator,
};
use crate::error::Result;
use crate::render::{CitationDetail, SearchResponse};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Something that happened outside the session loop
#[derive(Debug)]
pub enum SessionEvent {
    Upload(UploadEvent),
    QueryFinished {
        ticket: QueryTicket,
        outcome: Result<AgentReply>,
    },
}

/// Result of a query submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The query was accepted and one request is in flight
    Sent(QueryTicket),
    /// Blank input
    Blank,
    /// Another query is still in flight
    Busy,
    /// No documents have been uploaded yet
    NoDocuments,
}

/// Visible effect of a handled event
#[derive(Debug, Clone)]
pub enum SessionUpdate {
    UploadProgress {
        id: DocId,
        name: String,
        progress: u8,
    },
    UploadCompleted(Document),
    AgentMessage(ChatMessage),
    /// The event no longer applied (cancelled query, removed upload)
    Ignored,
}

/// Interactive session state
pub struct Session {
    chat: ChatConfig,
    registry: DocumentRegistry,
    conversation: Conversation,
    simulator: UploadSimulator,
    agent: Arc<dyn AgentClient>,
    store: Arc<dyn DocumentStore>,
    upload_rx: mpsc::UnboundedReceiver<UploadEvent>,
    query_tx: mpsc::UnboundedSender<(QueryTicket, Result<AgentReply>)>,
    query_rx: mpsc::UnboundedReceiver<(QueryTicket, Result<AgentReply>)>,
    query_task: Option<JoinHandle<()>>,
}

impl Session {
    pub fn new(
        config: &Config,
        agent: Arc<dyn AgentClient>,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        let (upload_tx, upload_rx) = mpsc::unbounded_channel();
        let (query_tx, query_rx) = mpsc::unbounded_channel();

        Self {
            chat: config.chat.clone(),
            registry: DocumentRegistry::new(),
            conversation: Conversation::new(),
            simulator: UploadSimulator::new(config.upload.clone(), upload_tx),
            agent,
            store,
            upload_rx,
            query_tx,
            query_rx,
            query_task: None,
        }
    }

    pub fn registry(&self) -> &DocumentRegistry {
        &self.registry
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    /// Maximum number of follow-up suggestions shown per answer
    pub fn follow_up_limit(&self) -> usize {
        self.chat.follow_up_limit
    }

    /// Number of upload timers still running
    pub fn active_uploads(&self) -> usize {
        self.simulator.active()
    }

    /// Start simulated processing for every PDF in `files`
    ///
    /// Non-PDF files are dropped. Returns the ids of the accepted uploads.
    pub fn upload_files(&mut self, files: Vec<UploadFile>) -> Vec<DocId> {
        let ids = self.registry.begin_uploads(files);
        for id in &ids {
            self.simulator.start(id.clone());
        }
        ids
    }

    /// Submit a query to the agent
    ///
    /// The user message is appended before this returns; the reply
    /// arrives later as [`SessionEvent::QueryFinished`].
    pub fn submit_query(&mut self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            return SubmitOutcome::Blank;
        }
        if self.conversation.is_pending() {
            return SubmitOutcome::Busy;
        }
        if self.chat.require_documents && self.registry.is_empty() {
            tracing::debug!("Query refused: no documents uploaded");
            return SubmitOutcome::NoDocuments;
        }

        let Some(pending) = self.conversation.begin_query(text) else {
            return SubmitOutcome::Blank;
        };

        let agent = Arc::clone(&self.agent);
        let tx = self.query_tx.clone();
        let ticket = pending.ticket;
        self.query_task = Some(tokio::spawn(async move {
            let outcome = agent.query(&pending.message).await;
            if tx.send((pending.ticket, outcome)).is_err() {
                tracing::debug!(ticket = ?pending.ticket, "Session closed before reply arrived");
            }
        }));

        SubmitOutcome::Sent(ticket)
    }

    /// Wait for the next upload tick or agent reply
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        tokio::select! {
            Some(event) = self.upload_rx.recv() => Some(SessionEvent::Upload(event)),
            Some((ticket, outcome)) = self.query_rx.recv() => {
                Some(SessionEvent::QueryFinished { ticket, outcome })
            }
            else => None,
        }
    }

    /// Apply one event to the session state
    pub fn handle_event(&mut self, event: SessionEvent) -> SessionUpdate {
        match event {
            SessionEvent::Upload(UploadEvent::Progress { id, increment }) => {
                match self.registry.advance_upload(&id, increment) {
                    Some(progress) => {
                        let name = self
                            .registry
                            .uploads()
                            .iter()
                            .find(|u| u.id == id)
                            .map(|u| u.name.clone())
                            .unwrap_or_default();
                        SessionUpdate::UploadProgress { id, name, progress }
                    }
                    None => SessionUpdate::Ignored,
                }
            }
            SessionEvent::Upload(UploadEvent::Completed { id, pages }) => {
                self.simulator.finish(&id);
                match self.registry.complete_upload(&id, pages) {
                    Some(document) => SessionUpdate::UploadCompleted(document.clone()),
                    None => SessionUpdate::Ignored,
                }
            }
            SessionEvent::QueryFinished { ticket, outcome } => {
                if self.conversation.state() == QueryState::Pending(ticket) {
                    self.query_task = None;
                }
                match self.conversation.finish_query(ticket, outcome) {
                    Some(message) => SessionUpdate::AgentMessage(message.clone()),
                    None => SessionUpdate::Ignored,
                }
            }
        }
    }

    /// Abandon the in-flight query; returns `false` when none was pending
    pub fn cancel_query(&mut self) -> bool {
        if let Some(task) = self.query_task.take() {
            task.abort();
        }
        self.conversation.cancel_pending()
    }

    /// Ask to delete the document at a 1-based position or with an id
    pub fn request_delete(&mut self, key: &str) -> Option<DeleteConfirmation> {
        let id = self.registry.lookup(key)?.id.clone();
        self.registry.request_delete(&id)
    }

    /// Delete the document named by the pending request
    ///
    /// The backend store is called first; the registry changes only when
    /// it succeeds. Returns `Ok(None)` when no delete was requested.
    ///
    /// # Errors
    ///
    /// Returns error if the document store rejects the delete; the request
    /// stays pending
    pub async fn confirm_delete(&mut self) -> Result<Option<Document>> {
        let Some(confirmation) = self.registry.pending_delete().cloned() else {
            return Ok(None);
        };

        self.store.delete(confirmation.id()).await?;
        Ok(self.registry.confirm_delete(&confirmation))
    }

    pub fn cancel_delete(&mut self) -> bool {
        self.registry.cancel_delete()
    }

    /// Structured response of the latest agent message
    pub fn last_response(&self) -> Option<&SearchResponse> {
        self.conversation.last_response()
    }

    /// Copy the n-th (1-based) displayed follow-up into the draft input
    pub fn select_follow_up(&mut self, n: usize) -> Option<String> {
        let index = n.checked_sub(1)?;
        let suggestion = self
            .conversation
            .last_response()?
            .follow_ups(self.chat.follow_up_limit)
            .get(index)?
            .clone();
        self.conversation.select_follow_up(&suggestion);
        Some(suggestion)
    }

    /// Take the draft input left by [`Session::select_follow_up`]
    pub fn take_draft(&mut self) -> String {
        self.conversation.take_input()
    }

    /// Detail view for the n-th (1-based) citation of the latest answer
    pub fn citation_detail(&self, n: usize) -> Option<CitationDetail> {
        self.conversation
            .last_response()?
            .citation_detail(n.checked_sub(1)?)
    }

    /// Clear the message history
    pub fn clear(&mut self) {
        self.conversation.clear();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if let Some(task) = self.query_task.take() {
            task.abort();
        }
    }
}
