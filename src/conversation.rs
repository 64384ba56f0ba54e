//! Conversation state management
//!
//! [`Conversation`] owns the ordered message history and the in-flight
//! guard. A query moves the state from `Idle` to `Pending` and back; a
//! second submission while `Pending` is rejected outright, never queued.

use crate::agent::{AgentClient, AgentReply};
use crate::error::Result;
use crate::render::{SearchResponse, QUERY_ERROR_MESSAGE};

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use ulid::Ulid;

/// Author of a chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Agent,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Agent => write!(f, "agent"),
        }
    }
}

/// One turn in the conversation
///
/// Fields are private: a message cannot change once it is appended.
#[derive(Debug, Clone)]
pub struct ChatMessage {
    id: Ulid,
    role: Role,
    content: String,
    response: Option<SearchResponse>,
    created_at: DateTime<Local>,
}

impl ChatMessage {
    fn new(role: Role, content: String, response: Option<SearchResponse>) -> Self {
        Self {
            id: Ulid::new(),
            role,
            content,
            response,
            created_at: Local::now(),
        }
    }

    fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content.into(), None)
    }

    fn agent(response: SearchResponse) -> Self {
        Self::new(Role::Agent, response.answer.clone(), Some(response))
    }

    fn agent_error() -> Self {
        Self::new(Role::Agent, QUERY_ERROR_MESSAGE.to_string(), None)
    }

    pub fn id(&self) -> Ulid {
        self.id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Structured response; only agent turns that parsed successfully have one
    pub fn response(&self) -> Option<&SearchResponse> {
        self.response.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Local> {
        self.created_at
    }

    /// Display timestamp, e.g. `14:05`
    pub fn timestamp(&self) -> String {
        self.created_at.format("%H:%M").to_string()
    }
}

/// Identifies one submitted query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QueryTicket(u64);

/// In-flight guard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryState {
    #[default]
    Idle,
    Pending(QueryTicket),
}

/// A query accepted by [`Conversation::begin_query`]
///
/// The caller issues exactly one outbound request for `message` and
/// reports the outcome with the ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub ticket: QueryTicket,
    pub message: String,
}

/// Ordered message history plus the single in-flight query guard
///
/// # Examples
///
/// ```
/// use docquery::conversation::Conversation;
///
/// let mut conversation = Conversation::new();
/// let pending = conversation.begin_query("What is the refund policy?").unwrap();
/// assert!(conversation.is_pending());
///
/// // A second submission while pending is ignored
/// assert!(conversation.begin_query("Another question").is_none());
/// assert_eq!(conversation.len(), 1);
/// # let _ = pending;
/// ```
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
    state: QueryState,
    next_ticket: u64,
    input: String,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn state(&self) -> QueryState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, QueryState::Pending(_))
    }

    /// Structured response of the latest agent message
    ///
    /// `None` when the latest agent turn was an error, even if an older
    /// answer had a response.
    pub fn last_response(&self) -> Option<&SearchResponse> {
        self.messages
            .iter()
            .rev()
            .find(|message| message.role == Role::Agent)?
            .response()
    }

    /// Accept a query for submission
    ///
    /// Returns `None` without touching any state when `text` is blank or
    /// another query is in flight. Otherwise appends the user message,
    /// moves to `Pending`, and returns the query to send.
    pub fn begin_query(&mut self, text: &str) -> Option<PendingQuery> {
        let message = text.trim();
        if message.is_empty() {
            return None;
        }
        if let QueryState::Pending(ticket) = self.state {
            tracing::debug!(?ticket, "Query ignored while another is in flight");
            return None;
        }

        self.next_ticket += 1;
        let ticket = QueryTicket(self.next_ticket);
        self.messages.push(ChatMessage::user(message));
        self.state = QueryState::Pending(ticket);
        self.input.clear();

        tracing::debug!(?ticket, "Query accepted");
        Some(PendingQuery {
            ticket,
            message: message.to_string(),
        })
    }

    /// Apply the outcome of an outbound query
    ///
    /// A reply becomes an agent message with a defaulted response; a
    /// failure becomes the fixed error message with no response. Either
    /// way the state returns to `Idle`. Outcomes whose ticket is no
    /// longer pending (cancelled) are discarded and `None` is returned.
    pub fn finish_query(
        &mut self,
        ticket: QueryTicket,
        outcome: Result<AgentReply>,
    ) -> Option<&ChatMessage> {
        if self.state != QueryState::Pending(ticket) {
            tracing::debug!(?ticket, "Discarding outcome for a query that is no longer pending");
            return None;
        }

        let message = match outcome {
            Ok(reply) => ChatMessage::agent(SearchResponse::from_reply(reply)),
            Err(e) => {
                tracing::warn!("Query failed: {:#}", e);
                ChatMessage::agent_error()
            }
        };

        self.messages.push(message);
        self.state = QueryState::Idle;
        self.messages.last()
    }

    /// Submit a query and wait for the agent, for callers without an event loop
    ///
    /// Returns the appended agent message, or `None` when the query was ignored.
    pub async fn submit_query(
        &mut self,
        client: &dyn AgentClient,
        text: &str,
    ) -> Option<&ChatMessage> {
        let pending = self.begin_query(text)?;
        let outcome = client.query(&pending.message).await;
        self.finish_query(pending.ticket, outcome)
    }

    /// Abandon the in-flight query and return to `Idle`
    ///
    /// Returns `false` when nothing was pending. A late reply for the
    /// cancelled ticket is discarded by [`Conversation::finish_query`].
    pub fn cancel_pending(&mut self) -> bool {
        match self.state {
            QueryState::Pending(ticket) => {
                tracing::info!(?ticket, "Query cancelled");
                self.state = QueryState::Idle;
                true
            }
            QueryState::Idle => false,
        }
    }

    /// Copy a follow-up suggestion into the draft input without submitting it
    pub fn select_follow_up(&mut self, suggestion: &str) {
        self.input = suggestion.to_string();
    }

    /// Current draft input
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Take the draft input, leaving it empty
    pub fn take_input(&mut self) -> String {
        std::mem::take(&mut self.input)
    }

    /// Remove every message; the in-flight guard is left as is
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
