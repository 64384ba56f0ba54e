//! In-process fake agent for unit and integration tests
//!
//! [`FakeAgentClient`] records every query it receives and answers from a
//! scripted queue. A gated fake holds each query in flight until the test
//! releases it through the paired [`FakeAgentGate`], which makes it easy
//! to exercise the single-in-flight rule.
//!
//! # Example
//!
//! ```
//! use docquery::agent::{AgentClient, AgentReply, FakeAgentClient};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let agent = FakeAgentClient::new();
//! agent.push_reply(Ok(AgentReply::NoDocuments));
//!
//! let reply = agent.query("hello").await.unwrap();
//! assert_eq!(reply, AgentReply::NoDocuments);
//! assert_eq!(agent.requests(), vec!["hello".to_string()]);
//! # }
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Semaphore;

use crate::agent::{AgentClient, AgentReply};
use crate::error::{DocQueryError, Result};

type ScriptedReply = Result<AgentReply>;

/// Scripted, recording agent client
#[derive(Clone, Default)]
pub struct FakeAgentClient {
    requests: Arc<Mutex<Vec<String>>>,
    replies: Arc<Mutex<VecDeque<ScriptedReply>>>,
    gate: Option<Arc<Semaphore>>,
}

/// Releases queries held by a gated [`FakeAgentClient`]
#[derive(Clone)]
pub struct FakeAgentGate {
    semaphore: Arc<Semaphore>,
}

impl FakeAgentGate {
    /// Let one held query proceed
    pub fn release(&self) {
        self.semaphore.add_permits(1);
    }
}

impl FakeAgentClient {
    /// Create a fake that answers immediately
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fake whose queries wait for [`FakeAgentGate::release`]
    pub fn gated() -> (Self, FakeAgentGate) {
        let semaphore = Arc::new(Semaphore::new(0));
        let client = Self {
            gate: Some(semaphore.clone()),
            ..Self::default()
        };
        (client, FakeAgentGate { semaphore })
    }

    /// Queue the reply for the next query
    pub fn push_reply(&self, reply: Result<AgentReply>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
    }

    /// Messages received so far, in order
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl AgentClient for FakeAgentClient {
    async fn query(&self, message: &str) -> Result<AgentReply> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(message.to_string());
        }

        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|e| DocQueryError::Agent(format!("Fake gate closed: {}", e)))?;
            permit.forget();
        }

        let next = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front());
        next.unwrap_or_else(|| {
            Err(DocQueryError::Agent("No scripted reply for fake agent".to_string()).into())
        })
    }
}
