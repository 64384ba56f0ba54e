//! docquery - Chat with your PDF documents
//!
//! This library provides the core functionality for the docquery terminal
//! client: an in-session document registry fed by a simulated upload
//! pipeline, a conversation manager that serializes queries to a remote
//! document-search agent, and a renderer that turns the agent's loosely
//! typed replies into display-ready answers.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `agent`: Agent client trait, HTTP implementation and wire codec
//! - `conversation`: Message history and the single in-flight query guard
//! - `documents`: Document registry, upload simulator and document store
//! - `render`: Defaulted search responses and their view fragments
//! - `session`: Composition of the above driven by one event loop
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use docquery::agent::create_agent_client;
//! use docquery::conversation::Conversation;
//! use docquery::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let agent = create_agent_client(&config.agent)?;
//!     let mut conversation = Conversation::new();
//!     if let Some(message) = conversation
//!         .submit_query(agent.as_ref(), "What is the refund policy?")
//!         .await
//!     {
//!         println!("{}", message.content());
//!     }
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod cli;
pub mod commands;
pub mod config;
pub mod conversation;
pub mod documents;
pub mod error;
pub mod render;
pub mod session;

// Re-export commonly used types
pub use agent::{AgentClient, AgentReply};
pub use config::Config;
pub use conversation::{ChatMessage, Conversation, Role};
pub use documents::{DocId, Document, DocumentRegistry, UploadFile};
pub use error::{DocQueryError, Result};
pub use render::SearchResponse;
pub use session::Session;

#[cfg(test)]
pub mod test_utils;
