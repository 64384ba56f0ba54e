//! Simulated upload processing
//!
//! Each started upload gets a recurring tokio interval that emits
//! [`UploadEvent::Progress`] with a random increment until the configured
//! processing time has elapsed, then one [`UploadEvent::Completed`] with
//! a random page count. Tasks are aborted when the upload finishes or
//! when the simulator is dropped.

use crate::config::UploadConfig;
use crate::documents::DocId;

use rand::Rng;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};

/// Event produced by a running upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEvent {
    Progress { id: DocId, increment: u8 },
    Completed { id: DocId, pages: u32 },
}

impl UploadEvent {
    pub fn id(&self) -> &DocId {
        match self {
            Self::Progress { id, .. } | Self::Completed { id, .. } => id,
        }
    }
}

/// Owns one timer task per upload in progress
pub struct UploadSimulator {
    config: UploadConfig,
    events: mpsc::UnboundedSender<UploadEvent>,
    tasks: HashMap<DocId, JoinHandle<()>>,
}

impl UploadSimulator {
    /// Create a simulator that reports on `events`
    pub fn new(config: UploadConfig, events: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self {
            config,
            events,
            tasks: HashMap::new(),
        }
    }

    /// Start the timer for an upload
    ///
    /// Must be called from within a tokio runtime. Starting an id that is
    /// already running replaces its timer.
    pub fn start(&mut self, id: DocId) {
        let tick = Duration::from_millis(self.config.tick_interval_ms);
        let processing = Duration::from_millis(self.config.processing_time_ms);
        let max_increment = self.config.max_increment.max(1);
        let pages = self.config.min_pages..=self.config.max_pages.max(self.config.min_pages);
        let events = self.events.clone();
        let task_id = id.clone();

        let handle = tokio::spawn(async move {
            let started = Instant::now();
            let mut ticker = interval(tick);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let event = if started.elapsed() >= processing {
                    UploadEvent::Completed {
                        id: task_id.clone(),
                        pages: rand::rng().random_range(pages.clone()),
                    }
                } else {
                    UploadEvent::Progress {
                        id: task_id.clone(),
                        increment: rand::rng().random_range(1..=max_increment),
                    }
                };
                let done = matches!(event, UploadEvent::Completed { .. });

                if events.send(event).is_err() {
                    tracing::debug!(id = %task_id, "Upload event receiver dropped");
                    break;
                }
                if done {
                    break;
                }
            }
        });

        tracing::debug!(id = %id, "Upload timer started");
        if let Some(previous) = self.tasks.insert(id, handle) {
            previous.abort();
        }
    }

    /// Stop and forget the timer for an upload
    ///
    /// Returns `false` when no timer was registered for `id`.
    pub fn finish(&mut self, id: &DocId) -> bool {
        match self.tasks.remove(id) {
            Some(handle) => {
                handle.abort();
                tracing::debug!(id = %id, "Upload timer stopped");
                true
            }
            None => false,
        }
    }

    /// Number of registered timers
    pub fn active(&self) -> usize {
        self.tasks.len()
    }

    /// Whether a timer is registered for `id`
    pub fn is_running(&self, id: &DocId) -> bool {
        self.tasks.contains_key(id)
    }
}

impl Drop for UploadSimulator {
    fn drop(&mut self) {
        for (_, handle) in self.tasks.drain() {
            handle.abort();
        }
    }
}
