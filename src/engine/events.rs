// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use tokio::sync::broadcast;

use crate::config::consts::DEFAULT_EVENT_CAPACITY;

/// A stage's remote endpoint is transiently unreachable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnavailableServiceEvent {
    pub stage_name: String,
}

impl UnavailableServiceEvent {
    pub fn new(stage_name: impl Into<String>) -> Self {
        Self {
            stage_name: stage_name.into(),
        }
    }
}

/// Broadcast channel for unavailable-service events.
/// Handed to every stage and to the failure monitor at construction.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UnavailableServiceEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn publish(&self, event: UnavailableServiceEvent) {
        // No subscribers is fine: nobody is supervising this run.
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UnavailableServiceEvent> {
        self.tx.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
