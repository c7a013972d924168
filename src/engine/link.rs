// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Single-slot hand-off between exactly one producer and one consumer stage.
//!
//! A [`Link`] favors freshness over completeness: [`Link::put`] never waits,
//! it overwrites whatever the consumer has not picked up yet. A slow consumer
//! therefore always sees the most recent value and never builds a backlog.

use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::engine::SequenceState;
use crate::observability::messages::stage::StaleStateDiscarded;
use crate::observability::messages::StructuredLog;

pub struct Link {
    label: String,
    slot: Mutex<Option<SequenceState>>,
    filled: Notify,
}

impl Link {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            slot: Mutex::new(None),
            filled: Notify::new(),
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Store `state`, discarding any value still sitting in the slot.
    ///
    /// Returns the displaced value, if any.
    pub fn put(&self, state: SequenceState) -> Option<SequenceState> {
        let displaced = self.slot().replace(state);
        if let Some(stale) = &displaced {
            StaleStateDiscarded {
                link: &self.label,
                sequence_id: stale.id(),
            }
            .log();
        }
        self.filled.notify_one();
        displaced
    }

    /// Wait for a value and remove it from the slot.
    ///
    /// Returns `None` as soon as `cancel` fires.
    pub async fn take(&self, cancel: &CancellationToken) -> Option<SequenceState> {
        loop {
            if let Some(state) = self.slot().take() {
                return Some(state);
            }
            // notify_one leaves a permit behind when nobody is waiting, so a put
            // landing between the check above and this await is not lost.
            tokio::select! {
                _ = cancel.cancelled() => return None,
                _ = self.filled.notified() => {}
            }
        }
    }

    /// Take values until one satisfies `accept`, discarding the rest.
    ///
    /// Returns `None` as soon as `cancel` fires.
    pub async fn take_until<F>(
        &self,
        cancel: &CancellationToken,
        mut accept: F,
    ) -> Option<SequenceState>
    where
        F: FnMut(&SequenceState) -> bool,
    {
        loop {
            let state = self.take(cancel).await?;
            if accept(&state) {
                return Some(state);
            }
            StaleStateDiscarded {
                link: &self.label,
                sequence_id: state.id(),
            }
            .log();
        }
    }

    pub fn is_occupied(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> MutexGuard<'_, Option<SequenceState>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Link {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Link")
            .field("label", &self.label)
            .field("occupied", &self.is_occupied())
            .finish()
    }
}
