// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the failure monitor's pause / backoff / resume cycle.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Unavailable-service event received; every stage is being paused.
///
/// # Log Level
/// `warn!` - Transient failure being handled
pub struct BackoffStarted<'a> {
    pub stage_name: &'a str,
    pub stage_count: usize,
    pub backoff: std::time::Duration,
}

impl Display for BackoffStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' reported its service unavailable; pausing {} stages for {:?}",
            self.stage_name, self.stage_count, self.backoff
        )
    }
}

impl StructuredLog for BackoffStarted<'_> {
    fn log(&self) {
        tracing::warn!(
            stage_name = self.stage_name,
            stage_count = self.stage_count,
            backoff_ms = self.backoff.as_millis() as u64,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "backoff",
            span_name = name,
            stage_name = self.stage_name,
        )
    }
}

/// Backoff elapsed and every stage was resumed.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StagesResumed {
    pub stage_count: usize,
}

impl Display for StagesResumed {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Backoff elapsed; resumed {} stages", self.stage_count)
    }
}

impl StructuredLog for StagesResumed {
    fn log(&self) {
        tracing::info!(stage_count = self.stage_count, "{}", self);
    }
}

/// The monitor fell behind the event bus and missed events.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct EventsLagged {
    pub skipped: u64,
}

impl Display for EventsLagged {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Failure monitor skipped {} unavailable-service events", self.skipped)
    }
}

impl StructuredLog for EventsLagged {
    fn log(&self) {
        tracing::warn!(skipped = self.skipped, "{}", self);
    }
}
