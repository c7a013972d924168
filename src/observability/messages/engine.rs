// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for orchestrator and pipeline lifecycle events.

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Pipeline built and about to spawn its workers.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::engine::PipelineStarting;
///
/// let msg = PipelineStarting {
///     stage_count: 3,
///     link_count: 2,
/// };
///
/// assert_eq!(msg.to_string(), "Starting pipeline: 3 stages, 2 links");
/// ```
pub struct PipelineStarting {
    pub stage_count: usize,
    pub link_count: usize,
}

impl Display for PipelineStarting {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Starting pipeline: {} stages, {} links",
            self.stage_count, self.link_count
        )
    }
}

impl StructuredLog for PipelineStarting {
    fn log(&self) {
        tracing::info!(
            stage_count = self.stage_count,
            link_count = self.link_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "pipeline",
            span_name = name,
            stage_count = self.stage_count,
            link_count = self.link_count,
        )
    }
}

/// A link was created for an edge and bound to both of its stages.
///
/// # Log Level
/// `debug!` - Wiring detail
pub struct LinkBound<'a> {
    pub from: &'a str,
    pub source_key: &'a str,
    pub to: &'a str,
    pub target_key: &'a str,
}

impl Display for LinkBound<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Bound link {}[{}] -> {}[{}]",
            self.from,
            display_key(self.source_key),
            self.to,
            display_key(self.target_key)
        )
    }
}

fn display_key(key: &str) -> &str {
    if key.is_empty() {
        "*"
    } else {
        key
    }
}

impl StructuredLog for LinkBound<'_> {
    fn log(&self) {
        tracing::debug!(
            from = self.from,
            source_key = self.source_key,
            to = self.to,
            target_key = self.target_key,
            "{}", self
        );
    }
}

/// Every worker has exited.
///
/// # Log Level
/// `info!` - Important operational event
pub struct PipelineStopped {
    pub stage_count: usize,
    pub duration: std::time::Duration,
}

impl Display for PipelineStopped {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Pipeline stopped: {} stages ran for {:?}",
            self.stage_count, self.duration
        )
    }
}

impl StructuredLog for PipelineStopped {
    fn log(&self) {
        tracing::info!(
            stage_count = self.stage_count,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A worker task ended abnormally (panicked or was aborted).
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct WorkerJoinFailed<'a> {
    pub stage_name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for WorkerJoinFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Worker for stage '{}' ended abnormally: {}",
            self.stage_name, self.error
        )
    }
}

impl StructuredLog for WorkerJoinFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stage_name = self.stage_name,
            error = %self.error,
            "{}", self
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_bound_marks_whole_message_keys() {
        let msg = LinkBound {
            from: "camera",
            source_key: "",
            to: "detector",
            target_key: "frame",
        };

        assert_eq!(msg.to_string(), "Bound link camera[*] -> detector[frame]");
    }
}
