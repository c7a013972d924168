// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for stage workers, their lifecycle, and their remote calls.
//!
//! This module contains message types for logging events related to:
//! * Worker start and exit
//! * Pause / resume / finish transitions
//! * Remote call outcomes and failure classification
//! * Stale values dropped by links

use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Worker task started for a stage.
///
/// # Log Level
/// `info!` - Important operational event
///
/// The span produced by this message is attached to the whole worker task, so
/// every line the worker logs carries the stage name.
pub struct StageWorkerStarted<'a> {
    pub stage_name: &'a str,
    pub kind: &'a str,
    pub input: &'a str,
    pub output: &'a str,
}

impl Display for StageWorkerStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' started: kind={}, input={}, output={}",
            self.stage_name, self.kind, self.input, self.output
        )
    }
}

impl StructuredLog for StageWorkerStarted<'_> {
    fn log(&self) {
        tracing::info!(
            stage_name = self.stage_name,
            kind = self.kind,
            input = self.input,
            output = self.output,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "stage",
            span_name = name,
            stage_name = self.stage_name,
            kind = self.kind,
        )
    }
}

/// Worker loop exited because the stage finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct StageWorkerStopped<'a> {
    pub stage_name: &'a str,
    pub iterations: u64,
}

impl Display for StageWorkerStopped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' stopped after {} iterations",
            self.stage_name, self.iterations
        )
    }
}

impl StructuredLog for StageWorkerStopped<'_> {
    fn log(&self) {
        tracing::info!(
            stage_name = self.stage_name,
            iterations = self.iterations,
            "{}", self
        );
    }
}

/// Lifecycle flag changed.
///
/// # Log Level
/// `debug!` - Routine state change
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::stage::LifecycleChanged;
///
/// let msg = LifecycleChanged {
///     stage_name: "detector",
///     from: "running",
///     to: "paused",
/// };
///
/// assert_eq!(msg.to_string(), "Stage 'detector' running -> paused");
/// ```
pub struct LifecycleChanged<'a> {
    pub stage_name: &'a str,
    pub from: &'a str,
    pub to: &'a str,
}

impl Display for LifecycleChanged<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' {} -> {}", self.stage_name, self.from, self.to)
    }
}

impl StructuredLog for LifecycleChanged<'_> {
    fn log(&self) {
        tracing::debug!(
            stage_name = self.stage_name,
            from = self.from,
            to = self.to,
            "{}", self
        );
    }
}

/// Pause or resume requested on a stage that has already finished.
///
/// # Log Level
/// `warn!` - Potential issue or degraded behavior
pub struct UnexpectedLifecycleRequest<'a> {
    pub stage_name: &'a str,
    pub request: &'a str,
    pub state: &'a str,
}

impl Display for UnexpectedLifecycleRequest<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Ignoring {} request for stage '{}' in state {}",
            self.request, self.stage_name, self.state
        )
    }
}

impl StructuredLog for UnexpectedLifecycleRequest<'_> {
    fn log(&self) {
        tracing::warn!(
            stage_name = self.stage_name,
            request = self.request,
            state = self.state,
            "{}", self
        );
    }
}

/// A blocking wait was interrupted; the stage parks itself.
///
/// # Log Level
/// `info!` - Important operational event
pub struct WaitInterrupted<'a> {
    pub stage_name: &'a str,
}

impl Display for WaitInterrupted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' interrupted, pausing", self.stage_name)
    }
}

impl StructuredLog for WaitInterrupted<'_> {
    fn log(&self) {
        tracing::info!(stage_name = self.stage_name, "{}", self);
    }
}

/// Remote call returned successfully.
///
/// # Log Level
/// `debug!` - Per-message detail
pub struct RemoteCallCompleted<'a> {
    pub stage_name: &'a str,
    pub sequence_id: u64,
    pub request_size: usize,
    pub response_size: usize,
    pub duration: std::time::Duration,
}

impl Display for RemoteCallCompleted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' call #{} completed: request={} bytes, response={} bytes, duration={:?}",
            self.stage_name, self.sequence_id, self.request_size, self.response_size, self.duration
        )
    }
}

impl StructuredLog for RemoteCallCompleted<'_> {
    fn log(&self) {
        tracing::debug!(
            stage_name = self.stage_name,
            sequence_id = self.sequence_id,
            request_size = self.request_size,
            response_size = self.response_size,
            duration_us = self.duration.as_micros() as u64,
            "{}", self
        );
    }
}

/// Remote endpoint is unreachable; the stage pauses and reports it.
///
/// # Log Level
/// `warn!` - Transient failure, recovered by the failure monitor
pub struct RemoteServiceUnavailable<'a> {
    pub stage_name: &'a str,
    pub status: &'a tonic::Status,
}

impl Display for RemoteServiceUnavailable<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Stage '{}' remote service unavailable: {}",
            self.stage_name,
            self.status.message()
        )
    }
}

impl StructuredLog for RemoteServiceUnavailable<'_> {
    fn log(&self) {
        tracing::warn!(
            stage_name = self.stage_name,
            code = ?self.status.code(),
            "{}", self
        );
    }
}

/// Unrecoverable stage failure.
///
/// # Log Level
/// `error!` - Failure requiring attention
///
/// # Example
/// ```
/// use the_switchyard::observability::messages::stage::StageFailed;
///
/// let error = std::io::Error::new(std::io::ErrorKind::Other, "boom");
/// let msg = StageFailed {
///     stage_name: "detector",
///     error: &error,
/// };
///
/// assert_eq!(msg.to_string(), "Stage 'detector' failed fatally: boom");
/// ```
pub struct StageFailed<'a> {
    pub stage_name: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for StageFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Stage '{}' failed fatally: {}", self.stage_name, self.error)
    }
}

impl StructuredLog for StageFailed<'_> {
    fn log(&self) {
        tracing::error!(
            stage_name = self.stage_name,
            error = %self.error,
            "{}", self
        );
    }
}

/// A link overwrote a value nobody consumed, or a consumer skipped a value
/// below its floor.
///
/// # Log Level
/// `trace!` - Expected under load
pub struct StaleStateDiscarded<'a> {
    pub link: &'a str,
    pub sequence_id: u64,
}

impl Display for StaleStateDiscarded<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Link '{}' discarded stale state #{}",
            self.link, self.sequence_id
        )
    }
}

impl StructuredLog for StaleStateDiscarded<'_> {
    fn log(&self) {
        tracing::trace!(link = self.link, sequence_id = self.sequence_id, "{}", self);
    }
}
