// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `engine` - orchestrator and pipeline lifecycle events
//! * `stage` - stage worker, lifecycle, and remote call events
//! * `monitor` - failure monitor backoff and recovery events
//! * `validation` - topology validation failures

use tracing::Span;

pub mod engine;
pub mod monitor;
pub mod stage;
pub mod validation;

/// A log message that knows its own level and structured fields.
pub trait StructuredLog {
    /// Emit the message at its level with its structured fields attached.
    fn log(&self);

    /// A span carrying the same fields, for instrumenting work done on
    /// behalf of the message's subject.
    fn span(&self, name: &str) -> Span {
        tracing::debug_span!("switchyard", span_name = name)
    }
}
