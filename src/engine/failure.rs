// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! What happens when a stage cannot go on.
//!
//! Remote failures fall in two classes. An unreachable endpoint is transient:
//! the stage pauses, reports it on the event bus, and the failure monitor
//! resumes everything after a backoff. Anything else is fatal for the whole
//! process; there is no attempt to unwind sibling stages.

use std::sync::Arc;

use crate::errors::StageError;

/// A failure no stage can recover from.
#[derive(Debug)]
pub struct FatalFailure {
    pub stage_name: String,
    pub error: StageError,
}

/// Invoked once per fatal failure. If it returns, the failing stage finishes.
pub type FatalHandler = Arc<dyn Fn(&FatalFailure) + Send + Sync>;

/// The production handler: terminate the process immediately.
pub fn abort_process() -> FatalHandler {
    Arc::new(|failure: &FatalFailure| {
        tracing::error!(
            stage_name = %failure.stage_name,
            error = %failure.error,
            "Terminating process after fatal stage failure"
        );
        std::process::exit(1);
    })
}
