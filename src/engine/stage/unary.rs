// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::worker::{CallOutcome, StageWorker};

/// Continuous unary loop: one request/response per input, until finished.
///
/// A wait cut short by cancellation yields no input; the next checkpoint
/// decides whether that was a finish or an interrupt.
pub(super) async fn run(worker: &mut StageWorker) {
    while worker.checkpoint().await {
        let cancel = worker.lifecycle.cancellation();
        let Some(input) = worker.input.next(&cancel).await else {
            continue;
        };
        worker.iterations += 1;

        if let CallOutcome::Fatal = worker.call_unary(input).await {
            break;
        }
    }
}
