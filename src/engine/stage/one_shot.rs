// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use super::worker::{CallOutcome, StageWorker};

/// Single unary call fed by a source, then finished.
///
/// An unreachable endpoint is not retried: the stage stays paused until the
/// monitor resumes it (or someone finishes it) and then ends.
pub(super) async fn run(worker: &mut StageWorker) {
    if !worker.checkpoint().await {
        return;
    }
    let cancel = worker.lifecycle.cancellation();
    let Some(input) = worker.input.next(&cancel).await else {
        return;
    };
    worker.iterations += 1;

    if let CallOutcome::Unavailable = worker.call_unary(input).await {
        worker.lifecycle.wait_while_paused().await;
    }
}
