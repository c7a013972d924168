// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::time::Instant;

use futures::StreamExt;

use super::worker::{CallOutcome, StageWorker};
use crate::engine::SequenceState;
use crate::observability::messages::stage::RemoteCallCompleted;
use crate::observability::messages::StructuredLog;

/// Continuous server-streaming loop.
///
/// Each generated input opens one stream. Every response gets the next id of
/// a stage-wide counter and is dispatched as it arrives; the next stream is
/// only opened once the current one completes. Finishing the stage does not
/// cut a stream short; it is read to the end and the finish is seen at the
/// next checkpoint.
pub(super) async fn run(worker: &mut StageWorker) {
    let mut next_id: u64 = 0;

    while worker.checkpoint().await {
        let cancel = worker.lifecycle.cancellation();
        let Some(request) = worker.input.next(&cancel).await else {
            continue;
        };
        worker.iterations += 1;
        let request_size = request.message().encoded_len();

        let mut stream = match worker
            .method
            .invoke_server_streaming(request.into_message())
            .await
        {
            Ok(stream) => stream,
            Err(status) => match worker.handle_failure(status) {
                CallOutcome::Fatal => break,
                _ => continue,
            },
        };

        let mut started = Instant::now();
        while let Some(item) = stream.next().await {
            let response = match item {
                Ok(response) => response,
                Err(status) => {
                    if let CallOutcome::Fatal = worker.handle_failure(status) {
                        return;
                    }
                    break;
                }
            };

            RemoteCallCompleted {
                stage_name: &worker.name,
                sequence_id: next_id,
                request_size,
                response_size: response.encoded_len(),
                duration: started.elapsed(),
            }
            .log();
            started = Instant::now();

            let state = SequenceState::new(next_id, response);
            next_id += 1;
            if let CallOutcome::Fatal = worker.dispatch(state) {
                return;
            }
        }
    }
}
