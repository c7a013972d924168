// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;
use std::time::Instant;

use tokio::task::JoinHandle;
use tonic::Status;
use tracing::Instrument;

use super::{one_shot, streaming, unary, StageKind};
use crate::engine::events::{EventBus, UnavailableServiceEvent};
use crate::engine::failure::{FatalFailure, FatalHandler};
use crate::engine::input::InputAdapter;
use crate::engine::lifecycle::{Lifecycle, LifecycleState};
use crate::engine::output::OutputAdapter;
use crate::engine::SequenceState;
use crate::errors::StageError;
use crate::observability::messages::stage::{
    RemoteCallCompleted, RemoteServiceUnavailable, StageFailed, StageWorkerStarted,
    StageWorkerStopped, WaitInterrupted,
};
use crate::observability::messages::StructuredLog;
use crate::traits::RemoteMethod;

/// A materialized stage, ready to run its loop on its own task.
pub struct StageWorker {
    pub(super) name: String,
    pub(super) kind: StageKind,
    pub(super) method: Arc<dyn RemoteMethod>,
    pub(super) lifecycle: Arc<Lifecycle>,
    pub(super) input: InputAdapter,
    output: OutputAdapter,
    events: EventBus,
    on_fatal: FatalHandler,
    pub(super) iterations: u64,
}

/// What became of one remote call.
pub(super) enum CallOutcome {
    Completed,
    Unavailable,
    Fatal,
}

impl StageWorker {
    #[allow(clippy::too_many_arguments)]
    pub(super) fn new(
        name: String,
        kind: StageKind,
        method: Arc<dyn RemoteMethod>,
        lifecycle: Arc<Lifecycle>,
        events: EventBus,
        on_fatal: FatalHandler,
        input: InputAdapter,
        output: OutputAdapter,
    ) -> Self {
        Self {
            name,
            kind,
            method,
            lifecycle,
            input,
            output,
            events,
            on_fatal,
            iterations: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Start the loop on a new task. The task ends once the stage finishes.
    pub fn spawn(self) -> JoinHandle<()> {
        let started = StageWorkerStarted {
            stage_name: &self.name,
            kind: self.kind.as_str(),
            input: self.input.describe(),
            output: self.output.describe(),
        };
        started.log();
        let span = started.span("worker");

        tokio::spawn(self.run().instrument(span))
    }

    async fn run(mut self) {
        match self.kind {
            StageKind::Unary => unary::run(&mut self).await,
            StageKind::ServerStreaming => streaming::run(&mut self).await,
            StageKind::OneShotUnary => one_shot::run(&mut self).await,
        }
        // covers loops that ended on a fatal failure as well
        self.lifecycle.finish();

        StageWorkerStopped {
            stage_name: &self.name,
            iterations: self.iterations,
        }
        .log();
    }

    /// Top of every iteration: park if a wait was interrupted, then sit out
    /// any pause. Returns `false` once the stage is finished.
    pub(super) async fn checkpoint(&self) -> bool {
        if self.lifecycle.is_interrupted() {
            WaitInterrupted {
                stage_name: &self.name,
            }
            .log();
            self.lifecycle.pause();
        }
        if self.lifecycle.wait_while_paused().await != LifecycleState::Running {
            return false;
        }
        // source-fed stages never block on input
        tokio::task::yield_now().await;
        !self.lifecycle.is_finished()
    }

    /// One unary request/response; the response inherits the input's id.
    pub(super) async fn call_unary(&self, input: SequenceState) -> CallOutcome {
        let started = Instant::now();
        let request_size = input.message().encoded_len();

        match self.method.invoke_unary(input.message().clone()).await {
            Ok(response) => {
                RemoteCallCompleted {
                    stage_name: &self.name,
                    sequence_id: input.id(),
                    request_size,
                    response_size: response.encoded_len(),
                    duration: started.elapsed(),
                }
                .log();
                self.dispatch(input.derive(response))
            }
            Err(status) => self.handle_failure(status),
        }
    }

    pub(super) fn dispatch(&self, state: SequenceState) -> CallOutcome {
        match self.output.accept(state) {
            Ok(()) => CallOutcome::Completed,
            Err(source) => {
                self.fail(StageError::Dispatch {
                    stage_name: self.name.clone(),
                    source,
                });
                CallOutcome::Fatal
            }
        }
    }

    /// Unreachable endpoints pause the stage and notify the monitor; any
    /// other status is fatal.
    pub(super) fn handle_failure(&self, status: Status) -> CallOutcome {
        if self.method.is_unavailable(&status) {
            RemoteServiceUnavailable {
                stage_name: &self.name,
                status: &status,
            }
            .log();
            self.lifecycle.pause();
            self.events.publish(UnavailableServiceEvent::new(&self.name));
            CallOutcome::Unavailable
        } else {
            self.fail(StageError::RemoteCall {
                stage_name: self.name.clone(),
                status,
            });
            CallOutcome::Fatal
        }
    }

    fn fail(&self, error: StageError) {
        StageFailed {
            stage_name: &self.name,
            error: &error,
        }
        .log();
        let failure = FatalFailure {
            stage_name: self.name.clone(),
            error,
        };
        (self.on_fatal)(&failure);
        self.lifecycle.finish();
    }
}
