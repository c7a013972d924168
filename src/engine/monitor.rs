// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pipeline-wide reaction to unreachable services.
//!
//! A stage whose remote endpoint is unavailable pauses itself and reports
//! it on the [`EventBus`]. The monitor answers every such report with the
//! same sweep: pause all stages, wait out the backoff, resume all stages.
//! Retries are unbounded and the delay is fixed.
//!
//! Reports that arrive while a backoff is already running belong to that
//! backoff and are drained before the resume sweep.

use std::time::Duration;

use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::sync::broadcast::Receiver;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::engine::events::UnavailableServiceEvent;
use crate::engine::lifecycle::LifecycleState;
use crate::engine::stage::StageHandle;
use crate::observability::messages::monitor::{BackoffStarted, EventsLagged, StagesResumed};
use crate::observability::messages::StructuredLog;

pub struct FailureMonitor {
    stages: Vec<StageHandle>,
    backoff: Duration,
}

impl FailureMonitor {
    pub fn new(stages: Vec<StageHandle>, backoff: Duration) -> Self {
        Self { stages, backoff }
    }

    /// Run the monitor on its own task until `shutdown` fires or the bus
    /// closes.
    ///
    /// `events` should be subscribed before any worker starts so that no
    /// report is missed.
    pub fn spawn(
        self,
        events: Receiver<UnavailableServiceEvent>,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        tokio::spawn(self.run(events, shutdown))
    }

    async fn run(self, mut events: Receiver<UnavailableServiceEvent>, shutdown: CancellationToken) {
        loop {
            let received = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                received = events.recv() => received,
            };

            match received {
                Ok(event) => {
                    let started = BackoffStarted {
                        stage_name: &event.stage_name,
                        stage_count: self.stages.len(),
                        backoff: self.backoff,
                    };
                    started.log();
                    let span = started.span("failure_monitor");

                    let completed = self
                        .back_off(&mut events, &shutdown)
                        .instrument(span)
                        .await;
                    if !completed {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => EventsLagged { skipped }.log(),
                Err(RecvError::Closed) => break,
            }
        }
        tracing::debug!("Failure monitor stopped");
    }

    /// Returns `false` if shutdown interrupted the backoff.
    async fn back_off(
        &self,
        events: &mut Receiver<UnavailableServiceEvent>,
        shutdown: &CancellationToken,
    ) -> bool {
        self.pause_all();

        tokio::select! {
            _ = shutdown.cancelled() => return false,
            _ = tokio::time::sleep(self.backoff) => {}
        }

        loop {
            match events.try_recv() {
                Ok(event) => {
                    tracing::debug!(stage_name = %event.stage_name, "Report absorbed by running backoff")
                }
                Err(TryRecvError::Lagged(skipped)) => EventsLagged { skipped }.log(),
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        let resumed = self.resume_all();
        StagesResumed {
            stage_count: resumed,
        }
        .log();
        true
    }

    /// Pause every stage that has not finished. Best effort, not atomic.
    pub fn pause_all(&self) {
        for stage in self.live_stages() {
            stage.pause();
        }
    }

    /// Resume every stage that has not finished; returns how many.
    pub fn resume_all(&self) -> usize {
        self.live_stages().fold(0, |count, stage| {
            stage.resume();
            count + 1
        })
    }

    fn live_stages(&self) -> impl Iterator<Item = &StageHandle> {
        self.stages
            .iter()
            .filter(|stage| stage.state() != LifecycleState::Finished)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::EventBus;
    use crate::engine::stage::Stage;
    use crate::backends::stub::{descriptor, panic_on_fatal, AddOneMethod};
    use crate::config::{ExecutionMode, MethodShape};
    use std::sync::Arc;

    fn handles(names: &[&str]) -> Vec<StageHandle> {
        names
            .iter()
            .map(|name| {
                Stage::new(
                    descriptor(name, MethodShape::Unary, ExecutionMode::Continuous),
                    Arc::new(AddOneMethod::new()),
                    EventBus::default(),
                    panic_on_fatal(),
                )
                .unwrap()
                .handle()
            })
            .collect()
    }

    #[test]
    fn test_sweeps_skip_finished_stages() {
        let stages = handles(&["a", "b", "c"]);
        stages[2].finish();
        let monitor = FailureMonitor::new(stages.clone(), Duration::from_millis(10));

        monitor.pause_all();
        assert_eq!(stages[0].state(), LifecycleState::Paused);
        assert_eq!(stages[1].state(), LifecycleState::Paused);
        assert_eq!(stages[2].state(), LifecycleState::Finished);

        assert_eq!(monitor.resume_all(), 2);
        assert_eq!(stages[0].state(), LifecycleState::Running);
        assert_eq!(stages[2].state(), LifecycleState::Finished);
    }

    #[tokio::test]
    async fn test_event_pauses_everything_then_resumes_after_backoff() {
        let stages = handles(&["a", "b"]);
        let bus = EventBus::default();
        let shutdown = CancellationToken::new();
        let monitor = FailureMonitor::new(stages.clone(), Duration::from_millis(100))
            .spawn(bus.subscribe(), shutdown.clone());

        bus.publish(UnavailableServiceEvent::new("a"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(stages.iter().all(|s| s.state() == LifecycleState::Paused));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(stages.iter().all(|s| s.state() == LifecycleState::Running));

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), monitor)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_shutdown_interrupts_backoff() {
        let stages = handles(&["a"]);
        let bus = EventBus::default();
        let shutdown = CancellationToken::new();
        let monitor = FailureMonitor::new(stages.clone(), Duration::from_secs(60))
            .spawn(bus.subscribe(), shutdown.clone());

        bus.publish(UnavailableServiceEvent::new("a"));
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown.cancel();

        tokio::time::timeout(Duration::from_secs(1), monitor)
            .await
            .expect("monitor ignored shutdown during backoff")
            .unwrap();
    }

    #[tokio::test]
    async fn test_stops_when_bus_closes() {
        let bus = EventBus::default();
        let receiver = bus.subscribe();
        let monitor =
            FailureMonitor::new(vec![], Duration::from_millis(10)).spawn(receiver, CancellationToken::new());

        drop(bus);
        tokio::time::timeout(Duration::from_secs(1), monitor)
            .await
            .unwrap()
            .unwrap();
    }
}
