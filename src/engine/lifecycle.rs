// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pause / resume / finish control shared between a stage's worker and
//! whoever supervises it.
//!
//! The state lives in a `watch` channel so the worker can sleep until it is
//! no longer paused. `Finished` is terminal and always wins over `Paused`.
//! Alongside the state sits a cancellation token that interrupts whatever the
//! worker is blocked on: `finish()` fires it for good, `interrupt()` fires it
//! once and the worker parks itself until the next `resume()` re-arms it.

use std::fmt;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::observability::messages::stage::{LifecycleChanged, UnexpectedLifecycleRequest};
use crate::observability::messages::StructuredLog;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Running,
    Paused,
    Finished,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Running => "running",
            LifecycleState::Paused => "paused",
            LifecycleState::Finished => "finished",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct Lifecycle {
    stage_name: String,
    state: watch::Sender<LifecycleState>,
    // Guards every replacement of the token and every transition into
    // Finished, so a re-arm can never resurrect a finished stage's wait.
    interrupt: Mutex<CancellationToken>,
}

impl Lifecycle {
    pub fn new(stage_name: impl Into<String>) -> Self {
        let (state, _) = watch::channel(LifecycleState::Running);
        Self {
            stage_name: stage_name.into(),
            state,
            interrupt: Mutex::new(CancellationToken::new()),
        }
    }

    pub fn state(&self) -> LifecycleState {
        *self.state.borrow()
    }

    pub fn is_finished(&self) -> bool {
        self.state() == LifecycleState::Finished
    }

    /// running/paused -> paused. Ignored once finished.
    pub fn pause(&self) {
        self.transition("pause", |state| match state {
            LifecycleState::Running => Some(LifecycleState::Paused),
            LifecycleState::Paused => None,
            LifecycleState::Finished => {
                self.unexpected("pause", state);
                None
            }
        });
    }

    /// paused -> running, waking the worker. Ignored once finished.
    ///
    /// A fired token is replaced only on an actual paused -> running change,
    /// so an interrupt still pending on a running stage survives.
    pub fn resume(&self) {
        let mut token = self.token();
        self.transition("resume", |state| match state {
            LifecycleState::Paused => {
                // the fresh token must be in place before the worker wakes
                if token.is_cancelled() {
                    *token = CancellationToken::new();
                }
                Some(LifecycleState::Running)
            }
            LifecycleState::Running => None,
            LifecycleState::Finished => {
                self.unexpected("resume", state);
                None
            }
        });
    }

    /// Any state -> finished. Idempotent; also interrupts a blocked wait.
    pub fn finish(&self) {
        let token = self.token();
        self.transition("finish", |state| match state {
            LifecycleState::Finished => None,
            _ => Some(LifecycleState::Finished),
        });
        token.cancel();
    }

    /// Interrupt the worker's current blocking wait without finishing it.
    pub fn interrupt(&self) {
        self.token().cancel();
    }

    /// Token to hand to the next blocking wait.
    pub fn cancellation(&self) -> CancellationToken {
        self.token().clone()
    }

    /// True when an interrupt is pending on a stage that is still alive.
    pub fn is_interrupted(&self) -> bool {
        !self.is_finished() && self.token().is_cancelled()
    }

    /// Wait while paused; returns the state that ended the wait.
    pub async fn wait_while_paused(&self) -> LifecycleState {
        let mut receiver = self.state.subscribe();
        let result = match receiver
            .wait_for(|state| *state != LifecycleState::Paused)
            .await
        {
            Ok(state) => *state,
            Err(_) => LifecycleState::Finished,
        };
        result
    }

    fn transition<F>(&self, request: &str, next: F)
    where
        F: FnOnce(LifecycleState) -> Option<LifecycleState>,
    {
        let mut change = None;
        self.state.send_if_modified(|state| match next(*state) {
            Some(target) => {
                change = Some((*state, target));
                *state = target;
                true
            }
            None => false,
        });
        if let Some((from, to)) = change {
            LifecycleChanged {
                stage_name: &self.stage_name,
                from: from.as_str(),
                to: to.as_str(),
            }
            .log();
        } else {
            tracing::trace!(stage_name = %self.stage_name, request, "lifecycle request was a no-op");
        }
    }

    fn unexpected(&self, request: &str, state: LifecycleState) {
        UnexpectedLifecycleRequest {
            stage_name: &self.stage_name,
            request,
            state: state.as_str(),
        }
        .log();
    }

    fn token(&self) -> MutexGuard<'_, CancellationToken> {
        self.interrupt.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_starts_running() {
        let lifecycle = Lifecycle::new("stage");

        assert_eq!(lifecycle.state(), LifecycleState::Running);
        assert!(!lifecycle.is_interrupted());
    }

    #[test]
    fn test_pause_is_idempotent_and_resume_restores() {
        let lifecycle = Lifecycle::new("stage");

        lifecycle.pause();
        lifecycle.pause();
        assert_eq!(lifecycle.state(), LifecycleState::Paused);

        lifecycle.resume();
        assert_eq!(lifecycle.state(), LifecycleState::Running);
    }

    #[test]
    fn test_finished_ignores_pause_and_resume() {
        let lifecycle = Lifecycle::new("stage");

        lifecycle.finish();
        lifecycle.pause();
        assert_eq!(lifecycle.state(), LifecycleState::Finished);
        lifecycle.resume();
        assert_eq!(lifecycle.state(), LifecycleState::Finished);
        lifecycle.finish();
        assert_eq!(lifecycle.state(), LifecycleState::Finished);
    }

    #[test]
    fn test_finish_cancels_wait_token_for_good() {
        let lifecycle = Lifecycle::new("stage");
        let token = lifecycle.cancellation();

        lifecycle.finish();
        assert!(token.is_cancelled());

        lifecycle.resume();
        assert!(lifecycle.cancellation().is_cancelled());
        // finished stages don't count as interrupted; they are done
        assert!(!lifecycle.is_interrupted());
    }

    #[test]
    fn test_interrupt_then_resume_rearms() {
        let lifecycle = Lifecycle::new("stage");
        let token = lifecycle.cancellation();

        lifecycle.interrupt();
        assert!(token.is_cancelled());
        assert!(lifecycle.is_interrupted());

        lifecycle.pause();
        lifecycle.resume();
        assert!(!lifecycle.is_interrupted());
        assert!(!lifecycle.cancellation().is_cancelled());
    }

    #[test]
    fn test_resume_of_running_stage_keeps_pending_interrupt() {
        let lifecycle = Lifecycle::new("stage");

        lifecycle.interrupt();
        lifecycle.resume();

        assert_eq!(lifecycle.state(), LifecycleState::Running);
        assert!(lifecycle.is_interrupted());
        assert!(lifecycle.cancellation().is_cancelled());
    }

    #[tokio::test]
    async fn test_wait_returns_immediately_when_running() {
        let lifecycle = Lifecycle::new("stage");

        let state = tokio::time::timeout(Duration::from_millis(100), lifecycle.wait_while_paused())
            .await
            .unwrap();
        assert_eq!(state, LifecycleState::Running);
    }

    #[tokio::test]
    async fn test_resume_wakes_paused_waiter() {
        let lifecycle = Arc::new(Lifecycle::new("stage"));
        lifecycle.pause();

        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.wait_while_paused().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        lifecycle.resume();
        let state = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, LifecycleState::Running);
    }

    #[tokio::test]
    async fn test_finish_wakes_paused_waiter_without_resume() {
        let lifecycle = Arc::new(Lifecycle::new("stage"));
        lifecycle.pause();

        let waiter = {
            let lifecycle = lifecycle.clone();
            tokio::spawn(async move { lifecycle.wait_while_paused().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        lifecycle.finish();
        let state = tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(state, LifecycleState::Finished);
    }
}
