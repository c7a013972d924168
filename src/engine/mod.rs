// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod events;
pub mod factory;
pub mod failure;
pub mod input;
pub mod lifecycle;
pub mod link;
pub mod monitor;
pub mod orchestrator;
pub mod output;
pub mod sequence;
pub mod stage;

pub use events::{EventBus, UnavailableServiceEvent};
pub use factory::StageFactory;
pub use failure::{abort_process, FatalFailure, FatalHandler};
pub use input::InputAdapter;
pub use lifecycle::{Lifecycle, LifecycleState};
pub use link::Link;
pub use monitor::FailureMonitor;
pub use orchestrator::{ExecutionOrchestrator, RunningPipeline};
pub use output::OutputAdapter;
pub use sequence::SequenceState;
pub use stage::{Stage, StageHandle, StageKind, StageWorker};
