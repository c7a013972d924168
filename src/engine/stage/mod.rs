// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Stages: one worker bound to one remote method.
//!
//! A [`Stage`] goes through two phases. While it is being wired, links are
//! bound to it under field names. [`Stage::materialize`] then freezes the
//! bindings into an input and an output adapter and hands back a
//! [`StageWorker`] ready to be spawned. Binding after that point is an error.
//!
//! Three variants exist, selected from the method shape and execution mode:
//!
//! * [`StageKind::Unary`]: one call per input, forever
//! * [`StageKind::ServerStreaming`]: one stream per generated input, every
//!   streamed response dispatched with a fresh id
//! * [`StageKind::OneShotUnary`]: a single call, then finished
//!
//! Control (pause, resume, finish, interrupt) goes through a cloneable
//! [`StageHandle`] so supervisors don't need the stage itself.

mod one_shot;
mod streaming;
mod unary;
mod worker;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::{ExecutionMode, MethodShape, StageDescriptor};
use crate::engine::events::EventBus;
use crate::engine::failure::FatalHandler;
use crate::engine::input::InputAdapter;
use crate::engine::lifecycle::{Lifecycle, LifecycleState};
use crate::engine::output::OutputAdapter;
use crate::engine::Link;
use crate::errors::StageError;
use crate::traits::RemoteMethod;

pub use worker::StageWorker;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Unary,
    ServerStreaming,
    OneShotUnary,
}

impl StageKind {
    pub fn select(
        stage_name: &str,
        shape: MethodShape,
        mode: ExecutionMode,
    ) -> Result<Self, StageError> {
        match (shape, mode) {
            (MethodShape::Unary, ExecutionMode::Continuous) => Ok(StageKind::Unary),
            (MethodShape::Unary, ExecutionMode::OneShot) => Ok(StageKind::OneShotUnary),
            (MethodShape::ServerStreaming, ExecutionMode::Continuous) => {
                Ok(StageKind::ServerStreaming)
            }
            (shape, mode) => Err(StageError::UnsupportedShape {
                stage_name: stage_name.to_string(),
                shape,
                mode,
            }),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StageKind::Unary => "unary",
            StageKind::ServerStreaming => "server_streaming",
            StageKind::OneShotUnary => "one_shot_unary",
        }
    }

    /// Streaming and one-shot stages generate their own input.
    fn requires_source(self) -> bool {
        !matches!(self, StageKind::Unary)
    }
}

#[derive(Default)]
struct Bindings {
    inputs: Vec<(String, Arc<Link>)>,
    outputs: Vec<(String, Arc<Link>)>,
}

pub struct Stage {
    descriptor: StageDescriptor,
    kind: StageKind,
    method: Arc<dyn RemoteMethod>,
    events: EventBus,
    on_fatal: FatalHandler,
    lifecycle: Arc<Lifecycle>,
    // None once materialized
    bindings: Mutex<Option<Bindings>>,
}

impl Stage {
    pub fn new(
        descriptor: StageDescriptor,
        method: Arc<dyn RemoteMethod>,
        events: EventBus,
        on_fatal: FatalHandler,
    ) -> Result<Self, StageError> {
        let kind = StageKind::select(&descriptor.name, descriptor.method.shape, descriptor.mode)?;
        let lifecycle = Arc::new(Lifecycle::new(descriptor.name.clone()));
        Ok(Self {
            descriptor,
            kind,
            method,
            events,
            on_fatal,
            lifecycle,
            bindings: Mutex::new(Some(Bindings::default())),
        })
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn handle(&self) -> StageHandle {
        StageHandle {
            name: Arc::from(self.descriptor.name.as_str()),
            lifecycle: self.lifecycle.clone(),
        }
    }

    pub fn bind_input(&self, field: impl Into<String>, link: Arc<Link>) -> Result<(), StageError> {
        let field = field.into();
        self.with_bindings(|bindings| bindings.inputs.push((field, link)))
    }

    pub fn bind_output(&self, field: impl Into<String>, link: Arc<Link>) -> Result<(), StageError> {
        let field = field.into();
        self.with_bindings(|bindings| bindings.outputs.push((field, link)))
    }

    /// Freeze the bindings into adapters and produce the worker.
    ///
    /// All binding-shape errors surface here, before anything runs.
    pub fn materialize(&self) -> Result<StageWorker, StageError> {
        let bindings = self
            .bindings()
            .take()
            .ok_or_else(|| self.already_materialized())?;

        let name = self.name();
        let method = &self.descriptor.method;
        if self.kind.requires_source() && !bindings.inputs.is_empty() {
            return Err(StageError::RequiresSourceInput {
                stage_name: name.to_string(),
                input_count: bindings.inputs.len(),
            });
        }
        let input =
            InputAdapter::from_bindings(name, bindings.inputs, self.descriptor.mode, &method.input)?;
        let output = OutputAdapter::from_bindings(name, bindings.outputs, &method.output)?;

        Ok(StageWorker::new(
            name.to_string(),
            self.kind,
            self.method.clone(),
            self.lifecycle.clone(),
            self.events.clone(),
            self.on_fatal.clone(),
            input,
            output,
        ))
    }

    fn with_bindings<F>(&self, bind: F) -> Result<(), StageError>
    where
        F: FnOnce(&mut Bindings),
    {
        match self.bindings().as_mut() {
            Some(bindings) => {
                bind(bindings);
                Ok(())
            }
            None => Err(self.already_materialized()),
        }
    }

    fn already_materialized(&self) -> StageError {
        StageError::AlreadyMaterialized {
            stage_name: self.name().to_string(),
        }
    }

    fn bindings(&self) -> MutexGuard<'_, Option<Bindings>> {
        self.bindings.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Cheap, cloneable control surface for a stage.
#[derive(Clone)]
pub struct StageHandle {
    name: Arc<str>,
    lifecycle: Arc<Lifecycle>,
}

impl StageHandle {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn pause(&self) {
        self.lifecycle.pause();
    }

    pub fn resume(&self) {
        self.lifecycle.resume();
    }

    pub fn finish(&self) {
        self.lifecycle.finish();
    }

    /// Cut the worker's current blocking wait short; it parks until resumed.
    pub fn interrupt(&self) {
        self.lifecycle.interrupt();
    }
}

impl std::fmt::Debug for StageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageHandle")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
