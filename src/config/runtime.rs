// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::config::PipelineConfig;
use crate::engine::{ExecutionOrchestrator, FatalHandler};
use crate::errors::PipelineError;
use crate::traits::MethodConnector;

/// Pipeline runtime builder - turns a loaded configuration into a ready-to-run
/// orchestrator.
///
/// The connector decides how stages reach their remote methods (the gRPC
/// connector in production, in-process doubles in tests). The fatal handler
/// decides what happens when a stage hits an unrecoverable remote failure.
pub struct RuntimeBuilder;

impl RuntimeBuilder {
    /// Build an orchestrator for `cfg`.
    ///
    /// Fails on topology validation errors, connection setup errors, and
    /// stage construction errors (e.g. a one-shot streaming method).
    pub fn from_config(
        cfg: &PipelineConfig,
        connector: &dyn MethodConnector,
        on_fatal: FatalHandler,
    ) -> Result<ExecutionOrchestrator, PipelineError> {
        ExecutionOrchestrator::new(&cfg.topology(), connector, cfg.engine, on_fatal)
    }
}
