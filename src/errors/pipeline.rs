// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::errors::config::join_errors;
use crate::errors::{StageError, ValidationError};

/// Errors binding a stage to its remote method.
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    #[error("stage '{stage_name}' has an invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint {
        stage_name: String,
        endpoint: String,
        reason: String,
    },

    #[error("stage '{stage_name}' has an invalid method path '{method}': {reason}")]
    InvalidMethodPath {
        stage_name: String,
        method: String,
        reason: String,
    },

    #[error("no remote method registered for stage '{stage_name}'")]
    UnknownMethod { stage_name: String },
}

/// Errors building or starting a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Topology validation failed:\n{}", join_errors(.0))]
    Validation(Vec<ValidationError>),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Stage(#[from] StageError),
}
