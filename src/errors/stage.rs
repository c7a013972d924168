// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Errors raised while building, binding, materializing, or running a stage.

use crate::config::{ExecutionMode, MethodShape};
use crate::errors::MessageError;

#[derive(Debug, thiserror::Error)]
pub enum StageError {
    /// Bindings are write-once and closed once the adapters exist.
    #[error("stage '{stage_name}' cannot be bound after its adapters were materialized")]
    AlreadyMaterialized { stage_name: String },

    #[error("stage '{stage_name}' has no variant for {shape:?} methods in {mode:?} mode")]
    UnsupportedShape {
        stage_name: String,
        shape: MethodShape,
        mode: ExecutionMode,
    },

    #[error("stage '{stage_name}' must be fed by its own source, but has {input_count} bound input(s)")]
    RequiresSourceInput {
        stage_name: String,
        input_count: usize,
    },

    #[error("stage '{stage_name}' has malformed input bindings {fields:?}: merged inputs need distinct, non-empty field names")]
    MalformedInputBindings {
        stage_name: String,
        fields: Vec<String>,
    },

    #[error("stage '{stage_name}' has malformed output bindings {fields:?}")]
    MalformedOutputBindings {
        stage_name: String,
        fields: Vec<String>,
    },

    #[error("stage '{stage_name}' routes field '{field}', which is not a sub-record of '{schema}'")]
    UnknownRecordField {
        stage_name: String,
        field: String,
        schema: String,
    },

    #[error("stage '{stage_name}' remote call failed: {status}")]
    RemoteCall {
        stage_name: String,
        #[source]
        status: tonic::Status,
    },

    #[error("stage '{stage_name}' could not dispatch its output: {source}")]
    Dispatch {
        stage_name: String,
        #[source]
        source: MessageError,
    },
}
