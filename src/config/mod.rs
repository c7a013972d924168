// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
mod runtime;
mod topology;
mod validation;

pub mod consts;

pub use loader::{load_and_validate_config, load_config, EngineOptions, PipelineConfig};
pub use runtime::RuntimeBuilder;
pub use topology::{
    EdgeDescriptor, ExecutionMode, MethodDescriptor, MethodShape, StageDescriptor, Topology,
};
pub use validation::validate_topology;
