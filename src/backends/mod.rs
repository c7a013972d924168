// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Remote method implementations that stages invoke.
//!
//! # Available Backends
//!
//! ## gRPC Backend
//! Real network calls through tonic:
//! - **Transport**: one lazy HTTP/2 channel per stage endpoint
//! - **Payload**: `google.protobuf.Struct` requests and responses
//! - **Shapes**: unary and server-streaming methods
//! - **Failures**: `UNAVAILABLE` pauses the pipeline, anything else is fatal
//!
//! ## Stub Backend (Test-Only)
//! In-process doubles for engine tests (only available in test builds):
//! - **CounterMethod** / **AddOneMethod**: simple numeric transforms
//! - **RecordingMethod**: a sink that remembers what it received
//! - **FlakyMethod** / **FailingMethod**: transient and fatal failures
//! - **StreamingMethod**: finite server streams
//! - **MapConnector**: resolves stages to pre-registered doubles
//!
//! # Architecture
//!
//! ```text
//! StageDescriptor → MethodConnector → Arc<dyn RemoteMethod> → Stage
//! ```
//!
//! # Example
//! ```rust,no_run
//! use the_switchyard::backends::grpc::GrpcConnector;
//! use the_switchyard::config::{load_and_validate_config, RuntimeBuilder};
//! use the_switchyard::engine::abort_process;
//!
//! # async fn start() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = load_and_validate_config("pipeline.yaml")?;
//! let pipeline = RuntimeBuilder::from_config(&cfg, &GrpcConnector, abort_process())?.run()?;
//! pipeline.shutdown().await;
//! # Ok(())
//! # }
//! ```

pub mod grpc;
#[cfg(test)]
pub mod stub;
