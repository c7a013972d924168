// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Every diagnostic line the engine writes is a small struct that implements
//! `Display` plus [`messages::StructuredLog`]. This keeps message text out of
//! the engine code and pairs each human-readable line with the structured
//! fields a log pipeline can index.
//!
//! # Usage
//!
//! ```rust
//! use the_switchyard::observability::messages::StructuredLog;
//! use the_switchyard::observability::messages::stage::RemoteServiceUnavailable;
//!
//! let status = tonic::Status::unavailable("connection refused");
//! RemoteServiceUnavailable {
//!     stage_name: "detector",
//!     status: &status,
//! }
//! .log();
//! ```

pub mod messages;
