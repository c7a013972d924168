// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod config;
mod message;
mod pipeline;
mod stage;

pub use config::{ConfigError, ValidationError};
pub use message::MessageError;
pub use pipeline::{ConnectError, PipelineError};
pub use stage::StageError;
