// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// Errors from reading or composing structured records.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MessageError {
    #[error("field '{field}' is not a structured sub-record")]
    NotARecord { field: String },
}
