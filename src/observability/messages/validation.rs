// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for topology validation failures.

use crate::errors::ValidationError;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};

/// Topology rejected by validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct TopologyRejected<'a> {
    pub error_count: usize,
    pub first_error: &'a ValidationError,
}

impl Display for TopologyRejected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Topology rejected with {} error(s), first: {}",
            self.error_count, self.first_error
        )
    }
}

impl StructuredLog for TopologyRejected<'_> {
    fn log(&self) {
        tracing::error!(
            error_count = self.error_count,
            first_error = %self.first_error,
            "{}", self
        );
    }
}
