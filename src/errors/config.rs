// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

/// Errors that can occur during topology validation
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Two stages share the same name
    DuplicateStageName {
        /// The duplicated stage name
        stage_name: String,
    },
    /// A stage has no remote method to invoke
    MissingMethod {
        /// The stage with the empty method name
        stage_name: String,
    },
    /// An edge references a stage that doesn't exist
    UnresolvedEdgeEndpoint {
        /// Source stage of the offending edge
        from: String,
        /// Target stage of the offending edge
        to: String,
        /// The endpoint that couldn't be resolved
        missing_stage: String,
    },
    /// An edge links a stage to itself
    SelfLoop {
        /// The stage feeding its own input
        stage_name: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateStageName { stage_name } => {
                write!(f, "Duplicate stage name: '{}'", stage_name)
            }
            ValidationError::MissingMethod { stage_name } => {
                write!(f, "Stage '{}' does not name a remote method", stage_name)
            }
            ValidationError::UnresolvedEdgeEndpoint {
                from,
                to,
                missing_stage,
            } => {
                write!(
                    f,
                    "Edge '{}' -> '{}' references stage '{}' which does not exist",
                    from, to, missing_stage
                )
            }
            ValidationError::SelfLoop { stage_name } => {
                write!(
                    f,
                    "Stage '{}' links to itself; feedback loops must span at least two stages",
                    stage_name
                )
            }
        }
    }
}

impl std::error::Error for ValidationError {}

/// Joins validation errors into one line per error.
pub(crate) fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors raised while loading a pipeline configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration validation failed:\n{}", join_errors(.0))]
    Invalid(Vec<ValidationError>),
}
