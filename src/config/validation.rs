// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Structural validation of a pipeline topology.
//!
//! The checks run in a fixed order and accumulate every error they find so a
//! user sees all problems at once:
//!
//! 1. **Uniqueness**: every stage name appears once
//! 2. **Methods**: every stage names the remote method it invokes
//! 3. **References**: every edge endpoint names an existing stage
//! 4. **Self-loops**: no edge feeds a stage back into itself
//!
//! Cycles spanning two or more stages are deliberately not rejected; feedback
//! loops are a supported topology.
//!
//! # Example
//! ```rust
//! use the_switchyard::config::{validate_topology, Topology, EdgeDescriptor};
//!
//! let topology = Topology::new(vec![], vec![EdgeDescriptor::new("camera", "detector")]);
//!
//! let errors = validate_topology(&topology).unwrap_err();
//! assert_eq!(errors.len(), 2);
//! ```

use std::collections::HashSet;

use crate::config::Topology;
use crate::errors::ValidationError;
use crate::observability::messages::validation::TopologyRejected;
use crate::observability::messages::StructuredLog;

/// Validates `topology`, returning every problem found.
pub fn validate_topology(topology: &Topology) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    errors.extend(validate_unique_stage_names(topology));
    errors.extend(validate_methods(topology));
    errors.extend(validate_edge_references(topology));
    errors.extend(validate_no_self_loops(topology));

    if errors.is_empty() {
        Ok(())
    } else {
        TopologyRejected {
            error_count: errors.len(),
            first_error: &errors[0],
        }
        .log();
        Err(errors)
    }
}

fn validate_unique_stage_names(topology: &Topology) -> Vec<ValidationError> {
    let mut seen = HashSet::new();

    topology
        .stages
        .iter()
        .filter(|stage| !seen.insert(stage.name.as_str()))
        .map(|stage| ValidationError::DuplicateStageName {
            stage_name: stage.name.clone(),
        })
        .collect()
}

fn validate_methods(topology: &Topology) -> Vec<ValidationError> {
    topology
        .stages
        .iter()
        .filter(|stage| stage.method.name.trim().is_empty())
        .map(|stage| ValidationError::MissingMethod {
            stage_name: stage.name.clone(),
        })
        .collect()
}

/// Both endpoints are checked, so an edge between two unknown stages
/// produces two errors.
fn validate_edge_references(topology: &Topology) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    for edge in &topology.edges {
        for endpoint in [&edge.from, &edge.to] {
            if topology.stage(endpoint).is_none() {
                errors.push(ValidationError::UnresolvedEdgeEndpoint {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                    missing_stage: endpoint.clone(),
                });
            }
        }
    }

    errors
}

fn validate_no_self_loops(topology: &Topology) -> Vec<ValidationError> {
    topology
        .edges
        .iter()
        .filter(|edge| edge.from == edge.to)
        .map(|edge| ValidationError::SelfLoop {
            stage_name: edge.from.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        EdgeDescriptor, ExecutionMode, MethodDescriptor, MethodShape, StageDescriptor,
    };
    use crate::message::MessageSchema;

    fn stage(name: &str) -> StageDescriptor {
        StageDescriptor {
            name: name.to_string(),
            host: "localhost".to_string(),
            port: 50051,
            method: MethodDescriptor {
                name: format!("test.Service/{}", name),
                shape: MethodShape::Unary,
                input: MessageSchema::new("test.Request"),
                output: MessageSchema::new("test.Response"),
            },
            mode: ExecutionMode::Continuous,
        }
    }

    #[test]
    fn test_valid_linear_topology() {
        let topology = Topology::new(
            vec![stage("a"), stage("b"), stage("c")],
            vec![EdgeDescriptor::new("a", "b"), EdgeDescriptor::new("b", "c")],
        );

        assert!(validate_topology(&topology).is_ok());
    }

    #[test]
    fn test_cycle_across_two_stages_is_allowed() {
        let topology = Topology::new(
            vec![stage("a"), stage("b")],
            vec![EdgeDescriptor::new("a", "b"), EdgeDescriptor::new("b", "a")],
        );

        assert!(validate_topology(&topology).is_ok());
    }

    #[test]
    fn test_duplicate_stage_name() {
        let topology = Topology::new(vec![stage("a"), stage("a")], vec![]);

        let errors = validate_topology(&topology).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::DuplicateStageName {
                stage_name: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_missing_method_name() {
        let mut nameless = stage("a");
        nameless.method.name = "  ".to_string();
        let topology = Topology::new(vec![nameless], vec![]);

        let errors = validate_topology(&topology).unwrap_err();
        assert!(matches!(
            &errors[0],
            ValidationError::MissingMethod { stage_name } if stage_name == "a"
        ));
    }

    #[test]
    fn test_unresolved_edge_endpoint() {
        let topology = Topology::new(vec![stage("a")], vec![EdgeDescriptor::new("a", "ghost")]);

        let errors = validate_topology(&topology).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0]
            .to_string()
            .contains("references stage 'ghost' which does not exist"));
    }

    #[test]
    fn test_self_loop_rejected() {
        let topology = Topology::new(vec![stage("a")], vec![EdgeDescriptor::new("a", "a")]);

        let errors = validate_topology(&topology).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::SelfLoop {
                stage_name: "a".to_string()
            }]
        );
    }

    #[test]
    fn test_errors_accumulate() {
        let topology = Topology::new(
            vec![stage("a"), stage("a")],
            vec![EdgeDescriptor::new("a", "a"), EdgeDescriptor::new("x", "y")],
        );

        let errors = validate_topology(&topology).unwrap_err();
        // duplicate + two unresolved endpoints + self-loop
        assert_eq!(errors.len(), 4);
    }
}
