// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! The directed stage graph handed to the orchestrator.
//!
//! Nodes are [`StageDescriptor`]s, edges are [`EdgeDescriptor`]s. The graph is
//! an immutable value: once the orchestrator has built stages from it nothing
//! rewires it. Cycles spanning two or more stages are legal.

use serde::Deserialize;

use crate::config::consts::WHOLE_MESSAGE;
use crate::message::MessageSchema;

/// Calling convention of a remote method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MethodShape {
    Unary,
    ServerStreaming,
}

/// Whether a stage loops forever or runs its method once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    #[default]
    Continuous,
    OneShot,
}

impl ExecutionMode {
    /// First id handed out by a source input for this mode.
    pub fn first_source_id(self) -> u64 {
        match self {
            ExecutionMode::Continuous => 0,
            ExecutionMode::OneShot => 1,
        }
    }
}

/// A resolved remote method: its full name, calling convention, and schemas.
///
/// `name` has the form `package.Service/Method`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    pub shape: MethodShape,
    #[serde(default)]
    pub input: MessageSchema,
    #[serde(default)]
    pub output: MessageSchema,
}

/// One node of the topology.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StageDescriptor {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub method: MethodDescriptor,
    #[serde(default)]
    pub mode: ExecutionMode,
}

impl StageDescriptor {
    pub fn endpoint(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// One edge of the topology, optionally routing a single field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EdgeDescriptor {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub source_field: Option<String>,
    #[serde(default)]
    pub target_field: Option<String>,
}

impl EdgeDescriptor {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            source_field: None,
            target_field: None,
        }
    }

    pub fn with_source_field(mut self, field: impl Into<String>) -> Self {
        self.source_field = Some(field.into());
        self
    }

    pub fn with_target_field(mut self, field: impl Into<String>) -> Self {
        self.target_field = Some(field.into());
        self
    }

    /// Output binding key on the source stage.
    pub fn source_key(&self) -> &str {
        self.source_field.as_deref().unwrap_or(WHOLE_MESSAGE)
    }

    /// Input binding key on the target stage.
    pub fn target_key(&self) -> &str {
        self.target_field.as_deref().unwrap_or(WHOLE_MESSAGE)
    }
}

/// Stage descriptors plus the edges that connect them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Topology {
    #[serde(default)]
    pub stages: Vec<StageDescriptor>,
    #[serde(default)]
    pub edges: Vec<EdgeDescriptor>,
}

impl Topology {
    pub fn new(stages: Vec<StageDescriptor>, edges: Vec<EdgeDescriptor>) -> Self {
        Self { stages, edges }
    }

    pub fn stage(&self, name: &str) -> Option<&StageDescriptor> {
        self.stages.iter().find(|stage| stage.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_fields_map_to_whole_message() {
        let edge = EdgeDescriptor::new("camera", "detector");

        assert_eq!(edge.source_key(), "");
        assert_eq!(edge.target_key(), "");
    }

    #[test]
    fn test_named_fields_are_used_as_keys() {
        let edge = EdgeDescriptor::new("camera", "detector")
            .with_source_field("image")
            .with_target_field("frame");

        assert_eq!(edge.source_key(), "image");
        assert_eq!(edge.target_key(), "frame");
    }

    #[test]
    fn test_first_source_id_per_mode() {
        assert_eq!(ExecutionMode::Continuous.first_source_id(), 0);
        assert_eq!(ExecutionMode::OneShot.first_source_id(), 1);
    }
}
