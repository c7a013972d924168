// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::config::consts::{DEFAULT_BACKOFF_MS, DEFAULT_EVENT_CAPACITY};
use crate::config::{validate_topology, EdgeDescriptor, StageDescriptor, Topology};
use crate::errors::ConfigError;

/// Main configuration structure for a pipeline.
///
/// Holds the engine tuning knobs and the topology itself. The stage method
/// descriptors are expected to be fully resolved (shape and schemas filled
/// in), typically by a tool that queried each server's reflection service.
///
/// # Example
/// ```yaml
/// engine:
///   backoff_ms: 2000
/// stages:
///   - name: camera
///     host: localhost
///     port: 50051
///     method:
///       name: vision.Camera/Capture
///       shape: server_streaming
///       output: { name: vision.Frame, records: [image] }
///   - name: detector
///     host: localhost
///     port: 50052
///     method:
///       name: vision.Detector/Detect
///       shape: unary
/// edges:
///   - from: camera
///     to: detector
///     source_field: image
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub engine: EngineOptions,
    pub stages: Vec<StageDescriptor>,
    #[serde(default)]
    pub edges: Vec<EdgeDescriptor>,
}

impl PipelineConfig {
    pub fn topology(&self) -> Topology {
        Topology::new(self.stages.clone(), self.edges.clone())
    }
}

/// Engine-wide options.
///
/// # Fields
/// * `backoff_ms` - How long every stage stays paused after an
///   unavailable-service event before it is resumed
/// * `event_capacity` - Buffer size of the unavailable-service event bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EngineOptions {
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

fn default_backoff_ms() -> u64 {
    DEFAULT_BACKOFF_MS
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            backoff_ms: DEFAULT_BACKOFF_MS,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl EngineOptions {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Load a config from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: PipelineConfig = serde_yaml::from_str(&content)?;
    Ok(cfg)
}

/// Load a config from a YAML file and validate its topology
pub fn load_and_validate_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig, ConfigError> {
    let cfg = load_config(path)?;
    validate_topology(&cfg.topology()).map_err(ConfigError::Invalid)?;
    Ok(cfg)
}
