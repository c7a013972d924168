// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;   // remote method backends
pub mod config;     // topology + engine configuration
pub mod engine;     // stages, links, orchestrator
pub mod errors;     // error handling
pub mod message;    // structured records exchanged between stages
pub mod observability;
pub mod traits;     // remote method abstractions
