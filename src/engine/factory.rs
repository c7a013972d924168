// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::config::StageDescriptor;
use crate::engine::events::EventBus;
use crate::engine::failure::FatalHandler;
use crate::engine::stage::{Stage, StageKind};
use crate::errors::StageError;
use crate::traits::RemoteMethod;

/// Builds stages that share one event bus and one fatal-failure handler.
pub struct StageFactory {
    events: EventBus,
    on_fatal: FatalHandler,
}

impl StageFactory {
    pub fn new(events: EventBus, on_fatal: FatalHandler) -> Self {
        Self { events, on_fatal }
    }

    /// Create the stage variant implied by the descriptor's method shape and
    /// execution mode.
    pub fn build(
        &self,
        descriptor: &StageDescriptor,
        method: Arc<dyn RemoteMethod>,
    ) -> Result<Stage, StageError> {
        let kind = StageKind::select(&descriptor.name, descriptor.method.shape, descriptor.mode)?;
        tracing::debug!(
            stage_name = %descriptor.name,
            kind = kind.as_str(),
            method = %descriptor.method.name,
            endpoint = %descriptor.endpoint(),
            "Building stage"
        );

        Stage::new(
            descriptor.clone(),
            method,
            self.events.clone(),
            self.on_fatal.clone(),
        )
    }
}
