// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Builds a pipeline from a topology and runs it.
//!
//! [`ExecutionOrchestrator::new`] does all the wiring: it validates the
//! topology, connects every stage to its remote method, builds one stage per
//! descriptor and one [`Link`] per edge. Nothing runs yet, so an embedder can
//! still bind extra links (taps, seeds) through [`ExecutionOrchestrator::stage`].
//!
//! [`ExecutionOrchestrator::run`] materializes every stage's adapters before
//! starting anything, so configuration errors never leave a half-started
//! pipeline behind. It returns a [`RunningPipeline`] for control and shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::{validate_topology, EdgeDescriptor, EngineOptions, Topology};
use crate::engine::events::{EventBus, UnavailableServiceEvent};
use crate::engine::factory::StageFactory;
use crate::engine::failure::FatalHandler;
use crate::engine::monitor::FailureMonitor;
use crate::engine::stage::{Stage, StageHandle};
use crate::engine::Link;
use crate::errors::{PipelineError, ValidationError};
use crate::observability::messages::engine::{
    LinkBound, PipelineStarting, PipelineStopped, WorkerJoinFailed,
};
use crate::observability::messages::StructuredLog;
use crate::traits::MethodConnector;

pub struct ExecutionOrchestrator {
    stages: Vec<Stage>,
    links: Vec<Arc<Link>>,
    events: EventBus,
    backoff: Duration,
}

impl ExecutionOrchestrator {
    pub fn new(
        topology: &Topology,
        connector: &dyn MethodConnector,
        options: EngineOptions,
        on_fatal: FatalHandler,
    ) -> Result<Self, PipelineError> {
        validate_topology(topology).map_err(PipelineError::Validation)?;

        let events = EventBus::new(options.event_capacity);
        let factory = StageFactory::new(events.clone(), on_fatal);

        let mut stages = Vec::with_capacity(topology.stages.len());
        for descriptor in &topology.stages {
            let method = connector.connect(descriptor)?;
            stages.push(factory.build(descriptor, method)?);
        }

        let mut links = Vec::with_capacity(topology.edges.len());
        for edge in &topology.edges {
            let from = find_stage(&stages, &edge.from, edge)?;
            let to = find_stage(&stages, &edge.to, edge)?;

            let link = Arc::new(Link::new(format!("{}->{}", edge.from, edge.to)));
            from.bind_output(edge.source_key(), link.clone())?;
            to.bind_input(edge.target_key(), link.clone())?;

            LinkBound {
                from: &edge.from,
                source_key: edge.source_key(),
                to: &edge.to,
                target_key: edge.target_key(),
            }
            .log();
            links.push(link);
        }

        Ok(Self {
            stages,
            links,
            events,
            backoff: options.backoff(),
        })
    }

    pub fn stage(&self, name: &str) -> Option<&Stage> {
        self.stages.iter().find(|stage| stage.name() == name)
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    /// The link created for the edge `from -> to`, if there is one.
    pub fn link(&self, from: &str, to: &str) -> Option<Arc<Link>> {
        let label = format!("{}->{}", from, to);
        self.links.iter().find(|link| link.label() == label).cloned()
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    /// Start one worker per stage plus the failure monitor. Does not block.
    pub fn run(self) -> Result<RunningPipeline, PipelineError> {
        let starting = PipelineStarting {
            stage_count: self.stages.len(),
            link_count: self.links.len(),
        };
        starting.log();
        let span = starting.span("run");
        let _entered = span.enter();

        let workers = self
            .stages
            .iter()
            .map(Stage::materialize)
            .collect::<Result<Vec<_>, _>>()?;
        let handles: Vec<StageHandle> = self.stages.iter().map(Stage::handle).collect();

        let shutdown = CancellationToken::new();
        let monitor = FailureMonitor::new(handles.clone(), self.backoff)
            .spawn(self.events.subscribe(), shutdown.clone());

        let tasks = workers
            .into_iter()
            .map(|worker| (worker.name().to_string(), worker.spawn()))
            .collect();

        Ok(RunningPipeline {
            handles,
            tasks,
            monitor,
            shutdown,
            events: self.events,
            started: Instant::now(),
        })
    }
}

fn find_stage<'a>(
    stages: &'a [Stage],
    name: &str,
    edge: &EdgeDescriptor,
) -> Result<&'a Stage, PipelineError> {
    stages.iter().find(|stage| stage.name() == name).ok_or_else(|| {
        PipelineError::Validation(vec![ValidationError::UnresolvedEdgeEndpoint {
            from: edge.from.clone(),
            to: edge.to.clone(),
            missing_stage: name.to_string(),
        }])
    })
}

/// A started pipeline.
pub struct RunningPipeline {
    handles: Vec<StageHandle>,
    tasks: Vec<(String, JoinHandle<()>)>,
    monitor: JoinHandle<()>,
    shutdown: CancellationToken,
    events: EventBus,
    started: Instant,
}

impl RunningPipeline {
    pub fn stage(&self, name: &str) -> Option<StageHandle> {
        self.handles
            .iter()
            .find(|handle| handle.name() == name)
            .cloned()
    }

    pub fn stages(&self) -> &[StageHandle] {
        &self.handles
    }

    pub fn subscribe(&self) -> broadcast::Receiver<UnavailableServiceEvent> {
        self.events.subscribe()
    }

    pub fn finish_all(&self) {
        for handle in &self.handles {
            handle.finish();
        }
    }

    /// Wait for every worker to end, then stop the monitor.
    pub async fn join(self) {
        for (stage_name, task) in self.tasks {
            if let Err(error) = task.await {
                WorkerJoinFailed {
                    stage_name: &stage_name,
                    error: &error,
                }
                .log();
            }
        }

        self.shutdown.cancel();
        if let Err(error) = self.monitor.await {
            WorkerJoinFailed {
                stage_name: "failure_monitor",
                error: &error,
            }
            .log();
        }

        PipelineStopped {
            stage_count: self.handles.len(),
            duration: self.started.elapsed(),
        }
        .log();
    }

    pub async fn shutdown(self) {
        self.finish_all();
        self.join().await;
    }
}
