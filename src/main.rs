// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use the_switchyard::backends::grpc::GrpcConnector;
use the_switchyard::config::{load_and_validate_config, RuntimeBuilder};
use the_switchyard::engine::abort_process;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <pipeline.yaml>", args[0]);
        eprintln!("Example: {} configs/detection-pipeline.yaml", args[0]);
        std::process::exit(2);
    }
    let config_file = &args[1];

    let cfg = load_and_validate_config(config_file)
        .with_context(|| format!("Failed to load pipeline config '{}'", config_file))?;
    let pipeline = RuntimeBuilder::from_config(&cfg, &GrpcConnector, abort_process())
        .context("Failed to build pipeline")?
        .run()
        .context("Failed to start pipeline")?;

    tracing::info!(
        config_file = %config_file,
        stage_count = pipeline.stages().len(),
        "Pipeline running; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;

    tracing::info!("Shutting down pipeline");
    pipeline.shutdown().await;
    Ok(())
}
