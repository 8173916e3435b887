//! `shouldibuy serve`: the HTTP/SSE server.

use std::sync::Arc;

use anyhow::{anyhow, Result};
use clap::Args;

use crate::adapters::http::AnalysisHttpServer;
use crate::domain::models::Config;
use crate::services::{AnalysisService, JobRegistry};

use super::live_pipeline;

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Override the configured bind host
    #[arg(long)]
    pub host: Option<String>,

    /// Override the configured port
    #[arg(long)]
    pub port: Option<u16>,
}

pub async fn execute(args: ServeArgs, mut config: Config) -> Result<()> {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }

    let pipeline = Arc::new(live_pipeline(&config)?);
    let service = Arc::new(AnalysisService::new(pipeline, Arc::new(JobRegistry::new())));
    let server = AnalysisHttpServer::new(service, config.server.clone(), config.jobs.clone());

    println!(
        "{} listening on http://{}:{}",
        console::style("shouldibuy").bold(),
        config.server.host,
        config.server.port
    );

    server
        .serve_with_shutdown(shutdown_signal())
        .await
        .map_err(|e| anyhow!("HTTP server failed: {e}"))?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
