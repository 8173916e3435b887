//! `shouldibuy analyze`: one in-process pipeline run with live progress.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::display::{AnalysisOutput, EventRenderer};
use crate::cli::output::output;
use crate::domain::models::{Config, JobId};
use crate::services::{job_channel, AnalysisRequest};

use super::live_pipeline;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Product to analyze, e.g. "Sony WH-1000XM5"
    pub product: String,

    /// What you already own that this would replace
    #[arg(long)]
    pub owns: Option<String>,
}

pub async fn execute(args: AnalyzeArgs, config: Config, json_mode: bool) -> Result<()> {
    let request = AnalysisRequest::new(args.product, args.owns)
        .normalized(config.server.max_product_chars)
        .context("Invalid product")?;
    let pipeline = live_pipeline(&config)?;

    let report = if json_mode {
        pipeline
            .execute(&request.product, request.owns.as_deref(), None)
            .await?
    } else {
        let (emitter, mut receiver) = job_channel(JobId::new());
        let renderer = tokio::spawn(async move {
            let mut renderer = EventRenderer::new();
            while let Some(event) = receiver.recv().await {
                renderer.render(&event);
            }
        });

        let result = pipeline
            .execute(&request.product, request.owns.as_deref(), Some(&emitter))
            .await;
        drop(emitter);
        renderer.await.context("Event renderer failed")?;
        result?
    };

    output(
        &AnalysisOutput {
            product: request.product,
            owns: request.owns,
            report,
        },
        json_mode,
    );
    Ok(())
}
