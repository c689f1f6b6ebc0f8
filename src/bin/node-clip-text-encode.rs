// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{Context, Result};
use clap::Parser;
use ndnm_nodes::{
    cli::TextEncodeCli,
    embeddings::{OnnxClipTextEncoder, TextEncoder},
    nodes::ClipTextEncodeNode,
    runner::{init_tracing, run_node},
    version,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = TextEncodeCli::parse();

    info!("🚀 Starting CLIP text-encode node ({})", version::get_version_string());

    match start(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn start(cli: TextEncodeCli) -> Result<()> {
    let config = cli.resolve()?;
    let encoder_config = config.encoder.clone().unwrap_or_default();

    // Loaded once; every request reuses it
    info!("🧠 Loading CLIP model... this can take a few minutes on first run");
    let encoder = OnnxClipTextEncoder::load(&encoder_config)
        .await
        .context("Failed to load text encoder")?;
    let encoder_info = encoder.info();
    info!(
        "✅ Model loaded: {} ({} dimensions)",
        encoder_info.model_name, encoder_info.dimension
    );

    let node = ClipTextEncodeNode::new(Arc::new(encoder), encoder_config.preview_len);
    run_node(node, &config).await
}
