// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use ndnm_nodes::{
    cli::KSamplerCli,
    nodes::KSamplerNode,
    runner::{init_tracing, run_node},
    version,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let cli = KSamplerCli::parse();

    info!("🚀 Starting K-Sampler node ({})", version::get_version_string());

    match start(cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn start(cli: KSamplerCli) -> Result<()> {
    let config = cli.resolve()?;
    run_node(KSamplerNode, &config).await
}
