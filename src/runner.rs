// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Startup plumbing shared by the node binaries

use crate::api::{create_app, AppState};
use crate::config::NodeConfig;
use crate::node::{Node, NodeInfo};
use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Installs the fmt subscriber; `RUST_LOG` wins, `info` otherwise
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Binds the listener and serves `node` until Ctrl+C / SIGTERM
pub async fn run_node<N: Node>(node: N, config: &NodeConfig) -> Result<()> {
    let name = node.name();
    let info = NodeInfo::new(name, config);
    let app = create_app(AppState::new(node, info));

    let listener = bind_listener(config).await?;
    let addr = listener.local_addr().context("Failed to read local address")?;

    info!("{} listening on http://{}", name, addr);
    info!("  Health:  GET  http://{}/health", addr);
    info!("  Run:     POST http://{}/run", addr);
    info!("  Info:    GET  http://{}/info", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("👋 {} stopped", name);
    Ok(())
}

/// Binds `host:port`; hostnames such as `localhost` are resolved
pub async fn bind_listener(config: &NodeConfig) -> Result<TcpListener> {
    let bind_addr = config.bind_addr();
    TcpListener::bind(bind_addr.as_str())
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("⏹️  Shutting down...");
}
