// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

use super::ApiError;
use crate::node::{Node, NodeInfo};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthResponse {
    pub status: String,
}

pub struct AppState<N: Node> {
    pub node: Arc<N>,
    pub info: Arc<NodeInfo>,
}

impl<N: Node> AppState<N> {
    pub fn new(node: N, info: NodeInfo) -> Self {
        Self {
            node: Arc::new(node),
            info: Arc::new(info),
        }
    }
}

impl<N: Node> Clone for AppState<N> {
    fn clone(&self) -> Self {
        Self {
            node: Arc::clone(&self.node),
            info: Arc::clone(&self.info),
        }
    }
}

/// Router exposing `/health`, `/run` and `/info` for a node
pub fn create_app<N: Node>(state: AppState<N>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/run", post(run_handler::<N>))
        .route("/info", get(info_handler::<N>))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

async fn info_handler<N: Node>(State(state): State<AppState<N>>) -> Json<NodeInfo> {
    Json(state.info.as_ref().clone())
}

async fn run_handler<N: Node>(
    State(state): State<AppState<N>>,
    body: Bytes,
) -> Result<impl IntoResponse, ApiError> {
    let node = state.node.as_ref();
    debug!("{}: /run with {} byte body", node.name(), body.len());

    let input = node.decode_input(&body)?;
    node.validate(&input)?;

    let output = node.process(input).await.map_err(|e| {
        error!("{}: run failed: {}", node.name(), e);
        e
    })?;
    Ok(Json(output))
}
