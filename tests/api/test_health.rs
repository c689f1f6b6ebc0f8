// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /health on both nodes

use super::helpers::{ksampler_app, send, text_encode_app};
use axum::http::StatusCode;
use serde_json::json;

#[tokio::test]
async fn test_text_encode_health_ok() {
    let (status, body) = send(text_encode_app(512), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_ksampler_health_ok() {
    let (status, body) = send(ksampler_app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_health_rejects_post() {
    let (status, _) = send(ksampler_app(), "POST", "/health", Some("{}")).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_run_rejects_get() {
    let (status, _) = send(text_encode_app(512), "GET", "/run", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (status, _) = send(ksampler_app(), "GET", "/v1/embed", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
