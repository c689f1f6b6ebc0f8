// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /run on the K-Sampler node always answers with the pending message

use super::helpers::{ksampler_app, send};
use axum::http::StatusCode;
use ndnm_nodes::nodes::PENDING_MESSAGE;
use serde_json::json;

fn expected() -> serde_json::Value {
    json!({"status": "success", "message": PENDING_MESSAGE})
}

#[tokio::test]
async fn test_run_with_empty_object() {
    let (status, body) = send(ksampler_app(), "POST", "/run", Some("{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected());
}

#[tokio::test]
async fn test_run_with_planned_inputs() {
    let payload = r#"{
        "latent_data": [0.0, 0.1, 0.2],
        "prompt_embeds": [0.5, 0.5],
        "negative_prompt_embeds": [],
        "steps": 20,
        "cfg_scale": 7.0
    }"#;
    let (status, body) = send(ksampler_app(), "POST", "/run", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, expected());
}

#[tokio::test]
async fn test_run_ignores_any_body() {
    for payload in [None, Some("garbage"), Some("[1,2]"), Some(r#"{"steps": "x"}"#)] {
        let (status, body) = send(ksampler_app(), "POST", "/run", payload).await;
        assert_eq!(status, StatusCode::OK, "payload {:?}", payload);
        assert_eq!(body, expected(), "payload {:?}", payload);
    }
}
