// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! GET /info reports node metadata

use super::helpers::{ksampler_app, send, text_encode_app};
use axum::http::StatusCode;
use ndnm_nodes::version::VERSION_NUMBER;

#[tokio::test]
async fn test_text_encode_info() {
    let (status, body) = send(text_encode_app(512), "GET", "/info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "node-clip-text-encode");
    assert_eq!(body["port"], 3007);
    assert_eq!(body["version"], VERSION_NUMBER);
    let features = body["features"].as_array().unwrap();
    assert!(features.iter().any(|f| f == "clip-text-encode"));
    assert_eq!(body["input_fields"][0]["name"], "text");
    assert_eq!(body["input_fields"][0]["type"], "string");
}

#[tokio::test]
async fn test_ksampler_info() {
    let (status, body) = send(ksampler_app(), "GET", "/info", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "node-ksampler");
    assert_eq!(body["port"], 3008);
    assert_eq!(body["node_type"], "sampler");
    assert!(body["features"]
        .as_array()
        .unwrap()
        .iter()
        .any(|f| f == "ksampler-placeholder"));
    assert_eq!(body["input_fields"].as_array().unwrap().len(), 5);
}
