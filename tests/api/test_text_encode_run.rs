// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! POST /run on the text-encode node

use super::helpers::{send, text_encode_app};
use axum::http::StatusCode;

#[tokio::test]
async fn test_run_returns_shape_and_five_value_preview() {
    let (status, body) = send(
        text_encode_app(512),
        "POST",
        "/run",
        Some(r#"{"text": "a photo of an astronaut riding a horse"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["text"], "a photo of an astronaut riding a horse");

    let shape = body["embedding_shape"].as_array().unwrap();
    assert_eq!(shape.len(), 2);
    assert_eq!(shape[0], 1);
    assert_eq!(shape[1], 512);

    let preview = body["embedding_preview"].as_array().unwrap();
    assert_eq!(preview.len(), 5);
    assert_eq!(preview[0].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_preview_shorter_for_small_embeddings() {
    let (status, body) = send(text_encode_app(3), "POST", "/run", Some(r#"{"text": "hi"}"#)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["embedding_preview"].as_array().unwrap().len(), 3);
    assert_eq!(body["embedding_shape"][1], 3);
}

#[tokio::test]
async fn test_missing_text_is_422() {
    let (status, body) = send(text_encode_app(512), "POST", "/run", Some(r#"{}"#)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], "error");
    assert_eq!(body["error_type"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("text"));
}

#[tokio::test]
async fn test_wrong_text_type_is_422() {
    let (status, _) = send(text_encode_app(512), "POST", "/run", Some(r#"{"text": 42}"#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_malformed_json_is_422() {
    let (status, body) = send(text_encode_app(512), "POST", "/run", Some(r#"{"text": "#)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "unprocessable_entity");
}

#[tokio::test]
async fn test_empty_body_is_422() {
    let (status, _) = send(text_encode_app(512), "POST", "/run", None).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_encoder_failure_is_500() {
    let (status, body) = send(
        text_encode_app(512),
        "POST",
        "/run",
        Some(r#"{"text": "bad\u0000input"}"#),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error_type"], "internal_error");
    assert!(body["message"]
        .as_str()
        .unwrap()
        .contains("Tokenization failed"));
}

#[tokio::test]
async fn test_concurrent_requests_are_independent() {
    let app = text_encode_app(16);
    let mut handles = Vec::new();
    for i in 0..8 {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let body = format!(r#"{{"text": "prompt {}"}}"#, i);
            send(app, "POST", "/run", Some(&body)).await
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], format!("prompt {}", i));
    }
}
