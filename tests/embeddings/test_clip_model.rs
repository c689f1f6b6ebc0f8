// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP text encoder tests against the real ONNX export
//!
//! These need the model files (`onnx/text_model.onnx` and `tokenizer.json`
//! from Xenova/clip-vit-base-patch32) under CLIP_TEST_MODEL_DIR, so they are
//! ignored by default. Run with `cargo test -- --ignored`.

use ndnm_nodes::{
    config::EncoderConfig,
    embeddings::{OnnxClipTextEncoder, TextEncoder},
};
use std::path::PathBuf;

const DEFAULT_MODEL_DIR: &str = "./models/clip-vit-base-patch32";

fn test_config() -> EncoderConfig {
    let dir = std::env::var("CLIP_TEST_MODEL_DIR").unwrap_or_else(|_| DEFAULT_MODEL_DIR.into());
    EncoderConfig {
        local_dir: Some(PathBuf::from(dir)),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_model_loads_with_512_dimensions() {
    let encoder = OnnxClipTextEncoder::load(&test_config()).await.unwrap();
    let info = encoder.info();
    assert_eq!(info.dimension, 512);
    assert_eq!(info.max_length, 77);
    assert_eq!(info.model_name, "openai/clip-vit-base-patch32");
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_encode_shape() {
    let encoder = OnnxClipTextEncoder::load(&test_config()).await.unwrap();
    let embedding = encoder.encode("a photo of a cat").await.unwrap();

    assert_eq!(embedding.shape, vec![1, 512]);
    assert_eq!(embedding.values.len(), 512);
    assert_eq!(embedding.preview(5).len(), 5);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_encode_is_deterministic() {
    let encoder = OnnxClipTextEncoder::load(&test_config()).await.unwrap();
    let a = encoder.encode("a red bicycle").await.unwrap();
    let b = encoder.encode("a red bicycle").await.unwrap();
    let c = encoder.encode("a bowl of soup").await.unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_long_text_is_truncated_not_rejected() {
    let encoder = OnnxClipTextEncoder::load(&test_config()).await.unwrap();
    let long_text = "word ".repeat(1_000);

    let embedding = encoder.encode(&long_text).await.unwrap();
    assert_eq!(embedding.shape, vec![1, 512]);
}

#[tokio::test]
#[ignore] // Only run if model files are downloaded
async fn test_dimension_mismatch_rejected_at_load() {
    let config = EncoderConfig {
        dimension: Some(384),
        ..test_config()
    };

    let err = OnnxClipTextEncoder::load(&config).await.unwrap_err();
    assert!(err.to_string().contains("expected 384"));
}

#[tokio::test]
async fn test_missing_local_dir_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = EncoderConfig {
        local_dir: Some(dir.path().join("absent")),
        ..Default::default()
    };

    let err = OnnxClipTextEncoder::load(&config).await.unwrap_err();
    assert!(err.to_string().contains("not found"));
}
