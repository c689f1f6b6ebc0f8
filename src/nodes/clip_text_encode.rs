// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! CLIP text-encode node
//!
//! `POST /run` with `{"text": "..."}` returns the embedding shape and a short
//! preview of its leading values.

use crate::api::ApiError;
use crate::embeddings::TextEncoder;
use crate::node::Node;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

pub const NODE_NAME: &str = "node-clip-text-encode";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextEncodeRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TextEncodeResponse {
    pub status: String,
    pub text: String,
    pub embedding_shape: Vec<usize>,
    pub embedding_preview: Vec<f32>,
}

pub struct ClipTextEncodeNode {
    encoder: Arc<dyn TextEncoder>,
    preview_len: usize,
}

impl ClipTextEncodeNode {
    pub fn new(encoder: Arc<dyn TextEncoder>, preview_len: usize) -> Self {
        Self {
            encoder,
            preview_len,
        }
    }
}

#[async_trait]
impl Node for ClipTextEncodeNode {
    type Input = TextEncodeRequest;
    type Output = TextEncodeResponse;

    fn name(&self) -> &'static str {
        NODE_NAME
    }

    async fn process(&self, input: TextEncodeRequest) -> Result<TextEncodeResponse, ApiError> {
        info!("Received text to encode: '{}'", input.text);

        let embedding = self.encoder.encode(&input.text).await?;

        info!(
            "Embedding generated: shape {:?}, {} values per row",
            embedding.shape,
            embedding.dimension()
        );

        Ok(TextEncodeResponse {
            status: "success".to_string(),
            embedding_preview: embedding.preview(self.preview_len),
            embedding_shape: embedding.shape,
            text: input.text,
        })
    }
}
