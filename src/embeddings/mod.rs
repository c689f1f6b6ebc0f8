// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Text embeddings
//!
//! [`TextEncoder`] is the seam between the HTTP node and the model runtime.
//! The production implementation is [`OnnxClipTextEncoder`].

pub mod clip_model;
pub mod model_source;

pub use clip_model::OnnxClipTextEncoder;
pub use model_source::{resolve_model_files, ModelFiles};

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// How the sentence embedding is read out of the ONNX graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputKind {
    /// `text_embeds` output, `[batch, dim]`, already projected
    Projected,
    /// `last_hidden_state` output, `[batch, seq, dim]`; the end-of-text row is taken
    EosPooled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncoderInfo {
    pub model_name: String,
    pub dimension: usize,
    pub max_length: usize,
    pub output_kind: OutputKind,
}

/// Encoder output for one batch, row-major
#[derive(Debug, Clone, PartialEq)]
pub struct TextEmbedding {
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
}

impl TextEmbedding {
    pub fn new(shape: Vec<usize>, values: Vec<f32>) -> Self {
        Self { shape, values }
    }

    /// Width of one row (the last dimension)
    pub fn dimension(&self) -> usize {
        self.shape.last().copied().unwrap_or(0)
    }

    /// First row of the batch
    pub fn first_row(&self) -> &[f32] {
        let end = self.dimension().min(self.values.len());
        &self.values[..end]
    }

    /// At most `len` leading values of the first row
    pub fn preview(&self, len: usize) -> Vec<f32> {
        self.first_row().iter().take(len).copied().collect()
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TextEncoder: Send + Sync {
    /// Encodes a single text into a `[1, dim]` embedding
    async fn encode(&self, text: &str) -> Result<TextEmbedding>;

    fn info(&self) -> EncoderInfo;
}
