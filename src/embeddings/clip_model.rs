// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! ONNX CLIP Text Encoder
//!
//! Wraps ONNX Runtime around the text tower of `openai/clip-vit-base-patch32`.
//!
//! Features:
//! - ONNX model loading from disk or the Hugging Face cache
//! - GPU acceleration via CUDA (with automatic CPU fallback)
//! - CLIP BPE tokenization with truncation to 77 tokens
//! - Projected `text_embeds` output when the export has it, otherwise the
//!   end-of-text row of `last_hidden_state`
//! - 512-dimensional output vectors for the default model

use super::{EncoderInfo, OutputKind, TextEmbedding, TextEncoder};
use crate::config::EncoderConfig;
use crate::embeddings::model_source::{resolve_model_files, ModelFiles};
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use ndarray::{Array2, ArrayViewD, Axis};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::{Tokenizer, TruncationParams};
use tracing::{debug, info, warn};

/// Output name of the projected sentence embedding in HF/Optimum exports
const PROJECTED_OUTPUT: &str = "text_embeds";

/// CLIP text encoder backed by ONNX Runtime
///
/// The session is behind `Arc<Mutex>` since `Session::run` needs `&mut`;
/// cloning the encoder is cheap and shares the loaded model.
#[derive(Clone)]
pub struct OnnxClipTextEncoder {
    session: Arc<Mutex<Session>>,
    tokenizer: Arc<Tokenizer>,
    /// Whether the graph declares an `attention_mask` input
    feeds_attention_mask: bool,
    output_name: String,
    info: EncoderInfo,
}

impl std::fmt::Debug for OnnxClipTextEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClipTextEncoder")
            .field("info", &self.info)
            .field("output_name", &self.output_name)
            .field("feeds_attention_mask", &self.feeds_attention_mask)
            .finish_non_exhaustive()
    }
}

impl OnnxClipTextEncoder {
    /// Resolves the model files (local dir or hub) and loads the encoder
    pub async fn load(config: &EncoderConfig) -> Result<Self> {
        let files = resolve_model_files(config).await?;
        let config = config.clone();
        tokio::task::spawn_blocking(move || Self::from_files(&files, &config))
            .await
            .context("Model loading task panicked")?
    }

    /// Loads the encoder from files already on disk
    ///
    /// Runs a validation inference to detect the output layout and
    /// dimension. Fails if `config.dimension` is set and does not match.
    pub fn from_files(files: &ModelFiles, config: &EncoderConfig) -> Result<Self> {
        info!(
            "Loading CLIP text encoder {} from {}",
            config.model_name,
            files.model_path.display()
        );

        let mut session = create_session(&files.model_path, config.intra_threads)?;

        let input_names: Vec<&str> = session.inputs.iter().map(|i| i.name.as_str()).collect();
        if !input_names.contains(&"input_ids") {
            anyhow::bail!(
                "Model has no input_ids input (inputs: {:?})",
                input_names
            );
        }
        let feeds_attention_mask = input_names.contains(&"attention_mask");

        let output_name = session
            .outputs
            .iter()
            .find(|o| o.name == PROJECTED_OUTPUT)
            .or_else(|| session.outputs.first())
            .map(|o| o.name.clone())
            .ok_or_else(|| anyhow!("Model declares no outputs"))?;

        let mut tokenizer = Tokenizer::from_file(&files.tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: config.max_length,
                ..Default::default()
            }))
            .map_err(|e| anyhow!("Failed to configure truncation: {}", e))?;
        tokenizer.with_padding(None);

        // Validation inference, also tells us which layout the export uses
        let probe_ids = tokenize(&tokenizer, "validation test")?;
        let (output_kind, probe) =
            run_session(&mut session, &probe_ids, feeds_attention_mask, &output_name)?;
        let dimension = probe.dimension();

        if let Some(expected) = config.dimension {
            if expected != dimension {
                anyhow::bail!(
                    "Model outputs {} dimensions (expected {})",
                    dimension,
                    expected
                );
            }
        }

        info!(
            "✅ CLIP text encoder loaded: output={} ({:?}), {} dimensions",
            output_name, output_kind, dimension
        );

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            feeds_attention_mask,
            output_name,
            info: EncoderInfo {
                model_name: config.model_name.clone(),
                dimension,
                max_length: config.max_length,
                output_kind,
            },
        })
    }

    fn encode_blocking(&self, text: &str) -> Result<TextEmbedding> {
        let ids = tokenize(&self.tokenizer, text)?;
        debug!("Tokenized {} chars into {} tokens", text.len(), ids.len());

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("ONNX session mutex poisoned"))?;
        let (_, embedding) = run_session(
            &mut session,
            &ids,
            self.feeds_attention_mask,
            &self.output_name,
        )?;
        Ok(embedding)
    }
}

#[async_trait]
impl TextEncoder for OnnxClipTextEncoder {
    async fn encode(&self, text: &str) -> Result<TextEmbedding> {
        let encoder = self.clone();
        let text = text.to_string();
        tokio::task::spawn_blocking(move || encoder.encode_blocking(&text))
            .await
            .context("Encoding task panicked")?
    }

    fn info(&self) -> EncoderInfo {
        self.info.clone()
    }
}

/// Builds a session on CUDA, falling back to CPU
fn create_session(model_path: &Path, intra_threads: usize) -> Result<Session> {
    if !model_path.exists() {
        anyhow::bail!("ONNX model file not found: {}", model_path.display());
    }

    info!("   Attempting CUDA execution provider...");
    let cuda_result = Session::builder()
        .context("Failed to create session builder")?
        .with_execution_providers([CUDAExecutionProvider::default().build()])
        .context("Failed to set CUDA execution provider")?
        .with_optimization_level(GraphOptimizationLevel::Level3)
        .context("Failed to set optimization level")?
        .with_intra_threads(intra_threads)
        .context("Failed to set intra threads")?
        .commit_from_file(model_path);

    match cuda_result {
        Ok(session) => {
            info!("✅ CUDA execution provider initialized");
            Ok(session)
        }
        Err(e) => {
            warn!("⚠️  CUDA execution provider failed: {}", e);
            warn!("   Falling back to CPU execution provider");
            Session::builder()
                .context("Failed to create session builder")?
                .with_execution_providers([CPUExecutionProvider::default().build()])
                .context("Failed to set CPU execution provider")?
                .with_optimization_level(GraphOptimizationLevel::Level3)
                .context("Failed to set optimization level")?
                .with_intra_threads(intra_threads)
                .context("Failed to set intra threads")?
                .commit_from_file(model_path)
                .with_context(|| {
                    format!("Failed to load ONNX model from {}", model_path.display())
                })
        }
    }
}

fn tokenize(tokenizer: &Tokenizer, text: &str) -> Result<Vec<i64>> {
    let encoding = tokenizer
        .encode(text, true)
        .map_err(|e| anyhow!("Tokenization failed: {}", e))?;
    let ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
    if ids.is_empty() {
        anyhow::bail!("Tokenizer produced no tokens");
    }
    Ok(ids)
}

fn run_session(
    session: &mut Session,
    ids: &[i64],
    feeds_attention_mask: bool,
    output_name: &str,
) -> Result<(OutputKind, TextEmbedding)> {
    let input_ids = Array2::from_shape_vec((1, ids.len()), ids.to_vec())
        .context("Failed to create input_ids array")?;

    let outputs = if feeds_attention_mask {
        let attention_mask = Array2::<i64>::ones((1, ids.len()));
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids)?,
            "attention_mask" => Value::from_array(attention_mask)?
        ])?
    } else {
        session.run(ort::inputs![
            "input_ids" => Value::from_array(input_ids)?
        ])?
    };

    let output = outputs[output_name]
        .try_extract_array::<f32>()
        .context("Failed to extract output tensor")?;

    read_embedding(output, ids)
}

/// Turns the raw encoder output into a `[1, dim]` embedding
fn read_embedding(output: ArrayViewD<'_, f32>, ids: &[i64]) -> Result<(OutputKind, TextEmbedding)> {
    match output.ndim() {
        2 => {
            let row = output.index_axis(Axis(0), 0);
            let values: Vec<f32> = row.iter().copied().collect();
            Ok((
                OutputKind::Projected,
                TextEmbedding::new(vec![1, values.len()], values),
            ))
        }
        3 => {
            let hidden = output.index_axis(Axis(0), 0); // [seq_len, hidden_dim]
            let eos = eos_position(ids);
            if eos >= hidden.shape()[0] {
                anyhow::bail!(
                    "End-of-text position {} outside sequence of length {}",
                    eos,
                    hidden.shape()[0]
                );
            }
            let values: Vec<f32> = hidden.index_axis(Axis(0), eos).iter().copied().collect();
            Ok((
                OutputKind::EosPooled,
                TextEmbedding::new(vec![1, values.len()], values),
            ))
        }
        _ => anyhow::bail!(
            "Model outputs unexpected dimensions: {:?} (expected [batch, dim] or [batch, seq_len, dim])",
            output.shape()
        ),
    }
}

/// CLIP's end-of-text token has the highest id in the vocabulary, so its
/// position is the argmax of the ids (first occurrence).
fn eos_position(ids: &[i64]) -> usize {
    ids.iter()
        .enumerate()
        .fold((0, i64::MIN), |(best_idx, best), (idx, &id)| {
            if id > best {
                (idx, id)
            } else {
                (best_idx, best)
            }
        })
        .0
}
