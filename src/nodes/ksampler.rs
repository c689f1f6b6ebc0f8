// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! K-Sampler node (placeholder)
//!
//! The denoising loop is not implemented yet. `/run` accepts any body and
//! always answers with [`PENDING_MESSAGE`]; the body is parsed only so the
//! log shows what the pipeline sent.

use crate::api::ApiError;
use crate::node::Node;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

pub const NODE_NAME: &str = "node-ksampler";

pub const PENDING_MESSAGE: &str = "K-Sampler node is online, implementation pending!";

/// Inputs the sampler will consume once implemented
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct KSamplerInput {
    pub latent_data: Option<Vec<f32>>,
    pub prompt_embeds: Option<Vec<f32>>,
    pub negative_prompt_embeds: Option<Vec<f32>>,
    pub steps: Option<u32>,
    pub cfg_scale: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KSamplerResponse {
    pub status: String,
    pub message: String,
}

#[derive(Debug, Clone, Default)]
pub struct KSamplerNode;

#[async_trait]
impl Node for KSamplerNode {
    type Input = KSamplerInput;
    type Output = KSamplerResponse;

    fn name(&self) -> &'static str {
        NODE_NAME
    }

    /// Never rejects a body
    fn decode_input(&self, body: &[u8]) -> Result<KSamplerInput, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(KSamplerInput::default());
        }
        match serde_json::from_slice(body) {
            Ok(input) => Ok(input),
            Err(e) => {
                debug!("Ignoring unparseable K-Sampler body: {}", e);
                Ok(KSamplerInput::default())
            }
        }
    }

    async fn process(&self, input: KSamplerInput) -> Result<KSamplerResponse, ApiError> {
        // TODO: run the UNet + scheduler denoising loop and return the final latent
        info!(
            "K-Sampler run requested (steps={:?}, cfg_scale={:?}, latent={}, prompt_embeds={}, negative_prompt_embeds={})",
            input.steps,
            input.cfg_scale,
            input.latent_data.as_ref().map_or(0, Vec::len),
            input.prompt_embeds.as_ref().map_or(0, Vec::len),
            input.negative_prompt_embeds.as_ref().map_or(0, Vec::len),
        );

        Ok(KSamplerResponse {
            status: "success".to_string(),
            message: PENDING_MESSAGE.to_string(),
        })
    }
}
