// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Command line interfaces of the node binaries

use crate::config::{ConfigError, EncoderConfig, FieldConfig, NodeConfig};
use clap::{Args, Parser};
use std::path::PathBuf;

/// Default port of the text-encode node
pub const TEXT_ENCODE_PORT: u16 = 3007;

/// Default port of the K-Sampler node
pub const KSAMPLER_PORT: u16 = 3008;

/// Flags shared by every node
#[derive(Args, Debug, Clone, Default)]
pub struct NodeArgs {
    /// Path to a TOML config file (default: ./config.toml if present)
    #[arg(long, env = "NDNM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Port to listen on (overrides the config file)
    #[arg(short, long, env = "NDNM_PORT")]
    pub port: Option<u16>,

    /// Address to bind (overrides the config file)
    #[arg(long, env = "NDNM_HOST")]
    pub host: Option<String>,
}

impl NodeArgs {
    /// Layers defaults, config file and flags into the final config
    pub fn resolve(&self, defaults: NodeConfig) -> Result<NodeConfig, ConfigError> {
        let mut config = NodeConfig::load(self.config.as_deref(), defaults)?;
        config.apply_overrides(self.host.clone(), self.port);
        config.validate()?;
        Ok(config)
    }
}

/// CLIP text encoder node
#[derive(Parser, Debug)]
#[command(name = "node-clip-text-encode")]
#[command(version)]
#[command(about = "ndnm node: encodes text into CLIP embeddings", long_about = None)]
pub struct TextEncodeCli {
    #[command(flatten)]
    pub node: NodeArgs,

    /// Directory holding the ONNX export and tokenizer.json (skips the hub download)
    #[arg(long, env = "CLIP_MODEL_DIR")]
    pub model_dir: Option<PathBuf>,

    /// Hugging Face repo with the ONNX export
    #[arg(long, env = "CLIP_MODEL_REPO")]
    pub model_repo: Option<String>,
}

impl TextEncodeCli {
    pub fn defaults() -> NodeConfig {
        let mut config = NodeConfig::with_port(TEXT_ENCODE_PORT);
        config.label = Some("CLIP Text Encode".to_string());
        config.node_type = Some("text-encoder".to_string());
        config.input_fields = vec![FieldConfig::new("text", "string")];
        config.output_fields = vec![FieldConfig::new("embedding", "tensor")];
        config.encoder = Some(EncoderConfig::default());
        config
    }

    pub fn resolve(&self) -> Result<NodeConfig, ConfigError> {
        let mut config = self.node.resolve(Self::defaults())?;
        let encoder = config.encoder.get_or_insert_with(EncoderConfig::default);
        if let Some(dir) = &self.model_dir {
            encoder.local_dir = Some(dir.clone());
        }
        if let Some(repo) = &self.model_repo {
            encoder.repo = repo.clone();
        }
        Ok(config)
    }
}

/// K-Sampler placeholder node
#[derive(Parser, Debug)]
#[command(name = "node-ksampler")]
#[command(version)]
#[command(about = "ndnm node: K-Sampler denoising step (placeholder)", long_about = None)]
pub struct KSamplerCli {
    #[command(flatten)]
    pub node: NodeArgs,
}

impl KSamplerCli {
    pub fn defaults() -> NodeConfig {
        let mut config = NodeConfig::with_port(KSAMPLER_PORT);
        config.label = Some("K-Sampler".to_string());
        config.node_type = Some("sampler".to_string());
        config.input_fields = vec![
            FieldConfig::new("latent_data", "tensor"),
            FieldConfig::new("prompt_embeds", "tensor"),
            FieldConfig::new("negative_prompt_embeds", "tensor"),
            FieldConfig::new("steps", "int"),
            FieldConfig::new("cfg_scale", "float"),
        ];
        config.output_fields = vec![FieldConfig::new("latent_data", "tensor")];
        config
    }

    pub fn resolve(&self) -> Result<NodeConfig, ConfigError> {
        self.node.resolve(Self::defaults())
    }
}
