// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Node configuration
//!
//! Configuration is layered: each binary supplies its own defaults, an
//! optional TOML file overrides them key by key, and CLI flags or
//! environment variables (see [`crate::cli`]) override the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Config file looked up in the working directory when `--config` is not given
pub const DEFAULT_CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode default config: {0}")]
    Defaults(#[from] toml::ser::Error),

    #[error("invalid port {0}: must be between 1 and 65535")]
    InvalidPort(u16),

    #[error("invalid value for {field}: {message}")]
    Invalid { field: String, message: String },
}

/// Declared input or output of a node, reported by `/info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
}

impl FieldConfig {
    pub fn new(name: &str, field_type: &str) -> Self {
        Self {
            name: name.to_string(),
            field_type: field_type.to_string(),
        }
    }
}

/// Settings for the CLIP text encoder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EncoderConfig {
    /// Name reported to clients (the upstream PyTorch checkpoint)
    pub model_name: String,
    /// Hugging Face repo holding the ONNX export
    pub repo: String,
    pub revision: String,
    /// Path of the ONNX graph inside the repo or `local_dir`
    pub model_file: String,
    pub tokenizer_file: String,
    /// Read model files from here instead of the hub
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_dir: Option<PathBuf>,
    /// Overrides the hub cache location (defaults to `$HF_HOME`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Token limit; CLIP's context length is 77
    pub max_length: usize,
    /// Expected output dimension, checked when the model loads
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
    /// Number of leading values returned in `embedding_preview`
    pub preview_len: usize,
    pub intra_threads: usize,
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            model_name: "openai/clip-vit-base-patch32".to_string(),
            repo: "Xenova/clip-vit-base-patch32".to_string(),
            revision: "main".to_string(),
            model_file: "onnx/text_model.onnx".to_string(),
            tokenizer_file: "tokenizer.json".to_string(),
            local_dir: None,
            cache_dir: None,
            max_length: 77,
            dimension: Some(512),
            preview_len: 5,
            intra_threads: 4,
        }
    }
}

impl EncoderConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_length == 0 {
            return Err(ConfigError::Invalid {
                field: "encoder.max_length".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.dimension == Some(0) {
            return Err(ConfigError::Invalid {
                field: "encoder.dimension".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        if self.intra_threads == 0 {
            return Err(ConfigError::Invalid {
                field: "encoder.intra_threads".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration shared by every node binary
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeConfig {
    pub host: String,
    pub port: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default)]
    pub input_fields: Vec<FieldConfig>,
    #[serde(default)]
    pub output_fields: Vec<FieldConfig>,
    /// Present only for nodes that load a text encoder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder: Option<EncoderConfig>,
}

impl NodeConfig {
    pub fn with_port(port: u16) -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port,
            label: None,
            node_type: None,
            input_fields: Vec::new(),
            output_fields: Vec::new(),
            encoder: None,
        }
    }

    /// Loads `path` (or `config.toml` if present) on top of `defaults`.
    ///
    /// An explicit path that does not exist is an error; a missing default
    /// file is not.
    pub fn load(path: Option<&Path>, defaults: NodeConfig) -> Result<Self, ConfigError> {
        let path = match path {
            Some(p) if !p.exists() => return Err(ConfigError::NotFound(p.to_path_buf())),
            Some(p) => p.to_path_buf(),
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !p.exists() {
                    debug!("No {} found, using built-in defaults", DEFAULT_CONFIG_FILE);
                    return Ok(defaults);
                }
                p
            }
        };

        let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml_str(&content, defaults).map_err(|e| match e {
            ConfigError::Parse { source, .. } => ConfigError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;

        info!("Using config: {}", path.display());
        Ok(config)
    }

    /// Parses TOML and overlays it key by key on `defaults`
    pub fn from_toml_str(content: &str, defaults: NodeConfig) -> Result<Self, ConfigError> {
        let overlay: toml::Table = content.parse().map_err(|source| ConfigError::Parse {
            path: PathBuf::new(),
            source,
        })?;

        let mut base = match toml::Value::try_from(&defaults)? {
            toml::Value::Table(table) => table,
            _ => toml::Table::new(),
        };
        merge_tables(&mut base, overlay);

        toml::Value::Table(base)
            .try_into()
            .map_err(|source| ConfigError::Parse {
                path: PathBuf::new(),
                source,
            })
    }

    /// Applies CLI/env overrides
    pub fn apply_overrides(&mut self, host: Option<String>, port: Option<u16>) {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port));
        }
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host".to_string(),
                message: "must not be empty".to_string(),
            });
        }
        if let Some(encoder) = &self.encoder {
            encoder.validate()?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Recursively overlays `overlay` onto `base`. Tables merge, everything else replaces.
fn merge_tables(base: &mut toml::Table, overlay: toml::Table) {
    for (key, value) in overlay {
        match (base.get_mut(&key), value) {
            (Some(toml::Value::Table(existing)), toml::Value::Table(incoming)) => {
                merge_tables(existing, incoming);
            }
            (_, value) => {
                base.insert(key, value);
            }
        }
    }
}
