// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Pipeline node abstraction
//!
//! Every node exposes the same HTTP surface (`/health`, `/run`, `/info`).
//! What differs is the input it accepts and the work done in `process`,
//! which is captured by the [`Node`] trait.

use crate::api::ApiError;
use crate::config::{FieldConfig, NodeConfig};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::error::Category;

/// A single pipeline node.
///
/// `decode_input` turns the raw `/run` body into `Input`, `validate` runs
/// cheap checks, and `process` does the node's work.
#[async_trait]
pub trait Node: Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;
    type Output: Serialize + Send + 'static;

    /// Stable node name (e.g. "node-clip-text-encode")
    fn name(&self) -> &'static str;

    /// Decodes the request body. Defaults to strict JSON.
    fn decode_input(&self, body: &[u8]) -> Result<Self::Input, ApiError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(ApiError::UnprocessableEntity(
                "request body is empty".to_string(),
            ));
        }
        serde_json::from_slice(body).map_err(|e| match e.classify() {
            Category::Data => ApiError::ValidationError {
                field: "body".to_string(),
                message: e.to_string(),
            },
            _ => ApiError::UnprocessableEntity(e.to_string()),
        })
    }

    fn validate(&self, _input: &Self::Input) -> Result<(), ApiError> {
        Ok(())
    }

    async fn process(&self, input: Self::Input) -> Result<Self::Output, ApiError>;
}

/// Node metadata served by `GET /info`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeInfo {
    pub name: String,
    pub label: Option<String>,
    pub node_type: Option<String>,
    pub version: String,
    pub features: Vec<String>,
    pub port: u16,
    pub input_fields: Vec<FieldConfig>,
    pub output_fields: Vec<FieldConfig>,
}

impl NodeInfo {
    pub fn new(name: &str, config: &NodeConfig) -> Self {
        Self {
            name: name.to_string(),
            label: config.label.clone(),
            node_type: config.node_type.clone(),
            version: crate::version::VERSION_NUMBER.to_string(),
            features: crate::version::FEATURES
                .iter()
                .map(|f| f.to_string())
                .collect(),
            port: config.port,
            input_fields: config.input_fields.clone(),
            output_fields: config.output_fields.clone(),
        }
    }
}
