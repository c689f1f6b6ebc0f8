// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod api;
pub mod cli;
pub mod config;
pub mod embeddings;
pub mod node;
pub mod nodes;
pub mod runner;
pub mod version;

pub use api::{create_app, ApiError, AppState};
pub use config::{EncoderConfig, NodeConfig};
pub use embeddings::{EncoderInfo, OnnxClipTextEncoder, TextEmbedding, TextEncoder};
pub use node::{Node, NodeInfo};
pub use nodes::{ClipTextEncodeNode, KSamplerNode};
