// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Locates the ONNX graph and tokenizer for the text encoder.
//!
//! Files are read from `encoder.local_dir` when set, otherwise fetched from
//! the Hugging Face Hub into the local cache (first start downloads, later
//! starts hit the cache).

use crate::config::EncoderConfig;
use anyhow::{Context, Result};
use hf_hub::api::tokio::{ApiBuilder, ApiRepo};
use hf_hub::{Repo, RepoType};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

const MAX_DOWNLOAD_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct ModelFiles {
    pub model_path: PathBuf,
    pub tokenizer_path: PathBuf,
}

pub async fn resolve_model_files(config: &EncoderConfig) -> Result<ModelFiles> {
    match &config.local_dir {
        Some(dir) => {
            let files = ModelFiles {
                model_path: dir.join(&config.model_file),
                tokenizer_path: dir.join(&config.tokenizer_file),
            };
            if !files.model_path.exists() {
                anyhow::bail!("ONNX model file not found: {}", files.model_path.display());
            }
            if !files.tokenizer_path.exists() {
                anyhow::bail!(
                    "Tokenizer file not found: {}",
                    files.tokenizer_path.display()
                );
            }
            info!("Using local model files from {}", dir.display());
            Ok(files)
        }
        None => download_from_hub(config).await,
    }
}

async fn download_from_hub(config: &EncoderConfig) -> Result<ModelFiles> {
    info!(
        "Fetching {} and {} from {}@{} (first run downloads, this can take a while)",
        config.model_file, config.tokenizer_file, config.repo, config.revision
    );

    let mut builder = ApiBuilder::new().with_progress(false);
    if let Some(cache_dir) = &config.cache_dir {
        builder = builder.with_cache_dir(cache_dir.clone());
    }
    let api = builder.build().context("Failed to create Hugging Face Hub client")?;
    let repo = api.repo(Repo::with_revision(
        config.repo.clone(),
        RepoType::Model,
        config.revision.clone(),
    ));

    let model_path = fetch_with_retry(&repo, &config.model_file).await?;
    let tokenizer_path = fetch_with_retry(&repo, &config.tokenizer_file).await?;

    Ok(ModelFiles {
        model_path,
        tokenizer_path,
    })
}

/// Retries with exponential backoff; concurrent starts can race on the cache lock
async fn fetch_with_retry(repo: &ApiRepo, filename: &str) -> Result<PathBuf> {
    let mut attempt = 0;
    loop {
        match repo.get(filename).await {
            Ok(path) => return Ok(path),
            Err(e) if attempt + 1 < MAX_DOWNLOAD_ATTEMPTS => {
                let wait = Duration::from_millis(100 * (1 << attempt));
                warn!(
                    "Download of {} failed (attempt {}): {}, retrying in {:?}",
                    filename,
                    attempt + 1,
                    e,
                    wait
                );
                tokio::time::sleep(wait).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to download {}", filename));
            }
        }
    }
}
