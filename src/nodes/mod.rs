// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod clip_text_encode;
pub mod ksampler;

pub use clip_text_encode::{ClipTextEncodeNode, TextEncodeRequest, TextEncodeResponse};
pub use ksampler::{KSamplerInput, KSamplerNode, KSamplerResponse, PENDING_MESSAGE};
