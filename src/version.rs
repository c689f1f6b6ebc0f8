// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for the ndnm pipeline nodes

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Package name, used as the product prefix in logs
pub const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Supported features in this version, reported by `GET /info`
pub const FEATURES: &[&str] = &[
    "clip-text-encode",
    "ksampler-placeholder",
    "onnx-runtime",
    "cuda-fallback",
    "hf-hub-download",
    "node-info",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {}", PACKAGE_NAME, VERSION_NUMBER)
}
