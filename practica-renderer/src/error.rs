//! Error types for practica-renderer.

use std::path::PathBuf;

use thiserror::Error;

use practica_core::StoreError;

/// All errors that can arise from fragment rendering and template storage.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (fragment templates only).
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user fragment templates.
    #[error("template io error at {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    /// The backing key-value store failed.
    #[error("template store error: {0}")]
    Store(#[from] StoreError),
}
