//! Error types for practica-gate.

use thiserror::Error;

use practica_core::StoreError;

/// All errors that can arise from gate operations.
///
/// Invalid persisted values are not errors; they fall back to the first
/// stage. Only the backing store can fail.
#[derive(Debug, Error)]
pub enum GateError {
    #[error("progress store error: {0}")]
    Store(#[from] StoreError),
}
