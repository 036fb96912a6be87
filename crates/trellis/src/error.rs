//! The top-level error type for Trellis operations.
//!
//! Nothing here is fatal: every variant is a rejected operation the
//! caller can retry with corrected input.

use thiserror::Error;

use trellis_core::factory::FactoryError;

use crate::draft::DraftError;
use crate::rules::ConnectorRejected;
use crate::store::StoreError;

/// The main error type for Trellis operations.
#[derive(Debug, Error)]
pub enum TrellisError {
    #[error(transparent)]
    Factory(#[from] FactoryError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Rejected(#[from] ConnectorRejected),

    #[error(transparent)]
    Draft(#[from] DraftError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
