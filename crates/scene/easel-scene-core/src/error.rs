//! Error types for the scene core.

use serde::{Deserialize, Serialize};

/// Errors surfaced by registry mutations, render sync, and history.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[non_exhaustive]
pub enum SceneError {
    /// Operation referenced an unknown object id.
    #[error("object not found: {id}")]
    ObjectNotFound { id: String },

    /// The render backend failed to create or rebuild a renderable. The
    /// data record stays in the registry; creation is retried on the next
    /// sync that touches the object.
    #[error("render backend failed for {id}: {reason}")]
    BackendCreation { id: String, reason: String },

    /// Undo/redo failed while reapplying a snapshot. The popped entry has
    /// been pushed back onto its originating stack.
    #[error("history apply failed: {reason}")]
    HistoryApply { reason: String },

    /// Document or snapshot (de)serialization failed.
    #[error("serialization error: {reason}")]
    Serialization { reason: String },
}

impl From<serde_json::Error> for SceneError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            reason: err.to_string(),
        }
    }
}
