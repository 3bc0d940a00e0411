//! Layout oracle: the capability that decides where pieces go.
//!
//! DESIGN
//! ======
//! The calculator never packs rectangles itself. It asks a [`LayoutOracle`]
//! for placements and merges the answer with its own piece records. The
//! default oracle is an LLM (`llm`); `shelf` is a deterministic local
//! packer, and `verify` wraps any oracle with a bounds/overlap check.
//!
//! The oracle answers with ids and coordinates only; widths, heights and
//! colours are restored locally.

pub mod llm;
pub mod shelf;
pub mod verify;

use serde::{Deserialize, Serialize};

use crate::error::ErrorCode;
use crate::llm::types::LlmError;
use crate::model::{Board, Piece};

pub use llm::LlmLayoutOracle;
pub use shelf::ShelfOracle;
pub use verify::{VerifyMode, VerifyingOracle};

// =============================================================================
// WIRE TYPES
// =============================================================================

/// Top-left coordinate the oracle assigned to a piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

/// A piece the oracle could not fit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unplaced {
    pub id: String,
}

/// The oracle's answer, before merging with local piece data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleLayout {
    pub placed_pieces: Vec<Placement>,
    pub unplaced_pieces: Vec<Unplaced>,
}

impl OracleLayout {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.placed_pieces.is_empty() && self.unplaced_pieces.is_empty()
    }
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    #[error("received an invalid layout from the layout service: {0}")]
    InvalidLayout(String),
    #[error("layout service error: {0}")]
    Llm(#[from] LlmError),
    #[error("layout rejected: {0}")]
    Geometry(String),
}

impl ErrorCode for OracleError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidLayout(_) => "E_INVALID_LAYOUT",
            Self::Llm(e) => e.error_code(),
            Self::Geometry(_) => "E_LAYOUT_GEOMETRY",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Llm(e) => e.retryable(),
            Self::InvalidLayout(_) | Self::Geometry(_) => true,
        }
    }
}

// =============================================================================
// ORACLE TRAIT
// =============================================================================

/// Computes placements for `pieces` on `board`. Pieces must not be rotated.
#[async_trait::async_trait]
pub trait LayoutOracle: Send + Sync {
    /// Short name for logs (`"llm"`, `"shelf"`).
    fn name(&self) -> &'static str;

    /// Request a layout.
    ///
    /// # Errors
    ///
    /// Returns an [`OracleError`] when the oracle fails or answers with
    /// something that cannot be used.
    async fn request_layout(&self, board: &Board, pieces: &[Piece]) -> Result<OracleLayout, OracleError>;
}
