//! Geometric verification of oracle answers.
//!
//! The remote oracle is asked for non-overlapping, in-bounds placements but
//! nothing forces it to comply. `VerifyingOracle` wraps any oracle and
//! checks the answer before the calculator accepts it.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use tracing::warn;

use super::{LayoutOracle, OracleError, OracleLayout};
use crate::model::{Board, Piece};

/// Slack for floating-point coordinates returned by the oracle.
const TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerifyMode {
    /// Accept answers unchecked.
    Off,
    /// Check and log violations, then accept.
    Warn,
    /// Reject answers with violations.
    #[default]
    Strict,
}

impl FromStr for VerifyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "warn" => Ok(Self::Warn),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown LAYOUT_VERIFY mode '{other}' (expected off, warn or strict)")),
        }
    }
}

// =============================================================================
// CHECKS
// =============================================================================

/// Check that every placement is inside the board and no two overlap.
///
/// Placements naming an unknown piece are skipped; the calculator rejects
/// those when merging.
///
/// # Errors
///
/// Returns a description of the first violation found.
pub fn check_geometry(board: &Board, pieces: &[Piece], layout: &OracleLayout) -> Result<(), String> {
    let by_id: HashMap<&str, &Piece> = pieces.iter().map(|p| (p.id.as_str(), p)).collect();

    let mut rects = Vec::with_capacity(layout.placed_pieces.len());
    for placement in &layout.placed_pieces {
        let Some(piece) = by_id.get(placement.id.as_str()) else {
            continue;
        };
        let (x, y) = (placement.x, placement.y);
        let in_bounds = x.is_finite()
            && y.is_finite()
            && x >= -TOLERANCE
            && y >= -TOLERANCE
            && x + piece.width <= board.width + TOLERANCE
            && y + piece.height <= board.height + TOLERANCE;
        if !in_bounds {
            return Err(format!(
                "piece {} ({}x{}) at ({x}, {y}) is outside the {}x{} board",
                piece.id, piece.width, piece.height, board.width, board.height
            ));
        }
        rects.push((piece.id.as_str(), x, y, piece.width, piece.height));
    }

    for (i, a) in rects.iter().enumerate() {
        for b in &rects[i + 1..] {
            let overlaps = a.1 < b.1 + b.3 - TOLERANCE
                && b.1 < a.1 + a.3 - TOLERANCE
                && a.2 < b.2 + b.4 - TOLERANCE
                && b.2 < a.2 + a.4 - TOLERANCE;
            if overlaps {
                return Err(format!("pieces {} and {} overlap", a.0, b.0));
            }
        }
    }

    Ok(())
}

// =============================================================================
// DECORATOR
// =============================================================================

pub struct VerifyingOracle {
    inner: Arc<dyn LayoutOracle>,
    mode: VerifyMode,
}

impl VerifyingOracle {
    #[must_use]
    pub fn new(inner: Arc<dyn LayoutOracle>, mode: VerifyMode) -> Self {
        Self { inner, mode }
    }
}

#[async_trait::async_trait]
impl LayoutOracle for VerifyingOracle {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn request_layout(&self, board: &Board, pieces: &[Piece]) -> Result<OracleLayout, OracleError> {
        let layout = self.inner.request_layout(board, pieces).await?;
        if self.mode == VerifyMode::Off {
            return Ok(layout);
        }
        match check_geometry(board, pieces, &layout) {
            Ok(()) => Ok(layout),
            Err(violation) if self.mode == VerifyMode::Warn => {
                warn!(oracle = self.inner.name(), %violation, "oracle: layout failed verification, accepting");
                Ok(layout)
            }
            Err(violation) => {
                warn!(oracle = self.inner.name(), %violation, "oracle: layout rejected");
                Err(OracleError::Geometry(violation))
            }
        }
    }
}

#[cfg(test)]
#[path = "verify_test.rs"]
mod tests;
