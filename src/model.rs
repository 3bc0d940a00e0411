//! Domain types: boards, pieces, layouts and history entries.
//!
//! Field names serialize in camelCase so persisted history stays readable by
//! the browser build, which stores the same shapes under `layoutHistory`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Display colours assigned to placed pieces, cycled by placement order.
pub const PIECE_COLORS: [&str; 10] = [
    "#f87171", "#fb923c", "#facc15", "#a3e635", "#4ade80", "#34d399", "#2dd4bf", "#60a5fa", "#a78bfa", "#f472b6",
];

/// Colour for the piece placed at `index`.
#[must_use]
pub fn piece_color(index: usize) -> &'static str {
    PIECE_COLORS[index % PIECE_COLORS.len()]
}

// =============================================================================
// BOARD / PIECES
// =============================================================================

/// Stock rectangle. Origin top-left, axes grow right and down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub width: f64,
    pub height: f64,
}

impl Board {
    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

impl Default for Board {
    fn default() -> Self {
        Self { width: 100.0, height: 100.0 }
    }
}

/// A requested cut. `id` is stable for the lifetime of the piece.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Piece {
    pub id: String,
    pub width: f64,
    pub height: f64,
}

impl Piece {
    /// New piece with a fresh id.
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { id: Uuid::new_v4().to_string(), width, height }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// A piece with its oracle-assigned position and local display colour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedPiece {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

impl PlacedPiece {
    #[must_use]
    pub fn place(piece: &Piece, x: f64, y: f64, color: &str) -> Self {
        Self { id: piece.id.clone(), width: piece.width, height: piece.height, x, y, color: color.to_owned() }
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

/// Partition of the submitted pieces into placed and unplaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub placed_pieces: Vec<PlacedPiece>,
    pub unplaced_pieces: Vec<Piece>,
}

// =============================================================================
// HISTORY ENTRY
// =============================================================================

/// One recorded calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    /// RFC 3339 timestamp, UTC.
    pub timestamp: String,
    pub board: Board,
    pub pieces: Vec<Piece>,
    pub layout: Layout,
}

impl HistoryEntry {
    /// Percentage of board area not covered by placed pieces.
    /// A zero-area board counts as entirely wasted.
    #[must_use]
    pub fn waste_percent(&self) -> f64 {
        let board_area = self.board.area();
        if board_area == 0.0 {
            return 100.0;
        }
        let used: f64 = self.layout.placed_pieces.iter().map(PlacedPiece::area).sum();
        (board_area - used) / board_area * 100.0
    }
}

/// A history entry before the store assigns its id and timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewHistoryEntry {
    pub board: Board,
    pub pieces: Vec<Piece>,
    pub layout: Layout,
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
