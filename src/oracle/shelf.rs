//! Local shelf packer: a deterministic, offline layout oracle.
//!
//! Pieces are taken tallest first and laid left to right on horizontal
//! shelves; a piece goes on the first shelf with room, otherwise a new shelf
//! opens below the last one. No rotation. This is a first-fit heuristic, not
//! an optimizer; its answers are always in bounds and never overlap.

use super::{LayoutOracle, OracleError, OracleLayout, Placement, Unplaced};
use crate::model::{Board, Piece};

#[derive(Debug, Clone, Copy, Default)]
pub struct ShelfOracle;

struct Shelf {
    y: f64,
    height: f64,
    used_width: f64,
}

impl ShelfOracle {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Pack synchronously.
    #[must_use]
    pub fn pack(board: &Board, pieces: &[Piece]) -> OracleLayout {
        let mut order: Vec<&Piece> = pieces.iter().collect();
        order.sort_by(|a, b| b.height.total_cmp(&a.height).then(b.width.total_cmp(&a.width)));

        let mut shelves: Vec<Shelf> = Vec::new();
        let mut next_y = 0.0;
        let mut layout = OracleLayout::default();

        for piece in order {
            let fits_board = piece.width > 0.0
                && piece.height > 0.0
                && piece.width <= board.width
                && piece.height <= board.height;
            if !fits_board {
                layout.unplaced_pieces.push(Unplaced { id: piece.id.clone() });
                continue;
            }

            let existing = shelves
                .iter()
                .position(|s| piece.height <= s.height && s.used_width + piece.width <= board.width);
            let index = match existing {
                Some(index) => index,
                None if next_y + piece.height <= board.height => {
                    shelves.push(Shelf { y: next_y, height: piece.height, used_width: 0.0 });
                    next_y += piece.height;
                    shelves.len() - 1
                }
                None => {
                    layout.unplaced_pieces.push(Unplaced { id: piece.id.clone() });
                    continue;
                }
            };

            let shelf = &mut shelves[index];
            layout.placed_pieces.push(Placement { id: piece.id.clone(), x: shelf.used_width, y: shelf.y });
            shelf.used_width += piece.width;
        }

        layout
    }
}

#[async_trait::async_trait]
impl LayoutOracle for ShelfOracle {
    fn name(&self) -> &'static str {
        "shelf"
    }

    async fn request_layout(&self, board: &Board, pieces: &[Piece]) -> Result<OracleLayout, OracleError> {
        Ok(Self::pack(board, pieces))
    }
}

#[cfg(test)]
#[path = "shelf_test.rs"]
mod tests;
