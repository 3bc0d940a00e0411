//! Calculator: the form state behind the cutting calculator.
//!
//! DESIGN
//! ======
//! Every dimension is held twice: the text the user typed and the last
//! numeric value that text parsed to. Typing runs the validator; a field
//! with a validation error keeps its previous numeric value and records the
//! error under its field key (`board-width`, `piece-<id>-height`, ...).
//!
//! Submission is driven by [`workflow`], which moves the calculator through
//! its [`Phase`]s and talks to the layout oracle.

pub mod workflow;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::dimension::{InputError, parse_dimension, validate_input};
use crate::model::{Board, HistoryEntry, Layout, PlacedPiece, Piece};
pub use workflow::{Phase, SubmitError, Submission, Ticket, merge_layout, run_submission};

/// Dimensions of a new piece added with [`Calculator::add_piece`].
const NEW_PIECE_SIZE: f64 = 10.0;

// =============================================================================
// FIELDS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Width,
    Height,
}

impl Dimension {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Height => "height",
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dimension {
    type Err = FormError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "width" => Ok(Self::Width),
            "height" => Ok(Self::Height),
            other => Err(FormError::UnknownDimension(other.to_owned())),
        }
    }
}

#[must_use]
pub fn board_field_key(dimension: Dimension) -> String {
    format!("board-{dimension}")
}

#[must_use]
pub fn piece_field_key(id: &str, dimension: Dimension) -> String {
    format!("piece-{id}-{dimension}")
}

#[derive(Debug, thiserror::Error)]
pub enum FormError {
    #[error("piece not found: {0}")]
    UnknownPiece(String),
    #[error("unknown dimension '{0}' (expected width or height)")]
    UnknownDimension(String),
}

impl crate::error::ErrorCode for FormError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPiece(_) => "E_PIECE_NOT_FOUND",
            Self::UnknownDimension(_) => "E_UNKNOWN_DIMENSION",
        }
    }
}

/// Render a stored dimension the way a user would type it.
fn format_dimension(value: f64) -> String {
    format!("{value}")
}

#[derive(Debug, Clone)]
struct PieceRow {
    piece: Piece,
    width_text: String,
    height_text: String,
}

impl PieceRow {
    fn new(piece: Piece) -> Self {
        Self { width_text: format_dimension(piece.width), height_text: format_dimension(piece.height), piece }
    }

    fn text_mut(&mut self, dimension: Dimension) -> &mut String {
        match dimension {
            Dimension::Width => &mut self.width_text,
            Dimension::Height => &mut self.height_text,
        }
    }

    fn value_mut(&mut self, dimension: Dimension) -> &mut f64 {
        match dimension {
            Dimension::Width => &mut self.piece.width,
            Dimension::Height => &mut self.piece.height,
        }
    }
}

// =============================================================================
// EDIT COMMAND
// =============================================================================

/// One-shot request to load a past calculation into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct EditRequest {
    pub board: Board,
    pub pieces: Vec<Piece>,
}

impl From<HistoryEntry> for EditRequest {
    fn from(entry: HistoryEntry) -> Self {
        Self { board: entry.board, pieces: entry.pieces }
    }
}

// =============================================================================
// CALCULATOR
// =============================================================================

pub struct Calculator {
    board: Board,
    board_width_text: String,
    board_height_text: String,
    rows: Vec<PieceRow>,
    errors: BTreeMap<String, InputError>,
    layout: Option<Layout>,
    error: Option<String>,
    phase: Phase,
    in_flight: Option<workflow::InFlight>,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// Form with a 100x100 board and one 20x30 piece.
    #[must_use]
    pub fn new() -> Self {
        let board = Board::default();
        Self {
            board_width_text: format_dimension(board.width),
            board_height_text: format_dimension(board.height),
            board,
            rows: vec![PieceRow::new(Piece::new(20.0, 30.0))],
            errors: BTreeMap::new(),
            layout: None,
            error: None,
            phase: Phase::Idle,
            in_flight: None,
        }
    }

    #[must_use]
    pub fn board(&self) -> Board {
        self.board
    }

    /// Pieces with their last valid numeric dimensions.
    #[must_use]
    pub fn pieces(&self) -> Vec<Piece> {
        self.rows.iter().map(|row| row.piece.clone()).collect()
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.settled_status().0
    }

    #[must_use]
    pub fn layout(&self) -> Option<&Layout> {
        self.layout.as_ref()
    }

    #[must_use]
    pub fn placed_pieces(&self) -> &[PlacedPiece] {
        self.layout.as_ref().map_or(&[], |layout| layout.placed_pieces.as_slice())
    }

    /// Message of the last rejected or failed submission.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.settled_status().1
    }

    #[must_use]
    pub fn field_error(&self, key: &str) -> Option<InputError> {
        self.errors.get(key).copied()
    }

    #[must_use]
    pub fn has_field_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    // -------------------------------------------------------------------------
    // editing
    // -------------------------------------------------------------------------

    /// Store board text, validate it, and update the board when valid.
    pub fn set_board_field(&mut self, dimension: Dimension, text: &str) -> Option<InputError> {
        let key = board_field_key(dimension);
        let (stored, value) = match dimension {
            Dimension::Width => (&mut self.board_width_text, &mut self.board.width),
            Dimension::Height => (&mut self.board_height_text, &mut self.board.height),
        };
        text.clone_into(stored);
        Self::apply_field(&mut self.errors, key, text, value)
    }

    /// Store piece text, validate it, and update the piece when valid.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::UnknownPiece`] when no piece has `id`.
    pub fn set_piece_field(&mut self, id: &str, dimension: Dimension, text: &str) -> Result<Option<InputError>, FormError> {
        let row = self
            .rows
            .iter_mut()
            .find(|row| row.piece.id == id)
            .ok_or_else(|| FormError::UnknownPiece(id.to_owned()))?;
        text.clone_into(row.text_mut(dimension));
        Ok(Self::apply_field(&mut self.errors, piece_field_key(id, dimension), text, row.value_mut(dimension)))
    }

    fn apply_field(
        errors: &mut BTreeMap<String, InputError>,
        key: String,
        text: &str,
        value: &mut f64,
    ) -> Option<InputError> {
        match validate_input(text) {
            Some(err) => {
                errors.insert(key, err);
                Some(err)
            }
            None => {
                errors.remove(&key);
                *value = parse_dimension(text);
                None
            }
        }
    }

    /// Append a 10x10 piece and return it.
    pub fn add_piece(&mut self) -> Piece {
        let piece = Piece::new(NEW_PIECE_SIZE, NEW_PIECE_SIZE);
        self.rows.push(PieceRow::new(piece.clone()));
        piece
    }

    /// Remove a piece and its field errors. Returns false for unknown ids.
    pub fn remove_piece(&mut self, id: &str) -> bool {
        let before = self.rows.len();
        self.rows.retain(|row| row.piece.id != id);
        if self.rows.len() == before {
            return false;
        }
        self.errors.remove(&piece_field_key(id, Dimension::Width));
        self.errors.remove(&piece_field_key(id, Dimension::Height));
        true
    }

    /// Pre-fill the form from `request` as if typed, discarding any result.
    /// A submission still in flight stays busy but its outcome is no longer
    /// shown in the form.
    pub fn apply_edit(&mut self, request: EditRequest) {
        let busy = self.replace_in_flight_form();
        self.board = request.board;
        self.board_width_text = format_dimension(request.board.width);
        self.board_height_text = format_dimension(request.board.height);
        self.rows = request.pieces.into_iter().map(PieceRow::new).collect();
        self.errors.clear();
        self.layout = None;
        self.error = None;
        if !busy {
            self.phase = Phase::Idle;
        }
    }

    // -------------------------------------------------------------------------
    // view
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn view(&self) -> CalculatorView {
        let (phase, error) = self.settled_status();
        CalculatorView {
            board: BoardView {
                width: self.board.width,
                height: self.board.height,
                width_text: self.board_width_text.clone(),
                height_text: self.board_height_text.clone(),
            },
            pieces: self
                .rows
                .iter()
                .map(|row| PieceView {
                    id: row.piece.id.clone(),
                    width: row.piece.width,
                    height: row.piece.height,
                    width_text: row.width_text.clone(),
                    height_text: row.height_text.clone(),
                })
                .collect(),
            errors: self.errors.iter().map(|(key, err)| (key.clone(), err.to_string())).collect(),
            phase,
            error: error.map(str::to_owned),
            layout: self.layout.clone(),
        }
    }
}

// =============================================================================
// VIEW
// =============================================================================

/// Serializable snapshot of the form for the HTTP layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CalculatorView {
    pub board: BoardView,
    pub pieces: Vec<PieceView>,
    /// Field key to message.
    pub errors: BTreeMap<String, String>,
    pub phase: Phase,
    pub error: Option<String>,
    pub layout: Option<Layout>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardView {
    pub width: f64,
    pub height: f64,
    pub width_text: String,
    pub height_text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PieceView {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub width_text: String,
    pub height_text: String,
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
