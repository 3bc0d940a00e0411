//! Submission workflow: validation, oracle call, merge and history.
//!
//! DESIGN
//! ======
//! A submission runs in three steps so the calculator lock is never held
//! across the oracle await:
//!
//! 1. `begin_submit` validates under the lock and snapshots board + pieces.
//! 2. The oracle is called with the snapshot, lock released.
//! 3. `finish` re-takes the lock and records success or failure.
//!
//! While a submission is in flight the phase is `Submitting`, which makes
//! the workflow non-reentrant: a second submit gets `SubmitError::Busy`.
//!
//! `begin_submit` hands out a [`Ticket`] and the calculator keeps only a weak
//! reference to it. A submission whose future is dropped before `finish`
//! (client disconnect, timeout) drops its ticket, and the next look at the
//! calculator treats it as cancelled instead of busy. Loading a history
//! entry mid-flight marks the run as replaced: its result still goes to
//! history but no longer touches the form.
//!
//! ERROR HANDLING
//! ==============
//! Validation problems reject without calling the oracle. Oracle failures
//! and unusable answers move the form to `Failed` with the message kept for
//! display; no history entry is written.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Weak};

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::Calculator;
use crate::history::HistoryStore;
use crate::model::{Board, HistoryEntry, Layout, NewHistoryEntry, Piece, PlacedPiece, piece_color};
use crate::oracle::{LayoutOracle, OracleError, OracleLayout};

const FIELD_ERRORS_MESSAGE: &str = "fix the highlighted fields before continuing";
const NON_POSITIVE_MESSAGE: &str = "all dimensions must be greater than zero";
const CANCELLED_MESSAGE: &str = "the calculation was cancelled before it finished";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Idle,
    Validating,
    Rejected,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("a calculation is already in progress")]
    Busy,
    #[error("{0}")]
    Rejected(&'static str),
    #[error("layout service is not configured")]
    NotConfigured,
    #[error(transparent)]
    Oracle(#[from] OracleError),
}

impl crate::error::ErrorCode for SubmitError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Busy => "E_BUSY",
            Self::Rejected(_) => "E_VALIDATION",
            Self::NotConfigured => "E_ORACLE_NOT_CONFIGURED",
            Self::Oracle(e) => e.error_code(),
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Busy => true,
            Self::Rejected(_) | Self::NotConfigured => false,
            Self::Oracle(e) => e.retryable(),
        }
    }
}

/// Board and pieces captured when a submission starts.
#[derive(Debug)]
pub struct Submission {
    pub board: Board,
    pub pieces: Vec<Piece>,
    pub ticket: Ticket,
}

/// Proof of ownership of the in-flight submission. Dropping it without
/// calling [`Calculator::finish`] abandons the submission.
#[derive(Debug)]
pub struct Ticket(Arc<()>);

/// Calculator-side record of the in-flight submission.
#[derive(Debug)]
pub(super) struct InFlight {
    ticket: Weak<()>,
    form_replaced: bool,
}

impl InFlight {
    fn is_alive(&self) -> bool {
        self.ticket.strong_count() > 0
    }

    fn owns(&self, ticket: &Ticket) -> bool {
        Weak::ptr_eq(&self.ticket, &Arc::downgrade(&ticket.0))
    }
}

// =============================================================================
// PHASE TRANSITIONS
// =============================================================================

impl Calculator {
    /// Validate the form and enter `Submitting`.
    ///
    /// # Errors
    ///
    /// `Busy` while another submission is in flight (phase unchanged);
    /// `Rejected` when fields have errors or a dimension is not positive.
    pub fn begin_submit(&mut self) -> Result<Submission, SubmitError> {
        self.settle();
        if self.in_flight.is_some() {
            return Err(SubmitError::Busy);
        }
        self.phase = Phase::Validating;

        if self.has_field_errors() {
            return Err(self.reject(FIELD_ERRORS_MESSAGE));
        }
        let pieces = self.pieces();
        let all_positive = self.board.width > 0.0
            && self.board.height > 0.0
            && pieces.iter().all(|p| p.width > 0.0 && p.height > 0.0);
        if !all_positive {
            return Err(self.reject(NON_POSITIVE_MESSAGE));
        }

        let ticket = Ticket(Arc::new(()));
        self.in_flight = Some(InFlight { ticket: Arc::downgrade(&ticket.0), form_replaced: false });
        self.phase = Phase::Submitting;
        self.error = None;
        Ok(Submission { board: self.board, pieces, ticket })
    }

    fn reject(&mut self, message: &'static str) -> SubmitError {
        self.phase = Phase::Rejected;
        self.error = Some(message.to_owned());
        SubmitError::Rejected(message)
    }

    /// Record the outcome of the submission that owns `ticket`.
    ///
    /// Returns `false` when the outcome was not applied to the form: the
    /// ticket is stale, or the form was replaced by an edit mid-flight (the
    /// form then returns to `Idle`).
    pub fn finish(&mut self, ticket: &Ticket, outcome: Result<&Layout, &SubmitError>) -> bool {
        let Some(run) = self.in_flight.take_if(|run| run.owns(ticket)) else {
            warn!("calculator: ignoring outcome of a stale submission");
            return false;
        };
        if run.form_replaced {
            info!("calculator: form was replaced mid-flight, outcome not shown");
            self.phase = Phase::Idle;
            return false;
        }
        match outcome {
            Ok(layout) => {
                self.layout = Some(layout.clone());
                self.error = None;
                self.phase = Phase::Succeeded;
            }
            Err(err) => {
                self.layout = None;
                self.error = Some(err.to_string());
                self.phase = Phase::Failed;
            }
        }
        true
    }

    /// Phase and message, counting an abandoned submission as settled.
    pub(super) fn settled_status(&self) -> (Phase, Option<&str>) {
        match &self.in_flight {
            Some(run) if !run.is_alive() => {
                if run.form_replaced {
                    (Phase::Idle, None)
                } else {
                    (Phase::Failed, Some(CANCELLED_MESSAGE))
                }
            }
            _ => (self.phase, self.error.as_deref()),
        }
    }

    /// Drop the record of an abandoned submission and free the form.
    pub(super) fn settle(&mut self) {
        if !self.in_flight.as_ref().is_some_and(|run| !run.is_alive()) {
            return;
        }
        let (phase, error) = self.settled_status();
        let error = error.map(str::to_owned);
        warn!("calculator: submission abandoned before it finished");
        self.in_flight = None;
        self.phase = phase;
        self.error = error;
    }

    /// Note that the form was replaced while a submission is in flight.
    /// Returns `false` when nothing is in flight.
    pub(super) fn replace_in_flight_form(&mut self) -> bool {
        self.settle();
        match self.in_flight.as_mut() {
            Some(run) => {
                run.form_replaced = true;
                true
            }
            None => false,
        }
    }
}

// =============================================================================
// MERGE
// =============================================================================

/// Combine the oracle's answer with the submitted pieces.
///
/// Sizes come from `pieces`, colours cycle through the palette in placement
/// order. Every submitted piece ends up in exactly one list: pieces the
/// oracle did not mention are appended to the unplaced list in submission
/// order.
///
/// # Errors
///
/// `InvalidLayout` when the answer names an unknown id or names an id twice.
pub fn merge_layout(pieces: &[Piece], answer: OracleLayout) -> Result<Layout, OracleError> {
    let by_id: HashMap<&str, &Piece> = pieces.iter().map(|p| (p.id.as_str(), p)).collect();
    let mut seen: HashSet<String> = HashSet::with_capacity(pieces.len());
    let mut layout = Layout::default();

    let mut claim = |id: String| -> Result<Piece, OracleError> {
        let Some(piece) = by_id.get(id.as_str()) else {
            return Err(OracleError::InvalidLayout(format!("unknown piece id {id}")));
        };
        let piece = (*piece).clone();
        if !seen.insert(id) {
            return Err(OracleError::InvalidLayout(format!("piece {} listed more than once", piece.id)));
        }
        Ok(piece)
    };

    for (index, placement) in answer.placed_pieces.into_iter().enumerate() {
        let piece = claim(placement.id)?;
        layout.placed_pieces.push(PlacedPiece::place(&piece, placement.x, placement.y, piece_color(index)));
    }
    for unplaced in answer.unplaced_pieces {
        layout.unplaced_pieces.push(claim(unplaced.id)?);
    }

    let omitted: Vec<Piece> = pieces.iter().filter(|p| !seen.contains(&p.id)).cloned().collect();
    if !omitted.is_empty() {
        warn!(count = omitted.len(), "calculator: oracle omitted pieces, marking unplaced");
        layout.unplaced_pieces.extend(omitted);
    }

    Ok(layout)
}

// =============================================================================
// RUN
// =============================================================================

/// Run one submission end to end and record it in history.
///
/// # Errors
///
/// Returns the [`SubmitError`] that stopped the submission. Every error
/// except `Busy` is also reflected in the calculator's phase and message,
/// unless the form was replaced by an edit while the oracle was working.
/// Dropping the returned future before it completes leaves the form
/// `Failed` with a cancellation message.
pub async fn run_submission(
    calculator: &Mutex<Calculator>,
    oracle: Option<&dyn LayoutOracle>,
    history: &Mutex<HistoryStore>,
) -> Result<HistoryEntry, SubmitError> {
    let submission = calculator.lock().await.begin_submit()?;
    info!(
        pieces = submission.pieces.len(),
        oracle = oracle.map_or("none", |o| o.name()),
        "calculator: submitting"
    );

    let outcome = match oracle {
        None => Err(SubmitError::NotConfigured),
        Some(oracle) => match oracle.request_layout(&submission.board, &submission.pieces).await {
            Ok(answer) => merge_layout(&submission.pieces, answer).map_err(SubmitError::from),
            Err(e) => Err(SubmitError::from(e)),
        },
    };

    match outcome {
        Ok(layout) => {
            let entry = history.lock().await.add(NewHistoryEntry {
                board: submission.board,
                pieces: submission.pieces,
                layout,
            });
            calculator.lock().await.finish(&submission.ticket, Ok(&entry.layout));
            info!(
                entry = %entry.id,
                placed = entry.layout.placed_pieces.len(),
                unplaced = entry.layout.unplaced_pieces.len(),
                "calculator: layout recorded"
            );
            Ok(entry)
        }
        Err(err) => {
            warn!(error = %err, "calculator: submission failed");
            calculator.lock().await.finish(&submission.ticket, Err(&err));
            Err(err)
        }
    }
}

#[cfg(test)]
#[path = "workflow_test.rs"]
mod tests;
