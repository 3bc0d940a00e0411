//! History routes.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Json, Response};
use serde::Serialize;
use tracing::info;

use super::calculator::SVG_CONTENT_TYPE;
use crate::calculator::{CalculatorView, EditRequest};
use crate::diagram::{EXPORT_FILENAME, export_document, render_svg};
use crate::error::ApiError;
use crate::model::{Board, HistoryEntry};
use crate::state::AppState;

/// One row of the history listing.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistorySummary {
    pub id: String,
    pub timestamp: String,
    pub board: Board,
    pub piece_count: usize,
    pub placed_count: usize,
    pub unplaced_count: usize,
    pub waste_percent: f64,
}

fn to_summary(entry: &HistoryEntry) -> HistorySummary {
    HistorySummary {
        id: entry.id.clone(),
        timestamp: entry.timestamp.clone(),
        board: entry.board,
        piece_count: entry.pieces.len(),
        placed_count: entry.layout.placed_pieces.len(),
        unplaced_count: entry.layout.unplaced_pieces.len(),
        waste_percent: entry.waste_percent(),
    }
}

async fn find_entry(state: &AppState, id: &str) -> Result<HistoryEntry, ApiError> {
    state
        .history
        .lock()
        .await
        .get(id)
        .cloned()
        .ok_or_else(|| ApiError::not_found("history entry"))
}

/// `GET /api/history`: entries newest first, with waste summaries.
pub async fn list_entries(State(state): State<AppState>) -> Json<Vec<HistorySummary>> {
    let history = state.history.lock().await;
    Json(history.entries().iter().map(to_summary).collect())
}

/// `DELETE /api/history`: remove every entry.
pub async fn clear_entries(State(state): State<AppState>) -> StatusCode {
    state.history.lock().await.clear();
    info!("history: cleared");
    StatusCode::NO_CONTENT
}

/// `GET /api/history/:id`: one full entry.
pub async fn get_entry(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<HistoryEntry>, ApiError> {
    find_entry(&state, &id).await.map(Json)
}

/// `PUT /api/history/:id`: replace an entry wholesale.
pub async fn update_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entry): Json<HistoryEntry>,
) -> Result<Json<HistoryEntry>, ApiError> {
    if entry.id != id {
        return Err(ApiError::bad_request("E_ID_MISMATCH", "entry id does not match the path"));
    }
    if !state.history.lock().await.update(entry.clone()) {
        return Err(ApiError::not_found("history entry"));
    }
    Ok(Json(entry))
}

/// `DELETE /api/history/:id`: remove one entry.
pub async fn delete_entry(State(state): State<AppState>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    if state.history.lock().await.remove(&id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("history entry"))
    }
}

/// `POST /api/history/:id/edit`: load an entry into the calculator form.
pub async fn edit_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CalculatorView>, ApiError> {
    let request = EditRequest::from(find_entry(&state, &id).await?);
    let mut calculator = state.calculator.lock().await;
    calculator.apply_edit(request);
    info!(entry = %id, "history: loaded into calculator");
    Ok(Json(calculator.view()))
}

/// `GET /api/history/:id/export.svg`: standalone diagram download.
pub async fn export_svg(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let entry = find_entry(&state, &id).await?;
    let document = export_document(&render_svg(&entry.board, &entry.layout.placed_pieces, None));
    Ok((
        [
            (CONTENT_TYPE, SVG_CONTENT_TYPE),
            (CONTENT_DISPOSITION, &format!("attachment; filename=\"{EXPORT_FILENAME}\"")),
        ],
        document,
    )
        .into_response())
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
