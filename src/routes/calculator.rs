//! Calculator form routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Json, Response};
use serde::Deserialize;
use tracing::info;

use crate::calculator::{CalculatorView, Dimension, SubmitError, run_submission};
use crate::diagram::{SelectedMetrics, render_svg, selected_metrics};
use crate::error::ApiError;
use crate::model::HistoryEntry;
use crate::state::AppState;

pub(crate) const SVG_CONTENT_TYPE: &str = "image/svg+xml; charset=utf-8";

#[derive(Deserialize)]
pub struct FieldBody {
    pub value: String,
}

#[derive(Deserialize)]
pub struct DiagramQuery {
    pub selected: Option<String>,
}

fn parse_dimension_segment(raw: &str) -> Result<Dimension, ApiError> {
    raw.parse::<Dimension>()
        .map_err(|e| ApiError::from_error(StatusCode::BAD_REQUEST, &e))
}

/// 422 when the field was rejected; the view carries the message.
fn field_response(view: CalculatorView, rejected: bool) -> (StatusCode, Json<CalculatorView>) {
    let status = if rejected { StatusCode::UNPROCESSABLE_ENTITY } else { StatusCode::OK };
    (status, Json(view))
}

/// `GET /api/calculator`: current form, phase, errors and layout.
pub async fn get_calculator(State(state): State<AppState>) -> Json<CalculatorView> {
    Json(state.calculator.lock().await.view())
}

/// `PUT /api/calculator/board/:dimension`: type into a board field.
pub async fn set_board_field(
    State(state): State<AppState>,
    Path(dimension): Path<String>,
    Json(body): Json<FieldBody>,
) -> Result<(StatusCode, Json<CalculatorView>), ApiError> {
    let dimension = parse_dimension_segment(&dimension)?;
    let mut calculator = state.calculator.lock().await;
    let rejected = calculator.set_board_field(dimension, &body.value).is_some();
    Ok(field_response(calculator.view(), rejected))
}

/// `PUT /api/calculator/pieces/:id/:dimension`: type into a piece field.
pub async fn set_piece_field(
    State(state): State<AppState>,
    Path((id, dimension)): Path<(String, String)>,
    Json(body): Json<FieldBody>,
) -> Result<(StatusCode, Json<CalculatorView>), ApiError> {
    let dimension = parse_dimension_segment(&dimension)?;
    let mut calculator = state.calculator.lock().await;
    let rejected = calculator
        .set_piece_field(&id, dimension, &body.value)
        .map_err(|e| ApiError::from_error(StatusCode::NOT_FOUND, &e))?
        .is_some();
    Ok(field_response(calculator.view(), rejected))
}

/// `POST /api/calculator/pieces`: append a 10x10 piece.
pub async fn add_piece(State(state): State<AppState>) -> (StatusCode, Json<CalculatorView>) {
    let mut calculator = state.calculator.lock().await;
    calculator.add_piece();
    (StatusCode::CREATED, Json(calculator.view()))
}

/// `DELETE /api/calculator/pieces/:id`: remove a piece.
pub async fn remove_piece(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CalculatorView>, ApiError> {
    let mut calculator = state.calculator.lock().await;
    if !calculator.remove_piece(&id) {
        return Err(ApiError::not_found("piece"));
    }
    Ok(Json(calculator.view()))
}

/// `POST /api/calculator/submit`: validate, request a layout and record it.
pub async fn submit(State(state): State<AppState>) -> Result<Json<HistoryEntry>, ApiError> {
    let entry = run_submission(&state.calculator, state.oracle.as_deref(), &state.history)
        .await
        .map_err(|e| ApiError::from_error(submit_error_to_status(&e), &e))?;
    info!(entry = %entry.id, "calculator: submit complete");
    Ok(Json(entry))
}

pub(crate) fn submit_error_to_status(err: &SubmitError) -> StatusCode {
    match err {
        SubmitError::Busy => StatusCode::CONFLICT,
        SubmitError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        SubmitError::NotConfigured => StatusCode::SERVICE_UNAVAILABLE,
        SubmitError::Oracle(_) => StatusCode::BAD_GATEWAY,
    }
}

/// `GET /api/calculator/diagram.svg?selected=<id>`: render the current layout.
pub async fn diagram(State(state): State<AppState>, Query(query): Query<DiagramQuery>) -> Response {
    let calculator = state.calculator.lock().await;
    let svg = render_svg(&calculator.board(), calculator.placed_pieces(), query.selected.as_deref());
    ([(CONTENT_TYPE, SVG_CONTENT_TYPE)], svg).into_response()
}

/// `GET /api/calculator/pieces/:id/metrics`: details for a selected piece.
pub async fn piece_metrics(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SelectedMetrics>, ApiError> {
    let calculator = state.calculator.lock().await;
    selected_metrics(calculator.placed_pieces(), &id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("placed piece"))
}

#[cfg(test)]
#[path = "calculator_test.rs"]
mod tests;
