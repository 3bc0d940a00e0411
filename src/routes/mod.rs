//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! A JSON API over the calculator form and the history store, plus SVG
//! endpoints for the cutting diagram. Clients drive the form field by field
//! and call `submit`; everything they need to render lives in the calculator
//! view returned by most calculator endpoints.

pub mod calculator;
pub mod history;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, post, put};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/calculator", get(calculator::get_calculator))
        .route("/api/calculator/board/{dimension}", put(calculator::set_board_field))
        .route("/api/calculator/pieces", post(calculator::add_piece))
        .route("/api/calculator/pieces/{id}", delete(calculator::remove_piece))
        .route("/api/calculator/pieces/{id}/metrics", get(calculator::piece_metrics))
        .route("/api/calculator/pieces/{id}/{dimension}", put(calculator::set_piece_field))
        .route("/api/calculator/submit", post(calculator::submit))
        .route("/api/calculator/diagram.svg", get(calculator::diagram))
        .route("/api/history", get(history::list_entries).delete(history::clear_entries))
        .route(
            "/api/history/{id}",
            get(history::get_entry)
                .put(history::update_entry)
                .delete(history::delete_entry),
        )
        .route("/api/history/{id}/edit", post(history::edit_entry))
        .route("/api/history/{id}/export.svg", get(history::export_svg))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
