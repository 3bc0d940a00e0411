//! Diagram renderer: to-scale SVG of a board and its placed pieces.
//!
//! DESIGN
//! ======
//! The SVG uses board units directly as user units (`viewBox="0 0 W H"`),
//! so the drawing scales with whatever box the client renders it into.
//! Stroke widths and font sizes are derived from the board and piece sizes
//! rather than fixed pixels.
//!
//! With no placed pieces the output is a bare board outline, used as the
//! preview before the first calculation.

use serde::Serialize;

use crate::model::{Board, PlacedPiece};

/// Download name for exported diagrams.
pub const EXPORT_FILENAME: &str = "layout-plan.svg";

const SVG_NS: &str = "http://www.w3.org/2000/svg";
const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
const XML_PROLOG: &str = "<?xml version=\"1.0\" standalone=\"no\"?>\r\n";

const BOARD_FILL: &str = "#374151";
const PIECE_STROKE: &str = "black";
const SELECTED_STROKE: &str = "#34d399";

// =============================================================================
// RENDER
// =============================================================================

/// Render `placed` on `board`, highlighting the piece with id `selected`.
#[must_use]
pub fn render_svg(board: &Board, placed: &[PlacedPiece], selected: Option<&str>) -> String {
    let view_width = if board.width > 0.0 { board.width } else { 100.0 };
    let view_height = if board.height > 0.0 { board.height } else { 100.0 };
    let stroke = view_width.min(view_height) * 0.005;
    let label_offset = stroke * 5.0;
    let label_size = stroke * 4.0;

    let mut svg = String::new();
    svg.push_str(&format!(
        "<svg id=\"layout-svg\" xmlns=\"{SVG_NS}\" viewBox=\"0 0 {view_width} {view_height}\" preserveAspectRatio=\"xMidYMid meet\">"
    ));
    svg.push_str(&format!(
        "<rect width=\"{}\" height=\"{}\" fill=\"{BOARD_FILL}\"/>",
        board.width, board.height
    ));
    svg.push_str(&format!(
        "<text x=\"{}\" y=\"{label_offset}\" text-anchor=\"middle\" fill=\"white\" font-size=\"{label_size}\">{}</text>",
        board.width / 2.0,
        escape_xml(&board.width.to_string())
    ));
    svg.push_str(&format!(
        "<text x=\"{label_offset}\" y=\"{y}\" text-anchor=\"middle\" fill=\"white\" font-size=\"{label_size}\" transform=\"rotate(-90 {label_offset},{y})\">{}</text>",
        escape_xml(&board.height.to_string()),
        y = board.height / 2.0,
    ));

    for piece in placed {
        let is_selected = selected == Some(piece.id.as_str());
        let (piece_stroke, piece_stroke_width) =
            if is_selected { (SELECTED_STROKE, stroke * 2.0) } else { (PIECE_STROKE, stroke) };
        svg.push_str(&format!("<g data-id=\"{}\">", escape_xml(&piece.id)));
        svg.push_str(&format!(
            "<rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" stroke=\"{piece_stroke}\" stroke-width=\"{piece_stroke_width}\"/>",
            piece.x,
            piece.y,
            piece.width,
            piece.height,
            escape_xml(&piece.color)
        ));
        svg.push_str(&format!(
            "<text x=\"{}\" y=\"{}\" text-anchor=\"middle\" dy=\".3em\" fill=\"black\" font-family=\"monospace\" font-size=\"{}\">{}</text>",
            piece.x + piece.width / 2.0,
            piece.y + piece.height / 2.0,
            piece.width.min(piece.height) * 0.2,
            escape_xml(&format!("{}x{}", piece.width, piece.height))
        ));
        svg.push_str("</g>");
    }

    svg.push_str("</svg>");
    svg
}

fn escape_xml(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

// =============================================================================
// SELECTION
// =============================================================================

/// Details shown for the selected piece.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedMetrics {
    pub id: String,
    pub width: f64,
    pub height: f64,
    /// `(x, y)` with two decimals.
    pub position: String,
    pub color: String,
}

/// Metrics for the placed piece `id`; `None` when it is not placed, which
/// clears the selection.
#[must_use]
pub fn selected_metrics(placed: &[PlacedPiece], id: &str) -> Option<SelectedMetrics> {
    placed.iter().find(|p| p.id == id).map(|p| SelectedMetrics {
        id: p.id.clone(),
        width: p.width,
        height: p.height,
        position: format!("({:.2}, {:.2})", p.x, p.y),
        color: p.color.clone(),
    })
}

// =============================================================================
// EXPORT
// =============================================================================

/// Turn rendered markup into a standalone SVG file.
///
/// The XML prolog is prepended and any namespace declaration missing from
/// the root `<svg` tag is inserted right after the tag name.
#[must_use]
pub fn export_document(svg: &str) -> String {
    let source = svg.trim_start();
    let Some(rest) = source.strip_prefix("<svg") else {
        return format!("{XML_PROLOG}{source}");
    };
    let root = &rest[..rest.find('>').unwrap_or(rest.len())];

    let mut namespaces = String::new();
    if !root.contains(&format!("xmlns=\"{SVG_NS}\"")) {
        namespaces.push_str(&format!(" xmlns=\"{SVG_NS}\""));
    }
    if !root.contains(&format!("\"{XLINK_NS}\"")) {
        namespaces.push_str(&format!(" xmlns:xlink=\"{XLINK_NS}\""));
    }

    format!("{XML_PROLOG}<svg{namespaces}{rest}")
}

#[cfg(test)]
#[path = "diagram_test.rs"]
mod tests;
