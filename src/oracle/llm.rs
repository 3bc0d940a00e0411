//! LLM-backed layout oracle.
//!
//! Builds a packing instruction plus a plain-text description of the board
//! and pieces, asks the model for JSON constrained to the layout schema and
//! decodes the answer. One request per call: no retries, no caching. The
//! answer is not checked geometrically here; see `verify`.

use std::sync::Arc;

use serde_json::{Value, json};
use tracing::{info, warn};

use super::{LayoutOracle, OracleError, OracleLayout};
use crate::llm::LlmChat;
use crate::llm::types::{ResponseSchema, StructuredRequest};
use crate::model::{Board, Piece};

pub const DEFAULT_LAYOUT_MAX_TOKENS: u32 = 8192;

const SCHEMA_NAME: &str = "submit_layout";

const SYSTEM_INSTRUCTION: &str = "You are an expert in 2D bin packing and layout optimization. \
Your task is to place a list of smaller rectangular pieces onto a larger rectangular board, \
minimizing waste and trying to fit as many pieces as possible.
- The origin (0,0) is the top-left corner of the board.
- Do NOT rotate any pieces; place them with the exact width and height provided.
- Pieces cannot overlap.
- Pieces must be placed entirely within the board's boundaries.
- Provide the coordinates (x, y) for the top-left corner of each placed piece.
- Return a JSON object matching the provided schema.";

pub struct LlmLayoutOracle {
    llm: Arc<dyn LlmChat>,
    max_tokens: u32,
}

impl LlmLayoutOracle {
    #[must_use]
    pub fn new(llm: Arc<dyn LlmChat>) -> Self {
        Self { llm, max_tokens: DEFAULT_LAYOUT_MAX_TOKENS }
    }

    #[must_use]
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait::async_trait]
impl LayoutOracle for LlmLayoutOracle {
    fn name(&self) -> &'static str {
        "llm"
    }

    async fn request_layout(&self, board: &Board, pieces: &[Piece]) -> Result<OracleLayout, OracleError> {
        if pieces.is_empty() {
            return Ok(OracleLayout::default());
        }

        let request = StructuredRequest {
            system: SYSTEM_INSTRUCTION.to_string(),
            prompt: build_prompt(board, pieces),
            max_tokens: self.max_tokens,
            schema: layout_schema(),
        };
        let response = self.llm.chat(&request).await?;

        info!(
            model = %response.model,
            stop_reason = %response.stop_reason,
            input_tokens = response.input_tokens,
            output_tokens = response.output_tokens,
            "oracle: LLM response"
        );

        parse_layout(&response.text)
    }
}

// =============================================================================
// PROMPT
// =============================================================================

pub(crate) fn build_prompt(board: &Board, pieces: &[Piece]) -> String {
    let pieces_description = pieces
        .iter()
        .map(|p| format!("- ID: {}, Width: {}, Height: {}", p.id, p.width, p.height))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Board dimensions:\n- Width: {}\n- Height: {}\n\nPieces to place:\n{pieces_description}\n\n\
         Calculate the optimal layout and provide the JSON output.",
        board.width, board.height
    )
}

/// Response schema: placed pieces with coordinates, unplaced pieces by id.
pub(crate) fn layout_schema() -> ResponseSchema {
    let placed_item = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "id": { "type": "string", "description": "The unique ID of the piece." },
            "x": { "type": "number", "description": "The x-coordinate of the top-left corner." },
            "y": { "type": "number", "description": "The y-coordinate of the top-left corner." }
        },
        "required": ["id", "x", "y"]
    });
    let unplaced_item = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "id": { "type": "string", "description": "The unique ID of the unplaced piece." }
        },
        "required": ["id"]
    });
    let schema: Value = json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "placedPieces": {
                "type": "array",
                "description": "List of pieces that were successfully placed on the board.",
                "items": placed_item
            },
            "unplacedPieces": {
                "type": "array",
                "description": "List of pieces that could not be placed on the board.",
                "items": unplaced_item
            }
        },
        "required": ["placedPieces", "unplacedPieces"]
    });
    ResponseSchema {
        name: SCHEMA_NAME.to_string(),
        description: "Submit the placement of every piece on the board.".to_string(),
        schema,
    }
}

// =============================================================================
// PARSING
// =============================================================================

/// Decode the model's JSON answer. Tolerates a Markdown code fence.
pub(crate) fn parse_layout(text: &str) -> Result<OracleLayout, OracleError> {
    let trimmed = strip_code_fence(text.trim());
    serde_json::from_str(trimmed).map_err(|e| {
        warn!(error = %e, raw = %text, "oracle: unparseable layout");
        OracleError::InvalidLayout(e.to_string())
    })
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
#[path = "llm_test.rs"]
mod tests;
