use super::*;
use crate::llm::types::{ChatResponse, LlmError};
use crate::oracle::Placement;
use std::sync::Mutex;

// =========================================================================
// MockLlm
// =========================================================================

struct MockLlm {
    replies: Mutex<Vec<Result<String, LlmError>>>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl MockLlm {
    fn new(replies: Vec<Result<String, LlmError>>) -> Arc<Self> {
        Arc::new(Self { replies: Mutex::new(replies), requests: Mutex::new(Vec::new()) })
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl LlmChat for MockLlm {
    async fn chat(&self, request: &StructuredRequest) -> Result<ChatResponse, LlmError> {
        self.requests.lock().unwrap().push(request.clone());
        let reply = self.replies.lock().unwrap().remove(0);
        reply.map(|text| ChatResponse {
            text,
            model: "mock".into(),
            stop_reason: "STOP".into(),
            input_tokens: 0,
            output_tokens: 0,
        })
    }
}

fn board() -> Board {
    Board { width: 100.0, height: 100.0 }
}

fn piece(id: &str, width: f64, height: f64) -> Piece {
    Piece { id: id.into(), width, height }
}

// =========================================================================
// request_layout
// =========================================================================

#[tokio::test]
async fn empty_pieces_short_circuit_without_llm_call() {
    let llm = MockLlm::new(Vec::new());
    let oracle = LlmLayoutOracle::new(llm.clone());
    let layout = oracle.request_layout(&board(), &[]).await.unwrap();
    assert!(layout.is_empty());
    assert_eq!(llm.calls(), 0);
}

#[tokio::test]
async fn single_request_decodes_layout() {
    let llm = MockLlm::new(vec![Ok(r#"{"placedPieces":[{"id":"a","x":0,"y":0}],"unplacedPieces":[{"id":"b"}]}"#.into())]);
    let oracle = LlmLayoutOracle::new(llm.clone()).with_max_tokens(100);
    let layout = oracle
        .request_layout(&board(), &[piece("a", 20.0, 30.0), piece("b", 200.0, 10.0)])
        .await
        .unwrap();

    assert_eq!(llm.calls(), 1);
    assert_eq!(layout.placed_pieces, vec![Placement { id: "a".into(), x: 0.0, y: 0.0 }]);
    assert_eq!(layout.unplaced_pieces[0].id, "b");

    let request = llm.requests.lock().unwrap()[0].clone();
    assert_eq!(request.max_tokens, 100);
    assert!(request.system.contains("Do NOT rotate"));
    assert!(request.system.contains("top-left"));
    assert_eq!(request.schema.name, "submit_layout");
}

#[tokio::test]
async fn malformed_answer_is_invalid_layout() {
    let llm = MockLlm::new(vec![Ok(r#"{"placed":[]}"#.into())]);
    let oracle = LlmLayoutOracle::new(llm);
    let err = oracle
        .request_layout(&board(), &[piece("a", 1.0, 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::InvalidLayout(_)));
    assert!(err.to_string().contains("invalid layout"));
}

#[tokio::test]
async fn transport_error_is_surfaced() {
    let llm = MockLlm::new(vec![Err(LlmError::ApiRequest("connection reset".into()))]);
    let oracle = LlmLayoutOracle::new(llm.clone());
    let err = oracle
        .request_layout(&board(), &[piece("a", 1.0, 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, OracleError::Llm(LlmError::ApiRequest(_))));
    assert_eq!(llm.calls(), 1);
}

// =========================================================================
// prompt / schema / parsing
// =========================================================================

#[test]
fn prompt_lists_board_and_pieces() {
    let prompt = build_prompt(&Board { width: 120.0, height: 60.5 }, &[piece("p-1", 10.5, 20.0)]);
    assert!(prompt.contains("- Width: 120\n"));
    assert!(prompt.contains("- Height: 60.5\n"));
    assert!(prompt.contains("- ID: p-1, Width: 10.5, Height: 20"));
    assert!(prompt.ends_with("provide the JSON output."));
}

#[test]
fn schema_requires_both_lists() {
    let schema = layout_schema().schema;
    assert_eq!(schema["required"], json!(["placedPieces", "unplacedPieces"]));
    assert_eq!(schema["properties"]["placedPieces"]["items"]["required"], json!(["id", "x", "y"]));
    assert_eq!(schema["properties"]["unplacedPieces"]["items"]["required"], json!(["id"]));
}

#[test]
fn parse_accepts_code_fence() {
    let layout = parse_layout("```json\n{\"placedPieces\":[],\"unplacedPieces\":[]}\n```").unwrap();
    assert!(layout.is_empty());
}

#[test]
fn parse_rejects_missing_list() {
    assert!(parse_layout(r#"{"placedPieces":[]}"#).is_err());
    assert!(parse_layout("not json").is_err());
    assert!(parse_layout(r#"{"placedPieces":[{"id":"a"}],"unplacedPieces":[]}"#).is_err());
}
