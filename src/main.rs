use std::sync::Arc;

use cutplan::config::{AppConfig, OracleKind};
use cutplan::history::{FileStore, HistoryStore};
use cutplan::llm::LlmClient;
use cutplan::oracle::{LayoutOracle, LlmLayoutOracle, ShelfOracle, VerifyingOracle};
use cutplan::{routes, state};

/// Pick the layout oracle. A missing LLM configuration is not fatal: the
/// server starts and submissions report the service as not configured.
fn build_oracle(config: &AppConfig) -> Option<Arc<dyn LayoutOracle>> {
    let inner: Arc<dyn LayoutOracle> = match config.oracle {
        OracleKind::Local => Arc::new(ShelfOracle::new()),
        OracleKind::Llm => match LlmClient::from_env() {
            Ok(client) => {
                tracing::info!(model = client.model(), "LLM client initialized");
                Arc::new(LlmLayoutOracle::new(Arc::new(client)).with_max_tokens(config.max_tokens))
            }
            Err(e) => {
                tracing::warn!(error = %e, "LLM client not configured, calculations disabled");
                return None;
            }
        },
    };
    tracing::info!(oracle = inner.name(), verify = ?config.verify, "layout oracle ready");
    Some(Arc::new(VerifyingOracle::new(inner, config.verify)))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            tracing::warn!(error = %e, "failed to read .env");
        }
    }

    let config = AppConfig::from_env()?;
    let history = HistoryStore::open(FileStore::new(&config.history_dir));
    let state = state::AppState::new(history, build_oracle(&config));

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.port)).await?;

    tracing::info!(port = config.port, history_dir = %config.history_dir.display(), "cutplan listening");
    axum::serve(listener, app).await?;
    Ok(())
}
