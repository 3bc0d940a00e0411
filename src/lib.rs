//! cutplan: board cutting calculator.
//!
//! DESIGN
//! ======
//! Dimension strings are validated and parsed locally, placement is delegated
//! to a `LayoutOracle` (an LLM by default), and every successful calculation
//! is recorded in a persisted history. The HTTP layer in `routes` is a thin
//! shell over the calculator workflow and the history store.

pub mod calculator;
pub mod config;
pub mod diagram;
pub mod dimension;
pub mod error;
pub mod history;
pub mod llm;
pub mod model;
pub mod oracle;
pub mod routes;
pub mod state;
