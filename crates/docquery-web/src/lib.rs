//! Web interface for docquery
//!
//! Serves one page with a query box. Submitting the form forwards the query to a
//! [`QueryEngine`] and renders the answer with its sources.

mod handlers;
mod page;


pub use handlers::{index, router, serve, submit, AppError, AppState, QueryForm, EMPTY_QUERY_MESSAGE};
pub use page::{render_page, Outcome, DEFAULT_TITLE};

// Re-export core types for convenience
pub use docquery_core::{Error, QueryEngine, Response, Result};
