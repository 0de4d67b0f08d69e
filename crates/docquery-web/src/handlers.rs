//! Routes and request handlers

use axum::{
    extract::{Form, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;

use docquery_core::{Error, QueryEngine};

use crate::page::{render_page, Outcome, DEFAULT_TITLE};

/// Validation message shown for an empty submission
pub const EMPTY_QUERY_MESSAGE: &str = "Please enter a query.";

/// Shared state for all handlers
#[derive(Clone)]
pub struct AppState {
    engine: Arc<dyn QueryEngine>,
    title: Arc<str>,
}

impl AppState {
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self {
            engine,
            title: Arc::from(DEFAULT_TITLE),
        }
    }

    pub fn with_title(mut self, title: impl AsRef<str>) -> Self {
        self.title = Arc::from(title.as_ref());
        self
    }
}

/// Form body posted by the page
#[derive(Debug, Deserialize)]
pub struct QueryForm {
    #[serde(default)]
    pub query: String,
}

/// Query failure, rendered as a 500 page
#[derive(Debug)]
pub struct AppError {
    title: Arc<str>,
    query: String,
    error: Error,
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let message = self.error.to_string();
        let page = render_page(&self.title, &self.query, &Outcome::Failed(&message));
        (StatusCode::INTERNAL_SERVER_ERROR, Html(page)).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .with_state(state)
}

/// `GET /`: the empty form
pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_page(&state.title, "", &Outcome::Blank))
}

/// `POST /`: validate and forward the query to the engine
pub async fn submit(
    State(state): State<AppState>,
    Form(form): Form<QueryForm>,
) -> Result<Html<String>, AppError> {
    let query = form.query;

    if query.is_empty() {
        return Ok(Html(render_page(
            &state.title,
            &query,
            &Outcome::Invalid(EMPTY_QUERY_MESSAGE),
        )));
    }

    tracing::info!(query = %query, "received query");

    match state.engine.query(&query).await {
        Ok(response) => {
            tracing::info!(sources = response.source_nodes.len(), "answered query");
            Ok(Html(render_page(&state.title, &query, &Outcome::Answered(&response))))
        }
        Err(error) => {
            tracing::error!(error = %error, "query failed");
            Err(AppError {
                title: state.title.clone(),
                query,
                error,
            })
        }
    }
}

/// Serve the router on `listener` until `shutdown` resolves
pub async fn serve(
    listener: TcpListener,
    state: AppState,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
}
