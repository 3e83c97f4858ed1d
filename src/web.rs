//! HTTP front end.
//!
//! Serves a static page at `/` and answers JSON questions at `POST /ask`.
//! Requests share nothing mutable; the only state is the read-only answerer.

mod routes;

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::answerer::QuestionAnswerer;
use crate::config::Config;
use crate::gemini::{GeminiClientBuilder, GeminiError};

pub use routes::{ApiError, AskRequest, AskResponse, ErrorResponse};

/// Port used when neither `--port` nor `PORT` is given.
pub const DEFAULT_PORT: u16 = 5000;

/// Application state shared across handlers.
#[derive(Clone, Default)]
pub struct AppState {
    /// `None` when the server was started without an API key
    answerer: Option<QuestionAnswerer>,
}

impl AppState {
    /// Creates state around an optional answerer.
    pub fn new(answerer: Option<QuestionAnswerer>) -> Self {
        Self { answerer }
    }

    /// Builds state from configuration.
    ///
    /// A missing API key is not an error here: the server still starts and
    /// reports the problem on each `/ask` request. Must be called outside the
    /// async runtime because it creates a blocking HTTP client.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError` if a key is present but the client cannot be
    /// built (e.g. an invalid base URL).
    pub fn from_config(config: &Config) -> Result<Self, GeminiError> {
        if config.api_key().is_none() {
            warn!("GEMINI_API_KEY is not set; /ask will answer with 500");
            return Ok(Self::new(None));
        }

        let client = GeminiClientBuilder::from_config(config).build()?;
        Ok(Self::new(Some(QuestionAnswerer::new(Arc::new(client)))))
    }

    /// Returns the answerer, if an API key was configured.
    pub fn answerer(&self) -> Option<&QuestionAnswerer> {
        self.answerer.as_ref()
    }
}

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    routes::app_routes()
        .with_state(Arc::new(state))
        .layer(TraceLayer::new_for_http())
}

/// Serves the application on `listener` until Ctrl+C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Listening on http://{}", addr);
    }

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutting down"),
        Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
    }
}
