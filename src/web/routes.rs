//! Route handlers for the HTTP front end.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, info};

use crate::gemini::GeminiError;

use super::AppState;

type AppStateArc = Arc<AppState>;

const INDEX_HTML: &str = include_str!("../../static/index.html");

/// Body of `POST /ask`.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: Option<String>,
}

/// Successful reply from `POST /ask`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AskResponse {
    /// The question exactly as received
    pub original: String,
    /// The normalized text sent to the model
    pub processed: String,
    /// The model's answer
    pub answer: String,
}

/// Error envelope returned with every non-200 status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failures of `POST /ask`, each mapped to a status code.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Server was started without `GEMINI_API_KEY`
    #[error("API Key is missing on the server.")]
    MissingApiKey,

    /// Body was not JSON, or `question` was absent or blank
    #[error("No question provided")]
    NoQuestion,

    /// The model call failed
    #[error(transparent)]
    Model(#[from] GeminiError),

    /// The blocking model task could not be joined
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NoQuestion => StatusCode::BAD_REQUEST,
            Self::MissingApiKey | Self::Model(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}

pub(super) fn app_routes() -> Router<AppStateArc> {
    Router::new()
        .route("/", get(home))
        .route("/ask", post(ask))
}

async fn home() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Answers one question.
///
/// The API key is checked before the body is looked at, so a misconfigured
/// server reports 500 even for malformed requests.
async fn ask(
    State(state): State<AppStateArc>,
    body: Bytes,
) -> Result<Json<AskResponse>, ApiError> {
    let answerer = state.answerer().cloned().ok_or(ApiError::MissingApiKey)?;

    let request: AskRequest = serde_json::from_slice(&body).map_err(|_| ApiError::NoQuestion)?;
    let question = request
        .question
        .filter(|q| !q.trim().is_empty())
        .ok_or(ApiError::NoQuestion)?;

    let normalized = answerer.prepare(&question);
    let processed = normalized.cleaned().to_string();
    info!(tokens = normalized.tokens().len(), "answering question");

    let answer = tokio::task::spawn_blocking(move || answerer.answer(&normalized))
        .await
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .map_err(|e| {
            error!("Model call failed: {}", e);
            ApiError::Model(e)
        })?;

    Ok(Json(AskResponse {
        original: question,
        processed,
        answer,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_statuses() {
        assert_eq!(ApiError::NoQuestion.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::MissingApiKey.status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Model(GeminiError::EmptyPrompt).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn model_error_message_passes_through() {
        let error = ApiError::from(GeminiError::Rejected {
            status: 403,
            message: "API key not valid".to_string(),
        });
        assert_eq!(
            error.to_string(),
            "Gemini API error (status 403): API key not valid"
        );
    }

    #[test]
    fn ask_request_tolerates_missing_question() {
        let request: AskRequest = serde_json::from_str("{}").unwrap();
        assert!(request.question.is_none());
    }

    #[test]
    fn index_page_is_html() {
        assert!(INDEX_HTML.contains("<html"));
        assert!(INDEX_HTML.contains("/ask"));
    }
}
