/// Gemini HTTP client implementation.
///
/// This module provides `GeminiClient` for making synchronous requests to the
/// Gemini `generateContent` endpoint, along with the error type and builder.
use std::fmt;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{Config, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Header carrying the API key on every request.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Request timeout used unless the builder overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that can occur when asking Gemini for a completion.
#[derive(Debug, Error)]
pub enum GeminiError {
    /// No API key was configured
    #[error("API key is missing")]
    MissingApiKey,

    /// The prompt had nothing left to send after normalization
    #[error("Prompt is empty")]
    EmptyPrompt,

    /// Network-related errors (connection failures, DNS resolution, etc.)
    #[error("Network error: {}", error_chain(.0))]
    Network(#[source] reqwest::Error),

    /// Request or response timeout errors
    #[error("Request timed out: {}", error_chain(.0))]
    Timeout(#[source] reqwest::Error),

    /// Gemini answered with a non-success status
    #[error("Gemini API error (status {status}): {message}")]
    Rejected { status: u16, message: String },

    /// Gemini refused to produce text for the prompt
    #[error("Response blocked: {reason}")]
    Blocked { reason: String },

    /// The response body was not the expected shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid URL configuration error
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Builder for constructing `GeminiClient` instances.
///
/// # Examples
///
/// ```
/// use gemqa::gemini::GeminiClientBuilder;
///
/// let client = GeminiClientBuilder::new()
///     .api_key("test-key")
///     .model("gemini-2.5-flash")
///     .build()
///     .expect("Failed to create client");
/// assert_eq!(client.model(), "gemini-2.5-flash");
/// ```
#[derive(Default)]
pub struct GeminiClientBuilder {
    api_key: Option<String>,
    model: Option<String>,
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl GeminiClientBuilder {
    /// Creates a new `GeminiClientBuilder` with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder pre-filled from a loaded `Config`.
    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.api_key().map(String::from),
            model: Some(config.model().to_string()),
            base_url: Some(config.base_url().to_string()),
            timeout: None,
        }
    }

    /// Sets the API key sent with every request.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the model name (e.g. "gemini-2.5-pro").
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Sets the API base URL (e.g. "https://generativelanguage.googleapis.com").
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the whole-request timeout (default `DEFAULT_TIMEOUT`).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the `GeminiClient` with the configured settings.
    ///
    /// Unset model and base URL fall back to `DEFAULT_MODEL` and
    /// `DEFAULT_BASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::MissingApiKey` if no non-empty key was given,
    /// `GeminiError::InvalidUrl` if the base URL does not parse, or
    /// `GeminiError::Network` if the HTTP client cannot be created.
    pub fn build(self) -> Result<GeminiClient, GeminiError> {
        let api_key = self
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let model = self.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        reqwest::Url::parse(&base_url)
            .map_err(|e| GeminiError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        // Reasoning models can take minutes on one answer
        let timeout = self.timeout.unwrap_or(DEFAULT_TIMEOUT);
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .build()
            .map_err(GeminiError::Network)?;

        Ok(GeminiClient {
            client,
            api_key,
            model,
            base_url,
        })
    }
}

/// Synchronous HTTP client for the Gemini API.
///
/// Each call to `generate` issues exactly one request; nothing is retried.
pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    base_url: String,
}

/// Trait for text generation backends.
///
/// Lets the front ends and tests swap the real client for a stub.
pub trait GeminiClientTrait: Send + Sync {
    /// Sends `prompt` to the model and returns the generated text.
    fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

impl GeminiClient {
    /// Returns the base URL configured for this client.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the model name configured for this client.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full URL of the `generateContent` endpoint for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    fn generate_internal(&self, prompt: &str) -> Result<String, GeminiError> {
        if prompt.trim().is_empty() {
            return Err(GeminiError::EmptyPrompt);
        }

        let url = self.endpoint();
        let request_body = serde_json::json!({
            "contents": [
                { "parts": [ { "text": prompt } ] }
            ]
        });

        debug!(model = %self.model, prompt_chars = prompt.chars().count(), "calling generateContent");

        let response = self
            .client
            .post(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&request_body)
            .send()
            .map_err(transport_error)?;

        let status = response.status();
        let body = response.text().map_err(transport_error)?;

        if !status.is_success() {
            let message = parse_error_message(&body).unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("unknown error")
                    .to_string()
            });
            warn!(status = status.as_u16(), %message, "generateContent rejected");
            return Err(GeminiError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        parse_generate_response(&body)
    }
}

impl GeminiClientTrait for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        self.generate_internal(prompt)
    }
}

impl fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiClient")
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

fn transport_error(error: reqwest::Error) -> GeminiError {
    if error.is_timeout() {
        GeminiError::Timeout(error)
    } else {
        GeminiError::Network(error)
    }
}

/// Renders an error followed by each of its causes, separated by `: `.
fn error_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut cause = std::error::Error::source(error);
    while let Some(inner) = cause {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        cause = inner.source();
    }
    message
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Extracts the answer text from a `generateContent` response body.
///
/// The text parts of the first candidate are concatenated; thought parts are
/// skipped.
fn parse_generate_response(body: &str) -> Result<String, GeminiError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| GeminiError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let Some(candidate) = response.candidates.into_iter().next() else {
        return Err(match response.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => GeminiError::Blocked { reason },
            None => GeminiError::MalformedResponse("no candidates in response".to_string()),
        });
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if !text.is_empty() {
        return Ok(text);
    }

    match candidate.finish_reason {
        Some(reason) if reason != "STOP" => Err(GeminiError::Blocked { reason }),
        _ => Err(GeminiError::MalformedResponse(
            "candidate contained no text".to_string(),
        )),
    }
}

/// Pulls `error.message` out of an error response body, if present.
fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
}
