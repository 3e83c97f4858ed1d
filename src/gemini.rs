/// Gemini HTTP client module.
///
/// This module provides a blocking client for the Gemini `generateContent`
/// endpoint, a trait seam for substituting stub clients, and the classified
/// error type returned by every call.
mod client;

pub use client::{
    DEFAULT_TIMEOUT, GeminiClient, GeminiClientBuilder, GeminiClientTrait, GeminiError,
};
