//! The shared question-answering pipeline.
//!
//! Both front ends run the same two steps: normalize the raw question, then
//! send the cleaned text to the model as the prompt.

use std::sync::Arc;

use crate::gemini::{GeminiClientTrait, GeminiError};
use crate::normalizer::{NormalizedQuestion, normalize};

/// Answers free-text questions with a generative model.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use gemqa::answerer::QuestionAnswerer;
/// use gemqa::gemini::GeminiClientBuilder;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = GeminiClientBuilder::new().api_key("key").build()?;
/// let answerer = QuestionAnswerer::new(Arc::new(client));
///
/// let question = answerer.prepare("What is Rust?");
/// println!("{}", answerer.answer(&question)?);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QuestionAnswerer {
    client: Arc<dyn GeminiClientTrait>,
}

impl QuestionAnswerer {
    /// Creates a new `QuestionAnswerer` with the specified client.
    #[must_use]
    pub fn new(client: Arc<dyn GeminiClientTrait>) -> Self {
        Self { client }
    }

    /// Normalizes a raw question.
    pub fn prepare(&self, question: &str) -> NormalizedQuestion {
        normalize(question)
    }

    /// Sends the cleaned question to the model and returns its answer.
    ///
    /// A question with no tokens left after normalization is never sent.
    ///
    /// # Errors
    ///
    /// Returns `GeminiError::EmptyPrompt` for an empty question, or whatever
    /// error the model client reports.
    pub fn answer(&self, question: &NormalizedQuestion) -> Result<String, GeminiError> {
        if question.is_empty() {
            return Err(GeminiError::EmptyPrompt);
        }
        self.client.generate(question.cleaned())
    }
}
