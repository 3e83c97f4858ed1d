pub mod answerer;
pub mod config;
pub mod gemini;
pub mod normalizer;
pub mod shell;
pub mod web;

pub use answerer::QuestionAnswerer;
pub use config::{Config, ConfigError};
pub use gemini::{GeminiClient, GeminiClientBuilder, GeminiClientTrait, GeminiError};
pub use normalizer::{NormalizedQuestion, normalize};

/// Installs the `tracing` subscriber used by both binaries.
///
/// `RUST_LOG` wins when set; otherwise `default_level` applies to this crate,
/// its binaries and the HTTP trace layer, and everything else stays at `warn`.
/// Output goes to stderr.
pub fn init_tracing(default_level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "warn,gemqa={default_level},gemqa_web={default_level},tower_http={default_level}"
        ))
    });

    // A second call (e.g. from tests) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
