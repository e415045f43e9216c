//! The one outbound call: turning text into a summary with a hosted model.

mod client;

pub use client::{GeminiClient, DEFAULT_BASE_URL, DEFAULT_MODEL};

use secrecy::SecretString;
use std::{future::Future, pin::Pin};
use thiserror::Error;

const PROMPT_INSTRUCTION: &str = "Summarize the following text clearly and concisely:";

/// Errors surfaced to the visitor verbatim. There is no retry and no
/// transient/permanent split.
#[derive(Debug, Error)]
pub enum SummarizeError {
    #[error("no API key provided")]
    MissingApiKey,
    #[error("request to Gemini failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{message} (HTTP {status})")]
    Api { status: u16, message: String },
    #[error("prompt was blocked by the model: {0}")]
    Blocked(String),
    #[error("model returned no text (finish reason: {0})")]
    EmptyCompletion(String),
}

pub type SummaryFuture<'a> = Pin<Box<dyn Future<Output = Result<String, SummarizeError>> + Send + 'a>>;

/// Produces a completion for `text`, authorized by `api_key`.
///
/// Implementations return the model's text unmodified.
pub trait Summarizer: Send + Sync {
    fn summarize<'a>(&'a self, text: &'a str, api_key: &'a SecretString) -> SummaryFuture<'a>;
}

/// Instruction followed by the untouched payload.
#[must_use]
pub fn build_prompt(text: &str) -> String {
    format!("{PROMPT_INSTRUCTION}\n\n{text}")
}
