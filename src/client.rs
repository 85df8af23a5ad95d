//! Core completion trait and error types.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during completion requests.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(String),
}

/// Single-turn text completion against an LLM backend.
///
/// Every model interaction in the bridge is one prompt in, one text answer
/// out. Conversation state, if any, lives in the prompt itself.
#[async_trait]
pub trait Completion: Send + Sync {
    /// Send a prompt and return the model's text answer.
    async fn complete(&self, prompt: &str) -> Result<String, ClientError>;
}
