//! Natural-language requests -> model output -> pipeline
//!
//! The model itself lives outside this crate. [`InferenceService`] is the
//! seam: anything that turns a system instruction plus a user message into
//! one completion string can drive the [`Generator`].

pub mod command;
pub mod generator;
pub mod knowledge;
pub mod prompt;

use thiserror::Error;

pub use command::CommandService;
pub use generator::{GenerateError, Generator};
pub use knowledge::{KnowledgeBase, KNOWLEDGE_BASE};
pub use prompt::{PromptBuilder, PromptError};

/// Errors that can occur while talking to the inference service
#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("No inference command configured (set inference.command or OUIJA_INFERENCE_COMMAND)")]
    NotConfigured,

    #[error("Inference command failed ({status}): {stderr}")]
    CommandFailed { status: String, stderr: String },

    #[error("Inference command timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("Inference service returned an empty response")]
    EmptyResponse,

    #[error("Failed to encode request: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can complete a chat with a language model
pub trait InferenceService: Send + Sync {
    /// One completion for a system instruction and a user message
    fn complete(&self, system: &str, user: &str) -> Result<String, InferenceError>;
}

/// Always answers with the same text. Used for `--replay` and in tests.
#[derive(Debug, Clone)]
pub struct ReplayService {
    response: String,
}

impl ReplayService {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl InferenceService for ReplayService {
    fn complete(&self, _system: &str, _user: &str) -> Result<String, InferenceError> {
        if self.response.trim().is_empty() {
            return Err(InferenceError::EmptyResponse);
        }
        Ok(self.response.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_returns_fixed_text() {
        let service = ReplayService::new("{\"name\": \"x\"}");
        assert_eq!(service.complete("sys", "a").unwrap(), "{\"name\": \"x\"}");
        assert_eq!(service.complete("sys", "b").unwrap(), "{\"name\": \"x\"}");
    }

    #[test]
    fn test_replay_empty_is_error() {
        let service = ReplayService::new("  \n");
        assert!(matches!(
            service.complete("sys", "user"),
            Err(InferenceError::EmptyResponse)
        ));
    }
}
