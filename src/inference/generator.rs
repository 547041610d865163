//! Request -> prompt -> inference -> pipeline

use miette::Diagnostic;
use thiserror::Error;
use tracing::info;

use super::prompt::{PromptBuilder, PromptError};
use super::{InferenceError, InferenceService};
use crate::pipeline::{Pipeline, Response};
use crate::schema::validator::SchemaError;

/// Errors that stop a request before the pipeline sees any model output
#[derive(Debug, Error, Diagnostic)]
pub enum GenerateError {
    #[error("Prompt is empty")]
    #[diagnostic(
        code(ouija::generate::empty_prompt),
        help("Describe the seed you want, e.g. \"Blueprint and Brainstorm by ante 3\"")
    )]
    EmptyPrompt,

    #[error(transparent)]
    #[diagnostic(
        code(ouija::generate::inference),
        help("Check inference.command in your config, or use --replay with saved output")
    )]
    Inference(#[from] InferenceError),

    #[error(transparent)]
    #[diagnostic(code(ouija::generate::prompt))]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),
}

/// Drives one inference service through the pipeline
pub struct Generator<S: InferenceService> {
    service: S,
    prompt: PromptBuilder,
    pipeline: Pipeline,
}

impl<S: InferenceService> Generator<S> {
    /// Generator with the embedded prompt template and schema
    pub fn new(service: S) -> Result<Self, GenerateError> {
        Ok(Self::with_parts(service, PromptBuilder::new()?, Pipeline::new()?))
    }

    pub fn with_parts(service: S, prompt: PromptBuilder, pipeline: Pipeline) -> Self {
        Self {
            service,
            prompt,
            pipeline,
        }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Turn a natural-language request into a boundary response.
    ///
    /// Model output that holds no usable JSON is not an error here; it comes
    /// back as [`Response::Failed`] with the raw text attached.
    pub fn generate(&self, request: &str) -> Result<Response, GenerateError> {
        let request = request.trim();
        if request.is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let system = self.prompt.system_prompt()?;
        let user = self.prompt.user_prompt(request);
        let raw = self.service.complete(&system, &user)?;
        info!(bytes = raw.len(), "received model output");

        Ok(self.pipeline.respond(&raw))
    }
}
