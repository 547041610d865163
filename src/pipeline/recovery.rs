//! Pull a JSON object out of free-form model output
//!
//! Models wrap their JSON in chatter ("Sure! Here is your config:") and
//! markdown fences. Recovery strips every fence marker, then takes the first
//! `{` through the last `}` and parses that. The slice is greedy and not
//! nesting-aware: trailing or leading prose is the common failure, interior
//! corruption is not worth guessing at.

use miette::{Diagnostic, NamedSource, SourceSpan};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use thiserror::Error;

/// Opening or closing markdown fence, with an optional language tag
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```[A-Za-z0-9_+\-]*").expect("fence pattern is valid"));

/// No JSON object could be recovered from the model output
#[derive(Debug, Error, Diagnostic)]
pub enum RecoveryError {
    #[error("No JSON object found in model output")]
    #[diagnostic(
        code(ouija::recovery::no_json),
        help("The model answered without any {{...}} block; try re-running the prompt")
    )]
    NoJsonObject { raw: String },

    #[error("Invalid JSON from model: {message}")]
    #[diagnostic(code(ouija::recovery::invalid_json))]
    InvalidJson {
        raw: String,

        message: String,

        #[source_code]
        src: NamedSource<String>,

        #[label("parse failed here")]
        span: SourceSpan,

        #[help]
        help: Option<String>,
    },
}

impl RecoveryError {
    /// The model output exactly as received
    pub fn raw(&self) -> &str {
        match self {
            RecoveryError::NoJsonObject { raw } => raw,
            RecoveryError::InvalidJson { raw, .. } => raw,
        }
    }

    fn invalid_json(raw: &str, candidate: &str, err: &serde_json::Error) -> Self {
        let offset = line_col_to_offset(candidate, err.line(), err.column());
        let message = err.to_string();
        let help = generate_help(&message);

        RecoveryError::InvalidJson {
            raw: raw.to_string(),
            message,
            src: NamedSource::new("model output", candidate.to_string()),
            span: SourceSpan::from(offset..offset.saturating_add(1).min(candidate.len().max(1))),
            help,
        }
    }
}

/// Remove every markdown fence marker (` ``` ` and ` ```json ` alike)
pub fn strip_fences(text: &str) -> String {
    FENCE.replace_all(text, "").into_owned()
}

/// The first `{` through the last `}`, if both exist in that order
pub fn candidate(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    text.get(start..=end)
}

/// Recover a single JSON object from raw model output
pub fn recover(raw: &str) -> Result<Value, RecoveryError> {
    let stripped = strip_fences(raw);

    let Some(candidate) = candidate(&stripped) else {
        return Err(RecoveryError::NoJsonObject {
            raw: raw.to_string(),
        });
    };

    serde_json::from_str::<Value>(candidate)
        .map_err(|e| RecoveryError::invalid_json(raw, candidate, &e))
}

/// Convert serde_json's 1-based line/column to a byte offset
fn line_col_to_offset(source: &str, line: usize, column: usize) -> usize {
    let mut line_start = 0;
    for (i, text) in source.split_inclusive('\n').enumerate() {
        if i + 1 == line {
            let col = column.saturating_sub(1).min(text.len());
            return line_start + col;
        }
        line_start += text.len();
    }
    source.len().saturating_sub(1)
}

/// Generate helpful suggestions based on error message
fn generate_help(message: &str) -> Option<String> {
    let msg_lower = message.to_lowercase();

    if msg_lower.contains("trailing comma") {
        return Some("Remove the comma before the closing bracket or brace".to_string());
    }

    if msg_lower.contains("key must be a string") {
        return Some("JSON keys need double quotes: {\"name\": ...}".to_string());
    }

    if msg_lower.contains("eof while parsing") {
        return Some("The model output looks truncated; the object never closes".to_string());
    }

    if msg_lower.contains("expected `,` or `}`") || msg_lower.contains("expected `,` or `]`") {
        return Some("Add commas between entries".to_string());
    }

    None
}
