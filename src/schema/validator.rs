//! Schema validation with detailed error reporting

use jsonschema::{
    error::ValidationErrorKind, validator_for, ValidationError as JsonSchemaError,
    Validator as JsonValidator,
};
use miette::Diagnostic;
use serde::Serialize;
use serde_json::Value as JsonValue;
use std::fmt;
use thiserror::Error;

use crate::core::model::ConstraintList;
use crate::schema::registry::{SchemaRegistry, CONFIG_SCHEMA};

/// Which kind of rule a value broke
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Rule {
    /// A required field is absent
    Required,
    /// The value has the wrong JSON type
    Type,
    /// The value is not one of the allowed names
    Enum,
    /// A number falls outside its inclusive bounds
    Range,
    /// A set-like array holds duplicates
    Unique,
    /// A field the schema does not know about
    AdditionalProperties,
    /// Anything else the schema rejects
    Other,
}

impl Rule {
    pub fn as_str(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::Type => "type",
            Rule::Enum => "enum",
            Rule::Range => "range",
            Rule::Unique => "unique",
            Rule::AdditionalProperties => "additionalProperties",
            Rule::Other => "other",
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single schema violation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    /// Location in dot/bracket notation, e.g. `must[2].edition`
    pub path: String,
    pub rule: Rule,
    /// The offending value (`null` for a missing field)
    pub value: JsonValue,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Something legal but probably not what the author meant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

/// Result of validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn success() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.errors.is_empty() || !self.warnings.is_empty()
    }

    /// Errors that concern one field path
    pub fn errors_at<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.path == path)
    }
}

/// The schema itself could not be loaded
#[derive(Debug, Error, Diagnostic)]
pub enum SchemaError {
    #[error("schema '{0}' is not registered")]
    #[diagnostic(code(ouija::schema::missing))]
    Missing(String),

    #[error("schema '{name}' is not valid JSON: {message}")]
    #[diagnostic(code(ouija::schema::malformed))]
    Malformed { name: String, message: String },

    #[error("schema '{name}' failed to compile: {message}")]
    #[diagnostic(code(ouija::schema::compile))]
    Compile { name: String, message: String },
}

/// Validation failure rendered for a terminal
#[derive(Debug, Error, Diagnostic)]
#[error("Config failed validation: {summary}")]
#[diagnostic(
    code(ouija::schema::validation_error),
    help("The generated config is still printed above; fix the fields listed or re-run the prompt")
)]
pub struct InvalidConfig {
    summary: String,

    #[related]
    violations: Vec<Violation>,
}

/// One entry of an [`InvalidConfig`] report
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
pub struct Violation {
    message: String,

    #[help]
    help: Option<String>,
}

impl InvalidConfig {
    pub fn new(errors: &[ValidationError]) -> Self {
        let count = errors.len();
        let summary = if count == 1 {
            "1 error".to_string()
        } else {
            format!("{} errors", count)
        };
        let violations = errors
            .iter()
            .map(|e| Violation {
                message: e.message.clone(),
                help: e.help.clone(),
            })
            .collect();
        Self {
            summary,
            violations,
        }
    }

    /// Get the number of violations
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }
}

/// Config validator with the compiled search config schema
pub struct Validator {
    compiled: JsonValidator,
}

impl Validator {
    /// Compile the search config schema from the registry
    pub fn new(registry: &SchemaRegistry) -> Result<Self, SchemaError> {
        let content = registry
            .config_schema()
            .ok_or_else(|| SchemaError::Missing(CONFIG_SCHEMA.to_string()))?;

        let schema_json: JsonValue =
            serde_json::from_str(content).map_err(|e| SchemaError::Malformed {
                name: CONFIG_SCHEMA.to_string(),
                message: e.to_string(),
            })?;

        let compiled = validator_for(&schema_json).map_err(|e| SchemaError::Compile {
            name: CONFIG_SCHEMA.to_string(),
            message: e.to_string(),
        })?;

        Ok(Self { compiled })
    }

    /// Collect every violation in the config, plus advisory warnings
    pub fn validate(&self, config: &JsonValue) -> ValidationResult {
        let errors: Vec<ValidationError> = self
            .compiled
            .iter_errors(config)
            .flat_map(|e| to_validation_errors(config, &e))
            .collect();

        ValidationResult {
            valid: errors.is_empty(),
            errors,
            warnings: collect_warnings(config),
        }
    }

    /// Fast yes/no check without building error reports
    pub fn is_valid(&self, config: &JsonValue) -> bool {
        self.compiled.is_valid(config)
    }
}

/// Convert a JSON Schema error into our error format. Unknown-field errors
/// fan out into one entry per unexpected key.
fn to_validation_errors(document: &JsonValue, error: &JsonSchemaError) -> Vec<ValidationError> {
    let parent = display_path(document, error.instance_path.as_str());

    match &error.kind {
        ValidationErrorKind::Required { property } => {
            let prop_str = property
                .as_str()
                .map(|s| s.to_string())
                .unwrap_or_else(|| property.to_string());
            let path = child_path(&parent, &prop_str);
            vec![ValidationError {
                message: format!("Missing required field: {}", path),
                help: Some(format!("Add the '{}' field", prop_str)),
                path,
                rule: Rule::Required,
                value: JsonValue::Null,
            }]
        }
        ValidationErrorKind::AdditionalProperties { unexpected } => unexpected
            .iter()
            .map(|key| {
                let path = child_path(&parent, key);
                ValidationError {
                    message: format!("Unknown field: {}", path),
                    help: Some(format!("Remove the '{}' field or check spelling", key)),
                    value: error.instance.get(key).cloned().unwrap_or(JsonValue::Null),
                    path,
                    rule: Rule::AdditionalProperties,
                }
            })
            .collect(),
        _ => {
            let path = root_or(parent);
            vec![ValidationError {
                message: format_schema_error(&path, error),
                help: generate_help_message(error),
                rule: rule_for(&error.kind),
                value: error.instance.as_ref().clone(),
                path,
            }]
        }
    }
}

fn rule_for(kind: &ValidationErrorKind) -> Rule {
    match kind {
        ValidationErrorKind::Required { .. } => Rule::Required,
        ValidationErrorKind::Type { .. } => Rule::Type,
        ValidationErrorKind::Enum { .. } | ValidationErrorKind::Constant { .. } => Rule::Enum,
        ValidationErrorKind::Minimum { .. }
        | ValidationErrorKind::Maximum { .. }
        | ValidationErrorKind::ExclusiveMinimum { .. }
        | ValidationErrorKind::ExclusiveMaximum { .. } => Rule::Range,
        ValidationErrorKind::UniqueItems => Rule::Unique,
        ValidationErrorKind::AdditionalProperties { .. } => Rule::AdditionalProperties,
        _ => Rule::Other,
    }
}

/// Format a JSON Schema error into a user-friendly message
fn format_schema_error(path: &str, error: &JsonSchemaError) -> String {
    match &error.kind {
        ValidationErrorKind::Type { .. } => {
            format!("Wrong type at {}: {}", path, error)
        }
        ValidationErrorKind::Enum { options } => {
            format!(
                "Invalid value {} at {}: must be one of: {}",
                error.instance,
                path,
                format_enum_options(options)
            )
        }
        ValidationErrorKind::Minimum { limit } => {
            format!("Value at {} is too small: minimum {}", path, limit)
        }
        ValidationErrorKind::Maximum { limit } => {
            format!("Value at {} is too large: maximum {}", path, limit)
        }
        ValidationErrorKind::UniqueItems => {
            format!("Duplicate entries at {}: values must be unique", path)
        }
        _ => {
            format!("Validation error at {}: {}", path, error)
        }
    }
}

/// Format enum options as a string
fn format_enum_options(options: &JsonValue) -> String {
    if let Some(arr) = options.as_array() {
        arr.iter()
            .map(|v| v.as_str().map(|s| s.to_string()).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(", ")
    } else {
        options.to_string()
    }
}

/// Generate a help message with suggestions for fixing the error
fn generate_help_message(error: &JsonSchemaError) -> Option<String> {
    match &error.kind {
        ValidationErrorKind::Enum { options } => {
            Some(format!("Valid values: {}", format_enum_options(options)))
        }
        ValidationErrorKind::Minimum { limit } | ValidationErrorKind::Maximum { limit } => {
            Some(format!("Bounds are inclusive; {} is the limit", limit))
        }
        ValidationErrorKind::UniqueItems => Some("Remove the repeated entries".to_string()),
        ValidationErrorKind::Required { property } => {
            if property.as_str() == Some("clauses") {
                Some("And/Or constraints list their parts under 'clauses'".to_string())
            } else {
                None
            }
        }
        _ => None,
    }
}

/// Score only means something on `should` constraints
fn collect_warnings(config: &JsonValue) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    for list in [ConstraintList::Must, ConstraintList::MustNot] {
        let Some(items) = config.get(list.key()).and_then(|v| v.as_array()) else {
            continue;
        };
        for (i, item) in items.iter().enumerate() {
            if item.get("score").is_some() {
                warnings.push(ValidationWarning {
                    path: format!("{}[{}].score", list.key(), i),
                    message: format!(
                        "score has no effect in '{}'; only 'should' constraints are scored",
                        list.key()
                    ),
                });
            }
        }
    }

    warnings
}

/// Render a JSON pointer (`/must/2/edition`) in dot/bracket notation
/// (`must[2].edition`). Array indices are recognized by walking the document,
/// so numeric object keys stay keys.
pub fn display_path(document: &JsonValue, pointer: &str) -> String {
    let mut out = String::new();
    let mut current = Some(document);

    for raw in pointer.split('/').skip(1) {
        let segment = raw.replace("~1", "/").replace("~0", "~");

        let index = match current {
            Some(JsonValue::Array(_)) => segment.parse::<usize>().ok(),
            _ => None,
        };

        match index {
            Some(i) => {
                out.push_str(&format!("[{}]", i));
                current = current.and_then(|v| v.get(i));
            }
            None => {
                out = child_path(&out, &segment);
                current = current.and_then(|v| v.get(segment.as_str()));
            }
        }
    }

    out
}

fn child_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

fn root_or(path: String) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path
    }
}
