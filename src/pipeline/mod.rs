//! Model output -> validated search config
//!
//! ```text
//! Received -> Recovered -> Normalized -> Enforced -> Validated -> Succeeded
//!          \-> Failed(RecoveryError)
//! ```
//!
//! Only recovery can fail. Every later stage always produces a config and
//! defers problems to the error list, so the caller sees what was generated
//! alongside everything wrong with it.

pub mod enforcer;
pub mod normalizer;
pub mod recovery;

use serde::Serialize;
use serde_json::Value;
use std::fmt;
use tracing::{debug, warn};

use crate::core::model::SearchConfig;
use crate::schema::registry::SchemaRegistry;
use crate::schema::validator::{
    SchemaError, ValidationError, ValidationResult, ValidationWarning, Validator,
};

pub use enforcer::{enforce, StakeUpgrade};
pub use normalizer::normalize;
pub use recovery::{recover, RecoveryError};

/// Where a pipeline run is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Received,
    Recovered,
    Normalized,
    Enforced,
    Validated,
    Succeeded,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Received => "received",
            Stage::Recovered => "recovered",
            Stage::Normalized => "normalized",
            Stage::Enforced => "enforced",
            Stage::Validated => "validated",
            Stage::Succeeded => "succeeded",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// A config that made it through recovery, with everything wrong with it
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub config: Value,
    pub valid: bool,
    /// `None` when valid, otherwise every violation found
    pub errors: Option<Vec<ValidationError>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ValidationWarning>,
    #[serde(skip)]
    pub upgrades: Vec<StakeUpgrade>,
}

impl GenerationReport {
    fn new(config: Value, validation: ValidationResult, upgrades: Vec<StakeUpgrade>) -> Self {
        let ValidationResult {
            valid,
            errors,
            warnings,
        } = validation;
        Self {
            config,
            valid,
            errors: if valid { None } else { Some(errors) },
            warnings,
            upgrades,
        }
    }

    /// Violations, empty when valid
    pub fn error_list(&self) -> &[ValidationError] {
        self.errors.as_deref().unwrap_or_default()
    }

    /// Typed config, only for valid reports
    pub fn search_config(&self) -> Option<SearchConfig> {
        if !self.valid {
            return None;
        }
        SearchConfig::from_value(&self.config).ok()
    }
}

/// Recovery failed; the raw text goes back for debugging
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FailureReport {
    pub error: String,
    pub raw_response: String,
}

impl From<&RecoveryError> for FailureReport {
    fn from(err: &RecoveryError) -> Self {
        Self {
            error: err.to_string(),
            raw_response: err.raw().to_string(),
        }
    }
}

/// What the boundary hands back: always one of these two shapes
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Response {
    Generated(GenerationReport),
    Failed(FailureReport),
}

impl Response {
    pub fn is_valid(&self) -> bool {
        matches!(self, Response::Generated(report) if report.valid)
    }
}

/// The recovery / normalization / enforcement / validation pipeline.
///
/// Holds only the compiled schema, which is read-only, so one pipeline can
/// serve any number of threads.
pub struct Pipeline {
    validator: Validator,
}

impl Pipeline {
    /// Pipeline over the embedded schema
    pub fn new() -> Result<Self, SchemaError> {
        Self::with_registry(&SchemaRegistry::default())
    }

    /// Pipeline over the config schema of a given registry
    pub fn with_registry(registry: &SchemaRegistry) -> Result<Self, SchemaError> {
        Ok(Self {
            validator: Validator::new(registry)?,
        })
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    /// Run every stage over raw model output
    pub fn run(&self, raw: &str) -> Result<GenerationReport, RecoveryError> {
        debug!(stage = %Stage::Received, bytes = raw.len());

        let mut config = match recover(raw) {
            Ok(config) => config,
            Err(e) => {
                warn!(stage = %Stage::Failed, error = %e, "could not recover JSON from model output");
                return Err(e);
            }
        };
        debug!(stage = %Stage::Recovered);

        normalize(&mut config);
        debug!(stage = %Stage::Normalized);

        let upgrades = enforce(&mut config);
        debug!(stage = %Stage::Enforced, upgrades = upgrades.len());

        let validation = self.validator.validate(&config);
        debug!(
            stage = %Stage::Validated,
            valid = validation.valid,
            errors = validation.errors.len(),
            warnings = validation.warnings.len()
        );

        let report = GenerationReport::new(config, validation, upgrades);
        debug!(stage = %Stage::Succeeded);
        Ok(report)
    }

    /// Run the pipeline and fold the outcome into the boundary shape
    pub fn respond(&self, raw: &str) -> Response {
        match self.run(raw) {
            Ok(report) => Response::Generated(report),
            Err(e) => Response::Failed(FailureReport::from(&e)),
        }
    }
}
