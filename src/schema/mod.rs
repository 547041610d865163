//! Schema system - the embedded config schema and validation against it

pub mod registry;
pub mod validator;

pub use registry::SchemaRegistry;
pub use validator::{
    InvalidConfig, Rule, SchemaError, ValidationError, ValidationResult, ValidationWarning,
    Validator,
};
