//! Core module - domain types and configuration

pub mod config;
pub mod model;

pub use config::{Config, ConfigError, InferenceConfig};
pub use model::{
    Constraint, ConstraintList, ConstraintType, Deck, Edition, ModelParseError, SearchConfig,
    Sources, Stake, Sticker, DEFAULT_AUTHOR,
};
