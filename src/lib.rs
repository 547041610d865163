//! Ouija Genie: model output to Balatro seed-search configs
//!
//! A language model is asked for a search config and answers with something
//! that is usually, but not always, the JSON we wanted. The [`pipeline`]
//! recovers the JSON, repairs common naming slips, enforces game rules the
//! schema cannot express, and reports every remaining problem.

pub mod cli;
pub mod core;
pub mod inference;
pub mod pipeline;
pub mod schema;
