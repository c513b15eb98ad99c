//! repcheck - Report Line Validation Library
//!
//! This library provides the core functionality for the repcheck CLI
//! tool: extracting task records from chat-style report lines and
//! reconciling them against an authoritative task tracker.
//!
//! # Pipeline
//!
//! Raw text goes through [`block::parse_block`], which matches each line
//! with the strict grammar ([`grammar`]) and falls back to heuristic
//! recovery ([`recovery`]). Matched records are reconciled one by one in
//! [`report::run_pipeline`]: a blocking lookup against the task tracker
//! ([`source`]) followed by the full cross-field check ([`validate`]).
//! A lookup failure is contained to its record; the batch always runs to
//! completion.
//!
//! # Module Organization
//!
//! - `cli`: Command-line interface using clap
//! - `config`: Configuration loading from `.repcheck.toml`
//! - `error`: Error types and result aliases
//! - `record`: Parsed line records and task id derivation
//! - `grammar`: Strict report-line grammar scanner
//! - `recovery`: Heuristic re-extraction for malformed lines
//! - `block`: Multi-line block parsing
//! - `duration`: ISO-8601-style duration to decimal hours
//! - `week`: Reference week computation
//! - `source`: Authoritative task source (HTTP and in-memory)
//! - `validate`: Cross-field reconciliation checks
//! - `report`: Sequential pipeline, run summary, export rows
//! - `output`: Shared JSON/human output formatting

pub mod block;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod grammar;
pub mod output;
pub mod record;
pub mod recovery;
pub mod report;
pub mod source;
pub mod validate;
pub mod week;

pub use error::{Error, Result};
