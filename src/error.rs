//! Error types for u-rulegp.
//!
//! Every fallible setup step (configuration, dataset assembly, population
//! creation, phenotype decoding) reports through [`RuleGpError`]. Fitness
//! evaluation itself never fails: a rule that covers nothing scores
//! `+inf` instead.

use thiserror::Error;

/// Error type for the whole crate.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RuleGpError {
    /// A configuration parameter is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A configuration tag names no known operator variant.
    #[error("Unknown {kind} '{tag}'")]
    UnknownOperator { kind: &'static str, tag: String },

    /// The dataset or its metadata is inconsistent.
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// A genotype could not be decoded into a rule.
    #[error("Decode failed: {0}")]
    Decode(String),

    /// The individual provider could not create a genotype.
    #[error("Provider failed: {0}")]
    Provider(String),

    /// Evolution of a class started without any candidate.
    #[error("Empty population for class {class}")]
    EmptyPopulation { class: usize },
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RuleGpError>;
