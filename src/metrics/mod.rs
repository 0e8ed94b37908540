//! Quality statistics for a trained rule-list classifier.
//!
//! Everything is derived from a [`ConfusionMatrix`] (rows = actual
//! class, columns = predicted class). Degenerate matrices never yield
//! NaN: empty classes and zero denominators fall back to fixed values.

mod confusion;

pub use confusion::{ClassificationReport, ConfusionMatrix};
