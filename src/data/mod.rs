//! Labeled datasets.
//!
//! A [`Dataset`] is an ordered sequence of [`Instance`]s described by
//! [`Metadata`]. The class is an ordinal label: an index into the values
//! of the categorical class attribute, where the distance between two
//! indices is meaningful.
//!
//! Reading datasets from disk is left to the caller.

mod dataset;
mod metadata;

pub use dataset::{Dataset, Instance};
pub use metadata::{Attribute, Metadata};
