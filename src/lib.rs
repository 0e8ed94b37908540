//! Genetic programming of ordinal classification rules.
//!
//! One rule is evolved per class and the champions are assembled into
//! a first-match rule list:
//!
//! - **Data**: [`data`] holds labeled instances whose class is an ordinal
//!   index.
//! - **Rules**: [`rule`] defines the antecedent contract, [`Rule`](rule::Rule)
//!   and the [`RuleBase`](rule::RuleBase) classifier.
//! - **Evolution**: [`gp`] runs tournament selection, probability-filtered
//!   crossover and mutation, ordinal fitness evaluation and elitist
//!   truncation, one class at a time.
//! - **Representation**: [`tree`] provides boolean expression trees as a
//!   ready-made antecedent and genotype.
//! - **Statistics**: [`metrics`] scores a trained classifier (accuracy,
//!   AUC, kappa, OMAE, geometric mean).
//!
//! # Example
//!
//! ```ignore
//! use u_rulegp::gp::{EvolutionConfig, RuleGpRunner};
//! use u_rulegp::metrics::ClassificationReport;
//! use u_rulegp::tree::TreeSpecies;
//!
//! let species = TreeSpecies::new(train.metadata().clone(), 4)?;
//! let config = EvolutionConfig::default().with_seed(42);
//! let result = RuleGpRunner::new(&species, &train, config)?.run()?;
//!
//! let report = ClassificationReport::evaluate(&result.classifier, &test)?;
//! println!("{report}");
//! ```

pub mod data;
pub mod error;
pub mod gp;
pub mod metrics;
pub mod rule;
pub mod tree;

pub use error::{Result, RuleGpError};
