//! Per-class genetic programming of classification rules.
//!
//! One population is evolved per class. Each individual encodes a rule
//! antecedent; its fitness measures how well that antecedent isolates
//! the target class (lower is better). After the last generation of a
//! class, the best rule is inserted into a [`RuleBase`](crate::rule::RuleBase)
//! by fitness, producing a best-first rule list.
//!
//! # Components
//!
//! - [`RuleSpecies`]: individual provider plus base crossover and mutation
//! - [`Selection`]: parent selection (tournament, rank)
//! - [`Recombinator`] / [`Mutator`]: probability-filtered operators
//! - [`Evaluator`]: confusion counts and fitness against the target class
//! - [`RuleGpRunner`]: the state-machine controller
//! - [`EvolutionListener`]: progress notifications
//!
//! # Example
//!
//! ```ignore
//! use u_rulegp::gp::{EvolutionConfig, RuleGpRunner};
//! use u_rulegp::tree::TreeSpecies;
//!
//! let species = TreeSpecies::new(dataset.metadata().clone(), 4)?;
//! let config = EvolutionConfig::default()
//!     .with_population_size(200)
//!     .with_max_generations(50)
//!     .with_seed(7);
//!
//! let result = RuleGpRunner::new(&species, &dataset, config)?.run()?;
//! println!("{}", result.classifier.render(dataset.metadata()));
//! ```
//!
//! # References
//!
//! - Koza (1992), *Genetic Programming*
//! - Freitas (2002), *Data Mining and Knowledge Discovery with
//!   Evolutionary Algorithms*

mod config;
mod evaluator;
mod listener;
mod operators;
mod runner;
mod selection;
mod types;

pub use config::{EvolutionConfig, EvolutionSettings};
pub use evaluator::{Evaluator, FailsComplexity, FitnessFunction, FitnessKind, OrdinalMae, RuleOutcome};
pub use listener::{EvolutionEvent, EvolutionListener, LoggingListener};
pub use operators::{Bred, Mutator, Recombinator};
pub use runner::{AntecedentOf, EvolutionState, RuleGpResult, RuleGpRunner};
pub use selection::{betters, compare, Selection};
pub use types::{Genotype, Individual, RuleSpecies};
