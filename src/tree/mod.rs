//! Syntax-tree rule antecedents.
//!
//! [`Expr`] is a boolean expression over instance attributes that works
//! both as a rule [`Antecedent`](crate::rule::Antecedent) and as its own
//! [`Genotype`](crate::gp::Genotype). [`TreeSpecies`] creates and varies
//! such trees under a depth limit.
//!
//! ```ignore
//! let species = TreeSpecies::new(dataset.metadata().clone(), 4)?;
//! let tree = species.create_genotype(&mut rng)?;
//! println!("{}", tree.render(dataset.metadata()));
//! ```

mod expr;
mod species;

pub use expr::{Comparison, Expr};
pub use species::TreeSpecies;
