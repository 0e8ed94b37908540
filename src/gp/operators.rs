//! Probability-filtered recombination and mutation.
//!
//! Both operators take their input population by value and split it
//! into two disjoint parts:
//!
//! - `operated`: new individuals produced by the base operator
//! - `sterile`: inputs the operator left untouched this round
//!
//! Every input ends up in exactly one part, so
//! `operated.len() + sterile.len() == input.len()`.

use super::types::{Individual, RuleSpecies};
use crate::error::Result;
use rand::Rng;

/// Output of a filtered operator.
#[derive(Debug, Clone)]
pub struct Bred<I> {
    /// Freshly produced, unevaluated individuals.
    pub operated: Vec<I>,

    /// Inputs passed through unchanged, fitness included.
    pub sterile: Vec<I>,
}

impl<I> Bred<I> {
    /// Total number of individuals in both parts.
    pub fn len(&self) -> usize {
        self.operated.len() + self.sterile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operated.is_empty() && self.sterile.is_empty()
    }

    /// Joins both parts, operated first.
    pub fn into_population(mut self) -> Vec<I> {
        self.operated.append(&mut self.sterile);
        self.operated
    }
}

/// Pairwise crossover applied with probability `rec_prob`.
///
/// Parents are paired in order: `(0, 1)`, `(2, 3)`, ... Each pair is
/// recombined with probability `rec_prob`, producing two children;
/// otherwise both parents go to `sterile`. With an odd count the last
/// parent has no partner and is always sterile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Recombinator {
    rec_prob: f64,
}

impl Recombinator {
    /// Creates a recombinator; the probability is clamped to `[0, 1]`.
    pub fn new(rec_prob: f64) -> Self {
        Self {
            rec_prob: rec_prob.clamp(0.0, 1.0),
        }
    }

    pub fn rec_prob(&self) -> f64 {
        self.rec_prob
    }

    /// Recombines `parents`.
    ///
    /// # Errors
    /// Fails if a child genotype cannot be decoded.
    pub fn recombine<S: RuleSpecies, R: Rng>(
        &self,
        species: &S,
        parents: Vec<Individual<S::Genotype>>,
        rng: &mut R,
    ) -> Result<Bred<Individual<S::Genotype>>> {
        let mut bred = Bred {
            operated: Vec::with_capacity(parents.len()),
            sterile: Vec::new(),
        };

        let mut iter = parents.into_iter();
        while let Some(first) = iter.next() {
            let Some(second) = iter.next() else {
                bred.sterile.push(first);
                break;
            };

            if rng.random_bool(self.rec_prob) {
                let (c1, c2) = species.crossover(first.genotype(), second.genotype(), rng);
                bred.operated.push(Individual::new(c1)?);
                bred.operated.push(Individual::new(c2)?);
            } else {
                bred.sterile.push(first);
                bred.sterile.push(second);
            }
        }

        Ok(bred)
    }
}

/// Per-individual mutation applied with probability `mut_prob`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mutator {
    mut_prob: f64,
}

impl Mutator {
    /// Creates a mutator; the probability is clamped to `[0, 1]`.
    pub fn new(mut_prob: f64) -> Self {
        Self {
            mut_prob: mut_prob.clamp(0.0, 1.0),
        }
    }

    pub fn mut_prob(&self) -> f64 {
        self.mut_prob
    }

    /// Mutates each individual independently with probability `mut_prob`.
    ///
    /// # Errors
    /// Fails if a mutated genotype cannot be decoded.
    pub fn mutate<S: RuleSpecies, R: Rng>(
        &self,
        species: &S,
        population: Vec<Individual<S::Genotype>>,
        rng: &mut R,
    ) -> Result<Bred<Individual<S::Genotype>>> {
        let mut bred = Bred {
            operated: Vec::new(),
            sterile: Vec::new(),
        };

        for ind in population {
            if rng.random_bool(self.mut_prob) {
                let mutant = species.mutate(ind.genotype(), rng);
                bred.operated.push(Individual::new(mutant)?);
            } else {
                bred.sterile.push(ind);
            }
        }

        Ok(bred)
    }
}
