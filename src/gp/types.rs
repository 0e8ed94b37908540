//! Core trait definitions for the rule evolution engine.
//!
//! [`Genotype`] and [`RuleSpecies`] define the contract between the
//! generic engine and a concrete rule representation. [`Individual`]
//! ties a genotype to its decoded [`Rule`] and its fitness.

use crate::error::Result;
use crate::rule::{Antecedent, Rule};
use rand::Rng;

/// Raw encoding of a rule antecedent (for example a syntax tree).
pub trait Genotype: Clone + std::fmt::Debug + Send + Sync {
    /// The antecedent this genotype decodes into.
    type Antecedent: Antecedent;

    /// Decodes the genotype into its antecedent.
    fn decode(&self) -> Result<Self::Antecedent>;

    /// Structural size of the genotype (derivation size).
    fn size(&self) -> usize;
}

/// A candidate rule: genotype, decoded rule and fitness.
///
/// Cloning produces a fully independent copy, genotype, rule and
/// fitness included.
#[derive(Debug, Clone)]
pub struct Individual<G: Genotype> {
    genotype: G,
    rule: Rule<G::Antecedent>,
    fitness: Option<f64>,
}

impl<G: Genotype> Individual<G> {
    /// Decodes `genotype` into a new, unevaluated individual.
    ///
    /// The consequent starts at class 0; the engine assigns the target
    /// class when the rule is promoted.
    pub fn new(genotype: G) -> Result<Self> {
        let antecedent = genotype.decode()?;
        Ok(Self {
            genotype,
            rule: Rule::new(antecedent, 0),
            fitness: None,
        })
    }

    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    /// The decoded phenotype.
    pub fn rule(&self) -> &Rule<G::Antecedent> {
        &self.rule
    }

    pub fn rule_mut(&mut self) -> &mut Rule<G::Antecedent> {
        &mut self.rule
    }

    /// Fitness, or `None` if not evaluated yet.
    pub fn fitness(&self) -> Option<f64> {
        self.fitness
    }

    /// Fitness for comparisons: unevaluated individuals count as worst.
    pub fn fitness_or_worst(&self) -> f64 {
        self.fitness.unwrap_or(f64::INFINITY)
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = Some(fitness);
    }

    /// Consumes the individual, returning its rule.
    pub fn into_rule(self) -> Rule<G::Antecedent> {
        self.rule
    }
}

/// A rule representation plus its genetic primitives.
///
/// This plays the role of the individual provider and of the base
/// crossover / mutation operators. The probability filtering around
/// the primitives lives in [`Recombinator`](super::Recombinator) and
/// [`Mutator`](super::Mutator).
///
/// # Thread Safety
///
/// `RuleSpecies` must be `Send + Sync` so a species can be shared with
/// parallel evaluation.
pub trait RuleSpecies: Send + Sync {
    /// The genotype produced and manipulated by this species.
    type Genotype: Genotype;

    /// Creates a random genotype for a fresh population.
    fn create_genotype<R: Rng>(&self, rng: &mut R) -> Result<Self::Genotype>;

    /// Recombines two parents into two children.
    fn crossover<R: Rng>(
        &self,
        parent1: &Self::Genotype,
        parent2: &Self::Genotype,
        rng: &mut R,
    ) -> (Self::Genotype, Self::Genotype);

    /// Returns a mutated copy of `genotype`.
    fn mutate<R: Rng>(&self, genotype: &Self::Genotype, rng: &mut R) -> Self::Genotype;

    /// Creates and decodes `size` individuals.
    ///
    /// Any provider or decode failure aborts the whole population.
    fn create_population<R: Rng>(
        &self,
        size: usize,
        rng: &mut R,
    ) -> Result<Vec<Individual<Self::Genotype>>> {
        (0..size)
            .map(|_| self.create_genotype(rng).and_then(Individual::new))
            .collect()
    }
}
