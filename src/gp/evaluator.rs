//! Fitness evaluation of candidate rules.
//!
//! Evaluation is one-vs-rest: a rule is scored for a single target class
//! against every instance of the training set. One pass over the data
//! collects a [`RuleOutcome`]; a [`FitnessFunction`] turns the outcome
//! into a scalar to **minimize**.
//!
//! Scoring functions:
//!
//! - [`OrdinalMae`]: ordinal mean absolute error over covered instances
//!   (the active scorer)
//! - [`FailsComplexity`]: failure count plus a size penalty

use super::types::{Genotype, Individual};
use crate::data::Dataset;
use crate::error::{Result, RuleGpError};
use crate::rule::Antecedent;
use std::str::FromStr;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Coverage counts of one rule for one target class.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RuleOutcome {
    /// Covered instances of the target class.
    pub true_positives: usize,

    /// Covered instances of another class.
    pub false_positives: usize,

    /// Uncovered instances of the target class.
    pub false_negatives: usize,

    /// Uncovered instances of another class.
    pub true_negatives: usize,

    /// Sum of `|target - actual|` over false positives.
    pub false_positive_distance: f64,

    /// Size of the genotype the rule was decoded from.
    pub genotype_size: usize,

    /// Size of the rule antecedent.
    pub antecedent_size: usize,
}

impl RuleOutcome {
    /// Instances the rule fires on.
    pub fn covered(&self) -> usize {
        self.true_positives + self.false_positives
    }

    /// Misclassified instances (false positives + false negatives).
    pub fn fails(&self) -> usize {
        self.false_positives + self.false_negatives
    }
}

/// Scoring strategy: maps a [`RuleOutcome`] to a fitness (lower is better).
pub trait FitnessFunction: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Computes the fitness of `outcome`.
    fn score(&self, outcome: &RuleOutcome) -> f64;
}

/// Ordinal mean absolute error of a rule.
///
/// A covered instance adds its distance to the target class (zero for a
/// hit). A missed instance of the target class adds
/// `num_classes - |target - actual|`, which is always `num_classes`
/// since its distance is zero. The sum is divided by the number of
/// covered instances; a rule that covers nothing scores `+inf`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrdinalMae {
    /// Length of the ordinal scale.
    pub num_classes: usize,
}

impl FitnessFunction for OrdinalMae {
    fn name(&self) -> &str {
        "ordinal-mae"
    }

    fn score(&self, outcome: &RuleOutcome) -> f64 {
        let covered = outcome.covered();
        if covered == 0 {
            return f64::INFINITY;
        }
        let missed = outcome.false_negatives as f64 * self.num_classes as f64;
        (outcome.false_positive_distance + missed) / covered as f64
    }
}

/// `2 * fails + alpha * (genotype size + antecedent size)`.
///
/// Favors short rules with few absolute errors. Ignores class balance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FailsComplexity {
    /// Weight of the size penalty.
    pub alpha: f64,
}

impl FitnessFunction for FailsComplexity {
    fn name(&self) -> &str {
        "fails-complexity"
    }

    fn score(&self, outcome: &RuleOutcome) -> f64 {
        let size = (outcome.genotype_size + outcome.antecedent_size) as f64;
        2.0 * outcome.fails() as f64 + self.alpha * size
    }
}

/// Configuration tag for the scoring function.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FitnessKind {
    /// [`OrdinalMae`] over the configured ordinal scale.
    #[default]
    OrdinalMae,

    /// [`FailsComplexity`] with the configured `alpha`.
    FailsComplexity,
}

impl FromStr for FitnessKind {
    type Err = RuleGpError;

    fn from_str(tag: &str) -> Result<Self> {
        match tag.trim().to_ascii_lowercase().as_str() {
            "ordinal-mae" | "omae" => Ok(FitnessKind::OrdinalMae),
            "fails-complexity" => Ok(FitnessKind::FailsComplexity),
            _ => Err(RuleGpError::UnknownOperator {
                kind: "fitness function",
                tag: tag.to_string(),
            }),
        }
    }
}

impl FitnessKind {
    /// Builds the scoring function.
    pub fn build(self, num_classes: usize, alpha: f64) -> Box<dyn FitnessFunction> {
        match self {
            FitnessKind::OrdinalMae => Box::new(OrdinalMae { num_classes }),
            FitnessKind::FailsComplexity => Box::new(FailsComplexity { alpha }),
        }
    }
}

/// Scores individuals for one target class against a shared dataset.
pub struct Evaluator<'a> {
    dataset: &'a Dataset,
    target_class: usize,
    fitness: Box<dyn FitnessFunction>,
    parallel: bool,
}

impl std::fmt::Debug for Evaluator<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Evaluator")
            .field("dataset", &self.dataset.name())
            .field("target_class", &self.target_class)
            .field("fitness", &self.fitness.name())
            .field("parallel", &self.parallel)
            .finish()
    }
}

impl<'a> Evaluator<'a> {
    /// Creates an evaluator targeting class 0.
    pub fn new(dataset: &'a Dataset, fitness: Box<dyn FitnessFunction>) -> Self {
        Self {
            dataset,
            target_class: 0,
            fitness,
            parallel: false,
        }
    }

    /// Enables parallel evaluation (only effective with the `parallel` feature).
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn target_class(&self) -> usize {
        self.target_class
    }

    /// Changes the class subsequent evaluations score against.
    pub fn set_target_class(&mut self, class: usize) {
        self.target_class = class;
    }

    /// Name of the active scoring function.
    pub fn fitness_name(&self) -> &str {
        self.fitness.name()
    }

    /// Collects the coverage counts of `individual`'s rule.
    pub fn outcome<G: Genotype>(&self, individual: &Individual<G>) -> RuleOutcome {
        let rule = individual.rule();
        let target = self.target_class;
        let mut outcome = RuleOutcome {
            genotype_size: individual.genotype().size(),
            antecedent_size: rule.antecedent().size(),
            ..RuleOutcome::default()
        };

        for instance in self.dataset.instances() {
            let actual = self.dataset.class_of(instance);
            match (rule.covers(instance), actual == target) {
                (true, true) => outcome.true_positives += 1,
                (true, false) => {
                    outcome.false_positives += 1;
                    outcome.false_positive_distance += target.abs_diff(actual) as f64;
                }
                (false, true) => outcome.false_negatives += 1,
                (false, false) => outcome.true_negatives += 1,
            }
        }

        outcome
    }

    /// Fitness of `individual` for the current target class.
    pub fn fitness_of<G: Genotype>(&self, individual: &Individual<G>) -> f64 {
        self.fitness.score(&self.outcome(individual))
    }

    /// Evaluates every individual in place.
    ///
    /// Each individual's fitness is written by exactly one task, and the
    /// call returns only after all of them are written.
    pub fn evaluate<G: Genotype>(&self, population: &mut [Individual<G>]) {
        #[cfg(feature = "parallel")]
        if self.parallel {
            population.par_iter_mut().for_each(|ind| {
                let f = self.fitness_of(ind);
                ind.set_fitness(f);
            });
            return;
        }

        for ind in population.iter_mut() {
            let f = self.fitness_of(ind);
            ind.set_fitness(f);
        }
    }
}
