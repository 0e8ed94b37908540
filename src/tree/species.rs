//! Random construction and variation of expression trees.

use super::expr::{Comparison, Expr};
use crate::data::{Attribute, Metadata};
use crate::error::{Result, RuleGpError};
use crate::gp::RuleSpecies;
use rand::Rng;

/// Chance that `grow` stops early with a leaf.
const LEAF_PROB: f64 = 0.3;

/// Chance that mutation of a leaf only redraws its constant.
const CONSTANT_MUTATION_PROB: f64 = 0.5;

/// Expression-tree species over the input attributes of a dataset.
///
/// - Creation: grow method, depth at most `max_depth`.
/// - Crossover: swaps one random subtree of each parent; if either child
///   would exceed `max_depth` both parents are returned unchanged.
/// - Mutation: picks a random node and either redraws its constant
///   (leaves only) or replaces it with a freshly grown subtree that fits
///   the remaining depth.
#[derive(Debug, Clone)]
pub struct TreeSpecies {
    metadata: Metadata,
    inputs: Vec<usize>,
    max_depth: usize,
}

impl TreeSpecies {
    /// # Errors
    /// Fails if `max_depth` is zero, the metadata has no input
    /// attributes, a categorical input has no values, or a numeric input
    /// has an infinite or NaN bound.
    pub fn new(metadata: Metadata, max_depth: usize) -> Result<Self> {
        if max_depth == 0 {
            return Err(RuleGpError::InvalidConfig("max_depth must be >= 1".into()));
        }

        let inputs = metadata.input_attributes();
        if inputs.is_empty() {
            return Err(RuleGpError::InvalidDataset(
                "no input attributes to build conditions on".into(),
            ));
        }
        for &i in &inputs {
            match metadata.attribute(i) {
                Some(Attribute::Categorical { name, values }) if values.is_empty() => {
                    return Err(RuleGpError::InvalidDataset(format!(
                        "categorical attribute '{name}' has no values"
                    )));
                }
                Some(Attribute::Numeric { name, min, max }) if !min.is_finite() || !max.is_finite() => {
                    return Err(RuleGpError::InvalidDataset(format!(
                        "numeric attribute '{name}' needs finite bounds, got [{min}, {max}]"
                    )));
                }
                _ => {}
            }
        }

        Ok(Self {
            metadata,
            inputs,
            max_depth,
        })
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Grows a random tree no deeper than `depth`.
    pub fn grow<R: Rng>(&self, depth: usize, rng: &mut R) -> Expr {
        if depth <= 1 || rng.random_bool(LEAF_PROB) {
            return self.random_condition(rng);
        }
        match rng.random_range(0..3) {
            0 => Expr::and(self.grow(depth - 1, rng), self.grow(depth - 1, rng)),
            1 => Expr::or(self.grow(depth - 1, rng), self.grow(depth - 1, rng)),
            _ => Expr::not(self.grow(depth - 1, rng)),
        }
    }

    fn random_condition<R: Rng>(&self, rng: &mut R) -> Expr {
        let attribute = self.inputs[rng.random_range(0..self.inputs.len())];
        let op = match self.metadata.attribute(attribute) {
            Some(Attribute::Categorical { .. }) => {
                Comparison::CATEGORICAL[rng.random_range(0..Comparison::CATEGORICAL.len())]
            }
            _ => Comparison::NUMERIC[rng.random_range(0..Comparison::NUMERIC.len())],
        };
        Expr::condition(attribute, op, self.random_value(attribute, rng))
    }

    fn random_value<R: Rng>(&self, attribute: usize, rng: &mut R) -> f64 {
        match self.metadata.attribute(attribute) {
            Some(Attribute::Numeric { min, max, .. }) => rng.random_range(*min..=*max),
            Some(Attribute::Categorical { values, .. }) => rng.random_range(0..values.len()) as f64,
            None => 0.0,
        }
    }
}

impl RuleSpecies for TreeSpecies {
    type Genotype = Expr;

    fn create_genotype<R: Rng>(&self, rng: &mut R) -> Result<Expr> {
        Ok(self.grow(self.max_depth, rng))
    }

    fn crossover<R: Rng>(&self, parent1: &Expr, parent2: &Expr, rng: &mut R) -> (Expr, Expr) {
        let i = rng.random_range(0..parent1.node_count());
        let j = rng.random_range(0..parent2.node_count());

        let (Some(s1), Some(s2)) = (parent1.subtree(i), parent2.subtree(j)) else {
            return (parent1.clone(), parent2.clone());
        };

        let child1 = parent1.with_subtree(i, s2.clone());
        let child2 = parent2.with_subtree(j, s1.clone());
        if child1.depth() > self.max_depth || child2.depth() > self.max_depth {
            return (parent1.clone(), parent2.clone());
        }
        (child1, child2)
    }

    fn mutate<R: Rng>(&self, genotype: &Expr, rng: &mut R) -> Expr {
        let mut child = genotype.clone();
        let index = rng.random_range(0..child.node_count());
        let level = child.level_of(index).unwrap_or(1);
        let room = (self.max_depth + 1).saturating_sub(level).max(1);

        if let Some(node) = child.subtree_mut(index) {
            let tweak = matches!(node, Expr::Condition { .. }) && rng.random_bool(CONSTANT_MUTATION_PROB);
            if tweak {
                if let Expr::Condition {
                    attribute, value, ..
                } = node
                {
                    *value = self.random_value(*attribute, rng);
                }
            } else {
                *node = self.grow(room, rng);
            }
        }
        child
    }
}
