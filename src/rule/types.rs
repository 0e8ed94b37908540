//! The antecedent contract and the [`Rule`] type.

use crate::data::{Instance, Metadata};
use std::fmt::Debug;

/// The condition part of a classification rule.
///
/// The evolution engine never inspects an antecedent's structure. It
/// only asks whether it fires on an instance and how large it is.
///
/// # Implementing
///
/// ```ignore
/// #[derive(Debug, Clone)]
/// struct Above { attribute: usize, threshold: f64 }
///
/// impl Antecedent for Above {
///     fn covers(&self, instance: &Instance) -> bool {
///         instance.value(self.attribute) > self.threshold
///     }
///     fn size(&self) -> usize { 1 }
/// }
/// ```
pub trait Antecedent: Clone + Debug + Send + Sync {
    /// Returns `true` if the antecedent holds for `instance`.
    fn covers(&self, instance: &Instance) -> bool;

    /// Number of nodes in the antecedent.
    fn size(&self) -> usize;

    /// Human-readable form using attribute names from `metadata`.
    ///
    /// The default implementation uses the `Debug` representation.
    fn render(&self, _metadata: &Metadata) -> String {
        format!("{self:?}")
    }
}

/// An antecedent paired with the class it predicts.
#[derive(Debug, Clone, PartialEq)]
pub struct Rule<A> {
    antecedent: A,
    consequent: usize,
    fitness: f64,
}

impl<A: Antecedent> Rule<A> {
    /// Creates a rule with unmeasured (worst) fitness.
    pub fn new(antecedent: A, consequent: usize) -> Self {
        Self {
            antecedent,
            consequent,
            fitness: f64::INFINITY,
        }
    }

    /// Returns `true` if the antecedent fires on `instance`.
    pub fn covers(&self, instance: &Instance) -> bool {
        self.antecedent.covers(instance)
    }

    pub fn antecedent(&self) -> &A {
        &self.antecedent
    }

    /// Predicted class label.
    pub fn consequent(&self) -> usize {
        self.consequent
    }

    pub fn set_consequent(&mut self, class: usize) {
        self.consequent = class;
    }

    /// Fitness of the individual this rule was promoted from.
    /// `+inf` until set.
    pub fn fitness(&self) -> f64 {
        self.fitness
    }

    pub fn set_fitness(&mut self, fitness: f64) {
        self.fitness = fitness;
    }

    /// Renders `IF <antecedent> THEN (<class> = <label>)`.
    pub fn render(&self, metadata: &Metadata) -> String {
        let class_attr = metadata.class_attribute();
        format!(
            "IF {} THEN ({} = {})",
            self.antecedent.render(metadata),
            class_attr.name(),
            class_attr.show(self.consequent as f64)
        )
    }
}
