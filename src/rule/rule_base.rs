//! Ordered rule-list classifier.

use super::types::{Antecedent, Rule};
use crate::data::{Dataset, Instance, Metadata};
use crate::gp::compare;
use std::cmp::Ordering;

/// A first-match rule cascade with a default class.
///
/// Rules are tried in stored order and the first rule that covers an
/// instance decides its class. Order matters: an earlier rule shadows
/// every later rule on the instances they both cover.
///
/// # Examples
///
/// ```ignore
/// let mut rules = RuleBase::new(0);
/// rules.insert_by_fitness(champion);
/// let predicted = rules.classify(&instance);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RuleBase<A> {
    rules: Vec<Rule<A>>,
    default_class: usize,
}

impl<A: Antecedent> RuleBase<A> {
    /// Creates an empty rule base.
    pub fn new(default_class: usize) -> Self {
        Self {
            rules: Vec::new(),
            default_class,
        }
    }

    /// Creates a rule base from an already ordered rule list.
    pub fn from_rules(rules: Vec<Rule<A>>, default_class: usize) -> Self {
        Self {
            rules,
            default_class,
        }
    }

    /// Class of the first rule covering `instance`, or the default class.
    pub fn classify(&self, instance: &Instance) -> usize {
        self.rules
            .iter()
            .find(|rule| rule.covers(instance))
            .map_or(self.default_class, Rule::consequent)
    }

    /// Classifies every instance of `dataset` independently.
    pub fn classify_all(&self, dataset: &Dataset) -> Vec<usize> {
        dataset
            .instances()
            .iter()
            .map(|instance| self.classify(instance))
            .collect()
    }

    /// Inserts `rule` by fitness.
    ///
    /// The rule goes immediately before the first stored rule that is not
    /// strictly better than it, or at the end if every stored rule is
    /// strictly better. With the minimization comparator this keeps the
    /// list ordered best-first, and a newcomer lands before any earlier
    /// rule of equal fitness.
    ///
    /// Equal fitness therefore does not preserve arrival order: inserting
    /// A and then B with the same fitness yields `[B, A]`, not `[A, B]`.
    ///
    /// Returns the insertion position.
    pub fn insert_by_fitness(&mut self, rule: Rule<A>) -> usize {
        let position = self
            .rules
            .iter()
            .position(|existing| compare(existing.fitness(), rule.fitness()) != Ordering::Less)
            .unwrap_or(self.rules.len());
        self.rules.insert(position, rule);
        position
    }

    /// Appends `rule` at the end of the cascade.
    pub fn push(&mut self, rule: Rule<A>) {
        self.rules.push(rule);
    }

    pub fn rules(&self) -> &[Rule<A>] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Class returned when no rule covers an instance.
    pub fn default_class(&self) -> usize {
        self.default_class
    }

    pub fn set_default_class(&mut self, class: usize) {
        self.default_class = class;
    }

    /// Renders the cascade as numbered `IF ... ELSE IF ...` lines.
    ///
    /// Returns an empty string when there are no rules.
    pub fn render(&self, metadata: &Metadata) -> String {
        if self.rules.is_empty() {
            return String::new();
        }

        let mut out = String::new();
        for (i, rule) in self.rules.iter().enumerate() {
            let prefix = if i == 0 { "" } else { "ELSE " };
            out.push_str(&format!(" {} Rule: {}{}\n", i + 1, prefix, rule.render(metadata)));
        }

        let class_attr = metadata.class_attribute();
        out.push_str(&format!(
            " {} Rule: ELSE ({} = {})\n",
            self.rules.len() + 1,
            class_attr.name(),
            class_attr.show(self.default_class as f64)
        ));
        out
    }
}
