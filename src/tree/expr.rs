//! Boolean expression trees over instance attributes.

use crate::data::{Instance, Metadata};
use crate::error::{Result, RuleGpError};
use crate::gp::Genotype;
use crate::rule::Antecedent;
use std::fmt;

/// Relational operator of a leaf condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equal,
    NotEqual,
}

impl Comparison {
    /// Operators drawn for numeric attributes.
    pub const NUMERIC: [Comparison; 4] = [
        Comparison::Less,
        Comparison::LessEq,
        Comparison::Greater,
        Comparison::GreaterEq,
    ];

    /// Operators drawn for categorical attributes.
    pub const CATEGORICAL: [Comparison; 2] = [Comparison::Equal, Comparison::NotEqual];

    /// Applies `lhs <op> rhs`.
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        match self {
            Comparison::Less => lhs < rhs,
            Comparison::LessEq => lhs <= rhs,
            Comparison::Greater => lhs > rhs,
            Comparison::GreaterEq => lhs >= rhs,
            Comparison::Equal => lhs == rhs,
            Comparison::NotEqual => lhs != rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Less => "<",
            Comparison::LessEq => "<=",
            Comparison::Greater => ">",
            Comparison::GreaterEq => ">=",
            Comparison::Equal => "=",
            Comparison::NotEqual => "!=",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A rule antecedent as a syntax tree.
///
/// Leaves compare one attribute against a constant; inner nodes combine
/// sub-expressions. Nodes are addressed in pre-order, root = 0.
///
/// As an [`Antecedent`] its size is the node count; as a [`Genotype`]
/// its size is the tree depth (a single condition has depth 1).
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Expr {
    Condition {
        attribute: usize,
        op: Comparison,
        value: f64,
    },
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
}

impl Expr {
    pub fn condition(attribute: usize, op: Comparison, value: f64) -> Self {
        Expr::Condition {
            attribute,
            op,
            value,
        }
    }

    pub fn and(lhs: Expr, rhs: Expr) -> Self {
        Expr::And(Box::new(lhs), Box::new(rhs))
    }

    pub fn or(lhs: Expr, rhs: Expr) -> Self {
        Expr::Or(Box::new(lhs), Box::new(rhs))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(inner: Expr) -> Self {
        Expr::Not(Box::new(inner))
    }

    /// Evaluates the expression on `instance`.
    pub fn evaluate(&self, instance: &Instance) -> bool {
        match self {
            Expr::Condition {
                attribute,
                op,
                value,
            } => op.apply(instance.value(*attribute), *value),
            Expr::And(lhs, rhs) => lhs.evaluate(instance) && rhs.evaluate(instance),
            Expr::Or(lhs, rhs) => lhs.evaluate(instance) || rhs.evaluate(instance),
            Expr::Not(inner) => !inner.evaluate(instance),
        }
    }

    pub fn node_count(&self) -> usize {
        match self {
            Expr::Condition { .. } => 1,
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => 1 + lhs.node_count() + rhs.node_count(),
            Expr::Not(inner) => 1 + inner.node_count(),
        }
    }

    pub fn depth(&self) -> usize {
        match self {
            Expr::Condition { .. } => 1,
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => 1 + lhs.depth().max(rhs.depth()),
            Expr::Not(inner) => 1 + inner.depth(),
        }
    }

    /// Returns the node at pre-order `index`.
    pub fn subtree(&self, index: usize) -> Option<&Expr> {
        if index == 0 {
            return Some(self);
        }
        match self {
            Expr::Condition { .. } => None,
            Expr::Not(inner) => inner.subtree(index - 1),
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                let left = lhs.node_count();
                if index - 1 < left {
                    lhs.subtree(index - 1)
                } else {
                    rhs.subtree(index - 1 - left)
                }
            }
        }
    }

    /// Mutable access to the node at pre-order `index`.
    pub fn subtree_mut(&mut self, index: usize) -> Option<&mut Expr> {
        if index == 0 {
            return Some(self);
        }
        match self {
            Expr::Condition { .. } => None,
            Expr::Not(inner) => inner.subtree_mut(index - 1),
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                let left = lhs.node_count();
                if index - 1 < left {
                    lhs.subtree_mut(index - 1)
                } else {
                    rhs.subtree_mut(index - 1 - left)
                }
            }
        }
    }

    /// Level of the node at pre-order `index` (root = 1).
    pub fn level_of(&self, index: usize) -> Option<usize> {
        if index == 0 {
            return Some(1);
        }
        let below = match self {
            Expr::Condition { .. } => None,
            Expr::Not(inner) => inner.level_of(index - 1),
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                let left = lhs.node_count();
                if index - 1 < left {
                    lhs.level_of(index - 1)
                } else {
                    rhs.level_of(index - 1 - left)
                }
            }
        };
        below.map(|level| level + 1)
    }

    /// Returns a copy with the node at `index` replaced by `replacement`.
    ///
    /// An out-of-range index returns an unchanged copy.
    pub fn with_subtree(&self, index: usize, replacement: Expr) -> Expr {
        let mut tree = self.clone();
        if let Some(slot) = tree.subtree_mut(index) {
            *slot = replacement;
        }
        tree
    }

    fn first_invalid_value(&self) -> Option<f64> {
        match self {
            Expr::Condition { value, .. } => (!value.is_finite()).then_some(*value),
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                lhs.first_invalid_value().or_else(|| rhs.first_invalid_value())
            }
            Expr::Not(inner) => inner.first_invalid_value(),
        }
    }

    fn write_with(&self, metadata: &Metadata, out: &mut String) {
        match self {
            Expr::Condition {
                attribute,
                op,
                value,
            } => match metadata.attribute(*attribute) {
                Some(attr) => out.push_str(&format!("{} {op} {}", attr.name(), attr.show(*value))),
                None => out.push_str(&format!("#{attribute} {op} {value}")),
            },
            Expr::And(lhs, rhs) | Expr::Or(lhs, rhs) => {
                let joiner = if matches!(self, Expr::And(..)) { " AND " } else { " OR " };
                out.push('(');
                lhs.write_with(metadata, out);
                out.push_str(joiner);
                rhs.write_with(metadata, out);
                out.push(')');
            }
            Expr::Not(inner) => {
                out.push_str("NOT ");
                inner.write_with(metadata, out);
            }
        }
    }
}

impl Antecedent for Expr {
    fn covers(&self, instance: &Instance) -> bool {
        self.evaluate(instance)
    }

    fn size(&self) -> usize {
        self.node_count()
    }

    fn render(&self, metadata: &Metadata) -> String {
        let mut out = String::new();
        self.write_with(metadata, &mut out);
        out
    }
}

impl Genotype for Expr {
    type Antecedent = Expr;

    fn decode(&self) -> Result<Expr> {
        match self.first_invalid_value() {
            Some(value) => Err(RuleGpError::Decode(format!(
                "condition constant {value} is not finite"
            ))),
            None => Ok(self.clone()),
        }
    }

    fn size(&self) -> usize {
        self.depth()
    }
}
