//! Classification rules and the rule-list classifier.
//!
//! - [`Antecedent`]: the condition part of a rule, consumed abstractly
//! - [`Rule`]: antecedent + predicted class + fitness
//! - [`RuleBase`]: ordered first-match cascade with a default class

mod rule_base;
mod types;

pub use rule_base::RuleBase;
pub use types::{Antecedent, Rule};
