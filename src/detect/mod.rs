//! Detection of typographic issues in an annotated document tree.

mod codes;
pub mod rules;
mod runner;
mod suppress;
mod types;

pub use codes::RuleCode;
pub use rules::{DocumentPass, Mode, NodeRule, PatternRule, Rule, Scope};
pub use runner::{Checked, Runner};
pub use suppress::{
    filter_suppressed, line_of, matches_suppression, parse_suppressions, SuppressedFinding,
    Suppression, SuppressionType,
};
pub use types::{Report, Severity};
