//! texcheck - typographic linter for LaTeX documents.
//!
//! A document is parsed into a raw tree, rebuilt as an arena of typed nodes,
//! annotated with math and argument context, and then scanned by a registry
//! of rules. The result is a [`Report`]: rule codes mapped to the byte
//! offsets where each issue was found.
//!
//! # Architecture
//!
//! - `parser`: raw LaTeX parse adapter (lexer and recursive parser)
//! - `tree`: node arena, context annotation and navigation helpers
//! - `detect`: rule codes, rules, document passes, suppression and the runner
//! - `messages`: per-language explanations and severities
//! - `config`: YAML configuration
//! - `report`: output formatting (pretty, JSON)
//!
//! ```
//! use texcheck::messages::{Language, MessageBank};
//!
//! let report = texcheck::check("text--text", MessageBank::builtin(Language::En));
//! assert!(report.contains(texcheck::RuleCode::DashSurroundWithSpaces));
//! ```

pub mod cli;
pub mod config;
pub mod detect;
pub mod messages;
pub mod parser;
pub mod report;
pub mod tree;

pub use config::Config;
pub use detect::{Report, RuleCode, Runner, Severity};
pub use messages::{Language, MessageBank};
pub use tree::Document;

/// Check `source` with the built-in parser and rules.
///
/// Codes absent from `bank` are never reported. A document that fails to
/// parse yields a report holding only `PARSE_ERROR`.
pub fn check(source: &str, bank: &MessageBank) -> Report {
    Runner::new(bank.clone()).run(source)
}
