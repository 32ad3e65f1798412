//! Detection runner that drives parsing, tree construction and all checks.

use std::sync::Arc;

use anyhow::Context as _;
use lazy_static::lazy_static;
use regex::Regex;

use crate::messages::MessageBank;
use crate::parser::{RawParser, TexParser};
use crate::tree::Document;

use super::rules::{self, Rule};
use super::suppress::{filter_suppressed, parse_suppressions, SuppressedFinding};
use super::{Report, RuleCode};

lazy_static! {
    /// Position marker carried by parse error messages.
    static ref PARSE_ERROR_OFFSET: Regex = Regex::new(r"\[Line:? \d+, Offset:? (\d+)]").unwrap();
}

/// Findings of one document after inline suppressions were applied.
#[derive(Debug, Clone, Default)]
pub struct Checked {
    pub report: Report,
    pub suppressed: Vec<SuppressedFinding>,
}

/// Executes every registered check against a document.
pub struct Runner {
    parser: Arc<dyn RawParser>,
    rules: Vec<Arc<dyn Rule>>,
    bank: MessageBank,
    separate_unreferenced_labels: bool,
}

impl Runner {
    /// Runner with the built-in parser and rules.
    pub fn new(bank: MessageBank) -> Self {
        Self {
            parser: Arc::new(TexParser::new()),
            rules: rules::builtin(),
            bank,
            separate_unreferenced_labels: false,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn RawParser>) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the per-node rule registry.
    pub fn with_rules(mut self, rules: Vec<Arc<dyn Rule>>) -> Self {
        self.rules = rules;
        self
    }

    /// Report unreferenced labels as `UNREFERENCED_LABEL` instead of
    /// `NUMBERED_MATH_NEEDS_REFERENCING`.
    pub fn separate_unreferenced_labels(mut self, separate: bool) -> Self {
        self.separate_unreferenced_labels = separate;
        self
    }

    pub fn bank(&self) -> &MessageBank {
        &self.bank
    }

    /// Parse and build the annotated tree.
    pub fn parse(&self, source: &str) -> anyhow::Result<Document> {
        let raw = self.parser.parse(source)?;
        Document::from_raw(&raw, source).context("malformed parse tree")
    }

    /// Produce the report for `source`.
    ///
    /// A parse failure yields a report holding only `PARSE_ERROR`.
    pub fn run(&self, source: &str) -> Report {
        let raw = match self.parser.parse(source) {
            Ok(raw) => raw,
            Err(err) => {
                let text = format!("{:#}", err);
                let offset = PARSE_ERROR_OFFSET
                    .captures(&text)
                    .and_then(|caps| caps[1].parse().ok());
                log::debug!("parse failed: {}", text);
                return self.failure(offset);
            }
        };

        match Document::from_raw(&raw, source) {
            Ok(doc) => self.evaluate(&doc),
            Err(err) => {
                log::debug!("tree construction failed: {}", err);
                self.failure(None)
            }
        }
    }

    /// Produce the report and apply `% texcheck:` directives found in `source`.
    pub fn check(&self, source: &str) -> Checked {
        let mut report = self.run(source);
        let suppressions = parse_suppressions(source);
        let suppressed = filter_suppressed(&mut report, source, &suppressions);
        if !suppressed.is_empty() {
            log::debug!("{} findings suppressed inline", suppressed.len());
        }
        Checked { report, suppressed }
    }

    fn failure(&self, offset: Option<usize>) -> Report {
        let mut report = Report::new();
        if self.bank.contains(RuleCode::ParseError) {
            report.record(RuleCode::ParseError, offset);
        }
        report
    }

    /// Run every rule and document pass over an annotated tree.
    pub fn evaluate(&self, doc: &Document) -> Report {
        let mut report = Report::new();
        let rules: Vec<&Arc<dyn Rule>> = self
            .rules
            .iter()
            .filter(|rule| self.bank.contains(rule.code()))
            .collect();
        log::debug!("evaluating {} rules over {} nodes", rules.len(), doc.len());

        for node in doc.iter() {
            for rule in &rules {
                if !rule.scope().admits(&node) {
                    continue;
                }
                if let Some(blamed) = rule.check(node) {
                    let offset = blamed.resolve_offset();
                    log::trace!("{} at {:?}", rule.code(), offset);
                    report.record(rule.code(), offset);
                }
            }
        }

        for pass in rules::document_passes(self.separate_unreferenced_labels) {
            log::debug!("running document pass {}", pass.name());
            pass.run(doc, &mut |code, blamed| {
                if self.bank.contains(code) {
                    let offset = blamed.resolve_offset();
                    log::trace!("{} at {:?}", code, offset);
                    report.record(code, offset);
                }
            });
        }

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::Language;
    use anyhow::Context as _;
    use crate::parser::RawNode;

    fn runner() -> Runner {
        Runner::new(MessageBank::builtin(Language::En).clone())
    }

    #[test]
    fn test_parse_error_is_the_only_entry() {
        let report = runner().run("Text $x+y");
        assert_eq!(report.len(), 1);
        assert_eq!(report.get(RuleCode::ParseError), Some(&[Some(5)][..]));
    }

    #[test]
    fn test_parse_error_respects_bank() {
        let bank = MessageBank::builtin(Language::En).without(&[RuleCode::ParseError]);
        let report = Runner::new(bank).run("Text $x+y");
        assert!(report.is_empty());
    }

    #[test]
    fn test_disabled_code_is_never_reported() {
        let bank = MessageBank::builtin(Language::En).without(&[RuleCode::WrongQuotes]);
        let report = Runner::new(bank).run(r#"a "quoted" word"#);
        assert!(!report.contains(RuleCode::WrongQuotes));
        assert!(runner().run(r#"a "quoted" word"#).contains(RuleCode::WrongQuotes));
    }

    #[test]
    fn test_empty_registry_reports_only_passes() {
        let report = runner()
            .with_rules(Vec::new())
            .run(r#"\[ a \] \[ b \] "quoted""#);
        assert_eq!(
            report.codes().collect::<Vec<_>>(),
            vec![RuleCode::ConsecutiveDisplayFormulae]
        );
    }

    struct Broken;

    impl RawParser for Broken {
        fn parse(&self, _source: &str) -> anyhow::Result<RawNode> {
            Err(anyhow::anyhow!("no closing brace [Line: 3, Offset: 42]"))
                .context("while reading chapter")
        }
    }

    #[test]
    fn test_offset_is_found_in_error_chain() {
        let report = runner().with_parser(Arc::new(Broken)).run("whatever");
        assert_eq!(report.get(RuleCode::ParseError), Some(&[Some(42)][..]));
    }

    struct Nested;

    impl RawParser for Nested {
        fn parse(&self, _source: &str) -> anyhow::Result<RawNode> {
            use crate::parser::RawKind;
            let inner = RawNode::new(RawKind::Root, Some(3));
            Ok(RawNode::new(RawKind::Root, None).with_contents(vec![inner]))
        }
    }

    #[test]
    fn test_malformed_tree_reports_parse_error_without_offset() {
        let report = runner().with_parser(Arc::new(Nested)).run("x");
        assert_eq!(report.get(RuleCode::ParseError), Some(&[None][..]));
        assert_eq!(report.len(), 1);
    }

    #[test]
    fn test_separate_unreferenced_labels() {
        let src = r"\begin{equation}\label{eq:energy} E \end{equation}";
        let merged = runner().run(src);
        assert!(merged.contains(RuleCode::NumberedMathNeedsReferencing));
        assert!(!merged.contains(RuleCode::UnreferencedLabel));

        let separate = runner().separate_unreferenced_labels(true).run(src);
        assert!(separate.contains(RuleCode::UnreferencedLabel));
        assert!(!separate.contains(RuleCode::NumberedMathNeedsReferencing));
    }

    #[test]
    fn test_check_applies_suppressions() {
        let src = "a \"quoted\" word % texcheck:ignore WRONG_QUOTES - citation\n";
        let checked = runner().check(src);
        assert!(!checked.report.contains(RuleCode::WrongQuotes));
        assert_eq!(checked.suppressed.len(), 1);
        assert!(runner().run(src).contains(RuleCode::WrongQuotes));
    }
}
