//! Rule registry.
//!
//! A per-node rule declares the nodes it looks at through a [`Scope`] and
//! returns the node to blame when its condition holds. Rules never mutate the
//! tree and never see each other's results, so evaluation order only affects
//! the order of report entries.
//!
//! Whole-document checks that need more than one node at a time implement
//! [`DocumentPass`] instead.

mod commands;
mod environments;
mod math;
mod patterns;
mod prose;
mod references;

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::RuleCode;
use crate::tree::{Category, Document, NodeRef};

pub use references::{ConsecutiveDisplayPass, CrossReferencePass};

/// Math context a rule requires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Any,
    /// Outside math.
    Text,
    /// Inline or display math.
    Math,
    DisplayMath,
}

/// Precondition checked by the engine before a rule runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    pub category: Option<Category>,
    pub mode: Mode,
    /// Skip nodes inside label and reference arguments.
    pub skip_non_text_arguments: bool,
}

impl Scope {
    pub const fn any() -> Self {
        Self {
            category: None,
            mode: Mode::Any,
            skip_non_text_arguments: false,
        }
    }

    pub const fn of(category: Category) -> Self {
        Self {
            category: Some(category),
            mode: Mode::Any,
            skip_non_text_arguments: false,
        }
    }

    /// Text nodes of running prose.
    pub const fn prose() -> Self {
        Self::of(Category::Text).in_mode(Mode::Text).outside_non_text_arguments()
    }

    /// Text nodes inside formulas.
    pub const fn math_text() -> Self {
        Self::of(Category::Text).in_mode(Mode::Math)
    }

    pub const fn in_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub const fn outside_non_text_arguments(mut self) -> Self {
        self.skip_non_text_arguments = true;
        self
    }

    pub fn admits(&self, node: &NodeRef<'_>) -> bool {
        if let Some(category) = self.category {
            if node.category() != category {
                return false;
            }
        }
        if self.skip_non_text_arguments && node.in_non_text_argument() {
            return false;
        }
        match self.mode {
            Mode::Any => true,
            Mode::Text => !node.in_math(),
            Mode::Math => node.in_math(),
            Mode::DisplayMath => node.in_display_math(),
        }
    }
}

/// One diagnostic condition evaluated on a single focus node.
pub trait Rule: Send + Sync {
    fn code(&self) -> RuleCode;

    fn scope(&self) -> Scope;

    /// Returns the node to blame when the condition holds.
    fn check<'a>(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>>;
}

/// Signature of a rule predicate.
pub type CheckFn = for<'a> fn(NodeRef<'a>) -> Option<NodeRef<'a>>;

/// A rule backed by a plain function.
pub struct NodeRule {
    code: RuleCode,
    scope: Scope,
    check: CheckFn,
}

impl NodeRule {
    pub fn new(code: RuleCode, scope: Scope, check: CheckFn) -> Self {
        Self { code, scope, check }
    }
}

impl Rule for NodeRule {
    fn code(&self) -> RuleCode {
        self.code
    }

    fn scope(&self) -> Scope {
        self.scope
    }

    fn check<'a>(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        (self.check)(node)
    }
}

/// A rule that fires when a text node's own content matches a pattern.
pub struct PatternRule {
    code: RuleCode,
    scope: Scope,
    pattern: &'static Regex,
}

impl PatternRule {
    /// `scope` is narrowed to text nodes.
    pub fn new(code: RuleCode, scope: Scope, pattern: &'static Regex) -> Self {
        let scope = Scope {
            category: Some(Category::Text),
            ..scope
        };
        Self { code, scope, pattern }
    }
}

impl Rule for PatternRule {
    fn code(&self) -> RuleCode {
        self.code
    }

    fn scope(&self) -> Scope {
        self.scope
    }

    fn check<'a>(&self, node: NodeRef<'a>) -> Option<NodeRef<'a>> {
        node.text()
            .filter(|text| self.pattern.is_match(text))
            .map(|_| node)
    }
}

/// A check that needs the whole document, run after the per-node scan.
pub trait DocumentPass: Send + Sync {
    fn name(&self) -> &'static str;

    /// Reports `(code, blamed node)` pairs through `emit`.
    fn run<'a>(&self, doc: &'a Document, emit: &mut dyn FnMut(RuleCode, NodeRef<'a>));
}

static BUILTIN_RULES: Lazy<Vec<Arc<dyn Rule>>> = Lazy::new(|| {
    let mut rules = Vec::new();
    rules.extend(prose::rules());
    rules.extend(math::rules());
    rules.extend(commands::rules());
    rules.extend(environments::rules());
    rules
});

/// All built-in per-node rules.
pub fn builtin() -> Vec<Arc<dyn Rule>> {
    BUILTIN_RULES.clone()
}

/// Built-in document passes.
pub fn document_passes(separate_unreferenced_labels: bool) -> Vec<Box<dyn DocumentPass>> {
    let unreferenced = if separate_unreferenced_labels {
        RuleCode::UnreferencedLabel
    } else {
        RuleCode::NumberedMathNeedsReferencing
    };
    vec![
        Box::new(ConsecutiveDisplayPass),
        Box::new(CrossReferencePass::new(unreferenced)),
    ]
}

fn boxed(code: RuleCode, scope: Scope, check: CheckFn) -> Arc<dyn Rule> {
    Arc::new(NodeRule::new(code, scope, check))
}

fn pattern(code: RuleCode, scope: Scope, regex: &'static Regex) -> Arc<dyn Rule> {
    Arc::new(PatternRule::new(code, scope, regex))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::parser::TexParser;
    use crate::tree::Document;

    pub fn doc(source: &str) -> Document {
        let raw = TexParser::new().parse_source(source).unwrap();
        Document::from_raw(&raw, source).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_scope_admits() {
        let d = testing::doc(r"a $b$ \ref{c}");
        let a = d.iter().find(|n| n.text() == Some("a ")).unwrap();
        let b = d.iter().find(|n| n.text() == Some("b")).unwrap();
        let c = d.iter().find(|n| n.text() == Some("c")).unwrap();

        assert!(Scope::prose().admits(&a));
        assert!(!Scope::prose().admits(&b));
        assert!(!Scope::prose().admits(&c));
        assert!(Scope::math_text().admits(&b));
        assert!(!Scope::of(Category::Command).admits(&a));
        assert!(Scope::any().admits(&c));
    }

    #[test]
    fn test_every_code_has_a_producer() {
        let mut produced: HashSet<RuleCode> = builtin().iter().map(|r| r.code()).collect();
        produced.insert(RuleCode::ParseError);
        produced.insert(RuleCode::ConsecutiveDisplayFormulae);
        produced.insert(RuleCode::NumberedMathNeedsReferencing);
        produced.insert(RuleCode::UnreferencedLabel);
        for code in RuleCode::ALL {
            assert!(produced.contains(code), "no rule produces {}", code);
        }
    }

    #[test]
    fn test_consecutive_display_only_in_pass() {
        assert!(builtin()
            .iter()
            .all(|r| r.code() != RuleCode::ConsecutiveDisplayFormulae));
    }

    #[test]
    fn test_pattern_rule_requires_text() {
        lazy_static::lazy_static! {
            static ref ANY: Regex = Regex::new(".").unwrap();
        }
        let rule = PatternRule::new(RuleCode::Centering, Scope::any(), &ANY);
        assert_eq!(rule.scope().category, Some(Category::Text));

        let d = testing::doc(r"\centering x");
        let cmd = d.iter().find(|n| n.is_command("centering")).unwrap();
        assert!(rule.check(cmd).is_none());
        let text = d.iter().find(|n| n.is_text()).unwrap();
        assert_eq!(rule.check(text), Some(text));
    }
}
