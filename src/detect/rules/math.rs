//! Rules over text nodes inside formulas.

use std::sync::Arc;

use super::patterns::*;
use super::{boxed, pattern, Rule, Scope};
use crate::detect::RuleCode;
use crate::tree::{Category, NodeRef};

/// Commands that typeset large operators or fractions.
pub(super) const BIG_OPERATORS: &[&str] = &["sum", "prod", "frac", "binom"];

pub(super) fn rules() -> Vec<Arc<dyn Rule>> {
    let math = Scope::math_text();

    vec![
        boxed(RuleCode::MidInSetComprehension, math, bar_in_set_builder),
        boxed(RuleCode::LeftRightRecommended, math, paren_before_big_operator),
        pattern(RuleCode::ModNotACommand, math, &MOD_WORD),
        pattern(RuleCode::TextInMathMode, math, &POSSIBLY_WORD),
        boxed(RuleCode::LeAsSingleCommand, math, composed_relation),
        pattern(RuleCode::BackslashNeeded, math, &FUNCTION_WITHOUT_BACKSLASH),
        boxed(RuleCode::UnicodeSqrt, math, unicode_root),
        pattern(RuleCode::CyrillicLetterCMisused, math, &CYRILLIC_LOOKALIKE),
        boxed(RuleCode::QuotesInMath, math, quote_in_formula),
        boxed(RuleCode::DashInMathMode, math, trailing_dash),
        pattern(RuleCode::FloorFunctionNotation, math, &BRACKET_FLOOR),
        pattern(RuleCode::EnOrdinalAbbreviationInMath, math, &ORDINAL_SUPERSCRIPT),
        boxed(
            RuleCode::EnOrdinalAbbreviationInMath,
            Scope::of(Category::BraceGroup).in_mode(super::Mode::Math),
            braced_ordinal_superscript,
        ),
    ]
}

fn own_text<'a>(node: &NodeRef<'a>) -> &'a str {
    node.text().unwrap_or_default()
}

/// `\{x | ...\}` written with a plain bar and no `\mid` next to it.
fn bar_in_set_builder<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    if !text.contains('|') {
        return None;
    }
    let opens_set = text.contains("\\{")
        || node.has_sibling(|n| n.text().map_or(false, |t| t.contains("\\{")));
    (opens_set && !node.has_sibling(|n| n.is_command("mid"))).then_some(node)
}

fn paren_before_big_operator<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let before_operator = node
        .next_node()
        .map_or(false, |n| n.is_command_in(BIG_OPERATORS));
    (own_text(&node).contains('(') && before_operator).then_some(node)
}

fn composed_relation<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    (text.contains("<=") || text.contains(">=")).then_some(node)
}

fn unicode_root<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    own_text(&node).contains('√').then_some(node)
}

fn quote_in_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    own_text(&node).contains('"').then_some(node)
}

/// A formula that ends in `-` right before prose usually holds a dash.
fn trailing_dash<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let followed_by_prose = node.next_node().map_or(false, |n| !n.in_math());
    (own_text(&node).trim_end().ends_with('-') && followed_by_prose).then_some(node)
}

fn braced_ordinal_superscript<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let superscript = node
        .prev_sibling()
        .and_then(|n| n.text())
        .map_or(false, |t| t.trim_end().ends_with('^'));
    (superscript && ORDINAL_SUFFIX.is_match(&node.plain_text())).then_some(node)
}
