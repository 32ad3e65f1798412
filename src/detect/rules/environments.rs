//! Rules whose focus is an environment or a brace group.

use std::sync::Arc;

use super::patterns::{
    ENDS_WITH_BLANK_LINE, ENDS_WITH_SENTENCE_BREAK, FORMULA_GLUE, STARTS_WITH_RELATION,
};
use super::{boxed, Mode, Rule, Scope};
use crate::detect::RuleCode;
use crate::tree::classify::{DOCUMENT, INLINE_MATH};
use crate::tree::{Category, NodeRef};

const RELATION_COMMANDS: &[&str] = &["le", "ge", "leq", "geq", "leqslant", "geqslant", "ne", "neq"];

const PROOF_ENVIRONMENTS: &[&str] = &["proof", "proof*", "solution"];

pub(super) fn rules() -> Vec<Arc<dyn Rule>> {
    let env = Scope::of(Category::Environment);

    vec![
        boxed(RuleCode::DoubleDollars, env, double_dollars),
        boxed(RuleCode::EqnarrayUsed, env, eqnarray),
        boxed(RuleCode::UnnecessaryMathMode, env, single_command_formula),
        boxed(RuleCode::LinebreakAfterDisplayFormulae, env, linebreak_after_display),
        boxed(RuleCode::LinebreakBeforeDisplayFormulae, env, linebreak_before_display),
        boxed(RuleCode::UnnecessaryFormulaBreak, env, split_formula),
        boxed(RuleCode::MathEnvironmentVerbosityWarning, env, verbose_inline_math),
        boxed(RuleCode::BetterToUseWordsThenMath, env, formula_starts_with_relation),
        boxed(RuleCode::MismatchedMathDelimiters, env, unbalanced_left_right),
        boxed(RuleCode::NoConclusion, env, proof_ends_with_formula),
        boxed(RuleCode::SentenceStartsWithFormula, env, formula_opens_sentence),
        boxed(RuleCode::ParagraphStartsWithFormula, env, formula_opens_paragraph),
        boxed(
            RuleCode::InvisibleBraces,
            Scope::of(Category::BraceGroup).in_mode(Mode::Math),
            comma_in_bare_braces,
        ),
    ]
}

/// Inline formula that is not nested inside another formula.
fn is_top_inline_math(node: &NodeRef<'_>) -> bool {
    node.is_environment(INLINE_MATH) && node.parent().map_or(true, |p| !p.in_math())
}

fn double_dollars<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_environment("$$").then_some(node)
}

fn eqnarray<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    (node.is_environment("eqnarray") || node.is_environment("eqnarray*")).then_some(node)
}

fn single_command_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_environment(INLINE_MATH) {
        return None;
    }
    let mut significant = node.content()?.filter(|n| !n.is_blank());
    let only = significant.next()?;
    (significant.next().is_none() && !only.is_text()).then_some(node)
}

fn linebreak_after_display<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let forced = node
        .next_significant_sibling()
        .and_then(|n| n.text())
        .map_or(false, |t| t.trim_start().starts_with("\\\\"));
    (node.is_display_math_environment() && forced).then_some(node)
}

fn linebreak_before_display<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let forced = node
        .prev_significant_sibling()
        .and_then(|n| n.text())
        .map_or(false, |t| t.trim_end().ends_with("\\\\"));
    (node.is_display_math_environment() && forced).then_some(node)
}

fn split_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_environment(INLINE_MATH) {
        return None;
    }
    let next = node.next_sibling()?;
    let glued = match next.text() {
        Some(text) => {
            FORMULA_GLUE.is_match(text)
                && next.next_sibling().map_or(false, |n| n.is_environment(INLINE_MATH))
        }
        None => next.is_environment(INLINE_MATH),
    };
    glued.then_some(node)
}

fn verbose_inline_math<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_environment(INLINE_MATH) {
        return None;
    }
    let offset = node.source_offset()?;
    node.document()
        .source()
        .get(offset..)
        .filter(|rest| rest.starts_with("\\begin{math}"))
        .map(|_| node)
}

fn formula_starts_with_relation<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !is_top_inline_math(&node) {
        return None;
    }
    let first = node.content()?.find(|n| !n.is_blank())?;
    let relation = first.is_command_in(RELATION_COMMANDS)
        || first.text().map_or(false, |t| STARTS_WITH_RELATION.is_match(t));
    relation.then_some(node)
}

fn unbalanced_left_right<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let outermost = node.is_math_environment() && node.parent().map_or(true, |p| !p.in_math());
    if !outermost {
        return None;
    }
    let mut stack: Vec<NodeRef<'a>> = node.children().collect();
    let (mut left, mut right) = (0usize, 0usize);
    while let Some(n) = stack.pop() {
        if n.is_command("left") {
            left += 1;
        } else if n.is_command("right") {
            right += 1;
        }
        stack.extend(n.children());
    }
    (left != right).then_some(node)
}

fn proof_ends_with_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let is_proof = node.category() == Category::Environment
        && node.token().map_or(false, |name| PROOF_ENVIRONMENTS.contains(&name));
    if !is_proof {
        return None;
    }
    let last = node.content()?.filter(|n| !n.is_blank()).last()?;
    last.is_display_math_environment().then_some(node)
}

/// Text sibling before a formula, skipping whitespace.
fn lead_in<'a>(node: &NodeRef<'a>) -> Option<&'a str> {
    node.prev_significant_sibling().and_then(|n| n.text())
}

fn formula_opens_sentence<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !is_top_inline_math(&node) {
        return None;
    }
    let text = lead_in(&node)?;
    let opens = ENDS_WITH_SENTENCE_BREAK.is_match(text) && !ENDS_WITH_BLANK_LINE.is_match(text);
    opens.then_some(node)
}

fn formula_opens_paragraph<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !is_top_inline_math(&node) {
        return None;
    }
    let opens = match node.prev_significant_sibling() {
        Some(prev) => {
            prev.text().map_or(false, |t| ENDS_WITH_BLANK_LINE.is_match(t)) || prev.is_command("par")
        }
        None => node.parent().map_or(false, |p| p.is_environment(DOCUMENT)),
    };
    // Blank text before the formula carries the paragraph break.
    let blank_break = node
        .prev_sibling()
        .filter(|p| p.is_blank())
        .and_then(|p| p.text())
        .map_or(false, |t| ENDS_WITH_BLANK_LINE.is_match(t));
    (opens || blank_break).then_some(node)
}

fn comma_in_bare_braces<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let parent = node.parent()?;
    if parent.arguments().any(|a| a == node) {
        return None;
    }
    let scripted = node
        .prev_sibling()
        .and_then(|n| n.text())
        .map_or(false, |t| t.trim_end().ends_with(['^', '_']));
    let comma = node
        .content()
        .map_or(false, |mut c| c.any(|n| n.text().map_or(false, |t| t.contains(','))));
    (comma && !scripted).then_some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::rules::testing::doc;
    use crate::tree::Document;

    fn fired(d: &Document, code: RuleCode) -> usize {
        rules()
            .iter()
            .filter(|r| r.code() == code)
            .map(|rule| {
                d.iter()
                    .filter(|n| rule.scope().admits(n))
                    .filter(|n| rule.check(*n).is_some())
                    .count()
            })
            .sum()
    }

    #[test]
    fn test_every_double_dollar_is_reported() {
        assert_eq!(fired(&doc("$$a$$ and $$b$$"), RuleCode::DoubleDollars), 2);
    }

    #[test]
    fn test_unnecessary_math_mode() {
        assert_eq!(fired(&doc(r"$\alpha$"), RuleCode::UnnecessaryMathMode), 1);
        assert_eq!(fired(&doc(r"$x$"), RuleCode::UnnecessaryMathMode), 0);
        assert_eq!(fired(&doc(r"$\alpha + 1$"), RuleCode::UnnecessaryMathMode), 0);
    }

    #[test]
    fn test_unnecessary_formula_break() {
        assert_eq!(fired(&doc("$a$$b$"), RuleCode::UnnecessaryFormulaBreak), 1);
        assert_eq!(fired(&doc("$a$ = $b$"), RuleCode::UnnecessaryFormulaBreak), 1);
        assert_eq!(fired(&doc("$a$ and $b$"), RuleCode::UnnecessaryFormulaBreak), 0);
    }

    #[test]
    fn test_linebreaks_around_display() {
        let d = doc("text \\\\\n\\[ x \\]\n\\\\ more");
        assert_eq!(fired(&d, RuleCode::LinebreakBeforeDisplayFormulae), 1);
        assert_eq!(fired(&d, RuleCode::LinebreakAfterDisplayFormulae), 1);
    }

    #[test]
    fn test_verbose_inline_math() {
        let d = doc(r"\begin{math}x\end{math} and $y$");
        assert_eq!(fired(&d, RuleCode::MathEnvironmentVerbosityWarning), 1);
    }

    #[test]
    fn test_formula_starts_with_relation() {
        assert_eq!(fired(&doc("so $= 5$"), RuleCode::BetterToUseWordsThenMath), 1);
        assert_eq!(fired(&doc(r"so $\le 5$"), RuleCode::BetterToUseWordsThenMath), 1);
        assert_eq!(fired(&doc("so $x = 5$"), RuleCode::BetterToUseWordsThenMath), 0);
    }

    #[test]
    fn test_mismatched_delimiters() {
        let d = doc(r"\[ \left( x \right) \]");
        assert_eq!(fired(&d, RuleCode::MismatchedMathDelimiters), 0);
        let d = doc(r"\[ \left( x \]");
        assert_eq!(fired(&d, RuleCode::MismatchedMathDelimiters), 1);
    }

    #[test]
    fn test_proof_without_conclusion() {
        let d = doc("\\begin{proof} Hence \\[ x \\] \\end{proof}");
        assert_eq!(fired(&d, RuleCode::NoConclusion), 1);
        let d = doc("\\begin{proof} Hence \\[ x \\] as needed. \\end{proof}");
        assert_eq!(fired(&d, RuleCode::NoConclusion), 0);
    }

    #[test]
    fn test_formula_at_sentence_and_paragraph_start() {
        assert_eq!(fired(&doc("Done. $x$ is"), RuleCode::SentenceStartsWithFormula), 1);
        assert_eq!(fired(&doc("so $x$ is"), RuleCode::SentenceStartsWithFormula), 0);
        assert_eq!(fired(&doc("Done.\n\n$x$ is"), RuleCode::ParagraphStartsWithFormula), 1);
        assert_eq!(fired(&doc("Done.\n\n$x$ is"), RuleCode::SentenceStartsWithFormula), 0);
        assert_eq!(fired(&doc("$x$ is"), RuleCode::ParagraphStartsWithFormula), 1);
    }

    #[test]
    fn test_invisible_braces() {
        assert_eq!(fired(&doc("${a, b}$"), RuleCode::InvisibleBraces), 1);
        assert_eq!(fired(&doc("$x^{1,2}$"), RuleCode::InvisibleBraces), 0);
        assert_eq!(fired(&doc(r"$\frac{a,b}{c}$"), RuleCode::InvisibleBraces), 0);
    }
}
