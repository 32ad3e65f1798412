//! Rules over text nodes of running prose, plus the few text rules that
//! apply in any mode.

use std::sync::Arc;

use super::patterns::*;
use super::{boxed, pattern, Rule, Scope};
use crate::detect::RuleCode;
use crate::tree::{Category, NodeRef};

pub(super) fn rules() -> Vec<Arc<dyn Rule>> {
    let text = Scope::of(Category::Text);
    let prose = Scope::prose();

    vec![
        pattern(RuleCode::MultiplicationSign, text, &MULTIPLICATION_STAR),
        pattern(RuleCode::IndentationWithSpaces, text, &REPEATED_SPACING),
        boxed(RuleCode::NoSpaceAfterCommandBeforeCyrillic, text, cyrillic_after_command),
        boxed(RuleCode::EllipsisLdots, text.outside_non_text_arguments(), three_dots),
        boxed(
            RuleCode::ParagraphBreakBeforeDisplayFormula,
            text.outside_non_text_arguments(),
            break_before_display,
        ),
        pattern(RuleCode::SymbolicLinks, prose, &SYMBOLIC_REFERENCE),
        boxed(RuleCode::PeriodBeforeNextSentence, prose, missing_period_after_formula),
        boxed(RuleCode::TildeIneffectiveAsNbsp, prose, tilde_next_to_space),
        boxed(RuleCode::CapitalizationAfterPunctuationMark, prose, capital_after_comma),
        boxed(RuleCode::CapitalizationAfterPeriod, prose, lowercase_after_period),
        boxed(RuleCode::PunctuationAfterDisplayMath, prose, punctuation_after_display),
        pattern(RuleCode::SpaceBeforeParenthesis, prose, &SPACE_BEFORE_PARENTHESIS),
        pattern(RuleCode::SpaceAfterParenthesis, prose, &SPACE_AFTER_PARENTHESIS),
        pattern(RuleCode::SpaceAfterPunctuationMark, prose, &SPACE_AFTER_PUNCTUATION),
        pattern(RuleCode::SpaceBeforePunctuationMark, prose, &SPACE_BEFORE_PUNCTUATION),
        pattern(RuleCode::LatinLetterOutsideMathRu, prose, &LATIN_LETTER_RU),
        pattern(RuleCode::LatinLetterOutsideMathEn, prose, &LATIN_LETTER_EN),
        pattern(RuleCode::MathSemanticsOutsideMath, prose, &MATH_OUTSIDE_MATH),
        pattern(RuleCode::LatinLetterCMisused, prose, &LATIN_C_IN_CYRILLIC),
        boxed(RuleCode::WrongQuotes, prose, straight_quotes),
        boxed(RuleCode::WrongSameQuotes, prose, unpaired_quotes),
        pattern(RuleCode::DashHyphen, prose, &DASH_AS_HYPHEN),
        pattern(RuleCode::AbbreviationsWithSpace, prose, &RU_ABBREVIATION_WITH_SPACE),
        pattern(RuleCode::DashSurroundWithSpaces, prose, &DASH_WITHOUT_SPACES),
        pattern(RuleCode::RuOrdinalAbbreviation, prose, &RU_ORDINAL),
        boxed(RuleCode::SuggestedNewParagraph, prose, forced_line_break),
        pattern(RuleCode::NumeralsAsWords, prose, &SMALL_NUMERAL),
        boxed(RuleCode::EnOrdinalAbbreviation, prose, wrong_ordinal_suffix),
        pattern(RuleCode::SentenceStartsWithNumber, prose, &SENTENCE_STARTS_WITH_DIGIT),
        boxed(RuleCode::ManualLists, prose, manual_list),
    ]
}

fn own_text<'a>(node: &NodeRef<'a>) -> &'a str {
    node.text().unwrap_or_default()
}

fn prev_text<'a>(node: &NodeRef<'a>) -> Option<&'a str> {
    node.prev_node().and_then(|n| n.text())
}

fn cyrillic_after_command<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let after_command = node
        .prev_node()
        .map_or(false, |n| n.category() == Category::Command);
    (after_command && STARTS_WITH_CYRILLIC.is_match(own_text(&node))).then_some(node)
}

fn three_dots<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    own_text(&node).contains("...").then_some(node)
}

fn break_before_display<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    let breaks = text.trim_end().ends_with("\\\\") || ENDS_WITH_BLANK_LINE.is_match(text);
    let before_display = node
        .next_node()
        .map_or(false, |n| n.is_display_math_environment());
    (breaks && before_display).then_some(node)
}

fn missing_period_after_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let prev = node.prev_node()?;
    let closed = prev.text().map_or(false, |t| t.trim().ends_with('.'));
    (STARTS_UPPERCASE.is_match(own_text(&node)) && prev.in_math() && !closed).then_some(node)
}

fn tilde_next_to_space<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    (text.contains("~ ") || text.contains(" ~")).then_some(node)
}

fn capital_after_comma<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    let continues_clause = prev_text(&node).map_or(false, |t| t.trim().ends_with(','));
    (CAPITAL_AFTER_COMMA.is_match(text) || (continues_clause && STARTS_UPPERCASE.is_match(text)))
        .then_some(node)
}

fn lowercase_after_period<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    let after_period = prev_text(&node).map_or(false, |t| t.trim().ends_with('.'));
    (LOWERCASE_AFTER_PERIOD.is_match(text) || (after_period && STARTS_LOWERCASE.is_match(text)))
        .then_some(node)
}

fn punctuation_after_display<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let first = own_text(&node).trim_start().chars().next()?;
    if !",.:?!;".contains(first) {
        return None;
    }
    node.prev_sibling()
        .filter(|prev| prev.is_display_math_environment())
}

fn straight_quotes<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    own_text(&node).replace("\\\"", "").contains('"').then_some(node)
}

fn unpaired_quotes<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let text = own_text(&node);
    let closing = text.contains("''");
    let opening = text.contains("``");
    (closing != opening).then_some(node)
}

fn forced_line_break<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    own_text(&node).contains("\\\\").then_some(node)
}

/// English suffix for an ordinal number.
fn ordinal_suffix(number: &str) -> &'static str {
    let digits = number.as_bytes();
    let last = digits.last().map_or(0, |d| d - b'0');
    let tens = if digits.len() > 1 { digits[digits.len() - 2] - b'0' } else { 0 };
    match (tens, last) {
        (1, _) => "th",
        (_, 1) => "st",
        (_, 2) => "nd",
        (_, 3) => "rd",
        _ => "th",
    }
}

fn wrong_ordinal_suffix<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    EN_ORDINAL
        .captures_iter(own_text(&node))
        .any(|caps| ordinal_suffix(&caps[1]) != &caps[2])
        .then_some(node)
}

fn manual_list<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    (MANUAL_LIST_ITEM.find_iter(own_text(&node)).count() >= 2).then_some(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::rules::testing::doc;
    use crate::tree::Document;

    fn fired(d: &Document, code: RuleCode) -> usize {
        let rules = rules();
        let rule = rules.iter().find(|r| r.code() == code).unwrap();
        d.iter()
            .filter(|n| rule.scope().admits(n))
            .filter(|n| rule.check(*n).is_some())
            .count()
    }

    #[test]
    fn test_ordinal_suffix() {
        assert_eq!(ordinal_suffix("1"), "st");
        assert_eq!(ordinal_suffix("22"), "nd");
        assert_eq!(ordinal_suffix("113"), "th");
        assert_eq!(ordinal_suffix("11"), "th");
        assert_eq!(ordinal_suffix("104"), "th");
    }

    #[test]
    fn test_en_ordinals() {
        assert_eq!(fired(&doc("the 21st and 2nd"), RuleCode::EnOrdinalAbbreviation), 0);
        assert_eq!(fired(&doc("the 21th time"), RuleCode::EnOrdinalAbbreviation), 1);
        assert_eq!(fired(&doc("on the 12nd"), RuleCode::EnOrdinalAbbreviation), 1);
    }

    #[test]
    fn test_en_ordinals_ignore_non_ascii_digits() {
        assert_eq!(fired(&doc("the ３rd and ١٢th rows"), RuleCode::EnOrdinalAbbreviation), 0);
    }

    #[test]
    fn test_straight_quotes() {
        assert_eq!(fired(&doc(r#"a "quoted" word"#), RuleCode::WrongQuotes), 1);
        assert_eq!(fired(&doc(r#"Erd\"os"#), RuleCode::WrongQuotes), 0);
        assert_eq!(fired(&doc(r#"$"x"$"#), RuleCode::WrongQuotes), 0);
    }

    #[test]
    fn test_same_quotes() {
        assert_eq!(fired(&doc("``fine''"), RuleCode::WrongSameQuotes), 0);
        assert_eq!(fired(&doc("''bad''"), RuleCode::WrongSameQuotes), 1);
    }

    #[test]
    fn test_dash_rules() {
        assert_eq!(fired(&doc("text--text"), RuleCode::DashSurroundWithSpaces), 1);
        assert_eq!(fired(&doc("text -- text"), RuleCode::DashSurroundWithSpaces), 0);
        assert_eq!(fired(&doc("word - word"), RuleCode::DashHyphen), 1);
        assert_eq!(fired(&doc("well-known"), RuleCode::DashHyphen), 0);
    }

    #[test]
    fn test_prose_rules_skip_math_and_labels() {
        assert_eq!(fired(&doc("$a--b$"), RuleCode::DashSurroundWithSpaces), 0);
        assert_eq!(fired(&doc(r"\label{a--b}"), RuleCode::DashSurroundWithSpaces), 0);
        assert_eq!(fired(&doc(r"\label{a...b}"), RuleCode::EllipsisLdots), 0);
        assert_eq!(fired(&doc("$a...b$"), RuleCode::EllipsisLdots), 1);
    }

    #[test]
    fn test_punctuation_after_display_blames_formula() {
        let d = doc(r"\[ x \]. Next");
        let rules = rules();
        let rule = rules
            .iter()
            .find(|r| r.code() == RuleCode::PunctuationAfterDisplayMath)
            .unwrap();
        let text = d.iter().find(|n| n.text() == Some(". Next")).unwrap();
        let blamed = rule.check(text).unwrap();
        assert!(blamed.is_environment("displaymath"));
        assert_eq!(blamed.source_offset(), Some(0));
    }

    #[test]
    fn test_period_before_next_sentence() {
        assert_eq!(fired(&doc("we get $x$ Then"), RuleCode::PeriodBeforeNextSentence), 1);
        assert_eq!(fired(&doc("we get $x.$ Then"), RuleCode::PeriodBeforeNextSentence), 0);
        assert_eq!(fired(&doc("we get $x$. Then"), RuleCode::PeriodBeforeNextSentence), 0);
    }

    #[test]
    fn test_capitalization() {
        assert_eq!(fired(&doc("one, Two"), RuleCode::CapitalizationAfterPunctuationMark), 1);
        assert_eq!(fired(&doc("end. start"), RuleCode::CapitalizationAfterPeriod), 1);
        assert_eq!(fired(&doc("end. Start"), RuleCode::CapitalizationAfterPeriod), 0);
    }

    #[test]
    fn test_cyrillic_after_command() {
        assert_eq!(fired(&doc(r"\alphaбета"), RuleCode::NoSpaceAfterCommandBeforeCyrillic), 1);
        assert_eq!(fired(&doc(r"\alpha бета"), RuleCode::NoSpaceAfterCommandBeforeCyrillic), 0);
    }

    #[test]
    fn test_paragraph_break_before_display() {
        let d = doc("text\n\n\\[ x \\]");
        assert_eq!(fired(&d, RuleCode::ParagraphBreakBeforeDisplayFormula), 1);
        let d = doc("text\n\\[ x \\]");
        assert_eq!(fired(&d, RuleCode::ParagraphBreakBeforeDisplayFormula), 0);
    }

    #[test]
    fn test_manual_lists() {
        let d = doc("Steps:\n1. mix\n2. bake\n");
        assert_eq!(fired(&d, RuleCode::ManualLists), 1);
        assert_eq!(fired(&doc("See item 1. Then go"), RuleCode::ManualLists), 0);
    }

    #[test]
    fn test_tilde_and_multiplication() {
        assert_eq!(fired(&doc("a ~b"), RuleCode::TildeIneffectiveAsNbsp), 1);
        assert_eq!(fired(&doc("a~b"), RuleCode::TildeIneffectiveAsNbsp), 0);
        assert_eq!(fired(&doc("$a*b$"), RuleCode::MultiplicationSign), 1);
    }
}
