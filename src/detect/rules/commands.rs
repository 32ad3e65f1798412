//! Rules whose focus is a command node.

use std::sync::Arc;

use super::math::BIG_OPERATORS;
use super::patterns::{ENDS_WITH_OPERAND, TRIVIAL_LABEL};
use super::{boxed, Mode, Rule, Scope};
use crate::detect::RuleCode;
use crate::tree::{Category, NodeRef};

const FLOAT_ENVIRONMENTS: &[&str] = &["figure", "figure*", "table", "table*"];

const SET_RELATIONS: &[&str] = &["in", "notin", "ni", "subset", "subseteq"];

const LOW_LEVEL_FONTS: &[&str] = &["it", "bf", "sf", "rm", "tt", "sl", "sc"];

const MATRIX_ENVIRONMENTS: &[&str] = &[
    "matrix", "pmatrix", "bmatrix", "Bmatrix", "vmatrix", "Vmatrix", "smallmatrix", "array",
    "cases",
];

pub(super) fn rules() -> Vec<Arc<dyn Rule>> {
    let command = Scope::of(Category::Command);
    let math = command.in_mode(Mode::Math);

    vec![
        boxed(RuleCode::MidInSetComprehension, math, mid_outside_set_builder),
        boxed(RuleCode::CdotForReadability, math, operator_after_operand),
        boxed(RuleCode::Centering, command, centering_outside_float),
        boxed(RuleCode::IncorporateNot, math, detached_not),
        boxed(RuleCode::OverVsFrac, command, over),
        boxed(RuleCode::ChooseVsBinom, command, choose),
        boxed(RuleCode::SetsInBbfont, math, plain_set_letter),
        boxed(RuleCode::TrivialLabel, command, trivial_label),
        boxed(RuleCode::EqrefInsteadOfRef, command, ref_in_parentheses),
        boxed(RuleCode::NonbreakableSpaceBeforeRef, command, breakable_space_before_ref),
        boxed(
            RuleCode::LimitsUnnecessaryInDisplayMode,
            command.in_mode(Mode::DisplayMath),
            limits,
        ),
        boxed(RuleCode::ReplaceMboxWithText, math, mbox),
        boxed(RuleCode::TextCommandsInMathMode, math, text_font_command),
        boxed(RuleCode::LowLevelFontCommands, command, low_level_font),
        boxed(RuleCode::ItalicInsteadOfEmph, command.in_mode(Mode::Text), textit),
        boxed(RuleCode::FormulaNeighbouringReference, command, citation_next_to_formula),
        boxed(RuleCode::GraphicsInMathMode, math, include_graphics),
        boxed(RuleCode::UseDividesInsteadOfVdots, math, vdots_outside_matrix),
        boxed(RuleCode::RussianTypographyPeculiarities, math, latin_variant_symbol),
        boxed(RuleCode::ParagraphBreakBeforeDisplayFormula, command, par_before_display),
    ]
}

fn mid_outside_set_builder<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let braces = node.has_sibling(|n| n.text().map_or(false, |t| t.contains("\\{")));
    (node.is_command("mid") && !braces).then_some(node)
}

fn operator_after_operand<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command_in(BIG_OPERATORS) {
        return None;
    }
    let prev = node.prev_node()?;
    let operand = prev.in_math()
        && !prev.in_non_text_argument()
        && prev.text().map_or(false, |t| ENDS_WITH_OPERAND.is_match(t));
    operand.then_some(node)
}

fn centering_outside_float<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command("centering") {
        return None;
    }
    let in_float = node.parent().map_or(false, |p| {
        p.token().map_or(false, |name| FLOAT_ENVIRONMENTS.contains(&name))
            && p.category() == Category::Environment
    });
    (!in_float).then_some(node)
}

fn detached_not<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command("not") {
        return None;
    }
    let next = node.next_node()?;
    let composable = next.is_command("in")
        || next.text().map_or(false, |t| t.trim_start().starts_with('='));
    composable.then_some(node)
}

fn over<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command("over").then_some(node)
}

fn choose<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command("choose").then_some(node)
}

fn plain_set_letter<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command_in(SET_RELATIONS) {
        return None;
    }
    let first = node.next_node()?.text()?.trim_start().chars().next()?;
    "NRZQC".contains(first).then_some(node)
}

fn trivial_label<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command("label") {
        return None;
    }
    let mut args = node.arguments();
    let key = args.next()?.plain_text();
    if args.next().is_some() {
        return None;
    }
    (key.trim().is_empty() || TRIVIAL_LABEL.is_match(&key)).then_some(node)
}

fn ref_in_parentheses<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let parenthesized = node
        .prev_node()
        .and_then(|n| n.text())
        .map_or(false, |t| t.ends_with('('));
    (node.is_command("ref") && parenthesized).then_some(node)
}

fn breakable_space_before_ref<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let spaced = node
        .prev_node()
        .and_then(|n| n.text())
        .map_or(false, |t| t.ends_with([' ', '\n', '\t']));
    (node.is_command_in(&["ref", "eqref"]) && spaced).then_some(node)
}

fn limits<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command("limits").then_some(node)
}

fn mbox<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command_in(&["mbox", "hbox"]).then_some(node)
}

fn text_font_command<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command_in(&["textbf", "textit"]).then_some(node)
}

fn low_level_font<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command_in(LOW_LEVEL_FONTS).then_some(node)
}

fn textit<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command("textit").then_some(node)
}

fn citation_next_to_formula<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command("cite") {
        return None;
    }
    let after = node
        .prev_significant_node()
        .map_or(false, |n| n.in_math() || n.is_math_environment());
    let before = node
        .next_significant_sibling()
        .map_or(false, |n| n.is_math_environment());
    (after || before).then_some(node)
}

fn include_graphics<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command("includegraphics").then_some(node)
}

fn vdots_outside_matrix<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    if !node.is_command("vdots") {
        return None;
    }
    let in_matrix = node.ancestors().any(|a| {
        a.category() == Category::Environment
            && a.token().map_or(false, |name| MATRIX_ENVIRONMENTS.contains(&name))
    });
    (!in_matrix).then_some(node)
}

fn latin_variant_symbol<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    node.is_command_in(&["emptyset", "epsilon", "phi"]).then_some(node)
}

fn par_before_display<'a>(node: NodeRef<'a>) -> Option<NodeRef<'a>> {
    let before_display = node
        .next_significant_node()
        .map_or(false, |n| n.is_display_math_environment());
    (node.is_command("par") && before_display).then_some(node)
}
