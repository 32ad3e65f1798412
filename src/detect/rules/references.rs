//! Document passes over labels, references and runs of displayed formulas.

use std::collections::HashSet;

use super::DocumentPass;
use crate::detect::RuleCode;
use crate::tree::classify;
use crate::tree::{Category, Document, NodeRef};

/// Reports a displayed formula that directly follows another one.
///
/// Only the second formula of each pair is blamed, so a run of three
/// formulas yields two occurrences.
pub struct ConsecutiveDisplayPass;

impl DocumentPass for ConsecutiveDisplayPass {
    fn name(&self) -> &'static str {
        "consecutive-display"
    }

    fn run<'a>(&self, doc: &'a Document, emit: &mut dyn FnMut(RuleCode, NodeRef<'a>)) {
        for node in doc.iter().filter(|n| n.is_display_math_environment()) {
            if let Some(next) = node
                .next_significant_sibling()
                .filter(|n| n.is_display_math_environment())
            {
                emit(RuleCode::ConsecutiveDisplayFormulae, next);
            }
        }
    }
}

/// Cross-checks labels against references.
///
/// Numbered formulas without a label are always reported as
/// `NUMBERED_MATH_NEEDS_REFERENCING`. Labels nobody references go under
/// `unreferenced`, which lets callers keep them apart from the former.
pub struct CrossReferencePass {
    unreferenced: RuleCode,
}

impl CrossReferencePass {
    pub fn new(unreferenced: RuleCode) -> Self {
        Self { unreferenced }
    }
}

/// Keys named by reference commands. `\cref{a,b}` names two keys.
fn referenced_keys(doc: &Document) -> HashSet<String> {
    doc.iter()
        .filter(|n| {
            n.category() == Category::Command && n.token().map_or(false, classify::is_reference_command)
        })
        .flat_map(|n| n.arguments().map(|a| a.plain_text()).collect::<Vec<_>>())
        .flat_map(|arg| {
            arg.split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect::<Vec<_>>()
        })
        .collect()
}

fn label_key(node: &NodeRef<'_>) -> Option<String> {
    node.arguments()
        .next()
        .map(|arg| arg.plain_text().trim().to_string())
}

impl DocumentPass for CrossReferencePass {
    fn name(&self) -> &'static str {
        "cross-reference"
    }

    fn run<'a>(&self, doc: &'a Document, emit: &mut dyn FnMut(RuleCode, NodeRef<'a>)) {
        let numbered = doc.iter().filter(|n| {
            n.category() == Category::Environment && n.token().map_or(false, classify::is_numbered_math)
        });
        for env in numbered {
            if !env.has_descendant(|n| n.is_command("label")) {
                emit(RuleCode::NumberedMathNeedsReferencing, env);
            }
        }

        let referenced = referenced_keys(doc);
        log::trace!("{} referenced label keys", referenced.len());

        for label in doc.iter().filter(|n| n.is_command("label")) {
            match label_key(&label) {
                Some(key) if referenced.contains(&key) => {}
                _ => emit(self.unreferenced, label),
            }
        }
    }
}
