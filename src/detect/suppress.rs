//! Inline suppression of findings via comments.
//!
//! Supports suppression comments like:
//! - `% texcheck:ignore <CODE> - <reason>`
//! - `% texcheck:ignore-next-line <CODE> - <reason>`
//! - `% texcheck:ignore-file <CODE> - <reason>`
//!
//! `*` in place of a code matches every code except `PARSE_ERROR`.

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::{Report, RuleCode};

/// How a suppression applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuppressionType {
    /// Applies to the same line
    Line,
    /// Applies to the next line
    NextLine,
    /// Applies to the entire file
    File,
}

/// An inline suppression directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suppression {
    /// Code to suppress, or `None` for all codes
    pub code: Option<RuleCode>,
    /// Human-readable reason
    pub reason: String,
    /// Line number (0 for file-level)
    pub line: usize,
    pub suppression_type: SuppressionType,
}

/// A finding that was suppressed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuppressedFinding {
    pub code: RuleCode,
    pub offset: Option<usize>,
    pub suppression: Suppression,
}

lazy_static::lazy_static! {
    static ref SUPPRESSION_PATTERN: Regex =
        Regex::new(r"%\s*texcheck:(ignore(?:-file|-next-line)?)\s+(\S+)\s*(?:-\s*(.*))?").unwrap();
}

/// Parse suppression directives from document source.
pub fn parse_suppressions(content: &str) -> Vec<Suppression> {
    let mut suppressions = Vec::new();
    let mut in_header = true;

    for (line_num, line) in content.lines().enumerate() {
        let line_number = line_num + 1;
        let trimmed = line.trim();

        // File-level directives are honoured only before the first content line.
        if in_header && !(trimmed.is_empty() || trimmed.starts_with('%')) {
            in_header = false;
        }

        let Some(caps) = SUPPRESSION_PATTERN.captures(line) else {
            continue;
        };
        let Some(whole) = caps.get(0) else {
            continue;
        };
        if is_escaped(line, whole.start()) {
            continue;
        }

        let directive = caps.get(1).map(|m| m.as_str()).unwrap_or("");
        let target = caps.get(2).map(|m| m.as_str()).unwrap_or("");
        let reason = caps
            .get(3)
            .map(|m| m.as_str().trim().to_string())
            .unwrap_or_default();

        let code = if target == "*" {
            None
        } else {
            match RuleCode::parse(target) {
                Some(code) => Some(code),
                None => {
                    log::warn!("line {}: unknown rule code {} in suppression", line_number, target);
                    continue;
                }
            }
        };

        let suppression_type = match directive {
            "ignore-file" => {
                if !in_header {
                    log::warn!("line {}: ignore-file after document content is ignored", line_number);
                    continue;
                }
                SuppressionType::File
            }
            "ignore-next-line" => SuppressionType::NextLine,
            "ignore" => {
                // Alone on its line it covers the next line.
                if line[..whole.start()].trim().is_empty() {
                    SuppressionType::NextLine
                } else {
                    SuppressionType::Line
                }
            }
            _ => continue,
        };

        suppressions.push(Suppression {
            code,
            reason,
            line: if suppression_type == SuppressionType::File {
                0
            } else {
                line_number
            },
            suppression_type,
        });
    }

    suppressions
}

/// `\%` is a literal percent sign, not a comment.
fn is_escaped(line: &str, percent: usize) -> bool {
    let backslashes = line[..percent].chars().rev().take_while(|c| *c == '\\').count();
    backslashes % 2 == 1
}

/// 1-based line of a byte offset.
pub fn line_of(source: &str, offset: usize) -> usize {
    let end = offset.min(source.len());
    source.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

/// Check if a finding matches a suppression.
pub fn matches_suppression(
    code: RuleCode,
    line: Option<usize>,
    suppression: &Suppression,
) -> bool {
    if code == RuleCode::ParseError {
        return false;
    }
    if suppression.code.map_or(false, |c| c != code) {
        return false;
    }

    match (suppression.suppression_type, line) {
        (SuppressionType::File, _) => true,
        (SuppressionType::Line, Some(line)) => line == suppression.line,
        (SuppressionType::NextLine, Some(line)) => line == suppression.line + 1,
        (_, None) => false,
    }
}

/// Remove suppressed findings from `report`, returning what was removed.
pub fn filter_suppressed(
    report: &mut Report,
    source: &str,
    suppressions: &[Suppression],
) -> Vec<SuppressedFinding> {
    let mut suppressed = Vec::new();
    if suppressions.is_empty() {
        return suppressed;
    }

    report.retain(|code, offset| {
        let line = offset.map(|o| line_of(source, o));
        match suppressions
            .iter()
            .find(|s| matches_suppression(code, line, s))
        {
            Some(suppression) => {
                suppressed.push(SuppressedFinding {
                    code,
                    offset,
                    suppression: suppression.clone(),
                });
                false
            }
            None => true,
        }
    });

    suppressed
}
