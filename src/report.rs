//! Output formatting for texcheck results.
//!
//! Supports two output formats:
//! - Pretty: colored terminal output for human readability
//! - JSON: structured output for programmatic consumption

use std::path::PathBuf;

use colored::*;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::detect::{line_of, Report, RuleCode, Severity, SuppressedFinding, SuppressionType};
use crate::messages::MessageBank;

/// Findings for one checked file.
#[derive(Debug, Clone)]
pub struct FileResult {
    pub path: PathBuf,
    pub source: String,
    pub report: Report,
    pub suppressed: Vec<SuppressedFinding>,
}

impl FileResult {
    /// Highest severity among reported codes.
    pub fn max_severity(&self, bank: &MessageBank) -> Option<Severity> {
        self.report.codes().filter_map(|c| bank.severity(c)).max()
    }
}

/// Whether any file has a finding at or above `threshold`.
pub fn fails(results: &[FileResult], bank: &MessageBank, threshold: Severity) -> bool {
    results
        .iter()
        .filter_map(|r| r.max_severity(bank))
        .any(|s| s >= threshold)
}

/// 1-based line and column (in characters) of a byte offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    pub fn of(source: &str, offset: usize) -> Self {
        let mut end = offset.min(source.len());
        while !source.is_char_boundary(end) {
            end -= 1;
        }
        let line_start = source[..end].rfind('\n').map_or(0, |i| i + 1);
        Self {
            line: line_of(source, end),
            column: source[line_start..end].chars().count() + 1,
        }
    }
}

/// The source line containing `offset`, shortened to a readable width.
fn snippet(source: &str, location: Location) -> String {
    const WIDTH: usize = 72;
    let line = source.lines().nth(location.line - 1).unwrap_or_default();
    let chars: Vec<char> = line.chars().collect();
    if chars.len() <= WIDTH {
        return line.trim_end().to_string();
    }
    let start = location.column.saturating_sub(WIDTH / 2).min(chars.len() - WIDTH);
    let mut out: String = chars[start..start + WIDTH].iter().collect();
    if start > 0 {
        out.insert_str(0, "…");
    }
    if start + WIDTH < chars.len() {
        out.push('…');
    }
    out
}

lazy_static! {
    static ref LINK: Regex = Regex::new(r#"<a\s+href="([^"]*)"[^>]*>(.*?)</a>"#).unwrap();
    static ref CODE: Regex = Regex::new(r"<code>(.*?)</code>").unwrap();
    static ref EMPHASIS: Regex = Regex::new(r"<(em|strong)>(.*?)</(em|strong)>").unwrap();
    static ref TAG: Regex = Regex::new(r"<[^>]+>").unwrap();
}

/// Convert the light HTML markup of bank messages to terminal text.
pub fn html_to_console(html: &str) -> String {
    let text = LINK.replace_all(html, "$2 ($1)");
    let text = CODE.replace_all(&text, |caps: &regex::Captures| {
        format!("`{}`", &caps[1]).cyan().to_string()
    });
    let text = EMPHASIS.replace_all(&text, |caps: &regex::Captures| {
        if &caps[1] == "strong" {
            caps[2].bold().to_string()
        } else {
            caps[2].italic().to_string()
        }
    });
    let text = TAG.replace_all(&text, "");
    decode_entities(&text)
}

fn decode_entities(text: &str) -> String {
    text.replace("&thinsp;", "\u{2009}")
        .replace("&nbsp;", "\u{a0}")
        .replace("&laquo;", "«")
        .replace("&raquo;", "»")
        .replace("&mdash;", "—")
        .replace("&ndash;", "–")
        .replace("&quot;", "\"")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

// =============================================================================
// JSON Format
// =============================================================================

/// JSON report for a whole run.
#[derive(Serialize, Deserialize)]
pub struct JsonReport {
    pub version: String,
    pub language: String,
    pub passed: bool,
    pub files_scanned: usize,
    pub files: Vec<JsonFile>,
}

#[derive(Serialize, Deserialize)]
pub struct JsonFile {
    pub file: String,
    pub findings: Vec<JsonFinding>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub suppressed: Vec<JsonSuppressed>,
    pub suppressed_count: usize,
}

#[derive(Serialize, Deserialize)]
pub struct JsonFinding {
    pub code: String,
    pub severity: String,
    pub offsets: Vec<Option<usize>>,
    pub locations: Vec<Option<Location>>,
    pub message: String,
}

#[derive(Serialize, Deserialize)]
pub struct JsonSuppressed {
    pub code: String,
    pub offset: Option<usize>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    #[serde(rename = "type")]
    pub suppression_type: SuppressionType,
}

/// Build the JSON report.
pub fn to_json(results: &[FileResult], bank: &MessageBank, passed: bool) -> JsonReport {
    let files = results
        .iter()
        .map(|r| JsonFile {
            file: r.path.display().to_string(),
            findings: r
                .report
                .iter()
                .map(|(code, offsets)| finding_to_json(code, offsets, &r.source, bank))
                .collect(),
            suppressed: r
                .suppressed
                .iter()
                .map(|s| JsonSuppressed {
                    code: s.code.to_string(),
                    offset: s.offset,
                    reason: s.suppression.reason.clone(),
                    suppression_type: s.suppression.suppression_type,
                })
                .collect(),
            suppressed_count: r.suppressed.len(),
        })
        .collect();

    JsonReport {
        version: env!("CARGO_PKG_VERSION").to_string(),
        language: bank.language().to_string(),
        passed,
        files_scanned: results.len(),
        files,
    }
}

fn finding_to_json(
    code: RuleCode,
    offsets: &[Option<usize>],
    source: &str,
    bank: &MessageBank,
) -> JsonFinding {
    let message = bank.get(code);
    JsonFinding {
        code: code.to_string(),
        severity: message
            .map(|m| m.severity.to_string())
            .unwrap_or_else(|| Severity::Error.to_string()),
        offsets: offsets.to_vec(),
        locations: offsets
            .iter()
            .map(|o| o.map(|o| Location::of(source, o)))
            .collect(),
        message: message.map(|m| m.text.clone()).unwrap_or_default(),
    }
}

/// Write results in JSON format.
pub fn write_json(results: &[FileResult], bank: &MessageBank, passed: bool) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(&to_json(results, bank, passed))?;
    println!("{}", json);
    Ok(())
}

// =============================================================================
// Pretty Format
// =============================================================================

/// Write results in pretty (human-readable) format.
pub fn write_pretty(results: &[FileResult], bank: &MessageBank, passed: bool) {
    println!();
    print!("  ");
    print!("{}", "texcheck".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    for result in results {
        write_file(result, bank);
    }

    let findings: usize = results.iter().map(|r| r.report.occurrences()).sum();
    let suppressed: usize = results.iter().map(|r| r.suppressed.len()).sum();

    print!("  ");
    if passed {
        print!("{}", "✓ PASS".green());
    } else {
        print!("{}", "✗ FAIL".red());
    }
    print!(
        "  {} file{}, {} finding{}",
        results.len(),
        plural(results.len()),
        findings,
        plural(findings)
    );
    if suppressed > 0 {
        print!("  {}", format!("({} suppressed)", suppressed).dimmed());
    }
    println!();
    println!();
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

fn write_file(result: &FileResult, bank: &MessageBank) {
    let path = result.path.display().to_string();
    if result.report.is_empty() {
        println!("  {} {}", path.blue(), "clean".green());
        println!();
        return;
    }

    println!("  {} ({}):", path.blue().bold(), result.report.occurrences());
    println!();

    for (code, offsets) in result.report.iter() {
        let message = bank.get(code);
        write_severity_tag(message.map_or(Severity::Error, |m| m.severity));
        println!("{}", code.as_str().bold());

        for offset in offsets {
            match offset {
                Some(offset) => {
                    let location = Location::of(&result.source, *offset);
                    println!(
                        "            {}{}",
                        path.dimmed(),
                        format!(":{}:{}", location.line, location.column).dimmed()
                    );
                    println!("              {}", snippet(&result.source, location));
                }
                None => println!("            {}", format!("{}:?", path).dimmed()),
            }
        }

        if let Some(message) = message {
            println!("            {}", html_to_console(&message.text));
        }
        println!();
    }

    if !result.suppressed.is_empty() {
        println!("    {} ({}):", "Suppressed".dimmed(), result.suppressed.len());
        for s in &result.suppressed {
            print!("      {:<40}", s.code.as_str().dimmed());
            match (s.suppression.suppression_type, s.offset) {
                (SuppressionType::File, _) => print!("{}", "(file)".dimmed()),
                (_, Some(offset)) => {
                    print!("{}", format!("line {}", line_of(&result.source, offset)).dimmed())
                }
                (_, None) => {}
            }
            if !s.suppression.reason.is_empty() {
                print!("  {}", format!("reason: {:?}", s.suppression.reason).dimmed());
            }
            println!();
        }
        println!();
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Suggestion => print!("    {} ", "HINT ".blue()),
    }
}

/// Write the rule catalog for `bank`.
pub fn write_catalog(bank: &MessageBank) {
    println!();
    println!("  {} ({}, {} rules):", "Rules".bold(), bank.language(), bank.len());
    println!();
    for code in bank.codes() {
        if let Some(message) = bank.get(code) {
            write_severity_tag(message.severity);
            println!("{}", code.as_str());
        }
    }
    println!();
}

/// Write one code's explanation.
pub fn write_explanation(code: RuleCode, bank: &MessageBank) {
    match bank.get(code) {
        Some(message) => {
            println!();
            write_severity_tag(message.severity);
            println!("{}", code.as_str().bold());
            println!();
            println!("    {}", html_to_console(&message.text));
            println!();
        }
        None => println!("{} has no {} message and is never reported", code, bank.language()),
    }
}
