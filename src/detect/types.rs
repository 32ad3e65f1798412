//! Core types for detection results.

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use super::RuleCode;

/// Severity levels for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Suggestion,
    Warning,
    Error,
}

impl Severity {
    /// Maps the numeric levels used by message banks: 0 error, 5 warning, 10 suggestion.
    pub fn from_level(level: u8) -> Self {
        match level {
            0..=4 => Severity::Error,
            5..=9 => Severity::Warning,
            _ => Severity::Suggestion,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Suggestion => write!(f, "suggestion"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "suggestion" | "info" => Ok(Severity::Suggestion),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// Findings of one document: rule code to offsets, both in discovery order.
///
/// No deduplication happens; an offset is `None` when no node on the path
/// back to the document start carries one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    entries: Vec<(RuleCode, Vec<Option<usize>>)>,
}

impl Report {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one occurrence of `code`.
    pub fn record(&mut self, code: RuleCode, offset: Option<usize>) {
        match self.entries.iter_mut().find(|(c, _)| *c == code) {
            Some((_, offsets)) => offsets.push(offset),
            None => self.entries.push((code, vec![offset])),
        }
    }

    /// Merge another report, keeping this report's code order first.
    pub fn merge(&mut self, other: Report) {
        for (code, offsets) in other.entries {
            for offset in offsets {
                self.record(code, offset);
            }
        }
    }

    pub fn get(&self, code: RuleCode) -> Option<&[Option<usize>]> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, offsets)| offsets.as_slice())
    }

    pub fn contains(&self, code: RuleCode) -> bool {
        self.get(code).is_some()
    }

    /// Codes in discovery order.
    pub fn codes(&self) -> impl Iterator<Item = RuleCode> + '_ {
        self.entries.iter().map(|(c, _)| *c)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleCode, &[Option<usize>])> + '_ {
        self.entries.iter().map(|(c, o)| (*c, o.as_slice()))
    }

    /// Number of distinct codes.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of occurrences across all codes.
    pub fn occurrences(&self) -> usize {
        self.entries.iter().map(|(_, o)| o.len()).sum()
    }

    /// Keep only occurrences for which `keep` returns true; codes left
    /// without occurrences are dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(RuleCode, Option<usize>) -> bool) {
        for (code, offsets) in &mut self.entries {
            let code = *code;
            offsets.retain(|o| keep(code, *o));
        }
        self.entries.retain(|(_, offsets)| !offsets.is_empty());
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (code, offsets) in &self.entries {
            map.serialize_entry(code.as_str(), offsets)?;
        }
        map.end()
    }
}
