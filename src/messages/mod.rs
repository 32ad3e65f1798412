//! Message banks: per-language explanation and severity for each rule code.
//!
//! A code missing from the active bank is never reported. Disabling a rule is
//! therefore done by removing its entry with [`MessageBank::without`].

use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::detect::{RuleCode, Severity};

/// Report language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ru,
}

impl Language {
    pub const ALL: &'static [Language] = &[Language::En, Language::Ru];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ru => "ru",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ru" => Ok(Language::Ru),
            _ => Err(format!("unknown language: {} (expected en or ru)", s)),
        }
    }
}

/// Explanation attached to a rule code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// Explanation with light HTML markup.
    pub text: String,
    pub severity: Severity,
}

/// On-disk shape of a bank entry.
#[derive(Debug, Deserialize)]
struct BankEntry {
    msg: String,
    #[serde(default)]
    severity: u8,
}

/// Lookup from rule code to message for one language.
#[derive(Debug, Clone)]
pub struct MessageBank {
    language: Language,
    messages: HashMap<RuleCode, Message>,
}

static ENGLISH: Lazy<MessageBank> = Lazy::new(|| {
    MessageBank::from_yaml(Language::En, include_str!("en.yaml"))
        .expect("embedded English message bank is valid")
});

static RUSSIAN: Lazy<MessageBank> = Lazy::new(|| {
    MessageBank::from_yaml(Language::Ru, include_str!("ru.yaml"))
        .expect("embedded Russian message bank is valid")
});

impl MessageBank {
    /// The bank shipped with the crate.
    pub fn builtin(language: Language) -> &'static MessageBank {
        match language {
            Language::En => &ENGLISH,
            Language::Ru => &RUSSIAN,
        }
    }

    /// Parse a bank from YAML. Unknown codes are skipped with a warning.
    pub fn from_yaml(language: Language, yaml: &str) -> anyhow::Result<Self> {
        let raw: HashMap<String, BankEntry> = serde_yaml::from_str(yaml)?;
        let mut messages = HashMap::with_capacity(raw.len());

        for (code, entry) in raw {
            match RuleCode::parse(&code) {
                Some(rule) => {
                    messages.insert(
                        rule,
                        Message {
                            text: entry.msg,
                            severity: Severity::from_level(entry.severity),
                        },
                    );
                }
                None => log::warn!("ignoring unknown rule code {} in {} message bank", code, language),
            }
        }

        Ok(Self { language, messages })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn contains(&self, code: RuleCode) -> bool {
        self.messages.contains_key(&code)
    }

    pub fn get(&self, code: RuleCode) -> Option<&Message> {
        self.messages.get(&code)
    }

    pub fn severity(&self, code: RuleCode) -> Option<Severity> {
        self.get(code).map(|m| m.severity)
    }

    /// A copy with `codes` removed, which suppresses them.
    pub fn without(&self, codes: &[RuleCode]) -> MessageBank {
        let mut bank = self.clone();
        for code in codes {
            bank.messages.remove(code);
        }
        bank
    }

    /// Codes present in this bank, in catalog order.
    pub fn codes(&self) -> impl Iterator<Item = RuleCode> + '_ {
        RuleCode::ALL.iter().copied().filter(move |c| self.contains(*c))
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
