//! Configuration schema for texcheck.
//!
//! A configuration selects the report language, the failure threshold and
//! which rules and files are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::detect::{RuleCode, Severity};
use crate::messages::{Language, MessageBank};

/// File names looked up in the working directory, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["texcheck.yaml", ".texcheck.yaml"];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub language: Language,
    /// Rule codes that are never reported.
    #[serde(default)]
    pub disabled_rules: Vec<String>,
    /// Glob patterns for paths to skip (e.g. "**/build/**").
    #[serde(default)]
    pub excluded_paths: Vec<String>,
    /// Report unreferenced labels under their own code.
    #[serde(default)]
    pub separate_unreferenced_labels: bool,
    /// Lowest severity that makes a run fail.
    #[serde(default = "default_fail_on")]
    pub fail_on: Severity,
}

fn default_fail_on() -> Severity {
    Severity::Error
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: Language::default(),
            disabled_rules: Vec::new(),
            excluded_paths: Vec::new(),
            separate_unreferenced_labels: false,
            fail_on: default_fail_on(),
        }
    }
}

impl Config {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Load from `explicit`, or from the first discovered config file, or defaults.
    pub fn load(explicit: Option<&Path>, cwd: &Path) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => discover(cwd),
        };
        let config = match path {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                Config::parse_file(&path)?
            }
            None => {
                log::debug!("no config file found, using defaults");
                Config::default()
            }
        };
        validate(&config)?;
        Ok(config)
    }

    /// Disabled codes. Unknown entries are skipped; `validate` rejects them.
    pub fn disabled_codes(&self) -> Vec<RuleCode> {
        self.disabled_rules
            .iter()
            .filter_map(|name| RuleCode::parse(name.trim()))
            .collect()
    }

    /// The built-in bank for `language` minus the disabled codes.
    pub fn message_bank(&self) -> MessageBank {
        MessageBank::builtin(self.language).without(&self.disabled_codes())
    }

    /// Check if a path should be excluded based on excluded_paths patterns.
    pub fn is_path_excluded(&self, path: &Path) -> bool {
        if self.excluded_paths.is_empty() {
            return false;
        }

        let path_str = path.to_string_lossy();

        for pattern in &self.excluded_paths {
            if let Ok(glob) = globset::Glob::new(pattern) {
                if glob.compile_matcher().is_match(&*path_str) {
                    return true;
                }
            }
        }
        false
    }
}

/// First config file in `cwd`, else the one in the user config directory.
pub fn discover(cwd: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| cwd.join(name))
        .find(|p| p.is_file())
        .or_else(|| user_config_path().filter(|p| p.is_file()))
}

/// `texcheck.yaml` inside the platform config directory.
pub fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "texcheck")
        .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAMES[0]))
}

/// Validate a configuration for correctness.
pub fn validate(config: &Config) -> anyhow::Result<()> {
    for name in &config.disabled_rules {
        if RuleCode::parse(name.trim()).is_none() {
            anyhow::bail!("unknown rule code {:?} in disabled_rules", name);
        }
    }

    for pattern in &config.excluded_paths {
        globset::Glob::new(pattern)
            .map_err(|e| anyhow::anyhow!("invalid excluded_paths pattern {:?}: {}", pattern, e))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_config() {
        let yaml = r#"
language: ru
disabled_rules:
  - WRONG_QUOTES
excluded_paths:
  - "**/build/**"
fail_on: warning
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.language, Language::Ru);
        assert_eq!(config.disabled_codes(), vec![RuleCode::WrongQuotes]);
        assert_eq!(config.fail_on, Severity::Warning);
        assert!(!config.separate_unreferenced_labels);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.language, Language::En);
        assert_eq!(config.fail_on, Severity::Error);
        assert!(config.disabled_rules.is_empty());
    }

    #[test]
    fn test_validate_rejects_unknown_codes_and_globs() {
        let config = Config {
            disabled_rules: vec!["NO_SUCH_RULE".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());

        let config = Config {
            excluded_paths: vec!["[".to_string()],
            ..Default::default()
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_message_bank_drops_disabled() {
        let config = Config {
            disabled_rules: vec!["CENTERING".to_string()],
            ..Default::default()
        };
        let bank = config.message_bank();
        assert!(!bank.contains(RuleCode::Centering));
        assert!(bank.contains(RuleCode::WrongQuotes));
    }

    #[test]
    fn test_is_path_excluded() {
        let config = Config {
            excluded_paths: vec!["**/build/**".to_string()],
            ..Default::default()
        };
        assert!(config.is_path_excluded(Path::new("paper/build/out.tex")));
        assert!(!config.is_path_excluded(Path::new("paper/main.tex")));
    }

    #[test]
    fn test_load_discovers_working_directory_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(".texcheck.yaml"), "language: ru\n").unwrap();
        let config = Config::load(None, temp.path()).unwrap();
        assert_eq!(config.language, Language::Ru);
    }

    #[test]
    fn test_load_explicit_invalid_file_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("bad.yaml");
        fs::write(&path, "disabled_rules: [NOPE]\n").unwrap();
        assert!(Config::load(Some(&path), temp.path()).is_err());
    }
}
