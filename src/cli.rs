//! Command-line interface for texcheck.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rayon::prelude::*;
use walkdir::WalkDir;

use crate::config::{self, Config};
use crate::detect::{RuleCode, Runner, Severity};
use crate::messages::{Language, MessageBank};
use crate::report::{self, FileResult};

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Extension of checked files.
const TEX_EXTENSION: &str = "tex";

/// Configuration template written by `init`.
const CONFIG_TEMPLATE: &str = include_str!("templates/default.yaml");

/// Typographic and stylistic linter for LaTeX documents.
///
/// texcheck parses each document into a tree, works out which parts are
/// prose, inline math or displayed math, and reports typographic issues
/// such as wrong dashes, straight quotes, words in formulas or labels
/// nobody references.
#[derive(Parser)]
#[command(name = "texcheck")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check LaTeX files
    #[command(visible_alias = "lint")]
    Check(CheckArgs),
    /// List the rules reported in a language
    Rules(RulesArgs),
    /// Show the explanation of one rule
    Explain(ExplainArgs),
    /// Create a texcheck configuration file
    Init(InitArgs),
}

/// Arguments for the check command.
#[derive(Parser)]
pub struct CheckArgs {
    /// Files or directories to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Report language: en or ru (overrides the config file)
    #[arg(short, long)]
    pub language: Option<Language>,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format: pretty or json
    #[arg(short, long, default_value = "pretty")]
    pub format: String,

    /// Lowest severity that fails the run: error, warning or suggestion
    #[arg(long)]
    pub fail_on: Option<Severity>,

    /// Report unreferenced labels as UNREFERENCED_LABEL
    #[arg(long)]
    pub separate_unreferenced_labels: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Print the annotated document tree instead of checking
    #[arg(long)]
    pub debug_tree: bool,
}

/// Arguments for the rules command.
#[derive(Parser)]
pub struct RulesArgs {
    /// Catalog language: en or ru
    #[arg(short, long, default_value = "en")]
    pub language: Language,
}

/// Arguments for the explain command.
#[derive(Parser)]
pub struct ExplainArgs {
    /// Rule code, e.g. WRONG_QUOTES
    pub code: String,

    /// Explanation language: en or ru
    #[arg(short, long, default_value = "en")]
    pub language: Language,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "texcheck.yaml")]
    pub output: PathBuf,
}

/// Collect `.tex` files under `root`, skipping hidden directories and
/// excluded paths.
fn collect_files(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            // Skip hidden directories
            if e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.') {
                return false;
            }
            !config.is_path_excluded(e.path())
        })
    {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|e| e.to_str()) == Some(TEX_EXTENSION)
        {
            files.push(entry.path().to_path_buf());
        }
    }

    Ok(files)
}

/// Resolve the command-line paths to the list of files to check.
fn resolve_files(paths: &[PathBuf], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("cannot access path {}", path.display()))?;
        if metadata.is_dir() {
            files.extend(collect_files(path, config)?);
        } else if !config.is_path_excluded(path) {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

/// Check one file.
fn check_file(runner: &Runner, path: &Path) -> anyhow::Result<FileResult> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let checked = runner.check(&source);
    log::debug!(
        "{}: {} findings, {} suppressed",
        path.display(),
        checked.report.occurrences(),
        checked.suppressed.len()
    );
    Ok(FileResult {
        path: path.to_path_buf(),
        source,
        report: checked.report,
        suppressed: checked.suppressed,
    })
}

/// Run the check command.
pub fn run_check(args: &CheckArgs) -> anyhow::Result<i32> {
    // Validate format
    if args.format != "pretty" && args.format != "json" {
        eprintln!(
            "Error: invalid format {:?}, must be 'pretty' or 'json'",
            args.format
        );
        return Ok(EXIT_ERROR);
    }

    if args.no_color {
        colored::control::set_override(false);
    }

    let cwd = std::env::current_dir()?;
    let mut config = match Config::load(args.config.as_deref(), &cwd) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid config: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    // Command-line flags win over the config file
    if let Some(language) = args.language {
        config.language = language;
    }
    if let Some(fail_on) = args.fail_on {
        config.fail_on = fail_on;
    }
    if args.separate_unreferenced_labels {
        config.separate_unreferenced_labels = true;
    }

    let files = match resolve_files(&args.paths, &config) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            return Ok(EXIT_ERROR);
        }
    };

    if files.is_empty() {
        eprintln!("Warning: no .tex files to check");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::new(config.message_bank())
        .separate_unreferenced_labels(config.separate_unreferenced_labels);

    if args.debug_tree {
        return debug_tree(&runner, &files);
    }

    log::info!("checking {} files in {}", files.len(), config.language);
    let mut results = files
        .par_iter()
        .map(|path| check_file(&runner, path))
        .collect::<anyhow::Result<Vec<_>>>()?;
    results.sort_by(|a, b| a.path.cmp(&b.path));

    let passed = !report::fails(&results, runner.bank(), config.fail_on);

    match args.format.as_str() {
        "json" => report::write_json(&results, runner.bank(), passed)?,
        _ => report::write_pretty(&results, runner.bank(), passed),
    }

    if passed {
        Ok(EXIT_SUCCESS)
    } else {
        Ok(EXIT_FAILED)
    }
}

/// Print the annotated tree of each file.
fn debug_tree(runner: &Runner, files: &[PathBuf]) -> anyhow::Result<i32> {
    let mut code = EXIT_SUCCESS;
    for path in files {
        let source = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        println!("== {}", path.display());
        match runner.parse(&source) {
            Ok(doc) => print!("{}", doc.dump()),
            Err(e) => {
                eprintln!("Error: {}: {:#}", path.display(), e);
                code = EXIT_FAILED;
            }
        }
    }
    Ok(code)
}

/// Run the rules command.
pub fn run_rules(args: &RulesArgs) -> anyhow::Result<i32> {
    report::write_catalog(MessageBank::builtin(args.language));
    Ok(EXIT_SUCCESS)
}

/// Run the explain command.
pub fn run_explain(args: &ExplainArgs) -> anyhow::Result<i32> {
    let code = match args.code.to_uppercase().parse::<RuleCode>() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Run 'texcheck rules' to see available codes");
            return Ok(EXIT_ERROR);
        }
    };
    report::write_explanation(code, MessageBank::builtin(args.language));
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    // Check if output already exists
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to choose a language and disable rules", args.output.display());
    println!("  2. Run: texcheck check . --config {}", args.output.display());
    if let Some(user) = config::user_config_path() {
        println!();
        println!("A user-wide config can also live at {}", user.display());
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_template_is_valid_config() {
        let config: Config = serde_yaml::from_str(CONFIG_TEMPLATE).unwrap();
        assert!(config::validate(&config).is_ok());
    }

    #[test]
    fn test_collect_files_skips_hidden_and_excluded() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("chapters")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::create_dir_all(root.join("build")).unwrap();
        std::fs::write(root.join("main.tex"), "x").unwrap();
        std::fs::write(root.join("notes.txt"), "x").unwrap();
        std::fs::write(root.join("chapters/one.tex"), "x").unwrap();
        std::fs::write(root.join(".git/two.tex"), "x").unwrap();
        std::fs::write(root.join("build/out.tex"), "x").unwrap();

        let config = Config {
            excluded_paths: vec!["**/build".to_string()],
            ..Default::default()
        };
        let files = resolve_files(&[root.to_path_buf()], &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect();
        assert_eq!(names, vec!["chapters/one.tex", "main.tex"]);
    }

    #[test]
    fn test_resolve_missing_path_fails() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("nope.tex");
        assert!(resolve_files(&[missing], &Config::default()).is_err());
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("cfg/texcheck.yaml");
        let args = InitArgs { output: output.clone() };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        assert!(output.exists());
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }
}
