//! pyfix CLI - Python modernization tool
//!
//! Rewrites Python 2 era constructs into their modern spellings while
//! preserving every byte of formatting the rules do not touch. The default
//! mode only reports; `--fix` writes changes back. The exit code is the
//! number of replacements (clamped to 255), so CI can gate on "no legacy
//! constructs left".

mod config;
mod files;
mod output;
mod process;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::*;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use config::Config;
use output::{OutputFormat, Reporter};
use process::{process_file, write_file, Options, Processed};
use pyfix_core::{verify, RuleConfig, RuleSet, UnknownRule};

#[derive(Parser)]
#[command(name = "pyfix")]
#[command(version)]
#[command(about = "Modernize Python sources without touching their formatting")]
struct Cli {
    /// Files or directories (recursive) containing Python files to process
    #[arg(required_unless_present = "list_rules")]
    paths: Vec<PathBuf>,

    /// Write changes back to the files (default is report-only)
    #[arg(long)]
    fix: bool,

    /// Rules to run (can be specified multiple times). Overrides config file.
    #[arg(long, short = 'r', value_name = "RULE")]
    rule: Vec<String>,

    /// __future__ features whose imports must be kept (can be repeated)
    #[arg(long, value_name = "FEATURE")]
    allow: Vec<String>,

    /// Path prefixes to skip (can be repeated)
    #[arg(long, value_name = "PREFIX")]
    ignore: Vec<String>,

    /// Show verbose output
    #[arg(long, short = 'v')]
    verbose: bool,

    /// Output format: text, json
    #[arg(long, value_name = "FORMAT", default_value = "text")]
    format: String,

    /// Shorthand for --format json
    #[arg(long, conflicts_with = "format")]
    json: bool,

    /// Golden-file mode: rewrite the first path, compare against the second
    #[arg(long)]
    test: bool,

    /// Write the parsed tree of each file to <file>.cst.before
    #[arg(long)]
    before: bool,

    /// Write the rewritten tree of each file to <file>.cst.after
    #[arg(long)]
    after: bool,

    /// Path to config file (default: auto-detect .pyfix.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Ignore config files
    #[arg(long)]
    no_config: bool,

    /// List available rules and exit
    #[arg(long)]
    list_rules: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {:#}", "Error".red(), e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let registry = pyfix_rules::with_defaults();

    if cli.list_rules {
        println!("{}", "Available rules:".bold());
        for (name, description) in registry.list() {
            println!("  {} - {}", name.green(), description);
        }
        return Ok(ExitCode::SUCCESS);
    }

    let output_format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::from_str(&cli.format).ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid output format '{}'. Valid options: text, json",
                cli.format
            )
        })?
    };

    let config = if cli.no_config {
        Config::default()
    } else if let Some(config_path) = &cli.config {
        let cfg = Config::load_path(config_path)?;
        if cli.verbose && output_format == OutputFormat::Text {
            println!("{}: {}", "Using config".bold(), config_path.display());
        }
        cfg
    } else {
        match Config::load()? {
            Some((cfg, path)) => {
                if cli.verbose && output_format == OutputFormat::Text {
                    println!("{}: {}", "Using config".bold(), path.display());
                }
                cfg
            }
            None => Config::default(),
        }
    };

    let rules = if cli.rule.is_empty() {
        match config.apply_rules(registry) {
            Ok(rules) => rules,
            Err(UnknownRule(name)) => {
                bail!(
                    "Unknown rule '{}' in config. Use --list-rules to see available rules.",
                    name
                )
            }
        }
    } else {
        match registry.select(&cli.rule) {
            Ok(rules) => rules,
            Err(UnknownRule(name)) => {
                eprintln!(
                    "{}: Unknown rule '{}'. Use --list-rules to see available rules.",
                    "Error".red(),
                    name
                );
                return Ok(ExitCode::from(1));
            }
        }
    };

    if rules.is_empty() {
        eprintln!("{}: No rules enabled", "Error".red());
        return Ok(ExitCode::from(1));
    }

    let mut allow_future = config.future.allow.clone();
    allow_future.extend(cli.allow.iter().cloned());
    let rule_config = RuleConfig { allow_future };

    if cli.test {
        return run_test(&cli.paths, &rules, &rule_config);
    }

    if cli.verbose && output_format == OutputFormat::Text {
        println!(
            "{}: {}",
            "Mode".bold(),
            if cli.fix { "fix" } else { "check" }
        );
        println!("{}: {}", "Rules".bold(), rules.names().join(", "));
        println!();
    }

    let (file_paths, missing_paths) = files::collect(&cli.paths, &cli.ignore, &config);

    let options = Options {
        before: cli.before,
        after: cli.after,
    };

    // Process files in parallel, then report in path order.
    let results: Vec<Result<Processed>> = file_paths
        .par_iter()
        .map(|path| process_file(path, &rules, &rule_config, options))
        .collect();

    let mut sorted_results: Vec<_> = results.into_iter().zip(file_paths.iter()).collect();
    sorted_results.sort_by(|a, b| a.1.cmp(b.1));

    let mut reporter = Reporter::new(output_format, cli.verbose);

    for path in &missing_paths {
        if output_format == OutputFormat::Text {
            eprintln!(
                "{}: Path does not exist: {}",
                "Warning".yellow(),
                path.display()
            );
        }
    }

    for (result, path) in sorted_results {
        report_result(path, result, cli.fix, &mut reporter);
    }

    let summary = reporter.summary();
    let exit_code = if summary.errors > 0 {
        ExitCode::from(1)
    } else {
        ExitCode::from(summary.replacements.min(255) as u8)
    };

    reporter.finish(cli.fix);

    Ok(exit_code)
}

/// Report one file's result, writing the rewrite back in fix mode
fn report_result(path: &Path, result: Result<Processed>, fix_mode: bool, reporter: &mut Reporter) {
    match result {
        Ok(Processed::Done(outcome)) => {
            if fix_mode && outcome.changed {
                if let Err(e) = write_file(path, &outcome.code) {
                    reporter.report_error(path, &format!("{:#}", e));
                    return;
                }
            }
            reporter.report_file(path, &outcome);
        }
        Ok(Processed::ParseFailed { message, snippet }) => {
            reporter.report_parse_failure(path, &message, &snippet);
        }
        Err(e) => {
            reporter.report_error(path, &format!("{:#}", e));
        }
    }
}

/// Golden-file mode: the transformed input must match the expected file
/// byte for byte
fn run_test(paths: &[PathBuf], rules: &RuleSet, config: &RuleConfig) -> Result<ExitCode> {
    let [input_path, expected_path] = paths else {
        bail!("--test takes exactly two paths: an input file and the expected output");
    };

    let input = std::fs::read_to_string(input_path)
        .with_context(|| format!("Failed to read {}", input_path.display()))?;
    let expected = std::fs::read_to_string(expected_path)
        .with_context(|| format!("Failed to read {}", expected_path.display()))?;

    let verified = verify(rules, config, &input, &expected)?;
    if verified.matched {
        println!(
            "{}: contents identical ({} replacements)",
            "ok".green(),
            verified.replacements
        );
        Ok(ExitCode::SUCCESS)
    } else {
        if let Some(diff) = &verified.diff {
            eprint!("{}", diff);
        }
        eprintln!("{}: contents differ", "failed".red());
        Ok(ExitCode::from(1))
    }
}
