//! Per-file processing
//!
//! Reads a file and runs the rule set over it. The rewritten source is
//! handed back, never written here; write-back is the caller's decision,
//! made after results are collected. The only writes are the optional
//! tree dumps used to inspect a rewrite.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use pyfix_core::{run_rules, RuleConfig, RuleSet, RunOutcome};
use pyfix_cst::parse_module;

/// Flags controlling one file's processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// Dump the parsed tree to `<file>.cst.before`.
    pub before: bool,
    /// Dump the rewritten tree to `<file>.cst.after`.
    pub after: bool,
}

/// What processing one file produced.
#[derive(Debug)]
pub enum Processed {
    /// The file parsed and the rules ran over it.
    Done(RunOutcome),
    /// The file does not parse and was skipped.
    ParseFailed { message: String, snippet: String },
}

/// Read `path` and run `rules` over its contents.
pub fn process_file(
    path: &Path,
    rules: &RuleSet,
    config: &RuleConfig,
    options: Options,
) -> Result<Processed> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if options.before {
        if let Ok(module) = parse_module(&source) {
            write_file(&dump_path(path, ".cst.before"), &format!("{:#?}\n", module))?;
        }
    }

    let filename = path.display().to_string();
    let outcome = match run_rules(rules, config, &filename, &source) {
        Ok(outcome) => outcome,
        Err(err) => {
            let parse = err.parse_error();
            return Ok(Processed::ParseFailed {
                message: parse.to_string(),
                snippet: parse.snippet(&source),
            });
        }
    };

    if options.after {
        if let Ok(module) = parse_module(&outcome.code) {
            write_file(&dump_path(path, ".cst.after"), &format!("{:#?}\n", module))?;
        }
    }

    Ok(Processed::Done(outcome))
}

/// Write `content` to `path`.
pub fn write_file(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

fn dump_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
