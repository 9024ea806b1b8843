//! Output formatting for pyfix
//!
//! Supports text (colored terminal) and JSON output formats. The per-file
//! text line keeps the classic `{file}: {count} replacements done` shape;
//! verbose mode adds one located record per replacement.

use colored::*;
use pyfix_core::{MatchRecord, RunOutcome};
use serde::Serialize;
use std::path::Path;

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<OutputFormat> {
        match s.to_lowercase().as_str() {
            "text" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// One replacement as it appears in JSON reports
#[derive(Debug, Clone, Serialize)]
pub struct ReplacementInfo {
    pub rule: &'static str,
    pub line: usize,
    pub column: usize,
    pub snippet: String,
}

impl From<&MatchRecord> for ReplacementInfo {
    fn from(record: &MatchRecord) -> Self {
        ReplacementInfo {
            rule: record.rule,
            line: record.line,
            column: record.column,
            snippet: record.snippet.clone(),
        }
    }
}

/// Result of processing a single file
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub path: String,
    pub replacements: usize,
    pub changed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<ReplacementInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileResult {
    pub fn success(path: &Path, outcome: &RunOutcome) -> Self {
        Self {
            path: path.display().to_string(),
            replacements: outcome.total,
            changed: outcome.changed,
            records: outcome.records.iter().map(ReplacementInfo::from).collect(),
            error: None,
        }
    }

    pub fn error(path: &Path, error: String) -> Self {
        Self {
            path: path.display().to_string(),
            replacements: 0,
            changed: false,
            records: Vec::new(),
            error: Some(error),
        }
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct Summary {
    pub files_processed: usize,
    pub files_changed: usize,
    pub replacements: usize,
    pub parse_failures: usize,
    pub errors: usize,
}

/// Full JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub summary: Summary,
    pub files: Vec<FileResult>,
}

/// Reporter for accumulating and outputting results
pub struct Reporter {
    format: OutputFormat,
    verbose: bool,
    results: Vec<FileResult>,
    summary: Summary,
}

impl Reporter {
    pub fn new(format: OutputFormat, verbose: bool) -> Self {
        Self {
            format,
            verbose,
            results: Vec::new(),
            summary: Summary::default(),
        }
    }

    /// Report one processed file
    pub fn report_file(&mut self, path: &Path, outcome: &RunOutcome) {
        self.summary.files_processed += 1;
        if outcome.changed {
            self.summary.files_changed += 1;
        }
        self.summary.replacements += outcome.total;

        if self.format == OutputFormat::Text {
            if outcome.total > 0 || self.verbose {
                println!("{}: {} replacements done", path.display(), outcome.total);
            }
            if self.verbose {
                let filename = path.display().to_string();
                for record in &outcome.records {
                    println!("{}", record.render(&filename));
                }
            }
        }

        self.results.push(FileResult::success(path, outcome));
    }

    /// Report a file that does not parse and was skipped
    pub fn report_parse_failure(&mut self, path: &Path, message: &str, snippet: &str) {
        self.summary.files_processed += 1;
        self.summary.parse_failures += 1;

        if self.format == OutputFormat::Text {
            eprintln!(
                "{}: {} failed parse: {}",
                "Warning".yellow(),
                path.display(),
                message
            );
            for line in snippet.lines() {
                eprintln!("  {}", line);
            }
        }

        self.results
            .push(FileResult::error(path, format!("failed parse: {}", message)));
    }

    /// Report an error processing a file
    pub fn report_error(&mut self, path: &Path, error: &str) {
        self.summary.files_processed += 1;
        self.summary.errors += 1;

        if self.format == OutputFormat::Text {
            eprintln!("{}: {} - {}", "Error".red(), path.display(), error);
        }

        self.results.push(FileResult::error(path, error.to_string()));
    }

    /// Print final summary/output
    pub fn finish(self, fix_mode: bool) {
        match self.format {
            OutputFormat::Text => {
                println!();
                println!("{}", "Summary".bold().underline());
                println!("  Files processed: {}", self.summary.files_processed);
                println!("  Files changed: {}", self.summary.files_changed);
                println!("  Replacements: {}", self.summary.replacements);
                if self.summary.parse_failures > 0 {
                    println!("  Parse failures: {}", self.summary.parse_failures);
                }
                if self.summary.errors > 0 {
                    println!("  Errors: {}", self.summary.errors);
                }

                if !fix_mode && self.summary.files_changed > 0 {
                    println!();
                    println!("{}", "Run with --fix to apply changes".yellow());
                }
            }
            OutputFormat::Json => {
                let output = JsonOutput {
                    version: env!("CARGO_PKG_VERSION").to_string(),
                    summary: self.summary,
                    files: self.results,
                };
                println!("{}", serde_json::to_string_pretty(&output).unwrap());
            }
        }
    }

    /// Get summary for exit code determination
    pub fn summary(&self) -> &Summary {
        &self.summary
    }
}
