//! Per-file rewrite pipeline
//!
//! Parses, runs the rule set in one traversal, and renders. When no rule
//! changed the tree, the original text is returned verbatim so an
//! untouched file can never be rewritten byte by byte.

use pyfix_cst::{parse_module, ParseError};
use thiserror::Error;

use crate::report::{MatchRecord, RunContext};
use crate::rule::{RuleConfig, RuleSet};
use crate::transform::transform_module;

/// Failure to process one file.
#[derive(Error, Debug)]
pub enum RunError {
    #[error("{filename}: {source}")]
    Parse {
        filename: String,
        #[source]
        source: ParseError,
    },
}

impl RunError {
    /// The underlying parse error, for callers that render their own
    /// diagnostics.
    pub fn parse_error(&self) -> &ParseError {
        match self {
            RunError::Parse { source, .. } => source,
        }
    }
}

/// Result of running the rule set over one file.
#[derive(Debug)]
pub struct RunOutcome {
    /// The rewritten source. Equal to the input when nothing matched.
    pub code: String,
    /// Whether any rule changed the tree.
    pub changed: bool,
    /// Total replacements across all rules.
    pub total: usize,
    /// Per-rule replacement counts in registration order, zeros included.
    pub per_rule: Vec<(&'static str, usize)>,
    /// Every replacement, located against the original source.
    pub records: Vec<MatchRecord>,
}

/// Parse `source`, run every rule in `rules` over it once, and render.
///
/// Rule instances are built fresh for this file, so rule state from other
/// files never bleeds in.
pub fn run_rules(
    rules: &RuleSet,
    config: &RuleConfig,
    filename: &str,
    source: &str,
) -> Result<RunOutcome, RunError> {
    let module = parse_module(source).map_err(|err| RunError::Parse {
        filename: filename.to_string(),
        source: err,
    })?;
    let original = module.clone();
    let mut instances = rules.build(config);
    let names: Vec<&'static str> = instances.iter().map(|rule| rule.name()).collect();
    let mut ctx = RunContext::new(filename, source, &names);
    let transformed = transform_module(module, &mut instances, &mut ctx);
    let changed = transformed != original;
    let code = if changed {
        transformed.code()
    } else {
        source.to_string()
    };
    let total = ctx.total();
    let (per_rule, records) = ctx.finish();
    Ok(RunOutcome {
        code,
        changed,
        total,
        per_rule,
        records,
    })
}

/// Parse `source` and check that rendering it unchanged reproduces the
/// input byte for byte.
pub fn check_roundtrip(source: &str) -> Result<bool, ParseError> {
    Ok(parse_module(source)?.code() == source)
}
