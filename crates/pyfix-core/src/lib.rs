//! pyfix-core: Rule engine for lossless Python rewrites
//!
//! This crate provides:
//! - `matcher`: structural patterns over expression trees
//! - `Rule`, `RuleSet`, `RuleConfig`: the rewrite-rule contract and registry
//! - `run_rules`: one batched traversal per file, with counts and records
//! - `check_roundtrip`: the parse-then-render identity guard
//! - `verify`: golden-file comparison with unified diffs

mod engine;
pub mod matcher;
mod report;
mod rule;
mod transform;
mod verify;

pub use engine::{check_roundtrip, run_rules, RunError, RunOutcome};
pub use report::{MatchRecord, RunContext};
pub use rule::{Edit, Rule, RuleConfig, RuleSet, UnknownRule};
pub use transform::transform_module;
pub use verify::{verify, Verified};
