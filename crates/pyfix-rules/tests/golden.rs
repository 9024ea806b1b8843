//! Golden-file checks for the rule registry.
//!
//! Each fixture pair holds a Python input and the exact text the rules
//! must produce. `verify` diffs the transformed tree against the expected
//! file, so a failing fixture prints a unified diff.

use pyfix_core::{verify, RuleConfig};
use pyfix_rules::with_defaults;

fn check(rule: &str, input: &str, expected: &str, replacements: usize) {
    let rules = with_defaults().select(&[rule.to_string()]).unwrap();
    let verified = verify(&rules, &RuleConfig::default(), input, expected).unwrap();
    assert!(
        verified.matched,
        "{} diverged from its golden file\n{}",
        rule,
        verified.diff.unwrap_or_default()
    );
    assert_eq!(
        verified.replacements, replacements,
        "{} made the wrong number of replacements",
        rule
    );
}

#[test]
fn test_not_in() {
    check(
        "not_in",
        include_str!("fixtures/input/not_in.py"),
        include_str!("fixtures/expected/not_in.py"),
        1,
    );
}

#[test]
fn test_object_base() {
    check(
        "object_base",
        include_str!("fixtures/input/object_base.py"),
        include_str!("fixtures/expected/object_base.py"),
        3,
    );
}

#[test]
fn test_super_args() {
    check(
        "super_args",
        include_str!("fixtures/input/super_args.py"),
        include_str!("fixtures/expected/super_args.py"),
        2,
    );
}

#[test]
fn test_yield_from() {
    check(
        "yield_from",
        include_str!("fixtures/input/yield_from.py"),
        include_str!("fixtures/expected/yield_from.py"),
        2,
    );
}

#[test]
fn test_oserror_alias() {
    check(
        "oserror_alias",
        include_str!("fixtures/input/oserror_alias.py"),
        include_str!("fixtures/expected/oserror_alias.py"),
        3,
    );
}

#[test]
fn test_float_conversion() {
    check(
        "float_conversion",
        include_str!("fixtures/input/float_conversion.py"),
        include_str!("fixtures/expected/float_conversion.py"),
        6,
    );
}

#[test]
fn test_str_encode() {
    check(
        "str_encode",
        include_str!("fixtures/input/str_encode.py"),
        include_str!("fixtures/expected/str_encode.py"),
        4,
    );
}

#[test]
fn test_dict_literal() {
    check(
        "dict_literal",
        include_str!("fixtures/input/dict_literal.py"),
        include_str!("fixtures/expected/dict_literal.py"),
        3,
    );
}

#[test]
fn test_set_literal() {
    check(
        "set_literal",
        include_str!("fixtures/input/set_literal.py"),
        include_str!("fixtures/expected/set_literal.py"),
        2,
    );
}

#[test]
fn test_dict_comprehension() {
    check(
        "dict_comprehension",
        include_str!("fixtures/input/dict_comprehension.py"),
        include_str!("fixtures/expected/dict_comprehension.py"),
        2,
    );
}

#[test]
fn test_builtins_imports() {
    check(
        "builtins_imports",
        include_str!("fixtures/input/builtins_imports.py"),
        include_str!("fixtures/expected/builtins_imports.py"),
        3,
    );
}

#[test]
fn test_future_imports() {
    check(
        "future_imports",
        include_str!("fixtures/input/future_imports.py"),
        include_str!("fixtures/expected/future_imports.py"),
        2,
    );
}

#[test]
fn test_past_imports() {
    // Detect-only: the fixture must pass through unchanged while still
    // being counted.
    check(
        "past_imports",
        include_str!("fixtures/input/past_imports.py"),
        include_str!("fixtures/expected/past_imports.py"),
        1,
    );
}

#[test]
fn test_batch_runs_every_rule_in_one_pass() {
    let rules = with_defaults();
    let verified = verify(
        &rules,
        &RuleConfig::default(),
        include_str!("fixtures/input/batch.py"),
        include_str!("fixtures/expected/batch.py"),
    )
    .unwrap();
    assert!(
        verified.matched,
        "batch diverged from its golden file\n{}",
        verified.diff.unwrap_or_default()
    );
    assert_eq!(verified.replacements, 10);
}
