//! Golden-file verification
//!
//! Runs the rule set over an input and compares the result against an
//! expected output byte for byte. Mismatches come back as a unified diff
//! so a failing fixture reads like a failing test.

use similar::TextDiff;

use crate::engine::{run_rules, RunError};
use crate::rule::{RuleConfig, RuleSet};

/// Outcome of one golden-file comparison.
#[derive(Debug)]
pub struct Verified {
    /// Whether the transformed input equals the expected text exactly.
    pub matched: bool,
    /// Replacements the run made, whether or not the output matched.
    pub replacements: usize,
    /// Unified diff of expected versus actual on mismatch.
    pub diff: Option<String>,
}

/// Transform `input` and compare against `expected`.
pub fn verify(
    rules: &RuleSet,
    config: &RuleConfig,
    input: &str,
    expected: &str,
) -> Result<Verified, RunError> {
    let outcome = run_rules(rules, config, "<input>", input)?;
    if outcome.code == expected {
        return Ok(Verified {
            matched: true,
            replacements: outcome.total,
            diff: None,
        });
    }
    let text_diff = TextDiff::from_lines(expected, outcome.code.as_str());
    let diff = text_diff
        .unified_diff()
        .context_radius(3)
        .header("expected", "actual")
        .to_string();
    Ok(Verified {
        matched: false,
        replacements: outcome.total,
        diff: Some(diff),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RunContext;
    use crate::rule::Rule;
    use pyfix_cst::{Call, Expression, Spanned};

    struct RenameOld;

    impl Rule for RenameOld {
        fn name(&self) -> &'static str {
            "rename_old"
        }

        fn description(&self) -> &'static str {
            "renames old() to new()"
        }

        fn leave_call(
            &mut self,
            original: &Call,
            updated: Expression,
            ctx: &mut RunContext,
        ) -> Expression {
            match updated {
                Expression::Call(mut call) => {
                    let hit = matches!(&call.func, Expression::Name(name) if name.value() == "old");
                    if hit {
                        if let Expression::Name(name) = &mut call.func {
                            name.tok.text = "new".to_string();
                        }
                        ctx.mark("rename_old", original.span());
                    }
                    Expression::Call(call)
                }
                other => other,
            }
        }
    }

    fn ruleset() -> RuleSet {
        let mut rules = RuleSet::new();
        rules.add("rename_old", "renames old() to new()", |_| Box::new(RenameOld));
        rules
    }

    #[test]
    fn test_matching_golden_file() {
        let verified = verify(
            &ruleset(),
            &RuleConfig::default(),
            "x = old()\n",
            "x = new()\n",
        )
        .unwrap();
        assert!(verified.matched);
        assert_eq!(verified.replacements, 1);
        assert!(verified.diff.is_none());
    }

    #[test]
    fn test_mismatch_produces_unified_diff() {
        let verified = verify(
            &ruleset(),
            &RuleConfig::default(),
            "x = old()\n",
            "x = brand_new()\n",
        )
        .unwrap();
        assert!(!verified.matched);
        let diff = verified.diff.unwrap();
        assert!(diff.contains("--- expected"));
        assert!(diff.contains("+++ actual"));
        assert!(diff.contains("-x = brand_new()"));
        assert!(diff.contains("+x = new()"));
    }

    #[test]
    fn test_expected_identity_fixture() {
        // A fixture asserting nothing changes.
        let source = "y = untouched()\n";
        let verified = verify(&ruleset(), &RuleConfig::default(), source, source).unwrap();
        assert!(verified.matched);
        assert_eq!(verified.replacements, 0);
    }
}
