//! Rule: Convert `not x in y` to `x not in y`
//!
//! Only a `not` applied directly to a single `in` comparison is rewritten.
//! Chained comparisons, boolean operands, and explicitly parenthesized
//! operands are left alone because flipping the operator there would change
//! evaluation.

use pyfix_core::matcher::{self, CompKind, Pat};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{
    ComparisonTarget, CompOp, Expression, Spanned, TokKind, Token, UnaryOperation,
};

pub const NAME: &str = "not_in";
pub const DESCRIPTION: &str = "Convert 'not x in y' to 'x not in y'";

fn pattern() -> Pat {
    Pat::Not(Box::new(Pat::Comparison(CompKind::In)))
}

pub struct NotIn;

impl Rule for NotIn {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_unary_operation(
        &mut self,
        original: &UnaryOperation,
        updated: Expression,
        ctx: &mut RunContext,
    ) -> Expression {
        if !matcher::matches(&pattern(), &updated) {
            return updated;
        }
        let unary = match updated {
            Expression::UnaryOperation(unary) => *unary,
            other => return other,
        };
        let not_leading = unary.op.token().leading.clone();
        let mut comparison = match unary.expr {
            Expression::Comparison(comparison) => comparison,
            other => {
                return Expression::UnaryOperation(Box::new(UnaryOperation {
                    op: unary.op,
                    expr: other,
                }))
            }
        };
        let target = match comparison.comparisons.pop() {
            Some(ComparisonTarget {
                operator: CompOp::In(in_tok),
                comparator,
            }) => ComparisonTarget {
                operator: CompOp::NotIn {
                    not_tok: Token::with_leading(TokKind::Name, "not", " "),
                    in_tok,
                },
                comparator,
            },
            Some(other) => {
                comparison.comparisons.push(other);
                return Expression::UnaryOperation(Box::new(UnaryOperation {
                    op: unary.op,
                    expr: Expression::Comparison(comparison),
                }));
            }
            None => {
                return Expression::UnaryOperation(Box::new(UnaryOperation {
                    op: unary.op,
                    expr: Expression::Comparison(comparison),
                }))
            }
        };
        comparison.comparisons.push(target);
        ctx.mark(NAME, original.span());
        let mut result = Expression::Comparison(comparison);
        result.set_leading(not_leading);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(NotIn)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_simple_not_in() {
        let (code, count) = apply("x = not a in b\n");
        assert_eq!(code, "x = a not in b\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_not_in_condition() {
        assert_eq!(
            transform("if not key in mapping:\n    pass\n"),
            "if key not in mapping:\n    pass\n"
        );
    }

    #[test]
    fn test_keeps_comment_before_not() {
        assert_eq!(
            transform("x = (  # check\n    not a in b)\n"),
            "x = (  # check\n    a not in b)\n"
        );
    }

    #[test]
    fn test_parenthesized_operand_untouched() {
        let source = "x = not (a in b or c)\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_chained_comparison_untouched() {
        let source = "x = not a in b in c\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_other_comparison_untouched() {
        let source = "x = not a == b\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_already_not_in_untouched() {
        let source = "x = a not in b\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_two_occurrences() {
        let (code, count) = apply("a = not x in y\nb = not u in v\n");
        assert_eq!(code, "a = x not in y\nb = u not in v\n");
        assert_eq!(count, 2);
    }
}
