//! Rule: Convert `set(...)` calls to set displays
//!
//! `set(x for x in y)` becomes the comprehension `{x for x in y}`, and a
//! py2-style `set(a, b)` call with several positional arguments becomes
//! the literal `{a, b}`. A bare `set()` stays: `{}` is a dict.

use pyfix_core::matcher;
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{Arg, Call, Element, Expression, Set, SetComp, Spanned, TokKind, Token};

pub const NAME: &str = "set_literal";
pub const DESCRIPTION: &str = "Convert set(...) calls to {...} set displays";

fn brace(text: &str, leading: impl Into<String>) -> Token {
    Token::with_leading(TokKind::Op, text, leading)
}

pub struct SetLiteral;

impl Rule for SetLiteral {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_call(
        &mut self,
        original: &Call,
        updated: Expression,
        ctx: &mut RunContext,
    ) -> Expression {
        if !matcher::matches(&matcher::call(matcher::name("set")), &updated) {
            return updated;
        }
        let call = match updated {
            Expression::Call(call) => call,
            other => return other,
        };
        let leading = call.func.leading().to_string();
        let Call {
            func,
            lpar,
            mut args,
            rpar,
        } = *call;

        // A sole positional generator argument becomes a comprehension.
        if args.len() == 1 && args[0].star.is_none() && args[0].keyword.is_none() {
            let arg = args.remove(0);
            match arg.value {
                Expression::GeneratorExp(genexp) => {
                    let genexp = *genexp;
                    ctx.mark(NAME, original.span());
                    return Expression::SetComp(Box::new(SetComp {
                        lbrace: brace("{", leading),
                        elt: genexp.elt,
                        for_in: genexp.for_in,
                        rbrace: brace("}", rpar.leading),
                    }));
                }
                value => args.push(Arg {
                    star: arg.star,
                    keyword: arg.keyword,
                    eq: arg.eq,
                    value,
                    comma: arg.comma,
                }),
            }
        }

        // Several plain positional arguments become a literal.
        let plain = args.len() >= 2
            && args
                .iter()
                .all(|arg| arg.star.is_none() && arg.keyword.is_none());
        if !plain {
            return Expression::Call(Box::new(Call {
                func,
                lpar,
                args,
                rpar,
            }));
        }
        ctx.mark(NAME, original.span());
        let elements = args
            .into_iter()
            .map(|arg| Element {
                value: arg.value,
                comma: arg.comma,
            })
            .collect();
        Expression::Set(Set {
            lbrace: brace("{", leading),
            elements,
            rbrace: brace("}", rpar.leading),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(SetLiteral)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_generator_to_comprehension() {
        let (code, count) = apply("s = set(x for x in items)\n");
        assert_eq!(code, "s = {x for x in items}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_generator_with_condition() {
        assert_eq!(
            transform("s = set(x.lower() for x in names if x)\n"),
            "s = {x.lower() for x in names if x}\n"
        );
    }

    #[test]
    fn test_parenthesized_generator() {
        assert_eq!(
            transform("s = set((x for x in items))\n"),
            "s = {x for x in items}\n"
        );
    }

    #[test]
    fn test_multiple_arguments() {
        let (code, count) = apply("s = set(a, b, c)\n");
        assert_eq!(code, "s = {a, b, c}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_trailing_comma_kept() {
        assert_eq!(transform("s = set(a, b,)\n"), "s = {a, b,}\n");
    }

    #[test]
    fn test_empty_call_untouched() {
        let source = "s = set()\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_single_argument_untouched() {
        let source = "s = set(items)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_starred_argument_untouched() {
        let source = "s = set(*groups, extra)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_other_callable_untouched() {
        let source = "s = frozenset(x for x in items)\n";
        assert_eq!(transform(source), source);
    }
}
