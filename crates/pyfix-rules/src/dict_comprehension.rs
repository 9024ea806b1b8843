//! Rule: Convert `dict(... for ...)` calls to dict comprehensions
//!
//! `dict((k, v) for k, v in pairs)` becomes `{k: v for k, v in pairs}`.
//! The generator element must be a two-tuple; anything else keeps the
//! call, since only a pair has an obvious key and value.

use pyfix_core::matcher::{self, Pat};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{
    Arg, Call, DictComp, Element, Expression, GeneratorExp, Spanned, TokKind, Token, Tuple,
};

pub const NAME: &str = "dict_comprehension";
pub const DESCRIPTION: &str = "Convert dict(... for ...) calls to dict comprehensions";

fn pattern() -> Pat {
    matcher::call_args(
        matcher::name("dict"),
        vec![matcher::one(Pat::GeneratorExp {
            elt: Box::new(Pat::Tuple(Some(vec![
                matcher::one(Pat::Any),
                matcher::one(Pat::Any),
            ]))),
        })],
    )
}

fn brace(text: &str, leading: impl Into<String>) -> Token {
    Token::with_leading(TokKind::Op, text, leading)
}

/// Split a two-tuple element into its key and value expressions, handing
/// the expression back unchanged when it is not a plain pair.
fn pair(elt: Expression) -> Result<(Expression, Expression), Expression> {
    let tuple = match elt {
        Expression::Tuple(tuple) => tuple,
        other => return Err(other),
    };
    let [first, second] = match <[Element; 2]>::try_from(tuple.elements) {
        Ok(pair) => pair,
        Err(elements) => {
            return Err(Expression::Tuple(Tuple {
                lpar: tuple.lpar,
                elements,
                rpar: tuple.rpar,
            }))
        }
    };
    if matches!(first.value, Expression::Starred(_)) || matches!(second.value, Expression::Starred(_))
    {
        return Err(Expression::Tuple(Tuple {
            lpar: tuple.lpar,
            elements: vec![first, second],
            rpar: tuple.rpar,
        }));
    }
    Ok((first.value, second.value))
}

pub struct DictComprehension;

impl Rule for DictComprehension {
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
        if !matcher::matches(&pattern(), &updated) {
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

        if args.len() == 1 && args[0].star.is_none() && args[0].keyword.is_none() {
            let arg = args.remove(0);
            match arg.value {
                Expression::GeneratorExp(genexp) => {
                    let GeneratorExp {
                        lpar: genexp_lpar,
                        elt,
                        for_in,
                        rpar: genexp_rpar,
                    } = *genexp;
                    match pair(elt) {
                        Ok((key, mut value)) => {
                            ctx.mark(NAME, original.span());
                            if value.leading().is_empty() {
                                value.set_leading(" ");
                            }
                            return Expression::DictComp(Box::new(DictComp {
                                lbrace: brace("{", leading),
                                key,
                                colon: Token::op(":"),
                                value,
                                for_in,
                                rbrace: brace("}", rpar.leading),
                            }));
                        }
                        Err(elt) => args.push(Arg {
                            star: arg.star,
                            keyword: arg.keyword,
                            eq: arg.eq,
                            value: Expression::GeneratorExp(Box::new(GeneratorExp {
                                lpar: genexp_lpar,
                                elt,
                                for_in,
                                rpar: genexp_rpar,
                            })),
                            comma: arg.comma,
                        }),
                    }
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
        Expression::Call(Box::new(Call {
            func,
            lpar,
            args,
            rpar,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(DictComprehension)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_pair_generator() {
        let (code, count) = apply("d = dict((k, v) for k, v in pairs)\n");
        assert_eq!(code, "d = {k: v for k, v in pairs}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_computed_pair() {
        assert_eq!(
            transform("d = dict((k.lower(), v + 1) for k, v in pairs if v)\n"),
            "d = {k.lower(): v + 1 for k, v in pairs if v}\n"
        );
    }

    #[test]
    fn test_tight_pair_gets_spaced() {
        assert_eq!(
            transform("d = dict((k,v) for k, v in pairs)\n"),
            "d = {k: v for k, v in pairs}\n"
        );
    }

    #[test]
    fn test_parenthesized_generator() {
        assert_eq!(
            transform("d = dict(((k, v) for k, v in pairs))\n"),
            "d = {k: v for k, v in pairs}\n"
        );
    }

    #[test]
    fn test_three_tuple_untouched() {
        let source = "d = dict((a, b, c) for a, b, c in rows)\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_non_tuple_element_untouched() {
        let source = "d = dict(pair for pair in pairs)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_starred_element_untouched() {
        let source = "d = dict((k, *rest) for k, rest in pairs)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_list_argument_untouched() {
        let source = "d = dict([(k, v) for k, v in pairs])\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_other_callable_untouched() {
        let source = "d = OrderedDict((k, v) for k, v in pairs)\n";
        assert_eq!(transform(source), source);
    }
}
