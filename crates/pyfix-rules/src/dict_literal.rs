//! Rule: Convert `dict(...)` keyword calls to dict displays
//!
//! `dict(a=1, b=2)` becomes `{"a": 1, "b": 2}` and `dict()` becomes `{}`.
//! Every argument must be a keyword argument; splats and positional
//! arguments keep the call form.
//!
//! Continuation lines inside the call were indented relative to `dict(`,
//! so all-space indentation after a comma is shortened by the width the
//! rewrite removes: `len("dict")` plus the width of an enclosing keyword
//! argument's `=` and its surrounding spaces.

use pyfix_core::matcher;
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{
    Arg, Call, Dict, DictElement, Expression, SimpleString, Spanned, TokKind, Token,
};

pub const NAME: &str = "dict_literal";
pub const DESCRIPTION: &str = "Convert dict(...) keyword calls to {...} dict displays";

/// Width of a whitespace run made of spaces and tabs only. Runs with
/// newlines or comments do not shift column positions predictably.
fn simple_len(ws: &str) -> usize {
    if ws.bytes().all(|b| b == b' ' || b == b'\t') {
        ws.len()
    } else {
        0
    }
}

/// Rendered width of an argument's `=`, spaces included. Zero for
/// positional arguments.
fn equals_width(arg: &Arg) -> usize {
    match &arg.eq {
        Some(eq) => simple_len(&eq.leading) + 1 + simple_len(arg.value.leading()),
        None => 0,
    }
}

/// Shorten an all-space final line of a multi-line whitespace run by
/// `trim` columns. Anything else passes through untouched, comments
/// included.
fn reanchor(leading: &str, trim: usize) -> String {
    let Some(pos) = leading.rfind('\n') else {
        return leading.to_string();
    };
    let (head, last) = leading.split_at(pos + 1);
    if last.bytes().all(|b| b == b' ') {
        let keep = last.len().saturating_sub(trim);
        return format!("{}{}", head, &last[..keep]);
    }
    leading.to_string()
}

fn quoted_key(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\\\""))
}

#[derive(Default)]
pub struct DictLiteral {
    /// `=` widths of the argument chain enclosing the current node, used
    /// to re-anchor continuation lines of a call sitting in an argument.
    arg_widths: Vec<usize>,
}

impl DictLiteral {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Rule for DictLiteral {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn enter_arg(&mut self, node: &Arg) {
        self.arg_widths.push(equals_width(node));
    }

    fn leave_arg(&mut self, _node: &Arg) {
        self.arg_widths.pop();
    }

    fn leave_call(
        &mut self,
        original: &Call,
        updated: Expression,
        ctx: &mut RunContext,
    ) -> Expression {
        if !matcher::matches(&matcher::call(matcher::name("dict")), &updated) {
            return updated;
        }
        let call = match updated {
            Expression::Call(call) => call,
            other => return other,
        };
        if !call.args.iter().all(|arg| arg.keyword.is_some()) {
            return Expression::Call(call);
        }
        ctx.mark(NAME, original.span());
        let trim = "dict".len() + self.arg_widths.last().copied().unwrap_or(0);
        let leading = call.func.leading().to_string();
        let Call { args, rpar, .. } = *call;
        let elements = args
            .into_iter()
            .filter_map(|arg| {
                let name = arg.keyword?;
                let key = Token::with_leading(
                    TokKind::Str,
                    quoted_key(name.value()),
                    reanchor(&name.tok.leading, trim),
                );
                let mut value = arg.value;
                value.set_leading(" ");
                Some(DictElement::Simple {
                    key: Expression::SimpleString(SimpleString::new(key)),
                    colon: Token::op(":"),
                    value,
                    comma: arg.comma,
                })
            })
            .collect();
        Expression::Dict(Dict {
            lbrace: Token::with_leading(TokKind::Op, "{", leading),
            elements,
            rbrace: Token::with_leading(TokKind::Op, "}", reanchor(&rpar.leading, trim)),
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
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(DictLiteral::new())];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_flat_call() {
        let (code, count) = apply("d = dict(a=1, b=2)\n");
        assert_eq!(code, "d = {\"a\": 1, \"b\": 2}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_empty_call() {
        let (code, count) = apply("d = dict()\n");
        assert_eq!(code, "d = {}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_value_spacing_normalized() {
        assert_eq!(transform("d = dict(a = 1)\n"), "d = {\"a\": 1}\n");
    }

    #[test]
    fn test_positional_untouched() {
        let source = "d = dict(pairs)\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_splat_untouched() {
        let source = "d = dict(**base)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_mixed_splat_untouched() {
        let source = "d = dict(a=1, **rest)\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_aligned_continuation() {
        let (code, count) = apply("d = dict(foo=1,\n         bar=2)\n");
        assert_eq!(code, "d = {\"foo\": 1,\n     \"bar\": 2}\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_enclosing_keyword_alignment() {
        let source = "run(config=dict(foo=1,\n                bar=2))\n";
        assert_eq!(
            transform(source),
            "run(config={\"foo\": 1,\n           \"bar\": 2})\n"
        );
    }

    #[test]
    fn test_spaced_equals_alignment() {
        let source = "run(config = dict(foo=1,\n                  bar=2))\n";
        assert_eq!(
            transform(source),
            "run(config = {\"foo\": 1,\n           \"bar\": 2})\n"
        );
    }

    #[test]
    fn test_trailing_comma_call() {
        let source = "d = dict(\n    a=1,\n    b=2,\n)\n";
        assert_eq!(transform(source), "d = {\n\"a\": 1,\n\"b\": 2,\n}\n");
    }

    #[test]
    fn test_comment_preserved() {
        let source = "d = dict(a=1,  # one\n    b=2)\n";
        assert_eq!(transform(source), "d = {\"a\": 1,  # one\n\"b\": 2}\n");
    }

    #[test]
    fn test_tab_continuation_kept() {
        let source = "d = dict(foo=1,\n\tbar=2)\n";
        assert_eq!(transform(source), "d = {\"foo\": 1,\n\t\"bar\": 2}\n");
    }

    #[test]
    fn test_nested_calls() {
        let (code, count) = apply("d = dict(a=dict(b=1))\n");
        assert_eq!(code, "d = {\"a\": {\"b\": 1}}\n");
        assert_eq!(count, 2);
    }
}
