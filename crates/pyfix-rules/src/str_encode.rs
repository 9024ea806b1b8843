//! Rule: Simplify `.encode("utf-8")` on string literals
//!
//! An ASCII-only literal encodes to exactly its own bytes, so the call
//! becomes a bytes literal with the original quotes. A non-ASCII literal
//! keeps the call but drops an explicit default-encoding argument. Only
//! the exact default spelling `utf-8` fires; any other encoding is
//! someone's deliberate choice.

use pyfix_core::matcher::{self, zero_or_one, Pat};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{Call, Expression, SimpleString, Spanned};

pub const NAME: &str = "str_encode";
pub const DESCRIPTION: &str = "Turn '\"abc\".encode(\"utf-8\")' into 'b\"abc\"'";

const DEFAULT_ENCODING: &str = "utf-8";

fn pattern() -> Pat {
    matcher::call_args(
        matcher::attr(Pat::Str, "encode"),
        vec![zero_or_one(Pat::Str)],
    )
}

/// The encoding argument's decoded value, or the default when absent.
/// `None` means the argument is not a plain positional literal we can
/// read.
fn encoding_argument(call: &Call) -> Option<String> {
    let Some(arg) = call.args.first() else {
        return Some(DEFAULT_ENCODING.to_string());
    };
    if arg.star.is_some() || arg.keyword.is_some() {
        return None;
    }
    match &arg.value {
        Expression::SimpleString(literal) => literal.evaluated_value(),
        _ => None,
    }
}

/// The literal rebuilt as a bytes literal: `b` appended to the prefix,
/// quotes and raw content preserved. A py2-era `u` prefix is dropped
/// since `ub` is not a valid prefix.
fn as_bytes_literal(literal: &SimpleString) -> String {
    let prefix: String = literal
        .prefix()
        .chars()
        .filter(|c| !matches!(c, 'u' | 'U'))
        .collect();
    format!(
        "{}b{}{}{}",
        prefix,
        literal.quote(),
        literal.raw_value(),
        literal.quote()
    )
}

pub struct StrEncode;

impl Rule for StrEncode {
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
        let mut call = match updated {
            Expression::Call(call) => call,
            other => return other,
        };
        let literal = match &call.func {
            Expression::Attribute(attribute) => match &attribute.value {
                Expression::SimpleString(literal) => literal.clone(),
                _ => return Expression::Call(call),
            },
            _ => return Expression::Call(call),
        };
        if literal.is_bytes() || literal.is_fstring() {
            return Expression::Call(call);
        }
        let Some(encoding) = encoding_argument(&call) else {
            return Expression::Call(call);
        };
        if encoding != DEFAULT_ENCODING {
            return Expression::Call(call);
        }
        let Some(value) = literal.evaluated_value() else {
            return Expression::Call(call);
        };

        if value.is_ascii() {
            ctx.mark(NAME, original.span());
            let mut bytes = SimpleString::detached(as_bytes_literal(&literal));
            bytes.tok.leading = literal.tok.leading.clone();
            return Expression::SimpleString(bytes);
        }
        if !call.args.is_empty() {
            // Spelling out the default encoding is the only redundancy
            // left for a non-ASCII literal.
            ctx.mark(NAME, original.span());
            call.args.clear();
            return Expression::Call(call);
        }
        Expression::Call(call)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(StrEncode)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_ascii_with_explicit_encoding() {
        let (code, count) = apply("x = \"abc\".encode(\"utf-8\")\n");
        assert_eq!(code, "x = b\"abc\"\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_ascii_with_default_encoding() {
        assert_eq!(transform("x = 'abc'.encode()\n"), "x = b'abc'\n");
    }

    #[test]
    fn test_raw_string_keeps_prefix() {
        assert_eq!(
            transform("x = r\"a\\nb\".encode(\"utf-8\")\n"),
            "x = rb\"a\\nb\"\n"
        );
    }

    #[test]
    fn test_escaped_ascii_string() {
        assert_eq!(
            transform("x = \"tab\\there\".encode()\n"),
            "x = b\"tab\\there\"\n"
        );
    }

    #[test]
    fn test_non_ascii_drops_redundant_argument() {
        let (code, count) = apply("x = \"h\\xe9llo\".encode(\"utf-8\")\n");
        assert_eq!(code, "x = \"h\\xe9llo\".encode()\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_non_ascii_without_argument_untouched() {
        let source = "x = \"h\\xe9llo\".encode()\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_other_encoding_untouched() {
        let source = "x = \"abc\".encode(\"latin-1\")\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_uppercase_spelling_untouched() {
        let source = "x = \"abc\".encode(\"UTF-8\")\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_fstring_untouched() {
        let source = "x = f\"{v}\".encode(\"utf-8\")\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_bytes_literal_untouched() {
        let source = "x = b\"abc\".decode().encode()\n";
        let decoded = transform(source);
        assert_eq!(decoded, source);
    }

    #[test]
    fn test_encode_on_name_untouched() {
        let source = "x = value.encode(\"utf-8\")\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_keyword_argument_untouched() {
        let source = "x = \"abc\".encode(encoding=\"utf-8\")\n";
        assert_eq!(transform(source), source);
    }
}
