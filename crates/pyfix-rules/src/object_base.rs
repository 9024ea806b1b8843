//! Rule: Drop the redundant `object` base class
//!
//! `class Foo(object):` and `class Foo(object, Base):` say nothing that
//! `class Foo:` / `class Foo(Base):` do not. Keyword arguments such as
//! `metaclass=` keep the parentheses alive.

use pyfix_core::{Rule, RunContext};
use pyfix_cst::{Arg, ClassDef, Expression, Span};

pub const NAME: &str = "object_base";
pub const DESCRIPTION: &str = "Drop 'object' from class base lists";

fn is_object_base(arg: &Arg) -> bool {
    if arg.star.is_some() || arg.keyword.is_some() {
        return false;
    }
    matches!(&arg.value, Expression::Name(name) if name.value() == "object")
}

pub struct ObjectBase;

impl Rule for ObjectBase {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_class_def(
        &mut self,
        original: &ClassDef,
        mut updated: ClassDef,
        ctx: &mut RunContext,
    ) -> ClassDef {
        if !updated.bases.iter().any(is_object_base) {
            return updated;
        }
        let first_removed = is_object_base(&updated.bases[0]);
        let first_leading = updated.bases[0].first_token().leading.clone();
        let last_had_comma = updated
            .bases
            .last()
            .map(|arg| arg.comma.is_some())
            .unwrap_or(false);
        updated.bases.retain(|arg| !is_object_base(arg));

        if updated.bases.is_empty() {
            updated.lpar = None;
            updated.rpar = None;
        } else {
            if first_removed {
                updated.bases[0].first_token_mut().leading = first_leading;
            }
            if !last_had_comma {
                if let Some(last) = updated.bases.last_mut() {
                    last.comma = None;
                }
            }
        }
        ctx.mark(
            NAME,
            Span {
                start: original.class_tok.start,
                end: original.colon.end(),
            },
        );
        updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(ObjectBase)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_sole_object_base() {
        let (code, count) = apply("class Foo(object):\n    pass\n");
        assert_eq!(code, "class Foo:\n    pass\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_object_before_other_base() {
        assert_eq!(
            transform("class Foo(object, Base):\n    pass\n"),
            "class Foo(Base):\n    pass\n"
        );
    }

    #[test]
    fn test_object_after_other_base() {
        assert_eq!(
            transform("class Foo(Base, object):\n    pass\n"),
            "class Foo(Base):\n    pass\n"
        );
    }

    #[test]
    fn test_trailing_comma_kept() {
        assert_eq!(
            transform("class Foo(Base, object,):\n    pass\n"),
            "class Foo(Base,):\n    pass\n"
        );
    }

    #[test]
    fn test_keyword_argument_keeps_parens() {
        assert_eq!(
            transform("class Foo(object, metaclass=Meta):\n    pass\n"),
            "class Foo(metaclass=Meta):\n    pass\n"
        );
    }

    #[test]
    fn test_plain_class_untouched() {
        let source = "class Foo:\n    pass\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_other_base_untouched() {
        let source = "class Foo(Base):\n    pass\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_object_used_as_keyword_value_untouched() {
        let source = "class Foo(metaclass=object):\n    pass\n";
        assert_eq!(transform(source), source);
    }
}
