//! Rule: Convert `super(Klass, self)` to `super()`
//!
//! Fires only for the innermost enclosing class, so `super(Other, self)`
//! calls that deliberately name a different class keep their arguments.

use pyfix_core::matcher::{self, one};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{Call, ClassDef, Expression, Spanned};

pub const NAME: &str = "super_args";
pub const DESCRIPTION: &str = "Convert 'super(Klass, self)' to 'super()'";

#[derive(Default)]
pub struct SuperArgs {
    class_stack: Vec<String>,
}

impl SuperArgs {
    pub fn new() -> Self {
        SuperArgs::default()
    }
}

impl Rule for SuperArgs {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn enter_class_def(&mut self, node: &ClassDef) {
        self.class_stack.push(node.name.value().to_string());
    }

    fn leave_class_def(
        &mut self,
        _original: &ClassDef,
        updated: ClassDef,
        _ctx: &mut RunContext,
    ) -> ClassDef {
        self.class_stack.pop();
        updated
    }

    fn leave_call(
        &mut self,
        original: &Call,
        updated: Expression,
        ctx: &mut RunContext,
    ) -> Expression {
        let Some(current_class) = self.class_stack.last() else {
            return updated;
        };
        let pattern = matcher::call_args(
            matcher::name("super"),
            vec![
                one(matcher::name(current_class.as_str())),
                one(matcher::name("self")),
            ],
        );
        if !matcher::matches(&pattern, &updated) {
            return updated;
        }
        let mut call = match updated {
            Expression::Call(call) => call,
            other => return other,
        };
        if call.args.iter().any(|arg| arg.star.is_some() || arg.keyword.is_some()) {
            return Expression::Call(call);
        }
        call.args.clear();
        ctx.mark(NAME, original.span());
        Expression::Call(call)
    }
}
