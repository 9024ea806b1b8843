//! Rule: Drop needless float conversions in multiplications and divisions
//!
//! Under `*`, `/`, `*=`, and `/=` a py2-era `float(x)` wrapper changes
//! nothing (py3 division is already true division), and an integral float
//! literal can be written as the integer it is. Non-integral literals and
//! other operators are left alone.

use pyfix_core::matcher::{self, one, Pat};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{
    AugAssign, AugOp, BinaryOp, BinaryOperation, Expression, Integer, SmallStatement, Span,
    Spanned,
};

pub const NAME: &str = "float_conversion";
pub const DESCRIPTION: &str = "Drop float() wrappers and integral float literals under * and /";

/// Beyond 2^53 an f64 no longer holds every integer exactly, so the
/// literal is kept as written.
const EXACT_INT_LIMIT: f64 = 9007199254740992.0;

fn float_call_pattern() -> Pat {
    matcher::call_args(matcher::name("float"), vec![one(Pat::Any)])
}

fn targets_binary(op: &BinaryOp) -> bool {
    matches!(op, BinaryOp::Multiply(_) | BinaryOp::Divide(_))
}

fn targets_aug(op: &AugOp) -> bool {
    matches!(op, AugOp::MultiplyAssign(_) | AugOp::DivideAssign(_))
}

/// True for expressions that bind at least as tightly as `*` and `/`, so
/// unwrapping them out of a `float()` call cannot change grouping.
fn is_atom(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::Name(_)
            | Expression::Integer(_)
            | Expression::Float(_)
            | Expression::SimpleString(_)
            | Expression::Attribute(_)
            | Expression::Call(_)
            | Expression::Subscript(_)
            | Expression::Parenthesized(_)
            | Expression::List(_)
            | Expression::Dict(_)
            | Expression::Set(_)
    )
}

/// Rewrite one operand. `float(x)` unwraps to `x`; an integral `Float`
/// literal becomes the matching `Integer`.
fn replace_operand(operand: Expression, span: Span, ctx: &mut RunContext) -> Expression {
    if matcher::matches(&float_call_pattern(), &operand) {
        let leading = operand.leading().to_string();
        let mut call = match operand {
            Expression::Call(call) => call,
            other => return other,
        };
        let unwrappable = call.args.len() == 1
            && call.args[0].star.is_none()
            && call.args[0].keyword.is_none()
            && is_atom(&call.args[0].value);
        if !unwrappable {
            return Expression::Call(call);
        }
        let args = std::mem::take(&mut call.args);
        let Some(arg) = args.into_iter().next() else {
            return Expression::Call(call);
        };
        let mut inner = arg.value;
        inner.set_leading(leading);
        ctx.mark(NAME, span);
        return inner;
    }
    if let Expression::Float(literal) = &operand {
        if let Some(value) = literal.to_f64() {
            if value.fract() == 0.0 && value.abs() <= EXACT_INT_LIMIT {
                let mut integer = Integer::detached(format!("{}", value as i64));
                integer.tok.leading = literal.tok.leading.clone();
                ctx.mark(NAME, span);
                return Expression::Integer(integer);
            }
        }
    }
    operand
}

pub struct FloatConversion;

impl Rule for FloatConversion {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_binary_operation(
        &mut self,
        original: &BinaryOperation,
        updated: Expression,
        ctx: &mut RunContext,
    ) -> Expression {
        let binary = match updated {
            Expression::BinaryOperation(binary) => binary,
            other => return other,
        };
        if !targets_binary(&binary.op) {
            return Expression::BinaryOperation(binary);
        }
        let BinaryOperation { left, op, right } = *binary;
        let left = replace_operand(left, original.left.span(), ctx);
        let right = replace_operand(right, original.right.span(), ctx);
        Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }))
    }

    fn leave_aug_assign(
        &mut self,
        original: &AugAssign,
        updated: SmallStatement,
        ctx: &mut RunContext,
    ) -> SmallStatement {
        let assign = match updated {
            SmallStatement::AugAssign(assign) => assign,
            other => return other,
        };
        if !targets_aug(&assign.op) {
            return SmallStatement::AugAssign(assign);
        }
        let AugAssign {
            target,
            op,
            value,
            semicolon,
        } = assign;
        let value = replace_operand(value, original.value.span(), ctx);
        SmallStatement::AugAssign(AugAssign {
            target,
            op,
            value,
            semicolon,
        })
    }
}
