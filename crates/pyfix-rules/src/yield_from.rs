//! Rule: Convert `for x in it: yield x` to `yield from it`
//!
//! Only the literal passthrough shape is rewritten: the loop target is a
//! bare name, the body is exactly `yield <target>`, there is no `else`
//! clause, and the loop is not `async`. Anything else changes meaning
//! under `yield from` (return values, delegation to send/throw).

use pyfix_core::{Rule, RunContext};
use pyfix_cst::{
    CompoundStatement, ExprStatement, Expression, For, SimpleStatementLine, SmallStatement, Span,
    Statement, Suite, TokKind, Token, Yield, YieldFrom, YieldValue,
};

pub const NAME: &str = "yield_from";
pub const DESCRIPTION: &str = "Convert 'for x in it: yield x' to 'yield from it'";

/// The body's sole statement must be `yield <target>` for the given
/// target name.
fn yields_target(body: &[SmallStatement], target: &str) -> bool {
    let [SmallStatement::Expr(expr)] = body else {
        return false;
    };
    let Expression::Yield(yielded) = &expr.value else {
        return false;
    };
    match &yielded.value {
        Some(YieldValue::Expr(Expression::Name(name))) => name.value() == target,
        _ => false,
    }
}

/// Newline token ending the loop body, which keeps a trailing comment on
/// the yield line alive.
fn body_newline(body: Suite) -> Token {
    match body {
        Suite::Indented(block) => match block.body.into_iter().next() {
            Some(Statement::Simple(line)) => line.newline,
            _ => block.newline,
        },
        Suite::Simple(suite) => suite.newline,
    }
}

pub struct YieldFromLoop;

impl YieldFromLoop {
    fn convertible(&self, node: &For) -> bool {
        if node.async_tok.is_some() || node.orelse.is_some() {
            return false;
        }
        let Expression::Name(target) = &node.target else {
            return false;
        };
        match &node.body {
            Suite::Indented(block) => match block.body.as_slice() {
                [Statement::Simple(line)] => yields_target(&line.body, target.value()),
                _ => false,
            },
            Suite::Simple(suite) => yields_target(&suite.body, target.value()),
        }
    }
}

impl Rule for YieldFromLoop {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_for(
        &mut self,
        original: &For,
        updated: Statement,
        ctx: &mut RunContext,
    ) -> Statement {
        let loop_stmt = match updated {
            Statement::Compound(CompoundStatement::For(loop_stmt)) => loop_stmt,
            other => return other,
        };
        if !self.convertible(&loop_stmt) {
            return Statement::Compound(CompoundStatement::For(loop_stmt));
        }
        ctx.mark(
            NAME,
            Span {
                start: original.for_tok.start,
                end: original.colon.end(),
            },
        );
        let mut iter = loop_stmt.iter;
        iter.set_leading(" ");
        let yielded = Expression::Yield(Box::new(Yield {
            yield_tok: Token::with_leading(TokKind::Name, "yield", loop_stmt.for_tok.leading),
            value: Some(YieldValue::From(YieldFrom {
                from_tok: Token::with_leading(TokKind::Name, "from", " "),
                expr: iter,
            })),
        }));
        Statement::Simple(SimpleStatementLine {
            body: vec![SmallStatement::Expr(ExprStatement {
                value: yielded,
                semicolon: None,
            })],
            newline: body_newline(loop_stmt.body),
        })
    }
}
