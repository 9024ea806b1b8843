//! Byte spans and first/last token access.
//!
//! Spans are taken from token offsets, so they are only meaningful for
//! nodes that came out of the parser. Replacement nodes built by rules
//! carry zero offsets and are never asked for their span.

use crate::expression::*;
use crate::statement::*;
use crate::token::Token;

/// Half-open byte range in the original source. `start` points at the
/// node's first token text, past its leading trivia.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

pub trait Spanned {
    fn span(&self) -> Span;
}

/// Span of any node that knows its first and last tokens.
pub fn span_of<T: Spanned>(node: &T) -> Span {
    node.span()
}

fn between(first: &Token, last: &Token) -> Span {
    Span {
        start: first.start,
        end: last.end(),
    }
}

impl Expression {
    pub fn first_token(&self) -> &Token {
        match self {
            Expression::Name(n) => &n.tok,
            Expression::Integer(n) => &n.tok,
            Expression::Float(n) => &n.tok,
            Expression::Imaginary(n) => &n.tok,
            Expression::SimpleString(n) => &n.tok,
            Expression::ConcatenatedString(n) => &n.parts[0].tok,
            Expression::EllipsisLiteral(n) => &n.tok,
            Expression::Attribute(n) => n.value.first_token(),
            Expression::Call(n) => n.func.first_token(),
            Expression::Subscript(n) => n.value.first_token(),
            Expression::UnaryOperation(n) => n.op.token(),
            Expression::BinaryOperation(n) => n.left.first_token(),
            Expression::BooleanOperation(n) => n.left.first_token(),
            Expression::Comparison(n) => n.left.first_token(),
            Expression::IfExp(n) => n.body.first_token(),
            Expression::Lambda(n) => &n.lambda_tok,
            Expression::Await(n) => &n.await_tok,
            Expression::Yield(n) => &n.yield_tok,
            Expression::Starred(n) => &n.star,
            Expression::NamedExpr(n) => n.target.first_token(),
            Expression::Parenthesized(n) => &n.lpar,
            Expression::Tuple(n) => match &n.lpar {
                Some(lpar) => lpar,
                None => n.elements[0].value.first_token(),
            },
            Expression::List(n) => &n.lbracket,
            Expression::Set(n) => &n.lbrace,
            Expression::Dict(n) => &n.lbrace,
            Expression::GeneratorExp(n) => match &n.lpar {
                Some(lpar) => lpar,
                None => n.elt.first_token(),
            },
            Expression::ListComp(n) => &n.lbracket,
            Expression::SetComp(n) => &n.lbrace,
            Expression::DictComp(n) => &n.lbrace,
        }
    }

    pub fn first_token_mut(&mut self) -> &mut Token {
        match self {
            Expression::Name(n) => &mut n.tok,
            Expression::Integer(n) => &mut n.tok,
            Expression::Float(n) => &mut n.tok,
            Expression::Imaginary(n) => &mut n.tok,
            Expression::SimpleString(n) => &mut n.tok,
            Expression::ConcatenatedString(n) => &mut n.parts[0].tok,
            Expression::EllipsisLiteral(n) => &mut n.tok,
            Expression::Attribute(n) => n.value.first_token_mut(),
            Expression::Call(n) => n.func.first_token_mut(),
            Expression::Subscript(n) => n.value.first_token_mut(),
            Expression::UnaryOperation(n) => n.op.token_mut(),
            Expression::BinaryOperation(n) => n.left.first_token_mut(),
            Expression::BooleanOperation(n) => n.left.first_token_mut(),
            Expression::Comparison(n) => n.left.first_token_mut(),
            Expression::IfExp(n) => n.body.first_token_mut(),
            Expression::Lambda(n) => &mut n.lambda_tok,
            Expression::Await(n) => &mut n.await_tok,
            Expression::Yield(n) => &mut n.yield_tok,
            Expression::Starred(n) => &mut n.star,
            Expression::NamedExpr(n) => n.target.first_token_mut(),
            Expression::Parenthesized(n) => &mut n.lpar,
            Expression::Tuple(n) => match &mut n.lpar {
                Some(lpar) => lpar,
                None => n.elements[0].value.first_token_mut(),
            },
            Expression::List(n) => &mut n.lbracket,
            Expression::Set(n) => &mut n.lbrace,
            Expression::Dict(n) => &mut n.lbrace,
            Expression::GeneratorExp(n) => match &mut n.lpar {
                Some(lpar) => lpar,
                None => n.elt.first_token_mut(),
            },
            Expression::ListComp(n) => &mut n.lbracket,
            Expression::SetComp(n) => &mut n.lbrace,
            Expression::DictComp(n) => &mut n.lbrace,
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            Expression::Name(n) => &n.tok,
            Expression::Integer(n) => &n.tok,
            Expression::Float(n) => &n.tok,
            Expression::Imaginary(n) => &n.tok,
            Expression::SimpleString(n) => &n.tok,
            Expression::ConcatenatedString(n) => &n.parts[n.parts.len() - 1].tok,
            Expression::EllipsisLiteral(n) => &n.tok,
            Expression::Attribute(n) => &n.attr.tok,
            Expression::Call(n) => &n.rpar,
            Expression::Subscript(n) => &n.rbracket,
            Expression::UnaryOperation(n) => n.expr.last_token(),
            Expression::BinaryOperation(n) => n.right.last_token(),
            Expression::BooleanOperation(n) => n.right.last_token(),
            Expression::Comparison(n) => match n.comparisons.last() {
                Some(target) => target.comparator.last_token(),
                None => n.left.last_token(),
            },
            Expression::IfExp(n) => n.orelse.last_token(),
            Expression::Lambda(n) => n.body.last_token(),
            Expression::Await(n) => n.expr.last_token(),
            Expression::Yield(n) => match &n.value {
                None => &n.yield_tok,
                Some(YieldValue::Expr(expr)) => expr.last_token(),
                Some(YieldValue::From(from)) => from.expr.last_token(),
            },
            Expression::Starred(n) => n.expr.last_token(),
            Expression::NamedExpr(n) => n.value.last_token(),
            Expression::Parenthesized(n) => &n.rpar,
            Expression::Tuple(n) => match &n.rpar {
                Some(rpar) => rpar,
                None => element_last(&n.elements[n.elements.len() - 1]),
            },
            Expression::List(n) => &n.rbracket,
            Expression::Set(n) => &n.rbrace,
            Expression::Dict(n) => &n.rbrace,
            Expression::GeneratorExp(n) => match &n.rpar {
                Some(rpar) => rpar,
                None => comp_for_last(&n.for_in),
            },
            Expression::ListComp(n) => &n.rbracket,
            Expression::SetComp(n) => &n.rbrace,
            Expression::DictComp(n) => &n.rbrace,
        }
    }
}

fn element_last(element: &Element) -> &Token {
    match &element.comma {
        Some(comma) => comma,
        None => element.value.last_token(),
    }
}

fn comp_for_last(for_in: &CompFor) -> &Token {
    if let Some(inner) = &for_in.inner_for_in {
        return comp_for_last(inner);
    }
    if let Some(cond) = for_in.ifs.last() {
        return cond.test.last_token();
    }
    for_in.iter.last_token()
}

impl Spanned for Expression {
    fn span(&self) -> Span {
        between(self.first_token(), self.last_token())
    }
}

impl Spanned for Call {
    fn span(&self) -> Span {
        between(self.func.first_token(), &self.rpar)
    }
}

impl Spanned for UnaryOperation {
    fn span(&self) -> Span {
        between(self.op.token(), self.expr.last_token())
    }
}

impl Spanned for BinaryOperation {
    fn span(&self) -> Span {
        between(self.left.first_token(), self.right.last_token())
    }
}

impl SmallStatement {
    pub fn first_token(&self) -> &Token {
        match self {
            SmallStatement::Expr(s) => s.value.first_token(),
            SmallStatement::Assign(s) => s.targets[0].target.first_token(),
            SmallStatement::AugAssign(s) => s.target.first_token(),
            SmallStatement::AnnAssign(s) => s.target.first_token(),
            SmallStatement::Return(s) => &s.return_tok,
            SmallStatement::Pass(s) => &s.tok,
            SmallStatement::Break(s) => &s.tok,
            SmallStatement::Continue(s) => &s.tok,
            SmallStatement::Import(s) => &s.import_tok,
            SmallStatement::ImportFrom(s) => &s.from_tok,
            SmallStatement::Raise(s) => &s.raise_tok,
            SmallStatement::Assert(s) => &s.assert_tok,
            SmallStatement::Global(s) => &s.tok,
            SmallStatement::Nonlocal(s) => &s.tok,
            SmallStatement::Del(s) => &s.del_tok,
        }
    }

    pub fn first_token_mut(&mut self) -> &mut Token {
        match self {
            SmallStatement::Expr(s) => s.value.first_token_mut(),
            SmallStatement::Assign(s) => s.targets[0].target.first_token_mut(),
            SmallStatement::AugAssign(s) => s.target.first_token_mut(),
            SmallStatement::AnnAssign(s) => s.target.first_token_mut(),
            SmallStatement::Return(s) => &mut s.return_tok,
            SmallStatement::Pass(s) => &mut s.tok,
            SmallStatement::Break(s) => &mut s.tok,
            SmallStatement::Continue(s) => &mut s.tok,
            SmallStatement::Import(s) => &mut s.import_tok,
            SmallStatement::ImportFrom(s) => &mut s.from_tok,
            SmallStatement::Raise(s) => &mut s.raise_tok,
            SmallStatement::Assert(s) => &mut s.assert_tok,
            SmallStatement::Global(s) => &mut s.tok,
            SmallStatement::Nonlocal(s) => &mut s.tok,
            SmallStatement::Del(s) => &mut s.del_tok,
        }
    }

    pub fn last_token(&self) -> &Token {
        if let Some(semicolon) = self.semicolon() {
            return semicolon;
        }
        match self {
            SmallStatement::Expr(s) => s.value.last_token(),
            SmallStatement::Assign(s) => s.value.last_token(),
            SmallStatement::AugAssign(s) => s.value.last_token(),
            SmallStatement::AnnAssign(s) => match &s.value {
                Some(value) => value.last_token(),
                None => s.annotation.last_token(),
            },
            SmallStatement::Return(s) => match &s.value {
                Some(value) => value.last_token(),
                None => &s.return_tok,
            },
            SmallStatement::Pass(s) => &s.tok,
            SmallStatement::Break(s) => &s.tok,
            SmallStatement::Continue(s) => &s.tok,
            SmallStatement::Import(s) => import_alias_last(&s.names[s.names.len() - 1]),
            SmallStatement::ImportFrom(s) => match &s.rpar {
                Some(rpar) => rpar,
                None => match &s.names {
                    ImportNames::Star(star) => star,
                    ImportNames::Aliases(aliases) => import_alias_last(&aliases[aliases.len() - 1]),
                },
            },
            SmallStatement::Raise(s) => match (&s.cause, &s.exc) {
                (Some(cause), _) => cause.value.last_token(),
                (None, Some(exc)) => exc.last_token(),
                (None, None) => &s.raise_tok,
            },
            SmallStatement::Assert(s) => match &s.msg {
                Some(msg) => msg.last_token(),
                None => s.test.last_token(),
            },
            SmallStatement::Global(s) => global_names_last(&s.names, &s.tok),
            SmallStatement::Nonlocal(s) => global_names_last(&s.names, &s.tok),
            SmallStatement::Del(s) => s.target.last_token(),
        }
    }
}

fn import_alias_last(alias: &ImportAlias) -> &Token {
    if let Some(comma) = &alias.comma {
        return comma;
    }
    if let Some(as_name) = &alias.as_name {
        return &as_name.name.tok;
    }
    alias.name.last_token()
}

fn global_names_last<'a>(names: &'a [(Name, Option<Token>)], kw: &'a Token) -> &'a Token {
    match names.last() {
        Some((_, Some(comma))) => comma,
        Some((name, None)) => &name.tok,
        None => kw,
    }
}

impl Statement {
    pub fn first_token(&self) -> &Token {
        match self {
            Statement::Simple(line) => line.body[0].first_token(),
            Statement::Compound(compound) => compound.first_token(),
        }
    }

    pub fn first_token_mut(&mut self) -> &mut Token {
        match self {
            Statement::Simple(line) => line.body[0].first_token_mut(),
            Statement::Compound(compound) => compound.first_token_mut(),
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            Statement::Simple(line) => &line.newline,
            Statement::Compound(compound) => compound.last_token(),
        }
    }
}

impl CompoundStatement {
    pub fn first_token(&self) -> &Token {
        match self {
            CompoundStatement::FunctionDef(s) => match s.decorators.first() {
                Some(decorator) => &decorator.at,
                None => s.async_tok.as_ref().unwrap_or(&s.def_tok),
            },
            CompoundStatement::ClassDef(s) => match s.decorators.first() {
                Some(decorator) => &decorator.at,
                None => &s.class_tok,
            },
            CompoundStatement::If(s) => &s.if_tok,
            CompoundStatement::For(s) => s.async_tok.as_ref().unwrap_or(&s.for_tok),
            CompoundStatement::While(s) => &s.while_tok,
            CompoundStatement::Try(s) => &s.try_tok,
            CompoundStatement::With(s) => s.async_tok.as_ref().unwrap_or(&s.with_tok),
        }
    }

    pub fn first_token_mut(&mut self) -> &mut Token {
        match self {
            CompoundStatement::FunctionDef(s) => match s.decorators.first_mut() {
                Some(decorator) => &mut decorator.at,
                None => match &mut s.async_tok {
                    Some(async_tok) => async_tok,
                    None => &mut s.def_tok,
                },
            },
            CompoundStatement::ClassDef(s) => match s.decorators.first_mut() {
                Some(decorator) => &mut decorator.at,
                None => &mut s.class_tok,
            },
            CompoundStatement::If(s) => &mut s.if_tok,
            CompoundStatement::For(s) => match &mut s.async_tok {
                Some(async_tok) => async_tok,
                None => &mut s.for_tok,
            },
            CompoundStatement::While(s) => &mut s.while_tok,
            CompoundStatement::Try(s) => &mut s.try_tok,
            CompoundStatement::With(s) => match &mut s.async_tok {
                Some(async_tok) => async_tok,
                None => &mut s.with_tok,
            },
        }
    }

    pub fn last_token(&self) -> &Token {
        match self {
            CompoundStatement::FunctionDef(s) => suite_last(&s.body),
            CompoundStatement::ClassDef(s) => suite_last(&s.body),
            CompoundStatement::If(s) => match &s.orelse {
                Some(OrElse::Elif(elif)) => {
                    CompoundStatement::last_token_of_if(elif)
                }
                Some(OrElse::Else(els)) => suite_last(&els.body),
                None => suite_last(&s.body),
            },
            CompoundStatement::For(s) => match &s.orelse {
                Some(els) => suite_last(&els.body),
                None => suite_last(&s.body),
            },
            CompoundStatement::While(s) => match &s.orelse {
                Some(els) => suite_last(&els.body),
                None => suite_last(&s.body),
            },
            CompoundStatement::Try(s) => {
                if let Some(finally) = &s.finalbody {
                    suite_last(&finally.body)
                } else if let Some(els) = &s.orelse {
                    suite_last(&els.body)
                } else if let Some(handler) = s.handlers.last() {
                    suite_last(&handler.body)
                } else {
                    suite_last(&s.body)
                }
            }
            CompoundStatement::With(s) => suite_last(&s.body),
        }
    }

    fn last_token_of_if(node: &If) -> &Token {
        match &node.orelse {
            Some(OrElse::Elif(elif)) => CompoundStatement::last_token_of_if(elif),
            Some(OrElse::Else(els)) => suite_last(&els.body),
            None => suite_last(&node.body),
        }
    }
}

fn suite_last(suite: &Suite) -> &Token {
    match suite {
        Suite::Indented(block) => match block.body.last() {
            Some(stmt) => stmt.last_token(),
            None => &block.newline,
        },
        Suite::Simple(simple) => &simple.newline,
    }
}

impl Spanned for Statement {
    fn span(&self) -> Span {
        between(self.first_token(), self.last_token())
    }
}

impl Spanned for SmallStatement {
    fn span(&self) -> Span {
        between(self.first_token(), self.last_token())
    }
}

impl Spanned for AugAssign {
    fn span(&self) -> Span {
        between(self.target.first_token(), self.value.last_token())
    }
}

impl Spanned for Import {
    fn span(&self) -> Span {
        let last = match self.names.last() {
            Some(alias) => import_alias_last(alias),
            None => &self.import_tok,
        };
        between(&self.import_tok, last)
    }
}

impl Spanned for ImportFrom {
    fn span(&self) -> Span {
        let last = match &self.rpar {
            Some(rpar) => rpar,
            None => match &self.names {
                ImportNames::Star(star) => star,
                ImportNames::Aliases(aliases) => match aliases.last() {
                    Some(alias) => import_alias_last(alias),
                    None => &self.import_tok,
                },
            },
        };
        between(&self.from_tok, last)
    }
}

impl Spanned for ClassDef {
    fn span(&self) -> Span {
        let first = match self.decorators.first() {
            Some(decorator) => &decorator.at,
            None => &self.class_tok,
        };
        between(first, suite_last(&self.body))
    }
}

impl Spanned for For {
    fn span(&self) -> Span {
        let first = self.async_tok.as_ref().unwrap_or(&self.for_tok);
        let last = match &self.orelse {
            Some(els) => suite_last(&els.body),
            None => suite_last(&self.body),
        };
        between(first, last)
    }
}

impl Spanned for ExceptHandler {
    fn span(&self) -> Span {
        between(&self.except_tok, suite_last(&self.body))
    }
}
