//! Rendering trees back to source text.
//!
//! Every node emits its tokens in source order; a token emits its leading
//! trivia then its text. An unmodified tree therefore renders to exactly
//! the bytes it was parsed from.

use crate::expression::*;
use crate::statement::*;
use crate::token::Token;

pub trait Codegen {
    fn codegen(&self, state: &mut CodegenState);
}

#[derive(Default)]
pub struct CodegenState {
    out: String,
}

impl CodegenState {
    pub fn new() -> Self {
        CodegenState::default()
    }

    pub fn token(&mut self, tok: &Token) {
        self.out.push_str(&tok.leading);
        self.out.push_str(&tok.text);
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

fn opt_token(state: &mut CodegenState, tok: &Option<Token>) {
    if let Some(tok) = tok {
        state.token(tok);
    }
}

impl Codegen for Expression {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Expression::Name(n) => state.token(&n.tok),
            Expression::Integer(n) => state.token(&n.tok),
            Expression::Float(n) => state.token(&n.tok),
            Expression::Imaginary(n) => state.token(&n.tok),
            Expression::SimpleString(n) => state.token(&n.tok),
            Expression::ConcatenatedString(n) => {
                for part in &n.parts {
                    state.token(&part.tok);
                }
            }
            Expression::EllipsisLiteral(n) => state.token(&n.tok),
            Expression::Attribute(n) => n.codegen(state),
            Expression::Call(n) => n.codegen(state),
            Expression::Subscript(n) => n.codegen(state),
            Expression::UnaryOperation(n) => n.codegen(state),
            Expression::BinaryOperation(n) => n.codegen(state),
            Expression::BooleanOperation(n) => n.codegen(state),
            Expression::Comparison(n) => n.codegen(state),
            Expression::IfExp(n) => n.codegen(state),
            Expression::Lambda(n) => n.codegen(state),
            Expression::Await(n) => n.codegen(state),
            Expression::Yield(n) => n.codegen(state),
            Expression::Starred(n) => n.codegen(state),
            Expression::NamedExpr(n) => n.codegen(state),
            Expression::Parenthesized(n) => n.codegen(state),
            Expression::Tuple(n) => n.codegen(state),
            Expression::List(n) => n.codegen(state),
            Expression::Set(n) => n.codegen(state),
            Expression::Dict(n) => n.codegen(state),
            Expression::GeneratorExp(n) => n.codegen(state),
            Expression::ListComp(n) => n.codegen(state),
            Expression::SetComp(n) => n.codegen(state),
            Expression::DictComp(n) => n.codegen(state),
        }
    }
}

impl Codegen for Attribute {
    fn codegen(&self, state: &mut CodegenState) {
        self.value.codegen(state);
        state.token(&self.dot);
        state.token(&self.attr.tok);
    }
}

impl Codegen for Call {
    fn codegen(&self, state: &mut CodegenState) {
        self.func.codegen(state);
        state.token(&self.lpar);
        for arg in &self.args {
            arg.codegen(state);
        }
        state.token(&self.rpar);
    }
}

impl Codegen for Arg {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.star);
        if let Some(keyword) = &self.keyword {
            state.token(&keyword.tok);
        }
        opt_token(state, &self.eq);
        self.value.codegen(state);
        opt_token(state, &self.comma);
    }
}

impl Codegen for Subscript {
    fn codegen(&self, state: &mut CodegenState) {
        self.value.codegen(state);
        state.token(&self.lbracket);
        match &self.index {
            BaseSlice::Index(expr) => expr.codegen(state),
            BaseSlice::Slice(slice) => slice.codegen(state),
        }
        state.token(&self.rbracket);
    }
}

impl Codegen for Slice {
    fn codegen(&self, state: &mut CodegenState) {
        if let Some(lower) = &self.lower {
            lower.codegen(state);
        }
        state.token(&self.colon1);
        if let Some(upper) = &self.upper {
            upper.codegen(state);
        }
        opt_token(state, &self.colon2);
        if let Some(step) = &self.step {
            step.codegen(state);
        }
    }
}

impl Codegen for UnaryOperation {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(self.op.token());
        self.expr.codegen(state);
    }
}

impl Codegen for BinaryOperation {
    fn codegen(&self, state: &mut CodegenState) {
        self.left.codegen(state);
        state.token(self.op.token());
        self.right.codegen(state);
    }
}

impl Codegen for BooleanOperation {
    fn codegen(&self, state: &mut CodegenState) {
        self.left.codegen(state);
        state.token(self.op.token());
        self.right.codegen(state);
    }
}

impl Codegen for Comparison {
    fn codegen(&self, state: &mut CodegenState) {
        self.left.codegen(state);
        for target in &self.comparisons {
            match &target.operator {
                CompOp::NotIn { not_tok, in_tok } => {
                    state.token(not_tok);
                    state.token(in_tok);
                }
                CompOp::IsNot { is_tok, not_tok } => {
                    state.token(is_tok);
                    state.token(not_tok);
                }
                op => state.token(op.first_token()),
            }
            target.comparator.codegen(state);
        }
    }
}

impl Codegen for IfExp {
    fn codegen(&self, state: &mut CodegenState) {
        self.body.codegen(state);
        state.token(&self.if_tok);
        self.test.codegen(state);
        state.token(&self.else_tok);
        self.orelse.codegen(state);
    }
}

impl Codegen for Lambda {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lambda_tok);
        self.params.codegen(state);
        state.token(&self.colon);
        self.body.codegen(state);
    }
}

impl Codegen for Parameters {
    fn codegen(&self, state: &mut CodegenState) {
        for param in &self.params {
            param.codegen(state);
        }
    }
}

impl Codegen for Param {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.star);
        if let Some(name) = &self.name {
            state.token(&name.tok);
        }
        opt_token(state, &self.colon);
        if let Some(annotation) = &self.annotation {
            annotation.codegen(state);
        }
        opt_token(state, &self.eq);
        if let Some(default) = &self.default {
            default.codegen(state);
        }
        opt_token(state, &self.comma);
    }
}

impl Codegen for Await {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.await_tok);
        self.expr.codegen(state);
    }
}

impl Codegen for Yield {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.yield_tok);
        match &self.value {
            None => {}
            Some(YieldValue::Expr(expr)) => expr.codegen(state),
            Some(YieldValue::From(from)) => {
                state.token(&from.from_tok);
                from.expr.codegen(state);
            }
        }
    }
}

impl Codegen for Starred {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.star);
        self.expr.codegen(state);
    }
}

impl Codegen for NamedExpr {
    fn codegen(&self, state: &mut CodegenState) {
        self.target.codegen(state);
        state.token(&self.walrus);
        self.value.codegen(state);
    }
}

impl Codegen for Parenthesized {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lpar);
        self.expr.codegen(state);
        state.token(&self.rpar);
    }
}

impl Codegen for Tuple {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.lpar);
        for element in &self.elements {
            element.codegen(state);
        }
        opt_token(state, &self.rpar);
    }
}

impl Codegen for List {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbracket);
        for element in &self.elements {
            element.codegen(state);
        }
        state.token(&self.rbracket);
    }
}

impl Codegen for Set {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbrace);
        for element in &self.elements {
            element.codegen(state);
        }
        state.token(&self.rbrace);
    }
}

impl Codegen for Element {
    fn codegen(&self, state: &mut CodegenState) {
        self.value.codegen(state);
        opt_token(state, &self.comma);
    }
}

impl Codegen for Dict {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbrace);
        for element in &self.elements {
            element.codegen(state);
        }
        state.token(&self.rbrace);
    }
}

impl Codegen for DictElement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            DictElement::Simple { key, colon, value, comma } => {
                key.codegen(state);
                state.token(colon);
                value.codegen(state);
                opt_token(state, comma);
            }
            DictElement::Starred { star, value, comma } => {
                state.token(star);
                value.codegen(state);
                opt_token(state, comma);
            }
        }
    }
}

impl Codegen for GeneratorExp {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.lpar);
        self.elt.codegen(state);
        self.for_in.codegen(state);
        opt_token(state, &self.rpar);
    }
}

impl Codegen for ListComp {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbracket);
        self.elt.codegen(state);
        self.for_in.codegen(state);
        state.token(&self.rbracket);
    }
}

impl Codegen for SetComp {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbrace);
        self.elt.codegen(state);
        self.for_in.codegen(state);
        state.token(&self.rbrace);
    }
}

impl Codegen for DictComp {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.lbrace);
        self.key.codegen(state);
        state.token(&self.colon);
        self.value.codegen(state);
        self.for_in.codegen(state);
        state.token(&self.rbrace);
    }
}

impl Codegen for CompFor {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.async_tok);
        state.token(&self.for_tok);
        self.target.codegen(state);
        state.token(&self.in_tok);
        self.iter.codegen(state);
        for cond in &self.ifs {
            state.token(&cond.if_tok);
            cond.test.codegen(state);
        }
        if let Some(inner) = &self.inner_for_in {
            inner.codegen(state);
        }
    }
}

impl Codegen for Module {
    fn codegen(&self, state: &mut CodegenState) {
        for stmt in &self.body {
            stmt.codegen(state);
        }
        state.token(&self.eof);
    }
}

impl Codegen for Statement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Statement::Simple(line) => line.codegen(state),
            Statement::Compound(compound) => compound.codegen(state),
        }
    }
}

impl Codegen for SimpleStatementLine {
    fn codegen(&self, state: &mut CodegenState) {
        for small in &self.body {
            small.codegen(state);
        }
        state.token(&self.newline);
    }
}

impl Codegen for SmallStatement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            SmallStatement::Expr(s) => {
                s.value.codegen(state);
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Assign(s) => s.codegen(state),
            SmallStatement::AugAssign(s) => s.codegen(state),
            SmallStatement::AnnAssign(s) => s.codegen(state),
            SmallStatement::Return(s) => {
                state.token(&s.return_tok);
                if let Some(value) = &s.value {
                    value.codegen(state);
                }
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Pass(s) => {
                state.token(&s.tok);
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Break(s) => {
                state.token(&s.tok);
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Continue(s) => {
                state.token(&s.tok);
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Import(s) => s.codegen(state),
            SmallStatement::ImportFrom(s) => s.codegen(state),
            SmallStatement::Raise(s) => s.codegen(state),
            SmallStatement::Assert(s) => s.codegen(state),
            SmallStatement::Global(s) => {
                state.token(&s.tok);
                for (name, comma) in &s.names {
                    state.token(&name.tok);
                    opt_token(state, comma);
                }
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Nonlocal(s) => {
                state.token(&s.tok);
                for (name, comma) in &s.names {
                    state.token(&name.tok);
                    opt_token(state, comma);
                }
                opt_token(state, &s.semicolon);
            }
            SmallStatement::Del(s) => {
                state.token(&s.del_tok);
                s.target.codegen(state);
                opt_token(state, &s.semicolon);
            }
        }
    }
}

impl Codegen for Assign {
    fn codegen(&self, state: &mut CodegenState) {
        for target in &self.targets {
            target.target.codegen(state);
            state.token(&target.eq);
        }
        self.value.codegen(state);
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for AugAssign {
    fn codegen(&self, state: &mut CodegenState) {
        self.target.codegen(state);
        state.token(self.op.token());
        self.value.codegen(state);
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for AnnAssign {
    fn codegen(&self, state: &mut CodegenState) {
        self.target.codegen(state);
        state.token(&self.colon);
        self.annotation.codegen(state);
        opt_token(state, &self.eq);
        if let Some(value) = &self.value {
            value.codegen(state);
        }
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for Import {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.import_tok);
        for alias in &self.names {
            alias.codegen(state);
        }
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for ImportAlias {
    fn codegen(&self, state: &mut CodegenState) {
        self.name.codegen(state);
        if let Some(as_name) = &self.as_name {
            state.token(&as_name.as_tok);
            state.token(&as_name.name.tok);
        }
        opt_token(state, &self.comma);
    }
}

impl Codegen for ImportFrom {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.from_tok);
        for dot in &self.dots {
            state.token(dot);
        }
        if let Some(module) = &self.module {
            module.codegen(state);
        }
        state.token(&self.import_tok);
        opt_token(state, &self.lpar);
        match &self.names {
            ImportNames::Star(star) => state.token(star),
            ImportNames::Aliases(aliases) => {
                for alias in aliases {
                    alias.codegen(state);
                }
            }
        }
        opt_token(state, &self.rpar);
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for Raise {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.raise_tok);
        if let Some(exc) = &self.exc {
            exc.codegen(state);
        }
        if let Some(cause) = &self.cause {
            state.token(&cause.from_tok);
            cause.value.codegen(state);
        }
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for Assert {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.assert_tok);
        self.test.codegen(state);
        opt_token(state, &self.comma);
        if let Some(msg) = &self.msg {
            msg.codegen(state);
        }
        opt_token(state, &self.semicolon);
    }
}

impl Codegen for CompoundStatement {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            CompoundStatement::FunctionDef(s) => s.codegen(state),
            CompoundStatement::If(s) => s.codegen(state),
            CompoundStatement::For(s) => s.codegen(state),
            CompoundStatement::While(s) => s.codegen(state),
            CompoundStatement::ClassDef(s) => s.codegen(state),
            CompoundStatement::Try(s) => s.codegen(state),
            CompoundStatement::With(s) => s.codegen(state),
        }
    }
}

impl Codegen for Suite {
    fn codegen(&self, state: &mut CodegenState) {
        match self {
            Suite::Indented(block) => {
                state.token(&block.newline);
                for stmt in &block.body {
                    stmt.codegen(state);
                }
            }
            Suite::Simple(suite) => {
                for small in &suite.body {
                    small.codegen(state);
                }
                state.token(&suite.newline);
            }
        }
    }
}

impl Codegen for Decorator {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.at);
        self.expr.codegen(state);
        state.token(&self.newline);
    }
}

impl Codegen for FunctionDef {
    fn codegen(&self, state: &mut CodegenState) {
        for decorator in &self.decorators {
            decorator.codegen(state);
        }
        opt_token(state, &self.async_tok);
        state.token(&self.def_tok);
        state.token(&self.name.tok);
        state.token(&self.lpar);
        self.params.codegen(state);
        state.token(&self.rpar);
        if let Some(returns) = &self.returns {
            state.token(&returns.arrow);
            returns.annotation.codegen(state);
        }
        state.token(&self.colon);
        self.body.codegen(state);
    }
}

impl Codegen for ClassDef {
    fn codegen(&self, state: &mut CodegenState) {
        for decorator in &self.decorators {
            decorator.codegen(state);
        }
        state.token(&self.class_tok);
        state.token(&self.name.tok);
        opt_token(state, &self.lpar);
        for base in &self.bases {
            base.codegen(state);
        }
        opt_token(state, &self.rpar);
        state.token(&self.colon);
        self.body.codegen(state);
    }
}

impl Codegen for If {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.if_tok);
        self.test.codegen(state);
        state.token(&self.colon);
        self.body.codegen(state);
        match &self.orelse {
            None => {}
            Some(OrElse::Elif(elif)) => elif.codegen(state),
            Some(OrElse::Else(els)) => els.codegen(state),
        }
    }
}

impl Codegen for Else {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.else_tok);
        state.token(&self.colon);
        self.body.codegen(state);
    }
}

impl Codegen for For {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.async_tok);
        state.token(&self.for_tok);
        self.target.codegen(state);
        state.token(&self.in_tok);
        self.iter.codegen(state);
        state.token(&self.colon);
        self.body.codegen(state);
        if let Some(orelse) = &self.orelse {
            orelse.codegen(state);
        }
    }
}

impl Codegen for While {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.while_tok);
        self.test.codegen(state);
        state.token(&self.colon);
        self.body.codegen(state);
        if let Some(orelse) = &self.orelse {
            orelse.codegen(state);
        }
    }
}

impl Codegen for Try {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.try_tok);
        state.token(&self.colon);
        self.body.codegen(state);
        for handler in &self.handlers {
            handler.codegen(state);
        }
        if let Some(orelse) = &self.orelse {
            orelse.codegen(state);
        }
        if let Some(finally) = &self.finalbody {
            state.token(&finally.finally_tok);
            state.token(&finally.colon);
            finally.body.codegen(state);
        }
    }
}

impl Codegen for ExceptHandler {
    fn codegen(&self, state: &mut CodegenState) {
        state.token(&self.except_tok);
        if let Some(etype) = &self.etype {
            etype.codegen(state);
        }
        if let Some(as_name) = &self.as_name {
            state.token(&as_name.as_tok);
            state.token(&as_name.name.tok);
        }
        state.token(&self.colon);
        self.body.codegen(state);
    }
}

impl Codegen for With {
    fn codegen(&self, state: &mut CodegenState) {
        opt_token(state, &self.async_tok);
        state.token(&self.with_tok);
        for item in &self.items {
            item.item.codegen(state);
            if let Some(as_clause) = &item.as_clause {
                state.token(&as_clause.as_tok);
                as_clause.target.codegen(state);
            }
            opt_token(state, &item.comma);
        }
        state.token(&self.colon);
        self.body.codegen(state);
    }
}
