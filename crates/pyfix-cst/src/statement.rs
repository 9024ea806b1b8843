//! Statement nodes and the module root.

use crate::expression::{Arg, Expression, Name, Parameters};
use crate::token::Token;

/// Root of a parsed file. The `eof` token carries any trailing trivia
/// after the last statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub body: Vec<Statement>,
    pub eof: Token,
}

impl Module {
    /// Render the tree back to source text.
    pub fn code(&self) -> String {
        use crate::codegen::{Codegen, CodegenState};
        let mut state = CodegenState::new();
        self.codegen(&mut state);
        state.into_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Simple(SimpleStatementLine),
    Compound(CompoundStatement),
}

/// One physical line of small statements: `a = 1` or `a = 1; b = 2`.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleStatementLine {
    pub body: Vec<SmallStatement>,
    pub newline: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SmallStatement {
    Expr(ExprStatement),
    Assign(Assign),
    AugAssign(AugAssign),
    AnnAssign(AnnAssign),
    Return(Return),
    Pass(Pass),
    Break(Break),
    Continue(Continue),
    Import(Import),
    ImportFrom(ImportFrom),
    Raise(Raise),
    Assert(Assert),
    Global(Global),
    Nonlocal(Nonlocal),
    Del(Del),
}

impl SmallStatement {
    pub fn semicolon(&self) -> Option<&Token> {
        match self {
            SmallStatement::Expr(s) => s.semicolon.as_ref(),
            SmallStatement::Assign(s) => s.semicolon.as_ref(),
            SmallStatement::AugAssign(s) => s.semicolon.as_ref(),
            SmallStatement::AnnAssign(s) => s.semicolon.as_ref(),
            SmallStatement::Return(s) => s.semicolon.as_ref(),
            SmallStatement::Pass(s) => s.semicolon.as_ref(),
            SmallStatement::Break(s) => s.semicolon.as_ref(),
            SmallStatement::Continue(s) => s.semicolon.as_ref(),
            SmallStatement::Import(s) => s.semicolon.as_ref(),
            SmallStatement::ImportFrom(s) => s.semicolon.as_ref(),
            SmallStatement::Raise(s) => s.semicolon.as_ref(),
            SmallStatement::Assert(s) => s.semicolon.as_ref(),
            SmallStatement::Global(s) => s.semicolon.as_ref(),
            SmallStatement::Nonlocal(s) => s.semicolon.as_ref(),
            SmallStatement::Del(s) => s.semicolon.as_ref(),
        }
    }

    pub fn set_semicolon(&mut self, semicolon: Option<Token>) {
        match self {
            SmallStatement::Expr(s) => s.semicolon = semicolon,
            SmallStatement::Assign(s) => s.semicolon = semicolon,
            SmallStatement::AugAssign(s) => s.semicolon = semicolon,
            SmallStatement::AnnAssign(s) => s.semicolon = semicolon,
            SmallStatement::Return(s) => s.semicolon = semicolon,
            SmallStatement::Pass(s) => s.semicolon = semicolon,
            SmallStatement::Break(s) => s.semicolon = semicolon,
            SmallStatement::Continue(s) => s.semicolon = semicolon,
            SmallStatement::Import(s) => s.semicolon = semicolon,
            SmallStatement::ImportFrom(s) => s.semicolon = semicolon,
            SmallStatement::Raise(s) => s.semicolon = semicolon,
            SmallStatement::Assert(s) => s.semicolon = semicolon,
            SmallStatement::Global(s) => s.semicolon = semicolon,
            SmallStatement::Nonlocal(s) => s.semicolon = semicolon,
            SmallStatement::Del(s) => s.semicolon = semicolon,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExprStatement {
    pub value: Expression,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assign {
    pub targets: Vec<AssignTarget>,
    pub value: Expression,
    pub semicolon: Option<Token>,
}

/// One `target =` pair of a (possibly chained) assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct AssignTarget {
    pub target: Expression,
    pub eq: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AugAssign {
    pub target: Expression,
    pub op: AugOp,
    pub value: Expression,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AugOp {
    AddAssign(Token),
    SubtractAssign(Token),
    MultiplyAssign(Token),
    DivideAssign(Token),
    FloorDivideAssign(Token),
    ModuloAssign(Token),
    PowerAssign(Token),
    MatrixMultiplyAssign(Token),
    LeftShiftAssign(Token),
    RightShiftAssign(Token),
    BitAndAssign(Token),
    BitOrAssign(Token),
    BitXorAssign(Token),
}

impl AugOp {
    pub fn token(&self) -> &Token {
        match self {
            AugOp::AddAssign(t)
            | AugOp::SubtractAssign(t)
            | AugOp::MultiplyAssign(t)
            | AugOp::DivideAssign(t)
            | AugOp::FloorDivideAssign(t)
            | AugOp::ModuloAssign(t)
            | AugOp::PowerAssign(t)
            | AugOp::MatrixMultiplyAssign(t)
            | AugOp::LeftShiftAssign(t)
            | AugOp::RightShiftAssign(t)
            | AugOp::BitAndAssign(t)
            | AugOp::BitOrAssign(t)
            | AugOp::BitXorAssign(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnAssign {
    pub target: Expression,
    pub colon: Token,
    pub annotation: Expression,
    pub eq: Option<Token>,
    pub value: Option<Expression>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Return {
    pub return_tok: Token,
    pub value: Option<Expression>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pass {
    pub tok: Token,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Break {
    pub tok: Token,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Continue {
    pub tok: Token,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub import_tok: Token,
    pub names: Vec<ImportAlias>,
    pub semicolon: Option<Token>,
}

/// `module` or `module as alias` within an import statement. The name is
/// either a `Name` or a dotted `Attribute` chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportAlias {
    pub name: Expression,
    pub as_name: Option<AsName>,
    pub comma: Option<Token>,
}

impl ImportAlias {
    /// The dotted module path as written, without spacing.
    pub fn dotted(&self) -> String {
        fn walk(expr: &Expression, out: &mut String) {
            match expr {
                Expression::Name(name) => out.push_str(name.value()),
                Expression::Attribute(attr) => {
                    walk(&attr.value, out);
                    out.push('.');
                    out.push_str(attr.attr.value());
                }
                _ => {}
            }
        }
        let mut out = String::new();
        walk(&self.name, &mut out);
        out
    }

    /// Leftmost component of the dotted path.
    pub fn root(&self) -> Option<&str> {
        let mut expr = &self.name;
        loop {
            match expr {
                Expression::Name(name) => return Some(name.value()),
                Expression::Attribute(attr) => expr = &attr.value,
                _ => return None,
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AsName {
    pub as_tok: Token,
    pub name: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportFrom {
    pub from_tok: Token,
    /// Leading `.` tokens of a relative import.
    pub dots: Vec<Token>,
    pub module: Option<Expression>,
    pub import_tok: Token,
    pub lpar: Option<Token>,
    pub names: ImportNames,
    pub rpar: Option<Token>,
    pub semicolon: Option<Token>,
}

impl ImportFrom {
    /// The source module path as written, or empty for `from . import x`.
    pub fn module_path(&self) -> String {
        self.module
            .as_ref()
            .map(|m| {
                ImportAlias {
                    name: m.clone(),
                    as_name: None,
                    comma: None,
                }
                .dotted()
            })
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportNames {
    Star(Token),
    Aliases(Vec<ImportAlias>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Raise {
    pub raise_tok: Token,
    pub exc: Option<Expression>,
    pub cause: Option<RaiseCause>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RaiseCause {
    pub from_tok: Token,
    pub value: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assert {
    pub assert_tok: Token,
    pub test: Expression,
    pub comma: Option<Token>,
    pub msg: Option<Expression>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Global {
    pub tok: Token,
    pub names: Vec<(Name, Option<Token>)>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Nonlocal {
    pub tok: Token,
    pub names: Vec<(Name, Option<Token>)>,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Del {
    pub del_tok: Token,
    pub target: Expression,
    pub semicolon: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompoundStatement {
    FunctionDef(FunctionDef),
    If(If),
    For(For),
    While(While),
    ClassDef(ClassDef),
    Try(Try),
    With(With),
}

/// Body of a compound statement: an indented block or the inline
/// `if x: pass` form.
#[derive(Debug, Clone, PartialEq)]
pub enum Suite {
    Indented(IndentedBlock),
    Simple(SimpleStatementSuite),
}

/// An indented body. The indentation itself lives in the leading trivia of
/// each statement's first token; the block only records the newline after
/// the colon.
#[derive(Debug, Clone, PartialEq)]
pub struct IndentedBlock {
    pub newline: Token,
    pub body: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SimpleStatementSuite {
    pub body: Vec<SmallStatement>,
    pub newline: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Decorator {
    pub at: Token,
    pub expr: Expression,
    pub newline: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDef {
    pub decorators: Vec<Decorator>,
    pub async_tok: Option<Token>,
    pub def_tok: Token,
    pub name: Name,
    pub lpar: Token,
    pub params: Parameters,
    pub rpar: Token,
    pub returns: Option<ReturnAnnotation>,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnAnnotation {
    pub arrow: Token,
    pub annotation: Expression,
}

/// A class definition. Base classes and keyword arguments (such as
/// `metaclass=`) share one argument list.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDef {
    pub decorators: Vec<Decorator>,
    pub class_tok: Token,
    pub name: Name,
    pub lpar: Option<Token>,
    pub bases: Vec<Arg>,
    pub rpar: Option<Token>,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct If {
    /// `if` or `elif`.
    pub if_tok: Token,
    pub test: Expression,
    pub colon: Token,
    pub body: Suite,
    pub orelse: Option<OrElse>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum OrElse {
    Elif(Box<If>),
    Else(Else),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Else {
    pub else_tok: Token,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct For {
    pub async_tok: Option<Token>,
    pub for_tok: Token,
    pub target: Expression,
    pub in_tok: Token,
    pub iter: Expression,
    pub colon: Token,
    pub body: Suite,
    pub orelse: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct While {
    pub while_tok: Token,
    pub test: Expression,
    pub colon: Token,
    pub body: Suite,
    pub orelse: Option<Else>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Try {
    pub try_tok: Token,
    pub colon: Token,
    pub body: Suite,
    pub handlers: Vec<ExceptHandler>,
    pub orelse: Option<Else>,
    pub finalbody: Option<Finally>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExceptHandler {
    pub except_tok: Token,
    pub etype: Option<Expression>,
    pub as_name: Option<AsName>,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Finally {
    pub finally_tok: Token,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct With {
    pub async_tok: Option<Token>,
    pub with_tok: Token,
    pub items: Vec<WithItem>,
    pub colon: Token,
    pub body: Suite,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithItem {
    pub item: Expression,
    pub as_clause: Option<WithAs>,
    pub comma: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WithAs {
    pub as_tok: Token,
    pub target: Expression,
}
