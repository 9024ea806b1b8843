//! Recursive-descent parser over the lossless token stream.
//!
//! The grammar follows CPython's expression precedence chain. Every token
//! consumed ends up in exactly one node field, so rendering the tree
//! reproduces the input byte for byte.

use crate::error::ParseError;
use crate::expression::*;
use crate::statement::*;
use crate::token::{TokKind, Token};
use crate::tokenizer::{line_col, tokenize};

const RESERVED: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

fn is_reserved(word: &str) -> bool {
    RESERVED.contains(&word)
}

/// Parse a complete source file.
pub fn parse_module(src: &str) -> Result<Module, ParseError> {
    let tokens = tokenize(src)?;
    Parser::new(src, tokens).module()
}

/// Parse a single expression (or bare tuple), for tests and tooling.
pub fn parse_expression(src: &str) -> Result<Expression, ParseError> {
    let tokens = tokenize(src)?
        .into_iter()
        .filter(|tok| !tok.is_marker())
        .collect();
    let mut parser = Parser::new(src, tokens);
    let expr = parser.testlist()?;
    if parser.peek().kind == TokKind::Newline {
        parser.bump();
    }
    if parser.peek().kind != TokKind::EndMarker {
        return Err(parser.unexpected("end of expression"));
    }
    Ok(expr)
}

struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str, tokens: Vec<Token>) -> Self {
        Parser { src, tokens, pos: 0 }
    }

    // ---- token cursor ----

    fn peek(&self) -> &Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx]
    }

    fn bump(&mut self) -> Token {
        let idx = self.pos.min(self.tokens.len() - 1);
        let tok = std::mem::replace(&mut self.tokens[idx], Token::detached(TokKind::Op, ""));
        if self.pos < self.tokens.len() - 1 {
            self.pos += 1;
        } else {
            self.pos = self.tokens.len();
        }
        tok
    }

    fn at_op(&self, text: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokKind::Op && tok.text == text
    }

    fn at_keyword(&self, word: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokKind::Name && tok.text == word
    }

    fn next_is_keyword(&self, word: &str) -> bool {
        let tok = self.peek_at(1);
        tok.kind == TokKind::Name && tok.text == word
    }

    fn expect_op(&mut self, text: &str) -> Result<Token, ParseError> {
        if self.at_op(text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{text}'")))
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token, ParseError> {
        if self.at_keyword(word) {
            Ok(self.bump())
        } else {
            Err(self.unexpected(&format!("'{word}'")))
        }
    }

    fn expect_newline(&mut self) -> Result<Token, ParseError> {
        if self.peek().kind == TokKind::Newline {
            Ok(self.bump())
        } else {
            Err(self.unexpected("end of line"))
        }
    }

    /// An identifier that is not a keyword.
    fn expect_ident(&mut self) -> Result<Token, ParseError> {
        let tok = self.peek();
        if tok.kind == TokKind::Name && !is_reserved(&tok.text) {
            Ok(self.bump())
        } else {
            Err(self.unexpected("a name"))
        }
    }

    fn unexpected(&self, wanted: &str) -> ParseError {
        let tok = self.peek();
        let found = match tok.kind {
            TokKind::Newline => "end of line".to_string(),
            TokKind::EndMarker => "end of file".to_string(),
            TokKind::Indent => "indent".to_string(),
            TokKind::Dedent => "dedent".to_string(),
            _ => format!("'{}'", tok.text),
        };
        let (line, column) = line_col(self.src, tok.start);
        ParseError::new(format!("expected {wanted}, found {found}"), line, column, tok.start)
    }

    /// True when the current token can begin an expression.
    fn at_expression_start(&self) -> bool {
        let tok = self.peek();
        match tok.kind {
            TokKind::Number | TokKind::Str => true,
            TokKind::Name => {
                !is_reserved(&tok.text)
                    || matches!(
                        tok.text.as_str(),
                        "None" | "True" | "False" | "not" | "lambda" | "await" | "yield"
                    )
            }
            TokKind::Op => matches!(
                tok.text.as_str(),
                "(" | "[" | "{" | "-" | "+" | "~" | "*" | "**" | "..."
            ),
            _ => false,
        }
    }

    // ---- module and statements ----

    fn module(mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        loop {
            match self.peek().kind {
                TokKind::EndMarker => break,
                TokKind::Indent => return Err(self.unexpected("a statement")),
                TokKind::Dedent => {
                    self.bump();
                }
                _ => body.push(self.statement()?),
            }
        }
        let eof = self.bump();
        Ok(Module { body, eof })
    }

    fn statement(&mut self) -> Result<Statement, ParseError> {
        if self.at_op("@")
            || self.at_keyword("if")
            || self.at_keyword("while")
            || self.at_keyword("for")
            || self.at_keyword("try")
            || self.at_keyword("with")
            || self.at_keyword("def")
            || self.at_keyword("class")
            || (self.at_keyword("async")
                && (self.next_is_keyword("def")
                    || self.next_is_keyword("for")
                    || self.next_is_keyword("with")))
        {
            Ok(Statement::Compound(self.compound_statement()?))
        } else {
            Ok(Statement::Simple(self.simple_statement_line()?))
        }
    }

    fn simple_statement_line(&mut self) -> Result<SimpleStatementLine, ParseError> {
        let mut body = Vec::new();
        loop {
            let mut small = self.small_statement()?;
            if self.at_op(";") {
                small.set_semicolon(Some(self.bump()));
                body.push(small);
                if self.peek().kind == TokKind::Newline {
                    break;
                }
            } else {
                body.push(small);
                break;
            }
        }
        let newline = self.expect_newline()?;
        Ok(SimpleStatementLine { body, newline })
    }

    fn small_statement(&mut self) -> Result<SmallStatement, ParseError> {
        if self.peek().kind == TokKind::Name {
            match self.peek().text.as_str() {
                "return" => {
                    let return_tok = self.bump();
                    let value = if self.at_expression_start() {
                        Some(self.testlist()?)
                    } else {
                        None
                    };
                    return Ok(SmallStatement::Return(Return {
                        return_tok,
                        value,
                        semicolon: None,
                    }));
                }
                "pass" => {
                    return Ok(SmallStatement::Pass(Pass { tok: self.bump(), semicolon: None }));
                }
                "break" => {
                    return Ok(SmallStatement::Break(Break { tok: self.bump(), semicolon: None }));
                }
                "continue" => {
                    return Ok(SmallStatement::Continue(Continue {
                        tok: self.bump(),
                        semicolon: None,
                    }));
                }
                "import" => return self.import_statement(),
                "from" => return self.import_from_statement(),
                "raise" => {
                    let raise_tok = self.bump();
                    let exc = if self.at_expression_start() {
                        Some(self.test()?)
                    } else {
                        None
                    };
                    let cause = if self.at_keyword("from") {
                        let from_tok = self.bump();
                        Some(RaiseCause { from_tok, value: self.test()? })
                    } else {
                        None
                    };
                    return Ok(SmallStatement::Raise(Raise {
                        raise_tok,
                        exc,
                        cause,
                        semicolon: None,
                    }));
                }
                "assert" => {
                    let assert_tok = self.bump();
                    let test = self.test()?;
                    let (comma, msg) = if self.at_op(",") {
                        (Some(self.bump()), Some(self.test()?))
                    } else {
                        (None, None)
                    };
                    return Ok(SmallStatement::Assert(Assert {
                        assert_tok,
                        test,
                        comma,
                        msg,
                        semicolon: None,
                    }));
                }
                "global" | "nonlocal" => {
                    let is_global = self.peek().text == "global";
                    let tok = self.bump();
                    let mut names = Vec::new();
                    loop {
                        let name = Name::new(self.expect_ident()?);
                        if self.at_op(",") {
                            names.push((name, Some(self.bump())));
                        } else {
                            names.push((name, None));
                            break;
                        }
                    }
                    return Ok(if is_global {
                        SmallStatement::Global(Global { tok, names, semicolon: None })
                    } else {
                        SmallStatement::Nonlocal(Nonlocal { tok, names, semicolon: None })
                    });
                }
                "del" => {
                    let del_tok = self.bump();
                    let target = self.testlist()?;
                    return Ok(SmallStatement::Del(Del { del_tok, target, semicolon: None }));
                }
                "yield" => {
                    let value = self.yield_expression()?;
                    return Ok(SmallStatement::Expr(ExprStatement { value, semicolon: None }));
                }
                _ => {}
            }
        }
        self.expression_statement()
    }

    fn expression_statement(&mut self) -> Result<SmallStatement, ParseError> {
        let expr = self.testlist()?;
        if self.at_op(":") {
            let colon = self.bump();
            let annotation = self.test()?;
            let (eq, value) = if self.at_op("=") {
                let eq = self.bump();
                let value = if self.at_keyword("yield") {
                    self.yield_expression()?
                } else {
                    self.testlist()?
                };
                (Some(eq), Some(value))
            } else {
                (None, None)
            };
            return Ok(SmallStatement::AnnAssign(AnnAssign {
                target: expr,
                colon,
                annotation,
                eq,
                value,
                semicolon: None,
            }));
        }
        if self.at_op("=") {
            let mut targets = Vec::new();
            let mut current = expr;
            while self.at_op("=") {
                let eq = self.bump();
                targets.push(AssignTarget { target: current, eq });
                current = if self.at_keyword("yield") {
                    self.yield_expression()?
                } else {
                    self.testlist()?
                };
            }
            return Ok(SmallStatement::Assign(Assign {
                targets,
                value: current,
                semicolon: None,
            }));
        }
        if let Some(op) = self.augmented_op() {
            let value = if self.at_keyword("yield") {
                self.yield_expression()?
            } else {
                self.testlist()?
            };
            return Ok(SmallStatement::AugAssign(AugAssign {
                target: expr,
                op,
                value,
                semicolon: None,
            }));
        }
        Ok(SmallStatement::Expr(ExprStatement { value: expr, semicolon: None }))
    }

    fn augmented_op(&mut self) -> Option<AugOp> {
        let tok = self.peek();
        if tok.kind != TokKind::Op {
            return None;
        }
        let build: fn(Token) -> AugOp = match tok.text.as_str() {
            "+=" => AugOp::AddAssign,
            "-=" => AugOp::SubtractAssign,
            "*=" => AugOp::MultiplyAssign,
            "/=" => AugOp::DivideAssign,
            "//=" => AugOp::FloorDivideAssign,
            "%=" => AugOp::ModuloAssign,
            "**=" => AugOp::PowerAssign,
            "@=" => AugOp::MatrixMultiplyAssign,
            "<<=" => AugOp::LeftShiftAssign,
            ">>=" => AugOp::RightShiftAssign,
            "&=" => AugOp::BitAndAssign,
            "|=" => AugOp::BitOrAssign,
            "^=" => AugOp::BitXorAssign,
            _ => return None,
        };
        Some(build(self.bump()))
    }

    fn import_statement(&mut self) -> Result<SmallStatement, ParseError> {
        let import_tok = self.bump();
        let mut names = Vec::new();
        loop {
            let name = self.dotted_name()?;
            let as_name = self.as_name()?;
            if self.at_op(",") {
                names.push(ImportAlias { name, as_name, comma: Some(self.bump()) });
            } else {
                names.push(ImportAlias { name, as_name, comma: None });
                break;
            }
        }
        Ok(SmallStatement::Import(Import { import_tok, names, semicolon: None }))
    }

    fn import_from_statement(&mut self) -> Result<SmallStatement, ParseError> {
        let from_tok = self.bump();
        let mut dots = Vec::new();
        while self.at_op(".") || self.at_op("...") {
            dots.push(self.bump());
        }
        let module = if self.at_keyword("import") {
            None
        } else {
            Some(self.dotted_name()?)
        };
        if module.is_none() && dots.is_empty() {
            return Err(self.unexpected("a module name"));
        }
        let import_tok = self.expect_keyword("import")?;
        if self.at_op("*") {
            let star = self.bump();
            return Ok(SmallStatement::ImportFrom(ImportFrom {
                from_tok,
                dots,
                module,
                import_tok,
                lpar: None,
                names: ImportNames::Star(star),
                rpar: None,
                semicolon: None,
            }));
        }
        let lpar = if self.at_op("(") { Some(self.bump()) } else { None };
        let parenthesized = lpar.is_some();
        let mut aliases = Vec::new();
        loop {
            if parenthesized && self.at_op(")") {
                break;
            }
            let name = Expression::Name(Name::new(self.expect_ident()?));
            let as_name = self.as_name()?;
            if self.at_op(",") {
                aliases.push(ImportAlias { name, as_name, comma: Some(self.bump()) });
                if !parenthesized && !self.at_expression_start() {
                    // A bare trailing comma is only legal inside parens.
                    return Err(self.unexpected("a name"));
                }
            } else {
                aliases.push(ImportAlias { name, as_name, comma: None });
                break;
            }
        }
        let rpar = if parenthesized { Some(self.expect_op(")")?) } else { None };
        Ok(SmallStatement::ImportFrom(ImportFrom {
            from_tok,
            dots,
            module,
            import_tok,
            lpar,
            names: ImportNames::Aliases(aliases),
            rpar,
            semicolon: None,
        }))
    }

    fn as_name(&mut self) -> Result<Option<AsName>, ParseError> {
        if self.at_keyword("as") {
            let as_tok = self.bump();
            let name = Name::new(self.expect_ident()?);
            Ok(Some(AsName { as_tok, name }))
        } else {
            Ok(None)
        }
    }

    fn dotted_name(&mut self) -> Result<Expression, ParseError> {
        let mut expr = Expression::Name(Name::new(self.expect_ident()?));
        while self.at_op(".") {
            let dot = self.bump();
            let attr = Name::new(self.expect_ident()?);
            expr = Expression::Attribute(Box::new(Attribute { value: expr, dot, attr }));
        }
        Ok(expr)
    }

    // ---- compound statements ----

    fn compound_statement(&mut self) -> Result<CompoundStatement, ParseError> {
        let mut decorators = Vec::new();
        while self.at_op("@") {
            let at = self.bump();
            let expr = self.namedexpr()?;
            let newline = self.expect_newline()?;
            decorators.push(Decorator { at, expr, newline });
        }
        if !decorators.is_empty()
            && !(self.at_keyword("def")
                || self.at_keyword("class")
                || (self.at_keyword("async") && self.next_is_keyword("def")))
        {
            return Err(self.unexpected("'def' or 'class'"));
        }
        let async_tok = if self.at_keyword("async") { Some(self.bump()) } else { None };
        if self.at_keyword("def") {
            return Ok(CompoundStatement::FunctionDef(self.function_def(decorators, async_tok)?));
        }
        if self.at_keyword("for") {
            return Ok(CompoundStatement::For(self.for_statement(async_tok)?));
        }
        if self.at_keyword("with") {
            return Ok(CompoundStatement::With(self.with_statement(async_tok)?));
        }
        if async_tok.is_some() {
            return Err(self.unexpected("'def', 'for', or 'with'"));
        }
        if self.at_keyword("class") {
            return Ok(CompoundStatement::ClassDef(self.class_def(decorators)?));
        }
        if self.at_keyword("if") {
            return Ok(CompoundStatement::If(self.if_statement()?));
        }
        if self.at_keyword("while") {
            return Ok(CompoundStatement::While(self.while_statement()?));
        }
        if self.at_keyword("try") {
            return Ok(CompoundStatement::Try(self.try_statement()?));
        }
        Err(self.unexpected("a statement"))
    }

    fn function_def(
        &mut self,
        decorators: Vec<Decorator>,
        async_tok: Option<Token>,
    ) -> Result<FunctionDef, ParseError> {
        let def_tok = self.bump();
        let name = Name::new(self.expect_ident()?);
        let lpar = self.expect_op("(")?;
        let params = self.parameters(true, ")")?;
        let rpar = self.expect_op(")")?;
        let returns = if self.at_op("->") {
            let arrow = self.bump();
            Some(ReturnAnnotation { arrow, annotation: self.test()? })
        } else {
            None
        };
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        Ok(FunctionDef {
            decorators,
            async_tok,
            def_tok,
            name,
            lpar,
            params,
            rpar,
            returns,
            colon,
            body,
        })
    }

    fn class_def(&mut self, decorators: Vec<Decorator>) -> Result<ClassDef, ParseError> {
        let class_tok = self.bump();
        let name = Name::new(self.expect_ident()?);
        let (lpar, bases, rpar) = if self.at_op("(") {
            let lpar = self.bump();
            let bases = self.call_args()?;
            let rpar = self.expect_op(")")?;
            (Some(lpar), bases, Some(rpar))
        } else {
            (None, Vec::new(), None)
        };
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        Ok(ClassDef {
            decorators,
            class_tok,
            name,
            lpar,
            bases,
            rpar,
            colon,
            body,
        })
    }

    fn if_statement(&mut self) -> Result<If, ParseError> {
        let if_tok = self.bump();
        let test = self.namedexpr()?;
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = self.if_orelse()?;
        Ok(If { if_tok, test, colon, body, orelse })
    }

    fn if_orelse(&mut self) -> Result<Option<OrElse>, ParseError> {
        if self.at_keyword("elif") {
            let elif = self.if_statement()?;
            Ok(Some(OrElse::Elif(Box::new(elif))))
        } else if self.at_keyword("else") {
            Ok(Some(OrElse::Else(self.else_clause()?)))
        } else {
            Ok(None)
        }
    }

    fn else_clause(&mut self) -> Result<Else, ParseError> {
        let else_tok = self.bump();
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        Ok(Else { else_tok, colon, body })
    }

    fn for_statement(&mut self, async_tok: Option<Token>) -> Result<For, ParseError> {
        let for_tok = self.bump();
        let target = self.target_list()?;
        let in_tok = self.expect_keyword("in")?;
        let iter = self.testlist()?;
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = if self.at_keyword("else") {
            Some(self.else_clause()?)
        } else {
            None
        };
        Ok(For {
            async_tok,
            for_tok,
            target,
            in_tok,
            iter,
            colon,
            body,
            orelse,
        })
    }

    fn while_statement(&mut self) -> Result<While, ParseError> {
        let while_tok = self.bump();
        let test = self.namedexpr()?;
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        let orelse = if self.at_keyword("else") {
            Some(self.else_clause()?)
        } else {
            None
        };
        Ok(While { while_tok, test, colon, body, orelse })
    }

    fn try_statement(&mut self) -> Result<Try, ParseError> {
        let try_tok = self.bump();
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        let mut handlers = Vec::new();
        while self.at_keyword("except") {
            let except_tok = self.bump();
            let etype = if self.at_op(":") { None } else { Some(self.test()?) };
            let as_name = self.as_name()?;
            let colon = self.expect_op(":")?;
            let handler_body = self.suite()?;
            handlers.push(ExceptHandler {
                except_tok,
                etype,
                as_name,
                colon,
                body: handler_body,
            });
        }
        let orelse = if self.at_keyword("else") {
            Some(self.else_clause()?)
        } else {
            None
        };
        let finalbody = if self.at_keyword("finally") {
            let finally_tok = self.bump();
            let colon = self.expect_op(":")?;
            let body = self.suite()?;
            Some(Finally { finally_tok, colon, body })
        } else {
            None
        };
        if handlers.is_empty() && finalbody.is_none() {
            return Err(self.unexpected("'except' or 'finally'"));
        }
        Ok(Try {
            try_tok,
            colon,
            body,
            handlers,
            orelse,
            finalbody,
        })
    }

    fn with_statement(&mut self, async_tok: Option<Token>) -> Result<With, ParseError> {
        let with_tok = self.bump();
        let mut items = Vec::new();
        loop {
            let item = self.test()?;
            let as_clause = if self.at_keyword("as") {
                let as_tok = self.bump();
                Some(WithAs { as_tok, target: self.bitor()? })
            } else {
                None
            };
            if self.at_op(",") {
                items.push(WithItem { item, as_clause, comma: Some(self.bump()) });
            } else {
                items.push(WithItem { item, as_clause, comma: None });
                break;
            }
        }
        let colon = self.expect_op(":")?;
        let body = self.suite()?;
        Ok(With {
            async_tok,
            with_tok,
            items,
            colon,
            body,
        })
    }

    fn suite(&mut self) -> Result<Suite, ParseError> {
        if self.peek().kind == TokKind::Newline {
            let newline = self.bump();
            if self.peek().kind != TokKind::Indent {
                return Err(self.unexpected("an indented block"));
            }
            self.bump();
            let mut body = Vec::new();
            while !matches!(self.peek().kind, TokKind::Dedent | TokKind::EndMarker) {
                body.push(self.statement()?);
            }
            if body.is_empty() {
                return Err(self.unexpected("a statement"));
            }
            if self.peek().kind == TokKind::Dedent {
                self.bump();
            }
            Ok(Suite::Indented(IndentedBlock { newline, body }))
        } else {
            let mut body = Vec::new();
            loop {
                let mut small = self.small_statement()?;
                if self.at_op(";") {
                    small.set_semicolon(Some(self.bump()));
                    body.push(small);
                    if self.peek().kind == TokKind::Newline {
                        break;
                    }
                } else {
                    body.push(small);
                    break;
                }
            }
            let newline = self.expect_newline()?;
            Ok(Suite::Simple(SimpleStatementSuite { body, newline }))
        }
    }

    // ---- expressions ----

    /// `test (',' test)*` with a bare tuple result when a comma appears.
    fn testlist(&mut self) -> Result<Expression, ParseError> {
        let first = self.test_or_starred()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elements = vec![Element { value: first, comma: None }];
        while self.at_op(",") {
            let comma = self.bump();
            if let Some(last) = elements.last_mut() {
                last.comma = Some(comma);
            }
            if !self.at_expression_start() {
                break;
            }
            let value = self.test_or_starred()?;
            elements.push(Element { value, comma: None });
        }
        Ok(Expression::Tuple(Tuple { lpar: None, elements, rpar: None }))
    }

    /// Assignment and loop targets: bitwise-or level, commas allowed,
    /// stopping before `in`.
    fn target_list(&mut self) -> Result<Expression, ParseError> {
        let first = self.target_atom()?;
        if !self.at_op(",") {
            return Ok(first);
        }
        let mut elements = vec![Element { value: first, comma: None }];
        while self.at_op(",") {
            let comma = self.bump();
            if let Some(last) = elements.last_mut() {
                last.comma = Some(comma);
            }
            if !self.at_expression_start() {
                break;
            }
            let value = self.target_atom()?;
            elements.push(Element { value, comma: None });
        }
        Ok(Expression::Tuple(Tuple { lpar: None, elements, rpar: None }))
    }

    fn target_atom(&mut self) -> Result<Expression, ParseError> {
        if self.at_op("*") {
            let star = self.bump();
            let expr = self.bitor()?;
            return Ok(Expression::Starred(Box::new(Starred { star, expr })));
        }
        self.bitor()
    }

    fn test_or_starred(&mut self) -> Result<Expression, ParseError> {
        if self.at_op("*") {
            let star = self.bump();
            let expr = self.bitor()?;
            return Ok(Expression::Starred(Box::new(Starred { star, expr })));
        }
        self.test()
    }

    fn namedexpr_or_starred(&mut self) -> Result<Expression, ParseError> {
        if self.at_op("*") {
            let star = self.bump();
            let expr = self.bitor()?;
            return Ok(Expression::Starred(Box::new(Starred { star, expr })));
        }
        self.namedexpr()
    }

    fn namedexpr(&mut self) -> Result<Expression, ParseError> {
        let expr = self.test()?;
        if self.at_op(":=") {
            let walrus = self.bump();
            let value = self.test()?;
            return Ok(Expression::NamedExpr(Box::new(NamedExpr {
                target: expr,
                walrus,
                value,
            })));
        }
        Ok(expr)
    }

    fn test(&mut self) -> Result<Expression, ParseError> {
        if self.at_keyword("lambda") {
            return self.lambda();
        }
        let body = self.or_test()?;
        if self.at_keyword("if") {
            let if_tok = self.bump();
            let test = self.or_test()?;
            let else_tok = self.expect_keyword("else")?;
            let orelse = self.test()?;
            return Ok(Expression::IfExp(Box::new(IfExp {
                body,
                if_tok,
                test,
                else_tok,
                orelse,
            })));
        }
        Ok(body)
    }

    fn lambda(&mut self) -> Result<Expression, ParseError> {
        let lambda_tok = self.bump();
        let params = self.parameters(false, ":")?;
        let colon = self.expect_op(":")?;
        let body = self.test()?;
        Ok(Expression::Lambda(Box::new(Lambda {
            lambda_tok,
            params,
            colon,
            body,
        })))
    }

    fn or_test(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.and_test()?;
        while self.at_keyword("or") {
            let op = BooleanOp::Or(self.bump());
            let right = self.and_test()?;
            left = Expression::BooleanOperation(Box::new(BooleanOperation { left, op, right }));
        }
        Ok(left)
    }

    fn and_test(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.not_test()?;
        while self.at_keyword("and") {
            let op = BooleanOp::And(self.bump());
            let right = self.not_test()?;
            left = Expression::BooleanOperation(Box::new(BooleanOperation { left, op, right }));
        }
        Ok(left)
    }

    fn not_test(&mut self) -> Result<Expression, ParseError> {
        if self.at_keyword("not") {
            let op = UnaryOp::Not(self.bump());
            let expr = self.not_test()?;
            return Ok(Expression::UnaryOperation(Box::new(UnaryOperation { op, expr })));
        }
        self.comparison()
    }

    fn comparison(&mut self) -> Result<Expression, ParseError> {
        let left = self.bitor()?;
        let mut comparisons = Vec::new();
        loop {
            let operator = if self.at_op("<") {
                CompOp::LessThan(self.bump())
            } else if self.at_op(">") {
                CompOp::GreaterThan(self.bump())
            } else if self.at_op("<=") {
                CompOp::LessThanEqual(self.bump())
            } else if self.at_op(">=") {
                CompOp::GreaterThanEqual(self.bump())
            } else if self.at_op("==") {
                CompOp::Equal(self.bump())
            } else if self.at_op("!=") {
                CompOp::NotEqual(self.bump())
            } else if self.at_keyword("in") {
                CompOp::In(self.bump())
            } else if self.at_keyword("not") && self.next_is_keyword("in") {
                let not_tok = self.bump();
                let in_tok = self.bump();
                CompOp::NotIn { not_tok, in_tok }
            } else if self.at_keyword("is") {
                let is_tok = self.bump();
                if self.at_keyword("not") {
                    let not_tok = self.bump();
                    CompOp::IsNot { is_tok, not_tok }
                } else {
                    CompOp::Is(is_tok)
                }
            } else {
                break;
            };
            let comparator = self.bitor()?;
            comparisons.push(ComparisonTarget { operator, comparator });
        }
        if comparisons.is_empty() {
            Ok(left)
        } else {
            Ok(Expression::Comparison(Box::new(Comparison { left, comparisons })))
        }
    }

    fn bitor(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.bitxor()?;
        while self.at_op("|") {
            let op = BinaryOp::BitOr(self.bump());
            let right = self.bitxor()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn bitxor(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.bitand()?;
        while self.at_op("^") {
            let op = BinaryOp::BitXor(self.bump());
            let right = self.bitand()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn bitand(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.shift()?;
        while self.at_op("&") {
            let op = BinaryOp::BitAnd(self.bump());
            let right = self.shift()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn shift(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.arith()?;
        loop {
            let op = if self.at_op("<<") {
                BinaryOp::LeftShift(self.bump())
            } else if self.at_op(">>") {
                BinaryOp::RightShift(self.bump())
            } else {
                break;
            };
            let right = self.arith()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn arith(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.term()?;
        loop {
            let op = if self.at_op("+") {
                BinaryOp::Add(self.bump())
            } else if self.at_op("-") {
                BinaryOp::Subtract(self.bump())
            } else {
                break;
            };
            let right = self.term()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn term(&mut self) -> Result<Expression, ParseError> {
        let mut left = self.factor()?;
        loop {
            let op = if self.at_op("*") {
                BinaryOp::Multiply(self.bump())
            } else if self.at_op("/") {
                BinaryOp::Divide(self.bump())
            } else if self.at_op("//") {
                BinaryOp::FloorDivide(self.bump())
            } else if self.at_op("%") {
                BinaryOp::Modulo(self.bump())
            } else if self.at_op("@") {
                BinaryOp::MatrixMultiply(self.bump())
            } else {
                break;
            };
            let right = self.factor()?;
            left = Expression::BinaryOperation(Box::new(BinaryOperation { left, op, right }));
        }
        Ok(left)
    }

    fn factor(&mut self) -> Result<Expression, ParseError> {
        let op = if self.at_op("-") {
            UnaryOp::Minus(self.bump())
        } else if self.at_op("+") {
            UnaryOp::Plus(self.bump())
        } else if self.at_op("~") {
            UnaryOp::BitInvert(self.bump())
        } else {
            return self.power();
        };
        let expr = self.factor()?;
        Ok(Expression::UnaryOperation(Box::new(UnaryOperation { op, expr })))
    }

    fn power(&mut self) -> Result<Expression, ParseError> {
        let base = self.await_primary()?;
        if self.at_op("**") {
            let op = BinaryOp::Power(self.bump());
            let right = self.factor()?;
            return Ok(Expression::BinaryOperation(Box::new(BinaryOperation {
                left: base,
                op,
                right,
            })));
        }
        Ok(base)
    }

    fn await_primary(&mut self) -> Result<Expression, ParseError> {
        if self.at_keyword("await") {
            let await_tok = self.bump();
            let expr = self.primary()?;
            return Ok(Expression::Await(Box::new(Await { await_tok, expr })));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<Expression, ParseError> {
        let mut expr = self.atom()?;
        loop {
            if self.at_op("(") {
                let lpar = self.bump();
                let args = self.call_args()?;
                let rpar = self.expect_op(")")?;
                expr = Expression::Call(Box::new(Call { func: expr, lpar, args, rpar }));
            } else if self.at_op("[") {
                let lbracket = self.bump();
                let index = self.subscript_index()?;
                let rbracket = self.expect_op("]")?;
                expr = Expression::Subscript(Box::new(Subscript {
                    value: expr,
                    lbracket,
                    index,
                    rbracket,
                }));
            } else if self.at_op(".") {
                let dot = self.bump();
                let attr = Name::new(self.expect_ident()?);
                expr = Expression::Attribute(Box::new(Attribute { value: expr, dot, attr }));
            } else {
                break;
            }
        }
        Ok(expr)
    }

    fn call_args(&mut self) -> Result<Vec<Arg>, ParseError> {
        let mut args: Vec<Arg> = Vec::new();
        while !self.at_op(")") {
            let star = if self.at_op("**") || self.at_op("*") {
                Some(self.bump())
            } else {
                None
            };
            let (keyword, eq, mut value) = if star.is_none()
                && self.peek().kind == TokKind::Name
                && !is_reserved(&self.peek().text)
                && self.peek_at(1).kind == TokKind::Op
                && self.peek_at(1).text == "="
            {
                let keyword = Name::new(self.bump());
                let eq = self.bump();
                (Some(keyword), Some(eq), self.test()?)
            } else {
                (None, None, self.namedexpr()?)
            };
            if args.is_empty()
                && star.is_none()
                && keyword.is_none()
                && (self.at_keyword("for")
                    || (self.at_keyword("async") && self.next_is_keyword("for")))
            {
                let for_in = self.comp_for()?;
                value = Expression::GeneratorExp(Box::new(GeneratorExp {
                    lpar: None,
                    elt: value,
                    for_in,
                    rpar: None,
                }));
            }
            let comma = if self.at_op(",") { Some(self.bump()) } else { None };
            let done = comma.is_none();
            args.push(Arg { star, keyword, eq, value, comma });
            if done {
                break;
            }
        }
        Ok(args)
    }

    fn subscript_index(&mut self) -> Result<BaseSlice, ParseError> {
        enum Item {
            Plain(Expression),
            Sliced(Slice),
        }
        let mut items = Vec::new();
        let mut commas = Vec::new();
        loop {
            let lower = if self.at_op(":") { None } else { Some(self.test()?) };
            if self.at_op(":") {
                let colon1 = self.bump();
                let upper = if self.at_expression_start() { Some(self.test()?) } else { None };
                let (colon2, step) = if self.at_op(":") {
                    let colon2 = self.bump();
                    let step = if self.at_expression_start() { Some(self.test()?) } else { None };
                    (Some(colon2), step)
                } else {
                    (None, None)
                };
                items.push(Item::Sliced(Slice { lower, colon1, upper, colon2, step }));
            } else {
                match lower {
                    Some(expr) => items.push(Item::Plain(expr)),
                    None => return Err(self.unexpected("a subscript")),
                }
            }
            if self.at_op(",") {
                commas.push(self.bump());
                if self.at_op("]") {
                    break;
                }
            } else {
                break;
            }
        }
        if items.len() == 1 && commas.is_empty() {
            return Ok(match items.remove(0) {
                Item::Plain(expr) => BaseSlice::Index(Box::new(expr)),
                Item::Sliced(slice) => BaseSlice::Slice(Box::new(slice)),
            });
        }
        // Multiple subscript items parse as a bare tuple; mixing in slice
        // syntax (as in `a[1:2, 3]`) is not supported.
        let mut elements = Vec::new();
        let mut commas = commas.into_iter();
        for item in items {
            match item {
                Item::Plain(expr) => elements.push(Element { value: expr, comma: commas.next() }),
                Item::Sliced(_) => return Err(self.unexpected("a subscript expression")),
            }
        }
        Ok(BaseSlice::Index(Box::new(Expression::Tuple(Tuple {
            lpar: None,
            elements,
            rpar: None,
        }))))
    }

    fn atom(&mut self) -> Result<Expression, ParseError> {
        let tok = self.peek();
        match tok.kind {
            TokKind::Number => {
                let tok = self.bump();
                Ok(classify_number(tok))
            }
            TokKind::Str => {
                let first = SimpleString::new(self.bump());
                if self.peek().kind == TokKind::Str {
                    let mut parts = vec![first];
                    while self.peek().kind == TokKind::Str {
                        parts.push(SimpleString::new(self.bump()));
                    }
                    Ok(Expression::ConcatenatedString(ConcatenatedString { parts }))
                } else {
                    Ok(Expression::SimpleString(first))
                }
            }
            TokKind::Name => {
                let text = tok.text.as_str();
                if !is_reserved(text) || matches!(text, "None" | "True" | "False") {
                    Ok(Expression::Name(Name::new(self.bump())))
                } else {
                    Err(self.unexpected("an expression"))
                }
            }
            TokKind::Op => match tok.text.as_str() {
                "..." => Ok(Expression::EllipsisLiteral(EllipsisLiteral { tok: self.bump() })),
                "(" => self.paren_atom(),
                "[" => self.list_atom(),
                "{" => self.brace_atom(),
                _ => Err(self.unexpected("an expression")),
            },
            _ => Err(self.unexpected("an expression")),
        }
    }

    fn paren_atom(&mut self) -> Result<Expression, ParseError> {
        let lpar = self.bump();
        if self.at_op(")") {
            let rpar = self.bump();
            return Ok(Expression::Tuple(Tuple {
                lpar: Some(lpar),
                elements: Vec::new(),
                rpar: Some(rpar),
            }));
        }
        if self.at_keyword("yield") {
            let expr = self.yield_expression()?;
            let rpar = self.expect_op(")")?;
            return Ok(Expression::Parenthesized(Box::new(Parenthesized { lpar, expr, rpar })));
        }
        let first = self.namedexpr_or_starred()?;
        if self.at_keyword("for") || (self.at_keyword("async") && self.next_is_keyword("for")) {
            let for_in = self.comp_for()?;
            let rpar = self.expect_op(")")?;
            return Ok(Expression::GeneratorExp(Box::new(GeneratorExp {
                lpar: Some(lpar),
                elt: first,
                for_in,
                rpar: Some(rpar),
            })));
        }
        if self.at_op(",") {
            let elements = self.finish_elements(first, ")")?;
            let rpar = self.expect_op(")")?;
            return Ok(Expression::Tuple(Tuple {
                lpar: Some(lpar),
                elements,
                rpar: Some(rpar),
            }));
        }
        let rpar = self.expect_op(")")?;
        Ok(Expression::Parenthesized(Box::new(Parenthesized { lpar, expr: first, rpar })))
    }

    fn list_atom(&mut self) -> Result<Expression, ParseError> {
        let lbracket = self.bump();
        if self.at_op("]") {
            let rbracket = self.bump();
            return Ok(Expression::List(List {
                lbracket,
                elements: Vec::new(),
                rbracket,
            }));
        }
        let first = self.namedexpr_or_starred()?;
        if self.at_keyword("for") || (self.at_keyword("async") && self.next_is_keyword("for")) {
            let for_in = self.comp_for()?;
            let rbracket = self.expect_op("]")?;
            return Ok(Expression::ListComp(Box::new(ListComp {
                lbracket,
                elt: first,
                for_in,
                rbracket,
            })));
        }
        let elements = self.finish_elements(first, "]")?;
        let rbracket = self.expect_op("]")?;
        Ok(Expression::List(List { lbracket, elements, rbracket }))
    }

    fn brace_atom(&mut self) -> Result<Expression, ParseError> {
        let lbrace = self.bump();
        if self.at_op("}") {
            let rbrace = self.bump();
            return Ok(Expression::Dict(Dict {
                lbrace,
                elements: Vec::new(),
                rbrace,
            }));
        }
        if self.at_op("**") {
            let star = self.bump();
            let value = self.bitor()?;
            let first = DictElement::Starred { star, value, comma: None };
            let elements = self.finish_dict_elements(first)?;
            let rbrace = self.expect_op("}")?;
            return Ok(Expression::Dict(Dict { lbrace, elements, rbrace }));
        }
        if self.at_op("*") {
            let star = self.bump();
            let expr = self.bitor()?;
            let first = Expression::Starred(Box::new(Starred { star, expr }));
            let elements = self.finish_elements(first, "}")?;
            let rbrace = self.expect_op("}")?;
            return Ok(Expression::Set(Set { lbrace, elements, rbrace }));
        }
        let first = self.namedexpr()?;
        if self.at_op(":") {
            let colon = self.bump();
            let value = self.test()?;
            if self.at_keyword("for") || (self.at_keyword("async") && self.next_is_keyword("for")) {
                let for_in = self.comp_for()?;
                let rbrace = self.expect_op("}")?;
                return Ok(Expression::DictComp(Box::new(DictComp {
                    lbrace,
                    key: first,
                    colon,
                    value,
                    for_in,
                    rbrace,
                })));
            }
            let first = DictElement::Simple {
                key: first,
                colon,
                value,
                comma: None,
            };
            let elements = self.finish_dict_elements(first)?;
            let rbrace = self.expect_op("}")?;
            return Ok(Expression::Dict(Dict { lbrace, elements, rbrace }));
        }
        if self.at_keyword("for") || (self.at_keyword("async") && self.next_is_keyword("for")) {
            let for_in = self.comp_for()?;
            let rbrace = self.expect_op("}")?;
            return Ok(Expression::SetComp(Box::new(SetComp {
                lbrace,
                elt: first,
                for_in,
                rbrace,
            })));
        }
        let elements = self.finish_elements(first, "}")?;
        let rbrace = self.expect_op("}")?;
        Ok(Expression::Set(Set { lbrace, elements, rbrace }))
    }

    fn finish_elements(&mut self, first: Expression, close: &str) -> Result<Vec<Element>, ParseError> {
        let mut elements = vec![Element { value: first, comma: None }];
        while self.at_op(",") {
            let comma = self.bump();
            if let Some(last) = elements.last_mut() {
                last.comma = Some(comma);
            }
            if self.at_op(close) {
                break;
            }
            let value = self.namedexpr_or_starred()?;
            elements.push(Element { value, comma: None });
        }
        Ok(elements)
    }

    fn finish_dict_elements(&mut self, first: DictElement) -> Result<Vec<DictElement>, ParseError> {
        let mut elements = vec![first];
        while self.at_op(",") {
            let comma = self.bump();
            if let Some(last) = elements.last_mut() {
                match last {
                    DictElement::Simple { comma: slot, .. }
                    | DictElement::Starred { comma: slot, .. } => *slot = Some(comma),
                }
            }
            if self.at_op("}") {
                break;
            }
            if self.at_op("**") {
                let star = self.bump();
                let value = self.bitor()?;
                elements.push(DictElement::Starred { star, value, comma: None });
            } else {
                let key = self.test()?;
                let colon = self.expect_op(":")?;
                let value = self.test()?;
                elements.push(DictElement::Simple { key, colon, value, comma: None });
            }
        }
        Ok(elements)
    }

    fn comp_for(&mut self) -> Result<CompFor, ParseError> {
        let async_tok = if self.at_keyword("async") && self.next_is_keyword("for") {
            Some(self.bump())
        } else {
            None
        };
        let for_tok = self.expect_keyword("for")?;
        let target = self.target_list()?;
        let in_tok = self.expect_keyword("in")?;
        let iter = self.or_test()?;
        let mut ifs = Vec::new();
        while self.at_keyword("if") {
            let if_tok = self.bump();
            let test = self.or_test()?;
            ifs.push(CompIf { if_tok, test });
        }
        let inner_for_in = if self.at_keyword("for")
            || (self.at_keyword("async") && self.next_is_keyword("for"))
        {
            Some(Box::new(self.comp_for()?))
        } else {
            None
        };
        Ok(CompFor {
            async_tok,
            for_tok,
            target,
            in_tok,
            iter,
            ifs,
            inner_for_in,
        })
    }

    fn yield_expression(&mut self) -> Result<Expression, ParseError> {
        let yield_tok = self.bump();
        let value = if self.at_keyword("from") {
            let from_tok = self.bump();
            let expr = self.test()?;
            Some(YieldValue::From(YieldFrom { from_tok, expr }))
        } else if self.at_expression_start() {
            Some(YieldValue::Expr(self.testlist()?))
        } else {
            None
        };
        Ok(Expression::Yield(Box::new(Yield { yield_tok, value })))
    }

    fn parameters(&mut self, allow_annotations: bool, close: &str) -> Result<Parameters, ParseError> {
        let mut params = Vec::new();
        while !self.at_op(close) {
            let star = if self.at_op("*") || self.at_op("**") || self.at_op("/") {
                Some(self.bump())
            } else {
                None
            };
            let name = if self.peek().kind == TokKind::Name && !is_reserved(&self.peek().text) {
                Some(Name::new(self.bump()))
            } else {
                None
            };
            if star.is_none() && name.is_none() {
                return Err(self.unexpected("a parameter"));
            }
            let (colon, annotation) = if allow_annotations && name.is_some() && self.at_op(":") {
                let colon = self.bump();
                (Some(colon), Some(self.test()?))
            } else {
                (None, None)
            };
            let (eq, default) = if self.at_op("=") {
                let eq = self.bump();
                (Some(eq), Some(self.test()?))
            } else {
                (None, None)
            };
            let comma = if self.at_op(",") { Some(self.bump()) } else { None };
            let done = comma.is_none();
            params.push(Param {
                star,
                name,
                colon,
                annotation,
                eq,
                default,
                comma,
            });
            if done {
                break;
            }
        }
        Ok(Parameters { params })
    }
}

fn classify_number(tok: Token) -> Expression {
    let text = tok.text.as_str();
    if text.ends_with('j') || text.ends_with('J') {
        return Expression::Imaginary(Imaginary { tok });
    }
    let lower = text.get(..2).map(str::to_ascii_lowercase);
    if matches!(lower.as_deref(), Some("0x") | Some("0o") | Some("0b")) {
        return Expression::Integer(Integer { tok });
    }
    if text.contains('.') || text.contains('e') || text.contains('E') {
        return Expression::Float(Float { tok });
    }
    Expression::Integer(Integer { tok })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(src: &str) {
        let module = parse_module(src).unwrap();
        assert_eq!(module.code(), src, "render differs from input");
    }

    #[test]
    fn test_empty_module() {
        let module = parse_module("").unwrap();
        assert!(module.body.is_empty());
        assert_eq!(module.code(), "");
    }

    #[test]
    fn test_assignment_roundtrip() {
        roundtrip("x = 1\n");
        roundtrip("x = y = 2\n");
        roundtrip("x, y = 1, 2\n");
        roundtrip("x += 1\n");
        roundtrip("x: int = 5\n");
    }

    #[test]
    fn test_call_shapes() {
        let module = parse_module("f(a, b=2, *c, **d)\n").unwrap();
        let Statement::Simple(line) = &module.body[0] else {
            panic!("expected simple statement");
        };
        let SmallStatement::Expr(expr) = &line.body[0] else {
            panic!("expected expression statement");
        };
        let Expression::Call(call) = &expr.value else {
            panic!("expected call");
        };
        assert_eq!(call.args.len(), 4);
        assert!(call.args[1].is_keyword());
        assert_eq!(call.args[2].star.as_ref().unwrap().text, "*");
        assert_eq!(call.args[3].star.as_ref().unwrap().text, "**");
    }

    #[test]
    fn test_dict_call_parses_keywords() {
        let expr = parse_expression("dict(a=1, b=2)").unwrap();
        let Expression::Call(call) = expr else { panic!("expected call") };
        assert!(call.args.iter().all(|a| a.is_keyword()));
    }

    #[test]
    fn test_genexp_sole_argument_has_no_own_parens() {
        let expr = parse_expression("set(x for x in y)").unwrap();
        let Expression::Call(call) = expr else { panic!("expected call") };
        let Expression::GeneratorExp(genexp) = &call.args[0].value else {
            panic!("expected generator");
        };
        assert!(genexp.lpar.is_none());
    }

    #[test]
    fn test_parenthesized_tuple_keeps_parens() {
        let expr = parse_expression("(a, b)").unwrap();
        let Expression::Tuple(tuple) = expr else { panic!("expected tuple") };
        assert!(tuple.lpar.is_some());
        assert_eq!(tuple.elements.len(), 2);
    }

    #[test]
    fn test_parenthesized_single_expression() {
        let expr = parse_expression("(a)").unwrap();
        assert!(matches!(expr, Expression::Parenthesized(_)));
    }

    #[test]
    fn test_comparison_chain() {
        let expr = parse_expression("a < b <= c").unwrap();
        let Expression::Comparison(cmp) = expr else { panic!("expected comparison") };
        assert_eq!(cmp.comparisons.len(), 2);
    }

    #[test]
    fn test_not_in_and_is_not() {
        let expr = parse_expression("a not in b").unwrap();
        let Expression::Comparison(cmp) = expr else { panic!("expected comparison") };
        assert!(matches!(cmp.comparisons[0].operator, CompOp::NotIn { .. }));

        let expr = parse_expression("a is not b").unwrap();
        let Expression::Comparison(cmp) = expr else { panic!("expected comparison") };
        assert!(matches!(cmp.comparisons[0].operator, CompOp::IsNot { .. }));
    }

    #[test]
    fn test_unary_not_of_comparison() {
        let expr = parse_expression("not x in y").unwrap();
        let Expression::UnaryOperation(unary) = expr else { panic!("expected unary") };
        assert!(matches!(unary.op, UnaryOp::Not(_)));
        assert!(matches!(unary.expr, Expression::Comparison(_)));
    }

    #[test]
    fn test_precedence_or_binds_whole_comparison() {
        // `not x in y or z` is `(not (x in y)) or z`
        let expr = parse_expression("not x in y or z").unwrap();
        assert!(matches!(expr, Expression::BooleanOperation(_)));
    }

    #[test]
    fn test_class_def_with_bases() {
        let src = "class Foo(object, metaclass=Meta):\n    pass\n";
        let module = parse_module(src).unwrap();
        let Statement::Compound(CompoundStatement::ClassDef(class)) = &module.body[0] else {
            panic!("expected class");
        };
        assert_eq!(class.bases.len(), 2);
        assert!(class.bases[1].is_keyword());
        assert_eq!(module.code(), src);
    }

    #[test]
    fn test_try_except_tuple() {
        let src = "try:\n    pass\nexcept (IOError, ValueError):\n    pass\n";
        let module = parse_module(src).unwrap();
        let Statement::Compound(CompoundStatement::Try(try_stmt)) = &module.body[0] else {
            panic!("expected try");
        };
        let etype = try_stmt.handlers[0].etype.as_ref().unwrap();
        assert!(matches!(etype, Expression::Tuple(_)));
        assert_eq!(module.code(), src);
    }

    #[test]
    fn test_import_variants() {
        roundtrip("import os\n");
        roundtrip("import os.path as p, sys\n");
        roundtrip("from os import path\n");
        roundtrip("from os import (path, sep,)\n");
        roundtrip("from . import base\n");
        roundtrip("from ...pkg import mod\n");
        roundtrip("from __future__ import annotations\n");
    }

    #[test]
    fn test_compound_statements_roundtrip() {
        roundtrip("if a:\n    b = 1\nelif c:\n    d = 2\nelse:\n    e = 3\n");
        roundtrip("while x:\n    break\nelse:\n    pass\n");
        roundtrip("for i in range(3):\n    print(i)\n");
        roundtrip("async def f():\n    await g()\n");
        roundtrip("with open(p) as fh, lock:\n    pass\n");
        roundtrip("try:\n    pass\nexcept OSError as e:\n    raise\nfinally:\n    close()\n");
    }

    #[test]
    fn test_def_with_defaults_and_star_args() {
        roundtrip("def f(a, b=1, *args, c, **kwargs) -> int:\n    return a\n");
        roundtrip("def g(a, /, b, *, c):\n    pass\n");
    }

    #[test]
    fn test_lambda_and_ternary() {
        roundtrip("f = lambda x, y=2: x + y\n");
        roundtrip("v = a if cond else b\n");
    }

    #[test]
    fn test_comprehensions_roundtrip() {
        roundtrip("s = {x for x in y}\n");
        roundtrip("d = {k: v for k, v in items}\n");
        roundtrip("l = [x * 2 for x in y if x]\n");
        roundtrip("g = (x for y in z for x in y)\n");
    }

    #[test]
    fn test_dict_and_set_literals() {
        roundtrip("d = {'a': 1, 'b': 2}\n");
        roundtrip("d = {**base, 'k': v}\n");
        roundtrip("s = {1, 2, 3}\n");
        roundtrip("e = {}\n");
    }

    #[test]
    fn test_slices() {
        roundtrip("a = l[1:]\n");
        roundtrip("a = l[::2]\n");
        roundtrip("a = l[x:y:z]\n");
        roundtrip("a = m[1, 2]\n");
    }

    #[test]
    fn test_yield_forms() {
        roundtrip("def f():\n    yield\n");
        roundtrip("def f():\n    yield x\n");
        roundtrip("def f():\n    yield from xs\n");
        roundtrip("def f():\n    v = yield x\n");
    }

    #[test]
    fn test_decorators() {
        roundtrip("@wraps(fn)\n@other\ndef f():\n    pass\n");
    }

    #[test]
    fn test_semicolons() {
        roundtrip("a = 1; b = 2\n");
        roundtrip("a = 1;\n");
        roundtrip("if x: a = 1; b = 2\n");
    }

    #[test]
    fn test_string_concatenation() {
        let expr = parse_expression("'a' 'b' 'c'").unwrap();
        let Expression::ConcatenatedString(parts) = expr else {
            panic!("expected concatenated string");
        };
        assert_eq!(parts.parts.len(), 3);
    }

    #[test]
    fn test_error_has_position() {
        let err = parse_module("def f(:\n    pass\n").unwrap_err();
        assert_eq!(err.line, 1);
        assert!(err.message.contains("expected"));
    }

    #[test]
    fn test_unbalanced_paren_is_error() {
        assert!(parse_module("x = (1 + 2\n").is_err());
    }

    #[test]
    fn test_walrus() {
        roundtrip("while chunk := read():\n    use(chunk)\n");
        roundtrip("if (n := len(a)) > 10:\n    pass\n");
    }

    #[test]
    fn test_global_nonlocal_del_assert() {
        roundtrip("global a, b\n");
        roundtrip("def f():\n    nonlocal x\n");
        roundtrip("del d['k']\n");
        roundtrip("assert x, 'message'\n");
    }
}
