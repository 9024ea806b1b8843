//! Expression nodes.
//!
//! Nodes own their tokens in source order, so a node carries everything
//! needed to reproduce its exact original text. Replacement nodes built by
//! rewrite rules use detached tokens and splice in trivia from the nodes
//! they replace.

use crate::token::Token;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Name(Name),
    Integer(Integer),
    Float(Float),
    Imaginary(Imaginary),
    SimpleString(SimpleString),
    ConcatenatedString(ConcatenatedString),
    EllipsisLiteral(EllipsisLiteral),
    Attribute(Box<Attribute>),
    Call(Box<Call>),
    Subscript(Box<Subscript>),
    UnaryOperation(Box<UnaryOperation>),
    BinaryOperation(Box<BinaryOperation>),
    BooleanOperation(Box<BooleanOperation>),
    Comparison(Box<Comparison>),
    IfExp(Box<IfExp>),
    Lambda(Box<Lambda>),
    Await(Box<Await>),
    Yield(Box<Yield>),
    Starred(Box<Starred>),
    NamedExpr(Box<NamedExpr>),
    Parenthesized(Box<Parenthesized>),
    Tuple(Tuple),
    List(List),
    Set(Set),
    Dict(Dict),
    GeneratorExp(Box<GeneratorExp>),
    ListComp(Box<ListComp>),
    SetComp(Box<SetComp>),
    DictComp(Box<DictComp>),
}

impl Expression {
    /// Leading trivia of the expression's first token.
    pub fn leading(&self) -> &str {
        &self.first_token().leading
    }

    /// Replace the leading trivia of the expression's first token. Used to
    /// transplant the spacing of a replaced node onto its replacement.
    pub fn set_leading(&mut self, leading: impl Into<String>) {
        self.first_token_mut().leading = leading.into();
    }
}

/// An identifier or keyword constant (`None`, `True`, `False` are names).
#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub tok: Token,
}

impl Name {
    pub fn new(tok: Token) -> Self {
        Name { tok }
    }

    pub fn detached(value: impl Into<String>) -> Self {
        Name { tok: Token::name(value) }
    }

    pub fn value(&self) -> &str {
        &self.tok.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Integer {
    pub tok: Token,
}

impl Integer {
    pub fn detached(value: impl Into<String>) -> Self {
        Integer { tok: Token::number(value) }
    }

    pub fn value(&self) -> &str {
        &self.tok.text
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Float {
    pub tok: Token,
}

impl Float {
    pub fn value(&self) -> &str {
        &self.tok.text
    }

    /// Numeric value, ignoring digit-group underscores.
    pub fn to_f64(&self) -> Option<f64> {
        self.tok.text.replace('_', "").parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Imaginary {
    pub tok: Token,
}

/// The `...` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct EllipsisLiteral {
    pub tok: Token,
}

/// A single string or bytes literal, prefix and quotes included.
#[derive(Debug, Clone, PartialEq)]
pub struct SimpleString {
    pub tok: Token,
}

impl SimpleString {
    pub fn new(tok: Token) -> Self {
        SimpleString { tok }
    }

    pub fn detached(text: impl Into<String>) -> Self {
        SimpleString { tok: Token::string(text) }
    }

    /// Full literal text including prefix and quotes.
    pub fn text(&self) -> &str {
        &self.tok.text
    }

    /// The prefix letters before the opening quote (`r`, `b`, `f`, ...).
    pub fn prefix(&self) -> &str {
        let text = self.text();
        let end = text.find(['"', '\'']).unwrap_or(0);
        &text[..end]
    }

    /// The quote sequence, either one or three quote characters.
    pub fn quote(&self) -> &str {
        let text = &self.text()[self.prefix().len()..];
        if text.starts_with("\"\"\"") {
            "\"\"\""
        } else if text.starts_with("'''") {
            "'''"
        } else if text.starts_with('"') {
            "\""
        } else {
            "'"
        }
    }

    /// The text between the quotes, escapes left as written.
    pub fn raw_value(&self) -> &str {
        let text = self.text();
        let start = self.prefix().len() + self.quote().len();
        let end = text.len().saturating_sub(self.quote().len());
        if start <= end {
            &text[start..end]
        } else {
            ""
        }
    }

    pub fn is_bytes(&self) -> bool {
        self.prefix().to_ascii_lowercase().contains('b')
    }

    pub fn is_fstring(&self) -> bool {
        self.prefix().to_ascii_lowercase().contains('f')
    }

    fn is_raw(&self) -> bool {
        self.prefix().to_ascii_lowercase().contains('r')
    }

    /// The string value with simple escapes resolved. Returns `None` for
    /// f-strings and for escapes whose value depends on the runtime
    /// (`\N{...}` names are resolved structurally but unknown names fail).
    pub fn evaluated_value(&self) -> Option<String> {
        if self.is_fstring() {
            return None;
        }
        let raw = self.raw_value();
        if self.is_raw() {
            return Some(raw.to_string());
        }
        let mut out = String::with_capacity(raw.len());
        let mut chars = raw.chars();
        while let Some(c) = chars.next() {
            if c != '\\' {
                out.push(c);
                continue;
            }
            match chars.next() {
                None => out.push('\\'),
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('0') => out.push('\0'),
                Some('a') => out.push('\x07'),
                Some('b') => out.push('\x08'),
                Some('f') => out.push('\x0c'),
                Some('v') => out.push('\x0b'),
                Some('\\') => out.push('\\'),
                Some('\'') => out.push('\''),
                Some('"') => out.push('"'),
                Some('\n') => {}
                Some('x') => {
                    let hi = chars.next()?;
                    let lo = chars.next()?;
                    let code = u32::from_str_radix(&format!("{hi}{lo}"), 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                Some('u') => {
                    let digits: String = chars.by_ref().take(4).collect();
                    let code = u32::from_str_radix(&digits, 16).ok()?;
                    out.push(char::from_u32(code)?);
                }
                Some(other) => {
                    // Unknown escapes keep the backslash, as Python does.
                    out.push('\\');
                    out.push(other);
                }
            }
        }
        Some(out)
    }
}

/// Two or more adjacent string literals, implicitly concatenated.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcatenatedString {
    pub parts: Vec<SimpleString>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub value: Expression,
    pub dot: Token,
    pub attr: Name,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub func: Expression,
    pub lpar: Token,
    pub args: Vec<Arg>,
    pub rpar: Token,
}

/// A call argument: positional, keyword, `*args`, or `**kwargs`.
#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    /// `*` or `**` for starred arguments.
    pub star: Option<Token>,
    pub keyword: Option<Name>,
    pub eq: Option<Token>,
    pub value: Expression,
    pub comma: Option<Token>,
}

impl Arg {
    pub fn positional(value: Expression) -> Self {
        Arg {
            star: None,
            keyword: None,
            eq: None,
            value,
            comma: None,
        }
    }

    pub fn is_keyword(&self) -> bool {
        self.keyword.is_some()
    }

    /// First token of the argument, which carries its leading trivia.
    pub fn first_token(&self) -> &Token {
        if let Some(star) = &self.star {
            star
        } else if let Some(keyword) = &self.keyword {
            &keyword.tok
        } else {
            self.value.first_token()
        }
    }

    pub fn first_token_mut(&mut self) -> &mut Token {
        if let Some(star) = &mut self.star {
            star
        } else if let Some(keyword) = &mut self.keyword {
            &mut keyword.tok
        } else {
            self.value.first_token_mut()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Subscript {
    pub value: Expression,
    pub lbracket: Token,
    pub index: BaseSlice,
    pub rbracket: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BaseSlice {
    Index(Box<Expression>),
    Slice(Box<Slice>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub lower: Option<Expression>,
    pub colon1: Token,
    pub upper: Option<Expression>,
    pub colon2: Option<Token>,
    pub step: Option<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryOperation {
    pub op: UnaryOp,
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UnaryOp {
    Not(Token),
    Minus(Token),
    Plus(Token),
    BitInvert(Token),
}

impl UnaryOp {
    pub fn token(&self) -> &Token {
        match self {
            UnaryOp::Not(t) | UnaryOp::Minus(t) | UnaryOp::Plus(t) | UnaryOp::BitInvert(t) => t,
        }
    }

    pub fn token_mut(&mut self) -> &mut Token {
        match self {
            UnaryOp::Not(t) | UnaryOp::Minus(t) | UnaryOp::Plus(t) | UnaryOp::BitInvert(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOperation {
    pub left: Expression,
    pub op: BinaryOp,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BinaryOp {
    Add(Token),
    Subtract(Token),
    Multiply(Token),
    Divide(Token),
    FloorDivide(Token),
    Modulo(Token),
    Power(Token),
    MatrixMultiply(Token),
    LeftShift(Token),
    RightShift(Token),
    BitAnd(Token),
    BitOr(Token),
    BitXor(Token),
}

impl BinaryOp {
    pub fn token(&self) -> &Token {
        match self {
            BinaryOp::Add(t)
            | BinaryOp::Subtract(t)
            | BinaryOp::Multiply(t)
            | BinaryOp::Divide(t)
            | BinaryOp::FloorDivide(t)
            | BinaryOp::Modulo(t)
            | BinaryOp::Power(t)
            | BinaryOp::MatrixMultiply(t)
            | BinaryOp::LeftShift(t)
            | BinaryOp::RightShift(t)
            | BinaryOp::BitAnd(t)
            | BinaryOp::BitOr(t)
            | BinaryOp::BitXor(t) => t,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanOperation {
    pub left: Expression,
    pub op: BooleanOp,
    pub right: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BooleanOp {
    And(Token),
    Or(Token),
}

impl BooleanOp {
    pub fn token(&self) -> &Token {
        match self {
            BooleanOp::And(t) | BooleanOp::Or(t) => t,
        }
    }
}

/// A chained comparison: `left op1 right1 op2 right2 ...`.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    pub left: Expression,
    pub comparisons: Vec<ComparisonTarget>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonTarget {
    pub operator: CompOp,
    pub comparator: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompOp {
    LessThan(Token),
    GreaterThan(Token),
    LessThanEqual(Token),
    GreaterThanEqual(Token),
    Equal(Token),
    NotEqual(Token),
    In(Token),
    NotIn { not_tok: Token, in_tok: Token },
    Is(Token),
    IsNot { is_tok: Token, not_tok: Token },
}

impl CompOp {
    pub fn first_token(&self) -> &Token {
        match self {
            CompOp::LessThan(t)
            | CompOp::GreaterThan(t)
            | CompOp::LessThanEqual(t)
            | CompOp::GreaterThanEqual(t)
            | CompOp::Equal(t)
            | CompOp::NotEqual(t)
            | CompOp::In(t)
            | CompOp::Is(t) => t,
            CompOp::NotIn { not_tok, .. } => not_tok,
            CompOp::IsNot { is_tok, .. } => is_tok,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfExp {
    pub body: Expression,
    pub if_tok: Token,
    pub test: Expression,
    pub else_tok: Token,
    pub orelse: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Lambda {
    pub lambda_tok: Token,
    pub params: Parameters,
    pub colon: Token,
    pub body: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Await {
    pub await_tok: Token,
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Yield {
    pub yield_tok: Token,
    pub value: Option<YieldValue>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum YieldValue {
    Expr(Expression),
    From(YieldFrom),
}

#[derive(Debug, Clone, PartialEq)]
pub struct YieldFrom {
    pub from_tok: Token,
    pub expr: Expression,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Starred {
    pub star: Token,
    pub expr: Expression,
}

/// A walrus assignment `target := value`.
#[derive(Debug, Clone, PartialEq)]
pub struct NamedExpr {
    pub target: Expression,
    pub walrus: Token,
    pub value: Expression,
}

/// A parenthesized expression that is not a tuple, call, or generator.
#[derive(Debug, Clone, PartialEq)]
pub struct Parenthesized {
    pub lpar: Token,
    pub expr: Expression,
    pub rpar: Token,
}

/// A tuple, parenthesized or bare. `()` is a tuple with no elements.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    pub lpar: Option<Token>,
    pub elements: Vec<Element>,
    pub rpar: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub lbracket: Token,
    pub elements: Vec<Element>,
    pub rbracket: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Set {
    pub lbrace: Token,
    pub elements: Vec<Element>,
    pub rbrace: Token,
}

/// One element of a tuple, list, or set display.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub value: Expression,
    pub comma: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Dict {
    pub lbrace: Token,
    pub elements: Vec<DictElement>,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DictElement {
    Simple {
        key: Expression,
        colon: Token,
        value: Expression,
        comma: Option<Token>,
    },
    /// A `**mapping` splat.
    Starred {
        star: Token,
        value: Expression,
        comma: Option<Token>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorExp {
    /// Absent when the generator is the sole argument of a call.
    pub lpar: Option<Token>,
    pub elt: Expression,
    pub for_in: CompFor,
    pub rpar: Option<Token>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ListComp {
    pub lbracket: Token,
    pub elt: Expression,
    pub for_in: CompFor,
    pub rbracket: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SetComp {
    pub lbrace: Token,
    pub elt: Expression,
    pub for_in: CompFor,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DictComp {
    pub lbrace: Token,
    pub key: Expression,
    pub colon: Token,
    pub value: Expression,
    pub for_in: CompFor,
    pub rbrace: Token,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompFor {
    pub async_tok: Option<Token>,
    pub for_tok: Token,
    pub target: Expression,
    pub in_tok: Token,
    pub iter: Expression,
    pub ifs: Vec<CompIf>,
    pub inner_for_in: Option<Box<CompFor>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompIf {
    pub if_tok: Token,
    pub test: Expression,
}

/// Parameter list of a `def` or `lambda`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub params: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    /// `*`, `**`, or `/` for the positional-only marker. A bare `*`
    /// separator is a param with a star and no name.
    pub star: Option<Token>,
    pub name: Option<Name>,
    pub colon: Option<Token>,
    pub annotation: Option<Expression>,
    pub eq: Option<Token>,
    pub default: Option<Expression>,
    pub comma: Option<Token>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_string_parts() {
        let s = SimpleString::detached("rb'ab\\x00'");
        assert_eq!(s.prefix(), "rb");
        assert_eq!(s.quote(), "'");
        assert_eq!(s.raw_value(), "ab\\x00");
        assert!(s.is_bytes());
    }

    #[test]
    fn test_triple_quote() {
        let s = SimpleString::detached("\"\"\"abc\"\"\"");
        assert_eq!(s.quote(), "\"\"\"");
        assert_eq!(s.raw_value(), "abc");
    }

    #[test]
    fn test_evaluated_value_escapes() {
        let s = SimpleString::detached("'a\\nb'");
        assert_eq!(s.evaluated_value().as_deref(), Some("a\nb"));
        let raw = SimpleString::detached("r'a\\nb'");
        assert_eq!(raw.evaluated_value().as_deref(), Some("a\\nb"));
        let f = SimpleString::detached("f'{x}'");
        assert_eq!(f.evaluated_value(), None);
    }

    #[test]
    fn test_float_value() {
        let f = Float { tok: Token::number("1_000.0") };
        assert_eq!(f.to_f64(), Some(1000.0));
    }
}
