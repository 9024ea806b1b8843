//! Structural pattern matching over expression trees
//!
//! Patterns describe expression shapes without trivia or positions, so one
//! pattern matches a call however it is spaced or spread across lines.
//! Sequence patterns support wildcards and quantifiers for argument lists
//! and tuple elements.

use pyfix_cst::{CompOp, Expression, UnaryOp};

/// A structural pattern over a single expression node.
#[derive(Debug, Clone)]
pub enum Pat {
    /// Matches any expression.
    Any,
    /// Matches any identifier.
    AnyName,
    /// An identifier with exactly this text.
    Name(String),
    /// An attribute access whose base matches and whose attribute text is
    /// exactly this.
    Attribute { value: Box<Pat>, attr: String },
    /// A call whose callee matches. `args: None` accepts any argument
    /// list; `Some(seq)` matches the argument values in order.
    Call { func: Box<Pat>, args: Option<Seq> },
    /// Any float literal.
    Float,
    /// Any integer literal.
    Integer,
    /// A single string literal. Implicit concatenations do not match.
    Str,
    /// A tuple display. `None` accepts any elements.
    Tuple(Option<Seq>),
    /// A generator expression whose element matches.
    GeneratorExp { elt: Box<Pat> },
    /// A `not` operation whose operand matches.
    Not(Box<Pat>),
    /// A comparison with exactly one target using the given operator.
    Comparison(CompKind),
    /// First matching alternative wins, tried in the order given.
    OneOf(Vec<Pat>),
}

/// Comparison operators a pattern can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompKind {
    In,
    NotIn,
    Is,
    IsNot,
}

/// An argument or element sequence pattern.
pub type Seq = Vec<Item>;

/// One slot of a sequence pattern.
#[derive(Debug, Clone)]
pub enum Item {
    /// Exactly one value matching the pattern.
    One(Pat),
    /// An optional value matching the pattern.
    ZeroOrOne(Pat),
    /// Any number of values, including none.
    ZeroOrMore,
    /// At least this many values.
    AtLeast(usize),
}

/// Test a pattern against an expression. Parentheses recorded as explicit
/// `Parenthesized` nodes are not seen through.
pub fn matches(pat: &Pat, expr: &Expression) -> bool {
    match pat {
        Pat::Any => true,
        Pat::AnyName => matches!(expr, Expression::Name(_)),
        Pat::Name(text) => match expr {
            Expression::Name(name) => name.value() == text,
            _ => false,
        },
        Pat::Attribute { value, attr } => match expr {
            Expression::Attribute(node) => {
                node.attr.value() == attr && matches(value, &node.value)
            }
            _ => false,
        },
        Pat::Call { func, args } => match expr {
            Expression::Call(call) => {
                if !matches(func, &call.func) {
                    return false;
                }
                match args {
                    None => true,
                    Some(seq) => {
                        let values: Vec<&Expression> =
                            call.args.iter().map(|a| &a.value).collect();
                        seq_matches(seq, &values)
                    }
                }
            }
            _ => false,
        },
        Pat::Float => matches!(expr, Expression::Float(_)),
        Pat::Integer => matches!(expr, Expression::Integer(_)),
        Pat::Str => matches!(expr, Expression::SimpleString(_)),
        Pat::Tuple(seq) => match expr {
            Expression::Tuple(tuple) => match seq {
                None => true,
                Some(seq) => {
                    let values: Vec<&Expression> =
                        tuple.elements.iter().map(|e| &e.value).collect();
                    seq_matches(seq, &values)
                }
            },
            _ => false,
        },
        Pat::GeneratorExp { elt } => match expr {
            Expression::GeneratorExp(genexp) => matches(elt, &genexp.elt),
            _ => false,
        },
        Pat::Not(inner) => match expr {
            Expression::UnaryOperation(unary) => {
                matches!(unary.op, UnaryOp::Not(_)) && matches(inner, &unary.expr)
            }
            _ => false,
        },
        Pat::Comparison(kind) => match expr {
            Expression::Comparison(comparison) => {
                comparison.comparisons.len() == 1
                    && comp_kind(&comparison.comparisons[0].operator) == Some(*kind)
            }
            _ => false,
        },
        Pat::OneOf(alternatives) => alternatives.iter().any(|alt| matches(alt, expr)),
    }
}

fn comp_kind(op: &CompOp) -> Option<CompKind> {
    match op {
        CompOp::In(_) => Some(CompKind::In),
        CompOp::NotIn { .. } => Some(CompKind::NotIn),
        CompOp::Is(_) => Some(CompKind::Is),
        CompOp::IsNot { .. } => Some(CompKind::IsNot),
        _ => None,
    }
}

/// Match a sequence pattern against a value slice, backtracking over
/// quantifiers.
fn seq_matches(items: &[Item], values: &[&Expression]) -> bool {
    let Some((item, rest)) = items.split_first() else {
        return values.is_empty();
    };
    match item {
        Item::One(pat) => match values.split_first() {
            Some((value, tail)) => matches(pat, value) && seq_matches(rest, tail),
            None => false,
        },
        Item::ZeroOrOne(pat) => {
            if let Some((value, tail)) = values.split_first() {
                if matches(pat, value) && seq_matches(rest, tail) {
                    return true;
                }
            }
            seq_matches(rest, values)
        }
        Item::ZeroOrMore => {
            (0..=values.len()).any(|taken| seq_matches(rest, &values[taken..]))
        }
        Item::AtLeast(min) => {
            (*min..=values.len()).any(|taken| seq_matches(rest, &values[taken..]))
        }
    }
}

// Constructor helpers keep rule definitions readable.

pub fn name(text: impl Into<String>) -> Pat {
    Pat::Name(text.into())
}

pub fn attr(value: Pat, attr: impl Into<String>) -> Pat {
    Pat::Attribute {
        value: Box::new(value),
        attr: attr.into(),
    }
}

/// A call to `func` with any arguments.
pub fn call(func: Pat) -> Pat {
    Pat::Call {
        func: Box::new(func),
        args: None,
    }
}

/// A call to `func` whose argument values match `args`.
pub fn call_args(func: Pat, args: Seq) -> Pat {
    Pat::Call {
        func: Box::new(func),
        args: Some(args),
    }
}

pub fn one_of(alternatives: Vec<Pat>) -> Pat {
    Pat::OneOf(alternatives)
}

/// A tuple with at least one element matching `pat`, anywhere.
pub fn tuple_contains(pat: Pat) -> Pat {
    Pat::Tuple(Some(vec![Item::ZeroOrMore, Item::One(pat), Item::ZeroOrMore]))
}

pub fn one(pat: Pat) -> Item {
    Item::One(pat)
}

pub fn zero_or_one(pat: Pat) -> Item {
    Item::ZeroOrOne(pat)
}

pub fn zero_or_more() -> Item {
    Item::ZeroOrMore
}

pub fn at_least(min: usize) -> Item {
    Item::AtLeast(min)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_cst::parse_expression;

    fn expr(src: &str) -> Expression {
        parse_expression(src).unwrap()
    }

    #[test]
    fn test_name_and_attribute() {
        assert!(matches(&name("dict"), &expr("dict")));
        assert!(!matches(&name("dict"), &expr("list")));
        assert!(matches(&attr(name("socket"), "error"), &expr("socket.error")));
        assert!(matches(
            &attr(Pat::Any, "error"),
            &expr("select . error")
        ));
        assert!(!matches(&attr(name("socket"), "error"), &expr("socket.err")));
    }

    #[test]
    fn test_call_any_args() {
        let pat = call(name("dict"));
        assert!(matches(&pat, &expr("dict()")));
        assert!(matches(&pat, &expr("dict(a=1, b=2)")));
        assert!(!matches(&pat, &expr("dicts()")));
        assert!(!matches(&pat, &expr("dict")));
    }

    #[test]
    fn test_call_arg_sequence() {
        let pat = call_args(name("f"), vec![one(Pat::Integer), one(Pat::Str)]);
        assert!(matches(&pat, &expr("f(1, 'x')")));
        assert!(!matches(&pat, &expr("f(1)")));
        assert!(!matches(&pat, &expr("f('x', 1)")));
        assert!(!matches(&pat, &expr("f(1, 'x', 2)")));
    }

    #[test]
    fn test_zero_or_more_brackets_required_element() {
        // A wildcard on either side finds the element at any position.
        let pat = call_args(
            name("f"),
            vec![zero_or_more(), one(Pat::Str), zero_or_more()],
        );
        assert!(matches(&pat, &expr("f('x')")));
        assert!(matches(&pat, &expr("f(1, 2, 'x', 4, 5)")));
        assert!(matches(&pat, &expr("f('x', 1, 2, 3, 4)")));
        assert!(!matches(&pat, &expr("f(1, 2, 3)")));
        assert!(!matches(&pat, &expr("f()")));
    }

    #[test]
    fn test_at_least() {
        let pat = call_args(name("set"), vec![at_least(2)]);
        assert!(matches(&pat, &expr("set(1, 2)")));
        assert!(matches(&pat, &expr("set(1, 2, 3)")));
        assert!(!matches(&pat, &expr("set(1)")));
        assert!(!matches(&pat, &expr("set()")));
    }

    #[test]
    fn test_zero_or_one() {
        let pat = call_args(attr(Pat::Any, "encode"), vec![zero_or_one(Pat::Str)]);
        assert!(matches(&pat, &expr("x.encode()")));
        assert!(matches(&pat, &expr("x.encode('utf-8')")));
        assert!(!matches(&pat, &expr("x.encode('utf-8', 'strict')")));
    }

    #[test]
    fn test_one_of_prefers_any_alternative() {
        let pat = one_of(vec![
            name("EnvironmentError"),
            name("IOError"),
            attr(name("socket"), "error"),
        ]);
        assert!(matches(&pat, &expr("IOError")));
        assert!(matches(&pat, &expr("socket.error")));
        assert!(!matches(&pat, &expr("OSError")));
    }

    #[test]
    fn test_comparison_single_target_only() {
        let pat = Pat::Comparison(CompKind::In);
        assert!(matches(&pat, &expr("a in b")));
        assert!(!matches(&pat, &expr("a in b in c")));
        assert!(!matches(&pat, &expr("a == b")));
        assert!(matches(&Pat::Comparison(CompKind::NotIn), &expr("a not in b")));
        assert!(matches(&Pat::Comparison(CompKind::IsNot), &expr("a is not b")));
    }

    #[test]
    fn test_not_pattern() {
        let pat = Pat::Not(Box::new(Pat::Comparison(CompKind::In)));
        assert!(matches(&pat, &expr("not a in b")));
        assert!(!matches(&pat, &expr("-a")));
        // An explicitly parenthesized operand is a Parenthesized node, not
        // a comparison.
        assert!(!matches(&pat, &expr("not (a in b)")));
    }

    #[test]
    fn test_tuple_patterns() {
        assert!(matches(&Pat::Tuple(None), &expr("(1, 2)")));
        assert!(matches(&Pat::Tuple(None), &expr("()")));
        let pat = tuple_contains(name("IOError"));
        assert!(matches(&pat, &expr("(ValueError, IOError)")));
        assert!(matches(&pat, &expr("(IOError,)")));
        assert!(!matches(&pat, &expr("(ValueError, KeyError)")));
    }

    #[test]
    fn test_generator_and_literals() {
        let pat = Pat::GeneratorExp {
            elt: Box::new(Pat::Any),
        };
        assert!(matches(&pat, &expr("(x for x in xs)")));
        assert!(!matches(&pat, &expr("[x for x in xs]")));
        assert!(matches(&Pat::Float, &expr("1.5")));
        assert!(matches(&Pat::Integer, &expr("10")));
        assert!(matches(&Pat::Str, &expr("'a'")));
        // Implicit concatenation is a different node.
        assert!(!matches(&Pat::Str, &expr("'a' 'b'")));
    }
}
