//! Rule: Merge OSError aliases in except clauses
//!
//! `EnvironmentError`, `IOError`, `WindowsError`, `socket.error`,
//! `select.error`, and `mmap.error` have all been plain aliases of
//! `OSError` since Python 3.3. The first aliased element of a tuple is
//! replaced in place and later ones are dropped; a tuple that collapses to
//! one element loses its parentheses. When `OSError` is already listed,
//! the aliases are simply dropped.

use pyfix_core::matcher::{self, Pat};
use pyfix_core::{Rule, RunContext};
use pyfix_cst::{Element, ExceptHandler, Expression, Name, Span, Spanned};

pub const NAME: &str = "oserror_alias";
pub const DESCRIPTION: &str = "Merge OSError aliases in except clauses into OSError";

fn alias_pattern() -> Pat {
    matcher::one_of(vec![
        matcher::name("EnvironmentError"),
        matcher::name("IOError"),
        matcher::name("WindowsError"),
        matcher::attr(matcher::name("socket"), "error"),
        matcher::attr(matcher::name("select"), "error"),
        matcher::attr(matcher::name("mmap"), "error"),
    ])
}

fn is_alias(expr: &Expression) -> bool {
    matcher::matches(&alias_pattern(), expr)
}

fn is_oserror(expr: &Expression) -> bool {
    matches!(expr, Expression::Name(name) if name.value() == "OSError")
}

/// A detached `OSError` name wearing the trivia of the expression it
/// replaces.
fn oserror_in_place(replaced: &Expression) -> Expression {
    let mut name = Name::detached("OSError");
    name.tok.leading = replaced.leading().to_string();
    Expression::Name(name)
}

pub struct OsErrorAlias;

impl OsErrorAlias {
    /// Rewrite a tuple's element list. Returns `None` when no element is
    /// an alias.
    fn merge_elements(&self, elements: &[Element]) -> Option<Vec<Element>> {
        if !elements.iter().any(|element| is_alias(&element.value)) {
            return None;
        }
        let have_oserror = elements.iter().any(|element| is_oserror(&element.value));
        let mut replaced_one = have_oserror;
        let last_had_comma = elements.last().map(|e| e.comma.is_some()).unwrap_or(false);
        let first_leading = elements
            .first()
            .map(|e| e.value.leading().to_string())
            .unwrap_or_default();
        let first_dropped = elements
            .first()
            .map(|e| is_alias(&e.value))
            .unwrap_or(false)
            && have_oserror;

        let mut merged: Vec<Element> = Vec::with_capacity(elements.len());
        for element in elements {
            if !is_alias(&element.value) {
                merged.push(element.clone());
                continue;
            }
            if replaced_one {
                continue;
            }
            replaced_one = true;
            merged.push(Element {
                value: oserror_in_place(&element.value),
                comma: element.comma.clone(),
            });
        }
        if first_dropped {
            if let Some(first) = merged.first_mut() {
                first.value.set_leading(first_leading);
            }
        }
        if !last_had_comma {
            if let Some(last) = merged.last_mut() {
                last.comma = None;
            }
        }
        Some(merged)
    }
}

impl Rule for OsErrorAlias {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_except_handler(
        &mut self,
        original: &ExceptHandler,
        mut updated: ExceptHandler,
        ctx: &mut RunContext,
    ) -> ExceptHandler {
        let Some(etype) = updated.etype.take() else {
            return updated;
        };
        let span = match &original.etype {
            Some(etype) => etype.span(),
            None => Span {
                start: original.except_tok.start,
                end: original.except_tok.end(),
            },
        };
        updated.etype = Some(match etype {
            expr if is_alias(&expr) => {
                ctx.mark(NAME, span);
                oserror_in_place(&expr)
            }
            Expression::Parenthesized(mut paren) if is_alias(&paren.expr) => {
                ctx.mark(NAME, span);
                paren.expr = oserror_in_place(&paren.expr);
                Expression::Parenthesized(paren)
            }
            Expression::Tuple(mut tuple) => match self.merge_elements(&tuple.elements) {
                Some(merged) => {
                    ctx.mark(NAME, span);
                    if merged.len() == 1 {
                        // A singleton tuple in an except clause collapses
                        // to a bare name.
                        match merged.into_iter().next() {
                            Some(element) => {
                                let mut bare = element.value;
                                if let Some(lpar) = &tuple.lpar {
                                    bare.set_leading(lpar.leading.clone());
                                }
                                bare
                            }
                            None => Expression::Tuple(tuple),
                        }
                    } else {
                        tuple.elements = merged;
                        Expression::Tuple(tuple)
                    }
                }
                None => Expression::Tuple(tuple),
            },
            other => other,
        });
        updated
    }
}
