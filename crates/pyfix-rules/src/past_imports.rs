//! Rule: Detect imports from the python-future `past` package
//!
//! `past.builtins` and friends ship py2 semantics that usually hide real
//! porting work, so this rule only reports occurrences. The tree is never
//! modified; positions point at the import statements.

use pyfix_core::{Edit, Rule, RunContext};
use pyfix_cst::{Import, ImportFrom, SmallStatement, Spanned};

pub const NAME: &str = "past_imports";
pub const DESCRIPTION: &str = "Detect imports from the python-future 'past' package";

fn from_past(path: &str) -> bool {
    path == "past" || path.starts_with("past.")
}

pub struct PastImports;

impl Rule for PastImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_import(
        &mut self,
        original: &Import,
        updated: SmallStatement,
        ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        if original.names.iter().any(|alias| from_past(&alias.dotted())) {
            ctx.mark(NAME, original.span());
        }
        Edit::Node(updated)
    }

    fn leave_import_from(
        &mut self,
        original: &ImportFrom,
        updated: SmallStatement,
        ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        if original.dots.is_empty() && from_past(&original.module_path()) {
            ctx.mark(NAME, original.span());
        }
        Edit::Node(updated)
    }
}
