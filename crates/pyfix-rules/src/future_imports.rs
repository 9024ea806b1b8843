//! Rule: Remove `from __future__ import ...` statements
//!
//! Every feature name can be allow-listed (`annotations` usually is, since
//! it still changes behavior on current interpreters). Allowed names
//! survive in place; the statement is removed only when nothing survives,
//! and a fully allowed statement is neither changed nor counted.

use pyfix_core::{Edit, Rule, RunContext};
use pyfix_cst::{ImportAlias, ImportFrom, ImportNames, SmallStatement, Spanned};

use crate::imports::drop_aliases;

pub const NAME: &str = "future_imports";
pub const DESCRIPTION: &str = "Remove 'from __future__ import ...' statements";

pub struct FutureImports {
    allow: Vec<String>,
}

impl FutureImports {
    pub fn new(allow: Vec<String>) -> Self {
        FutureImports { allow }
    }

    fn is_removable(&self, alias: &ImportAlias) -> bool {
        !self.allow.iter().any(|allowed| *allowed == alias.dotted())
    }
}

impl Rule for FutureImports {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        DESCRIPTION
    }

    fn leave_import_from(
        &mut self,
        original: &ImportFrom,
        updated: SmallStatement,
        ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        let mut import = match updated {
            SmallStatement::ImportFrom(import) => import,
            other => return Edit::Node(other),
        };
        if !import.dots.is_empty() || import.module_path() != "__future__" {
            return Edit::Node(SmallStatement::ImportFrom(import));
        }
        let aliases = match &mut import.names {
            ImportNames::Aliases(aliases) => aliases,
            // `from __future__ import *` is not something the interpreter
            // accepts; leave it for the author.
            ImportNames::Star(_) => return Edit::Node(SmallStatement::ImportFrom(import)),
        };
        if !aliases.iter().any(|alias| self.is_removable(alias)) {
            return Edit::Node(SmallStatement::ImportFrom(import));
        }
        ctx.mark(NAME, original.span());
        if aliases.iter().all(|alias| self.is_removable(alias)) {
            return Edit::Remove;
        }
        drop_aliases(aliases, |alias| self.is_removable(alias));
        Edit::Node(SmallStatement::ImportFrom(import))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply_with(source: &str, allow: &[&str]) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let allow = allow.iter().map(|s| s.to_string()).collect();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(FutureImports::new(allow))];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    #[test]
    fn test_statement_removed() {
        let (code, count) = apply_with("from __future__ import unicode_literals\nx = 1\n", &[]);
        assert_eq!(code, "x = 1\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_multiple_names_removed() {
        let (code, _) = apply_with(
            "from __future__ import absolute_import, division\nx = 1\n",
            &[],
        );
        assert_eq!(code, "x = 1\n");
    }

    #[test]
    fn test_allowed_name_survives() {
        let (code, count) = apply_with(
            "from __future__ import annotations, division\n",
            &["annotations"],
        );
        assert_eq!(code, "from __future__ import annotations\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_fully_allowed_statement_untouched_and_uncounted() {
        let source = "from __future__ import annotations\n";
        let (code, count) = apply_with(source, &["annotations"]);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_allowed_in_middle() {
        let (code, _) = apply_with(
            "from __future__ import division, annotations, print_function\n",
            &["annotations"],
        );
        assert_eq!(code, "from __future__ import annotations\n");
    }

    #[test]
    fn test_other_from_import_untouched() {
        let source = "from os import path\n";
        let (code, count) = apply_with(source, &[]);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }
}
