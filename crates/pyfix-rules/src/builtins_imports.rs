//! Rule: Remove python-future `builtins` compatibility imports
//!
//! `import builtins` aliases disappear from plain import statements, and
//! `from builtins import ...` statements are removed outright. Both forms
//! are py2/py3 compatibility shims with no effect on Python 3.

use pyfix_core::{Edit, Rule, RunContext};
use pyfix_cst::{Import, ImportAlias, ImportFrom, SmallStatement, Spanned};

use crate::imports::drop_aliases;

pub const NAME: &str = "builtins_imports";
pub const DESCRIPTION: &str = "Remove 'import builtins' and 'from builtins import ...'";

fn is_builtins(alias: &ImportAlias) -> bool {
    alias.dotted() == "builtins"
}

pub struct BuiltinsImports;

impl Rule for BuiltinsImports {
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
        let mut import = match updated {
            SmallStatement::Import(import) => import,
            other => return Edit::Node(other),
        };
        if !import.names.iter().any(is_builtins) {
            return Edit::Node(SmallStatement::Import(import));
        }
        ctx.mark(NAME, original.span());
        if import.names.iter().all(is_builtins) {
            return Edit::Remove;
        }
        drop_aliases(&mut import.names, is_builtins);
        Edit::Node(SmallStatement::Import(import))
    }

    fn leave_import_from(
        &mut self,
        original: &ImportFrom,
        updated: SmallStatement,
        ctx: &mut RunContext,
    ) -> Edit<SmallStatement> {
        let import = match updated {
            SmallStatement::ImportFrom(import) => import,
            other => return Edit::Node(other),
        };
        if import.dots.is_empty() && import.module_path() == "builtins" {
            ctx.mark(NAME, original.span());
            return Edit::Remove;
        }
        Edit::Node(SmallStatement::ImportFrom(import))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_core::transform_module;
    use pyfix_cst::parse_module;

    fn apply(source: &str) -> (String, usize) {
        let module = parse_module(source).unwrap();
        let mut rules: Vec<Box<dyn Rule>> = vec![Box::new(BuiltinsImports)];
        let mut ctx = RunContext::new("test.py", source, &[NAME]);
        let code = transform_module(module, &mut rules, &mut ctx).code();
        (code, ctx.count_for(NAME))
    }

    fn transform(source: &str) -> String {
        apply(source).0
    }

    #[test]
    fn test_sole_import_removed() {
        let (code, count) = apply("import builtins\nx = 1\n");
        assert_eq!(code, "x = 1\n");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_from_import_removed() {
        assert_eq!(
            transform("from builtins import map, filter\nx = 1\n"),
            "x = 1\n"
        );
    }

    #[test]
    fn test_star_import_removed() {
        assert_eq!(transform("from builtins import *\nx = 1\n"), "x = 1\n");
    }

    #[test]
    fn test_alias_dropped_from_list() {
        assert_eq!(transform("import builtins, os\n"), "import os\n");
        assert_eq!(transform("import os, builtins\n"), "import os\n");
        assert_eq!(transform("import os, builtins, sys\n"), "import os, sys\n");
    }

    #[test]
    fn test_comment_on_removed_line_survives() {
        assert_eq!(
            transform("# compat\nimport builtins\nx = 1\n"),
            "# compat\nx = 1\n"
        );
    }

    #[test]
    fn test_submodule_style_import_untouched() {
        let source = "import builtins.compat\n";
        assert_eq!(transform(source), source);
    }

    #[test]
    fn test_relative_import_untouched() {
        let source = "from .builtins import shim\n";
        let (code, count) = apply(source);
        assert_eq!(code, source);
        assert_eq!(count, 0);
    }

    #[test]
    fn test_other_imports_untouched() {
        let source = "import os\nfrom sys import path\n";
        assert_eq!(transform(source), source);
    }
}
