//! Shared alias-list editing for the import rules.

use pyfix_cst::ImportAlias;

/// Drop the aliases selected by `remove` from an import list, patching the
/// leading trivia of the new first alias and the comma of the new last one
/// so the statement renders cleanly. Leaves an emptied list alone; callers
/// remove the whole statement in that case.
pub(crate) fn drop_aliases(names: &mut Vec<ImportAlias>, remove: impl Fn(&ImportAlias) -> bool) {
    let first_removed = names.first().map(|alias| remove(alias)).unwrap_or(false);
    let first_leading = names
        .first()
        .map(|alias| alias.name.leading().to_string())
        .unwrap_or_default();
    let last_had_comma = names.last().map(|alias| alias.comma.is_some()).unwrap_or(false);
    names.retain(|alias| !remove(alias));
    if names.is_empty() {
        return;
    }
    if first_removed {
        names[0].name.set_leading(first_leading);
    }
    if !last_had_comma {
        if let Some(last) = names.last_mut() {
            last.comma = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pyfix_cst::{parse_module, SmallStatement, Statement};

    fn parse_aliases(source: &str) -> Vec<ImportAlias> {
        let module = parse_module(source).unwrap();
        let Some(Statement::Simple(line)) = module.body.into_iter().next() else {
            panic!("expected a simple statement");
        };
        let SmallStatement::Import(import) = line.body[0].clone() else {
            panic!("expected an import");
        };
        import.names
    }

    fn render(source: &str, remove_name: &str) -> String {
        let mut names = parse_aliases(source);
        drop_aliases(&mut names, |alias| alias.dotted() == remove_name);
        let mut out = String::from("import");
        for alias in &names {
            out.push_str(alias.name.leading());
            out.push_str(&alias.dotted());
            if alias.comma.is_some() {
                out.push(',');
            }
        }
        out
    }

    #[test]
    fn test_drop_first_keeps_spacing() {
        assert_eq!(render("import aaa, bbb\n", "aaa"), "import bbb");
    }

    #[test]
    fn test_drop_last_strips_comma() {
        assert_eq!(render("import aaa, bbb\n", "bbb"), "import aaa");
    }

    #[test]
    fn test_drop_middle() {
        assert_eq!(render("import aaa, bbb, ccc\n", "bbb"), "import aaa, ccc");
    }
}
