//! Round-trip tests over realistic Python sources
//!
//! Parsing a file and rendering the tree must reproduce the input byte for
//! byte, whatever the formatting habits of the original author.

use pyfix_cst::{parse_module, span_of, LineIndex, Statement};

fn assert_roundtrip(src: &str) {
    let module = parse_module(src).unwrap_or_else(|err| {
        panic!("parse failed: {err}\n{}", err.snippet(src));
    });
    assert_eq!(module.code(), src, "render differs from input");
}

#[test]
fn test_full_module_roundtrip() {
    let src = r#"#!/usr/bin/env python
"""Inventory helpers."""

import os
import sys
from collections import defaultdict


DEFAULT_LIMIT = 100  # overridden in tests


class Inventory(object):
    """Tracks stock levels per SKU."""

    def __init__(self, limit=DEFAULT_LIMIT):
        self.limit = limit
        self._items = defaultdict(int)

    @property
    def total(self):
        return sum(self._items.values())

    def add(self, sku, count=1):
        # Clamp to the configured limit.
        if self._items[sku] + count > self.limit:
            raise ValueError("over limit")
        self._items[sku] += count


def main(argv=None):
    inv = Inventory()
    for sku in (argv or sys.argv[1:]):
        inv.add(sku)
    print(inv.total, file=sys.stderr)
    return 0


if __name__ == "__main__":
    sys.exit(main())
"#;
    assert_roundtrip(src);
}

#[test]
fn test_comments_and_blank_lines_survive() {
    let src = "# leading comment\n\n# section\nx = 1  # trailing\n\n\ny = 2\n# dangling at end\n";
    assert_roundtrip(src);
}

#[test]
fn test_line_continuations() {
    let src = "total = 1 + \\\n    2 + \\\n    3\nvalues = [\n    'a',\n    'b',  # kept\n]\nresult = some_call(\n    first,\n    second=2,\n)\n";
    assert_roundtrip(src);
}

#[test]
fn test_no_trailing_newline() {
    assert_roundtrip("x = 1");
    assert_roundtrip("def f():\n    return 1");
}

#[test]
fn test_crlf_line_endings() {
    assert_roundtrip("a = 1\r\nif a:\r\n    b = 2\r\n");
}

#[test]
fn test_tab_indentation() {
    assert_roundtrip("def f():\n\tif True:\n\t\treturn 1\n\treturn 0\n");
}

#[test]
fn test_deeply_nested_blocks() {
    let src = "try:\n    for i in range(10):\n        if i % 2:\n            while i:\n                i -= 1\n        else:\n            continue\nexcept (ValueError, KeyError) as err:\n    log(err)\nelse:\n    done()\nfinally:\n    cleanup()\n";
    assert_roundtrip(src);
}

#[test]
fn test_string_literal_variety() {
    let src = "a = 'single'\nb = \"double\"\nc = '''triple\nline'''\nd = r\"C:\\temp\"\ne = b'\\x00'\nf = f\"{name!r} has {count}\"\ng = 'implicit' \"concat\"\n";
    assert_roundtrip(src);
}

#[test]
fn test_unparsable_input_reports_position() {
    let src = "x = 1\ny = 2 +\nz = 3\n";
    let err = parse_module(src).unwrap_err();
    assert_eq!(err.line, 2);
    let snippet = err.snippet(src);
    assert!(snippet.contains('^'), "snippet should carry a caret: {snippet}");
}

#[test]
fn test_golden_fixture_corpus_roundtrips() {
    // Inputs and expected outputs of the rule fixtures are all plain
    // Python; every one of them must survive a parse and render untouched.
    let root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../pyfix-rules/tests/fixtures");
    let mut checked = 0;
    for sub in ["input", "expected"] {
        for entry in std::fs::read_dir(root.join(sub)).unwrap() {
            let path = entry.unwrap().path();
            let src = std::fs::read_to_string(&path).unwrap();
            let module = parse_module(&src).unwrap_or_else(|err| {
                panic!("{} parse failed: {err}\n{}", path.display(), err.snippet(&src));
            });
            assert_eq!(module.code(), src, "{} render differs", path.display());
            checked += 1;
        }
    }
    assert!(checked >= 28, "expected the full fixture corpus, saw {checked}");
}

#[test]
fn test_spans_map_back_to_source() {
    let src = "x = 1\nresult = compute(a, b)\n";
    let module = parse_module(src).unwrap();
    let Statement::Simple(line) = &module.body[1] else {
        panic!("expected simple statement");
    };
    let pyfix_cst::SmallStatement::Assign(assign) = &line.body[0] else {
        panic!("expected assignment");
    };
    let span = span_of(&assign.value);
    assert_eq!(&src[span.start..span.end], "compute(a, b)");

    let index = LineIndex::new(src);
    let (line_no, column) = index.line_col(src, span.start);
    assert_eq!((line_no, column), (2, 10));
}
