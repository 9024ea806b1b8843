//! Per-run bookkeeping: match counts and located match records
//!
//! Every replacement a rule makes is recorded against the original source,
//! so positions and snippets reflect the file as the user wrote it, not
//! the partially rewritten tree.

use pyfix_cst::{LineIndex, Span};

/// One recorded replacement, resolved to a human-readable position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchRecord {
    /// Registered name of the rule that fired.
    pub rule: &'static str,
    /// 1-based line of the matched node's first token.
    pub line: usize,
    /// 1-based character column of the matched node's first token.
    pub column: usize,
    /// The matched source text, verbatim.
    pub snippet: String,
}

impl MatchRecord {
    /// `file:line:column: rule` with the matched source indented below.
    pub fn render(&self, filename: &str) -> String {
        let mut out = format!("{}:{}:{}: {}", filename, self.line, self.column, self.rule);
        for line in self.snippet.lines() {
            out.push_str("\n  ");
            out.push_str(line);
        }
        out
    }
}

/// State shared with rules during one file's traversal.
///
/// Counters are seeded per registered rule so reports list every rule,
/// fired or not, in registration order.
#[derive(Debug)]
pub struct RunContext {
    filename: String,
    source: String,
    index: LineIndex,
    counts: Vec<(&'static str, usize)>,
    records: Vec<MatchRecord>,
}

impl RunContext {
    pub fn new(
        filename: impl Into<String>,
        source: impl Into<String>,
        rule_names: &[&'static str],
    ) -> Self {
        let source = source.into();
        RunContext {
            filename: filename.into(),
            index: LineIndex::new(&source),
            source,
            counts: rule_names.iter().map(|name| (*name, 0)).collect(),
            records: Vec::new(),
        }
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// The file's original text. Spans taken from original nodes index
    /// into this.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Record one replacement by `rule` at `span`. The span must come from
    /// an original node, before any rewriting.
    pub fn mark(&mut self, rule: &'static str, span: Span) {
        if let Some(entry) = self.counts.iter_mut().find(|(name, _)| *name == rule) {
            entry.1 += 1;
        }
        let (line, column) = self.index.line_col(&self.source, span.start);
        let end = span.end.min(self.source.len());
        let snippet = self
            .source
            .get(span.start..end)
            .unwrap_or_default()
            .to_string();
        self.records.push(MatchRecord {
            rule,
            line,
            column,
            snippet,
        });
    }

    /// Replacements recorded by one rule so far.
    pub fn count_for(&self, rule: &str) -> usize {
        self.counts
            .iter()
            .find(|(name, _)| *name == rule)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Total replacements recorded so far.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|(_, count)| count).sum()
    }

    /// Consume the context, yielding per-rule counts in registration order
    /// and the records in the order they were marked.
    pub fn finish(self) -> (Vec<(&'static str, usize)>, Vec<MatchRecord>) {
        (self.counts, self.records)
    }
}
