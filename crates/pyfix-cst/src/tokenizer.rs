//! Python tokenizer that preserves every source byte.
//!
//! Whitespace, comments, blank lines, and backslash continuations are not
//! discarded; they accumulate in a trivia buffer and are attached as the
//! `leading` text of the next emitted token. Indentation is tracked the way
//! CPython's tokenizer does it (tab stops of 8, formfeed resets the column)
//! and surfaces as zero-width `Indent`/`Dedent` markers, while the
//! indentation characters themselves stay in the leading trivia of the first
//! real token on the line.

use crate::error::ParseError;
use crate::token::{TokKind, Token};

const TAB_SIZE: usize = 8;

/// Multi-character operators, longest first so greedy matching works.
const OPERATORS: &[&str] = &[
    "**=", "//=", ">>=", "<<=", "...", "!=", ">=", "<=", "==", "->", ":=", "+=", "-=", "*=",
    "/=", "%=", "@=", "&=", "|=", "^=", "**", "//", "<<", ">>", "+", "-", "*", "/", "%", "@",
    "&", "|", "^", "~", "<", ">", "(", ")", "[", "]", "{", "}", ",", ":", ".", ";", "=",
];

const STRING_PREFIXES: &[&str] = &["r", "b", "u", "f", "rb", "br", "fr", "rf"];

pub fn tokenize(src: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    /// Open bracket nesting depth; newlines inside brackets are trivia.
    depth: usize,
    indents: Vec<usize>,
    trivia: String,
    at_line_start: bool,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Lexer {
            src,
            pos: 0,
            depth: 0,
            indents: vec![0],
            trivia: String::new(),
            at_line_start: true,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, ParseError> {
        loop {
            if self.at_line_start && self.depth == 0 {
                if self.line_start()? {
                    continue;
                }
            }
            self.inline_trivia()?;
            let Some(c) = self.peek() else {
                self.finish();
                return Ok(self.tokens);
            };
            if c == '\n' || c == '\r' {
                let start = self.pos;
                let nl = self.newline_text();
                if self.depth > 0 {
                    // Implicit line joining inside brackets.
                    self.trivia.push_str(nl);
                    self.pos += nl.len();
                } else {
                    let text = nl.to_string();
                    self.pos += nl.len();
                    self.emit(TokKind::Newline, text, start);
                    self.at_line_start = true;
                }
                continue;
            }
            self.lex_token(c)?;
        }
    }

    /// Measure indentation at the start of a logical line. Returns `true`
    /// when the line turned out to be blank (or comment-only) and was
    /// consumed entirely into trivia.
    fn line_start(&mut self) -> Result<bool, ParseError> {
        let ws_start = self.pos;
        let mut column = 0usize;
        while let Some(c) = self.peek() {
            match c {
                ' ' => column += 1,
                '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                '\x0c' => column = 0,
                _ => break,
            }
            self.pos += c.len_utf8();
        }
        let ws = self.src[ws_start..self.pos].to_string();
        match self.peek() {
            // Trailing whitespace at EOF; leave it for the end marker.
            None => {
                self.trivia.push_str(&ws);
                return Ok(false);
            }
            Some('#') => {
                self.trivia.push_str(&ws);
                let comment_start = self.pos;
                self.consume_comment();
                let comment = self.src[comment_start..self.pos].to_string();
                self.trivia.push_str(&comment);
                if let Some(c) = self.peek() {
                    debug_assert!(c == '\n' || c == '\r');
                    let nl = self.newline_text().to_string();
                    self.trivia.push_str(&nl);
                    self.pos += nl.len();
                }
                return Ok(true);
            }
            Some('\n') | Some('\r') => {
                self.trivia.push_str(&ws);
                let nl = self.newline_text().to_string();
                self.trivia.push_str(&nl);
                self.pos += nl.len();
                return Ok(true);
            }
            Some('\\') => {
                // An explicitly continued otherwise-empty line; let the
                // inline pass pick up the continuation.
                self.trivia.push_str(&ws);
                self.at_line_start = false;
                return Ok(false);
            }
            Some(_) => {}
        }
        let current = *self.indents.last().unwrap_or(&0);
        if column > current {
            self.indents.push(column);
            self.emit_marker(TokKind::Indent);
        } else if column < current {
            while self.indents.len() > 1 && *self.indents.last().unwrap_or(&0) > column {
                self.indents.pop();
                self.emit_marker(TokKind::Dedent);
            }
            if *self.indents.last().unwrap_or(&0) != column {
                return Err(self.err("unindent does not match any outer indentation level", ws_start));
            }
        }
        self.trivia.push_str(&ws);
        self.at_line_start = false;
        Ok(false)
    }

    /// Consume spaces, comments, and backslash continuations between tokens.
    fn inline_trivia(&mut self) -> Result<(), ParseError> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\x0c' => {
                    self.trivia.push(c);
                    self.pos += c.len_utf8();
                }
                '#' => {
                    let start = self.pos;
                    self.consume_comment();
                    let comment = self.src[start..self.pos].to_string();
                    self.trivia.push_str(&comment);
                }
                '\\' => {
                    let after = self.char_at(self.pos + 1);
                    match after {
                        Some('\n') | Some('\r') => {
                            self.trivia.push('\\');
                            self.pos += 1;
                            let nl = self.newline_text().to_string();
                            self.trivia.push_str(&nl);
                            self.pos += nl.len();
                        }
                        _ => {
                            return Err(self.err(
                                "unexpected character after line continuation character",
                                self.pos,
                            ));
                        }
                    }
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn lex_token(&mut self, c: char) -> Result<(), ParseError> {
        let start = self.pos;
        if c == '_' || c.is_alphabetic() {
            self.pos += c.len_utf8();
            while let Some(n) = self.peek() {
                if n == '_' || n.is_alphanumeric() {
                    self.pos += n.len_utf8();
                } else {
                    break;
                }
            }
            let word = &self.src[start..self.pos];
            if matches!(self.peek(), Some('"') | Some('\''))
                && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str())
            {
                return self.lex_string(start);
            }
            let text = word.to_string();
            self.emit(TokKind::Name, text, start);
            return Ok(());
        }
        if c.is_ascii_digit() {
            return self.lex_number(start);
        }
        if c == '.' && self.char_at(self.pos + 1).is_some_and(|n| n.is_ascii_digit()) {
            return self.lex_number(start);
        }
        if c == '"' || c == '\'' {
            return self.lex_string(start);
        }
        for op in OPERATORS {
            if self.src[self.pos..].starts_with(op) {
                match *op {
                    "(" | "[" | "{" => self.depth += 1,
                    ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
                    _ => {}
                }
                self.pos += op.len();
                self.emit(TokKind::Op, op.to_string(), start);
                return Ok(());
            }
        }
        Err(self.err(format!("unexpected character {c:?}"), start))
    }

    fn lex_number(&mut self, start: usize) -> Result<(), ParseError> {
        let rest = &self.src[self.pos..];
        if rest.starts_with("0x")
            || rest.starts_with("0X")
            || rest.starts_with("0o")
            || rest.starts_with("0O")
            || rest.starts_with("0b")
            || rest.starts_with("0B")
        {
            self.pos += 2;
            while self.peek().is_some_and(|n| n.is_ascii_alphanumeric() || n == '_') {
                self.pos += 1;
            }
        } else {
            self.consume_digits();
            if self.peek() == Some('.') {
                self.pos += 1;
                self.consume_digits();
            }
            if matches!(self.peek(), Some('e') | Some('E')) {
                let mut ahead = self.pos + 1;
                if matches!(self.char_at(ahead), Some('+') | Some('-')) {
                    ahead += 1;
                }
                if self.char_at(ahead).is_some_and(|n| n.is_ascii_digit()) {
                    self.pos = ahead;
                    self.consume_digits();
                }
            }
            if matches!(self.peek(), Some('j') | Some('J')) {
                self.pos += 1;
            }
        }
        let text = self.src[start..self.pos].to_string();
        self.emit(TokKind::Number, text, start);
        Ok(())
    }

    fn lex_string(&mut self, start: usize) -> Result<(), ParseError> {
        let quote = match self.peek() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(self.err("expected string quote", self.pos)),
        };
        let triple = {
            let bytes = self.src[self.pos..].as_bytes();
            bytes.len() >= 3 && bytes[0] == quote as u8 && bytes[1] == quote as u8 && bytes[2] == quote as u8
        };
        let closer_len = if triple { 3 } else { 1 };
        self.pos += closer_len;
        loop {
            let Some(c) = self.peek() else {
                return Err(self.err("unterminated string literal", start));
            };
            if c == '\\' {
                self.pos += 1;
                match self.peek() {
                    Some('\r') => {
                        self.pos += 1;
                        if self.peek() == Some('\n') {
                            self.pos += 1;
                        }
                    }
                    Some(esc) => self.pos += esc.len_utf8(),
                    None => return Err(self.err("unterminated string literal", start)),
                }
                continue;
            }
            if triple {
                if c == quote {
                    let bytes = self.src[self.pos..].as_bytes();
                    if bytes.len() >= 3 && bytes[1] == quote as u8 && bytes[2] == quote as u8 {
                        self.pos += 3;
                        break;
                    }
                }
            } else {
                if c == quote {
                    self.pos += 1;
                    break;
                }
                if c == '\n' || c == '\r' {
                    return Err(self.err("EOL while scanning string literal", self.pos));
                }
            }
            self.pos += c.len_utf8();
        }
        let text = self.src[start..self.pos].to_string();
        self.emit(TokKind::Str, text, start);
        Ok(())
    }

    fn finish(&mut self) {
        if !self.at_line_start {
            // Last line has no terminator; close it with a zero-width
            // newline so the parser still sees a complete logical line.
            self.emit(TokKind::Newline, String::new(), self.pos);
            self.at_line_start = true;
        }
        while self.indents.len() > 1 {
            self.indents.pop();
            self.emit_marker(TokKind::Dedent);
        }
        let leading = std::mem::take(&mut self.trivia);
        self.tokens.push(Token::new(TokKind::EndMarker, "", leading, self.pos));
    }

    fn emit(&mut self, kind: TokKind, text: String, start: usize) {
        let leading = std::mem::take(&mut self.trivia);
        self.tokens.push(Token::new(kind, text, leading, start));
    }

    fn emit_marker(&mut self, kind: TokKind) {
        // Markers are zero-width; pending trivia stays buffered for the
        // next real token.
        self.tokens.push(Token::new(kind, "", "", self.pos));
    }

    fn consume_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' || c == '\r' {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn consume_digits(&mut self) {
        while self.peek().is_some_and(|n| n.is_ascii_digit() || n == '_') {
            self.pos += 1;
        }
    }

    /// The newline sequence at the current position, without consuming it.
    fn newline_text(&self) -> &'a str {
        if self.src[self.pos..].starts_with("\r\n") {
            "\r\n"
        } else if self.src[self.pos..].starts_with('\r') {
            "\r"
        } else {
            "\n"
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn char_at(&self, pos: usize) -> Option<char> {
        self.src.get(pos..).and_then(|s| s.chars().next())
    }

    fn err(&self, message: impl Into<String>, offset: usize) -> ParseError {
        let (line, column) = line_col(self.src, offset);
        ParseError::new(message, line, column, offset)
    }
}

/// 1-based line and column for a byte offset.
pub(crate) fn line_col(src: &str, offset: usize) -> (usize, usize) {
    let offset = offset.min(src.len());
    let before = &src[..offset];
    let line = before.bytes().filter(|&b| b == b'\n').count() + 1;
    let line_start = before.rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(tokens: &[Token]) -> String {
        let mut out = String::new();
        for tok in tokens {
            out.push_str(&tok.leading);
            out.push_str(&tok.text);
        }
        out
    }

    fn kinds(tokens: &[Token]) -> Vec<TokKind> {
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_simple_assignment() {
        let toks = tokenize("x = 1\n").unwrap();
        assert_eq!(
            kinds(&toks),
            vec![
                TokKind::Name,
                TokKind::Op,
                TokKind::Number,
                TokKind::Newline,
                TokKind::EndMarker
            ]
        );
        assert_eq!(toks[1].leading, " ");
        assert_eq!(toks[2].leading, " ");
        assert_eq!(render(&toks), "x = 1\n");
    }

    #[test]
    fn test_comment_attaches_to_newline() {
        let toks = tokenize("x = 1  # note\n").unwrap();
        let newline = toks.iter().find(|t| t.kind == TokKind::Newline).unwrap();
        assert_eq!(newline.leading, "  # note");
        assert_eq!(render(&toks), "x = 1  # note\n");
    }

    #[test]
    fn test_blank_lines_attach_to_next_token() {
        let src = "a = 1\n\n# setup\nb = 2\n";
        let toks = tokenize(src).unwrap();
        let b = toks.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.leading, "\n# setup\n");
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_indent_dedent_markers() {
        let src = "if x:\n    y = 1\nz = 2\n";
        let toks = tokenize(src).unwrap();
        assert!(toks.iter().any(|t| t.kind == TokKind::Indent));
        assert!(toks.iter().any(|t| t.kind == TokKind::Dedent));
        let y = toks.iter().find(|t| t.text == "y").unwrap();
        assert_eq!(y.leading, "    ");
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_nested_dedents_at_eof() {
        let src = "if x:\n    if y:\n        z\n";
        let toks = tokenize(src).unwrap();
        let dedents = toks.iter().filter(|t| t.kind == TokKind::Dedent).count();
        assert_eq!(dedents, 2);
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_implicit_join_in_brackets() {
        let src = "f(a,\n  b)\n";
        let toks = tokenize(src).unwrap();
        let b = toks.iter().find(|t| t.text == "b").unwrap();
        assert_eq!(b.leading, "\n  ");
        assert_eq!(toks.iter().filter(|t| t.kind == TokKind::Newline).count(), 1);
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_backslash_continuation() {
        let src = "x = 1 + \\\n    2\n";
        let toks = tokenize(src).unwrap();
        let two = toks.iter().find(|t| t.text == "2").unwrap();
        assert_eq!(two.leading, " \\\n    ");
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_no_trailing_newline() {
        let toks = tokenize("x = 1").unwrap();
        let newline = toks.iter().find(|t| t.kind == TokKind::Newline).unwrap();
        assert_eq!(newline.text, "");
        assert_eq!(render(&toks), "x = 1");
    }

    #[test]
    fn test_trailing_blank_lines_go_to_endmarker() {
        let src = "x = 1\n\n# done\n";
        let toks = tokenize(src).unwrap();
        let eof = toks.last().unwrap();
        assert_eq!(eof.kind, TokKind::EndMarker);
        assert_eq!(eof.leading, "\n# done\n");
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_string_prefixes() {
        let toks = tokenize("x = rb'ab\\x00'\n").unwrap();
        let s = toks.iter().find(|t| t.kind == TokKind::Str).unwrap();
        assert_eq!(s.text, "rb'ab\\x00'");
    }

    #[test]
    fn test_triple_quoted_spans_lines() {
        let src = "s = \"\"\"one\ntwo\"\"\"\n";
        let toks = tokenize(src).unwrap();
        let s = toks.iter().find(|t| t.kind == TokKind::Str).unwrap();
        assert_eq!(s.text, "\"\"\"one\ntwo\"\"\"");
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_numbers() {
        let toks = tokenize("a = 0x1f + 1_000 + 1.5e-3 + .5 + 2j\n").unwrap();
        let nums: Vec<&str> = toks
            .iter()
            .filter(|t| t.kind == TokKind::Number)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(nums, vec!["0x1f", "1_000", "1.5e-3", ".5", "2j"]);
    }

    #[test]
    fn test_walrus_and_arrow() {
        let toks = tokenize("def f(x) -> int:\n    return (y := x)\n").unwrap();
        assert!(toks.iter().any(|t| t.text == "->"));
        assert!(toks.iter().any(|t| t.text == ":="));
    }

    #[test]
    fn test_unindent_mismatch_is_error() {
        let err = tokenize("if x:\n    a\n  b\n").unwrap_err();
        assert!(err.message.contains("unindent"));
        assert_eq!(err.line, 3);
    }

    #[test]
    fn test_unterminated_string_is_error() {
        let err = tokenize("x = 'abc\n").unwrap_err();
        assert!(err.message.contains("EOL"));
    }

    #[test]
    fn test_crlf_preserved() {
        let src = "a = 1\r\nb = 2\r\n";
        let toks = tokenize(src).unwrap();
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_comment_only_line_does_not_indent() {
        let src = "x = 1\n        # deep comment\ny = 2\n";
        let toks = tokenize(src).unwrap();
        assert!(!toks.iter().any(|t| t.kind == TokKind::Indent));
        assert_eq!(render(&toks), src);
    }

    #[test]
    fn test_empty_source() {
        let toks = tokenize("").unwrap();
        assert_eq!(kinds(&toks), vec![TokKind::EndMarker]);
    }
}
