//! Source tokens with attached leading trivia.
//!
//! Every token owns the whitespace, comments, blank lines, and line
//! continuations that appear *before* it in the source (`leading`), plus its
//! own text. Rendering a tree is nothing more than concatenating `leading`
//! and `text` of every token in order, which is what makes the tree
//! byte-for-byte lossless.

/// Lexical class of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokKind {
    /// Identifier or keyword.
    Name,
    /// Integer, float, or imaginary literal.
    Number,
    /// String or bytes literal, including its prefix and quotes.
    Str,
    /// Operator or delimiter.
    Op,
    /// Logical end of line. Text is `"\n"`, `"\r\n"`, `"\r"`, or `""` for a
    /// file whose last line has no terminator.
    Newline,
    /// Zero-width indentation marker. Carries no text; the indentation
    /// itself lives in the leading trivia of the first real token on the
    /// line.
    Indent,
    /// Zero-width dedentation marker.
    Dedent,
    /// End of file. Carries any trailing trivia after the last statement.
    EndMarker,
}

/// A single token plus the trivia that precedes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokKind,
    /// Exact source text. Empty for `Indent`, `Dedent`, `EndMarker`, and a
    /// synthesized final `Newline`.
    pub text: String,
    /// Whitespace, comments, blank lines, and backslash continuations that
    /// precede `text` in the source.
    pub leading: String,
    /// Byte offset of `text` in the original source. Zero for tokens built
    /// by rewrite rules; positions are only meaningful on parsed tokens.
    pub start: usize,
}

impl Token {
    pub fn new(kind: TokKind, text: impl Into<String>, leading: impl Into<String>, start: usize) -> Self {
        Token {
            kind,
            text: text.into(),
            leading: leading.into(),
            start,
        }
    }

    /// A detached token with no leading trivia, for building replacement
    /// nodes inside rewrite rules.
    pub fn detached(kind: TokKind, text: impl Into<String>) -> Self {
        Token::new(kind, text, "", 0)
    }

    /// A detached token with explicit leading trivia.
    pub fn with_leading(kind: TokKind, text: impl Into<String>, leading: impl Into<String>) -> Self {
        Token::new(kind, text, leading, 0)
    }

    pub fn name(text: impl Into<String>) -> Self {
        Token::detached(TokKind::Name, text)
    }

    pub fn op(text: impl Into<String>) -> Self {
        Token::detached(TokKind::Op, text)
    }

    pub fn number(text: impl Into<String>) -> Self {
        Token::detached(TokKind::Number, text)
    }

    pub fn string(text: impl Into<String>) -> Self {
        Token::detached(TokKind::Str, text)
    }

    /// Byte offset one past the end of `text` in the original source.
    pub fn end(&self) -> usize {
        self.start + self.text.len()
    }

    /// True for the zero-width structural markers.
    pub fn is_marker(&self) -> bool {
        matches!(self.kind, TokKind::Indent | TokKind::Dedent)
    }
}
