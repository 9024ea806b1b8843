//! Parse and tokenize errors with source positions.

use thiserror::Error;

/// Error produced while tokenizing or parsing Python source.
///
/// `line` is 1-based, `column` is 1-based. `offset` is the byte offset
/// into the original source where the error was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at line {line}, column {column}")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    pub offset: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, line: usize, column: usize, offset: usize) -> Self {
        ParseError {
            message: message.into(),
            line,
            column,
            offset,
        }
    }

    /// Render the offending source line with a caret under the error column.
    ///
    /// Returns an empty string when the recorded line is out of range for
    /// `source` (for example when the error came from a different file).
    pub fn snippet(&self, source: &str) -> String {
        let Some(line_text) = source.lines().nth(self.line.saturating_sub(1)) else {
            return String::new();
        };
        let mut caret = String::new();
        for (i, ch) in line_text.chars().enumerate() {
            if i + 1 >= self.column {
                break;
            }
            // Keep tabs so the caret lines up under tabbed source.
            caret.push(if ch == '\t' { '\t' } else { ' ' });
        }
        caret.push('^');
        format!("{line_text}\n{caret}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_position() {
        let err = ParseError::new("unexpected token", 3, 7, 42);
        assert_eq!(err.to_string(), "unexpected token at line 3, column 7");
    }

    #[test]
    fn test_snippet_points_at_column() {
        let err = ParseError::new("bad", 2, 5, 0);
        let snippet = err.snippet("a = 1\nb = $\n");
        assert_eq!(snippet, "b = $\n    ^");
    }

    #[test]
    fn test_snippet_out_of_range_line() {
        let err = ParseError::new("bad", 99, 1, 0);
        assert_eq!(err.snippet("x = 1\n"), "");
    }
}
