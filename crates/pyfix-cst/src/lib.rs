//! pyfix-cst: Lossless concrete syntax trees for Python source
//!
//! This crate provides:
//! - `tokenize()`: A trivia-preserving Python tokenizer
//! - `parse_module()` / `parse_expression()`: Parsers producing a CST
//! - `Module::code()`: Byte-exact rendering of a tree back to source
//! - `Span` / `LineIndex`: Source positions for diagnostics
//!
//! Every token owns the whitespace, comments, and continuations that
//! precede it, so an unmodified tree renders to exactly the bytes it was
//! parsed from. Rewrites edit node fields and splice trivia between
//! tokens; everything untouched survives verbatim.

mod codegen;
mod error;
pub mod expression;
mod parser;
mod position;
mod span;
pub mod statement;
mod token;
mod tokenizer;

pub use codegen::{Codegen, CodegenState};
pub use error::ParseError;
pub use parser::{parse_expression, parse_module};
pub use position::LineIndex;
pub use span::{span_of, Span, Spanned};
pub use token::{TokKind, Token};
pub use tokenizer::tokenize;

pub use expression::*;
pub use statement::*;
