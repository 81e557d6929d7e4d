//! Shared error utilities used across the compilation pipeline.
//!
//! Only the parser produces fatal errors; semantic problems are collected as
//! non-fatal diagnostics (see `semantic`) and never abort the pipeline on
//! their own.

use snafu::Snafu;

use crate::lexer::TokenKind;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Snafu)]
pub enum CompileError {
  /// A required token, keyword or symbol was missing or of the wrong kind.
  /// Fatal to the current parse: no recovery, no partial AST.
  #[snafu(display("syntax error: {expected}, but got \"{found}\" ({kind:?})"))]
  Syntax {
    expected: String,
    found: String,
    kind: TokenKind,
  },
}

impl CompileError {
  /// Construct a syntax error anchored at the offending token.
  pub fn syntax(expected: impl Into<String>, found: impl Into<String>, kind: TokenKind) -> Self {
    Self::Syntax {
      expected: expected.into(),
      found: found.into(),
      kind,
    }
  }
}
