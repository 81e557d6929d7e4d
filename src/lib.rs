//! Crate root: wires together the compilation pipeline.
//!
//! The stages are intentionally small and composable so they can be evolved
//! independently:
//! - `lexer` performs lexical analysis and feeds tokens one at a time.
//! - `parser` owns all syntactic knowledge and returns a typed AST.
//! - `semantic` validates scoping and declarations, collecting diagnostics.
//! - `codegen` lowers the checked tree into a pseudo-assembly listing.
//! - `symtab` is the scope-stack symbol table backing the checker.
//! - `error` centralises the fatal error type shared by the other modules.
//!
//! Syntax errors abort the pipeline before checking or generation run.
//! Semantic diagnostics do not block generation by themselves; callers gate
//! on them as they see fit.

pub mod ast;
pub mod codegen;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod semantic;
pub mod symtab;

pub use error::{CompileError, CompileResult};
pub use semantic::Diagnostic;

use crate::ast::Program;
use crate::codegen::CodeGenerator;
use crate::lexer::Lexer;
use crate::semantic::SemanticAnalyzer;

/// Everything one compilation produces.
#[derive(Debug)]
pub struct Compilation {
  pub program: Program,
  pub diagnostics: Vec<Diagnostic>,
  pub assembly: String,
}

/// Run the full pipeline over a source string.
pub fn compile(source: &str) -> CompileResult<Compilation> {
  let program = parser::parse(Lexer::new(source))?;

  let mut analyzer = SemanticAnalyzer::new();
  analyzer.analyze(&program);
  let diagnostics = analyzer.into_diagnostics();

  let assembly = CodeGenerator::new().generate(&program);

  Ok(Compilation {
    program,
    diagnostics,
    assembly,
  })
}
