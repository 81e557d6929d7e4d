//! Semantic checking: scope-aware validation of declarations and uses.
//!
//! The checker is a best-effort linter, not a gate: it walks the tree once,
//! accumulating diagnostics without stopping at the first one, and callers
//! decide whether any diagnostic should block code generation.
//!
//! Declaration checking also compares a declared type against a direct
//! literal initializer's kind. A declaration that is both a duplicate and
//! type-mismatched reports the redeclaration first and the mismatch second.
//! The checker does not descend into initializer sub-expressions beyond that
//! direct-literal comparison.

use std::fmt;

use crate::ast::{Expr, Program, Stmt};
use crate::symtab::SymbolTable;

/// A non-fatal, user-facing report of a semantic problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
  AlreadyDeclared { name: String },
  Undeclared { name: String },
  TypeMismatch {
    name: String,
    declared: String,
    found: String,
  },
}

impl fmt::Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::AlreadyDeclared { name } => {
        write!(f, "variable '{name}' already declared in this scope")
      }
      Self::Undeclared { name } => write!(f, "variable '{name}' used without declaration"),
      Self::TypeMismatch {
        name,
        declared,
        found,
      } => write!(
        f,
        "type mismatch for '{name}': declared '{declared}' but initialized with a {found} literal"
      ),
    }
  }
}

/// The literal kind a direct initializer must have for each known type word.
/// Unknown type words are left unchecked.
fn literal_kind(init: &Expr) -> Option<&'static str> {
  match init {
    Expr::Int(_) => Some("int"),
    Expr::Float(_) => Some("float"),
    Expr::Str(_) => Some("string"),
    Expr::Bool(_) => Some("bool"),
    Expr::Char(_) => Some("char"),
    _ => None,
  }
}

const KNOWN_TYPES: &[&str] = &["int", "float", "bool", "char", "string"];

pub struct SemanticAnalyzer {
  symbols: SymbolTable,
  diagnostics: Vec<Diagnostic>,
}

impl SemanticAnalyzer {
  pub fn new() -> Self {
    Self {
      symbols: SymbolTable::new(),
      diagnostics: Vec::new(),
    }
  }

  /// Walk the whole tree once, collecting diagnostics.
  pub fn analyze(&mut self, program: &Program) {
    self.symbols.enter_scope();
    for stmt in &program.body {
      self.check_stmt(stmt);
    }
    self.symbols.exit_scope();
  }

  pub fn into_diagnostics(self) -> Vec<Diagnostic> {
    self.diagnostics
  }

  fn report(&mut self, diagnostic: Diagnostic) {
    self.diagnostics.push(diagnostic);
  }

  fn check_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Block(stmts) => {
        self.symbols.enter_scope();
        for stmt in stmts {
          self.check_stmt(stmt);
        }
        self.symbols.exit_scope();
      }
      Stmt::Declaration { name, ty, init } => {
        if !self.symbols.declare(name, ty) {
          self.report(Diagnostic::AlreadyDeclared { name: name.clone() });
        }
        if let Some(init) = init
          && KNOWN_TYPES.contains(&ty.as_str())
          && let Some(found) = literal_kind(init)
          && found != ty
        {
          self.report(Diagnostic::TypeMismatch {
            name: name.clone(),
            declared: ty.clone(),
            found: found.to_string(),
          });
        }
      }
      Stmt::Assignment { target, value } => {
        self.check_var(target);
        self.check_expr(value);
      }
      // `if` and `while` open no scope of their own; their blocks do.
      Stmt::If {
        cond,
        then_block,
        else_block,
      } => {
        self.check_expr(cond);
        self.check_stmt(then_block);
        if let Some(else_block) = else_block {
          self.check_stmt(else_block);
        }
      }
      Stmt::While { cond, body } => {
        self.check_expr(cond);
        self.check_stmt(body);
      }
      // `for` owns a scope so an initializer declaration does not leak.
      Stmt::For {
        init,
        cond,
        incr,
        body,
      } => {
        self.symbols.enter_scope();
        if let Some(init) = init {
          self.check_stmt(init);
        }
        if let Some(cond) = cond {
          self.check_expr(cond);
        }
        if let Some(incr) = incr {
          self.check_stmt(incr);
        }
        self.check_stmt(body);
        self.symbols.exit_scope();
      }
      // Parameters land in the function's own scope before the body is
      // walked, so they are visible inside it and nowhere else.
      Stmt::Function { params, body, .. } => {
        self.symbols.enter_scope();
        for param in params {
          if !self.symbols.declare(&param.name, &param.ty) {
            self.report(Diagnostic::AlreadyDeclared {
              name: param.name.clone(),
            });
          }
        }
        self.check_stmt(body);
        self.symbols.exit_scope();
      }
      Stmt::Print(expr) => self.check_expr(expr),
      Stmt::Input { name } => self.check_var(name),
      Stmt::Return(expr) => {
        if let Some(expr) = expr {
          self.check_expr(expr);
        }
      }
      Stmt::Call { args, .. } => {
        for arg in args {
          self.check_expr(arg);
        }
      }
      Stmt::Expr(expr) => self.check_expr(expr),
    }
  }

  fn check_expr(&mut self, expr: &Expr) {
    match expr {
      Expr::Var(name) => self.check_var(name),
      Expr::Binary { lhs, rhs, .. } => {
        self.check_expr(lhs);
        self.check_expr(rhs);
      }
      // Call targets are not resolved; arguments still are.
      Expr::Call { args, .. } => {
        for arg in args {
          self.check_expr(arg);
        }
      }
      Expr::Int(_) | Expr::Float(_) | Expr::Str(_) | Expr::Bool(_) | Expr::Char(_) => {}
    }
  }

  fn check_var(&mut self, name: &str) {
    if !self.symbols.is_declared(name) {
      self.report(Diagnostic::Undeclared {
        name: name.to_string(),
      });
    }
  }
}

impl Default for SemanticAnalyzer {
  fn default() -> Self {
    Self::new()
  }
}
