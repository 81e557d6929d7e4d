//! Scoped symbol table used by the semantic checker.
//!
//! Scopes are an explicit stack of name-to-type frames: entering a scope
//! pushes a frame, exiting pops it, and lookup walks frames innermost-first
//! so the most specific declaration wins. Level 0 is the global scope and is
//! never popped.

use std::collections::HashMap;

pub struct SymbolTable {
  scopes: Vec<HashMap<String, String>>,
}

impl SymbolTable {
  pub fn new() -> Self {
    Self {
      scopes: vec![HashMap::new()],
    }
  }

  pub fn enter_scope(&mut self) {
    self.scopes.push(HashMap::new());
  }

  /// Drops every symbol declared in the innermost scope. Must pair 1:1 with
  /// `enter_scope`; popping the global frame is a caller bug.
  pub fn exit_scope(&mut self) {
    assert!(
      self.scopes.len() > 1,
      "exit_scope without a matching enter_scope"
    );
    self.scopes.pop();
  }

  /// Returns false without mutating anything when `name` already exists in
  /// the innermost scope. Shadowing an outer scope succeeds.
  pub fn declare(&mut self, name: &str, ty: &str) -> bool {
    let scope = self
      .scopes
      .last_mut()
      .expect("symbol table always has a global scope");
    if scope.contains_key(name) {
      return false;
    }
    scope.insert(name.to_string(), ty.to_string());
    true
  }

  pub fn is_declared(&self, name: &str) -> bool {
    self.get_type(name).is_some()
  }

  /// Innermost-first lookup: an inner redeclaration hides the outer one.
  pub fn get_type(&self, name: &str) -> Option<&str> {
    self
      .scopes
      .iter()
      .rev()
      .find_map(|scope| scope.get(name).map(String::as_str))
  }
}

impl Default for SymbolTable {
  fn default() -> Self {
    Self::new()
  }
}
