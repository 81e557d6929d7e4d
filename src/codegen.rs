//! Code generation: lower the checked AST into a flat pseudo-assembly
//! listing.
//!
//! The emitter walks the tree once, filling two ordered buffers: a `.DATA`
//! section with one default-initialized reservation per declared variable
//! and a `.CODE` section with instruction-like lines. Jump targets are
//! synthesized labels `L0, L1, …` allocated in tree-walk order, so two runs
//! over the same tree produce byte-identical output. The generator assumes
//! the tree already passed semantic checking and never fails; an invalid
//! tree yields nonsensical but well-formed text.

use std::fmt::Write;

use crate::ast::{Expr, Program, Stmt};

pub struct CodeGenerator {
  data: String,
  code: String,
  label_count: usize,
}

impl CodeGenerator {
  pub fn new() -> Self {
    Self {
      data: ".DATA\n".to_string(),
      code: ".CODE\n".to_string(),
      label_count: 0,
    }
  }

  /// Lower a whole program and return the concatenated sections.
  pub fn generate(mut self, program: &Program) -> String {
    for stmt in &program.body {
      self.gen_stmt(stmt);
    }
    format!("{}\n{}", self.data, self.code)
  }

  fn new_label(&mut self) -> String {
    let label = format!("L{}", self.label_count);
    self.label_count += 1;
    label
  }

  fn emit(&mut self, line: impl AsRef<str>) {
    self.code.push_str(line.as_ref());
    self.code.push('\n');
  }

  /// Compare against zero and branch to `target` when false.
  fn emit_condition(&mut self, cond: &Expr, target: &str) {
    self.emit(format!("CMP {cond}, 0"));
    self.emit(format!("JE {target}"));
  }

  fn gen_stmt(&mut self, stmt: &Stmt) {
    match stmt {
      Stmt::Block(stmts) => {
        for stmt in stmts {
          self.gen_stmt(stmt);
        }
      }
      Stmt::Declaration { name, init, .. } => {
        let _ = writeln!(self.data, "{name} DW 0");
        if let Some(init) = init {
          self.emit(format!("MOV {name}, {init}"));
        }
      }
      Stmt::Assignment { target, value } => {
        self.emit(format!("MOV {target}, {value}"));
      }
      Stmt::If {
        cond,
        then_block,
        else_block,
      } => {
        let else_label = self.new_label();
        let end_label = self.new_label();
        self.emit_condition(cond, &else_label);
        self.gen_stmt(then_block);
        self.emit(format!("JMP {end_label}"));
        self.emit(format!("{else_label}:"));
        if let Some(else_block) = else_block {
          self.gen_stmt(else_block);
        }
        self.emit(format!("{end_label}:"));
      }
      Stmt::While { cond, body } => {
        let start_label = self.new_label();
        let end_label = self.new_label();
        self.emit(format!("{start_label}:"));
        self.emit_condition(cond, &end_label);
        self.gen_stmt(body);
        self.emit(format!("JMP {start_label}"));
        self.emit(format!("{end_label}:"));
      }
      // The increment runs after the body and before the back-edge, once
      // per completed iteration. An elided condition loops unconditionally.
      Stmt::For {
        init,
        cond,
        incr,
        body,
      } => {
        let start_label = self.new_label();
        let end_label = self.new_label();
        if let Some(init) = init {
          self.gen_stmt(init);
        }
        self.emit(format!("{start_label}:"));
        if let Some(cond) = cond {
          self.emit_condition(cond, &end_label);
        }
        self.gen_stmt(body);
        if let Some(incr) = incr {
          self.gen_stmt(incr);
        }
        self.emit(format!("JMP {start_label}"));
        self.emit(format!("{end_label}:"));
      }
      // The trailing RET is emitted even when the body already returned;
      // redundant but harmless in a listing that is never executed.
      Stmt::Function { name, body, .. } => {
        self.emit(format!("{name}:"));
        self.gen_stmt(body);
        self.emit("RET");
      }
      Stmt::Print(expr) => self.emit(format!("OUT {expr}")),
      Stmt::Input { name } => self.emit(format!("IN {name}")),
      Stmt::Return(expr) => {
        if let Some(expr) = expr {
          self.emit(format!("MOV RV, {expr}"));
        }
        self.emit("RET");
      }
      Stmt::Call { name, .. } => self.emit(format!("CALL {name}")),
      Stmt::Expr(expr) => self.emit(format!("; expression {expr}")),
    }
  }
}

impl Default for CodeGenerator {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexer::Lexer;
  use crate::parser;

  fn generate_source(source: &str) -> String {
    let program = parser::parse(Lexer::new(source)).expect("program should parse");
    CodeGenerator::new().generate(&program)
  }

  #[test]
  fn declaration_reserves_data_and_moves_initializer() {
    let listing = generate_source("var x: int = 10;");
    assert_eq!(listing, ".DATA\nx DW 0\n\n.CODE\nMOV x, 10\n");
  }

  #[test]
  fn if_else_lowering_orders_labels_and_branches() {
    let listing = generate_source("if (x) { print(x); } else { x = 1; }");
    let code: Vec<&str> = listing
      .split("\n.CODE\n")
      .nth(1)
      .expect("listing has a code section")
      .lines()
      .collect();
    assert_eq!(
      code,
      vec![
        "CMP x, 0",
        "JE L0",
        "OUT x",
        "JMP L1",
        "L0:",
        "MOV x, 1",
        "L1:",
      ]
    );
  }

  #[test]
  fn while_lowering_places_back_edge_before_end_label() {
    let listing = generate_source("while (x) { x = x - 1; }");
    let code: Vec<&str> = listing
      .split("\n.CODE\n")
      .nth(1)
      .expect("listing has a code section")
      .lines()
      .collect();
    assert_eq!(
      code,
      vec![
        "L0:",
        "CMP x, 0",
        "JE L1",
        "MOV x, (x - 1)",
        "JMP L0",
        "L1:",
      ]
    );
  }

  #[test]
  fn for_increment_runs_after_body_before_back_edge() {
    let listing = generate_source("for (var i: int = 0; i < 3; i = i + 1) { print(i); }");
    let code: Vec<&str> = listing
      .split("\n.CODE\n")
      .nth(1)
      .expect("listing has a code section")
      .lines()
      .collect();
    assert_eq!(
      code,
      vec![
        "MOV i, 0",
        "L0:",
        "CMP (i < 3), 0",
        "JE L1",
        "OUT i",
        "MOV i, (i + 1)",
        "JMP L0",
        "L1:",
      ]
    );
  }

  #[test]
  fn input_lowers_to_in() {
    let listing = generate_source("var x: int; input(x);");
    assert_eq!(listing, ".DATA\nx DW 0\n\n.CODE\nIN x\n");
  }

  #[test]
  fn bare_expression_lowers_to_comment_line() {
    let listing = generate_source("(1 + 2);");
    assert_eq!(listing, ".DATA\n\n.CODE\n; expression (1 + 2)\n");
  }

  #[test]
  fn function_always_ends_with_ret() {
    let listing = generate_source("func soma(a: int, b: int): int { return a + b; }");
    assert!(listing.ends_with("soma:\nMOV RV, (a + b)\nRET\nRET\n"));
  }

  #[test]
  fn labels_are_unique_across_constructs() {
    let listing = generate_source("if (x) { print(x); } while (y) { print(y); }");
    assert!(listing.contains("JE L0"));
    assert!(listing.contains("L2:"));
    assert!(listing.contains("JE L3"));
  }

  #[test]
  fn generation_is_deterministic() {
    let source = "var x: int = 1; if (x) { while (x) { x = x - 1; } } else { print(x); }";
    assert_eq!(generate_source(source), generate_source(source));
  }

  #[test]
  fn undeclared_variable_gets_no_data_entry() {
    let listing = generate_source("z = 1;");
    assert_eq!(listing, ".DATA\n\n.CODE\nMOV z, 1\n");
  }
}
