//! Recursive-descent parser producing a typed AST.
//!
//! Statements are parsed by a one-production-per-lead-token dispatch and
//! expressions by precedence climbing, so the grammar stays easy to extend
//! with new statement kinds. The parser holds a single token of look-ahead
//! over any `TokenSource` and fails fast: the first missing token aborts the
//! parse with a `Syntax` error and no partial tree.

use crate::ast::{BinOp, Expr, Param, Program, Stmt};
use crate::error::{CompileError, CompileResult};
use crate::lexer::{Token, TokenKind, TokenSource};

/// Parse the whole token stream into a `Program`.
pub fn parse<S: TokenSource>(tokens: S) -> CompileResult<Program> {
  Parser::new(tokens).parse_program()
}

/// Human-friendly description used in diagnostics.
fn describe(token: &Token) -> String {
  match token.kind {
    TokenKind::EndOfInput => "EOF".to_string(),
    _ => token.text.clone(),
  }
}

pub struct Parser<S> {
  tokens: S,
  current: Token,
}

impl<S: TokenSource> Parser<S> {
  pub fn new(mut tokens: S) -> Self {
    let current = tokens.next_token();
    Self { tokens, current }
  }

  /// Top-level entry: statements until end of input.
  pub fn parse_program(&mut self) -> CompileResult<Program> {
    let mut body = Vec::new();
    while self.current.kind != TokenKind::EndOfInput {
      body.push(self.parse_statement()?);
    }
    Ok(Program { body })
  }

  fn advance(&mut self) {
    self.current = self.tokens.next_token();
  }

  /// Take the current token and pull in the next one.
  fn bump(&mut self) -> Token {
    std::mem::replace(&mut self.current, self.tokens.next_token())
  }

  fn err(&self, expected: impl Into<String>) -> CompileError {
    CompileError::syntax(expected, describe(&self.current), self.current.kind)
  }

  fn at_symbol(&self, text: &str) -> bool {
    self.current.kind == TokenKind::Symbol && self.current.text == text
  }

  fn at_operator(&self, text: &str) -> bool {
    self.current.kind == TokenKind::Operator && self.current.text == text
  }

  fn at_keyword(&self, text: &str) -> bool {
    self.current.kind == TokenKind::Keyword && self.current.text == text
  }

  fn expect_symbol(&mut self, text: &str) -> CompileResult<()> {
    if self.at_symbol(text) {
      self.advance();
      Ok(())
    } else {
      Err(self.err(format!("expected \"{text}\"")))
    }
  }

  fn expect_operator(&mut self, text: &str) -> CompileResult<()> {
    if self.at_operator(text) {
      self.advance();
      Ok(())
    } else {
      Err(self.err(format!("expected \"{text}\"")))
    }
  }

  fn expect_keyword(&mut self, text: &str) -> CompileResult<()> {
    if self.at_keyword(text) {
      self.advance();
      Ok(())
    } else {
      Err(self.err(format!("expected keyword \"{text}\"")))
    }
  }

  fn expect_identifier(&mut self, what: &str) -> CompileResult<String> {
    if self.current.kind == TokenKind::Identifier {
      Ok(self.bump().text)
    } else {
      Err(self.err(format!("expected {what}")))
    }
  }

  /// Type positions accept either classification the lexer may choose for a
  /// type word.
  fn expect_type(&mut self, what: &str) -> CompileResult<String> {
    if matches!(
      self.current.kind,
      TokenKind::Identifier | TokenKind::Keyword
    ) {
      Ok(self.bump().text)
    } else {
      Err(self.err(format!("expected {what}")))
    }
  }

  fn parse_statement(&mut self) -> CompileResult<Stmt> {
    if self.current.kind == TokenKind::Keyword {
      match self.current.text.as_str() {
        "var" => return self.parse_declaration(),
        "if" => return self.parse_if(),
        "while" => return self.parse_while(),
        "for" => return self.parse_for(),
        "func" => return self.parse_function(),
        "print" => return self.parse_print(),
        "input" => return self.parse_input(),
        "return" => return self.parse_return(),
        _ => {}
      }
    }
    if self.current.kind == TokenKind::Identifier {
      return self.parse_assignment_or_call();
    }
    if self.at_symbol("{") {
      return self.parse_block();
    }
    // Anything else is a bare expression statement.
    let expr = self.parse_expression()?;
    self.expect_symbol(";")?;
    Ok(Stmt::Expr(expr))
  }

  fn parse_declaration(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("var")?;
    let name = self.expect_identifier("a variable name")?;
    self.expect_symbol(":")?;
    let ty = self.expect_type("a variable type")?;

    let init = if self.at_operator("=") {
      self.advance();
      Some(self.parse_expression()?)
    } else {
      None
    };

    self.expect_symbol(";")?;
    Ok(Stmt::Declaration { name, ty, init })
  }

  fn parse_if(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("if")?;
    self.expect_symbol("(")?;
    let cond = self.parse_expression()?;
    self.expect_symbol(")")?;
    let then_block = Box::new(self.parse_block()?);

    let else_block = if self.at_keyword("else") {
      self.advance();
      Some(Box::new(self.parse_block()?))
    } else {
      None
    };

    Ok(Stmt::If {
      cond,
      then_block,
      else_block,
    })
  }

  fn parse_while(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("while")?;
    self.expect_symbol("(")?;
    let cond = self.parse_expression()?;
    self.expect_symbol(")")?;
    let body = Box::new(self.parse_block()?);
    Ok(Stmt::While { cond, body })
  }

  /// `for (init; cond; incr) { … }` where each clause may be elided. The
  /// initializer is either a full declaration or an assignment; the increment
  /// must be an assignment.
  fn parse_for(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("for")?;
    self.expect_symbol("(")?;

    let init = if self.at_symbol(";") {
      self.advance();
      None
    } else if self.at_keyword("var") {
      // parse_declaration consumes the terminating ';'.
      Some(Box::new(self.parse_declaration()?))
    } else {
      let target = self.expect_identifier("an assignment in for loop initializer")?;
      self.expect_operator("=")?;
      let value = self.parse_expression()?;
      self.expect_symbol(";")?;
      Some(Box::new(Stmt::Assignment { target, value }))
    };

    let cond = if self.at_symbol(";") {
      None
    } else {
      Some(self.parse_expression()?)
    };
    self.expect_symbol(";")?;

    let incr = if self.at_symbol(")") {
      None
    } else {
      let target = self.expect_identifier("an assignment in for loop increment")?;
      self.expect_operator("=")?;
      let value = self.parse_expression()?;
      Some(Box::new(Stmt::Assignment { target, value }))
    };
    self.expect_symbol(")")?;

    let body = Box::new(self.parse_block()?);
    Ok(Stmt::For {
      init,
      cond,
      incr,
      body,
    })
  }

  fn parse_function(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("func")?;
    let name = self.expect_identifier("a function name")?;
    self.expect_symbol("(")?;

    let mut params = Vec::new();
    if !self.at_symbol(")") {
      loop {
        let name = self.expect_identifier("a parameter name")?;
        self.expect_symbol(":")?;
        let ty = self.expect_type("a parameter type")?;
        params.push(Param { name, ty });
        if self.at_symbol(")") {
          break;
        }
        self.expect_symbol(",")?;
      }
    }
    self.expect_symbol(")")?;
    self.expect_symbol(":")?;
    let return_type = self.expect_type("a return type")?;
    let body = Box::new(self.parse_block()?);

    Ok(Stmt::Function {
      name,
      return_type,
      params,
      body,
    })
  }

  fn parse_print(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("print")?;
    self.expect_symbol("(")?;
    let expr = self.parse_expression()?;
    self.expect_symbol(")")?;
    self.expect_symbol(";")?;
    Ok(Stmt::Print(expr))
  }

  fn parse_input(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("input")?;
    self.expect_symbol("(")?;
    let name = self.expect_identifier("a variable name")?;
    self.expect_symbol(")")?;
    self.expect_symbol(";")?;
    Ok(Stmt::Input { name })
  }

  fn parse_return(&mut self) -> CompileResult<Stmt> {
    self.expect_keyword("return")?;
    let expr = if self.at_symbol(";") {
      None
    } else {
      Some(self.parse_expression()?)
    };
    self.expect_symbol(";")?;
    Ok(Stmt::Return(expr))
  }

  /// Guard against an unterminated block swallowing the rest of the stream.
  fn parse_block(&mut self) -> CompileResult<Stmt> {
    self.expect_symbol("{")?;
    let mut stmts = Vec::new();
    while !self.at_symbol("}") {
      if self.current.kind == TokenKind::EndOfInput {
        return Err(self.err("unexpected end of input, missing \"}\""));
      }
      stmts.push(self.parse_statement()?);
    }
    self.expect_symbol("}")?;
    Ok(Stmt::Block(stmts))
  }

  /// An identifier lead is disambiguated by the next token: `=` starts an
  /// assignment, `(` a call statement.
  fn parse_assignment_or_call(&mut self) -> CompileResult<Stmt> {
    let name = self.bump().text;

    if self.at_symbol("(") {
      self.advance();
      let args = self.parse_call_args()?;
      self.expect_symbol(";")?;
      return Ok(Stmt::Call { name, args });
    }

    if self.at_operator("=") {
      self.advance();
      let value = self.parse_expression()?;
      self.expect_symbol(";")?;
      return Ok(Stmt::Assignment {
        target: name,
        value,
      });
    }

    Err(self.err("expected \"(\" for a call or \"=\" for an assignment"))
  }

  /// Comma-separated arguments up to the closing parenthesis, which is
  /// consumed. A dangling comma is a syntax error.
  fn parse_call_args(&mut self) -> CompileResult<Vec<Expr>> {
    let mut args = Vec::new();
    if !self.at_symbol(")") {
      loop {
        args.push(self.parse_expression()?);
        if self.at_symbol(")") {
          break;
        }
        self.expect_symbol(",")?;
      }
    }
    self.expect_symbol(")")?;
    Ok(args)
  }

  fn parse_expression(&mut self) -> CompileResult<Expr> {
    self.parse_binary(1)
  }

  /// Precedence climbing: consume operators binding at least as tightly as
  /// `min_prec`, recursing one level tighter for the right operand so equal
  /// precedence associates to the left.
  fn parse_binary(&mut self, min_prec: u8) -> CompileResult<Expr> {
    let mut node = self.parse_primary()?;

    while self.current.kind == TokenKind::Operator
      && let Some(op) = BinOp::from_token(&self.current.text)
      && op.precedence() >= min_prec
    {
      self.advance();
      let rhs = self.parse_binary(op.precedence() + 1)?;
      node = Expr::binary(op, node, rhs);
    }

    Ok(node)
  }

  fn parse_primary(&mut self) -> CompileResult<Expr> {
    match self.current.kind {
      TokenKind::IntegerLiteral => Ok(Expr::Int(self.bump().text)),
      TokenKind::FloatLiteral => Ok(Expr::Float(self.bump().text)),
      TokenKind::StringLiteral => Ok(Expr::Str(self.bump().text)),
      TokenKind::BooleanLiteral => Ok(Expr::Bool(self.bump().text)),
      TokenKind::CharLiteral => Ok(Expr::Char(self.bump().text)),
      TokenKind::Identifier => {
        let name = self.bump().text;
        if self.at_symbol("(") {
          self.advance();
          let args = self.parse_call_args()?;
          Ok(Expr::Call { name, args })
        } else {
          Ok(Expr::Var(name))
        }
      }
      TokenKind::Symbol if self.current.text == "(" => {
        self.advance();
        let node = self.parse_expression()?;
        self.expect_symbol(")")?;
        Ok(node)
      }
      _ => Err(self.err("expected the start of an expression")),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::lexer::Lexer;

  fn parse_source(source: &str) -> CompileResult<Program> {
    parse(Lexer::new(source))
  }

  fn parse_ok(source: &str) -> Program {
    parse_source(source).expect("program should parse")
  }

  #[test]
  fn declaration_and_assignment() {
    let program = parse_ok("var x: int = 10; x = 5;");
    assert_eq!(
      program.body,
      vec![
        Stmt::Declaration {
          name: "x".into(),
          ty: "int".into(),
          init: Some(Expr::Int("10".into())),
        },
        Stmt::Assignment {
          target: "x".into(),
          value: Expr::Int("5".into()),
        },
      ]
    );
  }

  #[test]
  fn multiplication_binds_tighter_than_addition() {
    let program = parse_ok("var x: int = 1 + 2 * 3;");
    let Stmt::Declaration {
      init: Some(expr), ..
    } = &program.body[0]
    else {
      panic!("expected a declaration with initializer");
    };
    assert_eq!(
      *expr,
      Expr::binary(
        BinOp::Add,
        Expr::Int("1".into()),
        Expr::binary(BinOp::Mul, Expr::Int("2".into()), Expr::Int("3".into())),
      )
    );
  }

  #[test]
  fn equal_precedence_associates_left() {
    let program = parse_ok("var x: int = 1 - 2 - 3;");
    let Stmt::Declaration {
      init: Some(expr), ..
    } = &program.body[0]
    else {
      panic!("expected a declaration with initializer");
    };
    assert_eq!(
      *expr,
      Expr::binary(
        BinOp::Sub,
        Expr::binary(BinOp::Sub, Expr::Int("1".into()), Expr::Int("2".into())),
        Expr::Int("3".into()),
      )
    );
  }

  #[test]
  fn comparison_spans_arithmetic() {
    let program = parse_ok("while (i < n + 1) { i = i + 1; }");
    let Stmt::While { cond, .. } = &program.body[0] else {
      panic!("expected a while statement");
    };
    assert_eq!(
      *cond,
      Expr::binary(
        BinOp::Lt,
        Expr::Var("i".into()),
        Expr::binary(BinOp::Add, Expr::Var("n".into()), Expr::Int("1".into())),
      )
    );
  }

  #[test]
  fn function_with_parameters() {
    let program = parse_ok("func soma(a: int, b: int): int { return a + b; }");
    let Stmt::Function {
      name,
      return_type,
      params,
      body,
    } = &program.body[0]
    else {
      panic!("expected a function");
    };
    assert_eq!(name, "soma");
    assert_eq!(return_type, "int");
    assert_eq!(
      *params,
      vec![
        Param {
          name: "a".into(),
          ty: "int".into()
        },
        Param {
          name: "b".into(),
          ty: "int".into()
        },
      ]
    );
    let Stmt::Block(stmts) = body.as_ref() else {
      panic!("expected a block body");
    };
    assert!(matches!(stmts[0], Stmt::Return(Some(_))));
  }

  #[test]
  fn call_statement_and_call_expression() {
    let program = parse_ok("soma(1, x); var y: int = soma(2, 3);");
    assert_eq!(
      program.body[0],
      Stmt::Call {
        name: "soma".into(),
        args: vec![Expr::Int("1".into()), Expr::Var("x".into())],
      }
    );
    let Stmt::Declaration {
      init: Some(Expr::Call { name, args }),
      ..
    } = &program.body[1]
    else {
      panic!("expected a call initializer");
    };
    assert_eq!(name, "soma");
    assert_eq!(args.len(), 2);
  }

  #[test]
  fn for_clauses_may_be_elided() {
    let program = parse_ok("for (;;) { print(1); }");
    let Stmt::For {
      init, cond, incr, ..
    } = &program.body[0]
    else {
      panic!("expected a for statement");
    };
    assert!(init.is_none());
    assert!(cond.is_none());
    assert!(incr.is_none());
  }

  #[test]
  fn for_with_declaration_initializer() {
    let program = parse_ok("for (var i: int = 0; i < 10; i = i + 1) { print(i); }");
    let Stmt::For {
      init, cond, incr, ..
    } = &program.body[0]
    else {
      panic!("expected a for statement");
    };
    assert!(matches!(
      init.as_deref(),
      Some(Stmt::Declaration { .. })
    ));
    assert!(cond.is_some());
    assert!(matches!(incr.as_deref(), Some(Stmt::Assignment { .. })));
  }

  #[test]
  fn input_statement_parses_to_its_target() {
    let program = parse_ok("var x: int; input(x);");
    assert_eq!(program.body[1], Stmt::Input { name: "x".into() });
  }

  #[test]
  fn bare_expression_statement_parses_and_round_trips() {
    let program = parse_ok("(1 + 2);");
    assert_eq!(
      program.body,
      vec![Stmt::Expr(Expr::binary(
        BinOp::Add,
        Expr::Int("1".into()),
        Expr::Int("2".into()),
      ))]
    );
    let reparsed = parse_ok(&program.to_string());
    assert_eq!(program, reparsed);
  }

  #[test]
  fn if_with_else_branch() {
    let program = parse_ok("if (x) { print(x); } else { x = 1; }");
    let Stmt::If {
      then_block,
      else_block,
      ..
    } = &program.body[0]
    else {
      panic!("expected an if statement");
    };
    assert!(matches!(then_block.as_ref(), Stmt::Block(_)));
    assert!(else_block.is_some());
  }

  #[test]
  fn unterminated_block_is_rejected() {
    let err = parse_source("{ var x: int;").unwrap_err();
    assert!(err.to_string().contains("unexpected end of input"));
  }

  #[test]
  fn dangling_argument_comma_is_rejected() {
    assert!(parse_source("soma(1,);").is_err());
  }

  #[test]
  fn missing_semicolon_is_rejected() {
    let err = parse_source("var x: int = 1").unwrap_err();
    assert!(err.to_string().contains("expected \";\""));
  }

  #[test]
  fn identifier_without_call_or_assignment_is_rejected() {
    assert!(parse_source("x;").is_err());
  }

  #[test]
  fn round_trip_preserves_structure() {
    let source = "var x: int = 10; \
                  func soma(a: int, b: int): int { return (a + b) * 2; } \
                  if (x < 5) { print(soma(x, 1)); } else { x = 0; } \
                  for (var i: int = 0; i < x; i = i + 1) { while (x) { x = x - 1; } }";
    let first = parse_ok(source);
    let second = parse_ok(&first.to_string());
    assert_eq!(first, second);
  }
}
