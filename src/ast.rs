//! Typed abstract syntax tree produced by the parser.
//!
//! Each variant carries exactly the fields it needs, so later stages match
//! exhaustively instead of dispatching on string tags. The `Display` impls
//! re-serialize a tree to a canonical one-line source form that parses back
//! to a structurally identical tree; the code generator also uses them to
//! render operands.

use std::fmt;

/// Binary operators, ordered here from tightest-binding to loosest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinOp {
  Mul,
  Div,
  Add,
  Sub,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
  Assign,
}

impl BinOp {
  /// Map an operator token's text to its `BinOp`, if it is a binary operator.
  pub fn from_token(text: &str) -> Option<Self> {
    Some(match text {
      "*" => Self::Mul,
      "/" => Self::Div,
      "+" => Self::Add,
      "-" => Self::Sub,
      "==" => Self::Eq,
      "!=" => Self::Ne,
      "<" => Self::Lt,
      "<=" => Self::Le,
      ">" => Self::Gt,
      ">=" => Self::Ge,
      "=" => Self::Assign,
      _ => return None,
    })
  }

  /// Binding strength used by the precedence climber; higher binds tighter.
  pub fn precedence(self) -> u8 {
    match self {
      Self::Mul | Self::Div => 5,
      Self::Add | Self::Sub => 4,
      Self::Eq | Self::Ne | Self::Lt | Self::Le | Self::Gt | Self::Ge => 3,
      Self::Assign => 1,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Self::Mul => "*",
      Self::Div => "/",
      Self::Add => "+",
      Self::Sub => "-",
      Self::Eq => "==",
      Self::Ne => "!=",
      Self::Lt => "<",
      Self::Le => "<=",
      Self::Gt => ">",
      Self::Ge => ">=",
      Self::Assign => "=",
    }
  }
}

/// Expression tree. Literal payloads keep their source spelling so the
/// emitter can reproduce them verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
  Int(String),
  Float(String),
  Str(String),
  Bool(String),
  Char(String),
  Var(String),
  Binary {
    op: BinOp,
    lhs: Box<Expr>,
    rhs: Box<Expr>,
  },
  Call {
    name: String,
    args: Vec<Expr>,
  },
}

impl Expr {
  pub fn binary(op: BinOp, lhs: Expr, rhs: Expr) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }
}

/// One `name: type` entry in a function's parameter list.
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
  pub name: String,
  pub ty: String,
}

/// Statement-level nodes. Blocks own their statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
  Declaration {
    name: String,
    ty: String,
    init: Option<Expr>,
  },
  Assignment {
    target: String,
    value: Expr,
  },
  If {
    cond: Expr,
    then_block: Box<Stmt>,
    else_block: Option<Box<Stmt>>,
  },
  While {
    cond: Expr,
    body: Box<Stmt>,
  },
  For {
    init: Option<Box<Stmt>>,
    cond: Option<Expr>,
    incr: Option<Box<Stmt>>,
    body: Box<Stmt>,
  },
  Function {
    name: String,
    return_type: String,
    params: Vec<Param>,
    body: Box<Stmt>,
  },
  Print(Expr),
  Input {
    name: String,
  },
  Return(Option<Expr>),
  Block(Vec<Stmt>),
  Call {
    name: String,
    args: Vec<Expr>,
  },
  Expr(Expr),
}

/// Root of a parse: top-level statements in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
  pub body: Vec<Stmt>,
}

fn write_args(f: &mut fmt::Formatter<'_>, args: &[Expr]) -> fmt::Result {
  for (i, arg) in args.iter().enumerate() {
    if i > 0 {
      write!(f, ", ")?;
    }
    write!(f, "{arg}")?;
  }
  Ok(())
}

impl fmt::Display for Expr {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Int(text) | Self::Float(text) | Self::Bool(text) => write!(f, "{text}"),
      Self::Str(text) => write!(f, "\"{text}\""),
      Self::Char(text) => write!(f, "'{text}'"),
      Self::Var(name) => write!(f, "{name}"),
      // Parenthesized so the canonical form reparses to the same shape.
      Self::Binary { op, lhs, rhs } => write!(f, "({lhs} {} {rhs})", op.as_str()),
      Self::Call { name, args } => {
        write!(f, "{name}(")?;
        write_args(f, args)?;
        write!(f, ")")
      }
    }
  }
}

impl fmt::Display for Stmt {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Declaration { name, ty, init } => match init {
        Some(expr) => write!(f, "var {name}: {ty} = {expr};"),
        None => write!(f, "var {name}: {ty};"),
      },
      Self::Assignment { target, value } => write!(f, "{target} = {value};"),
      Self::If {
        cond,
        then_block,
        else_block,
      } => {
        write!(f, "if ({cond}) {then_block}")?;
        if let Some(else_block) = else_block {
          write!(f, " else {else_block}")?;
        }
        Ok(())
      }
      Self::While { cond, body } => write!(f, "while ({cond}) {body}"),
      Self::For {
        init,
        cond,
        incr,
        body,
      } => {
        write!(f, "for (")?;
        match init {
          Some(init) => write!(f, "{init} ")?,
          None => write!(f, "; ")?,
        }
        if let Some(cond) = cond {
          write!(f, "{cond}")?;
        }
        write!(f, "; ")?;
        // The grammar only admits an assignment here, written without its
        // statement terminator.
        if let Some(incr) = incr.as_deref() {
          match incr {
            Self::Assignment { target, value } => write!(f, "{target} = {value}")?,
            other => write!(f, "{other}")?,
          }
        }
        write!(f, ") {body}")
      }
      Self::Function {
        name,
        return_type,
        params,
        body,
      } => {
        write!(f, "func {name}(")?;
        for (i, param) in params.iter().enumerate() {
          if i > 0 {
            write!(f, ", ")?;
          }
          write!(f, "{}: {}", param.name, param.ty)?;
        }
        write!(f, "): {return_type} {body}")
      }
      Self::Print(expr) => write!(f, "print({expr});"),
      Self::Input { name } => write!(f, "input({name});"),
      Self::Return(expr) => match expr {
        Some(expr) => write!(f, "return {expr};"),
        None => write!(f, "return;"),
      },
      Self::Block(stmts) => {
        write!(f, "{{")?;
        for stmt in stmts {
          write!(f, " {stmt}")?;
        }
        write!(f, " }}")
      }
      Self::Call { name, args } => {
        write!(f, "{name}(")?;
        write_args(f, args)?;
        write!(f, ");")
      }
      Self::Expr(expr) => write!(f, "{expr};"),
    }
  }
}

impl fmt::Display for Program {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for (i, stmt) in self.body.iter().enumerate() {
      if i > 0 {
        writeln!(f)?;
      }
      write!(f, "{stmt}")?;
    }
    Ok(())
  }
}
