//! Lexical analysis: turns the raw input string into a pull-based token
//! stream.
//!
//! The lexer is intentionally tiny – it knows nothing about semantics beyond
//! classifying keywords and literals. Multi-character operators are matched
//! before single-character ones to avoid ambiguity. The parser consumes
//! tokens one at a time through the `TokenSource` trait, so any other
//! producer (a replay buffer in tests, for instance) can stand in for the
//! real lexer.

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Keyword,
  Identifier,
  IntegerLiteral,
  FloatLiteral,
  StringLiteral,
  BooleanLiteral,
  CharLiteral,
  Operator,
  Symbol,
  EndOfInput,
  Invalid,
}

/// One lexeme with its classification. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub text: String,
}

impl Token {
  pub fn new(kind: TokenKind, text: impl Into<String>) -> Self {
    Self {
      kind,
      text: text.into(),
    }
  }

  pub fn end_of_input() -> Self {
    Self::new(TokenKind::EndOfInput, "")
  }
}

/// Anything that can hand the parser one token at a time. Implementations
/// must eventually yield `EndOfInput` and keep yielding it afterwards.
pub trait TokenSource {
  fn next_token(&mut self) -> Token;
}

const KEYWORDS: &[&str] = &[
  "var", "if", "else", "while", "for", "func", "print", "input", "return",
];

/// Type names lex as keywords; the parser accepts either classification in
/// a type position.
const TYPE_WORDS: &[&str] = &["int", "float", "bool", "char", "string"];

const OPERATORS: &[&str] = &[
  "==", "!=", "<=", ">=", "<", ">", "+", "-", "*", "/", "=",
];

/// Hand-written lexer over a source string.
pub struct Lexer<'a> {
  source: &'a str,
  pos: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Self {
    Self { source, pos: 0 }
  }

  fn bytes(&self) -> &'a [u8] {
    self.source.as_bytes()
  }

  /// Skip whitespace and `//` line comments.
  fn skip_trivia(&mut self) {
    let bytes = self.bytes();
    loop {
      while self.pos < bytes.len() && bytes[self.pos].is_ascii_whitespace() {
        self.pos += 1;
      }
      if self.pos + 1 < bytes.len() && bytes[self.pos] == b'/' && bytes[self.pos + 1] == b'/' {
        while self.pos < bytes.len() && bytes[self.pos] != b'\n' {
          self.pos += 1;
        }
        continue;
      }
      break;
    }
  }

  fn read_word(&mut self) -> Token {
    let start = self.pos;
    let bytes = self.bytes();
    while self.pos < bytes.len() && (bytes[self.pos].is_ascii_alphanumeric() || bytes[self.pos] == b'_')
    {
      self.pos += 1;
    }
    let text = &self.source[start..self.pos];
    if text == "true" || text == "false" {
      Token::new(TokenKind::BooleanLiteral, text)
    } else if KEYWORDS.contains(&text) || TYPE_WORDS.contains(&text) {
      Token::new(TokenKind::Keyword, text)
    } else {
      Token::new(TokenKind::Identifier, text)
    }
  }

  fn read_number(&mut self) -> Token {
    let start = self.pos;
    let bytes = self.bytes();
    while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
      self.pos += 1;
    }
    let mut kind = TokenKind::IntegerLiteral;
    if self.pos + 1 < bytes.len()
      && bytes[self.pos] == b'.'
      && bytes[self.pos + 1].is_ascii_digit()
    {
      kind = TokenKind::FloatLiteral;
      self.pos += 1;
      while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
        self.pos += 1;
      }
    }
    Token::new(kind, &self.source[start..self.pos])
  }

  /// Read a `"..."` literal. The stored text excludes the quotes; an
  /// unterminated literal becomes an `Invalid` token.
  fn read_string(&mut self) -> Token {
    self.pos += 1;
    let start = self.pos;
    let bytes = self.bytes();
    while self.pos < bytes.len() && bytes[self.pos] != b'"' {
      self.pos += 1;
    }
    if self.pos >= bytes.len() {
      return Token::new(TokenKind::Invalid, &self.source[start - 1..]);
    }
    let text = &self.source[start..self.pos];
    self.pos += 1;
    Token::new(TokenKind::StringLiteral, text)
  }

  /// Read a `'c'` literal, stored without the quotes.
  fn read_char(&mut self) -> Token {
    let start = self.pos;
    self.pos += 1;
    let bytes = self.bytes();
    let mut inner = self.pos;
    while inner < bytes.len() && bytes[inner] != b'\'' {
      inner += 1;
    }
    if inner >= bytes.len() || inner == self.pos {
      self.pos = inner.min(bytes.len());
      return Token::new(TokenKind::Invalid, &self.source[start..self.pos]);
    }
    let text = &self.source[self.pos..inner];
    self.pos = inner + 1;
    Token::new(TokenKind::CharLiteral, text)
  }

  fn read_operator_or_symbol(&mut self) -> Token {
    if let Some(op) = OPERATORS
      .iter()
      .find(|op| self.source[self.pos..].starts_with(**op))
    {
      self.pos += op.len();
      return Token::new(TokenKind::Operator, *op);
    }

    let rest = &self.source[self.pos..];
    let c = rest.chars().next().unwrap_or('\0');
    let text = &rest[..c.len_utf8()];
    self.pos += c.len_utf8();
    match c {
      '(' | ')' | '{' | '}' | ';' | ':' | ',' => Token::new(TokenKind::Symbol, text),
      _ => Token::new(TokenKind::Invalid, text),
    }
  }
}

impl TokenSource for Lexer<'_> {
  fn next_token(&mut self) -> Token {
    self.skip_trivia();
    if self.pos >= self.source.len() {
      return Token::end_of_input();
    }

    let c = self.bytes()[self.pos];
    if c.is_ascii_alphabetic() || c == b'_' {
      return self.read_word();
    }
    if c.is_ascii_digit() {
      return self.read_number();
    }
    if c == b'"' {
      return self.read_string();
    }
    if c == b'\'' {
      return self.read_char();
    }
    self.read_operator_or_symbol()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn drain(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
      let token = lexer.next_token();
      let done = token.kind == TokenKind::EndOfInput;
      tokens.push(token);
      if done {
        break;
      }
    }
    tokens
  }

  #[test]
  fn classifies_keywords_and_identifiers() {
    let tokens = drain("var count int else");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
      kinds,
      vec![
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Keyword,
        TokenKind::Keyword,
        TokenKind::EndOfInput,
      ]
    );
  }

  #[test]
  fn lexes_literals() {
    let tokens = drain("42 3.25 \"hi\" 'c' true");
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
      kinds,
      vec![
        TokenKind::IntegerLiteral,
        TokenKind::FloatLiteral,
        TokenKind::StringLiteral,
        TokenKind::CharLiteral,
        TokenKind::BooleanLiteral,
        TokenKind::EndOfInput,
      ]
    );
    assert_eq!(tokens[2].text, "hi");
    assert_eq!(tokens[3].text, "c");
  }

  #[test]
  fn matches_long_operators_first() {
    let tokens = drain("<= < == =");
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["<=", "<", "==", "=", ""]);
    assert!(tokens[..4].iter().all(|t| t.kind == TokenKind::Operator));
  }

  #[test]
  fn skips_line_comments() {
    let tokens = drain("x // the rest is ignored\ny");
    let texts: Vec<&str> = tokens.iter().map(|t| t.text.as_str()).collect();
    assert_eq!(texts, vec!["x", "y", ""]);
  }

  #[test]
  fn end_of_input_is_idempotent() {
    let mut lexer = Lexer::new("x");
    assert_eq!(lexer.next_token().kind, TokenKind::Identifier);
    assert_eq!(lexer.next_token().kind, TokenKind::EndOfInput);
    assert_eq!(lexer.next_token().kind, TokenKind::EndOfInput);
  }

  #[test]
  fn unknown_byte_is_invalid() {
    let tokens = drain("@");
    assert_eq!(tokens[0].kind, TokenKind::Invalid);
  }
}
