use super::Pos;
use crate::core::error::Diagnostic;
use logos::Logos;

/// Why a stretch of input did not lex
#[derive(Debug, Clone, PartialEq, Default)]
pub(super) enum LexError {
  #[default]
  Unexpected,
  Escape(char),
  Number(String),
}

/// Raw tokens as matched by logos, before positions are attached
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(error = LexError)]
#[logos(skip r"[ \t\r]+")]
#[logos(skip r"#[^\n]*")]
#[logos(skip r"//[^\n]*")]
#[logos(skip r"/\*([^*]|\*+[^*/])*\*+/")]
enum RawToken {
  #[token("\n")]
  Newline,
  #[token("{")]
  LBrace,
  #[token("}")]
  RBrace,
  #[token("[")]
  LBracket,
  #[token("]")]
  RBracket,
  #[token("=")]
  Equals,
  #[token(",")]
  Comma,

  #[regex(r"[A-Za-z_][A-Za-z0-9_-]*", |lex| lex.slice().to_string())]
  Ident(String),

  #[regex(r#""([^"\\\n]|\\.)*""#, |lex| {
    let s = lex.slice();
    unescape(&s[1..s.len() - 1])
  })]
  Str(String),

  // Same as Str without the closing quote; the longer Str match wins when
  // the literal is terminated.
  #[regex(r#""([^"\\\n]|\\.)*"#)]
  UnterminatedStr,

  // Accepts trailing alphanumerics so `1.5` or `1e3` fails as one token.
  #[regex(r"-?[0-9][0-9A-Za-z.]*", |lex| {
    lex.slice().parse::<i64>().map_err(|_| LexError::Number(lex.slice().to_string()))
  })]
  Number(i64),
}

fn unescape(s: &str) -> Result<String, LexError> {
  let mut out = String::with_capacity(s.len());
  let mut chars = s.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    match chars.next() {
      Some('n') => out.push('\n'),
      Some('t') => out.push('\t'),
      Some('r') => out.push('\r'),
      Some('"') => out.push('"'),
      Some('\\') => out.push('\\'),
      Some(other) => return Err(LexError::Escape(other)),
      None => return Err(LexError::Escape('\\')),
    }
  }
  Ok(out)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum TokenKind {
  Ident(String),
  Str(String),
  Number(i64),
  LBrace,
  RBrace,
  LBracket,
  RBracket,
  Equals,
  Comma,
  Newline,
  Eof,
}

impl TokenKind {
  pub(super) fn describe(&self) -> String {
    match self {
      TokenKind::Ident(s) => format!("identifier '{}'", s),
      TokenKind::Str(s) => format!("string \"{}\"", s),
      TokenKind::Number(n) => format!("number {}", n),
      TokenKind::LBrace => "'{'".to_string(),
      TokenKind::RBrace => "'}'".to_string(),
      TokenKind::LBracket => "'['".to_string(),
      TokenKind::RBracket => "']'".to_string(),
      TokenKind::Equals => "'='".to_string(),
      TokenKind::Comma => "','".to_string(),
      TokenKind::Newline => "end of line".to_string(),
      TokenKind::Eof => "end of file".to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub(super) struct Token {
  pub kind: TokenKind,
  pub pos: Pos,
}

/// Maps byte offsets to 1-based line/column positions
struct LineIndex<'a> {
  src: &'a str,
  starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
  fn new(src: &'a str) -> Self {
    let starts = std::iter::once(0)
      .chain(src.match_indices('\n').map(|(i, _)| i + 1))
      .collect();
    Self { src, starts }
  }

  fn pos(&self, offset: usize) -> Pos {
    let line = self.starts.partition_point(|&start| start <= offset);
    let start = self.starts[line - 1];
    Pos {
      line,
      column: self.src[start..offset].chars().count() + 1,
    }
  }
}

/// Split `src` into tokens. Lexical errors are reported and skipped so the
/// parser can keep going and report its own errors too.
pub(super) fn tokenize(src: &str) -> (Vec<Token>, Vec<Diagnostic>) {
  let index = LineIndex::new(src);
  let mut tokens = Vec::new();
  let mut diagnostics = Vec::new();
  let mut error = |pos: Pos, message: String| {
    diagnostics.push(Diagnostic {
      line: pos.line,
      column: pos.column,
      message,
    })
  };

  let mut lexer = RawToken::lexer(src);
  while let Some(result) = lexer.next() {
    let pos = index.pos(lexer.span().start);
    let kind = match result {
      Ok(RawToken::Newline) => TokenKind::Newline,
      Ok(RawToken::LBrace) => TokenKind::LBrace,
      Ok(RawToken::RBrace) => TokenKind::RBrace,
      Ok(RawToken::LBracket) => TokenKind::LBracket,
      Ok(RawToken::RBracket) => TokenKind::RBracket,
      Ok(RawToken::Equals) => TokenKind::Equals,
      Ok(RawToken::Comma) => TokenKind::Comma,
      Ok(RawToken::Ident(name)) => TokenKind::Ident(name),
      Ok(RawToken::Str(value)) => TokenKind::Str(value),
      Ok(RawToken::Number(n)) => TokenKind::Number(n),
      Ok(RawToken::UnterminatedStr) => {
        error(pos, "unterminated string literal".to_string());
        continue;
      }
      Err(LexError::Escape(c)) => {
        error(pos, format!("unsupported escape sequence '\\{}'", c));
        continue;
      }
      Err(LexError::Number(text)) => {
        error(pos, format!("invalid number '{}' (only integers are supported)", text));
        continue;
      }
      Err(LexError::Unexpected) => {
        let slice = lexer.slice();
        if slice.starts_with("/*") || (slice == "/" && lexer.remainder().starts_with('*')) {
          error(pos, "unterminated block comment".to_string());
          break;
        }
        match slice.chars().next() {
          Some(c) => error(pos, format!("unexpected character '{}'", c)),
          None => error(pos, "unexpected input".to_string()),
        }
        continue;
      }
    };
    tokens.push(Token { kind, pos });
  }

  tokens.push(Token {
    kind: TokenKind::Eof,
    pos: index.pos(src.len()),
  });
  (tokens, diagnostics)
}
