use super::lexer::{Token, TokenKind, tokenize};
use super::{Attribute, Block, Body, Expr, Item, Pos};
use crate::core::error::Diagnostic;

/// Parse `src` into a [`Body`].
///
/// On failure every lexical and syntax diagnostic found is returned, in
/// source order, not just the first.
pub fn parse(src: &str) -> Result<Body, Vec<Diagnostic>> {
  let (tokens, mut diagnostics) = tokenize(src);
  let mut parser = Parser {
    tokens,
    index: 0,
    diagnostics: Vec::new(),
  };
  let body = parser.body(false);

  diagnostics.append(&mut parser.diagnostics);
  if diagnostics.is_empty() {
    Ok(body)
  } else {
    diagnostics.sort_by_key(|d| (d.line, d.column));
    Err(diagnostics)
  }
}

struct Parser {
  tokens: Vec<Token>,
  index: usize,
  diagnostics: Vec<Diagnostic>,
}

impl Parser {
  fn peek(&self) -> &Token {
    // tokenize always ends with Eof, and the index never moves past it
    &self.tokens[self.index.min(self.tokens.len() - 1)]
  }

  fn advance(&mut self) -> Token {
    let token = self.peek().clone();
    if token.kind != TokenKind::Eof {
      self.index += 1;
    }
    token
  }

  fn error(&mut self, pos: Pos, message: impl Into<String>) {
    self.diagnostics.push(Diagnostic {
      line: pos.line,
      column: pos.column,
      message: message.into(),
    });
  }

  fn skip_newlines(&mut self) {
    while self.peek().kind == TokenKind::Newline {
      self.advance();
    }
  }

  /// Skip to the end of the current line, stepping over balanced brackets.
  /// Stops before an unbalanced `}` so the enclosing block can close.
  fn recover(&mut self) {
    let mut depth = 0usize;
    loop {
      match self.peek().kind.clone() {
        TokenKind::Eof => return,
        TokenKind::Newline if depth == 0 => return,
        TokenKind::RBrace | TokenKind::RBracket if depth == 0 => return,
        TokenKind::LBrace | TokenKind::LBracket => depth += 1,
        TokenKind::RBrace | TokenKind::RBracket => depth -= 1,
        _ => {}
      }
      self.advance();
    }
  }

  /// Skip past the `close` token matching an already consumed `open`.
  fn recover_until_close(&mut self, open: TokenKind, close: TokenKind) {
    let mut depth = 0usize;
    loop {
      let kind = self.peek().kind.clone();
      if kind == TokenKind::Eof {
        return;
      }
      if kind == close {
        if depth == 0 {
          self.advance();
          return;
        }
        depth -= 1;
      } else if kind == open {
        depth += 1;
      }
      self.advance();
    }
  }

  /// Parse items until end of file, or until the closing `}` when `nested`.
  fn body(&mut self, nested: bool) -> Body {
    let mut body = Body::default();
    loop {
      self.skip_newlines();
      let token = self.peek().clone();
      match token.kind {
        TokenKind::Eof => {
          if nested {
            self.error(token.pos, "unclosed block, expected '}'");
          }
          return body;
        }
        TokenKind::RBrace => {
          self.advance();
          if nested {
            return body;
          }
          self.error(token.pos, "unexpected '}'");
        }
        TokenKind::Ident(name) => {
          self.advance();
          if let Some(item) = self.item(name, token.pos) {
            body.items.push(item);
          }
        }
        other => {
          self.error(
            token.pos,
            format!("expected attribute or block name, found {}", other.describe()),
          );
          self.advance();
          self.recover();
        }
      }
    }
  }

  fn item(&mut self, name: String, pos: Pos) -> Option<Item> {
    let next = self.peek().clone();
    match next.kind {
      TokenKind::Equals => {
        self.advance();
        let value = self.expr();
        self.end_of_item();
        value.map(|value| Item::Attribute(Attribute { name, value, pos }))
      }
      TokenKind::Str(_) | TokenKind::LBrace => {
        let mut labels = Vec::new();
        while let TokenKind::Str(label) = &self.peek().kind {
          labels.push(label.clone());
          self.advance();
        }
        let open = self.peek().clone();
        if open.kind != TokenKind::LBrace {
          self.error(
            open.pos,
            format!("expected '{{' to open block '{}', found {}", name, open.kind.describe()),
          );
          self.recover();
          return None;
        }
        self.advance();
        let body = self.body(true);
        self.end_of_item();
        Some(Item::Block(Block {
          ident: name,
          labels,
          body,
          pos,
        }))
      }
      other => {
        self.error(
          next.pos,
          format!("expected '=' or block after '{}', found {}", name, other.describe()),
        );
        self.recover();
        None
      }
    }
  }

  /// An item must be followed by a newline, end of file, or the closing `}`.
  fn end_of_item(&mut self) {
    let token = self.peek().clone();
    match token.kind {
      TokenKind::Newline | TokenKind::Eof | TokenKind::RBrace => {}
      other => {
        self.error(token.pos, format!("expected end of line, found {}", other.describe()));
        self.recover();
      }
    }
  }

  fn expr(&mut self) -> Option<Expr> {
    let token = self.advance();
    match token.kind {
      TokenKind::Str(s) => Some(Expr::String(s)),
      TokenKind::Number(n) => Some(Expr::Number(n)),
      TokenKind::Ident(ref word) if word == "true" => Some(Expr::Bool(true)),
      TokenKind::Ident(ref word) if word == "false" => Some(Expr::Bool(false)),
      TokenKind::LBracket => self.list(token.pos),
      TokenKind::LBrace => self.object(token.pos),
      TokenKind::Ident(word) => {
        self.error(
          token.pos,
          format!("variables and functions are not supported, found '{}'", word),
        );
        self.recover();
        None
      }
      other => {
        self.error(token.pos, format!("expected a value, found {}", other.describe()));
        if other != TokenKind::Newline {
          self.recover();
        } else {
          self.index -= 1;
        }
        None
      }
    }
  }

  fn list(&mut self, open: Pos) -> Option<Expr> {
    let mut items = Vec::new();
    loop {
      self.skip_newlines();
      match self.peek().kind.clone() {
        TokenKind::RBracket => {
          self.advance();
          return Some(Expr::List(items));
        }
        TokenKind::Eof => {
          self.error(open, "unclosed list, expected ']'");
          return None;
        }
        _ => {}
      }

      let Some(item) = self.expr() else {
        self.recover_until_close(TokenKind::LBracket, TokenKind::RBracket);
        return None;
      };
      items.push(item);
      self.skip_newlines();

      let sep = self.peek().clone();
      match sep.kind {
        TokenKind::Comma => {
          self.advance();
        }
        TokenKind::RBracket => {}
        other => {
          self.error(sep.pos, format!("expected ',' or ']' in list, found {}", other.describe()));
          self.recover_until_close(TokenKind::LBracket, TokenKind::RBracket);
          return None;
        }
      }
    }
  }

  fn object(&mut self, open: Pos) -> Option<Expr> {
    let mut entries = Vec::new();
    loop {
      self.skip_newlines();
      let token = self.advance();
      let key = match token.kind {
        TokenKind::RBrace => return Some(Expr::Object(entries)),
        TokenKind::Ident(key) | TokenKind::Str(key) => key,
        TokenKind::Eof => {
          self.error(open, "unclosed object, expected '}'");
          return None;
        }
        other => {
          self.error(token.pos, format!("expected object key, found {}", other.describe()));
          self.recover_until_close(TokenKind::LBrace, TokenKind::RBrace);
          return None;
        }
      };

      let eq = self.peek().clone();
      if eq.kind != TokenKind::Equals {
        self.error(eq.pos, format!("expected '=' after object key '{}'", key));
        self.recover_until_close(TokenKind::LBrace, TokenKind::RBrace);
        return None;
      }
      self.advance();
      let Some(value) = self.expr() else {
        self.recover_until_close(TokenKind::LBrace, TokenKind::RBrace);
        return None;
      };
      entries.push((key, value));

      if self.peek().kind == TokenKind::Comma {
        self.advance();
      }
    }
  }
}
