//! The declarative block format shared by the versions manifest and the
//! generated enos configuration
//!
//! Only the subset those files use is supported: attributes, labelled blocks,
//! and string / integer / bool / list / object literals. Comments (`#`, `//`,
//! `/* */`) are accepted and dropped. Expressions, functions, heredocs and
//! interpolation are not.
//!
//! - **lexer**: `logos` token rules, byte spans mapped to line/column
//! - **parser**: tokens to a [`Body`], collecting every diagnostic
//! - **writer**: canonical rendering (two-space indent, aligned `=`)

mod lexer;
mod parser;
mod writer;

pub use parser::parse;
pub use writer::to_string;

/// Line/column of an item in its source, 1-based; 0 for built items
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pos {
  pub line: usize,
  pub column: usize,
}

/// A sequence of attributes and blocks
#[derive(Debug, Clone, Default)]
pub struct Body {
  pub items: Vec<Item>,
}

#[derive(Debug, Clone)]
pub enum Item {
  Attribute(Attribute),
  Block(Block),
}

/// `name = value`
#[derive(Debug, Clone)]
pub struct Attribute {
  pub name: String,
  pub value: Expr,
  pub pos: Pos,
}

/// `ident "label" ... { body }`
#[derive(Debug, Clone)]
pub struct Block {
  pub ident: String,
  pub labels: Vec<String>,
  pub body: Body,
  pub pos: Pos,
}

/// Literal values
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
  Bool(bool),
  Number(i64),
  String(String),
  List(Vec<Expr>),
  Object(Vec<(String, Expr)>),
}

impl Expr {
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Expr::Bool(b) => Some(*b),
      _ => None,
    }
  }

  pub fn as_i64(&self) -> Option<i64> {
    match self {
      Expr::Number(n) => Some(*n),
      _ => None,
    }
  }

  pub fn as_str(&self) -> Option<&str> {
    match self {
      Expr::String(s) => Some(s),
      _ => None,
    }
  }

  /// A list of string literals
  pub fn string_list<I, S>(items: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Expr::List(items.into_iter().map(|s| Expr::String(s.into())).collect())
  }

  /// Short name of the value's type, for diagnostics
  pub fn type_name(&self) -> &'static str {
    match self {
      Expr::Bool(_) => "bool",
      Expr::Number(_) => "number",
      Expr::String(_) => "string",
      Expr::List(_) => "list",
      Expr::Object(_) => "object",
    }
  }
}

impl Body {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn attribute(mut self, name: impl Into<String>, value: Expr) -> Self {
    self.items.push(Item::Attribute(Attribute {
      name: name.into(),
      value,
      pos: Pos::default(),
    }));
    self
  }

  pub fn block(mut self, block: Block) -> Self {
    self.items.push(Item::Block(block));
    self
  }

  pub fn attributes(&self) -> impl Iterator<Item = &Attribute> {
    self.items.iter().filter_map(|item| match item {
      Item::Attribute(a) => Some(a),
      Item::Block(_) => None,
    })
  }

  pub fn blocks(&self) -> impl Iterator<Item = &Block> {
    self.items.iter().filter_map(|item| match item {
      Item::Block(b) => Some(b),
      Item::Attribute(_) => None,
    })
  }
}

impl Block {
  pub fn new(ident: impl Into<String>, labels: Vec<String>, body: Body) -> Self {
    Self {
      ident: ident.into(),
      labels,
      body,
      pos: Pos::default(),
    }
  }
}
