use super::{Body, Expr, Item};

const INDENT: &str = "  ";

/// Render `body` canonically.
///
/// Runs of consecutive attributes have their `=` aligned, nested bodies are
/// indented by two spaces, lists stay on one line and objects get one entry
/// per line. A blank line separates an attribute run from a following block
/// at the top level. Rendering the same body twice is byte-identical.
pub fn to_string(body: &Body) -> String {
  let mut out = String::new();
  write_body(body, 0, &mut out);
  out
}

fn write_body(body: &Body, depth: usize, out: &mut String) {
  let mut index = 0;
  while index < body.items.len() {
    match &body.items[index] {
      Item::Attribute(_) => {
        let run_end = body.items[index..]
          .iter()
          .position(|item| matches!(item, Item::Block(_)))
          .map_or(body.items.len(), |offset| index + offset);

        let run: Vec<_> = body.items[index..run_end]
          .iter()
          .filter_map(|item| match item {
            Item::Attribute(a) => Some((a.name.as_str(), &a.value)),
            Item::Block(_) => None,
          })
          .collect();
        write_aligned(&run, depth, out);

        if depth == 0 && run_end < body.items.len() {
          out.push('\n');
        }
        index = run_end;
      }
      Item::Block(block) => {
        push_indent(depth, out);
        out.push_str(&block.ident);
        for label in &block.labels {
          out.push(' ');
          write_string(label, out);
        }
        if block.body.items.is_empty() {
          out.push_str(" {}\n");
        } else {
          out.push_str(" {\n");
          write_body(&block.body, depth + 1, out);
          push_indent(depth, out);
          out.push_str("}\n");
        }
        index += 1;
      }
    }
  }
}

fn write_aligned(entries: &[(&str, &Expr)], depth: usize, out: &mut String) {
  let width = entries.iter().map(|(name, _)| key_text(name).len()).max().unwrap_or(0);
  for (name, value) in entries {
    push_indent(depth, out);
    let key = key_text(name);
    out.push_str(&key);
    out.push_str(&" ".repeat(width - key.len()));
    out.push_str(" = ");
    write_expr(value, depth, out);
    out.push('\n');
  }
}

fn write_expr(expr: &Expr, depth: usize, out: &mut String) {
  match expr {
    Expr::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
    Expr::Number(n) => out.push_str(&n.to_string()),
    Expr::String(s) => write_string(s, out),
    Expr::List(items) => {
      out.push('[');
      for (i, item) in items.iter().enumerate() {
        if i > 0 {
          out.push_str(", ");
        }
        write_expr(item, depth, out);
      }
      out.push(']');
    }
    Expr::Object(entries) if entries.is_empty() => out.push_str("{}"),
    Expr::Object(entries) => {
      out.push_str("{\n");
      let entries: Vec<_> = entries.iter().map(|(k, v)| (k.as_str(), v)).collect();
      write_aligned(&entries, depth + 1, out);
      push_indent(depth, out);
      out.push('}');
    }
  }
}

/// Object keys and attribute names that are not bare identifiers get quoted
fn key_text(name: &str) -> String {
  let bare = name
    .chars()
    .next()
    .is_some_and(|c| c.is_alphabetic() || c == '_')
    && name.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
  if bare {
    name.to_string()
  } else {
    let mut quoted = String::new();
    write_string(name, &mut quoted);
    quoted
  }
}

fn write_string(value: &str, out: &mut String) {
  out.push('"');
  for c in value.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\t' => out.push_str("\\t"),
      '\r' => out.push_str("\\r"),
      c => out.push(c),
    }
  }
  out.push('"');
}

fn push_indent(depth: usize, out: &mut String) {
  for _ in 0..depth {
    out.push_str(INDENT);
  }
}
