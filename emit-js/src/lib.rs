//! Deterministic printer for the parse-js AST.
//!
//! Formatting is fixed: two-space indentation, a semicolon after every
//! statement, double-quoted strings, `void 0` for the undefined literal,
//! empty blocks as `{` and `}` on two lines, and one property per line for
//! any non-empty object literal. Output is a pure function of the tree;
//! two prints of the same tree are byte-identical.

mod expr;
mod stmt;

use parse_js::ast::node::Node;
use parse_js::ast::stmt::Stmt;

pub struct Printer {
  out: String,
  indent: usize,
}

impl Printer {
  pub fn new(indent: usize) -> Printer {
    Printer {
      out: String::new(),
      indent,
    }
  }

  pub fn into_string(self) -> String {
    self.out
  }

  pub(crate) fn push(&mut self, text: &str) {
    self.out.push_str(text);
  }

  pub(crate) fn push_char(&mut self, c: char) {
    self.out.push(c);
  }

  pub(crate) fn newline(&mut self) {
    self.out.push('\n');
  }

  pub(crate) fn start_line(&mut self) {
    for _ in 0..self.indent {
      self.out.push_str("  ");
    }
  }

  pub(crate) fn indented(&mut self, f: impl FnOnce(&mut Self)) {
    self.indent += 1;
    f(self);
    self.indent -= 1;
  }
}

/// Prints a statement list with each line at the given indent level. Every
/// statement line ends with a newline.
pub fn print_stmts(stmts: &[Node<Stmt>], indent: usize) -> String {
  let mut printer = Printer::new(indent);
  for stmt in stmts {
    printer.print_stmt(stmt);
  }
  printer.into_string()
}

#[cfg(test)]
mod tests {
  use super::*;
  use parse_js::parse;
  use parse_js::ParseOptions;

  fn reprint(source: &str) -> String {
    let top = parse(source, &ParseOptions::default()).unwrap();
    print_stmts(&top.stx.body, 0)
  }

  #[test]
  fn prints_function_with_body() {
    assert_eq!(
      reprint("export function fn() { return 123 }").replace("export ", ""),
      "function fn() {\n  return 123;\n}\n"
    );
  }

  #[test]
  fn prints_empty_blocks_on_two_lines() {
    assert_eq!(reprint("function Fn() {}"), "function Fn() {\n}\n");
    assert_eq!(reprint("class Class {}"), "class Class {\n}\n");
  }

  #[test]
  fn prints_undefined_as_void_zero() {
    assert_eq!(reprint("const abc = undefined"), "const abc = void 0;\n");
    assert_eq!(reprint("const xyz = null"), "const xyz = null;\n");
  }

  #[test]
  fn prints_strings_double_quoted() {
    assert_eq!(reprint("x = 'a\"b'"), "x = \"a\\\"b\";\n");
  }

  #[test]
  fn prints_nonempty_objects_one_property_per_line() {
    assert_eq!(reprint("x = {}"), "x = {};\n");
    assert_eq!(
      reprint("x = {a: 1, b: () => c}"),
      "x = {\n  a: 1,\n  b: () => c\n};\n"
    );
  }

  #[test]
  fn prints_anonymous_function_expression_statement() {
    assert_eq!(
      reprint("module.exports = function() { return 123 }"),
      "module.exports = function() {\n  return 123;\n};\n"
    );
  }

  #[test]
  fn reparenthesises_by_precedence() {
    assert_eq!(reprint("x = (a + b) * c"), "x = (a + b) * c;\n");
    assert_eq!(reprint("x = a + b * c"), "x = a + b * c;\n");
    assert_eq!(reprint("x = (a, b)"), "x = (a, b);\n");
  }

  #[test]
  fn keeps_if_else_chains_flat() {
    assert_eq!(
      reprint("if (a) b(); else if (c) d(); else e()"),
      "if (a) {\n  b();\n} else if (c) {\n  d();\n} else {\n  e();\n}\n"
    );
  }

  #[test]
  fn leading_object_and_function_expressions_get_parens() {
    assert_eq!(
      reprint("(function() {})()"),
      "(function() {\n}());\n"
    );
  }

  #[test]
  fn output_is_deterministic() {
    let source = "const a = {x: 1, y: [2, , 3]};\nfunction f(p = 4) { return p ** 2 }\n";
    assert_eq!(reprint(source), reprint(source));
  }
}
