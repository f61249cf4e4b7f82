use ast::node::Node;
use ast::stx::TopLevel;
use error::SyntaxResult;
use lex::Lexer;
use parse::Parser;

pub mod ast;
pub mod error;
pub mod lex;
pub mod loc;
pub mod parse;
pub mod symbol;
pub mod token;

/// JSX configuration, as supplied by the caller: whether to recognise JSX at
/// all, and the qualified names spliced into lowered element calls.
#[derive(Clone, Debug)]
pub struct JsxOptions {
  pub parse: bool,
  pub factory: Vec<String>,
  pub fragment: Vec<String>,
}

impl Default for JsxOptions {
  fn default() -> Self {
    JsxOptions {
      parse: false,
      factory: vec!["React".to_string(), "createElement".to_string()],
      fragment: vec!["React".to_string(), "Fragment".to_string()],
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
  /// Enables bundle-oriented handling downstream (`require`/`module`/
  /// `exports` recognition). The grammar accepted is unaffected.
  pub is_bundling: bool,
  pub jsx: JsxOptions,
}

pub fn parse(source: &str, options: &ParseOptions) -> SyntaxResult<Node<TopLevel>> {
  let lexer = Lexer::new(source);
  let mut parser = Parser::new(lexer, options.jsx.clone());
  parser.parse_top_level()
}
