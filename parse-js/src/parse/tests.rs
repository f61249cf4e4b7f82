use crate::ast::expr::ArrowFuncBody;
use crate::ast::expr::BinaryOp;
use crate::ast::expr::Expr;
use crate::ast::stmt::Stmt;
use crate::ast::stx::TopLevel;
use crate::ast::node::Node;
use crate::parse;
use crate::JsxOptions;
use crate::ParseOptions;
use proptest::prelude::*;

fn parse_module(source: &str) -> Node<TopLevel> {
  parse(source, &ParseOptions::default()).unwrap()
}

fn parse_jsx(source: &str) -> Node<TopLevel> {
  let options = ParseOptions {
    is_bundling: true,
    jsx: JsxOptions {
      parse: true,
      factory: vec!["elem".to_string()],
      fragment: vec!["frag".to_string()],
    },
  };
  parse(source, &options).unwrap()
}

fn only_expr(top: &Node<TopLevel>) -> &Node<Expr> {
  assert_eq!(top.stx.body.len(), 1);
  let Stmt::Expr(stmt) = top.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement, got {:?}", top.stx.body[0]);
  };
  &stmt.stx.expr
}

#[test]
fn parses_statements_without_semicolons() {
  let top = parse_module("const fn = require('./foo')\nconsole.log(fn())\n");
  assert_eq!(top.stx.body.len(), 2);
  assert!(matches!(top.stx.body[0].stx.as_ref(), Stmt::Var(_)));
  assert!(matches!(top.stx.body[1].stx.as_ref(), Stmt::Expr(_)));
}

#[test]
fn parses_import_forms() {
  let top = parse_module(
    "import './side-effect'\nimport def from './a'\nimport def2, {x as y} from './b'\nimport * as ns from './c'\n",
  );
  for stmt in &top.stx.body {
    assert!(matches!(stmt.stx.as_ref(), Stmt::Import(_)));
  }
}

#[test]
fn parses_export_forms() {
  let top = parse_module(
    "export default 123\nexport var v = 234\nexport {Class as C}\nexport function Fn() {}\nexport class Class {}\nexport * from './a'\nexport * as b from './b'\n",
  );
  assert_eq!(top.stx.body.len(), 7);
  assert!(matches!(top.stx.body[0].stx.as_ref(), Stmt::ExportDefault(_)));
  assert!(matches!(top.stx.body[5].stx.as_ref(), Stmt::ExportAll(_)));
}

#[test]
fn export_default_function_keeps_binding() {
  let top = parse_module("export default function fn() {}");
  let Stmt::Func(decl) = top.stx.body[0].stx.as_ref() else {
    panic!("expected function declaration");
  };
  assert!(decl.stx.export_default);
  assert_eq!(decl.stx.name.as_ref().unwrap().stx.name, "fn");
}

#[test]
fn binary_precedence_groups_multiplication_first() {
  let top = parse_module("x = a + b * c;");
  let Expr::Assign(assign) = only_expr(&top).stx.as_ref() else {
    panic!("expected assignment");
  };
  let Expr::Binary(add) = assign.stx.value.stx.as_ref() else {
    panic!("expected binary add");
  };
  assert_eq!(add.stx.op, BinaryOp::Add);
  let Expr::Binary(mul) = add.stx.right.stx.as_ref() else {
    panic!("expected binary mul on the right");
  };
  assert_eq!(mul.stx.op, BinaryOp::Mul);
}

#[test]
fn arrow_functions_and_parenthesised_expressions_disambiguate() {
  let top = parse_module("const f = (a, b) => a + b, g = (a);");
  let Stmt::Var(decl) = top.stx.body[0].stx.as_ref() else {
    panic!("expected declaration");
  };
  assert_eq!(decl.stx.declarators.len(), 2);
  let first = decl.stx.declarators[0].stx.initializer.as_ref().unwrap();
  assert!(matches!(first.stx.as_ref(), Expr::Arrow(_)));
  let second = decl.stx.declarators[1].stx.initializer.as_ref().unwrap();
  assert!(matches!(second.stx.as_ref(), Expr::Id(_)));
}

#[test]
fn arrow_body_can_be_expression() {
  let top = parse_module("const thunk = () => fn;");
  let Stmt::Var(decl) = top.stx.body[0].stx.as_ref() else {
    panic!("expected declaration");
  };
  let init = decl.stx.declarators[0].stx.initializer.as_ref().unwrap();
  let Expr::Arrow(arrow) = init.stx.as_ref() else {
    panic!("expected arrow");
  };
  assert!(arrow.stx.params.is_empty());
  assert!(matches!(arrow.stx.body, ArrowFuncBody::Expr(_)));
}

#[test]
fn undefined_is_a_literal() {
  let top = parse_module("x = undefined;");
  let Expr::Assign(assign) = only_expr(&top).stx.as_ref() else {
    panic!("expected assignment");
  };
  assert!(matches!(assign.stx.value.stx.as_ref(), Expr::LitUndefined(_)));
}

#[test]
fn template_literals_carry_substitutions() {
  let top = parse_module("x = `a${b}c`;");
  let Expr::Assign(assign) = only_expr(&top).stx.as_ref() else {
    panic!("expected assignment");
  };
  let Expr::LitTemplate(template) = assign.stx.value.stx.as_ref() else {
    panic!("expected template");
  };
  assert_eq!(template.stx.parts.len(), 3);
}

#[test]
fn jsx_self_closing_lowers_to_factory_call() {
  let top = parse_jsx("console.log(<div/>)");
  let Expr::Call(log) = only_expr(&top).stx.as_ref() else {
    panic!("expected call");
  };
  let Expr::Call(lowered) = log.stx.args[0].stx.value.stx.as_ref() else {
    panic!("expected lowered factory call");
  };
  let Expr::Id(factory) = lowered.stx.callee.stx.as_ref() else {
    panic!("expected factory reference");
  };
  assert_eq!(factory.stx.name, "elem");
  assert_eq!(lowered.stx.args.len(), 2);
  let Expr::LitString(tag) = lowered.stx.args[0].stx.value.stx.as_ref() else {
    panic!("expected string tag");
  };
  assert_eq!(tag.stx.value, "div");
  assert!(matches!(lowered.stx.args[1].stx.value.stx.as_ref(), Expr::LitNull(_)));
}

#[test]
fn jsx_fragment_passes_fragment_name_and_children() {
  let top = parse_jsx("console.log(<>fragment</>)");
  let Expr::Call(log) = only_expr(&top).stx.as_ref() else {
    panic!("expected call");
  };
  let Expr::Call(lowered) = log.stx.args[0].stx.value.stx.as_ref() else {
    panic!("expected lowered factory call");
  };
  assert_eq!(lowered.stx.args.len(), 3);
  let Expr::Id(tag) = lowered.stx.args[0].stx.value.stx.as_ref() else {
    panic!("expected fragment reference");
  };
  assert_eq!(tag.stx.name, "frag");
  let Expr::LitString(text) = lowered.stx.args[2].stx.value.stx.as_ref() else {
    panic!("expected text child");
  };
  assert_eq!(text.stx.value, "fragment");
}

#[test]
fn jsx_uppercase_tags_are_references() {
  let top = parse_jsx("x = <Widget a=\"1\" b={c}/>;");
  let Expr::Assign(assign) = only_expr(&top).stx.as_ref() else {
    panic!("expected assignment");
  };
  let Expr::Call(lowered) = assign.stx.value.stx.as_ref() else {
    panic!("expected lowered call");
  };
  assert!(matches!(lowered.stx.args[0].stx.value.stx.as_ref(), Expr::Id(_)));
  assert!(matches!(lowered.stx.args[1].stx.value.stx.as_ref(), Expr::LitObject(_)));
}

#[test]
fn rejects_mismatched_jsx_closing_tag() {
  let options = ParseOptions {
    is_bundling: true,
    jsx: JsxOptions {
      parse: true,
      factory: vec!["elem".to_string()],
      fragment: vec!["frag".to_string()],
    },
  };
  assert!(parse("x = <a>text</b>;", &options).is_err());
}

#[test]
fn rejects_unterminated_statements() {
  assert!(parse("const x =", &ParseOptions::default()).is_err());
  assert!(parse("function (", &ParseOptions::default()).is_err());
}

proptest! {
  #[test]
  fn identifier_statements_round_trip(name in "[a-zA-Z_$][a-zA-Z0-9_$]{0,12}") {
    prop_assume!(crate::lex::KEYWORDS_MAPPING.get(name.as_str()).is_none());
    prop_assume!(name != "undefined" && name != "async" && name != "await");
    let source = format!("x = {};", name);
    let top = parse(&source, &ParseOptions::default()).unwrap();
    let Stmt::Expr(stmt) = top.stx.body[0].stx.as_ref() else {
      panic!("expected expression statement");
    };
    let Expr::Assign(assign) = stmt.stx.expr.stx.as_ref() else {
      panic!("expected assignment");
    };
    let Expr::Id(id) = assign.stx.value.stx.as_ref() else {
      panic!("expected identifier");
    };
    prop_assert_eq!(&id.stx.name, &name);
  }

  #[test]
  fn string_literals_round_trip(value in "[ -~]{0,24}") {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    let source = format!("x = \"{}\";", escaped);
    let top = parse(&source, &ParseOptions::default()).unwrap();
    let Stmt::Expr(stmt) = top.stx.body[0].stx.as_ref() else {
      panic!("expected expression statement");
    };
    let Expr::Assign(assign) = stmt.stx.expr.stx.as_ref() else {
      panic!("expected assignment");
    };
    let Expr::LitString(lit) = assign.stx.value.stx.as_ref() else {
      panic!("expected string literal");
    };
    prop_assert_eq!(&lit.stx.value, &value);
  }
}
