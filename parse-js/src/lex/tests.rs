use super::*;

fn lex_all(source: &str) -> Vec<(TT, &str)> {
  let mut lexer = Lexer::new(source);
  let mut tokens = Vec::new();
  loop {
    let token = lexer.lex_next(LexMode::Standard);
    if token.typ == TT::EOF {
      return tokens;
    }
    tokens.push((token.typ, &source[token.loc.0..token.loc.1]));
  }
}

#[test]
fn lexes_keywords_and_identifiers() {
  let tokens = lex_all("const fn = require");
  assert_eq!(tokens, vec![
    (TT::KeywordConst, "const"),
    (TT::Identifier, "fn"),
    (TT::Equals, "="),
    (TT::Identifier, "require"),
  ]);
}

#[test]
fn lexes_longest_operator() {
  let tokens = lex_all("a >>>= b === c ?? d?.e");
  let types: Vec<TT> = tokens.iter().map(|(typ, _)| *typ).collect();
  assert_eq!(types, vec![
    TT::Identifier,
    TT::ChevronRightChevronRightChevronRightEquals,
    TT::Identifier,
    TT::EqualsEqualsEquals,
    TT::Identifier,
    TT::QuestionQuestion,
    TT::Identifier,
    TT::QuestionDot,
    TT::Identifier,
  ]);
}

#[test]
fn lexes_numbers() {
  let tokens = lex_all("123 1.5 0x10 0b101 1e3 .5");
  assert!(tokens.iter().all(|(typ, _)| *typ == TT::LiteralNumber));
  assert_eq!(tokens.len(), 6);
}

#[test]
fn lexes_strings_with_escapes() {
  let tokens = lex_all(r#"'a\'b' "c\"d""#);
  assert_eq!(tokens, vec![
    (TT::LiteralString, r#"'a\'b'"#),
    (TT::LiteralString, r#""c\"d""#),
  ]);
}

#[test]
fn comments_are_trivia_and_record_newlines() {
  let mut lexer = Lexer::new("a // x\nb /* y\n z */ c");
  let a = lexer.lex_next(LexMode::Standard);
  let b = lexer.lex_next(LexMode::Standard);
  let c = lexer.lex_next(LexMode::Standard);
  assert_eq!(a.typ, TT::Identifier);
  assert!(!a.preceded_by_line_terminator);
  assert!(b.preceded_by_line_terminator);
  assert!(c.preceded_by_line_terminator);
}

#[test]
fn slash_is_regex_only_on_request() {
  let mut lexer = Lexer::new("/ab[/]c/gi");
  let token = lexer.lex_next(LexMode::SlashIsRegex);
  assert_eq!(token.typ, TT::LiteralRegex);
  assert_eq!(lexer.str(token.loc), "/ab[/]c/gi");

  let mut lexer = Lexer::new("/x");
  let token = lexer.lex_next(LexMode::Standard);
  assert_eq!(token.typ, TT::Slash);
}

#[test]
fn template_parts_terminate_at_substitution_or_backtick() {
  let source = "`a${x}b`";
  let mut lexer = Lexer::new(source);
  let head = lexer.lex_next(LexMode::Standard);
  assert_eq!(head.typ, TT::TemplateStrPart);
  assert_eq!(lexer.str(head.loc), "`a${");
  let x = lexer.lex_next(LexMode::Standard);
  assert_eq!(x.typ, TT::Identifier);
  let close = lexer.lex_next(LexMode::Standard);
  assert_eq!(close.typ, TT::BraceClose);
  let tail = lexer.template_continue();
  assert_eq!(lexer.str(tail.loc), "b`");
}

#[test]
fn jsx_text_stops_at_markup() {
  let mut lexer = Lexer::new("hello there<span");
  let loc = lexer.jsx_text();
  assert_eq!(lexer.str(loc), "hello there");
}
