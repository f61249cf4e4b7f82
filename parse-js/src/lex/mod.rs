use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use memchr::memchr;
use memchr::memchr2;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

/// Lexing context supplied by the parser.
///
/// JS cannot be lexed without parser feedback: a `/` at expression position
/// starts a regular expression literal, everywhere else it is division.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
  SlashIsRegex,
  Standard,
}

pub static KEYWORDS_MAPPING: Lazy<HashMap<&'static str, TT>> = Lazy::new(|| {
  let mut map = HashMap::new();
  map.insert("break", TT::KeywordBreak);
  map.insert("case", TT::KeywordCase);
  map.insert("catch", TT::KeywordCatch);
  map.insert("class", TT::KeywordClass);
  map.insert("const", TT::KeywordConst);
  map.insert("continue", TT::KeywordContinue);
  map.insert("default", TT::KeywordDefault);
  map.insert("delete", TT::KeywordDelete);
  map.insert("do", TT::KeywordDo);
  map.insert("else", TT::KeywordElse);
  map.insert("export", TT::KeywordExport);
  map.insert("extends", TT::KeywordExtends);
  map.insert("false", TT::LiteralFalse);
  map.insert("finally", TT::KeywordFinally);
  map.insert("for", TT::KeywordFor);
  map.insert("function", TT::KeywordFunction);
  map.insert("if", TT::KeywordIf);
  map.insert("import", TT::KeywordImport);
  map.insert("in", TT::KeywordIn);
  map.insert("instanceof", TT::KeywordInstanceof);
  map.insert("let", TT::KeywordLet);
  map.insert("new", TT::KeywordNew);
  map.insert("null", TT::LiteralNull);
  map.insert("return", TT::KeywordReturn);
  map.insert("switch", TT::KeywordSwitch);
  map.insert("this", TT::KeywordThis);
  map.insert("throw", TT::KeywordThrow);
  map.insert("true", TT::LiteralTrue);
  map.insert("try", TT::KeywordTry);
  map.insert("typeof", TT::KeywordTypeof);
  map.insert("var", TT::KeywordVar);
  map.insert("void", TT::KeywordVoid);
  map.insert("while", TT::KeywordWhile);
  map
});

// Reserved words that may never be used as binding names in emitted code.
pub static RESERVED_WORDS: Lazy<Vec<&'static str>> = Lazy::new(|| {
  let mut words: Vec<&'static str> = KEYWORDS_MAPPING.keys().copied().collect();
  words.extend([
    "await", "debugger", "do", "enum", "super", "with", "yield", "static", "implements",
    "interface", "package", "private", "protected", "public",
  ]);
  words.sort_unstable();
  words.dedup();
  words
});

// Longest match first; scanned linearly.
static OPERATORS: &[(&str, TT)] = &[
  (">>>=", TT::ChevronRightChevronRightChevronRightEquals),
  ("...", TT::DotDotDot),
  ("===", TT::EqualsEqualsEquals),
  ("!==", TT::ExclamationEqualsEquals),
  ("**=", TT::AsteriskAsteriskEquals),
  ("<<=", TT::ChevronLeftChevronLeftEquals),
  (">>=", TT::ChevronRightChevronRightEquals),
  (">>>", TT::ChevronRightChevronRightChevronRight),
  ("&&=", TT::AmpersandAmpersandEquals),
  ("||=", TT::BarBarEquals),
  ("??=", TT::QuestionQuestionEquals),
  ("=>", TT::Arrow),
  ("==", TT::EqualsEquals),
  ("!=", TT::ExclamationEquals),
  ("<=", TT::ChevronLeftEquals),
  (">=", TT::ChevronRightEquals),
  ("&&", TT::AmpersandAmpersand),
  ("||", TT::BarBar),
  ("??", TT::QuestionQuestion),
  ("?.", TT::QuestionDot),
  ("++", TT::PlusPlus),
  ("--", TT::HyphenHyphen),
  ("+=", TT::PlusEquals),
  ("-=", TT::HyphenEquals),
  ("*=", TT::AsteriskEquals),
  ("/=", TT::SlashEquals),
  ("%=", TT::PercentEquals),
  ("&=", TT::AmpersandEquals),
  ("|=", TT::BarEquals),
  ("^=", TT::CaretEquals),
  ("<<", TT::ChevronLeftChevronLeft),
  (">>", TT::ChevronRightChevronRight),
  ("**", TT::AsteriskAsterisk),
  ("&", TT::Ampersand),
  ("|", TT::Bar),
  ("^", TT::Caret),
  ("~", TT::Tilde),
  ("!", TT::Exclamation),
  ("?", TT::Question),
  ("<", TT::ChevronLeft),
  (">", TT::ChevronRight),
  ("=", TT::Equals),
  ("+", TT::Plus),
  ("-", TT::Hyphen),
  ("*", TT::Asterisk),
  ("/", TT::Slash),
  ("%", TT::Percent),
  ("(", TT::ParenthesisOpen),
  (")", TT::ParenthesisClose),
  ("[", TT::BracketOpen),
  ("]", TT::BracketClose),
  ("{", TT::BraceOpen),
  ("}", TT::BraceClose),
  (";", TT::Semicolon),
  (":", TT::Colon),
  (",", TT::Comma),
  (".", TT::Dot),
];

pub fn is_id_start(c: char) -> bool {
  c == '_' || c == '$' || c.is_alphabetic()
}

pub fn is_id_continue(c: char) -> bool {
  c == '_' || c == '$' || c.is_alphanumeric()
}

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
}

impl<'a> Lexer<'a> {
  pub fn new(source: &'a str) -> Lexer<'a> {
    Lexer { source, next: 0 }
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    &self.source[loc.0.min(self.source.len())..loc.1.min(self.source.len())]
  }

  pub fn pos(&self) -> usize {
    self.next
  }

  /// Rewinds (or advances) the lexer. Used by the parser to un-peek a token
  /// before a raw scan or a mode change.
  pub fn set_pos(&mut self, pos: usize) {
    self.next = pos;
  }

  pub fn at_end(&self) -> bool {
    self.next >= self.source.len()
  }

  fn rest(&self) -> &'a str {
    &self.source[self.next..]
  }

  fn peek_byte(&self, offset: usize) -> Option<u8> {
    self.source.as_bytes().get(self.next + offset).copied()
  }

  fn peek_char(&self) -> Option<char> {
    self.rest().chars().next()
  }

  // Consumes whitespace and comments. Returns whether a line terminator was
  // crossed.
  fn skip_trivia(&mut self) -> bool {
    let mut crossed_newline = false;
    loop {
      match self.peek_byte(0) {
        Some(b'\n') | Some(b'\r') => {
          crossed_newline = true;
          self.next += 1;
        }
        Some(b' ') | Some(b'\t') | Some(0x0b) | Some(0x0c) => {
          self.next += 1;
        }
        Some(b'/') if self.peek_byte(1) == Some(b'/') => {
          let rest = self.rest().as_bytes();
          match memchr2(b'\n', b'\r', rest) {
            Some(at) => self.next += at,
            None => self.next = self.source.len(),
          }
        }
        Some(b'/') if self.peek_byte(1) == Some(b'*') => {
          let mut at = self.next + 2;
          loop {
            match memchr(b'*', &self.source.as_bytes()[at.min(self.source.len())..]) {
              Some(star) => {
                let star = at + star;
                if self.source.as_bytes().get(star + 1) == Some(&b'/') {
                  if memchr2(b'\n', b'\r', &self.source.as_bytes()[self.next..star]).is_some() {
                    crossed_newline = true;
                  }
                  self.next = star + 2;
                  break;
                }
                at = star + 1;
              }
              None => {
                // Unterminated comment; treat the rest of the file as trivia.
                if memchr2(b'\n', b'\r', &self.source.as_bytes()[self.next..]).is_some() {
                  crossed_newline = true;
                }
                self.next = self.source.len();
                break;
              }
            }
          }
        }
        _ => return crossed_newline,
      }
    }
  }

  pub fn lex_next(&mut self, mode: LexMode) -> Token {
    let preceded_by_line_terminator = self.skip_trivia();
    let start = self.next;
    let Some(c) = self.peek_char() else {
      return Token::new(TT::EOF, Loc(start, start), preceded_by_line_terminator);
    };

    let typ = if is_id_start(c) {
      self.lex_identifier()
    } else if c.is_ascii_digit() || (c == '.' && self.peek_byte(1).is_some_and(|b| b.is_ascii_digit()))
    {
      self.lex_number()
    } else if c == '"' || c == '\'' {
      self.lex_string(c as u8)
    } else if c == '`' {
      self.lex_template_part()
    } else if c == '/' && mode == LexMode::SlashIsRegex {
      self.lex_regex()
    } else {
      match OPERATORS.iter().find(|(syn, _)| self.rest().starts_with(syn)) {
        Some((syn, typ)) => {
          self.next += syn.len();
          *typ
        }
        None => {
          self.next += c.len_utf8();
          TT::Invalid
        }
      }
    };

    Token::new(typ, Loc(start, self.next), preceded_by_line_terminator)
  }

  fn lex_identifier(&mut self) -> TT {
    let start = self.next;
    for c in self.rest().chars() {
      if is_id_continue(c) {
        self.next += c.len_utf8();
      } else {
        break;
      }
    }
    let name = &self.source[start..self.next];
    KEYWORDS_MAPPING.get(name).copied().unwrap_or(TT::Identifier)
  }

  fn lex_number(&mut self) -> TT {
    if self.rest().starts_with("0x") || self.rest().starts_with("0X") {
      self.next += 2;
      self.eat_while(|c| c.is_ascii_hexdigit());
      return TT::LiteralNumber;
    }
    if self.rest().starts_with("0b") || self.rest().starts_with("0B") {
      self.next += 2;
      self.eat_while(|c| c == '0' || c == '1');
      return TT::LiteralNumber;
    }
    if self.rest().starts_with("0o") || self.rest().starts_with("0O") {
      self.next += 2;
      self.eat_while(|c| ('0'..='7').contains(&c));
      return TT::LiteralNumber;
    }
    self.eat_while(|c| c.is_ascii_digit());
    if self.peek_byte(0) == Some(b'.') {
      self.next += 1;
      self.eat_while(|c| c.is_ascii_digit());
    }
    if matches!(self.peek_byte(0), Some(b'e') | Some(b'E')) {
      let mut at = 1;
      if matches!(self.peek_byte(1), Some(b'+') | Some(b'-')) {
        at = 2;
      }
      if self.peek_byte(at).is_some_and(|b| b.is_ascii_digit()) {
        self.next += at;
        self.eat_while(|c| c.is_ascii_digit());
      }
    }
    TT::LiteralNumber
  }

  fn lex_string(&mut self, quote: u8) -> TT {
    self.next += 1;
    loop {
      match self.peek_byte(0) {
        None => return TT::Invalid,
        Some(b'\n') | Some(b'\r') => return TT::Invalid,
        Some(b'\\') => {
          self.next += 1;
          if let Some(c) = self.peek_char() {
            self.next += c.len_utf8();
          }
        }
        Some(b) if b == quote => {
          self.next += 1;
          return TT::LiteralString;
        }
        Some(_) => {
          let c = self.peek_char().unwrap();
          self.next += c.len_utf8();
        }
      }
    }
  }

  // Lexes from an opening backtick (inclusive) up to and including either the
  // closing backtick or a `${` substitution opener. The parser inspects the
  // final characters to tell which.
  fn lex_template_part(&mut self) -> TT {
    self.next += 1;
    self.template_chunk()
  }

  /// Continues a template literal after a substitution's closing `}`. The
  /// parser must call this with the lexer positioned exactly past that brace.
  pub fn template_continue(&mut self) -> Token {
    let start = self.next;
    let typ = self.template_chunk();
    Token::new(typ, Loc(start, self.next), false)
  }

  fn template_chunk(&mut self) -> TT {
    loop {
      match self.peek_byte(0) {
        None => return TT::Invalid,
        Some(b'\\') => {
          self.next += 1;
          if let Some(c) = self.peek_char() {
            self.next += c.len_utf8();
          }
        }
        Some(b'`') => {
          self.next += 1;
          return TT::TemplateStrPart;
        }
        Some(b'$') if self.peek_byte(1) == Some(b'{') => {
          self.next += 2;
          return TT::TemplateStrPart;
        }
        Some(_) => {
          let c = self.peek_char().unwrap();
          self.next += c.len_utf8();
        }
      }
    }
  }

  fn lex_regex(&mut self) -> TT {
    self.next += 1;
    let mut in_class = false;
    loop {
      match self.peek_byte(0) {
        None | Some(b'\n') | Some(b'\r') => return TT::Invalid,
        Some(b'\\') => {
          self.next += 1;
          if let Some(c) = self.peek_char() {
            self.next += c.len_utf8();
          }
        }
        Some(b'[') => {
          in_class = true;
          self.next += 1;
        }
        Some(b']') => {
          in_class = false;
          self.next += 1;
        }
        Some(b'/') if !in_class => {
          self.next += 1;
          self.eat_while(is_id_continue);
          return TT::LiteralRegex;
        }
        Some(_) => {
          let c = self.peek_char().unwrap();
          self.next += c.len_utf8();
        }
      }
    }
  }

  /// Raw scan for JSX text content: everything up to the next `<`, `{`, or
  /// end of input. Returns the covered location; the caller slices the text.
  pub fn jsx_text(&mut self) -> Loc {
    let start = self.next;
    match memchr2(b'<', b'{', &self.source.as_bytes()[self.next..]) {
      Some(at) => self.next += at,
      None => self.next = self.source.len(),
    }
    Loc(start, self.next)
  }

  fn eat_while(&mut self, test: impl Fn(char) -> bool) {
    for c in self.rest().chars() {
      if test(c) {
        self.next += c.len_utf8();
      } else {
        break;
      }
    }
  }
}
