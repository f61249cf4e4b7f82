use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;
use crate::JsxOptions;

pub mod expr;
pub mod import_export;
pub mod jsx;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod top_level;

pub struct ParserCheckpoint {
  pos: usize,
  peeked: Option<(Token, LexMode)>,
}

/// Single-token-lookahead parser over [`Lexer`].
///
/// The lexer needs parser context to lex `/` correctly, so the peeked token
/// is tagged with the mode it was lexed under and re-lexed when peeked again
/// under an incompatible mode. Raw scans (JSX text, template continuations)
/// require the buffer to be empty; [`Parser::unpeek`] rewinds it.
pub struct Parser<'a> {
  lexer: Lexer<'a>,
  peeked: Option<(Token, LexMode)>,
  jsx: JsxOptions,
}

// Only tokens that start with `/` depend on the lex mode.
fn mode_sensitive(typ: TT) -> bool {
  matches!(typ, TT::Slash | TT::SlashEquals | TT::LiteralRegex)
}

impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>, jsx: JsxOptions) -> Parser<'a> {
    Parser {
      lexer,
      peeked: None,
      jsx,
    }
  }

  pub fn jsx_options(&self) -> &JsxOptions {
    &self.jsx
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    self.lexer.str(loc)
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      pos: self.lexer.pos(),
      peeked: self.peeked,
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.lexer.set_pos(checkpoint.pos);
    self.peeked = checkpoint.peeked;
  }

  /// Drops the peeked token (if any) and rewinds the lexer to its start, so
  /// a raw scan can take over from exactly there.
  pub fn unpeek(&mut self) {
    if let Some((token, _)) = self.peeked.take() {
      self.lexer.set_pos(token.loc.0);
    }
  }

  pub fn peek_with(&mut self, mode: LexMode) -> Token {
    if let Some((token, lexed_mode)) = self.peeked {
      if lexed_mode == mode || !mode_sensitive(token.typ) {
        return token;
      }
      // Re-lex the same source under the requested mode, keeping the trivia
      // information that re-lexing from the token start would lose.
      self.lexer.set_pos(token.loc.0);
      let mut relexed = self.lexer.lex_next(mode);
      relexed.preceded_by_line_terminator = token.preceded_by_line_terminator;
      self.peeked = Some((relexed, mode));
      return relexed;
    }
    let token = self.lexer.lex_next(mode);
    self.peeked = Some((token, mode));
    token
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with(LexMode::Standard)
  }

  /// Peek at expression position, where `/` starts a regex literal.
  pub fn peek_expr(&mut self) -> Token {
    self.peek_with(LexMode::SlashIsRegex)
  }

  /// Consumes the next token. A peeked token is consumed exactly as peeked,
  /// whatever mode it was lexed under.
  pub fn next_with(&mut self, mode: LexMode) -> Token {
    if let Some((token, _)) = self.peeked.take() {
      return token;
    }
    self.lexer.lex_next(mode)
  }

  pub fn next(&mut self) -> Token {
    self.next_with(LexMode::Standard)
  }

  pub fn consume(&mut self, typ: TT) -> SyntaxResult<Token> {
    let token = self.next();
    if token.typ != typ {
      return Err(token_error(token, SyntaxErrorType::RequiredTokenNotFound(typ)));
    }
    Ok(token)
  }

  /// Consumes the next token if it has the given type.
  pub fn consume_if(&mut self, typ: TT) -> Option<Token> {
    if self.peek().typ == typ {
      Some(self.next())
    } else {
      None
    }
  }

  /// Whether the next token is a plain identifier spelled `text` (used for
  /// the contextual keywords: `as`, `async`, `from`, `get`, `of`, `set`,
  /// `static`, ...).
  pub fn peek_is_contextual(&mut self, text: &str) -> bool {
    let token = self.peek();
    token.typ == TT::Identifier && self.str(token.loc) == text
  }

  pub fn consume_contextual(&mut self, text: &'static str) -> SyntaxResult<Token> {
    if !self.peek_is_contextual(text) {
      let token = self.peek();
      return Err(token_error(token, SyntaxErrorType::ExpectedSyntax(text)));
    }
    Ok(self.next())
  }

  /// Statement terminator with automatic semicolon insertion: an explicit
  /// `;`, or a line terminator / `}` / end of input before the next token.
  pub fn consume_semicolon(&mut self) -> SyntaxResult<()> {
    let token = self.peek();
    match token.typ {
      TT::Semicolon => {
        self.next();
        Ok(())
      }
      TT::BraceClose | TT::EOF => Ok(()),
      _ if token.preceded_by_line_terminator => Ok(()),
      _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax(";"))),
    }
  }

  /// Raw-scan access for JSX text content. The peeked token (if any) is
  /// rewound first so the scan starts where parsing left off.
  pub fn jsx_raw_text(&mut self) -> (Loc, String) {
    self.unpeek();
    let loc = self.lexer_jsx_text();
    (loc, self.str(loc).to_string())
  }

  fn lexer_jsx_text(&mut self) -> Loc {
    self.lexer.jsx_text()
  }

  /// Continues a template literal after a substitution's closing brace. The
  /// caller must have just consumed the `}` so the buffer is empty.
  pub fn template_continue(&mut self) -> Token {
    debug_assert!(self.peeked.is_none());
    self.lexer.template_continue()
  }
}

pub fn token_error(token: Token, typ: SyntaxErrorType) -> SyntaxError {
  let typ = if token.typ == TT::EOF {
    SyntaxErrorType::UnexpectedEnd
  } else {
    typ
  };
  SyntaxError::new(typ, token.loc, Some(token.typ))
}
