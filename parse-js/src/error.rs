use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use diagnostics::Diagnostic;
use diagnostics::FileId;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the parser.
///
/// Diagnostic codes (prefix `PS`) are assigned per variant and are stable.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedSyntax(&'static str),
  InvalidAssignmentTarget,
  InvalidCharacterEscape,
  JsxClosingTagMismatch,
  LineTerminatorInString,
  MalformedLiteralNumber,
  MalformedLiteralRegex,
  RequiredTokenNotFound(TT),
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
  UnexpectedToken,
  UnterminatedTemplate,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  /// Convert this syntax error into a shared [`diagnostics::Diagnostic`].
  pub fn to_diagnostic(&self, file: FileId) -> Diagnostic {
    let mut diagnostic = Diagnostic::error(
      self.typ.code(),
      self.typ.message(self.actual_token),
      self.loc.to_span(file),
    );
    if let Some(actual) = self.actual_token {
      diagnostic = diagnostic.with_note(format!("found token: {:?}", actual));
    }
    diagnostic
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{:?} [token={:?}]", self.typ, self.actual_token)
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedSyntax(_) => "PS0001",
      SyntaxErrorType::InvalidAssignmentTarget => "PS0002",
      SyntaxErrorType::InvalidCharacterEscape => "PS0003",
      SyntaxErrorType::JsxClosingTagMismatch => "PS0004",
      SyntaxErrorType::LineTerminatorInString => "PS0005",
      SyntaxErrorType::MalformedLiteralNumber => "PS0006",
      SyntaxErrorType::MalformedLiteralRegex => "PS0007",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PS0008",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "PS0009",
      SyntaxErrorType::UnexpectedEnd => "PS0010",
      SyntaxErrorType::UnexpectedToken => "PS0011",
      SyntaxErrorType::UnterminatedTemplate => "PS0012",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    match self {
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidAssignmentTarget => "invalid assignment target".into(),
      SyntaxErrorType::InvalidCharacterEscape => "invalid character escape".into(),
      SyntaxErrorType::JsxClosingTagMismatch => "JSX closing tag does not match opening tag".into(),
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".into(),
      SyntaxErrorType::MalformedLiteralRegex => "malformed regular expression literal".into(),
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => actual_token
        .map(|tok| format!("unexpected end before {:?}", tok))
        .unwrap_or_else(|| "unexpected end of input".into()),
      SyntaxErrorType::UnexpectedToken => "unexpected token".into(),
      SyntaxErrorType::UnterminatedTemplate => "unterminated template literal".into(),
    }
  }
}
