use crate::loc::Loc;

/// Token types.
///
/// Operator variants are named after their glyphs (`ChevronLeft` is `<`) so
/// the mapping to source text stays mechanical.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub enum TT {
  // Special token representing the end of the source code. Easier than
  // handling Option everywhere.
  EOF,
  // Special token representing source the lexer could not make sense of. The
  // parser turns it into a syntax error when (and only when) it reaches it.
  Invalid,

  Ampersand,
  AmpersandAmpersand,
  AmpersandAmpersandEquals,
  AmpersandEquals,
  Arrow,
  Asterisk,
  AsteriskAsterisk,
  AsteriskAsteriskEquals,
  AsteriskEquals,
  Bar,
  BarBar,
  BarBarEquals,
  BarEquals,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  Caret,
  CaretEquals,
  ChevronLeft,
  ChevronLeftChevronLeft,
  ChevronLeftChevronLeftEquals,
  ChevronLeftEquals,
  ChevronRight,
  ChevronRightChevronRight,
  ChevronRightChevronRightChevronRight,
  ChevronRightChevronRightChevronRightEquals,
  ChevronRightChevronRightEquals,
  ChevronRightEquals,
  Colon,
  Comma,
  Dot,
  DotDotDot,
  Equals,
  EqualsEquals,
  EqualsEqualsEquals,
  Exclamation,
  ExclamationEquals,
  ExclamationEqualsEquals,
  Hyphen,
  HyphenEquals,
  HyphenHyphen,
  ParenthesisClose,
  ParenthesisOpen,
  Percent,
  PercentEquals,
  Plus,
  PlusEquals,
  PlusPlus,
  Question,
  QuestionDot,
  QuestionQuestion,
  QuestionQuestionEquals,
  Semicolon,
  Slash,
  SlashEquals,
  Tilde,

  Identifier,
  KeywordBreak,
  KeywordCase,
  KeywordCatch,
  KeywordClass,
  KeywordConst,
  KeywordContinue,
  KeywordDefault,
  KeywordDelete,
  KeywordDo,
  KeywordElse,
  KeywordExport,
  KeywordExtends,
  KeywordFinally,
  KeywordFor,
  KeywordFunction,
  KeywordIf,
  KeywordImport,
  KeywordIn,
  KeywordInstanceof,
  KeywordLet,
  KeywordNew,
  KeywordReturn,
  KeywordSwitch,
  KeywordThis,
  KeywordThrow,
  KeywordTry,
  KeywordTypeof,
  KeywordVar,
  KeywordVoid,
  KeywordWhile,
  LiteralFalse,
  LiteralNull,
  LiteralNumber,
  LiteralRegex,
  LiteralString,
  LiteralTrue,

  // `...` up to `${` (substitution follows) or the closing backtick.
  TemplateStrPart,
}

/// A lexed token. The source text is not copied; use the location to slice
/// the original source when the text is needed.
#[derive(Copy, Clone, Debug)]
pub struct Token {
  pub typ: TT,
  pub loc: Loc,
  // Whether a line terminator (possibly inside a comment) appeared between
  // the previous token and this one. Drives automatic semicolon insertion
  // and the restricted productions (`return`, `throw`, `break`, `continue`).
  pub preceded_by_line_terminator: bool,
}

impl Token {
  pub fn new(typ: TT, loc: Loc, preceded_by_line_terminator: bool) -> Token {
    Token {
      typ,
      loc,
      preceded_by_line_terminator,
    }
  }
}
