use super::node::Node;
use super::pat::ClassOrFuncName;
use super::pat::Pat;
use super::stmt::ClassMember;
use super::stmt::Stmt;
use crate::symbol::SymbolId;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum Expr {
  Arrow(Node<ArrowFuncExpr>),
  Assign(Node<AssignExpr>),
  Binary(Node<BinaryExpr>),
  Call(Node<CallExpr>),
  Class(Node<ClassExpr>),
  Cond(Node<CondExpr>),
  Func(Node<FuncExpr>),
  Id(Node<IdExpr>),
  Index(Node<IndexExpr>),
  LitArray(Node<ArrayLit>),
  LitBool(Node<BoolLit>),
  LitNull(Node<NullLit>),
  LitNumber(Node<NumberLit>),
  LitObject(Node<ObjectLit>),
  LitRegex(Node<RegexLit>),
  LitString(Node<StringLit>),
  LitTemplate(Node<TemplateLit>),
  LitUndefined(Node<UndefinedLit>),
  Member(Node<MemberExpr>),
  New(Node<NewExpr>),
  // Synthesised by the bundler: a call against the module loader, printed as
  // `require(<id> /* <raw import text> */)`.
  Require(Node<RequireExpr>),
  Seq(Node<SeqExpr>),
  This(Node<ThisExpr>),
  Unary(Node<UnaryExpr>),
  Update(Node<UpdateExpr>),
}

/// An identifier reference. `symbol` is filled in by the module-scope symbol
/// pass; `None` after that pass means the reference is free (global).
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct IdExpr {
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub symbol: Option<SymbolId>,
}

impl IdExpr {
  pub fn new(name: impl Into<String>) -> IdExpr {
    IdExpr {
      name: name.into(),
      symbol: None,
    }
  }
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ThisExpr {}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct BoolLit {
  #[drive(skip)]
  pub value: bool,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct NullLit {}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct UndefinedLit {}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct NumberLit {
  #[drive(skip)]
  pub value: f64,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct StringLit {
  // Decoded value; the printer re-escapes into canonical double-quoted form.
  #[drive(skip)]
  pub value: String,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct RegexLit {
  // Raw source including delimiters and flags; carried through verbatim.
  #[drive(skip)]
  pub value: String,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum TemplatePart {
  Substitution(Node<Expr>),
  // Raw source text of the chunk, escapes not decoded.
  String(#[drive(skip)] String),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct TemplateLit {
  pub parts: Vec<TemplatePart>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ArrayLit {
  pub elements: Vec<ArrayLitElem>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ArrayLitElem {
  Single(Node<Expr>),
  Spread(Node<Expr>),
  Empty,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum PropKey {
  Computed(Node<Expr>),
  Ident(#[drive(skip)] String),
  Num(#[drive(skip)] f64),
  Str(#[drive(skip)] String),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ObjectMember {
  // `{key: value}` and `{key(params) {...}}`.
  Prop(Node<ObjectProp>),
  // `{name}`; rewritten to `Prop` if renaming changes the value binding.
  Shorthand(Node<IdExpr>),
  // `{...expr}`.
  Spread(Node<Expr>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ObjectProp {
  pub key: PropKey,
  pub value: ObjectPropValue,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ObjectPropValue {
  Expr(Node<Expr>),
  Method(#[drive(skip)] MethodKind, Node<Func>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MethodKind {
  Getter,
  Method,
  Setter,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ObjectLit {
  pub members: Vec<Node<ObjectMember>>,
}

/// Shared function shape: parameters plus a block body. Arrow functions with
/// expression bodies use [`ArrowFuncExpr`] directly.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct Func {
  pub params: Vec<Node<ParamDecl>>,
  pub body: Vec<Node<Stmt>>,
  #[drive(skip)]
  pub is_async: bool,
  #[drive(skip)]
  pub is_generator: bool,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ParamDecl {
  #[drive(skip)]
  pub rest: bool,
  pub pattern: Node<Pat>,
  pub default: Option<Node<Expr>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct FuncExpr {
  pub name: Option<Node<ClassOrFuncName>>,
  pub func: Node<Func>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ArrowFuncBody {
  Block(Vec<Node<Stmt>>),
  Expr(Node<Expr>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ArrowFuncExpr {
  pub params: Vec<Node<ParamDecl>>,
  pub body: ArrowFuncBody,
  #[drive(skip)]
  pub is_async: bool,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ClassExpr {
  pub name: Option<Node<ClassOrFuncName>>,
  pub extends: Option<Node<Expr>>,
  pub members: Vec<Node<ClassMember>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct UnaryExpr {
  #[drive(skip)]
  pub op: UnaryOp,
  pub operand: Node<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOp {
  Await,
  BitNot,
  Delete,
  Minus,
  Not,
  Plus,
  Typeof,
  Void,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct UpdateExpr {
  #[drive(skip)]
  pub op: UpdateOp,
  #[drive(skip)]
  pub prefix: bool,
  pub operand: Node<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpdateOp {
  Decrement,
  Increment,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct BinaryExpr {
  #[drive(skip)]
  pub op: BinaryOp,
  pub left: Node<Expr>,
  pub right: Node<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  BitAnd,
  BitOr,
  BitXor,
  Div,
  Eq,
  EqStrict,
  Exp,
  Gt,
  Gte,
  In,
  Instanceof,
  LogicalAnd,
  LogicalOr,
  Lt,
  Lte,
  Mod,
  Mul,
  Neq,
  NeqStrict,
  NullishCoalesce,
  Shl,
  Shr,
  ShrUnsigned,
  Sub,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct AssignExpr {
  #[drive(skip)]
  pub op: AssignOp,
  pub target: Node<Expr>,
  pub value: Node<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
  Add,
  Assign,
  BitAnd,
  BitOr,
  BitXor,
  Div,
  Exp,
  LogicalAnd,
  LogicalOr,
  Mod,
  Mul,
  NullishCoalesce,
  Shl,
  Shr,
  ShrUnsigned,
  Sub,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct CondExpr {
  pub test: Node<Expr>,
  pub consequent: Node<Expr>,
  pub alternate: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct CallArg {
  #[drive(skip)]
  pub spread: bool,
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct CallExpr {
  pub callee: Node<Expr>,
  pub args: Vec<Node<CallArg>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct NewExpr {
  pub callee: Node<Expr>,
  pub args: Vec<Node<CallArg>>,
}

/// `obj.prop`: property access with a static name.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct MemberExpr {
  pub obj: Node<Expr>,
  #[drive(skip)]
  pub prop: String,
  #[drive(skip)]
  pub optional_chaining: bool,
}

/// `obj[index]`: property access with a computed name.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct IndexExpr {
  pub obj: Node<Expr>,
  pub index: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct SeqExpr {
  pub exprs: Vec<Node<Expr>>,
}

/// A rewritten module reference: `require(<target> /* <text> */)`.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct RequireExpr {
  #[drive(skip)]
  pub target: u32,
  #[drive(skip)]
  pub text: String,
}
