use super::expr::Expr;
use super::expr::Func;
use super::expr::MethodKind;
use super::expr::PropKey;
use super::import_export::ExportAllStmt;
use super::import_export::ExportDefaultStmt;
use super::import_export::ExportNamedStmt;
use super::import_export::ImportStmt;
use super::node::Node;
use super::pat::ClassOrFuncName;
use super::pat::Pat;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Break(Node<BreakStmt>),
  Class(Node<ClassDecl>),
  Continue(Node<ContinueStmt>),
  DoWhile(Node<DoWhileStmt>),
  Empty(Node<EmptyStmt>),
  ExportAll(Node<ExportAllStmt>),
  ExportDefault(Node<ExportDefaultStmt>),
  ExportNamed(Node<ExportNamedStmt>),
  Expr(Node<ExprStmt>),
  For(Node<ForStmt>),
  ForInOf(Node<ForInOfStmt>),
  Func(Node<FuncDecl>),
  If(Node<IfStmt>),
  Import(Node<ImportStmt>),
  Return(Node<ReturnStmt>),
  Switch(Node<SwitchStmt>),
  Throw(Node<ThrowStmt>),
  Try(Node<TryStmt>),
  Var(Node<VarDecl>),
  While(Node<WhileStmt>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct EmptyStmt {}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarDeclMode {
  Const,
  Let,
  Var,
}

impl VarDeclMode {
  pub fn as_str(&self) -> &'static str {
    match self {
      VarDeclMode::Const => "const",
      VarDeclMode::Let => "let",
      VarDeclMode::Var => "var",
    }
  }
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct VarDeclarator {
  pub pattern: Node<Pat>,
  pub initializer: Option<Node<Expr>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct VarDecl {
  // Whether the declaration carried a declarative `export` modifier. Cleared
  // by the bundler before emission; the exports shim takes over.
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub mode: VarDeclMode,
  pub declarators: Vec<Node<VarDeclarator>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct FuncDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub export_default: bool,
  pub name: Option<Node<ClassOrFuncName>>,
  pub func: Node<Func>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ClassDecl {
  #[drive(skip)]
  pub export: bool,
  #[drive(skip)]
  pub export_default: bool,
  pub name: Option<Node<ClassOrFuncName>>,
  pub extends: Option<Node<Expr>>,
  pub members: Vec<Node<ClassMember>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ClassMemberValue {
  Field(Option<Node<Expr>>),
  Method(#[drive(skip)] MethodKind, Node<Func>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ClassMember {
  #[drive(skip)]
  pub is_static: bool,
  pub key: PropKey,
  pub value: ClassMemberValue,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ForInit {
  Decl(Node<VarDecl>),
  Expr(Node<Expr>),
  None,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ForStmt {
  pub init: ForInit,
  pub cond: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ForInOfStmt {
  // `None` when the left-hand side is a bare pattern (no declaration).
  #[drive(skip)]
  pub decl_mode: Option<VarDeclMode>,
  pub pat: Node<Pat>,
  #[drive(skip)]
  pub of: bool,
  pub rhs: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct DoWhileStmt {
  pub body: Node<Stmt>,
  pub condition: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ThrowStmt {
  pub value: Node<Expr>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct BreakStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ContinueStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct SwitchCase {
  // `None` is the `default` clause.
  pub test: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct SwitchStmt {
  pub subject: Node<Expr>,
  pub cases: Vec<Node<SwitchCase>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct CatchClause {
  pub param: Option<Node<Pat>>,
  pub body: Vec<Node<Stmt>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct TryStmt {
  pub block: Node<BlockStmt>,
  pub catch: Option<Node<CatchClause>>,
  pub finally: Option<Node<BlockStmt>>,
}
