use super::expr::Expr;
use super::node::Node;
use super::pat::IdPat;
use crate::symbol::SymbolId;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

/// `import default, {a as b, c} from "module"` /
/// `import * as ns from "module"` / `import "module"`.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ImportStmt {
  pub default: Option<Node<IdPat>>,
  pub names: Option<ImportNames>,
  #[drive(skip)]
  pub module: String,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum ImportNames {
  // `import * as name`.
  All(Node<IdPat>),
  // `import {a as b, c, default as e}`. `default` is still a name, so we
  // don't use a dedicated variant for it.
  Specific(Vec<Node<ImportName>>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ImportName {
  #[drive(skip)]
  pub importable: String,
  // Always set, even when no explicit alias is provided; an implicit alias
  // would otherwise hide the binding from downstream passes.
  pub alias: Node<IdPat>,
}

/// `export {a as b, c}` and `export {a as b} from "module"`.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ExportNamedStmt {
  pub names: Vec<Node<ExportName>>,
  #[drive(skip)]
  pub from: Option<String>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ExportName {
  // The local binding (or, with `from`, the name in the source module).
  #[drive(skip)]
  pub target: String,
  #[drive(skip)]
  pub alias: String,
  // Resolution of `target` in module scope; only for local re-exports
  // (`from` absent). Filled in by the symbol pass.
  #[drive(skip)]
  pub symbol: Option<SymbolId>,
}

/// `export * from "module"` / `export * as ns from "module"`.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ExportAllStmt {
  #[drive(skip)]
  pub alias: Option<String>,
  #[drive(skip)]
  pub module: String,
}

/// `export default <expr>`. Default-exported function and class
/// *declarations* stay [`super::stmt::FuncDecl`]/[`super::stmt::ClassDecl`]
/// with `export_default` set, since they also bind their name.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ExportDefaultStmt {
  pub expr: Node<Expr>,
}
