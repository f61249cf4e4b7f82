use super::expr::Expr;
use super::node::Node;
use crate::symbol::SymbolId;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

/// A binding identifier. `symbol` is filled in by the module-scope symbol
/// pass; it stays `None` until then.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct IdPat {
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub symbol: Option<SymbolId>,
}

impl IdPat {
  pub fn new(name: impl Into<String>) -> IdPat {
    IdPat {
      name: name.into(),
      symbol: None,
    }
  }
}

/// The name binding of a function or class declaration. Kept distinct from
/// [`IdPat`] so visitors can treat declaration names specially.
#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ClassOrFuncName {
  #[drive(skip)]
  pub name: String,
  #[drive(skip)]
  pub symbol: Option<SymbolId>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub enum Pat {
  Array(Node<ArrayPat>),
  Id(Node<IdPat>),
  Object(Node<ObjectPat>),
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ArrayPat {
  // `None` represents an elision (`[a, , b]`).
  pub elements: Vec<Option<Node<ArrayPatElem>>>,
  pub rest: Option<Node<Pat>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ArrayPatElem {
  pub target: Node<Pat>,
  pub default: Option<Node<Expr>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ObjectPat {
  pub properties: Vec<Node<ObjectPatProp>>,
  pub rest: Option<Node<IdPat>>,
}

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct ObjectPatProp {
  // `{key: target = default}`; shorthand properties set `key` to the same
  // name as the target identifier and `shorthand` to true.
  #[drive(skip)]
  pub key: String,
  pub target: Node<Pat>,
  pub default: Option<Node<Expr>>,
  #[drive(skip)]
  pub shorthand: bool,
}
