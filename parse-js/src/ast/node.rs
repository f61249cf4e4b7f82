use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Formatter;

/// A syntax tree node: a location plus the boxed syntax payload.
///
/// A location is not a source range guarantee; transformations create
/// entirely new nodes that exist nowhere in the source, and those carry
/// [`Loc::SYNTHETIC`].
#[derive(Clone, Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
    }
  }

  /// A node with no source location, for code synthesised by transforms.
  pub fn synthetic(stx: S) -> Node<S> {
    Node::new(Loc::SYNTHETIC, stx)
  }

  /// Wraps the node inside another node with the same location, with syntax
  /// derived from the provided callback. Useful for lifting a concrete node
  /// into an enum variant (e.g. `Node<CallExpr>` into `Node<Expr>`).
  pub fn wrap<T: Drive + DriveMut, F: FnOnce(Node<S>) -> T>(self, f: F) -> Node<T> {
    let loc = self.loc;
    Node::new(loc, f(self))
  }

  /// Maps the syntax, keeping the location.
  pub fn map_stx<T: Drive + DriveMut, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
    }
  }

  /// Create an error at this node's location.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}
