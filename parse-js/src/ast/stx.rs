use super::node::Node;
use super::stmt::Stmt;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

#[derive(Clone, Debug, Drive, DriveMut)]
pub struct TopLevel {
  pub body: Vec<Node<Stmt>>,
}
