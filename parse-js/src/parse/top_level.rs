use super::Parser;
use crate::ast::node::Node;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_top_level(&mut self) -> SyntaxResult<Node<TopLevel>> {
    let mut body = Vec::new();
    let mut end = 0;
    loop {
      let token = self.peek();
      if token.typ == TT::EOF {
        break;
      }
      let stmt = self.parse_stmt()?;
      end = stmt.loc.1.max(end);
      body.push(stmt);
    }
    Ok(Node::new(Loc(0, end), TopLevel { body }))
  }
}
