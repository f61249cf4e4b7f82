use super::expr::decode_string;
use super::token_error;
use super::Parser;
use crate::ast::expr::BoolLit;
use crate::ast::expr::CallArg;
use crate::ast::expr::CallExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::NullLit;
use crate::ast::expr::ObjectLit;
use crate::ast::expr::ObjectMember;
use crate::ast::expr::ObjectProp;
use crate::ast::expr::ObjectPropValue;
use crate::ast::expr::PropKey;
use crate::ast::expr::StringLit;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_id_start;
use crate::loc::Loc;
use crate::token::TT;

// JSX is lowered at parse time: an element becomes a call against the
// configured factory, a fragment passes the configured fragment name as the
// tag. The factory and fragment names are ordinary identifier references, so
// scoping and later rewrites apply to them like any other name.

impl<'a> Parser<'a> {
  pub fn parse_jsx_element(&mut self) -> SyntaxResult<Node<Expr>> {
    let start = self.consume(TT::ChevronLeft)?;
    self.parse_jsx_element_after_chevron(start.loc)
  }

  fn parse_jsx_element_after_chevron(&mut self, start: Loc) -> SyntaxResult<Node<Expr>> {
    // `<>children</>`.
    if self.consume_if(TT::ChevronRight).is_some() {
      let children = self.parse_jsx_children()?;
      let end = self.consume(TT::ChevronRight)?;
      let loc = start.union(end.loc);
      let fragment = qualified_name_expr(&self.jsx_options().fragment.clone(), loc);
      return Ok(self.jsx_factory_call(loc, fragment, None, children));
    }

    let (name, name_loc) = self.parse_jsx_name()?;
    let mut attrs = Vec::new();

    let loc;
    let children;
    loop {
      let token = self.peek();
      match token.typ {
        // `/>`: self-closing, no children.
        TT::Slash => {
          self.next();
          let end = self.consume(TT::ChevronRight)?;
          loc = start.union(end.loc);
          children = Vec::new();
          break;
        }
        TT::ChevronRight => {
          self.next();
          children = self.parse_jsx_children()?;
          let (closing, closing_loc) = self.parse_jsx_name()?;
          if closing != name {
            return Err(closing_loc.error(SyntaxErrorType::JsxClosingTagMismatch, None));
          }
          let end = self.consume(TT::ChevronRight)?;
          loc = start.union(end.loc);
          break;
        }
        TT::BraceOpen => {
          self.next();
          self.consume(TT::DotDotDot)?;
          let value = self.parse_assignment()?;
          self.consume(TT::BraceClose)?;
          attrs.push(Node::synthetic(ObjectMember::Spread(value)));
        }
        _ => {
          let attr_token = self.next();
          let attr_name = self.str(attr_token.loc).to_string();
          if !attr_name.chars().next().is_some_and(is_id_start) {
            return Err(token_error(attr_token, SyntaxErrorType::ExpectedSyntax("attribute name")));
          }
          let value = if self.consume_if(TT::Equals).is_some() {
            self.parse_jsx_attr_value()?
          } else {
            Node::new(attr_token.loc, Expr::LitBool(Node::new(attr_token.loc, BoolLit {
              value: true,
            })))
          };
          attrs.push(Node::synthetic(ObjectMember::Prop(Node::synthetic(ObjectProp {
            key: PropKey::Ident(attr_name),
            value: ObjectPropValue::Expr(value),
          }))));
        }
      }
    }

    // Lowercase single-segment names are intrinsic elements and become
    // string tags; everything else is a reference.
    let tag = if name.contains('.') || !name.starts_with(|c: char| c.is_ascii_lowercase()) {
      let segments: Vec<String> = name.split('.').map(str::to_string).collect();
      qualified_name_expr(&segments, name_loc)
    } else {
      Node::new(name_loc, Expr::LitString(Node::new(name_loc, StringLit {
        value: name,
      })))
    };

    let attrs = if attrs.is_empty() {
      None
    } else {
      Some(Node::new(loc, Expr::LitObject(Node::new(loc, ObjectLit { members: attrs }))))
    };
    Ok(self.jsx_factory_call(loc, tag, attrs, children))
  }

  fn parse_jsx_name(&mut self) -> SyntaxResult<(String, Loc)> {
    let first = self.next();
    let text = self.str(first.loc);
    if first.typ != TT::Identifier && !text.chars().next().is_some_and(is_id_start) {
      return Err(token_error(first, SyntaxErrorType::ExpectedSyntax("element name")));
    }
    let mut name = text.to_string();
    let mut loc = first.loc;
    while self.consume_if(TT::Dot).is_some() {
      let segment = self.next();
      let segment_text = self.str(segment.loc);
      if !segment_text.chars().next().is_some_and(is_id_start) {
        return Err(token_error(segment, SyntaxErrorType::ExpectedSyntax("element name")));
      }
      name.push('.');
      name.push_str(segment_text);
      loc.extend(segment.loc);
    }
    Ok((name, loc))
  }

  fn parse_jsx_attr_value(&mut self) -> SyntaxResult<Node<Expr>> {
    let token = self.peek();
    match token.typ {
      TT::LiteralString => {
        self.next();
        let value = decode_string(self.str(token.loc))
          .ok_or_else(|| token.loc.error(SyntaxErrorType::InvalidCharacterEscape, None))?;
        Ok(Node::new(token.loc, Expr::LitString(Node::new(token.loc, StringLit { value }))))
      }
      TT::BraceOpen => {
        self.next();
        let value = self.parse_assignment()?;
        self.consume(TT::BraceClose)?;
        Ok(value)
      }
      _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax("attribute value"))),
    }
  }

  // Parses child content up to (and including) the `</` of the closing tag.
  fn parse_jsx_children(&mut self) -> SyntaxResult<Vec<Node<Expr>>> {
    let mut children = Vec::new();
    loop {
      let (text_loc, text) = self.jsx_raw_text();
      let trimmed = trim_jsx_text(&text);
      if !trimmed.is_empty() {
        children.push(Node::new(text_loc, Expr::LitString(Node::new(text_loc, StringLit {
          value: trimmed,
        }))));
      }
      let token = self.peek();
      match token.typ {
        TT::BraceOpen => {
          self.next();
          // `{}` and `{/* comment */}` hold no child.
          if self.consume_if(TT::BraceClose).is_some() {
            continue;
          }
          let child = self.parse_expr()?;
          self.consume(TT::BraceClose)?;
          children.push(child);
        }
        TT::ChevronLeft => {
          let open = self.next();
          if self.consume_if(TT::Slash).is_some() {
            return Ok(children);
          }
          children.push(self.parse_jsx_element_after_chevron(open.loc)?);
        }
        _ => return Err(token_error(token, SyntaxErrorType::UnexpectedEnd)),
      }
    }
  }

  fn jsx_factory_call(
    &self,
    loc: Loc,
    tag: Node<Expr>,
    attrs: Option<Node<Expr>>,
    children: Vec<Node<Expr>>,
  ) -> Node<Expr> {
    let factory = qualified_name_expr(&self.jsx_options().factory, loc);
    let attrs = attrs.unwrap_or_else(|| Node::new(loc, Expr::LitNull(Node::new(loc, NullLit {}))));
    let mut args = vec![
      Node::new(tag.loc, CallArg {
        spread: false,
        value: tag,
      }),
      Node::new(loc, CallArg {
        spread: false,
        value: attrs,
      }),
    ];
    for child in children {
      args.push(Node::new(child.loc, CallArg {
        spread: false,
        value: child,
      }));
    }
    Node::new(loc, Expr::Call(Node::new(loc, CallExpr {
      callee: factory,
      args,
    })))
  }
}

fn qualified_name_expr(segments: &[String], loc: Loc) -> Node<Expr> {
  let mut expr = Node::new(loc, Expr::Id(Node::new(loc, IdExpr::new(segments[0].clone()))));
  for segment in &segments[1..] {
    expr = Node::new(loc, Expr::Member(Node::new(loc, MemberExpr {
      obj: expr,
      prop: segment.clone(),
      optional_chaining: false,
    })));
  }
  expr
}

// JSX text: trim each line, drop blank lines, join the rest with a single
// space.
fn trim_jsx_text(text: &str) -> String {
  text
    .split('\n')
    .map(str::trim)
    .filter(|line| !line.is_empty())
    .collect::<Vec<_>>()
    .join(" ")
}
