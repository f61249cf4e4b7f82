use super::token_error;
use super::Parser;
use crate::ast::expr::ArrayLit;
use crate::ast::expr::ArrayLitElem;
use crate::ast::expr::ArrowFuncBody;
use crate::ast::expr::ArrowFuncExpr;
use crate::ast::expr::AssignExpr;
use crate::ast::expr::AssignOp;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::BinaryOp;
use crate::ast::expr::BoolLit;
use crate::ast::expr::CallArg;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ClassExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::Func;
use crate::ast::expr::FuncExpr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::IndexExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::MethodKind;
use crate::ast::expr::NewExpr;
use crate::ast::expr::NullLit;
use crate::ast::expr::NumberLit;
use crate::ast::expr::ObjectLit;
use crate::ast::expr::ObjectMember;
use crate::ast::expr::ObjectProp;
use crate::ast::expr::ObjectPropValue;
use crate::ast::expr::ParamDecl;
use crate::ast::expr::PropKey;
use crate::ast::expr::RegexLit;
use crate::ast::expr::SeqExpr;
use crate::ast::expr::StringLit;
use crate::ast::expr::TemplateLit;
use crate::ast::expr::TemplatePart;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryOp;
use crate::ast::expr::UndefinedLit;
use crate::ast::expr::UpdateExpr;
use crate::ast::expr::UpdateOp;
use crate::ast::node::Node;
use crate::ast::pat::ClassOrFuncName;
use crate::ast::pat::IdPat;
use crate::ast::pat::Pat;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_id_start;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

// Binding powers for binary operators; cond/assignment/sequence are handled
// structurally. `None` when the token is not a binary operator.
fn binary_op(typ: TT) -> Option<(BinaryOp, u8, bool)> {
  // (op, precedence, right associative)
  Some(match typ {
    TT::QuestionQuestion => (BinaryOp::NullishCoalesce, 3, false),
    TT::BarBar => (BinaryOp::LogicalOr, 4, false),
    TT::AmpersandAmpersand => (BinaryOp::LogicalAnd, 5, false),
    TT::Bar => (BinaryOp::BitOr, 6, false),
    TT::Caret => (BinaryOp::BitXor, 7, false),
    TT::Ampersand => (BinaryOp::BitAnd, 8, false),
    TT::EqualsEquals => (BinaryOp::Eq, 9, false),
    TT::ExclamationEquals => (BinaryOp::Neq, 9, false),
    TT::EqualsEqualsEquals => (BinaryOp::EqStrict, 9, false),
    TT::ExclamationEqualsEquals => (BinaryOp::NeqStrict, 9, false),
    TT::ChevronLeft => (BinaryOp::Lt, 10, false),
    TT::ChevronRight => (BinaryOp::Gt, 10, false),
    TT::ChevronLeftEquals => (BinaryOp::Lte, 10, false),
    TT::ChevronRightEquals => (BinaryOp::Gte, 10, false),
    TT::KeywordIn => (BinaryOp::In, 10, false),
    TT::KeywordInstanceof => (BinaryOp::Instanceof, 10, false),
    TT::ChevronLeftChevronLeft => (BinaryOp::Shl, 11, false),
    TT::ChevronRightChevronRight => (BinaryOp::Shr, 11, false),
    TT::ChevronRightChevronRightChevronRight => (BinaryOp::ShrUnsigned, 11, false),
    TT::Plus => (BinaryOp::Add, 12, false),
    TT::Hyphen => (BinaryOp::Sub, 12, false),
    TT::Asterisk => (BinaryOp::Mul, 13, false),
    TT::Slash => (BinaryOp::Div, 13, false),
    TT::Percent => (BinaryOp::Mod, 13, false),
    TT::AsteriskAsterisk => (BinaryOp::Exp, 14, true),
    _ => return None,
  })
}

fn assign_op(typ: TT) -> Option<AssignOp> {
  Some(match typ {
    TT::Equals => AssignOp::Assign,
    TT::PlusEquals => AssignOp::Add,
    TT::HyphenEquals => AssignOp::Sub,
    TT::AsteriskEquals => AssignOp::Mul,
    TT::SlashEquals => AssignOp::Div,
    TT::PercentEquals => AssignOp::Mod,
    TT::AsteriskAsteriskEquals => AssignOp::Exp,
    TT::ChevronLeftChevronLeftEquals => AssignOp::Shl,
    TT::ChevronRightChevronRightEquals => AssignOp::Shr,
    TT::ChevronRightChevronRightChevronRightEquals => AssignOp::ShrUnsigned,
    TT::AmpersandEquals => AssignOp::BitAnd,
    TT::BarEquals => AssignOp::BitOr,
    TT::CaretEquals => AssignOp::BitXor,
    TT::AmpersandAmpersandEquals => AssignOp::LogicalAnd,
    TT::BarBarEquals => AssignOp::LogicalOr,
    TT::QuestionQuestionEquals => AssignOp::NullishCoalesce,
    _ => return None,
  })
}

fn prefix_unary_op(typ: TT) -> Option<UnaryOp> {
  Some(match typ {
    TT::Exclamation => UnaryOp::Not,
    TT::Tilde => UnaryOp::BitNot,
    TT::Plus => UnaryOp::Plus,
    TT::Hyphen => UnaryOp::Minus,
    TT::KeywordTypeof => UnaryOp::Typeof,
    TT::KeywordVoid => UnaryOp::Void,
    TT::KeywordDelete => UnaryOp::Delete,
    _ => return None,
  })
}

// Whether the token can serve as a property/member name (`a.default` and
// `{default: 1}` are legal; keywords are only reserved as bindings).
fn is_name_like(parser: &Parser, token: Token) -> bool {
  if token.typ == TT::Identifier {
    return true;
  }
  parser
    .str(token.loc)
    .chars()
    .next()
    .is_some_and(is_id_start)
}

impl<'a> Parser<'a> {
  /// Full expression including the comma (sequence) operator.
  pub fn parse_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    self.parse_expr_with_in(true)
  }

  pub fn parse_expr_with_in(&mut self, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let first = self.parse_assignment_with_in(permit_in)?;
    if self.peek().typ != TT::Comma {
      return Ok(first);
    }
    let mut loc = first.loc;
    let mut exprs = vec![first];
    while self.consume_if(TT::Comma).is_some() {
      let next = self.parse_assignment_with_in(permit_in)?;
      loc.extend(next.loc);
      exprs.push(next);
    }
    Ok(Node::new(loc, Expr::Seq(Node::new(loc, SeqExpr { exprs }))))
  }

  /// Expression without the comma operator (an "AssignmentExpression").
  pub fn parse_assignment(&mut self) -> SyntaxResult<Node<Expr>> {
    self.parse_assignment_with_in(true)
  }

  pub fn parse_assignment_with_in(&mut self, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    if let Some(arrow) = self.try_parse_arrow(permit_in)? {
      return Ok(arrow);
    }

    let left = self.parse_cond_with_in(permit_in)?;

    let Some(op) = assign_op(self.peek().typ) else {
      return Ok(left);
    };
    if !is_assignment_target(&left) {
      return Err(left.error(SyntaxErrorType::InvalidAssignmentTarget));
    }
    self.next();
    let value = self.parse_assignment_with_in(permit_in)?;
    let loc = left.loc.union(value.loc);
    Ok(Node::new(
      loc,
      Expr::Assign(Node::new(loc, AssignExpr {
        op,
        target: left,
        value,
      })),
    ))
  }

  fn parse_cond_with_in(&mut self, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let test = self.parse_binary(0, permit_in)?;
    if self.peek().typ != TT::Question {
      return Ok(test);
    }
    self.next();
    let consequent = self.parse_assignment()?;
    self.consume(TT::Colon)?;
    let alternate = self.parse_assignment_with_in(permit_in)?;
    let loc = test.loc.union(alternate.loc);
    Ok(Node::new(
      loc,
      Expr::Cond(Node::new(loc, CondExpr {
        test,
        consequent,
        alternate,
      })),
    ))
  }

  fn parse_binary(&mut self, min_prec: u8, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let mut left = self.parse_unary(permit_in)?;
    loop {
      let token = self.peek();
      let Some((op, prec, right_assoc)) = binary_op(token.typ) else {
        break;
      };
      if op == BinaryOp::In && !permit_in {
        break;
      }
      if prec < min_prec {
        break;
      }
      self.next();
      let next_min = if right_assoc { prec } else { prec + 1 };
      let right = self.parse_binary(next_min, permit_in)?;
      let loc = left.loc.union(right.loc);
      left = Node::new(
        loc,
        Expr::Binary(Node::new(loc, BinaryExpr { op, left, right })),
      );
    }
    Ok(left)
  }

  fn parse_unary(&mut self, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let token = self.peek_expr();

    if let Some(op) = prefix_unary_op(token.typ) {
      self.next();
      let operand = self.parse_unary(permit_in)?;
      let loc = token.loc.union(operand.loc);
      return Ok(Node::new(
        loc,
        Expr::Unary(Node::new(loc, UnaryExpr { op, operand })),
      ));
    }

    if matches!(token.typ, TT::PlusPlus | TT::HyphenHyphen) {
      self.next();
      let op = if token.typ == TT::PlusPlus {
        UpdateOp::Increment
      } else {
        UpdateOp::Decrement
      };
      let operand = self.parse_unary(permit_in)?;
      let loc = token.loc.union(operand.loc);
      return Ok(Node::new(
        loc,
        Expr::Update(Node::new(loc, UpdateExpr {
          op,
          prefix: true,
          operand,
        })),
      ));
    }

    if token.typ == TT::Identifier && self.str(token.loc) == "await" {
      self.next();
      let operand = self.parse_unary(permit_in)?;
      let loc = token.loc.union(operand.loc);
      return Ok(Node::new(
        loc,
        Expr::Unary(Node::new(loc, UnaryExpr {
          op: UnaryOp::Await,
          operand,
        })),
      ));
    }

    self.parse_postfix(permit_in)
  }

  fn parse_postfix(&mut self, permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let primary = self.parse_primary(permit_in)?;
    let wrapped = self.parse_postfix_from(primary, true)?;

    let token = self.peek();
    if matches!(token.typ, TT::PlusPlus | TT::HyphenHyphen) && !token.preceded_by_line_terminator {
      self.next();
      let op = if token.typ == TT::PlusPlus {
        UpdateOp::Increment
      } else {
        UpdateOp::Decrement
      };
      let loc = wrapped.loc.union(token.loc);
      return Ok(Node::new(
        loc,
        Expr::Update(Node::new(loc, UpdateExpr {
          op,
          prefix: false,
          operand: wrapped,
        })),
      ));
    }
    Ok(wrapped)
  }

  fn parse_postfix_from(
    &mut self,
    mut expr: Node<Expr>,
    allow_call: bool,
  ) -> SyntaxResult<Node<Expr>> {
    loop {
      let token = self.peek();
      match token.typ {
        TT::Dot | TT::QuestionDot => {
          let optional_chaining = token.typ == TT::QuestionDot;
          self.next();
          if optional_chaining && self.peek().typ == TT::ParenthesisOpen && allow_call {
            let (args, end) = self.parse_call_args()?;
            let loc = expr.loc.union(end);
            expr = Node::new(loc, Expr::Call(Node::new(loc, CallExpr { callee: expr, args })));
            continue;
          }
          if optional_chaining && self.peek().typ == TT::BracketOpen {
            self.next();
            let index = self.parse_expr()?;
            let end = self.consume(TT::BracketClose)?;
            let loc = expr.loc.union(end.loc);
            expr = Node::new(loc, Expr::Index(Node::new(loc, IndexExpr { obj: expr, index })));
            continue;
          }
          let name = self.next();
          if !is_name_like(self, name) {
            return Err(token_error(name, SyntaxErrorType::ExpectedSyntax("property name")));
          }
          let loc = expr.loc.union(name.loc);
          expr = Node::new(
            loc,
            Expr::Member(Node::new(loc, MemberExpr {
              obj: expr,
              prop: self.str(name.loc).to_string(),
              optional_chaining,
            })),
          );
        }
        TT::BracketOpen => {
          self.next();
          let index = self.parse_expr()?;
          let end = self.consume(TT::BracketClose)?;
          let loc = expr.loc.union(end.loc);
          expr = Node::new(loc, Expr::Index(Node::new(loc, IndexExpr { obj: expr, index })));
        }
        TT::ParenthesisOpen if allow_call => {
          let (args, end) = self.parse_call_args()?;
          let loc = expr.loc.union(end);
          expr = Node::new(loc, Expr::Call(Node::new(loc, CallExpr { callee: expr, args })));
        }
        _ => return Ok(expr),
      }
    }
  }

  fn parse_call_args(&mut self) -> SyntaxResult<(Vec<Node<CallArg>>, Loc)> {
    self.consume(TT::ParenthesisOpen)?;
    let mut args = Vec::new();
    loop {
      if let Some(close) = self.consume_if(TT::ParenthesisClose) {
        return Ok((args, close.loc));
      }
      let spread = self.consume_if(TT::DotDotDot).is_some();
      let value = self.parse_assignment()?;
      let loc = value.loc;
      args.push(Node::new(loc, CallArg { spread, value }));
      if self.consume_if(TT::Comma).is_none() {
        let close = self.consume(TT::ParenthesisClose)?;
        return Ok((args, close.loc));
      }
    }
  }

  fn parse_primary(&mut self, _permit_in: bool) -> SyntaxResult<Node<Expr>> {
    let token = self.peek_expr();
    match token.typ {
      TT::LiteralNumber => {
        self.next();
        let value = decode_number(self.str(token.loc))
          .ok_or_else(|| token.loc.error(SyntaxErrorType::MalformedLiteralNumber, None))?;
        Ok(Node::new(token.loc, Expr::LitNumber(Node::new(token.loc, NumberLit { value }))))
      }
      TT::LiteralString => {
        self.next();
        let value = decode_string(self.str(token.loc))
          .ok_or_else(|| token.loc.error(SyntaxErrorType::InvalidCharacterEscape, None))?;
        Ok(Node::new(token.loc, Expr::LitString(Node::new(token.loc, StringLit { value }))))
      }
      TT::LiteralRegex => {
        self.next();
        Ok(Node::new(
          token.loc,
          Expr::LitRegex(Node::new(token.loc, RegexLit {
            value: self.str(token.loc).to_string(),
          })),
        ))
      }
      TT::LiteralTrue | TT::LiteralFalse => {
        self.next();
        Ok(Node::new(
          token.loc,
          Expr::LitBool(Node::new(token.loc, BoolLit {
            value: token.typ == TT::LiteralTrue,
          })),
        ))
      }
      TT::LiteralNull => {
        self.next();
        Ok(Node::new(token.loc, Expr::LitNull(Node::new(token.loc, NullLit {}))))
      }
      TT::TemplateStrPart => self.parse_template(),
      TT::KeywordThis => {
        self.next();
        Ok(Node::new(token.loc, Expr::This(Node::new(token.loc, ThisExpr {}))))
      }
      TT::KeywordFunction => self.parse_func_expr(false),
      TT::KeywordClass => self.parse_class_expr(),
      TT::KeywordNew => self.parse_new(),
      TT::Identifier => {
        let name = self.str(token.loc);
        if name == "undefined" {
          self.next();
          return Ok(Node::new(
            token.loc,
            Expr::LitUndefined(Node::new(token.loc, UndefinedLit {})),
          ));
        }
        if name == "async" {
          let checkpoint = self.checkpoint();
          self.next();
          let after = self.peek();
          if after.typ == TT::KeywordFunction && !after.preceded_by_line_terminator {
            return self.parse_func_expr(true);
          }
          self.restore_checkpoint(checkpoint);
        }
        self.next();
        Ok(Node::new(
          token.loc,
          Expr::Id(Node::new(token.loc, IdExpr::new(self.str(token.loc)))),
        ))
      }
      TT::ParenthesisOpen => {
        self.next();
        let expr = self.parse_expr()?;
        self.consume(TT::ParenthesisClose)?;
        Ok(expr)
      }
      TT::BracketOpen => self.parse_array_lit(),
      TT::BraceOpen => self.parse_object_lit(),
      TT::ChevronLeft if self.jsx_options().parse => self.parse_jsx_element(),
      _ => Err(token_error(token, SyntaxErrorType::UnexpectedToken)),
    }
  }

  fn parse_new(&mut self) -> SyntaxResult<Node<Expr>> {
    let new_token = self.consume(TT::KeywordNew)?;
    let primary = self.parse_primary(true)?;
    let callee = self.parse_postfix_from(primary, false)?;
    let (args, mut loc) = if self.peek().typ == TT::ParenthesisOpen {
      let (args, end) = self.parse_call_args()?;
      (args, new_token.loc.union(end))
    } else {
      (Vec::new(), new_token.loc.union(callee.loc))
    };
    loc.extend(callee.loc);
    let inner = Node::new(loc, NewExpr { callee, args });
    let wrapped = Node::new(loc, Expr::New(inner));
    // `new a().b` continues the member chain after the arguments.
    self.parse_postfix_from(wrapped, true)
  }

  fn parse_template(&mut self) -> SyntaxResult<Node<Expr>> {
    let head = self.consume(TT::TemplateStrPart)?;
    let mut loc = head.loc;
    let mut parts = Vec::new();
    let text = self.str(head.loc);
    // The part token includes the opening backtick and the terminator
    // (closing backtick, or `${` when a substitution follows).
    let (chunk, mut done) = split_template_chunk(&text[1..], head.loc)?;
    parts.push(TemplatePart::String(chunk));
    while !done {
      let expr = self.parse_expr()?;
      parts.push(TemplatePart::Substitution(expr));
      self.consume(TT::BraceClose)?;
      let cont = self.template_continue();
      if cont.typ != TT::TemplateStrPart {
        return Err(cont.loc.error(SyntaxErrorType::UnterminatedTemplate, None));
      }
      loc.extend(cont.loc);
      let (chunk, chunk_done) = split_template_chunk(self.str(cont.loc), cont.loc)?;
      parts.push(TemplatePart::String(chunk));
      done = chunk_done;
    }
    Ok(Node::new(loc, Expr::LitTemplate(Node::new(loc, TemplateLit { parts }))))
  }

  fn parse_func_expr(&mut self, is_async: bool) -> SyntaxResult<Node<Expr>> {
    let start = self.consume(TT::KeywordFunction)?;
    let is_generator = self.consume_if(TT::Asterisk).is_some();
    let name = if self.peek().typ == TT::Identifier {
      let token = self.next();
      Some(Node::new(token.loc, ClassOrFuncName {
        name: self.str(token.loc).to_string(),
        symbol: None,
      }))
    } else {
      None
    };
    let params = self.parse_params()?;
    let (body, end) = self.parse_block_body()?;
    let loc = start.loc.union(end);
    let func = Node::new(loc, Func {
      params,
      body,
      is_async,
      is_generator,
    });
    Ok(Node::new(loc, Expr::Func(Node::new(loc, FuncExpr { name, func }))))
  }

  fn parse_class_expr(&mut self) -> SyntaxResult<Node<Expr>> {
    let (loc, name, extends, members) = self.parse_class_parts()?;
    Ok(Node::new(
      loc,
      Expr::Class(Node::new(loc, ClassExpr {
        name,
        extends,
        members,
      })),
    ))
  }

  /// Parses `(p1, p2 = d, ...rest)`.
  pub fn parse_params(&mut self) -> SyntaxResult<Vec<Node<ParamDecl>>> {
    self.consume(TT::ParenthesisOpen)?;
    let mut params = Vec::new();
    loop {
      if self.consume_if(TT::ParenthesisClose).is_some() {
        return Ok(params);
      }
      let rest = self.consume_if(TT::DotDotDot).is_some();
      let pattern = self.parse_pat()?;
      let default = if self.consume_if(TT::Equals).is_some() {
        Some(self.parse_assignment()?)
      } else {
        None
      };
      let mut loc = pattern.loc;
      if let Some(default) = &default {
        loc.extend(default.loc);
      }
      params.push(Node::new(loc, ParamDecl {
        rest,
        pattern,
        default,
      }));
      if self.consume_if(TT::Comma).is_none() {
        self.consume(TT::ParenthesisClose)?;
        return Ok(params);
      }
    }
  }

  pub fn parse_block_body(&mut self) -> SyntaxResult<(Vec<Node<Stmt>>, Loc)> {
    self.consume(TT::BraceOpen)?;
    let mut body = Vec::new();
    loop {
      if let Some(close) = self.consume_if(TT::BraceClose) {
        return Ok((body, close.loc));
      }
      body.push(self.parse_stmt()?);
    }
  }

  fn try_parse_arrow(&mut self, permit_in: bool) -> SyntaxResult<Option<Node<Expr>>> {
    let token = self.peek();
    let checkpoint = self.checkpoint();

    let mut is_async = false;
    let mut start = token;
    if token.typ == TT::Identifier && self.str(token.loc) == "async" {
      // Only commit to `async` as a modifier if an arrow actually follows.
      let inner_checkpoint = self.checkpoint();
      self.next();
      let after = self.peek();
      if !after.preceded_by_line_terminator
        && (after.typ == TT::Identifier || after.typ == TT::ParenthesisOpen)
      {
        is_async = true;
        start = after;
      } else {
        self.restore_checkpoint(inner_checkpoint);
      }
    }

    let params = match start.typ {
      TT::Identifier => {
        let name_token = self.next();
        let pat = Node::new(name_token.loc, Pat::Id(Node::new(
          name_token.loc,
          IdPat::new(self.str(name_token.loc)),
        )));
        vec![Node::new(name_token.loc, ParamDecl {
          rest: false,
          pattern: pat,
          default: None,
        })]
      }
      TT::ParenthesisOpen => match self.parse_params() {
        Ok(params) => params,
        Err(_) => {
          self.restore_checkpoint(checkpoint);
          return Ok(None);
        }
      },
      _ => {
        self.restore_checkpoint(checkpoint);
        return Ok(None);
      }
    };

    let arrow = self.peek();
    if arrow.typ != TT::Arrow || arrow.preceded_by_line_terminator {
      self.restore_checkpoint(checkpoint);
      return Ok(None);
    }
    self.next();

    let (body, end) = if self.peek().typ == TT::BraceOpen {
      let (stmts, end) = self.parse_block_body()?;
      (ArrowFuncBody::Block(stmts), end)
    } else {
      let expr = self.parse_assignment_with_in(permit_in)?;
      let end = expr.loc;
      (ArrowFuncBody::Expr(expr), end)
    };
    let loc = token.loc.union(end);
    Ok(Some(Node::new(
      loc,
      Expr::Arrow(Node::new(loc, ArrowFuncExpr {
        params,
        body,
        is_async,
      })),
    )))
  }

  fn parse_array_lit(&mut self) -> SyntaxResult<Node<Expr>> {
    let open = self.consume(TT::BracketOpen)?;
    let mut elements = Vec::new();
    let close = loop {
      if let Some(close) = self.consume_if(TT::BracketClose) {
        break close;
      }
      if self.consume_if(TT::Comma).is_some() {
        elements.push(ArrayLitElem::Empty);
        continue;
      }
      let elem = if self.consume_if(TT::DotDotDot).is_some() {
        ArrayLitElem::Spread(self.parse_assignment()?)
      } else {
        ArrayLitElem::Single(self.parse_assignment()?)
      };
      elements.push(elem);
      if self.consume_if(TT::Comma).is_none() {
        break self.consume(TT::BracketClose)?;
      }
    };
    let loc = open.loc.union(close.loc);
    Ok(Node::new(loc, Expr::LitArray(Node::new(loc, ArrayLit { elements }))))
  }

  pub fn parse_prop_key(&mut self) -> SyntaxResult<PropKey> {
    let token = self.peek();
    match token.typ {
      TT::BracketOpen => {
        self.next();
        let expr = self.parse_assignment()?;
        self.consume(TT::BracketClose)?;
        Ok(PropKey::Computed(expr))
      }
      TT::LiteralString => {
        self.next();
        let value = decode_string(self.str(token.loc))
          .ok_or_else(|| token.loc.error(SyntaxErrorType::InvalidCharacterEscape, None))?;
        Ok(PropKey::Str(value))
      }
      TT::LiteralNumber => {
        self.next();
        let value = decode_number(self.str(token.loc))
          .ok_or_else(|| token.loc.error(SyntaxErrorType::MalformedLiteralNumber, None))?;
        Ok(PropKey::Num(value))
      }
      _ if is_name_like(self, token) => {
        self.next();
        Ok(PropKey::Ident(self.str(token.loc).to_string()))
      }
      _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax("property key"))),
    }
  }

  fn parse_object_lit(&mut self) -> SyntaxResult<Node<Expr>> {
    let open = self.consume(TT::BraceOpen)?;
    let mut members = Vec::new();
    let close = loop {
      if let Some(close) = self.consume_if(TT::BraceClose) {
        break close;
      }
      let member_start = self.peek();
      let member = if self.consume_if(TT::DotDotDot).is_some() {
        let value = self.parse_assignment()?;
        ObjectMember::Spread(value)
      } else {
        self.parse_object_member()?
      };
      let member_loc = member_start.loc.union(self.peek().loc);
      members.push(Node::new(member_loc, member));
      if self.consume_if(TT::Comma).is_none() {
        break self.consume(TT::BraceClose)?;
      }
    };
    let loc = open.loc.union(close.loc);
    Ok(Node::new(loc, Expr::LitObject(Node::new(loc, ObjectLit { members }))))
  }

  fn parse_object_member(&mut self) -> SyntaxResult<ObjectMember> {
    // Accessors: `get key() {}` / `set key(v) {}`, unless `get`/`set` is
    // itself the key.
    for (text, kind) in [("get", MethodKind::Getter), ("set", MethodKind::Setter)] {
      if self.peek_is_contextual(text) {
        let checkpoint = self.checkpoint();
        self.next();
        let after = self.peek();
        if !matches!(after.typ, TT::Colon | TT::Comma | TT::BraceClose | TT::ParenthesisOpen) {
          let key = self.parse_prop_key()?;
          let params = self.parse_params()?;
          let (body, _) = self.parse_block_body()?;
          let func = Node::synthetic(Func {
            params,
            body,
            is_async: false,
            is_generator: false,
          });
          return Ok(ObjectMember::Prop(Node::synthetic(ObjectProp {
            key,
            value: ObjectPropValue::Method(kind, func),
          })));
        }
        self.restore_checkpoint(checkpoint);
      }
    }

    let is_generator = self.consume_if(TT::Asterisk).is_some();
    let key_token = self.peek();
    let key = self.parse_prop_key()?;
    let token = self.peek();
    match token.typ {
      TT::ParenthesisOpen => {
        let params = self.parse_params()?;
        let (body, _) = self.parse_block_body()?;
        let func = Node::synthetic(Func {
          params,
          body,
          is_async: false,
          is_generator,
        });
        Ok(ObjectMember::Prop(Node::synthetic(ObjectProp {
          key,
          value: ObjectPropValue::Method(MethodKind::Method, func),
        })))
      }
      TT::Colon => {
        self.next();
        let value = self.parse_assignment()?;
        Ok(ObjectMember::Prop(Node::synthetic(ObjectProp {
          key,
          value: ObjectPropValue::Expr(value),
        })))
      }
      _ => match key {
        PropKey::Ident(name) => Ok(ObjectMember::Shorthand(Node::new(
          key_token.loc,
          IdExpr::new(name),
        ))),
        _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax(":"))),
      },
    }
  }
}

fn is_assignment_target(expr: &Node<Expr>) -> bool {
  matches!(
    expr.stx.as_ref(),
    Expr::Id(_) | Expr::Member(_) | Expr::Index(_) | Expr::LitArray(_) | Expr::LitObject(_)
  )
}

// Splits a template part's raw text (opening delimiter already stripped by
// the caller) into the chunk and whether the literal ended here.
fn split_template_chunk(text: &str, loc: Loc) -> SyntaxResult<(String, bool)> {
  if let Some(chunk) = text.strip_suffix("${") {
    Ok((chunk.to_string(), false))
  } else if let Some(chunk) = text.strip_suffix('`') {
    Ok((chunk.to_string(), true))
  } else {
    Err(loc.error(SyntaxErrorType::UnterminatedTemplate, None))
  }
}

pub fn decode_number(raw: &str) -> Option<f64> {
  if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X")) {
    return u128::from_str_radix(hex, 16).ok().map(|v| v as f64);
  }
  if let Some(bin) = raw.strip_prefix("0b").or_else(|| raw.strip_prefix("0B")) {
    return u128::from_str_radix(bin, 2).ok().map(|v| v as f64);
  }
  if let Some(oct) = raw.strip_prefix("0o").or_else(|| raw.strip_prefix("0O")) {
    return u128::from_str_radix(oct, 8).ok().map(|v| v as f64);
  }
  let normalized = if let Some(stripped) = raw.strip_prefix('.') {
    format!("0.{}", stripped)
  } else if let Some(stripped) = raw.strip_suffix('.') {
    stripped.to_string()
  } else {
    raw.to_string()
  };
  normalized.parse::<f64>().ok()
}

pub fn decode_string(raw: &str) -> Option<String> {
  // Strip the matching quotes.
  let inner = raw.get(1..raw.len().checked_sub(1)?)?;
  let mut out = String::with_capacity(inner.len());
  let mut chars = inner.chars();
  while let Some(c) = chars.next() {
    if c != '\\' {
      out.push(c);
      continue;
    }
    let escaped = chars.next()?;
    match escaped {
      'n' => out.push('\n'),
      't' => out.push('\t'),
      'r' => out.push('\r'),
      'b' => out.push('\u{8}'),
      'f' => out.push('\u{c}'),
      'v' => out.push('\u{b}'),
      '0' => out.push('\0'),
      'x' => {
        let hi = chars.next()?;
        let lo = chars.next()?;
        let code = u32::from_str_radix(&format!("{}{}", hi, lo), 16).ok()?;
        out.push(char::from_u32(code)?);
      }
      'u' => {
        let first = chars.next()?;
        if first == '{' {
          let mut digits = String::new();
          loop {
            let c = chars.next()?;
            if c == '}' {
              break;
            }
            digits.push(c);
          }
          let code = u32::from_str_radix(&digits, 16).ok()?;
          out.push(char::from_u32(code)?);
        } else {
          let mut digits = String::new();
          digits.push(first);
          for _ in 0..3 {
            digits.push(chars.next()?);
          }
          let code = u32::from_str_radix(&digits, 16).ok()?;
          out.push(char::from_u32(code)?);
        }
      }
      '\n' => {}
      other => out.push(other),
    }
  }
  Some(out)
}
