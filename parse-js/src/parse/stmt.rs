use super::token_error;
use super::Parser;
use crate::ast::expr::Expr;
use crate::ast::expr::Func;
use crate::ast::expr::MethodKind;
use crate::ast::node::Node;
use crate::ast::pat::ArrayPat;
use crate::ast::pat::ArrayPatElem;
use crate::ast::pat::ClassOrFuncName;
use crate::ast::pat::IdPat;
use crate::ast::pat::ObjectPat;
use crate::ast::pat::ObjectPatProp;
use crate::ast::pat::Pat;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::CatchClause;
use crate::ast::stmt::ClassDecl;
use crate::ast::stmt::ClassMember;
use crate::ast::stmt::ClassMemberValue;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::DoWhileStmt;
use crate::ast::stmt::EmptyStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForInOfStmt;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::ForStmt;
use crate::ast::stmt::FuncDecl;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchCase;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::ThrowStmt;
use crate::ast::stmt::TryStmt;
use crate::ast::stmt::VarDecl;
use crate::ast::stmt::VarDeclMode;
use crate::ast::stmt::VarDeclarator;
use crate::ast::stmt::WhileStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let token = self.peek();
    match token.typ {
      TT::BraceOpen => self.parse_block_stmt(),
      TT::Semicolon => {
        self.next();
        Ok(Node::new(token.loc, Stmt::Empty(Node::new(token.loc, EmptyStmt {}))))
      }
      TT::KeywordVar | TT::KeywordLet | TT::KeywordConst => {
        let decl = self.parse_var_decl(false)?;
        self.consume_semicolon()?;
        Ok(decl.wrap(Stmt::Var))
      }
      TT::KeywordFunction => Ok(self.parse_func_decl(false, false, false)?.wrap(Stmt::Func)),
      TT::KeywordClass => Ok(self.parse_class_decl(false, false)?.wrap(Stmt::Class)),
      TT::KeywordIf => self.parse_if(),
      TT::KeywordWhile => self.parse_while(),
      TT::KeywordDo => self.parse_do_while(),
      TT::KeywordFor => self.parse_for(),
      TT::KeywordSwitch => self.parse_switch(),
      TT::KeywordTry => self.parse_try(),
      TT::KeywordThrow => self.parse_throw(),
      TT::KeywordReturn => self.parse_return(),
      TT::KeywordBreak => self.parse_break_continue(true),
      TT::KeywordContinue => self.parse_break_continue(false),
      TT::KeywordImport => self.parse_import(),
      TT::KeywordExport => self.parse_export(),
      TT::Identifier if self.str(token.loc) == "async" => {
        let checkpoint = self.checkpoint();
        self.next();
        let after = self.peek();
        if after.typ == TT::KeywordFunction && !after.preceded_by_line_terminator {
          return Ok(self.parse_func_decl(false, false, true)?.wrap(Stmt::Func));
        }
        self.restore_checkpoint(checkpoint);
        self.parse_expr_stmt()
      }
      _ => self.parse_expr_stmt(),
    }
  }

  fn parse_expr_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let expr = self.parse_expr()?;
    self.consume_semicolon()?;
    let loc = expr.loc;
    Ok(Node::new(loc, Stmt::Expr(Node::new(loc, ExprStmt { expr }))))
  }

  pub fn parse_block_stmt(&mut self) -> SyntaxResult<Node<Stmt>> {
    let open = self.peek();
    let (body, end) = self.parse_block_body()?;
    let loc = open.loc.union(end);
    Ok(Node::new(loc, Stmt::Block(Node::new(loc, BlockStmt { body }))))
  }

  pub fn parse_var_decl(&mut self, export: bool) -> SyntaxResult<Node<VarDecl>> {
    let start = self.next();
    let mode = match start.typ {
      TT::KeywordVar => VarDeclMode::Var,
      TT::KeywordLet => VarDeclMode::Let,
      TT::KeywordConst => VarDeclMode::Const,
      _ => return Err(token_error(start, SyntaxErrorType::ExpectedSyntax("variable declaration"))),
    };
    let mut declarators = Vec::new();
    let mut loc = start.loc;
    loop {
      let pattern = self.parse_pat()?;
      let initializer = if self.consume_if(TT::Equals).is_some() {
        let value = self.parse_assignment()?;
        loc.extend(value.loc);
        Some(value)
      } else {
        loc.extend(pattern.loc);
        None
      };
      let declarator_loc = pattern.loc;
      declarators.push(Node::new(declarator_loc, VarDeclarator {
        pattern,
        initializer,
      }));
      if self.consume_if(TT::Comma).is_none() {
        break;
      }
    }
    Ok(Node::new(loc, VarDecl {
      export,
      mode,
      declarators,
    }))
  }

  pub fn parse_func_decl(
    &mut self,
    export: bool,
    export_default: bool,
    is_async: bool,
  ) -> SyntaxResult<Node<FuncDecl>> {
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
    Ok(Node::new(loc, FuncDecl {
      export,
      export_default,
      name,
      func,
    }))
  }

  pub fn parse_class_decl(
    &mut self,
    export: bool,
    export_default: bool,
  ) -> SyntaxResult<Node<ClassDecl>> {
    let (loc, name, extends, members) = self.parse_class_parts()?;
    Ok(Node::new(loc, ClassDecl {
      export,
      export_default,
      name,
      extends,
      members,
    }))
  }

  /// Shared by class declarations and class expressions: everything from the
  /// `class` keyword through the closing brace.
  pub fn parse_class_parts(
    &mut self,
  ) -> SyntaxResult<(
    Loc,
    Option<Node<ClassOrFuncName>>,
    Option<Node<Expr>>,
    Vec<Node<ClassMember>>,
  )> {
    let start = self.consume(TT::KeywordClass)?;
    let name = if self.peek().typ == TT::Identifier {
      let token = self.next();
      Some(Node::new(token.loc, ClassOrFuncName {
        name: self.str(token.loc).to_string(),
        symbol: None,
      }))
    } else {
      None
    };
    let extends = if self.consume_if(TT::KeywordExtends).is_some() {
      Some(self.parse_assignment()?)
    } else {
      None
    };
    self.consume(TT::BraceOpen)?;
    let mut members = Vec::new();
    let end = loop {
      if let Some(close) = self.consume_if(TT::BraceClose) {
        break close.loc;
      }
      if self.consume_if(TT::Semicolon).is_some() {
        continue;
      }
      members.push(self.parse_class_member()?);
    };
    Ok((start.loc.union(end), name, extends, members))
  }

  fn parse_class_member(&mut self) -> SyntaxResult<Node<ClassMember>> {
    let start = self.peek();
    let mut is_static = false;
    if self.peek_is_contextual("static") {
      let checkpoint = self.checkpoint();
      self.next();
      if matches!(self.peek().typ, TT::ParenthesisOpen | TT::Equals) {
        // `static` is the member name here.
        self.restore_checkpoint(checkpoint);
      } else {
        is_static = true;
      }
    }

    for (text, kind) in [("get", MethodKind::Getter), ("set", MethodKind::Setter)] {
      if self.peek_is_contextual(text) {
        let checkpoint = self.checkpoint();
        self.next();
        if !matches!(self.peek().typ, TT::ParenthesisOpen | TT::Equals | TT::Semicolon | TT::BraceClose)
        {
          let key = self.parse_prop_key()?;
          let params = self.parse_params()?;
          let (body, end) = self.parse_block_body()?;
          let loc = start.loc.union(end);
          let func = Node::new(loc, Func {
            params,
            body,
            is_async: false,
            is_generator: false,
          });
          return Ok(Node::new(loc, ClassMember {
            is_static,
            key,
            value: ClassMemberValue::Method(kind, func),
          }));
        }
        self.restore_checkpoint(checkpoint);
      }
    }

    let mut is_async = false;
    if self.peek_is_contextual("async") {
      let checkpoint = self.checkpoint();
      self.next();
      if matches!(self.peek().typ, TT::ParenthesisOpen | TT::Equals | TT::Semicolon) {
        self.restore_checkpoint(checkpoint);
      } else {
        is_async = true;
      }
    }
    let is_generator = self.consume_if(TT::Asterisk).is_some();

    let key = self.parse_prop_key()?;
    let token = self.peek();
    match token.typ {
      TT::ParenthesisOpen => {
        let params = self.parse_params()?;
        let (body, end) = self.parse_block_body()?;
        let loc = start.loc.union(end);
        let func = Node::new(loc, Func {
          params,
          body,
          is_async,
          is_generator,
        });
        Ok(Node::new(loc, ClassMember {
          is_static,
          key,
          value: ClassMemberValue::Method(MethodKind::Method, func),
        }))
      }
      TT::Equals => {
        self.next();
        let value = self.parse_assignment()?;
        self.consume_semicolon()?;
        let loc = start.loc.union(value.loc);
        Ok(Node::new(loc, ClassMember {
          is_static,
          key,
          value: ClassMemberValue::Field(Some(value)),
        }))
      }
      _ => {
        self.consume_semicolon()?;
        Ok(Node::new(start.loc, ClassMember {
          is_static,
          key,
          value: ClassMemberValue::Field(None),
        }))
      }
    }
  }

  fn parse_if(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordIf)?;
    self.consume(TT::ParenthesisOpen)?;
    let test = self.parse_expr()?;
    self.consume(TT::ParenthesisClose)?;
    let consequent = self.parse_stmt()?;
    let mut loc = start.loc.union(consequent.loc);
    let alternate = if self.consume_if(TT::KeywordElse).is_some() {
      let stmt = self.parse_stmt()?;
      loc.extend(stmt.loc);
      Some(stmt)
    } else {
      None
    };
    Ok(Node::new(
      loc,
      Stmt::If(Node::new(loc, IfStmt {
        test,
        consequent,
        alternate,
      })),
    ))
  }

  fn parse_while(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordWhile)?;
    self.consume(TT::ParenthesisOpen)?;
    let condition = self.parse_expr()?;
    self.consume(TT::ParenthesisClose)?;
    let body = self.parse_stmt()?;
    let loc = start.loc.union(body.loc);
    Ok(Node::new(loc, Stmt::While(Node::new(loc, WhileStmt { condition, body }))))
  }

  fn parse_do_while(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordDo)?;
    let body = self.parse_stmt()?;
    self.consume(TT::KeywordWhile)?;
    self.consume(TT::ParenthesisOpen)?;
    let condition = self.parse_expr()?;
    let end = self.consume(TT::ParenthesisClose)?;
    self.consume_semicolon()?;
    let loc = start.loc.union(end.loc);
    Ok(Node::new(
      loc,
      Stmt::DoWhile(Node::new(loc, DoWhileStmt { body, condition })),
    ))
  }

  fn parse_for(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordFor)?;
    self.consume(TT::ParenthesisOpen)?;

    let token = self.peek();
    // Declared left-hand side: `for (let x ...`.
    if matches!(token.typ, TT::KeywordVar | TT::KeywordLet | TT::KeywordConst) {
      let mode = match token.typ {
        TT::KeywordVar => VarDeclMode::Var,
        TT::KeywordLet => VarDeclMode::Let,
        _ => VarDeclMode::Const,
      };
      self.next();
      let pat = self.parse_pat()?;
      if self.peek().typ == TT::KeywordIn || self.peek_is_contextual("of") {
        let of = self.peek().typ != TT::KeywordIn;
        self.next();
        return self.finish_for_in_of(start.loc, Some(mode), pat, of);
      }
      // Rebuild the remainder of a triple `for` with a declaration init.
      let mut declarators = Vec::new();
      let initializer = if self.consume_if(TT::Equals).is_some() {
        Some(self.parse_assignment_with_in(false)?)
      } else {
        None
      };
      let declarator_loc = pat.loc;
      declarators.push(Node::new(declarator_loc, VarDeclarator {
        pattern: pat,
        initializer,
      }));
      while self.consume_if(TT::Comma).is_some() {
        let pattern = self.parse_pat()?;
        let initializer = if self.consume_if(TT::Equals).is_some() {
          Some(self.parse_assignment_with_in(false)?)
        } else {
          None
        };
        let declarator_loc = pattern.loc;
        declarators.push(Node::new(declarator_loc, VarDeclarator {
          pattern,
          initializer,
        }));
      }
      let decl = Node::new(token.loc, VarDecl {
        export: false,
        mode,
        declarators,
      });
      return self.finish_for_triple(start.loc, ForInit::Decl(decl));
    }

    if self.peek().typ == TT::Semicolon {
      return self.finish_for_triple(start.loc, ForInit::None);
    }

    let init = self.parse_expr_with_in(false)?;
    if self.peek().typ == TT::KeywordIn || self.peek_is_contextual("of") {
      let of = self.peek().typ != TT::KeywordIn;
      self.next();
      let pat = expr_to_pat(init)?;
      return self.finish_for_in_of(start.loc, None, pat, of);
    }
    self.finish_for_triple(start.loc, ForInit::Expr(init))
  }

  fn finish_for_triple(&mut self, start: Loc, init: ForInit) -> SyntaxResult<Node<Stmt>> {
    self.consume(TT::Semicolon)?;
    let cond = if self.peek().typ == TT::Semicolon {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.consume(TT::Semicolon)?;
    let post = if self.peek().typ == TT::ParenthesisClose {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.consume(TT::ParenthesisClose)?;
    let body = self.parse_stmt()?;
    let loc = start.union(body.loc);
    Ok(Node::new(
      loc,
      Stmt::For(Node::new(loc, ForStmt {
        init,
        cond,
        post,
        body,
      })),
    ))
  }

  fn finish_for_in_of(
    &mut self,
    start: Loc,
    decl_mode: Option<VarDeclMode>,
    pat: Node<Pat>,
    of: bool,
  ) -> SyntaxResult<Node<Stmt>> {
    let rhs = self.parse_expr()?;
    self.consume(TT::ParenthesisClose)?;
    let body = self.parse_stmt()?;
    let loc = start.union(body.loc);
    Ok(Node::new(
      loc,
      Stmt::ForInOf(Node::new(loc, ForInOfStmt {
        decl_mode,
        pat,
        of,
        rhs,
        body,
      })),
    ))
  }

  fn parse_switch(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordSwitch)?;
    self.consume(TT::ParenthesisOpen)?;
    let subject = self.parse_expr()?;
    self.consume(TT::ParenthesisClose)?;
    self.consume(TT::BraceOpen)?;
    let mut cases = Vec::new();
    let end = loop {
      let token = self.next();
      match token.typ {
        TT::BraceClose => break token.loc,
        TT::KeywordCase | TT::KeywordDefault => {
          let test = if token.typ == TT::KeywordCase {
            Some(self.parse_expr()?)
          } else {
            None
          };
          self.consume(TT::Colon)?;
          let mut body = Vec::new();
          while !matches!(
            self.peek().typ,
            TT::KeywordCase | TT::KeywordDefault | TT::BraceClose
          ) {
            body.push(self.parse_stmt()?);
          }
          cases.push(Node::new(token.loc, SwitchCase { test, body }));
        }
        _ => return Err(token_error(token, SyntaxErrorType::ExpectedSyntax("case or default"))),
      }
    };
    let loc = start.loc.union(end);
    Ok(Node::new(loc, Stmt::Switch(Node::new(loc, SwitchStmt { subject, cases }))))
  }

  fn parse_try(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordTry)?;
    let open = self.peek();
    let (body, block_end) = self.parse_block_body()?;
    let block = Node::new(open.loc.union(block_end), BlockStmt { body });
    let mut loc = start.loc.union(block_end);

    let catch = if self.consume_if(TT::KeywordCatch).is_some() {
      let param = if self.consume_if(TT::ParenthesisOpen).is_some() {
        let pat = self.parse_pat()?;
        self.consume(TT::ParenthesisClose)?;
        Some(pat)
      } else {
        None
      };
      let (body, end) = self.parse_block_body()?;
      loc.extend(end);
      Some(Node::new(end, CatchClause { param, body }))
    } else {
      None
    };

    let finally = if self.consume_if(TT::KeywordFinally).is_some() {
      let open = self.peek();
      let (body, end) = self.parse_block_body()?;
      loc.extend(end);
      Some(Node::new(open.loc.union(end), BlockStmt { body }))
    } else {
      None
    };

    if catch.is_none() && finally.is_none() {
      return Err(loc.error(SyntaxErrorType::TryStatementHasNoCatchOrFinally, None));
    }
    Ok(Node::new(
      loc,
      Stmt::Try(Node::new(loc, TryStmt {
        block,
        catch,
        finally,
      })),
    ))
  }

  fn parse_throw(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordThrow)?;
    let value = self.parse_expr()?;
    self.consume_semicolon()?;
    let loc = start.loc.union(value.loc);
    Ok(Node::new(loc, Stmt::Throw(Node::new(loc, ThrowStmt { value }))))
  }

  fn parse_return(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordReturn)?;
    let token = self.peek();
    let value = if token.preceded_by_line_terminator
      || matches!(token.typ, TT::Semicolon | TT::BraceClose | TT::EOF)
    {
      None
    } else {
      Some(self.parse_expr()?)
    };
    self.consume_semicolon()?;
    let loc = value
      .as_ref()
      .map(|value| start.loc.union(value.loc))
      .unwrap_or(start.loc);
    Ok(Node::new(loc, Stmt::Return(Node::new(loc, ReturnStmt { value }))))
  }

  fn parse_break_continue(&mut self, is_break: bool) -> SyntaxResult<Node<Stmt>> {
    let start = self.next();
    let token = self.peek();
    let label = if token.typ == TT::Identifier && !token.preceded_by_line_terminator {
      self.next();
      Some(self.str(token.loc).to_string())
    } else {
      None
    };
    self.consume_semicolon()?;
    let stmt = if is_break {
      Stmt::Break(Node::new(start.loc, BreakStmt { label }))
    } else {
      Stmt::Continue(Node::new(start.loc, ContinueStmt { label }))
    };
    Ok(Node::new(start.loc, stmt))
  }

  pub fn parse_pat(&mut self) -> SyntaxResult<Node<Pat>> {
    let token = self.peek();
    match token.typ {
      TT::Identifier => {
        self.next();
        Ok(Node::new(token.loc, Pat::Id(Node::new(
          token.loc,
          IdPat::new(self.str(token.loc)),
        ))))
      }
      TT::BracketOpen => self.parse_array_pat(),
      TT::BraceOpen => self.parse_object_pat(),
      _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax("binding pattern"))),
    }
  }

  fn parse_array_pat(&mut self) -> SyntaxResult<Node<Pat>> {
    let open = self.consume(TT::BracketOpen)?;
    let mut elements = Vec::new();
    let mut rest = None;
    let close = loop {
      if let Some(close) = self.consume_if(TT::BracketClose) {
        break close;
      }
      if self.peek().typ == TT::Comma {
        self.next();
        elements.push(None);
        continue;
      }
      if self.consume_if(TT::DotDotDot).is_some() {
        rest = Some(self.parse_pat()?);
        break self.consume(TT::BracketClose)?;
      }
      let target = self.parse_pat()?;
      let default = if self.consume_if(TT::Equals).is_some() {
        Some(self.parse_assignment()?)
      } else {
        None
      };
      let loc = target.loc;
      elements.push(Some(Node::new(loc, ArrayPatElem { target, default })));
      if self.consume_if(TT::Comma).is_none() {
        break self.consume(TT::BracketClose)?;
      }
    };
    let loc = open.loc.union(close.loc);
    Ok(Node::new(loc, Pat::Array(Node::new(loc, ArrayPat { elements, rest }))))
  }

  fn parse_object_pat(&mut self) -> SyntaxResult<Node<Pat>> {
    let open = self.consume(TT::BraceOpen)?;
    let mut properties = Vec::new();
    let mut rest = None;
    let close = loop {
      if let Some(close) = self.consume_if(TT::BraceClose) {
        break close;
      }
      if self.consume_if(TT::DotDotDot).is_some() {
        let token = self.consume(TT::Identifier)?;
        rest = Some(Node::new(token.loc, IdPat::new(self.str(token.loc))));
        break self.consume(TT::BraceClose)?;
      }
      let key_token = self.next();
      let key = self.str(key_token.loc).to_string();
      let (target, shorthand) = if self.consume_if(TT::Colon).is_some() {
        (self.parse_pat()?, false)
      } else {
        let pat = Node::new(key_token.loc, Pat::Id(Node::new(
          key_token.loc,
          IdPat::new(key.clone()),
        )));
        (pat, true)
      };
      let default = if self.consume_if(TT::Equals).is_some() {
        Some(self.parse_assignment()?)
      } else {
        None
      };
      let loc = key_token.loc.union(target.loc);
      properties.push(Node::new(loc, ObjectPatProp {
        key,
        target,
        default,
        shorthand,
      }));
      if self.consume_if(TT::Comma).is_none() {
        break self.consume(TT::BraceClose)?;
      }
    };
    let loc = open.loc.union(close.loc);
    Ok(Node::new(
      loc,
      Pat::Object(Node::new(loc, ObjectPat { properties, rest })),
    ))
  }
}

fn expr_to_pat(expr: Node<Expr>) -> SyntaxResult<Node<Pat>> {
  let loc = expr.loc;
  match *expr.stx {
    Expr::Id(id) => {
      let name = id.stx.name.clone();
      Ok(Node::new(loc, Pat::Id(Node::new(loc, IdPat::new(name)))))
    }
    _ => Err(loc.error(SyntaxErrorType::InvalidAssignmentTarget, None)),
  }
}
