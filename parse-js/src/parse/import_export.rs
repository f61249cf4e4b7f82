use super::expr::decode_string;
use super::token_error;
use super::Parser;
use crate::ast::import_export::ExportAllStmt;
use crate::ast::import_export::ExportDefaultStmt;
use crate::ast::import_export::ExportName;
use crate::ast::import_export::ExportNamedStmt;
use crate::ast::import_export::ImportName;
use crate::ast::import_export::ImportNames;
use crate::ast::import_export::ImportStmt;
use crate::ast::node::Node;
use crate::ast::pat::IdPat;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_id_start;
use crate::token::Token;
use crate::token::TT;

impl<'a> Parser<'a> {
  fn parse_module_specifier(&mut self) -> SyntaxResult<String> {
    let token = self.consume(TT::LiteralString)?;
    decode_string(self.str(token.loc))
      .ok_or_else(|| token.loc.error(SyntaxErrorType::InvalidCharacterEscape, None))
  }

  // Module export/import names may be any identifier-like word (`default`
  // included); only binding aliases are restricted to identifiers.
  fn parse_name_like(&mut self) -> SyntaxResult<(Token, String)> {
    let token = self.next();
    let text = self.str(token.loc);
    if token.typ != TT::Identifier
      && !text.chars().next().is_some_and(is_id_start)
    {
      return Err(token_error(token, SyntaxErrorType::ExpectedSyntax("name")));
    }
    Ok((token, text.to_string()))
  }

  fn parse_binding_ident(&mut self) -> SyntaxResult<Node<IdPat>> {
    let token = self.consume(TT::Identifier)?;
    Ok(Node::new(token.loc, IdPat::new(self.str(token.loc))))
  }

  pub fn parse_import(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordImport)?;

    // `import "module"`, evaluated for side effects only.
    if self.peek().typ == TT::LiteralString {
      let module = self.parse_module_specifier()?;
      self.consume_semicolon()?;
      let loc = start.loc;
      return Ok(Node::new(loc, Stmt::Import(Node::new(loc, ImportStmt {
        default: None,
        names: None,
        module,
      }))));
    }

    let mut default = None;
    let mut names = None;

    if self.peek().typ == TT::Identifier {
      default = Some(self.parse_binding_ident()?);
    }

    if default.is_none() || self.consume_if(TT::Comma).is_some() {
      match self.peek().typ {
        TT::Asterisk => {
          self.next();
          self.consume_contextual("as")?;
          names = Some(ImportNames::All(self.parse_binding_ident()?));
        }
        TT::BraceOpen => {
          self.next();
          let mut specific = Vec::new();
          loop {
            if self.consume_if(TT::BraceClose).is_some() {
              break;
            }
            let (token, importable) = self.parse_name_like()?;
            let alias = if self.peek_is_contextual("as") {
              self.next();
              self.parse_binding_ident()?
            } else {
              Node::new(token.loc, IdPat::new(importable.clone()))
            };
            let loc = token.loc.union(alias.loc);
            specific.push(Node::new(loc, ImportName { importable, alias }));
            if self.consume_if(TT::Comma).is_none() {
              self.consume(TT::BraceClose)?;
              break;
            }
          }
          names = Some(ImportNames::Specific(specific));
        }
        _ if default.is_some() => {}
        _ => {
          let token = self.peek();
          return Err(token_error(token, SyntaxErrorType::ExpectedSyntax("import bindings")));
        }
      }
    }

    self.consume_contextual("from")?;
    let module = self.parse_module_specifier()?;
    self.consume_semicolon()?;
    let loc = start.loc;
    Ok(Node::new(loc, Stmt::Import(Node::new(loc, ImportStmt {
      default,
      names,
      module,
    }))))
  }

  pub fn parse_export(&mut self) -> SyntaxResult<Node<Stmt>> {
    let start = self.consume(TT::KeywordExport)?;
    let token = self.peek();
    match token.typ {
      // `export * from "m"` / `export * as ns from "m"`.
      TT::Asterisk => {
        self.next();
        let alias = if self.peek_is_contextual("as") {
          self.next();
          let (_, name) = self.parse_name_like()?;
          Some(name)
        } else {
          None
        };
        self.consume_contextual("from")?;
        let module = self.parse_module_specifier()?;
        self.consume_semicolon()?;
        let loc = start.loc;
        Ok(Node::new(loc, Stmt::ExportAll(Node::new(loc, ExportAllStmt {
          alias,
          module,
        }))))
      }
      // `export {a, b as c}` / `export {a} from "m"`.
      TT::BraceOpen => {
        self.next();
        let mut names = Vec::new();
        loop {
          if self.consume_if(TT::BraceClose).is_some() {
            break;
          }
          let (target_token, target) = self.parse_name_like()?;
          let alias = if self.peek_is_contextual("as") {
            self.next();
            let (_, alias) = self.parse_name_like()?;
            alias
          } else {
            target.clone()
          };
          names.push(Node::new(target_token.loc, ExportName {
            target,
            alias,
            symbol: None,
          }));
          if self.consume_if(TT::Comma).is_none() {
            self.consume(TT::BraceClose)?;
            break;
          }
        }
        let from = if self.peek_is_contextual("from") {
          self.next();
          Some(self.parse_module_specifier()?)
        } else {
          None
        };
        self.consume_semicolon()?;
        let loc = start.loc;
        Ok(Node::new(loc, Stmt::ExportNamed(Node::new(loc, ExportNamedStmt {
          names,
          from,
        }))))
      }
      TT::KeywordDefault => {
        self.next();
        match self.peek().typ {
          TT::KeywordFunction => {
            Ok(self.parse_func_decl(false, true, false)?.wrap(Stmt::Func))
          }
          TT::KeywordClass => Ok(self.parse_class_decl(false, true)?.wrap(Stmt::Class)),
          TT::Identifier if self.peek_is_contextual("async") => {
            let checkpoint = self.checkpoint();
            self.next();
            let after = self.peek();
            if after.typ == TT::KeywordFunction && !after.preceded_by_line_terminator {
              return Ok(self.parse_func_decl(false, true, true)?.wrap(Stmt::Func));
            }
            self.restore_checkpoint(checkpoint);
            let expr = self.parse_assignment()?;
            self.consume_semicolon()?;
            let loc = start.loc.union(expr.loc);
            Ok(Node::new(loc, Stmt::ExportDefault(Node::new(loc, ExportDefaultStmt { expr }))))
          }
          _ => {
            let expr = self.parse_assignment()?;
            self.consume_semicolon()?;
            let loc = start.loc.union(expr.loc);
            Ok(Node::new(loc, Stmt::ExportDefault(Node::new(loc, ExportDefaultStmt { expr }))))
          }
        }
      }
      TT::KeywordVar | TT::KeywordLet | TT::KeywordConst => {
        let decl = self.parse_var_decl(true)?;
        self.consume_semicolon()?;
        Ok(decl.wrap(Stmt::Var))
      }
      TT::KeywordFunction => Ok(self.parse_func_decl(true, false, false)?.wrap(Stmt::Func)),
      TT::KeywordClass => Ok(self.parse_class_decl(true, false)?.wrap(Stmt::Class)),
      TT::Identifier if self.str(token.loc) == "async" => {
        self.next();
        Ok(self.parse_func_decl(true, false, true)?.wrap(Stmt::Func))
      }
      _ => Err(token_error(token, SyntaxErrorType::ExpectedSyntax("export declaration"))),
    }
  }
}
