//! Module-scope symbol analysis.
//!
//! Two phases per scope, mirroring how declarations actually behave: first
//! every binding the scope introduces is declared (with `var` hoisting
//! through nested blocks to the enclosing function), then references are
//! resolved innermost-scope-first. Binding sites (`IdPat`,
//! `ClassOrFuncName`) and reference sites (`IdExpr`, shorthand object
//! members, `export {name}`) get their `symbol` field filled in; a reference
//! that resolves to nothing is free, and free references to `require`,
//! `module`, and `exports` are what classifies a module as CommonJS-style.

use crate::ast::expr::ArrayLitElem;
use crate::ast::expr::ArrowFuncBody;
use crate::ast::expr::Expr;
use crate::ast::expr::Func;
use crate::ast::expr::ObjectMember;
use crate::ast::expr::ObjectPropValue;
use crate::ast::expr::PropKey;
use crate::ast::expr::TemplatePart;
use crate::ast::node::Node;
use crate::ast::pat::Pat;
use crate::ast::stmt::ClassMemberValue;
use crate::ast::stmt::ForInit;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::VarDeclMode;
use crate::ast::stx::TopLevel;
use ahash::HashMap;
use ahash::HashMapExt;

/// Opaque handle to one declared binding within one module.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct SymbolId(pub u32);

#[derive(Clone, Debug)]
pub struct SymbolData {
  pub name: String,
}

/// Free references to the CommonJS ambient names.
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
pub struct FreeRefs {
  pub require: bool,
  pub module: bool,
  pub exports: bool,
}

impl FreeRefs {
  pub fn any(&self) -> bool {
    self.require || self.module || self.exports
  }
}

/// The result of symbol analysis over one module.
#[derive(Clone, Debug, Default)]
pub struct ModuleScopes {
  symbols: Vec<SymbolData>,
  // Top-level bindings in declaration order.
  pub top_level: Vec<SymbolId>,
  top_level_by_name: HashMap<String, SymbolId>,
  pub free_refs: FreeRefs,
}

impl ModuleScopes {
  pub fn symbol_name(&self, id: SymbolId) -> &str {
    &self.symbols[id.0 as usize].name
  }

  pub fn top_level_symbol(&self, name: &str) -> Option<SymbolId> {
    self.top_level_by_name.get(name).copied()
  }

  fn new_symbol(&mut self, name: &str) -> SymbolId {
    let id = SymbolId(self.symbols.len() as u32);
    self.symbols.push(SymbolData { name: name.to_string() });
    id
  }
}

struct Frame {
  bindings: HashMap<String, SymbolId>,
  is_function: bool,
}

struct Analyzer {
  scopes: ModuleScopes,
  frames: Vec<Frame>,
}

/// Runs symbol analysis over a parsed module, annotating the tree in place.
pub fn compute_module_scopes(top: &mut Node<TopLevel>) -> ModuleScopes {
  let mut analyzer = Analyzer {
    scopes: ModuleScopes::default(),
    frames: vec![Frame {
      bindings: HashMap::new(),
      is_function: true,
    }],
  };
  analyzer.analyze_stmts(&mut top.stx.body);
  analyzer.scopes
}

impl Analyzer {
  fn push_frame(&mut self, is_function: bool) {
    self.frames.push(Frame {
      bindings: HashMap::new(),
      is_function,
    });
  }

  fn pop_frame(&mut self) {
    self.frames.pop();
  }

  fn declare(&mut self, name: &str, hoist: bool) -> SymbolId {
    let frame_idx = if hoist {
      self
        .frames
        .iter()
        .rposition(|frame| frame.is_function)
        .unwrap_or(0)
    } else {
      self.frames.len() - 1
    };
    if let Some(&existing) = self.frames[frame_idx].bindings.get(name) {
      return existing;
    }
    let id = self.scopes.new_symbol(name);
    self.frames[frame_idx].bindings.insert(name.to_string(), id);
    if frame_idx == 0 {
      self.scopes.top_level.push(id);
      self.scopes.top_level_by_name.insert(name.to_string(), id);
    }
    id
  }

  fn lookup(&self, name: &str) -> Option<SymbolId> {
    self
      .frames
      .iter()
      .rev()
      .find_map(|frame| frame.bindings.get(name).copied())
  }

  fn resolve_ref(&mut self, name: &str) -> Option<SymbolId> {
    let resolved = self.lookup(name);
    if resolved.is_none() {
      match name {
        "require" => self.scopes.free_refs.require = true,
        "module" => self.scopes.free_refs.module = true,
        "exports" => self.scopes.free_refs.exports = true,
        _ => {}
      }
    }
    resolved
  }

  // Phases 1 + 2 for the statement list of one scope. The caller pushes and
  // pops the frame.
  fn analyze_stmts(&mut self, stmts: &mut [Node<Stmt>]) {
    for stmt in stmts.iter_mut() {
      self.declare_stmt(stmt);
    }
    for stmt in stmts.iter_mut() {
      self.resolve_stmt(stmt);
    }
  }

  // Declares the bindings a statement introduces into the current scope,
  // hoisting `var` declarations out of nested blocks.
  fn declare_stmt(&mut self, stmt: &mut Node<Stmt>) {
    match stmt.stx.as_mut() {
      Stmt::Var(decl) => {
        let hoist = decl.stx.mode == VarDeclMode::Var;
        for declarator in decl.stx.declarators.iter_mut() {
          self.declare_pat(&mut declarator.stx.pattern, hoist);
        }
      }
      Stmt::Func(decl) => {
        if let Some(name) = &mut decl.stx.name {
          let id = self.declare(&name.stx.name.clone(), false);
          name.stx.symbol = Some(id);
        }
      }
      Stmt::Class(decl) => {
        if let Some(name) = &mut decl.stx.name {
          let id = self.declare(&name.stx.name.clone(), false);
          name.stx.symbol = Some(id);
        }
      }
      Stmt::Import(import) => {
        if let Some(default) = &mut import.stx.default {
          let id = self.declare(&default.stx.name.clone(), false);
          default.stx.symbol = Some(id);
        }
        match &mut import.stx.names {
          Some(crate::ast::import_export::ImportNames::All(ns)) => {
            let id = self.declare(&ns.stx.name.clone(), false);
            ns.stx.symbol = Some(id);
          }
          Some(crate::ast::import_export::ImportNames::Specific(names)) => {
            for name in names.iter_mut() {
              let id = self.declare(&name.stx.alias.stx.name.clone(), false);
              name.stx.alias.stx.symbol = Some(id);
            }
          }
          None => {}
        }
      }
      // Hoist `var` out of nested statements; other bindings in there are
      // block-scoped and handled when the nested scope is analyzed.
      Stmt::Block(block) => self.hoist_vars(&mut block.stx.body),
      Stmt::If(if_stmt) => {
        self.hoist_vars_stmt(&mut if_stmt.stx.consequent);
        if let Some(alternate) = &mut if_stmt.stx.alternate {
          self.hoist_vars_stmt(alternate);
        }
      }
      Stmt::For(for_stmt) => {
        if let ForInit::Decl(decl) = &mut for_stmt.stx.init {
          if decl.stx.mode == VarDeclMode::Var {
            for declarator in decl.stx.declarators.iter_mut() {
              self.declare_pat(&mut declarator.stx.pattern, true);
            }
          }
        }
        self.hoist_vars_stmt(&mut for_stmt.stx.body);
      }
      Stmt::ForInOf(for_stmt) => {
        if for_stmt.stx.decl_mode == Some(VarDeclMode::Var) {
          self.declare_pat(&mut for_stmt.stx.pat, true);
        }
        self.hoist_vars_stmt(&mut for_stmt.stx.body);
      }
      Stmt::While(while_stmt) => self.hoist_vars_stmt(&mut while_stmt.stx.body),
      Stmt::DoWhile(do_while) => self.hoist_vars_stmt(&mut do_while.stx.body),
      Stmt::Try(try_stmt) => {
        self.hoist_vars(&mut try_stmt.stx.block.stx.body);
        if let Some(catch) = &mut try_stmt.stx.catch {
          self.hoist_vars(&mut catch.stx.body);
        }
        if let Some(finally) = &mut try_stmt.stx.finally {
          self.hoist_vars(&mut finally.stx.body);
        }
      }
      Stmt::Switch(switch) => {
        for case in switch.stx.cases.iter_mut() {
          self.hoist_vars(&mut case.stx.body);
        }
      }
      _ => {}
    }
  }

  fn hoist_vars_stmt(&mut self, stmt: &mut Node<Stmt>) {
    if let Stmt::Var(decl) = stmt.stx.as_mut() {
      if decl.stx.mode == VarDeclMode::Var {
        for declarator in decl.stx.declarators.iter_mut() {
          self.declare_pat(&mut declarator.stx.pattern, true);
        }
      }
      return;
    }
    self.hoist_only(stmt);
  }

  fn hoist_vars(&mut self, stmts: &mut [Node<Stmt>]) {
    for stmt in stmts.iter_mut() {
      self.hoist_vars_stmt(stmt);
    }
  }

  fn hoist_only(&mut self, stmt: &mut Node<Stmt>) {
    match stmt.stx.as_mut() {
      Stmt::Block(block) => self.hoist_vars(&mut block.stx.body),
      Stmt::If(if_stmt) => {
        self.hoist_vars_stmt(&mut if_stmt.stx.consequent);
        if let Some(alternate) = &mut if_stmt.stx.alternate {
          self.hoist_vars_stmt(alternate);
        }
      }
      Stmt::For(for_stmt) => {
        if let ForInit::Decl(decl) = &mut for_stmt.stx.init {
          if decl.stx.mode == VarDeclMode::Var {
            for declarator in decl.stx.declarators.iter_mut() {
              self.declare_pat(&mut declarator.stx.pattern, true);
            }
          }
        }
        self.hoist_vars_stmt(&mut for_stmt.stx.body)
      }
      Stmt::ForInOf(for_stmt) => {
        if for_stmt.stx.decl_mode == Some(VarDeclMode::Var) {
          self.declare_pat(&mut for_stmt.stx.pat, true);
        }
        self.hoist_vars_stmt(&mut for_stmt.stx.body)
      }
      Stmt::While(while_stmt) => self.hoist_vars_stmt(&mut while_stmt.stx.body),
      Stmt::DoWhile(do_while) => self.hoist_vars_stmt(&mut do_while.stx.body),
      Stmt::Try(try_stmt) => {
        self.hoist_vars(&mut try_stmt.stx.block.stx.body);
        if let Some(catch) = &mut try_stmt.stx.catch {
          self.hoist_vars(&mut catch.stx.body);
        }
        if let Some(finally) = &mut try_stmt.stx.finally {
          self.hoist_vars(&mut finally.stx.body);
        }
      }
      Stmt::Switch(switch) => {
        for case in switch.stx.cases.iter_mut() {
          self.hoist_vars(&mut case.stx.body);
        }
      }
      _ => {}
    }
  }

  fn declare_pat(&mut self, pat: &mut Node<Pat>, hoist: bool) {
    match pat.stx.as_mut() {
      Pat::Id(id) => {
        let symbol = self.declare(&id.stx.name.clone(), hoist);
        id.stx.symbol = Some(symbol);
      }
      Pat::Array(array) => {
        for element in array.stx.elements.iter_mut().flatten() {
          self.declare_pat(&mut element.stx.target, hoist);
        }
        if let Some(rest) = &mut array.stx.rest {
          self.declare_pat(rest, hoist);
        }
      }
      Pat::Object(object) => {
        for property in object.stx.properties.iter_mut() {
          self.declare_pat(&mut property.stx.target, hoist);
        }
        if let Some(rest) = &mut object.stx.rest {
          let symbol = self.declare(&rest.stx.name.clone(), hoist);
          rest.stx.symbol = Some(symbol);
        }
      }
    }
  }

  fn resolve_stmt(&mut self, stmt: &mut Node<Stmt>) {
    match stmt.stx.as_mut() {
      Stmt::Block(block) => {
        self.push_frame(false);
        self.analyze_stmts(&mut block.stx.body);
        self.pop_frame();
      }
      Stmt::Var(decl) => {
        for declarator in decl.stx.declarators.iter_mut() {
          self.resolve_pat_defaults(&mut declarator.stx.pattern);
          if let Some(initializer) = &mut declarator.stx.initializer {
            self.resolve_expr(initializer);
          }
        }
      }
      Stmt::Func(decl) => {
        self.analyze_func(&mut decl.stx.func);
      }
      Stmt::Class(decl) => {
        if let Some(extends) = &mut decl.stx.extends {
          self.resolve_expr(extends);
        }
        for member in decl.stx.members.iter_mut() {
          self.resolve_class_member_parts(member);
        }
      }
      Stmt::Expr(expr_stmt) => self.resolve_expr(&mut expr_stmt.stx.expr),
      Stmt::If(if_stmt) => {
        self.resolve_expr(&mut if_stmt.stx.test);
        self.resolve_nested_stmt(&mut if_stmt.stx.consequent);
        if let Some(alternate) = &mut if_stmt.stx.alternate {
          self.resolve_nested_stmt(alternate);
        }
      }
      Stmt::For(for_stmt) => {
        self.push_frame(false);
        match &mut for_stmt.stx.init {
          ForInit::Decl(decl) => {
            let hoist = decl.stx.mode == VarDeclMode::Var;
            for declarator in decl.stx.declarators.iter_mut() {
              if !hoist {
                self.declare_pat(&mut declarator.stx.pattern, false);
              }
              self.resolve_pat_defaults(&mut declarator.stx.pattern);
              if let Some(initializer) = &mut declarator.stx.initializer {
                self.resolve_expr(initializer);
              }
            }
          }
          ForInit::Expr(expr) => self.resolve_expr(expr),
          ForInit::None => {}
        }
        if let Some(cond) = &mut for_stmt.stx.cond {
          self.resolve_expr(cond);
        }
        if let Some(post) = &mut for_stmt.stx.post {
          self.resolve_expr(post);
        }
        self.resolve_nested_stmt(&mut for_stmt.stx.body);
        self.pop_frame();
      }
      Stmt::ForInOf(for_stmt) => {
        self.push_frame(false);
        match for_stmt.stx.decl_mode {
          Some(VarDeclMode::Var) => self.resolve_pat_defaults(&mut for_stmt.stx.pat),
          Some(_) => {
            self.declare_pat(&mut for_stmt.stx.pat, false);
            self.resolve_pat_defaults(&mut for_stmt.stx.pat);
          }
          None => self.resolve_pat_as_refs(&mut for_stmt.stx.pat),
        }
        self.resolve_expr(&mut for_stmt.stx.rhs);
        self.resolve_nested_stmt(&mut for_stmt.stx.body);
        self.pop_frame();
      }
      Stmt::While(while_stmt) => {
        self.resolve_expr(&mut while_stmt.stx.condition);
        self.resolve_nested_stmt(&mut while_stmt.stx.body);
      }
      Stmt::DoWhile(do_while) => {
        self.resolve_nested_stmt(&mut do_while.stx.body);
        self.resolve_expr(&mut do_while.stx.condition);
      }
      Stmt::Return(return_stmt) => {
        if let Some(value) = &mut return_stmt.stx.value {
          self.resolve_expr(value);
        }
      }
      Stmt::Throw(throw_stmt) => self.resolve_expr(&mut throw_stmt.stx.value),
      Stmt::Switch(switch) => {
        self.resolve_expr(&mut switch.stx.subject);
        self.push_frame(false);
        for case in switch.stx.cases.iter_mut() {
          if let Some(test) = &mut case.stx.test {
            self.resolve_expr(test);
          }
          self.analyze_stmts(&mut case.stx.body);
        }
        self.pop_frame();
      }
      Stmt::Try(try_stmt) => {
        self.push_frame(false);
        self.analyze_stmts(&mut try_stmt.stx.block.stx.body);
        self.pop_frame();
        if let Some(catch) = &mut try_stmt.stx.catch {
          self.push_frame(false);
          if let Some(param) = &mut catch.stx.param {
            self.declare_pat(param, false);
            self.resolve_pat_defaults(param);
          }
          self.analyze_stmts(&mut catch.stx.body);
          self.pop_frame();
        }
        if let Some(finally) = &mut try_stmt.stx.finally {
          self.push_frame(false);
          self.analyze_stmts(&mut finally.stx.body);
          self.pop_frame();
        }
      }
      Stmt::ExportDefault(export) => self.resolve_expr(&mut export.stx.expr),
      Stmt::ExportNamed(export) => {
        if export.stx.from.is_none() {
          for name in export.stx.names.iter_mut() {
            name.stx.symbol = self.resolve_ref(&name.stx.target.clone());
          }
        }
      }
      Stmt::Break(_)
      | Stmt::Continue(_)
      | Stmt::Empty(_)
      | Stmt::ExportAll(_)
      | Stmt::Import(_) => {}
    }
  }

  // A statement in single-statement position (`if (x) stmt;`) gets its own
  // block scope only if it is a block.
  fn resolve_nested_stmt(&mut self, stmt: &mut Node<Stmt>) {
    self.resolve_stmt(stmt);
  }

  fn analyze_func(&mut self, func: &mut Node<Func>) {
    self.push_frame(true);
    for param in func.stx.params.iter_mut() {
      self.declare_pat(&mut param.stx.pattern, false);
    }
    for param in func.stx.params.iter_mut() {
      self.resolve_pat_defaults(&mut param.stx.pattern);
      if let Some(default) = &mut param.stx.default {
        self.resolve_expr(default);
      }
    }
    self.analyze_stmts(&mut func.stx.body);
    self.pop_frame();
  }

  fn resolve_class_member_parts(&mut self, member: &mut Node<crate::ast::stmt::ClassMember>) {
    if let PropKey::Computed(expr) = &mut member.stx.key {
      self.resolve_expr(expr);
    }
    match &mut member.stx.value {
      ClassMemberValue::Field(Some(value)) => self.resolve_expr(value),
      ClassMemberValue::Field(None) => {}
      ClassMemberValue::Method(_, func) => self.analyze_func(func),
    }
  }

  // Defaults nested inside binding patterns are ordinary expressions.
  fn resolve_pat_defaults(&mut self, pat: &mut Node<Pat>) {
    match pat.stx.as_mut() {
      Pat::Id(_) => {}
      Pat::Array(array) => {
        for element in array.stx.elements.iter_mut().flatten() {
          self.resolve_pat_defaults(&mut element.stx.target);
          if let Some(default) = &mut element.stx.default {
            self.resolve_expr(default);
          }
        }
        if let Some(rest) = &mut array.stx.rest {
          self.resolve_pat_defaults(rest);
        }
      }
      Pat::Object(object) => {
        for property in object.stx.properties.iter_mut() {
          self.resolve_pat_defaults(&mut property.stx.target);
          if let Some(default) = &mut property.stx.default {
            self.resolve_expr(default);
          }
        }
      }
    }
  }

  // A pattern used as an assignment target (`for (x of xs)`) references
  // existing bindings instead of declaring new ones.
  fn resolve_pat_as_refs(&mut self, pat: &mut Node<Pat>) {
    match pat.stx.as_mut() {
      Pat::Id(id) => {
        id.stx.symbol = self.resolve_ref(&id.stx.name.clone());
      }
      Pat::Array(array) => {
        for element in array.stx.elements.iter_mut().flatten() {
          self.resolve_pat_as_refs(&mut element.stx.target);
          if let Some(default) = &mut element.stx.default {
            self.resolve_expr(default);
          }
        }
        if let Some(rest) = &mut array.stx.rest {
          self.resolve_pat_as_refs(rest);
        }
      }
      Pat::Object(object) => {
        for property in object.stx.properties.iter_mut() {
          self.resolve_pat_as_refs(&mut property.stx.target);
          if let Some(default) = &mut property.stx.default {
            self.resolve_expr(default);
          }
        }
        if let Some(rest) = &mut object.stx.rest {
          rest.stx.symbol = self.resolve_ref(&rest.stx.name.clone());
        }
      }
    }
  }

  fn resolve_expr(&mut self, expr: &mut Node<Expr>) {
    match expr.stx.as_mut() {
      Expr::Id(id) => {
        id.stx.symbol = self.resolve_ref(&id.stx.name.clone());
      }
      Expr::Arrow(arrow) => {
        self.push_frame(true);
        for param in arrow.stx.params.iter_mut() {
          self.declare_pat(&mut param.stx.pattern, false);
        }
        for param in arrow.stx.params.iter_mut() {
          self.resolve_pat_defaults(&mut param.stx.pattern);
          if let Some(default) = &mut param.stx.default {
            self.resolve_expr(default);
          }
        }
        match &mut arrow.stx.body {
          ArrowFuncBody::Block(body) => self.analyze_stmts(body),
          ArrowFuncBody::Expr(body) => self.resolve_expr(body),
        }
        self.pop_frame();
      }
      Expr::Assign(assign) => {
        self.resolve_expr(&mut assign.stx.target);
        self.resolve_expr(&mut assign.stx.value);
      }
      Expr::Binary(binary) => {
        self.resolve_expr(&mut binary.stx.left);
        self.resolve_expr(&mut binary.stx.right);
      }
      Expr::Call(call) => {
        self.resolve_expr(&mut call.stx.callee);
        for arg in call.stx.args.iter_mut() {
          self.resolve_expr(&mut arg.stx.value);
        }
      }
      Expr::Class(class) => {
        self.push_frame(false);
        if let Some(name) = &mut class.stx.name {
          let id = self.declare(&name.stx.name.clone(), false);
          name.stx.symbol = Some(id);
        }
        if let Some(extends) = &mut class.stx.extends {
          self.resolve_expr(extends);
        }
        for member in class.stx.members.iter_mut() {
          if let PropKey::Computed(key) = &mut member.stx.key {
            self.resolve_expr(key);
          }
          match &mut member.stx.value {
            ClassMemberValue::Field(Some(value)) => self.resolve_expr(value),
            ClassMemberValue::Field(None) => {}
            ClassMemberValue::Method(_, func) => self.analyze_func(func),
          }
        }
        self.pop_frame();
      }
      Expr::Cond(cond) => {
        self.resolve_expr(&mut cond.stx.test);
        self.resolve_expr(&mut cond.stx.consequent);
        self.resolve_expr(&mut cond.stx.alternate);
      }
      Expr::Func(func_expr) => {
        self.push_frame(false);
        if let Some(name) = &mut func_expr.stx.name {
          let id = self.declare(&name.stx.name.clone(), false);
          name.stx.symbol = Some(id);
        }
        self.analyze_func(&mut func_expr.stx.func);
        self.pop_frame();
      }
      Expr::Index(index) => {
        self.resolve_expr(&mut index.stx.obj);
        self.resolve_expr(&mut index.stx.index);
      }
      Expr::LitArray(array) => {
        for element in array.stx.elements.iter_mut() {
          match element {
            ArrayLitElem::Single(value) | ArrayLitElem::Spread(value) => {
              self.resolve_expr(value)
            }
            ArrayLitElem::Empty => {}
          }
        }
      }
      Expr::LitObject(object) => {
        for member in object.stx.members.iter_mut() {
          match member.stx.as_mut() {
            ObjectMember::Prop(prop) => {
              if let PropKey::Computed(key) = &mut prop.stx.key {
                self.resolve_expr(key);
              }
              match &mut prop.stx.value {
                ObjectPropValue::Expr(value) => self.resolve_expr(value),
                ObjectPropValue::Method(_, func) => self.analyze_func(func),
              }
            }
            ObjectMember::Shorthand(id) => {
              id.stx.symbol = self.resolve_ref(&id.stx.name.clone());
            }
            ObjectMember::Spread(value) => self.resolve_expr(value),
          }
        }
      }
      Expr::LitTemplate(template) => {
        for part in template.stx.parts.iter_mut() {
          if let TemplatePart::Substitution(value) = part {
            self.resolve_expr(value);
          }
        }
      }
      Expr::Member(member) => self.resolve_expr(&mut member.stx.obj),
      Expr::New(new_expr) => {
        self.resolve_expr(&mut new_expr.stx.callee);
        for arg in new_expr.stx.args.iter_mut() {
          self.resolve_expr(&mut arg.stx.value);
        }
      }
      Expr::Seq(seq) => {
        for inner in seq.stx.exprs.iter_mut() {
          self.resolve_expr(inner);
        }
      }
      Expr::Unary(unary) => self.resolve_expr(&mut unary.stx.operand),
      Expr::Update(update) => self.resolve_expr(&mut update.stx.operand),
      Expr::LitBool(_)
      | Expr::LitNull(_)
      | Expr::LitNumber(_)
      | Expr::LitRegex(_)
      | Expr::LitString(_)
      | Expr::LitUndefined(_)
      | Expr::Require(_)
      | Expr::This(_) => {}
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse;
  use crate::ParseOptions;

  fn analyze(source: &str) -> (Node<TopLevel>, ModuleScopes) {
    let mut top = parse(source, &ParseOptions::default()).unwrap();
    let scopes = compute_module_scopes(&mut top);
    (top, scopes)
  }

  fn top_level_names(scopes: &ModuleScopes) -> Vec<&str> {
    scopes
      .top_level
      .iter()
      .map(|&id| scopes.symbol_name(id))
      .collect()
  }

  #[test]
  fn declares_top_level_bindings_in_order() {
    let (_, scopes) = analyze("const a = 1; function b() {} class C {} let d;");
    assert_eq!(top_level_names(&scopes), vec!["a", "b", "C", "d"]);
    assert!(!scopes.free_refs.any());
  }

  #[test]
  fn hoists_var_out_of_blocks() {
    let (_, scopes) = analyze("if (x) { var hoisted = 1; let scoped = 2; }");
    assert_eq!(top_level_names(&scopes), vec!["hoisted"]);
  }

  #[test]
  fn records_free_commonjs_names() {
    let (_, scopes) = analyze("module.exports = function() { return require; };");
    assert!(scopes.free_refs.module);
    assert!(scopes.free_refs.require);
    assert!(!scopes.free_refs.exports);
  }

  #[test]
  fn shadowed_names_are_not_free() {
    let (_, scopes) = analyze("function f(require) { return require(1); }");
    assert!(!scopes.free_refs.require);
  }

  #[test]
  fn references_resolve_to_declarations() {
    let (top, scopes) = analyze("function fn() {}\nconsole.log(fn());");
    let fn_symbol = scopes.top_level_symbol("fn").unwrap();
    // The call `fn()` inside console.log's argument resolves to the decl.
    let Stmt::Expr(expr_stmt) = top.stx.body[1].stx.as_ref() else {
      panic!("expected expression statement");
    };
    let Expr::Call(log_call) = expr_stmt.stx.expr.stx.as_ref() else {
      panic!("expected call");
    };
    let Expr::Call(fn_call) = log_call.stx.args[0].stx.value.stx.as_ref() else {
      panic!("expected inner call");
    };
    let Expr::Id(id) = fn_call.stx.callee.stx.as_ref() else {
      panic!("expected id callee");
    };
    assert_eq!(id.stx.symbol, Some(fn_symbol));
  }

  #[test]
  fn import_aliases_are_module_bindings() {
    let (_, scopes) = analyze("import def, {a as b} from './m'; import * as ns from './n';");
    assert_eq!(top_level_names(&scopes), vec!["def", "b", "ns"]);
  }

  #[test]
  fn inner_shadowing_keeps_outer_reference_distinct(){
    let (top, scopes) = analyze("const x = 1; function f() { const x = 2; return x; } f(x);");
    let outer = scopes.top_level_symbol("x").unwrap();
    let Stmt::Func(func) = top.stx.body[1].stx.as_ref() else {
      panic!("expected function");
    };
    let Stmt::Return(ret) = func.stx.func.stx.body[1].stx.as_ref() else {
      panic!("expected return");
    };
    let Expr::Id(inner_ref) = ret.stx.value.as_ref().unwrap().stx.as_ref() else {
      panic!("expected id");
    };
    assert_ne!(inner_ref.stx.symbol, Some(outer));
    assert!(inner_ref.stx.symbol.is_some());
  }
}
