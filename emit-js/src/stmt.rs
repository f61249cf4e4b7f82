use crate::expr::starts_ambiguously;
use crate::expr::PREC_ASSIGN;
use crate::expr::PREC_SEQ;
use crate::Printer;
use parse_js::ast::import_export::ImportNames;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::ClassMember;
use parse_js::ast::stmt::ClassMemberValue;
use parse_js::ast::stmt::ForInit;
use parse_js::ast::stmt::IfStmt;
use parse_js::ast::stmt::Stmt;
use parse_js::ast::stmt::VarDecl;
use parse_js::ast::expr::MethodKind;

impl Printer {
  pub(crate) fn print_stmt(&mut self, stmt: &Node<Stmt>) {
    match stmt.stx.as_ref() {
      Stmt::Empty(_) => {}
      Stmt::Block(block) => {
        self.start_line();
        self.print_brace_body(&block.stx.body);
        self.newline();
      }
      Stmt::Break(break_stmt) => {
        self.start_line();
        self.push("break");
        if let Some(label) = &break_stmt.stx.label {
          self.push_char(' ');
          self.push(label);
        }
        self.push(";\n");
      }
      Stmt::Continue(continue_stmt) => {
        self.start_line();
        self.push("continue");
        if let Some(label) = &continue_stmt.stx.label {
          self.push_char(' ');
          self.push(label);
        }
        self.push(";\n");
      }
      Stmt::Class(decl) => {
        self.start_line();
        if decl.stx.export {
          self.push("export ");
        }
        if decl.stx.export_default {
          self.push("export default ");
        }
        self.push("class");
        if let Some(name) = &decl.stx.name {
          self.push_char(' ');
          self.push(&name.stx.name);
        }
        if let Some(extends) = &decl.stx.extends {
          self.push(" extends ");
          self.print_expr(extends, PREC_ASSIGN);
        }
        self.push_char(' ');
        self.print_class_body(&decl.stx.members);
        self.newline();
      }
      Stmt::DoWhile(do_while) => {
        self.start_line();
        self.push("do ");
        self.print_stmt_as_brace_body(&do_while.stx.body);
        self.push(" while (");
        self.print_expr(&do_while.stx.condition, PREC_SEQ);
        self.push(");\n");
      }
      Stmt::Expr(expr_stmt) => {
        self.start_line();
        if starts_ambiguously(&expr_stmt.stx.expr.stx) {
          self.push_char('(');
          self.print_expr(&expr_stmt.stx.expr, PREC_SEQ);
          self.push_char(')');
        } else {
          self.print_expr(&expr_stmt.stx.expr, PREC_SEQ);
        }
        self.push(";\n");
      }
      Stmt::For(for_stmt) => {
        self.start_line();
        self.push("for (");
        match &for_stmt.stx.init {
          ForInit::Decl(decl) => self.print_var_decl_inline(decl),
          ForInit::Expr(expr) => self.print_expr(expr, PREC_SEQ),
          ForInit::None => {}
        }
        self.push("; ");
        if let Some(cond) = &for_stmt.stx.cond {
          self.print_expr(cond, PREC_SEQ);
        }
        self.push("; ");
        if let Some(post) = &for_stmt.stx.post {
          self.print_expr(post, PREC_SEQ);
        }
        self.push(") ");
        self.print_stmt_as_brace_body(&for_stmt.stx.body);
        self.newline();
      }
      Stmt::ForInOf(for_stmt) => {
        self.start_line();
        self.push("for (");
        if let Some(mode) = for_stmt.stx.decl_mode {
          self.push(mode.as_str());
          self.push_char(' ');
        }
        self.print_pat(&for_stmt.stx.pat);
        self.push(if for_stmt.stx.of { " of " } else { " in " });
        self.print_expr(&for_stmt.stx.rhs, PREC_SEQ);
        self.push(") ");
        self.print_stmt_as_brace_body(&for_stmt.stx.body);
        self.newline();
      }
      Stmt::Func(decl) => {
        self.start_line();
        if decl.stx.export {
          self.push("export ");
        }
        if decl.stx.export_default {
          self.push("export default ");
        }
        if decl.stx.func.stx.is_async {
          self.push("async ");
        }
        self.push("function");
        if decl.stx.func.stx.is_generator {
          self.push_char('*');
        }
        if let Some(name) = &decl.stx.name {
          self.push_char(' ');
          self.push(&name.stx.name);
        }
        self.print_func_tail(&decl.stx.func);
        self.newline();
      }
      Stmt::If(if_stmt) => {
        self.start_line();
        self.print_if_chain(if_stmt);
        self.newline();
      }
      Stmt::Return(return_stmt) => {
        self.start_line();
        self.push("return");
        if let Some(value) = &return_stmt.stx.value {
          self.push_char(' ');
          self.print_expr(value, PREC_SEQ);
        }
        self.push(";\n");
      }
      Stmt::Switch(switch) => {
        self.start_line();
        self.push("switch (");
        self.print_expr(&switch.stx.subject, PREC_SEQ);
        self.push(") {\n");
        self.indented(|printer| {
          for case in &switch.stx.cases {
            printer.start_line();
            match &case.stx.test {
              Some(test) => {
                printer.push("case ");
                printer.print_expr(test, PREC_SEQ);
                printer.push(":\n");
              }
              None => printer.push("default:\n"),
            }
            printer.indented(|printer| {
              for stmt in &case.stx.body {
                printer.print_stmt(stmt);
              }
            });
          }
        });
        self.start_line();
        self.push("}\n");
      }
      Stmt::Throw(throw_stmt) => {
        self.start_line();
        self.push("throw ");
        self.print_expr(&throw_stmt.stx.value, PREC_SEQ);
        self.push(";\n");
      }
      Stmt::Try(try_stmt) => {
        self.start_line();
        self.push("try ");
        self.print_brace_body(&try_stmt.stx.block.stx.body);
        if let Some(catch) = &try_stmt.stx.catch {
          self.push(" catch ");
          if let Some(param) = &catch.stx.param {
            self.push_char('(');
            self.print_pat(param);
            self.push(") ");
          }
          self.print_brace_body(&catch.stx.body);
        }
        if let Some(finally) = &try_stmt.stx.finally {
          self.push(" finally ");
          self.print_brace_body(&finally.stx.body);
        }
        self.newline();
      }
      Stmt::Var(decl) => {
        self.start_line();
        self.print_var_decl_inline(decl);
        self.push(";\n");
      }
      Stmt::While(while_stmt) => {
        self.start_line();
        self.push("while (");
        self.print_expr(&while_stmt.stx.condition, PREC_SEQ);
        self.push(") ");
        self.print_stmt_as_brace_body(&while_stmt.stx.body);
        self.newline();
      }
      Stmt::Import(import) => {
        self.start_line();
        self.push("import ");
        let mut wrote_binding = false;
        if let Some(default) = &import.stx.default {
          self.push(&default.stx.name);
          wrote_binding = true;
        }
        match &import.stx.names {
          Some(ImportNames::All(ns)) => {
            if wrote_binding {
              self.push(", ");
            }
            self.push("* as ");
            self.push(&ns.stx.name);
            wrote_binding = true;
          }
          Some(ImportNames::Specific(names)) => {
            if wrote_binding {
              self.push(", ");
            }
            self.push_char('{');
            for (idx, name) in names.iter().enumerate() {
              if idx > 0 {
                self.push(", ");
              }
              self.push(&name.stx.importable);
              if name.stx.importable != name.stx.alias.stx.name {
                self.push(" as ");
                self.push(&name.stx.alias.stx.name);
              }
            }
            self.push_char('}');
            wrote_binding = true;
          }
          None => {}
        }
        if wrote_binding {
          self.push(" from ");
        }
        let module = crate::expr::quote_str(&import.stx.module);
        self.push(&module);
        self.push(";\n");
      }
      Stmt::ExportAll(export) => {
        self.start_line();
        self.push("export *");
        if let Some(alias) = &export.stx.alias {
          self.push(" as ");
          self.push(alias);
        }
        self.push(" from ");
        let module = crate::expr::quote_str(&export.stx.module);
        self.push(&module);
        self.push(";\n");
      }
      Stmt::ExportDefault(export) => {
        self.start_line();
        self.push("export default ");
        self.print_expr(&export.stx.expr, PREC_ASSIGN);
        self.push(";\n");
      }
      Stmt::ExportNamed(export) => {
        self.start_line();
        self.push("export {");
        for (idx, name) in export.stx.names.iter().enumerate() {
          if idx > 0 {
            self.push(", ");
          }
          self.push(&name.stx.target);
          if name.stx.target != name.stx.alias {
            self.push(" as ");
            self.push(&name.stx.alias);
          }
        }
        self.push_char('}');
        if let Some(from) = &export.stx.from {
          self.push(" from ");
          let module = crate::expr::quote_str(from);
          self.push(&module);
        }
        self.push(";\n");
      }
    }
  }

  // `if (a) { ... } else if (b) { ... } else { ... }` stays one chain.
  fn print_if_chain(&mut self, if_stmt: &Node<IfStmt>) {
    self.push("if (");
    self.print_expr(&if_stmt.stx.test, PREC_SEQ);
    self.push(") ");
    self.print_stmt_as_brace_body(&if_stmt.stx.consequent);
    if let Some(alternate) = &if_stmt.stx.alternate {
      self.push(" else ");
      if let Stmt::If(nested) = alternate.stx.as_ref() {
        self.print_if_chain(nested);
      } else {
        self.print_stmt_as_brace_body(alternate);
      }
    }
  }

  fn print_var_decl_inline(&mut self, decl: &Node<VarDecl>) {
    if decl.stx.export {
      self.push("export ");
    }
    self.push(decl.stx.mode.as_str());
    self.push_char(' ');
    for (idx, declarator) in decl.stx.declarators.iter().enumerate() {
      if idx > 0 {
        self.push(", ");
      }
      self.print_pat(&declarator.stx.pattern);
      if let Some(initializer) = &declarator.stx.initializer {
        self.push(" = ");
        self.print_expr(initializer, PREC_ASSIGN);
      }
    }
  }

  /// `{` then the statements at one deeper indent, then `}` at the current
  /// indent. An empty body still takes two lines. The cursor is left after
  /// the closing brace.
  pub(crate) fn print_brace_body(&mut self, body: &[Node<Stmt>]) {
    self.push_char('{');
    self.newline();
    self.indented(|printer| {
      for stmt in body {
        printer.print_stmt(stmt);
      }
    });
    self.start_line();
    self.push_char('}');
  }

  // Single-statement bodies print as blocks; formatting stays canonical.
  fn print_stmt_as_brace_body(&mut self, stmt: &Node<Stmt>) {
    if let Stmt::Block(block) = stmt.stx.as_ref() {
      self.print_brace_body(&block.stx.body);
      return;
    }
    self.push_char('{');
    self.newline();
    self.indented(|printer| {
      printer.print_stmt(stmt);
    });
    self.start_line();
    self.push_char('}');
  }

  pub(crate) fn print_class_body(&mut self, members: &[Node<ClassMember>]) {
    self.push_char('{');
    self.newline();
    self.indented(|printer| {
      for member in members {
        printer.start_line();
        if member.stx.is_static {
          printer.push("static ");
        }
        match &member.stx.value {
          ClassMemberValue::Field(value) => {
            printer.print_prop_key(&member.stx.key);
            if let Some(value) = value {
              printer.push(" = ");
              printer.print_expr(value, PREC_ASSIGN);
            }
            printer.push(";\n");
          }
          ClassMemberValue::Method(kind, func) => {
            match kind {
              MethodKind::Getter => printer.push("get "),
              MethodKind::Setter => printer.push("set "),
              MethodKind::Method => {}
            }
            if func.stx.is_async {
              printer.push("async ");
            }
            if func.stx.is_generator {
              printer.push_char('*');
            }
            printer.print_prop_key(&member.stx.key);
            printer.print_func_tail(func);
            printer.newline();
          }
        }
      }
    });
    self.start_line();
    self.push_char('}');
  }
}
