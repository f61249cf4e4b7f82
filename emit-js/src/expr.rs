use crate::Printer;
use parse_js::ast::expr::ArrayLitElem;
use parse_js::ast::expr::ArrowFuncBody;
use parse_js::ast::expr::AssignOp;
use parse_js::ast::expr::BinaryOp;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::Func;
use parse_js::ast::expr::MethodKind;
use parse_js::ast::expr::ObjectMember;
use parse_js::ast::expr::ObjectPropValue;
use parse_js::ast::expr::ParamDecl;
use parse_js::ast::expr::PropKey;
use parse_js::ast::expr::TemplatePart;
use parse_js::ast::expr::UnaryOp;
use parse_js::ast::expr::UpdateOp;
use parse_js::ast::node::Node;
use parse_js::ast::pat::Pat;

// Precedence scale used for re-parenthesisation. Higher binds tighter.
pub(crate) const PREC_SEQ: u8 = 1;
pub(crate) const PREC_ASSIGN: u8 = 2;
const PREC_COND: u8 = 3;
const PREC_UNARY: u8 = 16;
const PREC_POSTFIX: u8 = 17;
const PREC_CALL: u8 = 18;
const PREC_PRIMARY: u8 = 19;

fn binary_prec(op: BinaryOp) -> (u8, bool) {
  // (precedence, right associative)
  match op {
    BinaryOp::NullishCoalesce => (4, false),
    BinaryOp::LogicalOr => (5, false),
    BinaryOp::LogicalAnd => (6, false),
    BinaryOp::BitOr => (7, false),
    BinaryOp::BitXor => (8, false),
    BinaryOp::BitAnd => (9, false),
    BinaryOp::Eq | BinaryOp::Neq | BinaryOp::EqStrict | BinaryOp::NeqStrict => (10, false),
    BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Lte | BinaryOp::Gte | BinaryOp::In
    | BinaryOp::Instanceof => (11, false),
    BinaryOp::Shl | BinaryOp::Shr | BinaryOp::ShrUnsigned => (12, false),
    BinaryOp::Add | BinaryOp::Sub => (13, false),
    BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => (14, false),
    BinaryOp::Exp => (15, true),
  }
}

fn binary_op_str(op: BinaryOp) -> &'static str {
  match op {
    BinaryOp::Add => "+",
    BinaryOp::BitAnd => "&",
    BinaryOp::BitOr => "|",
    BinaryOp::BitXor => "^",
    BinaryOp::Div => "/",
    BinaryOp::Eq => "==",
    BinaryOp::EqStrict => "===",
    BinaryOp::Exp => "**",
    BinaryOp::Gt => ">",
    BinaryOp::Gte => ">=",
    BinaryOp::In => "in",
    BinaryOp::Instanceof => "instanceof",
    BinaryOp::LogicalAnd => "&&",
    BinaryOp::LogicalOr => "||",
    BinaryOp::Lt => "<",
    BinaryOp::Lte => "<=",
    BinaryOp::Mod => "%",
    BinaryOp::Mul => "*",
    BinaryOp::Neq => "!=",
    BinaryOp::NeqStrict => "!==",
    BinaryOp::NullishCoalesce => "??",
    BinaryOp::Shl => "<<",
    BinaryOp::Shr => ">>",
    BinaryOp::ShrUnsigned => ">>>",
    BinaryOp::Sub => "-",
  }
}

fn assign_op_str(op: AssignOp) -> &'static str {
  match op {
    AssignOp::Add => "+=",
    AssignOp::Assign => "=",
    AssignOp::BitAnd => "&=",
    AssignOp::BitOr => "|=",
    AssignOp::BitXor => "^=",
    AssignOp::Div => "/=",
    AssignOp::Exp => "**=",
    AssignOp::LogicalAnd => "&&=",
    AssignOp::LogicalOr => "||=",
    AssignOp::Mod => "%=",
    AssignOp::Mul => "*=",
    AssignOp::NullishCoalesce => "??=",
    AssignOp::Shl => "<<=",
    AssignOp::Shr => ">>=",
    AssignOp::ShrUnsigned => ">>>=",
    AssignOp::Sub => "-=",
  }
}

fn expr_prec(expr: &Expr) -> u8 {
  match expr {
    Expr::Seq(_) => PREC_SEQ,
    Expr::Assign(_) | Expr::Arrow(_) => PREC_ASSIGN,
    Expr::Cond(_) => PREC_COND,
    Expr::Binary(binary) => binary_prec(binary.stx.op).0,
    Expr::Unary(_) => PREC_UNARY,
    Expr::Update(update) => {
      if update.stx.prefix {
        PREC_UNARY
      } else {
        PREC_POSTFIX
      }
    }
    Expr::Call(_) | Expr::New(_) | Expr::Member(_) | Expr::Index(_) | Expr::Require(_) => {
      PREC_CALL
    }
    _ => PREC_PRIMARY,
  }
}

/// Whether an expression's leftmost token would be misparsed at the start of
/// an expression statement (`{`, `function`, `class`).
pub(crate) fn starts_ambiguously(expr: &Expr) -> bool {
  match expr {
    Expr::Func(_) | Expr::Class(_) | Expr::LitObject(_) => true,
    Expr::Assign(assign) => starts_ambiguously(&assign.stx.target.stx),
    Expr::Binary(binary) => starts_ambiguously(&binary.stx.left.stx),
    Expr::Call(call) => starts_ambiguously(&call.stx.callee.stx),
    Expr::Cond(cond) => starts_ambiguously(&cond.stx.test.stx),
    Expr::Index(index) => starts_ambiguously(&index.stx.obj.stx),
    Expr::Member(member) => starts_ambiguously(&member.stx.obj.stx),
    Expr::Seq(seq) => seq
      .stx
      .exprs
      .first()
      .is_some_and(|first| starts_ambiguously(&first.stx)),
    Expr::Update(update) if !update.stx.prefix => starts_ambiguously(&update.stx.operand.stx),
    _ => false,
  }
}

pub(crate) fn number_str(value: f64) -> String {
  if value == 0.0 {
    "0".to_string()
  } else if value.fract() == 0.0 && value.abs() < 9007199254740992.0 {
    format!("{}", value as i64)
  } else {
    format!("{}", value)
  }
}

pub(crate) fn quote_str(value: &str) -> String {
  let mut out = String::with_capacity(value.len() + 2);
  out.push('"');
  for c in value.chars() {
    match c {
      '"' => out.push_str("\\\""),
      '\\' => out.push_str("\\\\"),
      '\n' => out.push_str("\\n"),
      '\r' => out.push_str("\\r"),
      '\t' => out.push_str("\\t"),
      c if (c as u32) < 0x20 => out.push_str(&format!("\\x{:02x}", c as u32)),
      c => out.push(c),
    }
  }
  out.push('"');
  out
}

impl Printer {
  pub(crate) fn print_expr(&mut self, expr: &Node<Expr>, min_prec: u8) {
    if expr_prec(&expr.stx) < min_prec {
      self.push_char('(');
      self.print_expr_inner(expr);
      self.push_char(')');
    } else {
      self.print_expr_inner(expr);
    }
  }

  fn print_expr_inner(&mut self, expr: &Node<Expr>) {
    match expr.stx.as_ref() {
      Expr::Arrow(arrow) => {
        if arrow.stx.is_async {
          self.push("async ");
        }
        self.print_params(&arrow.stx.params);
        self.push(" => ");
        match &arrow.stx.body {
          ArrowFuncBody::Block(body) => self.print_brace_body(body),
          ArrowFuncBody::Expr(body) => {
            if starts_ambiguously(&body.stx) {
              self.push_char('(');
              self.print_expr(body, PREC_SEQ);
              self.push_char(')');
            } else {
              self.print_expr(body, PREC_ASSIGN);
            }
          }
        }
      }
      Expr::Assign(assign) => {
        self.print_expr(&assign.stx.target, PREC_COND);
        self.push_char(' ');
        self.push(assign_op_str(assign.stx.op));
        self.push_char(' ');
        self.print_expr(&assign.stx.value, PREC_ASSIGN);
      }
      Expr::Binary(binary) => {
        let (prec, right_assoc) = binary_prec(binary.stx.op);
        let (left_min, right_min) = if right_assoc {
          (prec + 1, prec)
        } else {
          (prec, prec + 1)
        };
        self.print_expr(&binary.stx.left, left_min);
        self.push_char(' ');
        self.push(binary_op_str(binary.stx.op));
        self.push_char(' ');
        self.print_expr(&binary.stx.right, right_min);
      }
      Expr::Call(call) => {
        self.print_expr(&call.stx.callee, PREC_CALL);
        self.print_args_parens(&call.stx.args);
      }
      Expr::Class(class) => {
        self.push("class");
        if let Some(name) = &class.stx.name {
          self.push_char(' ');
          self.push(&name.stx.name);
        }
        if let Some(extends) = &class.stx.extends {
          self.push(" extends ");
          self.print_expr(extends, PREC_CALL);
        }
        self.push_char(' ');
        self.print_class_body(&class.stx.members);
      }
      Expr::Cond(cond) => {
        self.print_expr(&cond.stx.test, PREC_COND + 1);
        self.push(" ? ");
        self.print_expr(&cond.stx.consequent, PREC_ASSIGN);
        self.push(" : ");
        self.print_expr(&cond.stx.alternate, PREC_ASSIGN);
      }
      Expr::Func(func_expr) => {
        if func_expr.stx.func.stx.is_async {
          self.push("async ");
        }
        self.push("function");
        if func_expr.stx.func.stx.is_generator {
          self.push_char('*');
        }
        if let Some(name) = &func_expr.stx.name {
          self.push_char(' ');
          self.push(&name.stx.name);
        }
        self.print_func_tail(&func_expr.stx.func);
      }
      Expr::Id(id) => self.push(&id.stx.name),
      Expr::Index(index) => {
        self.print_expr(&index.stx.obj, PREC_CALL);
        self.push_char('[');
        self.print_expr(&index.stx.index, PREC_SEQ);
        self.push_char(']');
      }
      Expr::LitArray(array) => {
        self.push_char('[');
        for (idx, element) in array.stx.elements.iter().enumerate() {
          if idx > 0 {
            self.push(", ");
          }
          match element {
            ArrayLitElem::Single(value) => self.print_expr(value, PREC_ASSIGN),
            ArrayLitElem::Spread(value) => {
              self.push("...");
              self.print_expr(value, PREC_ASSIGN);
            }
            ArrayLitElem::Empty => {}
          }
        }
        self.push_char(']');
      }
      Expr::LitBool(lit) => self.push(if lit.stx.value { "true" } else { "false" }),
      Expr::LitNull(_) => self.push("null"),
      Expr::LitNumber(lit) => {
        let text = number_str(lit.stx.value);
        self.push(&text);
      }
      Expr::LitObject(object) => self.print_object_lit(&object.stx.members),
      Expr::LitRegex(lit) => self.push(&lit.stx.value),
      Expr::LitString(lit) => {
        let text = quote_str(&lit.stx.value);
        self.push(&text);
      }
      Expr::LitTemplate(template) => {
        self.push_char('`');
        for part in &template.stx.parts {
          match part {
            TemplatePart::String(raw) => self.push(raw),
            TemplatePart::Substitution(value) => {
              self.push("${");
              self.print_expr(value, PREC_SEQ);
              self.push_char('}');
            }
          }
        }
        self.push_char('`');
      }
      // `undefined` is not a reserved word; `void 0` always is undefined.
      Expr::LitUndefined(_) => self.push("void 0"),
      Expr::Member(member) => {
        if matches!(member.stx.obj.stx.as_ref(), Expr::LitNumber(_)) {
          self.push_char('(');
          self.print_expr(&member.stx.obj, PREC_SEQ);
          self.push_char(')');
        } else {
          self.print_expr(&member.stx.obj, PREC_CALL);
        }
        if member.stx.optional_chaining {
          self.push("?.");
        } else {
          self.push_char('.');
        }
        self.push(&member.stx.prop);
      }
      Expr::New(new_expr) => {
        self.push("new ");
        self.print_expr(&new_expr.stx.callee, PREC_CALL);
        self.print_args_parens(&new_expr.stx.args);
      }
      Expr::Require(require) => {
        self.push("require(");
        let id = require.stx.target.to_string();
        self.push(&id);
        self.push(" /* ");
        self.push(&require.stx.text);
        self.push(" */)");
      }
      Expr::Seq(seq) => {
        for (idx, inner) in seq.stx.exprs.iter().enumerate() {
          if idx > 0 {
            self.push(", ");
          }
          self.print_expr(inner, PREC_ASSIGN);
        }
      }
      Expr::This(_) => self.push("this"),
      Expr::Unary(unary) => {
        match unary.stx.op {
          UnaryOp::Await => self.push("await "),
          UnaryOp::Delete => self.push("delete "),
          UnaryOp::Typeof => self.push("typeof "),
          UnaryOp::Void => self.push("void "),
          UnaryOp::Not => self.push_char('!'),
          UnaryOp::BitNot => self.push_char('~'),
          UnaryOp::Plus => {
            self.push_char('+');
            if needs_sign_gap(&unary.stx.operand.stx, '+') {
              self.push_char(' ');
            }
          }
          UnaryOp::Minus => {
            self.push_char('-');
            if needs_sign_gap(&unary.stx.operand.stx, '-') {
              self.push_char(' ');
            }
          }
        }
        self.print_expr(&unary.stx.operand, PREC_UNARY);
      }
      Expr::Update(update) => {
        let op = match update.stx.op {
          UpdateOp::Decrement => "--",
          UpdateOp::Increment => "++",
        };
        if update.stx.prefix {
          self.push(op);
          self.print_expr(&update.stx.operand, PREC_UNARY);
        } else {
          self.print_expr(&update.stx.operand, PREC_POSTFIX);
          self.push(op);
        }
      }
    }
  }

  fn print_args_parens(&mut self, args: &[Node<parse_js::ast::expr::CallArg>]) {
    self.push_char('(');
    for (idx, arg) in args.iter().enumerate() {
      if idx > 0 {
        self.push(", ");
      }
      if arg.stx.spread {
        self.push("...");
      }
      self.print_expr(&arg.stx.value, PREC_ASSIGN);
    }
    self.push_char(')');
  }

  fn print_object_lit(&mut self, members: &[Node<ObjectMember>]) {
    if members.is_empty() {
      self.push("{}");
      return;
    }
    self.push_char('{');
    self.newline();
    self.indented(|printer| {
      for (idx, member) in members.iter().enumerate() {
        printer.start_line();
        match member.stx.as_ref() {
          ObjectMember::Prop(prop) => match &prop.stx.value {
            ObjectPropValue::Expr(value) => {
              printer.print_prop_key(&prop.stx.key);
              printer.push(": ");
              printer.print_expr(value, PREC_ASSIGN);
            }
            ObjectPropValue::Method(kind, func) => {
              match kind {
                MethodKind::Getter => printer.push("get "),
                MethodKind::Setter => printer.push("set "),
                MethodKind::Method => {}
              }
              printer.print_prop_key(&prop.stx.key);
              printer.print_func_tail(func);
            }
          },
          ObjectMember::Shorthand(id) => printer.push(&id.stx.name),
          ObjectMember::Spread(value) => {
            printer.push("...");
            printer.print_expr(value, PREC_ASSIGN);
          }
        }
        if idx + 1 < members.len() {
          printer.push_char(',');
        }
        printer.newline();
      }
    });
    self.start_line();
    self.push_char('}');
  }

  pub(crate) fn print_prop_key(&mut self, key: &PropKey) {
    match key {
      PropKey::Computed(expr) => {
        self.push_char('[');
        self.print_expr(expr, PREC_SEQ);
        self.push_char(']');
      }
      PropKey::Ident(name) => self.push(name),
      PropKey::Num(value) => {
        let text = number_str(*value);
        self.push(&text);
      }
      PropKey::Str(value) => {
        let text = quote_str(value);
        self.push(&text);
      }
    }
  }

  pub(crate) fn print_params(&mut self, params: &[Node<ParamDecl>]) {
    self.push_char('(');
    for (idx, param) in params.iter().enumerate() {
      if idx > 0 {
        self.push(", ");
      }
      if param.stx.rest {
        self.push("...");
      }
      self.print_pat(&param.stx.pattern);
      if let Some(default) = &param.stx.default {
        self.push(" = ");
        self.print_expr(default, PREC_ASSIGN);
      }
    }
    self.push_char(')');
  }

  /// `(params) {` body `}`, the shared tail of every function form.
  pub(crate) fn print_func_tail(&mut self, func: &Node<Func>) {
    self.print_params(&func.stx.params);
    self.push_char(' ');
    self.print_brace_body(&func.stx.body);
  }

  pub(crate) fn print_pat(&mut self, pat: &Node<Pat>) {
    match pat.stx.as_ref() {
      Pat::Id(id) => self.push(&id.stx.name),
      Pat::Array(array) => {
        self.push_char('[');
        let mut first = true;
        for element in &array.stx.elements {
          if !first {
            self.push(", ");
          }
          first = false;
          let Some(element) = element else {
            continue;
          };
          self.print_pat(&element.stx.target);
          if let Some(default) = &element.stx.default {
            self.push(" = ");
            self.print_expr(default, PREC_ASSIGN);
          }
        }
        if let Some(rest) = &array.stx.rest {
          if !first {
            self.push(", ");
          }
          self.push("...");
          self.print_pat(rest);
        }
        self.push_char(']');
      }
      Pat::Object(object) => {
        self.push_char('{');
        let mut first = true;
        for property in &object.stx.properties {
          if !first {
            self.push(", ");
          }
          first = false;
          // Renaming can split a shorthand property into `key: binding`.
          let still_shorthand = property.stx.shorthand
            && matches!(
              property.stx.target.stx.as_ref(),
              Pat::Id(id) if id.stx.name == property.stx.key
            );
          if still_shorthand {
            self.print_pat(&property.stx.target);
          } else {
            self.push(&property.stx.key);
            self.push(": ");
            self.print_pat(&property.stx.target);
          }
          if let Some(default) = &property.stx.default {
            self.push(" = ");
            self.print_expr(default, PREC_ASSIGN);
          }
        }
        if let Some(rest) = &object.stx.rest {
          if !first {
            self.push(", ");
          }
          self.push("...");
          self.push(&rest.stx.name);
        }
        self.push_char('}');
      }
    }
  }
}

fn needs_sign_gap(operand: &Expr, sign: char) -> bool {
  match operand {
    Expr::Unary(unary) => matches!(
      (sign, unary.stx.op),
      ('-', UnaryOp::Minus) | ('+', UnaryOp::Plus)
    ),
    Expr::Update(update) => {
      update.stx.prefix
        && matches!(
          (sign, update.stx.op),
          ('-', UpdateOp::Decrement) | ('+', UpdateOp::Increment)
        )
    }
    _ => false,
  }
}
