//! The linker: id assignment, emission grouping, cross-module renaming, and
//! reference rewriting.
//!
//! Modules merge into *static clusters* wherever only declarative imports
//! connect them; every CommonJS-style module (and every module reached
//! through a `require` boundary) becomes its own wrapped group. Inside a
//! cluster, imports collapse to direct bindings with collision renaming;
//! across groups, references go through `require(<id>)` and an exports
//! object, with declarative exports preserved as live getters.

use crate::graph::Bundle;
use crate::graph::EdgeKind;
use crate::CODE_DEFAULT_CYCLE;
use crate::CODE_MISSING_EXPORT;
use crate::CODE_NON_LITERAL_REQUIRE;
use ahash::HashMap;
use ahash::HashMapExt;
use ahash::HashSet;
use ahash::HashSetExt;
use derive_visitor::DriveMut;
use derive_visitor::VisitorMut;
use diagnostics::Diagnostic;
use diagnostics::Log;
use itertools::Itertools;
use parse_js::ast::expr::ArrowFuncBody;
use parse_js::ast::expr::ArrowFuncExpr;
use parse_js::ast::expr::CallArg;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::expr::MemberExpr;
use parse_js::ast::expr::ObjectLit;
use parse_js::ast::expr::ObjectMember;
use parse_js::ast::expr::ObjectProp;
use parse_js::ast::expr::ObjectPropValue;
use parse_js::ast::expr::PropKey;
use parse_js::ast::expr::RequireExpr;
use parse_js::ast::import_export::ImportNames;
use parse_js::ast::node::Node;
use parse_js::ast::pat::ClassOrFuncName;
use parse_js::ast::pat::IdPat;
use parse_js::ast::pat::Pat;
use parse_js::ast::stmt::ExprStmt;
use parse_js::ast::stmt::Stmt;
use parse_js::ast::stmt::VarDecl;
use parse_js::ast::stmt::VarDeclMode;
use parse_js::ast::stmt::VarDeclarator;
use parse_js::lex::is_id_continue;
use parse_js::lex::is_id_start;
use parse_js::lex::RESERVED_WORDS;
use parse_js::loc::Loc;
use parse_js::symbol::SymbolId;
use resolve_js::path;
use tracing::debug;

/// One emitted wrapped function.
pub struct LinkedGroup {
  pub id: u32,
  pub members: Vec<LinkedModule>,
  pub uses_require: bool,
  pub uses_exports: bool,
  pub uses_module: bool,
}

impl LinkedGroup {
  /// The shortest prefix of `(require, exports, module)` covering every
  /// referenced loader name.
  pub fn params(&self) -> &'static str {
    if self.uses_module {
      "require, exports, module"
    } else if self.uses_exports {
      "require, exports"
    } else if self.uses_require {
      "require"
    } else {
      ""
    }
  }
}

pub struct LinkedModule {
  pub abs_path: String,
  pub body: Vec<Node<Stmt>>,
}

pub struct LinkedEntry {
  /// Groups in emission order: post-order of the dependency-first walk.
  pub groups: Vec<LinkedGroup>,
  pub entry_group_id: u32,
}

/// Assigns every module of every entry closure its id: contiguous from zero,
/// lexicographic by absolute path within a closure, later closures extending
/// the sequence.
pub fn assign_ids(bundle: &mut Bundle) {
  let mut next = 0u32;
  for entry_pos in 0..bundle.entries.len() {
    let entry = bundle.entries[entry_pos];
    let closure = closure_of(bundle, entry);
    let fresh: Vec<usize> = closure
      .iter()
      .copied()
      .filter(|&idx| bundle.modules[idx].id.is_none())
      .sorted_by(|&a, &b| bundle.modules[a].abs_path.cmp(&bundle.modules[b].abs_path))
      .collect();
    for idx in fresh {
      bundle.modules[idx].id = Some(next);
      next += 1;
    }
  }
}

fn closure_of(bundle: &Bundle, entry: usize) -> Vec<usize> {
  let mut visited = HashSet::new();
  let mut order = Vec::new();
  post_order(bundle, entry, &mut visited, &mut order);
  order
}

// Depth-first, edges in source order, module appended on exit. Dependencies
// land before their importers; cycles break at the back-edge.
fn post_order(bundle: &Bundle, idx: usize, visited: &mut HashSet<usize>, order: &mut Vec<usize>) {
  if !visited.insert(idx) {
    return;
  }
  for edge in &bundle.modules[idx].edges {
    if let Some(target) = edge.target {
      post_order(bundle, target, visited, order);
    }
  }
  order.push(idx);
}

#[derive(Clone, Debug)]
enum ImportedName {
  Default,
  Named(String),
  Namespace,
}

#[derive(Clone, Debug)]
enum ExportTarget {
  Local(SymbolId),
  DefaultSlot,
  ReExport { module: usize, name: String },
  Namespace { module: usize },
}

#[derive(Default, Clone)]
struct ExportMap {
  entries: Vec<(String, ExportTarget)>,
  // `export * from` targets that are emitted dynamically and therefore
  // cannot be enumerated at link time; copied at runtime instead.
  star_dynamic: Vec<usize>,
}

impl ExportMap {
  fn get(&self, name: &str) -> Option<&ExportTarget> {
    self
      .entries
      .iter()
      .find(|(entry, _)| entry == name)
      .map(|(_, target)| target)
  }
}

/// A planned rewrite for one symbol's reference sites.
#[derive(Clone, Debug)]
enum Replacement {
  Name(String),
  Member { obj: String, prop: String },
}

// The printable atom an export resolves to, from the perspective of the
// module whose body the expression lands in.
#[derive(Clone, Debug)]
enum ExportExpr {
  Exports,
  Member { obj: String, prop: String },
  Name(String),
}

pub fn link_entry(log: &mut Log, bundle: &Bundle, entry: usize) -> Option<LinkedEntry> {
  let closure = closure_of(bundle, entry);
  for &idx in &closure {
    let module = &bundle.modules[idx];
    if module.failed || module.edges.iter().any(|edge| edge.target.is_none()) {
      // Already reported during the scan.
      return None;
    }
  }

  let mut linker = Linker {
    bundle,
    log,
    entry,
    closure: closure.clone(),
    roots: HashSet::new(),
    group_of: HashMap::new(),
    members_of: HashMap::new(),
    group_order: Vec::new(),
    alias_info: HashMap::new(),
    static_targets: HashMap::new(),
    require_targets: HashMap::new(),
    renames: HashMap::new(),
    default_names: HashMap::new(),
    ns_obj_names: HashMap::new(),
    require_locals: HashMap::new(),
    exports_memo: HashMap::new(),
    errors: 0,
  };

  linker.compute_groups();
  linker.collect_import_info();
  linker.compute_export_maps();
  linker.plan_names();
  let linked = linker.emit_groups();
  if linker.errors > 0 {
    return None;
  }
  debug!(
    entry = %bundle.modules[entry].abs_path,
    groups = linked.groups.len(),
    "link complete"
  );
  Some(linked)
}

struct Linker<'a> {
  bundle: &'a Bundle,
  log: &'a mut Log,
  entry: usize,
  closure: Vec<usize>,
  roots: HashSet<usize>,
  group_of: HashMap<usize, usize>,
  members_of: HashMap<usize, Vec<usize>>,
  group_order: Vec<usize>,
  // Per module: import-alias symbol -> (target, which name).
  alias_info: HashMap<usize, HashMap<SymbolId, (usize, ImportedName)>>,
  // Per module: specifier text -> target, for declarative edges.
  static_targets: HashMap<usize, HashMap<String, usize>>,
  // Per module: specifier text -> target, for literal require edges.
  require_targets: HashMap<usize, HashMap<String, usize>>,
  renames: HashMap<(usize, SymbolId), String>,
  default_names: HashMap<usize, String>,
  // Target module -> name of its materialised namespace object.
  ns_obj_names: HashMap<usize, String>,
  // (importer, target) -> local bound via `const <name> = require(<id>)`.
  require_locals: HashMap<(usize, usize), String>,
  exports_memo: HashMap<usize, ExportMap>,
  errors: usize,
}

impl<'a> Linker<'a> {
  fn module(&self, idx: usize) -> &crate::graph::Module {
    &self.bundle.modules[idx]
  }

  fn module_id(&self, idx: usize) -> u32 {
    self.module(idx).id.expect("ids assigned before linking")
  }

  fn is_dynamic(&self, idx: usize) -> bool {
    self.module(idx).tag.is_dynamic_emitted()
  }

  fn same_group(&self, a: usize, b: usize) -> bool {
    self.group_of.get(&a) == self.group_of.get(&b)
  }

  // ---- grouping ----

  fn compute_groups(&mut self) {
    let mut roots = HashSet::new();
    roots.insert(self.entry);
    for &idx in &self.closure {
      if self.is_dynamic(idx) {
        roots.insert(idx);
      }
      for edge in &self.module(idx).edges {
        let target = edge.target.unwrap();
        if edge.kind == EdgeKind::DynamicRequire || self.is_dynamic(idx) {
          roots.insert(target);
        }
      }
    }

    // A static module reachable from two roots must not have its body
    // duplicated; promote it to a root of its own until stable.
    loop {
      let mut owner: HashMap<usize, usize> = HashMap::new();
      let mut promoted: Vec<usize> = Vec::new();
      for &root in self.closure.iter() {
        if !roots.contains(&root) {
          continue;
        }
        let mut stack = vec![root];
        let mut visited = HashSet::new();
        while let Some(at) = stack.pop() {
          if !visited.insert(at) {
            continue;
          }
          for edge in &self.module(at).edges {
            let target = edge.target.unwrap();
            if edge.kind != EdgeKind::StaticImport
              || roots.contains(&target)
              || self.is_dynamic(at)
            {
              continue;
            }
            match owner.get(&target) {
              Some(&previous) if previous != root => promoted.push(target),
              _ => {
                owner.insert(target, root);
                stack.push(target);
              }
            }
          }
        }
      }
      if promoted.is_empty() {
        break;
      }
      roots.extend(promoted);
    }

    self.roots = roots;
    for &root in &self.closure {
      if !self.roots.contains(&root) {
        continue;
      }
      let members = self.cluster_members(root);
      for &member in &members {
        self.group_of.insert(member, root);
      }
      self.members_of.insert(root, members);
      self.group_order.push(root);
    }
  }

  // Members of a root's cluster in emission order: post-order over static
  // edges, root last.
  fn cluster_members(&self, root: usize) -> Vec<usize> {
    if self.is_dynamic(root) {
      return vec![root];
    }
    let mut order = Vec::new();
    let mut visited = HashSet::new();
    self.cluster_post_order(root, root, &mut visited, &mut order);
    order
  }

  fn cluster_post_order(
    &self,
    root: usize,
    at: usize,
    visited: &mut HashSet<usize>,
    order: &mut Vec<usize>,
  ) {
    if !visited.insert(at) {
      return;
    }
    for edge in &self.module(at).edges {
      let target = edge.target.unwrap();
      if edge.kind == EdgeKind::StaticImport && !self.roots.contains(&target) {
        self.cluster_post_order(root, target, visited, order);
      }
    }
    order.push(at);
  }

  // ---- import info ----

  fn collect_import_info(&mut self) {
    for &idx in &self.closure {
      let mut aliases = HashMap::new();
      let mut static_targets = HashMap::new();
      let mut require_targets = HashMap::new();
      for edge in &self.module(idx).edges {
        let target = edge.target.unwrap();
        match edge.kind {
          EdgeKind::StaticImport => static_targets.insert(edge.text.clone(), target),
          EdgeKind::DynamicRequire => require_targets.insert(edge.text.clone(), target),
        };
      }
      for stmt in &self.module(idx).ast.stx.body {
        let Stmt::Import(import) = stmt.stx.as_ref() else {
          continue;
        };
        let Some(&target) = static_targets.get(&import.stx.module) else {
          continue;
        };
        if let Some(default) = &import.stx.default {
          if let Some(symbol) = default.stx.symbol {
            aliases.insert(symbol, (target, ImportedName::Default));
          }
        }
        match &import.stx.names {
          Some(ImportNames::All(ns)) => {
            if let Some(symbol) = ns.stx.symbol {
              aliases.insert(symbol, (target, ImportedName::Namespace));
            }
          }
          Some(ImportNames::Specific(names)) => {
            for name in names {
              if let Some(symbol) = name.stx.alias.stx.symbol {
                aliases.insert(
                  symbol,
                  (target, ImportedName::Named(name.stx.importable.clone())),
                );
              }
            }
          }
          None => {}
        }
      }
      self.alias_info.insert(idx, aliases);
      self.static_targets.insert(idx, static_targets);
      self.require_targets.insert(idx, require_targets);
    }
  }

  // ---- export maps ----

  fn compute_export_maps(&mut self) {
    for pos in 0..self.closure.len() {
      let idx = self.closure[pos];
      let mut in_progress = HashSet::new();
      let map = self.export_map_of(idx, &mut in_progress);
      self.exports_memo.insert(idx, map);
    }
  }

  fn export_map_of(&mut self, idx: usize, in_progress: &mut HashSet<usize>) -> ExportMap {
    if let Some(map) = self.exports_memo.get(&idx) {
      return map.clone();
    }
    if !in_progress.insert(idx) {
      // `export *` cycle (including self-reference): already-contributed
      // names win, nothing further to splice.
      return ExportMap::default();
    }

    let mut map = ExportMap::default();
    let mut add = |map: &mut ExportMap, name: String, target: ExportTarget| {
      if map.get(&name).is_none() {
        map.entries.push((name, target));
      }
    };

    let statics = self.static_targets.get(&idx).cloned().unwrap_or_default();
    let body: Vec<Node<Stmt>> = self.module(idx).ast.stx.body.clone();
    for stmt in &body {
      match stmt.stx.as_ref() {
        Stmt::Var(decl) if decl.stx.export => {
          for declarator in &decl.stx.declarators {
            for (name, symbol) in pat_bindings(&declarator.stx.pattern) {
              add(&mut map, name, ExportTarget::Local(symbol));
            }
          }
        }
        Stmt::Func(decl) if decl.stx.export || decl.stx.export_default => {
          match (&decl.stx.name, decl.stx.export_default) {
            (Some(name), true) => add(
              &mut map,
              "default".to_string(),
              ExportTarget::Local(name.stx.symbol.unwrap()),
            ),
            (Some(name), false) => add(
              &mut map,
              name.stx.name.clone(),
              ExportTarget::Local(name.stx.symbol.unwrap()),
            ),
            (None, _) => add(&mut map, "default".to_string(), ExportTarget::DefaultSlot),
          }
        }
        Stmt::Class(decl) if decl.stx.export || decl.stx.export_default => {
          match (&decl.stx.name, decl.stx.export_default) {
            (Some(name), true) => add(
              &mut map,
              "default".to_string(),
              ExportTarget::Local(name.stx.symbol.unwrap()),
            ),
            (Some(name), false) => add(
              &mut map,
              name.stx.name.clone(),
              ExportTarget::Local(name.stx.symbol.unwrap()),
            ),
            (None, _) => add(&mut map, "default".to_string(), ExportTarget::DefaultSlot),
          }
        }
        Stmt::ExportDefault(_) => {
          add(&mut map, "default".to_string(), ExportTarget::DefaultSlot);
        }
        Stmt::ExportNamed(export) => match &export.stx.from {
          None => {
            for name in &export.stx.names {
              match name.stx.symbol {
                Some(symbol) => add(
                  &mut map,
                  name.stx.alias.clone(),
                  ExportTarget::Local(symbol),
                ),
                None => {
                  self.error(
                    stmt.loc,
                    idx,
                    CODE_MISSING_EXPORT,
                    format!("no local binding named \"{}\"", name.stx.target),
                  );
                }
              }
            }
          }
          Some(from) => {
            let target = statics[from];
            for name in &export.stx.names {
              add(&mut map, name.stx.alias.clone(), ExportTarget::ReExport {
                module: target,
                name: name.stx.target.clone(),
              });
            }
          }
        },
        Stmt::ExportAll(export) => {
          let target = statics[&export.stx.module];
          match &export.stx.alias {
            Some(alias) => add(&mut map, alias.clone(), ExportTarget::Namespace {
              module: target,
            }),
            None => {
              if self.is_dynamic(target) {
                map.star_dynamic.push(target);
              } else {
                let spliced = self.export_map_of(target, in_progress);
                for (name, _) in &spliced.entries {
                  if name != "default" {
                    add(&mut map, name.clone(), ExportTarget::ReExport {
                      module: target,
                      name: name.clone(),
                    });
                  }
                }
                map.star_dynamic.extend(spliced.star_dynamic);
              }
            }
          }
        }
        _ => {}
      }
    }

    in_progress.remove(&idx);
    map
  }

  // ---- naming ----

  fn plan_names(&mut self) {
    for group_pos in 0..self.group_order.len() {
      let root = self.group_order[group_pos];
      let members = self.members_of[&root].clone();
      let static_cluster = !self.is_dynamic(root);

      let mut used: HashSet<String> = RESERVED_WORDS.iter().map(|word| word.to_string()).collect();
      used.insert("require".to_string());
      used.insert("exports".to_string());
      used.insert("module".to_string());

      // User bindings first, in member order then declaration order. Only a
      // merged cluster renames; a dynamic group keeps its own scope.
      for &member in &members {
        let aliases = &self.alias_info[&member];
        let top_level: Vec<SymbolId> = self.module(member).scopes.top_level.clone();
        for symbol in top_level {
          if aliases.contains_key(&symbol) {
            // Import aliases vanish during rewriting; they reserve nothing.
            continue;
          }
          let name = self.module(member).scopes.symbol_name(symbol).to_string();
          if used.insert(name.clone()) {
            continue;
          }
          if static_cluster {
            let emitted = unique_name(&name, &mut used);
            self.renames.insert((member, symbol), emitted);
          }
        }
      }

      // Synthesised names second: default slots, namespace objects, require
      // locals, in member order then source order.
      for &member in &members {
        if self.needs_default_slot(member) {
          let emitted = unique_name("default", &mut used);
          self.default_names.insert(member, emitted);
        }
      }
      for &member in &members {
        let body_len = self.module(member).ast.stx.body.len();
        for stmt_idx in 0..body_len {
          self.plan_stmt_names(member, stmt_idx, &mut used);
        }
      }

      // Runtime star-copies land on the root's exports object; make sure
      // the root has a local for every dynamic `export *` target, including
      // ones spliced in from cluster members.
      let star_dynamic = self.exports_memo[&root].star_dynamic.clone();
      for target in star_dynamic {
        if !self.require_locals.contains_key(&(root, target)) {
          let base = sanitize_name(path::stem(path::base(&self.module(target).abs_path)));
          let emitted = unique_name(&base, &mut used);
          self.require_locals.insert((root, target), emitted);
        }
      }
    }
  }

  fn needs_default_slot(&self, member: usize) -> bool {
    self.module(member).ast.stx.body.iter().any(|stmt| match stmt.stx.as_ref() {
      Stmt::ExportDefault(_) => true,
      Stmt::Func(decl) => decl.stx.export_default && decl.stx.name.is_none(),
      Stmt::Class(decl) => decl.stx.export_default && decl.stx.name.is_none(),
      _ => false,
    })
  }

  fn plan_stmt_names(&mut self, member: usize, stmt_idx: usize, used: &mut HashSet<String>) {
    enum Planned {
      NsObject { target: usize, alias: String },
      RequireLocal { target: usize, text: String },
    }

    let planned = {
      let module = self.module(member);
      let stmt = &module.ast.stx.body[stmt_idx];
      let statics = &self.static_targets[&member];
      match stmt.stx.as_ref() {
        Stmt::Import(import) => {
          let target = statics[&import.stx.module];
          if self.same_group(member, target) {
            match &import.stx.names {
              Some(ImportNames::All(ns)) => Some(Planned::NsObject {
                target,
                alias: ns.stx.name.clone(),
              }),
              _ => None,
            }
          } else if import.stx.default.is_some() || import.stx.names.is_some() {
            Some(Planned::RequireLocal {
              target,
              text: import.stx.module.clone(),
            })
          } else {
            None
          }
        }
        Stmt::ExportNamed(export) => match &export.stx.from {
          Some(from) => {
            let target = statics[from];
            if self.same_group(member, target) {
              None
            } else {
              Some(Planned::RequireLocal {
                target,
                text: from.clone(),
              })
            }
          }
          None => None,
        },
        Stmt::ExportAll(export) => {
          let target = statics[&export.stx.module];
          if self.same_group(member, target) {
            match &export.stx.alias {
              Some(alias) if target != member => Some(Planned::NsObject {
                target,
                alias: alias.clone(),
              }),
              _ => None,
            }
          } else {
            Some(Planned::RequireLocal {
              target,
              text: export.stx.module.clone(),
            })
          }
        }
        _ => None,
      }
    };

    match planned {
      Some(Planned::NsObject { target, alias }) => {
        if !self.ns_obj_names.contains_key(&target) {
          let emitted = unique_name(&sanitize_name(&alias), used);
          self.ns_obj_names.insert(target, emitted);
        }
      }
      Some(Planned::RequireLocal { target, text }) => {
        if !self.require_locals.contains_key(&(member, target)) {
          let base = sanitize_name(path::stem(path::base(&text)));
          let emitted = unique_name(&base, used);
          self.require_locals.insert((member, target), emitted);
        }
      }
      None => {}
    }
  }

  // ---- export expressions ----

  fn emitted_name(&self, module: usize, symbol: SymbolId) -> String {
    self
      .renames
      .get(&(module, symbol))
      .cloned()
      .unwrap_or_else(|| self.module(module).scopes.symbol_name(symbol).to_string())
  }

  // The expression that reads export `name` of `target`, as seen from
  // `viewer` (whose body the expression is emitted into). `exports_self`
  // names the module whose `exports` object is in scope, for self-namespace
  // re-exports.
  fn export_expr(
    &mut self,
    viewer: usize,
    exports_self: Option<usize>,
    target: usize,
    name: &str,
    seen: &mut HashSet<(usize, String)>,
  ) -> Option<ExportExpr> {
    if !seen.insert((target, name.to_string())) {
      return None;
    }
    if !self.same_group(viewer, target) || self.is_dynamic(target) {
      // A dynamic module re-exporting from itself reads its own exports
      // object; everything else goes through the bound namespace local.
      if exports_self == Some(target) {
        return Some(ExportExpr::Member {
          obj: "exports".to_string(),
          prop: name.to_string(),
        });
      }
      let local = self.require_locals.get(&(viewer, target))?.clone();
      return Some(ExportExpr::Member {
        obj: local,
        prop: name.to_string(),
      });
    }
    let target_entry = self.exports_memo[&target].get(name).cloned();
    match target_entry {
      None => None,
      Some(ExportTarget::Local(symbol)) => self.symbol_expr(target, exports_self, symbol, seen),
      Some(ExportTarget::DefaultSlot) => {
        Some(ExportExpr::Name(self.default_names[&target].clone()))
      }
      Some(ExportTarget::ReExport { module, name }) => {
        self.export_expr(target, exports_self, module, &name, seen)
      }
      Some(ExportTarget::Namespace { module }) => self.namespace_expr(target, exports_self, module),
    }
  }

  // The expression that reads a module-level symbol, following import
  // aliases through to their sources.
  fn symbol_expr(
    &mut self,
    module: usize,
    exports_self: Option<usize>,
    symbol: SymbolId,
    seen: &mut HashSet<(usize, String)>,
  ) -> Option<ExportExpr> {
    let alias = self.alias_info[&module].get(&symbol).cloned();
    let Some((target, imported)) = alias else {
      return Some(ExportExpr::Name(self.emitted_name(module, symbol)));
    };
    match imported {
      ImportedName::Default => self.export_expr(module, exports_self, target, "default", seen),
      ImportedName::Named(name) => self.export_expr(module, exports_self, target, &name, seen),
      ImportedName::Namespace => self.namespace_expr(module, exports_self, target),
    }
  }

  fn namespace_expr(
    &mut self,
    viewer: usize,
    exports_self: Option<usize>,
    target: usize,
  ) -> Option<ExportExpr> {
    if exports_self == Some(target) {
      return Some(ExportExpr::Exports);
    }
    if self.same_group(viewer, target) && !self.is_dynamic(target) {
      return Some(ExportExpr::Name(self.ns_obj_names.get(&target)?.clone()));
    }
    Some(ExportExpr::Name(
      self.require_locals.get(&(viewer, target))?.clone(),
    ))
  }

  // ---- emission ----

  fn emit_groups(&mut self) -> LinkedEntry {
    let mut groups = Vec::new();
    for group_pos in 0..self.group_order.len() {
      let root = self.group_order[group_pos];
      let members = self.members_of[&root].clone();
      let mut flags = GroupFlags::default();
      let mut linked_members = Vec::new();
      for &member in &members {
        let body = self.emit_member(member, root, &members, &mut flags);
        linked_members.push(LinkedModule {
          abs_path: self.module(member).abs_path.clone(),
          body,
        });
      }
      groups.push(LinkedGroup {
        id: self.module_id(root),
        members: linked_members,
        uses_require: flags.require,
        uses_exports: flags.exports,
        uses_module: flags.module,
      });
    }
    LinkedEntry {
      groups,
      entry_group_id: self.module_id(self.entry),
    }
  }

  fn emit_member(
    &mut self,
    member: usize,
    root: usize,
    members: &[usize],
    flags: &mut GroupFlags,
  ) -> Vec<Node<Stmt>> {
    let free = self.module(member).scopes.free_refs;
    flags.require |= free.require;
    flags.module |= free.module;
    flags.exports |= free.exports;

    // Build the replacement map for this member's reference sites.
    let mut replacements: HashMap<SymbolId, Replacement> = HashMap::new();
    for (&(owner, symbol), name) in &self.renames {
      if owner == member {
        replacements.insert(symbol, Replacement::Name(name.clone()));
      }
    }
    let aliases = self.alias_info[&member].clone();
    for (symbol, (target, imported)) in aliases {
      if !self.same_group(member, target) {
        let local = self.require_locals[&(member, target)].clone();
        let replacement = match imported {
          ImportedName::Default => Replacement::Member {
            obj: local,
            prop: "default".to_string(),
          },
          ImportedName::Named(name) => Replacement::Member {
            obj: local,
            prop: name,
          },
          ImportedName::Namespace => Replacement::Name(local),
        };
        replacements.insert(symbol, replacement);
        continue;
      }
      let mut seen = HashSet::new();
      let resolved = match &imported {
        ImportedName::Default => {
          self.warn_default_cycle(member, target, members);
          self.export_expr(member, None, target, "default", &mut seen)
        }
        ImportedName::Named(name) => {
          let name = name.clone();
          self.export_expr(member, None, target, &name, &mut seen)
        }
        ImportedName::Namespace => self.namespace_expr(member, None, target),
      };
      let Some(resolved) = resolved else {
        let loc = self.module(member).ast.loc;
        let what = match &imported {
          ImportedName::Default => "default".to_string(),
          ImportedName::Named(name) => name.clone(),
          ImportedName::Namespace => continue,
        };
        self.error(
          loc,
          member,
          CODE_MISSING_EXPORT,
          format!(
            "\"{}\" has no export named \"{}\"",
            self.module(target).abs_path,
            what
          ),
        );
        continue;
      };
      replacements.insert(symbol, export_expr_to_replacement(resolved));
    }

    // Statement surgery over a fresh clone of the module body.
    let body: Vec<Node<Stmt>> = self.module(member).ast.stx.body.clone();
    let statics = self.static_targets[&member].clone();
    let mut new_body: Vec<Node<Stmt>> = Vec::new();
    let mut locals_emitted: HashSet<usize> = HashSet::new();
    for mut stmt in body {
      let keep = match stmt.stx.as_mut() {
        Stmt::Import(import) => {
          let target = statics[&import.stx.module];
          if self.same_group(member, target) {
            // The target's body is inlined in this group, in dependency
            // order; the import dissolves entirely.
          } else if import.stx.default.is_none() && import.stx.names.is_none() {
            // Side-effect import: instantiate, bind nothing.
            flags.require = true;
            new_body.push(require_stmt(self.module_id(target), &import.stx.module));
          } else {
            self.push_require_local(
              member,
              target,
              &import.stx.module,
              &mut new_body,
              &mut locals_emitted,
              flags,
            );
          }
          false
        }
        Stmt::ExportNamed(export) => {
          if let Some(from) = &export.stx.from {
            let target = statics[from];
            if !self.same_group(member, target) {
              let from = from.clone();
              self.push_require_local(
                member,
                target,
                &from,
                &mut new_body,
                &mut locals_emitted,
                flags,
              );
            }
          }
          false
        }
        Stmt::ExportAll(export) => {
          let target = statics[&export.stx.module];
          if !self.same_group(member, target) {
            let text = export.stx.module.clone();
            self.push_require_local(member, target, &text, &mut new_body, &mut locals_emitted, flags);
          }
          false
        }
        Stmt::ExportDefault(export) => {
          let name = self.default_names[&member].clone();
          let expr = std::mem::replace(
            &mut export.stx.expr,
            Node::synthetic(Expr::LitNull(Node::synthetic(parse_js::ast::expr::NullLit {}))),
          );
          new_body.push(const_decl(&name, *expr.stx, expr.loc));
          false
        }
        Stmt::Var(decl) => {
          decl.stx.export = false;
          true
        }
        Stmt::Func(decl) => {
          if decl.stx.export_default && decl.stx.name.is_none() {
            decl.stx.name = Some(Node::synthetic(ClassOrFuncName {
              name: self.default_names[&member].clone(),
              symbol: None,
            }));
          }
          decl.stx.export = false;
          decl.stx.export_default = false;
          true
        }
        Stmt::Class(decl) => {
          if decl.stx.export_default && decl.stx.name.is_none() {
            decl.stx.name = Some(Node::synthetic(ClassOrFuncName {
              name: self.default_names[&member].clone(),
              symbol: None,
            }));
          }
          decl.stx.export = false;
          decl.stx.export_default = false;
          true
        }
        _ => true,
      };
      if keep {
        new_body.push(stmt);
      }
    }

    // Rewrite references and literal require calls in the surviving code.
    let require_ids: HashMap<String, u32> = self.require_targets[&member]
      .iter()
      .map(|(text, &target)| (text.clone(), self.module_id(target)))
      .collect();
    let mut rewriter = RewriteVisitor {
      replacements: &replacements,
      require_ids: &require_ids,
      rewrote_require: false,
      non_literal_requires: Vec::new(),
    };
    for stmt in new_body.iter_mut() {
      stmt.drive_mut(&mut rewriter);
    }
    flags.require |= rewriter.rewrote_require;
    let warn_locs = rewriter.non_literal_requires.clone();
    for loc in warn_locs {
      let file = self.module(member).file_id();
      self.log.add(Diagnostic::warning(
        CODE_NON_LITERAL_REQUIRE,
        "this call to \"require\" will not be bundled because the argument is not a string literal",
        loc.to_span(file),
      ));
    }

    let has_exports_shim = member == root && has_declarative_exports_module(self.module(member));

    // Runtime copies for `export *` against dynamic targets go at the end of
    // the body, after the namespace locals they read are initialized.
    if has_exports_shim {
      let star_dynamic = self.exports_memo[&member].star_dynamic.clone();
      let mut copied = HashSet::new();
      for target in star_dynamic {
        if !copied.insert(target) {
          continue;
        }
        let Some(local) = self.require_locals.get(&(member, target)).cloned() else {
          continue;
        };
        if locals_emitted.insert(target) {
          new_body.push(const_like_decl(
            VarDeclMode::Const,
            &local,
            Expr::Require(Node::synthetic(RequireExpr {
              target: self.module_id(target),
              text: self.module(target).abs_path.clone(),
            })),
          ));
        }
        new_body.push(expr_stmt(call_expr(
          id_expr("require"),
          vec![id_expr("exports"), id_expr(&local)],
        )));
        flags.require = true;
        flags.exports = true;
      }
    }

    // Namespace-object materialisation, then the exports shim, go at the
    // very top of the member's body.
    let mut prelude: Vec<Node<Stmt>> = Vec::new();
    if let Some(ns_name) = self.ns_obj_names.get(&member).cloned() {
      prelude.push(const_like_decl(
        VarDeclMode::Var,
        &ns_name,
        Expr::LitObject(Node::synthetic(ObjectLit {
          members: Vec::new(),
        })),
      ));
      let descriptors = self.descriptor_object(member, None);
      prelude.push(expr_stmt(call_expr(
        id_expr("require"),
        vec![id_expr(&ns_name), descriptors],
      )));
      flags.require = true;
    }
    if has_exports_shim {
      let descriptors = self.descriptor_object(member, Some(member));
      prelude.push(expr_stmt(call_expr(
        id_expr("require"),
        vec![id_expr("exports"), descriptors],
      )));
      flags.require = true;
      flags.exports = true;
    }
    prelude.extend(new_body);
    prelude
  }

  fn push_require_local(
    &mut self,
    member: usize,
    target: usize,
    text: &str,
    new_body: &mut Vec<Node<Stmt>>,
    locals_emitted: &mut HashSet<usize>,
    flags: &mut GroupFlags,
  ) {
    if !locals_emitted.insert(target) {
      return;
    }
    let local = self.require_locals[&(member, target)].clone();
    flags.require = true;
    new_body.push(const_like_decl(
      VarDeclMode::Const,
      &local,
      Expr::Require(Node::synthetic(RequireExpr {
        target: self.module_id(target),
        text: text.to_string(),
      })),
    ));
  }

  /// Builds the getter-descriptor object for a module's public exports, keys
  /// in lexicographic order, values as live thunks.
  fn descriptor_object(&mut self, member: usize, exports_self: Option<usize>) -> Node<Expr> {
    let map = self.exports_memo[&member].clone();
    let mut props: Vec<(String, Node<Expr>)> = Vec::new();
    for (name, target) in &map.entries {
      let mut seen = HashSet::new();
      let value = match target {
        ExportTarget::Local(symbol) => self.symbol_expr(member, exports_self, *symbol, &mut seen),
        ExportTarget::DefaultSlot => Some(ExportExpr::Name(self.default_names[&member].clone())),
        ExportTarget::ReExport { module, name } => {
          let name = name.clone();
          self.export_expr(member, exports_self, *module, &name, &mut seen)
        }
        ExportTarget::Namespace { module } => self.namespace_expr(member, exports_self, *module),
      };
      let Some(value) = value else {
        continue;
      };
      props.push((name.clone(), export_expr_to_ast(value)));
    }
    props.sort_by(|(a, _), (b, _)| a.cmp(b));

    let members = props
      .into_iter()
      .map(|(name, value)| {
        Node::synthetic(ObjectMember::Prop(Node::synthetic(ObjectProp {
          key: PropKey::Ident(name),
          value: ObjectPropValue::Expr(thunk(value)),
        })))
      })
      .collect();
    Node::synthetic(Expr::LitObject(Node::synthetic(ObjectLit { members })))
  }

  fn warn_default_cycle(&mut self, member: usize, target: usize, members: &[usize]) {
    let member_pos = members.iter().position(|&m| m == member);
    let target_pos = members.iter().position(|&m| m == target);
    if let (Some(member_pos), Some(target_pos)) = (member_pos, target_pos) {
      if target_pos >= member_pos {
        let file = self.module(member).file_id();
        let loc = self.module(member).ast.loc;
        self.log.add(Diagnostic::warning(
          CODE_DEFAULT_CYCLE,
          format!(
            "cyclic default import of \"{}\" evaluates to undefined until the binding is initialized",
            self.module(target).abs_path
          ),
          loc.to_span(file),
        ));
      }
    }
  }

  fn error(&mut self, loc: Loc, module: usize, code: &'static str, message: String) {
    let file = self.module(module).file_id();
    self.log.add(Diagnostic::error(code, message, loc.to_span(file)));
    self.errors += 1;
  }
}

#[derive(Default)]
struct GroupFlags {
  require: bool,
  exports: bool,
  module: bool,
}

fn has_declarative_exports_module(module: &crate::graph::Module) -> bool {
  crate::scan::has_declarative_exports(&module.ast)
}

fn pat_bindings(pat: &Node<Pat>) -> Vec<(String, SymbolId)> {
  let mut out = Vec::new();
  collect_pat_bindings(pat, &mut out);
  out
}

fn collect_pat_bindings(pat: &Node<Pat>, out: &mut Vec<(String, SymbolId)>) {
  match pat.stx.as_ref() {
    Pat::Id(id) => {
      if let Some(symbol) = id.stx.symbol {
        out.push((id.stx.name.clone(), symbol));
      }
    }
    Pat::Array(array) => {
      for element in array.stx.elements.iter().flatten() {
        collect_pat_bindings(&element.stx.target, out);
      }
      if let Some(rest) = &array.stx.rest {
        collect_pat_bindings(rest, out);
      }
    }
    Pat::Object(object) => {
      for property in &object.stx.properties {
        collect_pat_bindings(&property.stx.target, out);
      }
      if let Some(rest) = &object.stx.rest {
        if let Some(symbol) = rest.stx.symbol {
          out.push((rest.stx.name.clone(), symbol));
        }
      }
    }
  }
}

fn sanitize_name(raw: &str) -> String {
  let mut out = String::with_capacity(raw.len());
  for (idx, c) in raw.chars().enumerate() {
    let valid = if idx == 0 { is_id_start(c) } else { is_id_continue(c) };
    out.push(if valid { c } else { '_' });
  }
  if out.is_empty() {
    out.push('_');
  }
  out
}

/// First free name: the base itself, else the base suffixed with the
/// smallest integer starting at 2.
fn unique_name(base: &str, used: &mut HashSet<String>) -> String {
  if used.insert(base.to_string()) {
    return base.to_string();
  }
  let mut suffix = 2usize;
  loop {
    let candidate = format!("{}{}", base, suffix);
    if used.insert(candidate.clone()) {
      return candidate;
    }
    suffix += 1;
  }
}

fn export_expr_to_replacement(expr: ExportExpr) -> Replacement {
  match expr {
    ExportExpr::Name(name) => Replacement::Name(name),
    ExportExpr::Member { obj, prop } => Replacement::Member { obj, prop },
    ExportExpr::Exports => Replacement::Name("exports".to_string()),
  }
}

fn export_expr_to_ast(expr: ExportExpr) -> Node<Expr> {
  match expr {
    ExportExpr::Exports => id_expr("exports"),
    ExportExpr::Name(name) => id_expr(&name),
    ExportExpr::Member { obj, prop } => Node::synthetic(Expr::Member(Node::synthetic(MemberExpr {
      obj: id_expr(&obj),
      prop,
      optional_chaining: false,
    }))),
  }
}

fn id_expr(name: &str) -> Node<Expr> {
  Node::synthetic(Expr::Id(Node::synthetic(IdExpr::new(name))))
}

fn thunk(value: Node<Expr>) -> Node<Expr> {
  Node::synthetic(Expr::Arrow(Node::synthetic(ArrowFuncExpr {
    params: Vec::new(),
    body: ArrowFuncBody::Expr(value),
    is_async: false,
  })))
}

fn call_expr(callee: Node<Expr>, args: Vec<Node<Expr>>) -> Node<Expr> {
  let args = args
    .into_iter()
    .map(|value| {
      Node::synthetic(CallArg {
        spread: false,
        value,
      })
    })
    .collect();
  Node::synthetic(Expr::Call(Node::synthetic(CallExpr {
    callee,
    args,
  })))
}

fn expr_stmt(expr: Node<Expr>) -> Node<Stmt> {
  Node::synthetic(Stmt::Expr(Node::synthetic(ExprStmt { expr })))
}

fn require_stmt(id: u32, text: &str) -> Node<Stmt> {
  expr_stmt(Node::synthetic(Expr::Require(Node::synthetic(RequireExpr {
    target: id,
    text: text.to_string(),
  }))))
}

fn const_decl(name: &str, init: Expr, loc: Loc) -> Node<Stmt> {
  let declarator = Node::synthetic(VarDeclarator {
    pattern: Node::synthetic(Pat::Id(Node::synthetic(IdPat::new(name)))),
    initializer: Some(Node::new(loc, init)),
  });
  Node::synthetic(Stmt::Var(Node::synthetic(VarDecl {
    export: false,
    mode: VarDeclMode::Const,
    declarators: vec![declarator],
  })))
}

fn const_like_decl(mode: VarDeclMode, name: &str, init: Expr) -> Node<Stmt> {
  let declarator = Node::synthetic(VarDeclarator {
    pattern: Node::synthetic(Pat::Id(Node::synthetic(IdPat::new(name)))),
    initializer: Some(Node::synthetic(init)),
  });
  Node::synthetic(Stmt::Var(Node::synthetic(VarDecl {
    export: false,
    mode,
    declarators: vec![declarator],
  })))
}

type ExprNode = Node<Expr>;
type IdPatNode = Node<IdPat>;
type ClassOrFuncNameNode = Node<ClassOrFuncName>;
type ObjectMemberNode = Node<ObjectMember>;

#[derive(VisitorMut)]
#[visitor(
  ExprNode(enter),
  IdPatNode(enter),
  ClassOrFuncNameNode(enter),
  ObjectMemberNode(enter)
)]
struct RewriteVisitor<'a> {
  replacements: &'a HashMap<SymbolId, Replacement>,
  require_ids: &'a HashMap<String, u32>,
  rewrote_require: bool,
  non_literal_requires: Vec<Loc>,
}

impl<'a> RewriteVisitor<'a> {
  fn enter_expr_node(&mut self, node: &mut ExprNode) {
    let replacement: Option<Expr> = match node.stx.as_ref() {
      Expr::Id(id) => id.stx.symbol.and_then(|symbol| {
        self.replacements.get(&symbol).map(|replacement| match replacement {
          Replacement::Name(name) => Expr::Id(Node::new(id.loc, IdExpr::new(name.as_str()))),
          Replacement::Member { obj, prop } => Expr::Member(Node::new(id.loc, MemberExpr {
            obj: Node::new(id.loc, Expr::Id(Node::new(id.loc, IdExpr::new(obj.as_str())))),
            prop: prop.clone(),
            optional_chaining: false,
          })),
        })
      }),
      Expr::Call(call) => self.rewrite_require_call(call),
      _ => None,
    };
    if let Some(replacement) = replacement {
      *node.stx = replacement;
    }
  }

  fn rewrite_require_call(&mut self, call: &Node<CallExpr>) -> Option<Expr> {
    let Expr::Id(callee) = call.stx.callee.stx.as_ref() else {
      return None;
    };
    if callee.stx.name != "require" || callee.stx.symbol.is_some() {
      return None;
    }
    if call.stx.args.len() != 1 || call.stx.args[0].stx.spread {
      self.non_literal_requires.push(call.loc);
      return None;
    }
    let Expr::LitString(arg) = call.stx.args[0].stx.value.stx.as_ref() else {
      self.non_literal_requires.push(call.loc);
      return None;
    };
    let text = arg.stx.value.clone();
    let Some(&target) = self.require_ids.get(&text) else {
      // Resolution already failed and was reported.
      return None;
    };
    self.rewrote_require = true;
    Some(Expr::Require(Node::new(call.loc, RequireExpr {
      target,
      text,
    })))
  }

  fn enter_id_pat_node(&mut self, node: &mut IdPatNode) {
    if let Some(symbol) = node.stx.symbol {
      if let Some(Replacement::Name(name)) = self.replacements.get(&symbol) {
        node.stx.name = name.clone();
      }
    }
  }

  fn enter_class_or_func_name_node(&mut self, node: &mut ClassOrFuncNameNode) {
    if let Some(symbol) = node.stx.symbol {
      if let Some(Replacement::Name(name)) = self.replacements.get(&symbol) {
        node.stx.name = name.clone();
      }
    }
  }

  fn enter_object_member_node(&mut self, node: &mut ObjectMemberNode) {
    let converted: Option<ObjectMember> = match node.stx.as_ref() {
      ObjectMember::Shorthand(id) => id.stx.symbol.and_then(|symbol| {
        self.replacements.get(&symbol).map(|replacement| {
          let value = match replacement {
            Replacement::Name(name) => {
              Node::new(id.loc, Expr::Id(Node::new(id.loc, IdExpr::new(name.as_str()))))
            }
            Replacement::Member { obj, prop } => Node::new(
              id.loc,
              Expr::Member(Node::new(id.loc, MemberExpr {
                obj: Node::new(id.loc, Expr::Id(Node::new(id.loc, IdExpr::new(obj.as_str())))),
                prop: prop.clone(),
                optional_chaining: false,
              })),
            ),
          };
          ObjectMember::Prop(Node::new(id.loc, ObjectProp {
            key: PropKey::Ident(id.stx.name.clone()),
            value: ObjectPropValue::Expr(value),
          }))
        })
      }),
      _ => None,
    };
    if let Some(converted) = converted {
      *node.stx = converted;
    }
  }
}
