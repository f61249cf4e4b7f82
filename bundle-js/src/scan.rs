use crate::graph::Bundle;
use crate::graph::Edge;
use crate::graph::EdgeKind;
use crate::graph::Module;
use crate::graph::ModuleTag;
use crate::graph::SourceFile;
use crate::CODE_READ;
use crate::CODE_RESOLVE;
use ahash::HashMap;
use ahash::HashMapExt;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use diagnostics::Diagnostic;
use diagnostics::Log;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::Stmt;
use parse_js::ast::stx::TopLevel;
use parse_js::loc::Loc;
use parse_js::parse;
use parse_js::symbol::compute_module_scopes;
use parse_js::symbol::ModuleScopes;
use parse_js::ParseOptions;
use resolve_js::fs::FileSystem;
use resolve_js::Resolver;
use std::collections::VecDeque;
use tracing::debug;

/// Discovers the module graph from the entry paths: resolve, read, parse,
/// classify, collect outbound edges, and repeat over a FIFO queue so
/// traversal order is deterministic.
pub fn scan(
  log: &mut Log,
  fs: &dyn FileSystem,
  resolver: &Resolver,
  entry_paths: &[String],
  parse_options: &ParseOptions,
) -> Bundle {
  let mut scanner = Scanner {
    fs,
    parse_options,
    bundle: Bundle {
      sources: Vec::new(),
      modules: Vec::new(),
      by_path: HashMap::new(),
      entries: Vec::new(),
    },
    queue: VecDeque::new(),
  };

  for entry_path in entry_paths {
    let Some(abs_path) = resolver.resolve_entry(entry_path) else {
      log.add(Diagnostic::error_nowhere(
        CODE_RESOLVE,
        format!("could not resolve entry point \"{}\"", entry_path),
      ));
      continue;
    };
    let idx = scanner.ensure_module(log, &abs_path);
    // Duplicate entry paths are deduplicated silently.
    if !scanner.bundle.entries.contains(&idx) {
      scanner.bundle.entries.push(idx);
    }
  }

  while let Some(idx) = scanner.queue.pop_front() {
    let referrer = scanner.bundle.modules[idx].abs_path.clone();
    let file = scanner.bundle.modules[idx].file_id();
    for edge_idx in 0..scanner.bundle.modules[idx].edges.len() {
      let (text, loc) = {
        let edge = &scanner.bundle.modules[idx].edges[edge_idx];
        (edge.text.clone(), edge.loc)
      };
      match resolver.resolve(&referrer, &text) {
        Some(target_path) => {
          let target = scanner.ensure_module(log, &target_path);
          scanner.bundle.modules[idx].edges[edge_idx].target = Some(target);
        }
        None => {
          log.add(Diagnostic::error(
            CODE_RESOLVE,
            format!("could not resolve \"{}\"", text),
            loc.to_span(file),
          ));
        }
      }
    }
  }

  debug!(
    modules = scanner.bundle.modules.len(),
    entries = scanner.bundle.entries.len(),
    "scan complete"
  );
  scanner.bundle
}

struct Scanner<'a> {
  fs: &'a dyn FileSystem,
  parse_options: &'a ParseOptions,
  bundle: Bundle,
  queue: VecDeque<usize>,
}

impl<'a> Scanner<'a> {
  fn ensure_module(&mut self, log: &mut Log, abs_path: &str) -> usize {
    if let Some(&idx) = self.bundle.by_path.get(abs_path) {
      return idx;
    }

    let source_id = self.bundle.sources.len() as u32;
    let text = self.fs.read_file(abs_path).unwrap_or_else(|| {
      log.add(Diagnostic::error_nowhere(
        CODE_READ,
        format!("could not read \"{}\"", abs_path),
      ));
      String::new()
    });
    self.bundle.sources.push(SourceFile {
      abs_path: abs_path.to_string(),
      text: text.clone(),
    });

    let module = match parse(&text, self.parse_options) {
      Ok(mut ast) => {
        let scopes = compute_module_scopes(&mut ast);
        let tag = classify(&ast, &scopes, self.parse_options.is_bundling);
        let edges = collect_edges(&ast, self.parse_options.is_bundling);
        Module {
          abs_path: abs_path.to_string(),
          source: source_id,
          ast,
          scopes,
          tag,
          edges,
          id: None,
          failed: false,
        }
      }
      Err(err) => {
        log.add(err.to_diagnostic(diagnostics::FileId(source_id)));
        Module {
          abs_path: abs_path.to_string(),
          source: source_id,
          ast: Node::synthetic(TopLevel { body: Vec::new() }),
          scopes: ModuleScopes::default(),
          tag: ModuleTag::Static,
          edges: Vec::new(),
          id: None,
          failed: true,
        }
      }
    };

    let idx = self.bundle.modules.len();
    self.bundle.modules.push(module);
    self.bundle.by_path.insert(abs_path.to_string(), idx);
    self.queue.push_back(idx);
    idx
  }
}

/// Assigns the module convention tag from the symbol analysis.
fn classify(ast: &Node<TopLevel>, scopes: &ModuleScopes, is_bundling: bool) -> ModuleTag {
  if !is_bundling || !scopes.free_refs.any() {
    return ModuleTag::Static;
  }
  if has_declarative_exports(ast) {
    ModuleTag::Hybrid
  } else {
    ModuleTag::Dynamic
  }
}

pub fn has_declarative_exports(ast: &Node<TopLevel>) -> bool {
  ast.stx.body.iter().any(|stmt| match stmt.stx.as_ref() {
    Stmt::ExportAll(_) | Stmt::ExportDefault(_) | Stmt::ExportNamed(_) => true,
    Stmt::Var(decl) => decl.stx.export,
    Stmt::Func(decl) => decl.stx.export || decl.stx.export_default,
    Stmt::Class(decl) => decl.stx.export || decl.stx.export_default,
    _ => false,
  })
}

type CallExprNode = Node<CallExpr>;

#[derive(Visitor, Default)]
#[visitor(CallExprNode(enter))]
struct RequireCollector {
  requires: Vec<(String, Loc)>,
}

impl RequireCollector {
  fn enter_call_expr_node(&mut self, node: &CallExprNode) {
    let Expr::Id(callee) = node.stx.callee.stx.as_ref() else {
      return;
    };
    if callee.stx.name != "require" || callee.stx.symbol.is_some() {
      return;
    }
    if node.stx.args.len() != 1 || node.stx.args[0].stx.spread {
      return;
    }
    if let Expr::LitString(arg) = node.stx.args[0].stx.value.stx.as_ref() {
      self.requires.push((arg.stx.value.clone(), node.loc));
    }
  }
}

/// Enumerates a module's outbound edges in source order: declarative module
/// specifiers plus literal `require(...)` calls at any nesting.
fn collect_edges(ast: &Node<TopLevel>, is_bundling: bool) -> Vec<Edge> {
  let mut edges = Vec::new();
  for stmt in &ast.stx.body {
    match stmt.stx.as_ref() {
      Stmt::Import(import) => edges.push(Edge {
        kind: EdgeKind::StaticImport,
        text: import.stx.module.clone(),
        loc: stmt.loc,
        target: None,
      }),
      Stmt::ExportAll(export) => edges.push(Edge {
        kind: EdgeKind::StaticImport,
        text: export.stx.module.clone(),
        loc: stmt.loc,
        target: None,
      }),
      Stmt::ExportNamed(export) => {
        if let Some(from) = &export.stx.from {
          edges.push(Edge {
            kind: EdgeKind::StaticImport,
            text: from.clone(),
            loc: stmt.loc,
            target: None,
          });
        }
      }
      _ => {}
    }
    if is_bundling {
      let mut collector = RequireCollector::default();
      stmt.drive(&mut collector);
      for (text, loc) in collector.requires {
        edges.push(Edge {
          kind: EdgeKind::DynamicRequire,
          text,
          loc,
          target: None,
        });
      }
    }
  }
  edges
}
