use ahash::HashMap;
use diagnostics::FileId;
use diagnostics::render::SourceProvider;
use parse_js::ast::node::Node;
use parse_js::ast::stx::TopLevel;
use parse_js::loc::Loc;
use parse_js::symbol::ModuleScopes;

/// Which module convention a module follows, computed once after parsing.
/// Everything downstream dispatches on this tag.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ModuleTag {
  /// Declarative `import`/`export` only.
  Static,
  /// Free references to `require`, `module`, or `exports` at any nesting.
  Dynamic,
  /// Declarative `export` forms combined with free CommonJS references.
  /// Emitted like `Dynamic`, plus the exports shim for the declarative part.
  Hybrid,
}

impl ModuleTag {
  /// Whether the module is emitted as its own wrapped group.
  pub fn is_dynamic_emitted(&self) -> bool {
    !matches!(self, ModuleTag::Static)
  }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EdgeKind {
  StaticImport,
  DynamicRequire,
}

/// One outbound dependency of a module, in source order.
#[derive(Clone, Debug)]
pub struct Edge {
  pub kind: EdgeKind,
  /// The import text as written (`./foo`, `demo-pkg`, ...).
  pub text: String,
  pub loc: Loc,
  /// Arena index of the resolved target. `None` only if resolution failed,
  /// which also fails the compile for any entry reaching this module.
  pub target: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct SourceFile {
  pub abs_path: String,
  pub text: String,
}

/// One module: a distinct source file identified by canonical absolute path.
pub struct Module {
  pub abs_path: String,
  /// Index into [`Bundle::sources`]; doubles as the diagnostics `FileId`.
  pub source: u32,
  pub ast: Node<TopLevel>,
  pub scopes: ModuleScopes,
  pub tag: ModuleTag,
  pub edges: Vec<Edge>,
  /// Assigned by the linker: contiguous from zero, in lexicographic path
  /// order per entry closure.
  pub id: Option<u32>,
  /// Parse failed; any entry whose closure contains this module produces no
  /// output.
  pub failed: bool,
}

impl Module {
  pub fn file_id(&self) -> FileId {
    FileId(self.source)
  }
}

/// The complete result of scanning: modules keyed by path plus entry ids.
/// The graph may be cyclic; edges carry arena indices, never owning
/// references.
pub struct Bundle {
  pub sources: Vec<SourceFile>,
  pub modules: Vec<Module>,
  pub by_path: HashMap<String, usize>,
  pub entries: Vec<usize>,
}

impl SourceProvider for Bundle {
  fn file_name(&self, file: FileId) -> &str {
    &self.sources[file.0 as usize].abs_path
  }

  fn file_text(&self, file: FileId) -> &str {
    &self.sources[file.0 as usize].text
  }
}
