//! The bundler core: scanning the module graph from entry points, linking
//! the two module conventions into emission groups, and serialising the
//! bundled artifact.
//!
//! The parser, resolver, filesystem, and diagnostic log are external
//! collaborators with narrow contracts; everything here is synchronous and
//! deterministic: two compiles of the same input are byte-identical.

pub mod emit;
pub mod graph;
pub mod link;
pub mod scan;

use diagnostics::Log;
use graph::Bundle;
use resolve_js::path;
use tracing::debug;

pub use scan::scan;

// Stable diagnostic codes (prefix `BND`).
pub const CODE_RESOLVE: &str = "BND0001";
pub const CODE_READ: &str = "BND0002";
pub const CODE_NON_LITERAL_REQUIRE: &str = "BND0003";
pub const CODE_MISSING_EXPORT: &str = "BND0004";
pub const CODE_DEFAULT_CYCLE: &str = "BND0005";

#[derive(Clone, Debug, Default)]
pub struct BundleOptions {
  /// Link the whole graph into one artifact per entry. When false, each
  /// entry is reprinted standalone with its module statements untouched.
  pub bundle: bool,
  pub abs_output_file: String,
  /// Derived from `abs_output_file`'s directory when left empty.
  pub abs_output_dir: String,
  /// Emit only the `loader({...}, entry);` call, without the loader runtime
  /// prepended.
  pub omit_loader_for_tests: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OutputFile {
  pub js_abs_path: String,
  pub js_contents: String,
}

impl Bundle {
  /// Produces one artifact per entry. Entries whose closure failed to scan
  /// or link produce nothing; the caller inspects the log and must not write
  /// output when errors were reported.
  pub fn compile(&mut self, log: &mut Log, options: &BundleOptions) -> Vec<OutputFile> {
    link::assign_ids(self);

    let output_dir = if !options.abs_output_dir.is_empty() {
      options.abs_output_dir.clone()
    } else if !options.abs_output_file.is_empty() {
      path::dir(&options.abs_output_file).to_string()
    } else {
      String::new()
    };

    let entries = self.entries.clone();
    let single_entry = entries.len() == 1;
    let mut outputs = Vec::new();
    for &entry in &entries {
      let js_abs_path = if single_entry && !options.abs_output_file.is_empty() {
        options.abs_output_file.clone()
      } else {
        path::join(&output_dir, path::base(&self.modules[entry].abs_path))
      };

      let js_contents = if options.bundle {
        let Some(linked) = link::link_entry(log, self, entry) else {
          continue;
        };
        emit::emit_entry(&linked, options.omit_loader_for_tests)
      } else {
        if self.modules[entry].failed {
          continue;
        }
        emit_js::print_stmts(&self.modules[entry].ast.stx.body, 0)
      };

      outputs.push(OutputFile {
        js_abs_path,
        js_contents,
      });
    }
    debug!(outputs = outputs.len(), "compile complete");
    outputs
  }
}
