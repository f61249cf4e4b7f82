//! Import resolution: relative paths with an extension list, directory
//! resolution through `package.json` `"main"` and `index` files,
//! `tsconfig.json` `baseUrl` for non-relative specifiers, and the
//! `node_modules` ancestor walk.

pub mod fs;
pub mod path;

use fs::FileSystem;
use serde::Deserialize;

pub const DEFAULT_EXTENSIONS: &[&str] = &[".jsx", ".js", ".json"];

#[derive(Deserialize)]
struct PackageJson {
  main: Option<String>,
}

#[derive(Deserialize)]
struct TsConfig {
  #[serde(rename = "compilerOptions")]
  compiler_options: Option<TsCompilerOptions>,
}

#[derive(Deserialize)]
struct TsCompilerOptions {
  #[serde(rename = "baseUrl")]
  base_url: Option<String>,
}

pub struct Resolver<'fs> {
  fs: &'fs dyn FileSystem,
  extensions: Vec<String>,
}

impl<'fs> Resolver<'fs> {
  pub fn new(fs: &'fs dyn FileSystem, extensions: &[&str]) -> Resolver<'fs> {
    Resolver {
      fs,
      extensions: extensions.iter().map(|ext| ext.to_string()).collect(),
    }
  }

  /// Maps an import specifier, as written in `referrer`, to the canonical
  /// absolute path of the module it names. `None` means unresolvable.
  pub fn resolve(&self, referrer: &str, import_path: &str) -> Option<String> {
    if path::is_abs(import_path) {
      return self.load_file_or_dir(&path::clean(import_path));
    }
    let referrer_dir = path::dir(referrer);
    if import_path.starts_with("./") || import_path.starts_with("../") {
      return self.load_file_or_dir(&path::join(referrer_dir, import_path));
    }
    self
      .resolve_via_tsconfig(referrer_dir, import_path)
      .or_else(|| self.resolve_via_node_modules(referrer_dir, import_path))
  }

  /// Entry paths come straight from the caller and only need file/directory
  /// completion, not specifier handling.
  pub fn resolve_entry(&self, entry_path: &str) -> Option<String> {
    self.load_file_or_dir(&path::clean(entry_path))
  }

  // The nearest ancestor tsconfig.json with a baseUrl roots non-relative
  // specifiers at that directory.
  fn resolve_via_tsconfig(&self, referrer_dir: &str, import_path: &str) -> Option<String> {
    for ancestor in path::ancestors(referrer_dir) {
      let config_path = path::join(ancestor, "tsconfig.json");
      let Some(source) = self.fs.read_file(&config_path) else {
        continue;
      };
      let config: TsConfig = serde_json::from_str(&source).ok()?;
      let base_url = config.compiler_options?.base_url?;
      let base = path::join(ancestor, &base_url);
      return self.load_file_or_dir(&path::join(&base, import_path));
    }
    None
  }

  fn resolve_via_node_modules(&self, referrer_dir: &str, import_path: &str) -> Option<String> {
    for ancestor in path::ancestors(referrer_dir) {
      let candidate = path::join(&path::join(ancestor, "node_modules"), import_path);
      if let Some(found) = self.load_file_or_dir(&candidate) {
        return Some(found);
      }
    }
    None
  }

  fn load_file_or_dir(&self, base: &str) -> Option<String> {
    self.load_file(base).or_else(|| self.load_dir(base))
  }

  fn load_file(&self, base: &str) -> Option<String> {
    if self.fs.is_file(base) {
      return Some(base.to_string());
    }
    for ext in &self.extensions {
      let candidate = format!("{}{}", base, ext);
      if self.fs.is_file(&candidate) {
        return Some(candidate);
      }
    }
    None
  }

  fn load_dir(&self, base: &str) -> Option<String> {
    if !self.fs.is_dir(base) {
      return None;
    }
    if let Some(source) = self.fs.read_file(&path::join(base, "package.json")) {
      if let Ok(package) = serde_json::from_str::<PackageJson>(&source) {
        if let Some(main) = package.main {
          if let Some(found) = self.load_file_or_dir(&path::join(base, &main)) {
            return Some(found);
          }
        }
      }
    }
    self.load_file(&path::join(base, "index"))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use fs::MockFs;

  fn resolver(fs: &MockFs) -> Resolver<'_> {
    Resolver::new(fs, DEFAULT_EXTENSIONS)
  }

  #[test]
  fn resolves_relative_with_extension_list() {
    let fs = MockFs::new([("/src/entry.js", ""), ("/src/foo.jsx", "")]);
    let resolver = resolver(&fs);
    assert_eq!(
      resolver.resolve("/src/entry.js", "./foo").as_deref(),
      Some("/src/foo.jsx")
    );
  }

  #[test]
  fn prefers_exact_file_over_extension_probe() {
    let fs = MockFs::new([("/src/entry.js", ""), ("/src/foo", ""), ("/src/foo.js", "")]);
    let resolver = resolver(&fs);
    assert_eq!(
      resolver.resolve("/src/entry.js", "./foo").as_deref(),
      Some("/src/foo")
    );
  }

  #[test]
  fn resolves_bare_specifier_through_node_modules_walk() {
    let fs = MockFs::new([
      ("/Users/user/project/src/entry.js", ""),
      ("/Users/user/project/node_modules/demo-pkg/index.js", ""),
    ]);
    let resolver = resolver(&fs);
    assert_eq!(
      resolver
        .resolve("/Users/user/project/src/entry.js", "demo-pkg")
        .as_deref(),
      Some("/Users/user/project/node_modules/demo-pkg/index.js")
    );
  }

  #[test]
  fn package_json_main_overrides_index() {
    let fs = MockFs::new([
      ("/p/src/entry.js", ""),
      (
        "/p/node_modules/demo-pkg/package.json",
        r#"{ "main": "./custom-main.js" }"#,
      ),
      ("/p/node_modules/demo-pkg/custom-main.js", ""),
      ("/p/node_modules/demo-pkg/index.js", ""),
    ]);
    let resolver = resolver(&fs);
    assert_eq!(
      resolver.resolve("/p/src/entry.js", "demo-pkg").as_deref(),
      Some("/p/node_modules/demo-pkg/custom-main.js")
    );
  }

  #[test]
  fn tsconfig_base_url_roots_bare_specifiers() {
    let fs = MockFs::new([
      ("/p/src/app/entry.js", ""),
      (
        "/p/src/tsconfig.json",
        r#"{ "compilerOptions": { "baseUrl": "." } }"#,
      ),
      ("/p/src/lib/util.js", ""),
    ]);
    let resolver = resolver(&fs);
    assert_eq!(
      resolver.resolve("/p/src/app/entry.js", "lib/util").as_deref(),
      Some("/p/src/lib/util.js")
    );
  }

  #[test]
  fn unresolvable_imports_return_none() {
    let fs = MockFs::new([("/entry.js", "")]);
    let resolver = resolver(&fs);
    assert_eq!(resolver.resolve("/entry.js", "./missing"), None);
    assert_eq!(resolver.resolve("/entry.js", "missing-pkg"), None);
  }

  #[test]
  fn entry_paths_resolve_directly() {
    let fs = MockFs::new([("/entry.js", "")]);
    let resolver = resolver(&fs);
    assert_eq!(resolver.resolve_entry("/entry.js").as_deref(), Some("/entry.js"));
    assert_eq!(resolver.resolve_entry("/entry").as_deref(), Some("/entry.js"));
  }
}
