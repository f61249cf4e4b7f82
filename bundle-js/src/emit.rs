use crate::link::LinkedEntry;

/// The loader runtime prepended to production output. Modules are keyed by
/// id; `require(id)` instantiates at most once, and `require(obj, getters)`
/// installs live export getters (or copies another namespace's properties
/// through).
pub const LOADER_RUNTIME: &str = r#"const loader = (modules, entry) => {
  const cache = {};
  const require = (id, getters) => {
    if (typeof id === "object") {
      const target = id;
      for (const key of Object.keys(getters)) {
        const get = typeof getters[key] === "function" ? getters[key] : () => getters[key];
        Object.defineProperty(target, key, { get, enumerable: true, configurable: true });
      }
      return target;
    }
    if (!(id in cache)) {
      const module = { exports: {} };
      cache[id] = module;
      modules[id](require, module.exports, module);
    }
    return cache[id].exports;
  };
  return require(entry);
};
"#;

/// Serialises a linked entry into the bundled artifact.
///
/// The envelope is fixed: one wrapped function per group keyed by id, groups
/// separated by a blank line, each member body preceded by a comment naming
/// its source file, and the entry's group id as the second argument. The
/// test-mode flag yields exactly this call; production additionally prepends
/// the loader runtime.
pub fn emit_entry(linked: &LinkedEntry, omit_loader_for_tests: bool) -> String {
  let mut out = String::new();
  if !omit_loader_for_tests {
    out.push_str(LOADER_RUNTIME);
  }
  out.push_str("loader({\n");
  for (group_idx, group) in linked.groups.iter().enumerate() {
    out.push_str(&format!("  {}({}) {{\n", group.id, group.params()));
    for (member_idx, member) in group.members.iter().enumerate() {
      if member_idx > 0 {
        out.push('\n');
      }
      out.push_str(&format!("    // {}\n", member.abs_path));
      out.push_str(&emit_js::print_stmts(&member.body, 2));
    }
    out.push_str("  }");
    if group_idx + 1 < linked.groups.len() {
      out.push_str(",\n\n");
    } else {
      out.push('\n');
    }
  }
  out.push_str(&format!("}}, {});\n", linked.entry_group_id));
  out
}
