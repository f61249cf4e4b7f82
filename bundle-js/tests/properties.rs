use bundle_js::scan;
use bundle_js::BundleOptions;
use bundle_js::OutputFile;
use diagnostics::Log;
use diagnostics::Severity;
use parse_js::ParseOptions;
use resolve_js::fs::MockFs;
use resolve_js::Resolver;
use resolve_js::DEFAULT_EXTENSIONS;

fn compile(
  files: Vec<(&'static str, &'static str)>,
  entries: &[&str],
) -> (Vec<OutputFile>, Vec<diagnostics::Diagnostic>, Vec<Option<u32>>) {
  let fs = MockFs::new(files);
  let resolver = Resolver::new(&fs, DEFAULT_EXTENSIONS);
  let parse_options = ParseOptions {
    is_bundling: true,
    ..ParseOptions::default()
  };
  let mut log = Log::new();
  let entries: Vec<String> = entries.iter().map(|entry| entry.to_string()).collect();
  let mut bundle = scan(&mut log, &fs, &resolver, &entries, &parse_options);
  let options = BundleOptions {
    bundle: true,
    abs_output_dir: "/out".to_string(),
    omit_loader_for_tests: true,
    ..BundleOptions::default()
  };
  let outputs = bundle.compile(&mut log, &options);
  let ids = bundle.modules.iter().map(|module| module.id).collect();
  (outputs, log.drain(), ids)
}

#[test]
fn output_is_a_pure_function_of_the_input() {
  let files = vec![
    ("/entry.js", "import {a} from './a'\nconst b = require('./b')\nconsole.log(a, b)\n"),
    ("/a.js", "export const a = 1\n"),
    ("/b.js", "exports.b = 2\n"),
  ];
  let (first, log1, _) = compile(files.clone(), &["/entry.js"]);
  let (second, log2, _) = compile(files, &["/entry.js"]);
  assert!(log1.is_empty() && log2.is_empty());
  assert_eq!(first, second);
}

#[test]
fn ids_are_unique_and_contiguous_from_zero() {
  let files = vec![
    ("/entry.js", "import './a'\nimport './b'\nrequire('./c')\n"),
    ("/a.js", "export const a = 1\n"),
    ("/b.js", "import './a'\nexport const b = 2\n"),
    ("/c.js", "module.exports = 3\n"),
  ];
  let (_, log, ids) = compile(files, &["/entry.js"]);
  assert!(log.is_empty());
  let mut ids: Vec<u32> = ids.into_iter().flatten().collect();
  ids.sort_unstable();
  assert_eq!(ids, vec![0, 1, 2, 3]);
}

#[test]
fn later_entries_extend_the_id_sequence() {
  let files = vec![
    ("/one.js", "import {shared} from './shared'\nconsole.log(shared)\n"),
    ("/two.js", "import {shared} from './shared'\nconsole.log(shared, 2)\n"),
    ("/shared.js", "export const shared = 1\n"),
  ];
  let (outputs, log, ids) = compile(files, &["/one.js", "/two.js"]);
  assert!(log.is_empty());
  assert_eq!(outputs.len(), 2);
  assert_eq!(outputs[0].js_abs_path, "/out/one.js");
  assert_eq!(outputs[1].js_abs_path, "/out/two.js");
  let mut ids: Vec<u32> = ids.into_iter().flatten().collect();
  ids.sort_unstable();
  assert_eq!(ids, vec![0, 1, 2]);
}

#[test]
fn fully_static_bundles_contain_no_require_calls() {
  let files = vec![
    ("/entry.js", "import {fn} from './foo'\nconsole.log(fn())\n"),
    ("/foo.js", "export function fn() { return 1 }\n"),
  ];
  let (outputs, log, _) = compile(files, &["/entry.js"]);
  assert!(log.is_empty());
  assert!(!outputs[0].js_contents.contains("require("));
}

#[test]
fn duplicate_entry_paths_are_deduplicated_silently() {
  let files = vec![("/entry.js", "console.log(1)\n")];
  let (outputs, log, _) = compile(files, &["/entry.js", "/entry.js"]);
  assert!(log.is_empty());
  assert_eq!(outputs.len(), 1);
}

#[test]
fn non_literal_require_is_left_in_place_with_a_warning() {
  let files = vec![("/entry.js", "const name = './x'\nconst mod = require(name)\nconsole.log(mod)\n")];
  let (outputs, log, _) = compile(files, &["/entry.js"]);
  assert_eq!(outputs.len(), 1);
  assert!(outputs[0].js_contents.contains("require(name)"));
  assert_eq!(log.len(), 1);
  assert_eq!(log[0].severity, Severity::Warning);
  assert_eq!(log[0].code, "BND0003");
}

#[test]
fn unresolvable_import_fails_the_entry() {
  let files = vec![("/entry.js", "import {x} from './missing'\nconsole.log(x)\n")];
  let (outputs, log, _) = compile(files, &["/entry.js"]);
  assert!(outputs.is_empty());
  assert!(log.iter().any(|msg| msg.severity == Severity::Error && msg.code == "BND0001"));
}

#[test]
fn parse_error_fails_the_entry() {
  let files = vec![("/entry.js", "const = 1\n")];
  let (outputs, log, _) = compile(files, &["/entry.js"]);
  assert!(outputs.is_empty());
  assert!(log.iter().any(|msg| msg.severity == Severity::Error));
}

#[test]
fn import_cycles_are_tolerated() {
  let files = vec![
    ("/entry.js", "import {a} from './a'\nconsole.log(a)\n"),
    ("/a.js", "import {b} from './b'\nexport const a = b + 1\n"),
    ("/b.js", "import {a} from './a'\nexport const b = 2\n"),
  ];
  let (outputs, log, _) = compile(files, &["/entry.js"]);
  assert!(log.is_empty());
  assert_eq!(outputs.len(), 1);
}

#[test]
fn production_mode_prepends_the_loader_runtime() {
  let files = vec![("/entry.js", "console.log(1)\n")];
  let fs = MockFs::new(files);
  let resolver = Resolver::new(&fs, DEFAULT_EXTENSIONS);
  let parse_options = ParseOptions {
    is_bundling: true,
    ..ParseOptions::default()
  };
  let mut log = Log::new();
  let mut bundle = scan(
    &mut log,
    &fs,
    &resolver,
    &["/entry.js".to_string()],
    &parse_options,
  );
  let options = BundleOptions {
    bundle: true,
    abs_output_file: "/out.js".to_string(),
    ..BundleOptions::default()
  };
  let outputs = bundle.compile(&mut log, &options);
  assert!(log.drain().is_empty());
  assert!(outputs[0].js_contents.starts_with("const loader = "));
  assert!(outputs[0].js_contents.ends_with("}, 0);\n"));
}
