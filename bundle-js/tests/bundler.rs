use bundle_js::scan;
use bundle_js::BundleOptions;
use diagnostics::render::render_diagnostic;
use diagnostics::Log;
use parse_js::JsxOptions;
use parse_js::ParseOptions;
use resolve_js::fs::MockFs;
use resolve_js::Resolver;
use resolve_js::DEFAULT_EXTENSIONS;

#[derive(Default)]
struct Bundled {
  files: Vec<(&'static str, &'static str)>,
  entry_paths: Vec<&'static str>,
  expected: Vec<(&'static str, &'static str)>,
  parse_options: ParseOptions,
  bundle_options: BundleOptions,
}

fn expect_bundled(mut args: Bundled) {
  let fs = MockFs::new(args.files.clone());
  let resolver = Resolver::new(&fs, DEFAULT_EXTENSIONS);
  args.parse_options.is_bundling = true;

  let mut log = Log::new();
  let entries: Vec<String> = args.entry_paths.iter().map(|path| path.to_string()).collect();
  let mut bundle = scan(&mut log, &fs, &resolver, &entries, &args.parse_options);
  assert_empty_log(&bundle, &mut log);

  args.bundle_options.bundle = true;
  args.bundle_options.omit_loader_for_tests = true;
  let results = bundle.compile(&mut log, &args.bundle_options);
  assert_empty_log(&bundle, &mut log);

  assert_eq!(results.len(), args.expected.len());
  for (expected_path, expected_contents) in &args.expected {
    let result = results
      .iter()
      .find(|result| result.js_abs_path == *expected_path)
      .unwrap_or_else(|| panic!("no output for {}", expected_path));
    assert_eq!(
      format!("[{}]\n{}", result.js_abs_path, result.js_contents),
      format!("[{}]\n{}", expected_path, expected_contents),
    );
  }
}

fn assert_empty_log(bundle: &bundle_js::graph::Bundle, log: &mut Log) {
  let msgs = log.drain();
  let text: String = msgs
    .iter()
    .map(|msg| render_diagnostic(bundle, msg))
    .collect();
  assert_eq!(text, "");
}

fn jsx_parse_options() -> ParseOptions {
  ParseOptions {
    is_bundling: true,
    jsx: JsxOptions {
      parse: true,
      factory: vec!["elem".to_string()],
      fragment: vec!["frag".to_string()],
    },
  }
}

#[test]
fn simple_es6() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "import {fn} from './foo'\nconsole.log(fn())\n",
      ),
      ("/foo.js", "export function fn() {\n\treturn 123\n}\n"),
    ],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  0() {
    // /foo.js
    function fn() {
      return 123;
    }

    // /entry.js
    console.log(fn());
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn simple_common_js() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "const fn = require('./foo')\nconsole.log(fn())\n",
      ),
      ("/foo.js", "module.exports = function() {\n\treturn 123\n}\n"),
    ],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  1(require, exports, module) {
    // /foo.js
    module.exports = function() {
      return 123;
    };
  },

  0(require) {
    // /entry.js
    const fn = require(1 /* ./foo */);
    console.log(fn());
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn common_js_from_es6() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "const fn = require('./foo')\nconsole.log(fn())\n",
      ),
      ("/foo.js", "export function fn() {\n\treturn 123\n}\n"),
    ],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  1(require, exports) {
    // /foo.js
    require(exports, {
      fn: () => fn
    });
    function fn() {
      return 123;
    }
  },

  0(require) {
    // /entry.js
    const fn = require(1 /* ./foo */);
    console.log(fn());
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn es6_from_common_js() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "import {fn} from './foo'\nconsole.log(fn())\n",
      ),
      ("/foo.js", "exports.fn = function() {\n\treturn 123\n}\n"),
    ],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  1(require, exports) {
    // /foo.js
    exports.fn = function() {
      return 123;
    };
  },

  0(require) {
    // /entry.js
    const foo = require(1 /* ./foo */);
    console.log(foo.fn());
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn export_forms() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "export default 123
export var v = 234
export let l = 234
export const c = 234
export {Class as C}
export function Fn() {}
export class Class {}
export * from './a'
export * as b from './b'
",
      ),
      ("/a.js", "export const abc = undefined\n"),
      ("/b.js", "export const xyz = null\n"),
    ],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  2(require, exports) {
    // /a.js
    const abc = void 0;

    // /b.js
    var b = {};
    require(b, {
      xyz: () => xyz
    });
    const xyz = null;

    // /entry.js
    require(exports, {
      C: () => Class,
      Class: () => Class,
      Fn: () => Fn,
      abc: () => abc,
      b: () => b,
      c: () => c,
      default: () => default2,
      l: () => l,
      v: () => v
    });
    const default2 = 123;
    var v = 234;
    let l = 234;
    const c = 234;
    function Fn() {
    }
    class Class {
    }
  }
}, 2);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn export_self() {
  expect_bundled(Bundled {
    files: vec![(
      "/entry.js",
      "export const foo = 123\nexport * from './entry'\n",
    )],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  0(require, exports) {
    // /entry.js
    require(exports, {
      foo: () => foo
    });
    const foo = 123;
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn export_self_as_namespace() {
  expect_bundled(Bundled {
    files: vec![(
      "/entry.js",
      "export const foo = 123\nexport * as ns from './entry'\n",
    )],
    entry_paths: vec!["/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  0(require, exports) {
    // /entry.js
    require(exports, {
      foo: () => foo,
      ns: () => exports
    });
    const foo = 123;
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn jsx_imports_common_js() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "import {elem, frag} from './custom-react'\nconsole.log(<div/>, <>fragment</>)\n",
      ),
      ("/custom-react.js", "module.exports = {}\n"),
    ],
    entry_paths: vec!["/entry.js"],
    parse_options: jsx_parse_options(),
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  0(require, exports, module) {
    // /custom-react.js
    module.exports = {};
  },

  1(require) {
    // /entry.js
    const custom_react = require(0 /* ./custom-react */);
    console.log(custom_react.elem(\"div\", null), custom_react.elem(custom_react.frag, null, \"fragment\"));
  }
}, 1);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn jsx_imports_es6() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/entry.js",
        "import {elem, frag} from './custom-react'\nconsole.log(<div/>, <>fragment</>)\n",
      ),
      (
        "/custom-react.js",
        "export function elem() {}\nexport function frag() {}\n",
      ),
    ],
    entry_paths: vec!["/entry.js"],
    parse_options: jsx_parse_options(),
    bundle_options: BundleOptions {
      abs_output_file: "/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/out.js",
      "loader({
  1() {
    // /custom-react.js
    function elem() {
    }
    function frag() {
    }

    // /entry.js
    console.log(elem(\"div\", null), elem(frag, null, \"fragment\"));
  }
}, 1);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn node_modules() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/Users/user/project/src/entry.js",
        "import fn from 'demo-pkg'\nconsole.log(fn())\n",
      ),
      (
        "/Users/user/project/node_modules/demo-pkg/index.js",
        "module.exports = function() {\n\treturn 123\n}\n",
      ),
    ],
    entry_paths: vec!["/Users/user/project/src/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/Users/user/project/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/Users/user/project/out.js",
      "loader({
  0(require, exports, module) {
    // /Users/user/project/node_modules/demo-pkg/index.js
    module.exports = function() {
      return 123;
    };
  },

  1(require) {
    // /Users/user/project/src/entry.js
    const demo_pkg = require(0 /* demo-pkg */);
    console.log(demo_pkg.default());
  }
}, 1);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn package_json_main() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/Users/user/project/src/entry.js",
        "import fn from 'demo-pkg'\nconsole.log(fn())\n",
      ),
      (
        "/Users/user/project/node_modules/demo-pkg/package.json",
        "{\n\t\"main\": \"./custom-main.js\"\n}\n",
      ),
      (
        "/Users/user/project/node_modules/demo-pkg/custom-main.js",
        "module.exports = function() {\n\treturn 123\n}\n",
      ),
    ],
    entry_paths: vec!["/Users/user/project/src/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/Users/user/project/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/Users/user/project/out.js",
      "loader({
  0(require, exports, module) {
    // /Users/user/project/node_modules/demo-pkg/custom-main.js
    module.exports = function() {
      return 123;
    };
  },

  1(require) {
    // /Users/user/project/src/entry.js
    const demo_pkg = require(0 /* demo-pkg */);
    console.log(demo_pkg.default());
  }
}, 1);
",
    )],
    ..Bundled::default()
  });
}

#[test]
fn tsconfig_json_base_url() {
  expect_bundled(Bundled {
    files: vec![
      (
        "/Users/user/project/src/app/entry.js",
        "import fn from 'lib/util'\nconsole.log(fn())\n",
      ),
      (
        "/Users/user/project/src/tsconfig.json",
        "{\n\t\"compilerOptions\": {\n\t\t\"baseUrl\": \".\"\n\t}\n}\n",
      ),
      (
        "/Users/user/project/src/lib/util.js",
        "module.exports = function() {\n\treturn 123\n}\n",
      ),
    ],
    entry_paths: vec!["/Users/user/project/src/app/entry.js"],
    bundle_options: BundleOptions {
      abs_output_file: "/Users/user/project/out.js".to_string(),
      ..BundleOptions::default()
    },
    expected: vec![(
      "/Users/user/project/out.js",
      "loader({
  1(require, exports, module) {
    // /Users/user/project/src/lib/util.js
    module.exports = function() {
      return 123;
    };
  },

  0(require) {
    // /Users/user/project/src/app/entry.js
    const util = require(1 /* lib/util */);
    console.log(util.default());
  }
}, 0);
",
    )],
    ..Bundled::default()
  });
}
