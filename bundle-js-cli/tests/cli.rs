use assert_cmd::Command;
use std::fs;

fn bundle_js() -> Command {
  Command::cargo_bin("bundle-js").unwrap()
}

#[test]
fn help_lists_output_flags() {
  bundle_js()
    .arg("--help")
    .assert()
    .success()
    .stdout(predicates::str::contains("--outfile"))
    .stdout(predicates::str::contains("--outdir"));
}

#[test]
fn missing_output_flag_is_an_error() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  fs::write(&entry, "console.log(1)\n").unwrap();
  bundle_js().arg(&entry).assert().failure();
}

#[test]
fn bundles_a_two_file_graph_to_the_outfile() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  let foo = dir.path().join("foo.js");
  let out = dir.path().join("out.js");
  fs::write(&entry, "import {fn} from './foo'\nconsole.log(fn())\n").unwrap();
  fs::write(&foo, "export function fn() { return 123 }\n").unwrap();

  bundle_js()
    .arg(&entry)
    .arg("--outfile")
    .arg(&out)
    .assert()
    .success();

  let bundled = fs::read_to_string(&out).unwrap();
  assert!(bundled.contains("const loader = "));
  assert!(bundled.contains("loader({"));
  assert!(bundled.contains("function fn() {"));
  assert!(bundled.contains("console.log(fn());"));
}

#[test]
fn unresolvable_import_exits_nonzero() {
  let dir = tempfile::tempdir().unwrap();
  let entry = dir.path().join("entry.js");
  let out = dir.path().join("out.js");
  fs::write(&entry, "import {x} from './missing'\nconsole.log(x)\n").unwrap();

  bundle_js()
    .arg(&entry)
    .arg("--outfile")
    .arg(&out)
    .assert()
    .failure()
    .stderr(predicates::str::contains("could not resolve"));
  assert!(!out.exists());
}
