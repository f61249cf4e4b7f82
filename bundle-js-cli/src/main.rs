use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use bundle_js::scan;
use bundle_js::BundleOptions;
use clap::Parser;
use diagnostics::render::render_diagnostic;
use diagnostics::Log;
use diagnostics::Severity;
use parse_js::JsxOptions;
use parse_js::ParseOptions;
use resolve_js::fs::OsFs;
use resolve_js::path;
use resolve_js::Resolver;
use resolve_js::DEFAULT_EXTENSIONS;
use std::path::PathBuf;
use std::process;
use tracing::debug;

#[derive(Parser)]
#[command(name = "bundle-js", about = "JS/JSX bundler")]
struct Cli {
  /// Entry point source files.
  #[arg(required = true)]
  entries: Vec<PathBuf>,

  /// Output file; only valid with a single entry.
  #[arg(short, long)]
  outfile: Option<PathBuf>,

  /// Output directory; defaults to the output file's directory.
  #[arg(long)]
  outdir: Option<PathBuf>,

  /// Parse JSX syntax.
  #[arg(long)]
  jsx: bool,

  /// JSX factory as a dotted name.
  #[arg(long, default_value = "React.createElement")]
  jsx_factory: String,

  /// JSX fragment as a dotted name.
  #[arg(long, default_value = "React.Fragment")]
  jsx_fragment: String,

  /// Print entries after parsing instead of linking them into bundles.
  #[arg(long)]
  no_bundle: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
    .with_writer(std::io::stderr)
    .init();

  let cli = Cli::parse();
  if cli.outfile.is_some() && cli.entries.len() > 1 {
    bail!("--outfile requires a single entry; use --outdir");
  }
  if cli.outfile.is_none() && cli.outdir.is_none() {
    bail!("one of --outfile or --outdir is required");
  }

  let entries: Vec<String> = cli
    .entries
    .iter()
    .map(|entry| absolute(entry))
    .collect::<Result<_>>()?;
  let parse_options = ParseOptions {
    is_bundling: true,
    jsx: JsxOptions {
      parse: cli.jsx,
      factory: dotted_name(&cli.jsx_factory),
      fragment: dotted_name(&cli.jsx_fragment),
    },
  };
  let bundle_options = BundleOptions {
    bundle: !cli.no_bundle,
    abs_output_file: cli.outfile.as_ref().map(|f| absolute(f)).transpose()?.unwrap_or_default(),
    abs_output_dir: cli.outdir.as_ref().map(|d| absolute(d)).transpose()?.unwrap_or_default(),
    omit_loader_for_tests: false,
  };

  let fs = OsFs;
  let resolver = Resolver::new(&fs, DEFAULT_EXTENSIONS);
  let mut log = Log::new();
  let mut bundle = scan(&mut log, &fs, &resolver, &entries, &parse_options);
  let outputs = bundle.compile(&mut log, &bundle_options);

  let msgs = log.drain();
  let mut errored = false;
  for msg in &msgs {
    errored |= msg.severity == Severity::Error;
    eprint!("{}", render_diagnostic(&bundle, msg));
  }
  if errored {
    process::exit(1);
  }

  for output in &outputs {
    if let Some(parent) = std::path::Path::new(&output.js_abs_path).parent() {
      std::fs::create_dir_all(parent)
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    std::fs::write(&output.js_abs_path, &output.js_contents)
      .with_context(|| format!("writing {}", output.js_abs_path))?;
    debug!(path = %output.js_abs_path, bytes = output.js_contents.len(), "wrote output");
  }
  Ok(())
}

fn absolute(p: &std::path::Path) -> Result<String> {
  let joined = if p.is_absolute() {
    p.to_path_buf()
  } else {
    std::env::current_dir()?.join(p)
  };
  let raw = joined
    .to_str()
    .with_context(|| format!("non-UTF-8 path: {}", joined.display()))?;
  Ok(path::clean(raw))
}

fn dotted_name(raw: &str) -> Vec<String> {
  raw.split('.').map(str::to_string).collect()
}
