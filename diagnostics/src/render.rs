//! Plain-text rendering of diagnostics.

use crate::Diagnostic;
use crate::FileId;
use crate::Span;

/// Source access needed to render a snippet. Implemented by whatever owns the
/// file contents (the bundler's module graph, a single-file CLI wrapper, or a
/// test fixture).
pub trait SourceProvider {
  fn file_name(&self, file: FileId) -> &str;
  fn file_text(&self, file: FileId) -> &str;
}

/// Renders one diagnostic as `severity[CODE]: message`, a `--> file:line:col`
/// pointer, and a caret-underlined snippet for every source line the primary
/// span touches. Notes follow, one per line.
pub fn render_diagnostic(provider: &dyn SourceProvider, diagnostic: &Diagnostic) -> String {
  let mut out = String::new();
  out.push_str(&format!(
    "{}[{}]: {}\n",
    diagnostic.severity, diagnostic.code, diagnostic.message
  ));

  if let Some(primary) = diagnostic.primary {
    render_snippet(&mut out, provider, primary, &diagnostic.message);
  }

  for note in &diagnostic.notes {
    out.push_str(&format!("note: {}\n", note));
  }

  out
}

struct Line<'a> {
  number: usize,
  text: &'a str,
  // Byte offset of the line start within the file.
  start: usize,
}

fn render_snippet(out: &mut String, provider: &dyn SourceProvider, span: Span, message: &str) {
  let name = provider.file_name(span.file);
  let text = provider.file_text(span.file);
  let start = (span.range.start as usize).min(text.len());
  let end = (span.range.end as usize).min(text.len()).max(start);

  let lines = spanned_lines(text, start, end);
  let Some(first) = lines.first() else {
    out.push_str(&format!(" --> {}\n", name));
    return;
  };

  let column = start - first.start + 1;
  out.push_str(&format!(" --> {}:{}:{}\n", name, first.number, column));

  let gutter = lines.last().map(|line| line.number.to_string().len()).unwrap_or(1);
  out.push_str(&format!("{} |\n", " ".repeat(gutter)));
  for (idx, line) in lines.iter().enumerate() {
    out.push_str(&format!("{:>gutter$} | {}\n", line.number, line.text));

    let underline_start = if idx == 0 { start - line.start } else { 0 };
    let underline_end = (end - line.start).min(line.text.len());
    let carets = underline_end.saturating_sub(underline_start).max(1);
    out.push_str(&format!(
      "{} | {}{}",
      " ".repeat(gutter),
      " ".repeat(underline_start),
      "^".repeat(carets),
    ));
    if idx == 0 && !message.is_empty() {
      out.push_str(&format!(" {}", message));
    }
    out.push('\n');
  }
}

fn spanned_lines(text: &str, start: usize, end: usize) -> Vec<Line<'_>> {
  let mut lines = Vec::new();
  let mut offset = 0;
  for (number, raw) in text.split('\n').enumerate() {
    let line_end = offset + raw.len();
    if offset > end {
      break;
    }
    if line_end >= start {
      lines.push(Line {
        number: number + 1,
        text: raw,
        start: offset,
      });
    }
    offset = line_end + 1;
  }
  lines
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::Severity;
  use crate::TextRange;

  struct OneFile {
    name: String,
    text: String,
  }

  impl SourceProvider for OneFile {
    fn file_name(&self, _file: FileId) -> &str {
      &self.name
    }

    fn file_text(&self, _file: FileId) -> &str {
      &self.text
    }
  }

  #[test]
  fn renders_single_line_span() {
    let source = OneFile {
      name: "test.js".into(),
      text: "let x = 1;".into(),
    };
    let diagnostic = Diagnostic::error(
      "TEST0001",
      "unused variable",
      Span::new(FileId(0), TextRange::new(4, 5)),
    );
    let rendered = render_diagnostic(&source, &diagnostic);
    let expected =
      "error[TEST0001]: unused variable\n --> test.js:1:5\n  |\n1 | let x = 1;\n  |     ^ unused variable\n";
    assert_eq!(rendered, expected);
  }

  #[test]
  fn renders_without_location() {
    let source = OneFile {
      name: "x".into(),
      text: String::new(),
    };
    let diagnostic = Diagnostic::error_nowhere("TEST0002", "no such entry").with_note("looked hard");
    let rendered = render_diagnostic(&source, &diagnostic);
    assert_eq!(
      rendered,
      "error[TEST0002]: no such entry\nnote: looked hard\n"
    );
  }

  #[test]
  fn renders_multi_line_span() {
    let source = OneFile {
      name: "main.js".into(),
      text: "function test() {\n  return 1;\n}\n".into(),
    };
    let diagnostic = Diagnostic::new(
      Severity::Warning,
      "TEST0003",
      "odd function",
      Some(Span::new(FileId(0), TextRange::new(0, 30))),
    );
    let rendered = render_diagnostic(&source, &diagnostic);
    assert!(rendered.starts_with("warning[TEST0003]: odd function\n --> main.js:1:1\n"));
    assert!(rendered.contains("1 | function test() {\n"));
    assert!(rendered.contains("2 |   return 1;\n"));
  }
}
