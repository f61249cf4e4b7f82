use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use diagnostics::FileId;
use diagnostics::Span;
use diagnostics::TextRange;
use std::cmp::max;
use std::cmp::min;

/// A location within the current source file expressed as UTF-8 byte offsets.
///
/// A location is deliberately not tied to a file: transformations create
/// synthetic nodes that exist in no source at all, and those carry a
/// zero-width location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  /// Zero-width location for synthetic nodes.
  pub const SYNTHETIC: Loc = Loc(0, 0);

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1 - self.0
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn union(self, other: Loc) -> Loc {
    let mut new = self;
    new.extend(other);
    new
  }

  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  /// Converts this location into a `diagnostics` range, clamping to `u32`.
  pub fn to_range(self) -> TextRange {
    TextRange::new(clamp_to_u32(self.0), clamp_to_u32(self.1))
  }

  pub fn to_span(self, file: FileId) -> Span {
    Span::new(file, self.to_range())
  }
}

fn clamp_to_u32(value: usize) -> u32 {
  value.try_into().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn extend_covers_both_ranges() {
    let mut loc = Loc(4, 10);
    loc.extend(Loc(2, 6));
    assert_eq!(loc, Loc(2, 10));
    loc.extend(Loc(8, 14));
    assert_eq!(loc, Loc(2, 14));
  }

  #[test]
  fn to_range_clamps_on_overflow() {
    let loc = Loc(usize::MAX, usize::MAX);
    let range = loc.to_range();
    assert_eq!(range.start, u32::MAX);
    assert_eq!(range.end, u32::MAX);
  }
}
