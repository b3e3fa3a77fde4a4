use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Range, RangeFrom, RangeInclusive};

/// A zero-based, half-open interval of row indices requested from a loader.
///
/// `end == u64::MAX` means "no upper bound". Built from the usual range
/// syntax:
///
/// ```
/// use vok_data::RowRange;
///
/// assert_eq!(RowRange::from(10..=19).len(), Some(10));
/// assert_eq!(RowRange::from(10..20), RowRange::from(10..=19));
/// assert!(RowRange::from(5..).is_unbounded());
/// assert!(RowRange::from(5..5).is_empty());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RowRange {
    start: u64,
    end: u64,
}

impl RowRange {
    /// The unrestricted range: every row.
    pub const fn all() -> Self {
        Self {
            start: 0,
            end: u64::MAX,
        }
    }

    /// `start..end`; an `end` before `start` yields an empty range at `start`.
    pub fn new(start: u64, end: u64) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn offset(&self) -> u64 {
        self.start
    }

    /// Exclusive upper bound, `None` when unbounded.
    pub fn end(&self) -> Option<u64> {
        (!self.is_unbounded()).then_some(self.end)
    }

    /// Inclusive upper bound. `None` when unbounded or empty.
    pub fn end_inclusive(&self) -> Option<u64> {
        if self.is_unbounded() || self.is_empty() {
            None
        } else {
            Some(self.end - 1)
        }
    }

    /// Maximum number of rows, `None` when unbounded.
    pub fn limit(&self) -> Option<u64> {
        self.end().map(|end| end - self.start)
    }

    /// Same as [`RowRange::limit`].
    pub fn len(&self) -> Option<u64> {
        self.limit()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.end == u64::MAX
    }

    /// Whether this is [`RowRange::all`].
    pub fn is_all(&self) -> bool {
        self.start == 0 && self.is_unbounded()
    }
}

impl Default for RowRange {
    fn default() -> Self {
        Self::all()
    }
}

impl From<RangeInclusive<u64>> for RowRange {
    fn from(range: RangeInclusive<u64>) -> Self {
        let (start, end) = range.into_inner();
        if end < start {
            return Self::new(start, start);
        }
        Self::new(start, end.saturating_add(1))
    }
}

impl From<Range<u64>> for RowRange {
    fn from(range: Range<u64>) -> Self {
        Self::new(range.start, range.end)
    }
}

impl From<RangeFrom<u64>> for RowRange {
    fn from(range: RangeFrom<u64>) -> Self {
        Self::new(range.start, u64::MAX)
    }
}

impl fmt::Display for RowRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.end() {
            Some(end) => write!(f, "{}..{end}", self.start),
            None => write!(f, "{}..", self.start),
        }
    }
}
