//! Paths into nested values and specs.

use std::fmt;

/// One step into a nested value: a field name or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// Field of a composite.
    Key(String),
    /// Element of a sequence.
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(k) => f.write_str(k),
            Self::Index(i) => write!(f, "{i}"),
        }
    }
}

/// Ordered field names and indices leading to a location.
///
/// `Display` shows `(root)` for the empty path; use [`dotted`](Self::dotted)
/// for the bare joined form used in messages.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Path(Vec<PathSegment>);

impl Path {
    /// The empty path.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Returns `true` for the empty path.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of segments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    /// A copy extended by a field name.
    #[must_use]
    pub fn with_key(&self, key: impl Into<String>) -> Self {
        let mut next = self.clone();
        next.push_key(key);
        next
    }

    /// A copy extended by an index.
    #[must_use]
    pub fn with_index(&self, index: usize) -> Self {
        let mut next = self.clone();
        next.push_index(index);
        next
    }

    pub(crate) fn push_key(&mut self, key: impl Into<String>) {
        self.0.push(PathSegment::Key(key.into()));
    }

    pub(crate) fn push_index(&mut self, index: usize) {
        self.0.push(PathSegment::Index(index));
    }

    pub(crate) fn pop(&mut self) {
        self.0.pop();
    }

    /// Segments joined with `.`; empty for the root.
    #[must_use]
    pub fn dotted(&self) -> String {
        self.0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Prepend a caller description: `describe("user")` on `tags.2` gives
    /// `user.tags.2`. Either side may be empty.
    #[must_use]
    pub fn describe(&self, description: &str) -> String {
        match (description.is_empty(), self.is_empty()) {
            (_, true) => description.to_owned(),
            (true, false) => self.dotted(),
            (false, false) => format!("{description}.{}", self.dotted()),
        }
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("(root)")
        } else {
            f.write_str(&self.dotted())
        }
    }
}

impl FromIterator<PathSegment> for Path {
    fn from_iter<I: IntoIterator<Item = PathSegment>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
