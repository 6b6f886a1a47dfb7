use serde::{Deserialize, Serialize};

/// Byte range a syntax node occupies in the source document.
///
/// Produced by the external parser; `start <= end` and both offsets fall on
/// character boundaries of the document the tree was parsed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start must not exceed end");
        Self { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Monotone counter stamped on every document update.
///
/// Used to discard superseded assembly passes and to keep the render cache
/// from regressing to an older artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SourceVersion(pub u64);

impl SourceVersion {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

/// Full text of the stream as of the latest update.
///
/// Replaced wholesale on each update; there is no diffing against the prior
/// version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    text: String,
    version: SourceVersion,
}

impl Document {
    pub fn new(text: impl Into<String>, version: SourceVersion) -> Self {
        Self { text: text.into(), version }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn version(&self) -> SourceVersion {
        self.version
    }

    /// Slice of the document covered by `span`.
    ///
    /// A span that falls outside the document (possible when a stale tree is
    /// paired with a newer document during supersession) yields the empty
    /// slice rather than panicking.
    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.start..span.end).unwrap_or("")
    }
}
