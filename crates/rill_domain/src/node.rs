use serde::{Deserialize, Serialize};

use crate::artifact::Artifact;
use crate::directive::{PlaceholderKey, ResolvedDirective};
use crate::document::Span;

/// Whether a delimiter-bounded block has been closed in the current source.
///
/// Derived from the raw source slice on every pass, never stored between
/// passes. The in-progress tail of the stream is `Streaming`; consumers use
/// this to alter presentation, e.g. suppressing a copy action on an
/// unfinished code block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompletionStatus {
    Complete,
    Streaming,
}

impl CompletionStatus {
    pub fn is_streaming(&self) -> bool {
        matches!(self, Self::Streaming)
    }
}

/// Node kind produced by the external markdown parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// Plain text content.
    Text(String),
    /// A generic element the pipeline passes through untouched.
    Element { tag: String },
    /// A fenced code block. `meta` is the info-string remainder after the
    /// language tag, `body` the fence content as parsed so far.
    CodeFence {
        language: Option<String>,
        meta: Option<String>,
        body: String,
    },
    /// A reasoning block delimited by `<think>` / `</think>`.
    Think,
    /// An embedded image.
    Image { url: String, alt: String },
}

/// A node of the parsed syntax tree.
///
/// Children are owned by the parent, in source order, with non-overlapping
/// spans nested within the parent's span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub span: Span,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, span: Span) -> Self {
        Self { kind, span, children: Vec::new() }
    }

    pub fn with_children(kind: NodeKind, span: Span, children: Vec<SyntaxNode>) -> Self {
        Self { kind, span, children }
    }
}

/// Node kind of the annotated output tree handed to the UI binding.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderKind {
    Text(String),
    Element {
        tag: String,
    },
    /// A fenced code block. `artifact` holds the highlighted markup once a
    /// highlighting engine has produced one; `None` renders as plain text,
    /// never as an error.
    CodeFence {
        language: Option<String>,
        meta: Option<String>,
        body: String,
        artifact: Option<Artifact>,
    },
    /// A diagram fence rendered through a diagram engine. An empty artifact
    /// renders as nothing; a mid-stream invalid source keeps the last good
    /// artifact.
    Diagram {
        source: String,
        artifact: Artifact,
    },
    Think,
    /// Images are marked previewable during annotation so the UI binding can
    /// attach its lightbox behavior without a second walk.
    Image {
        url: String,
        alt: String,
        preview: bool,
    },
    /// A structured directive whose payload parsed successfully.
    Directive(ResolvedDirective),
    /// Stand-in for a directive whose payload is not yet available.
    Placeholder(PlaceholderKey),
}

/// A node of the annotated render tree.
///
/// `span` is carried through from the syntax node it was derived from; the
/// span start is the stable identity downstream consumers key on, so a
/// placeholder that later resolves into a directive does not remount.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderNode {
    pub kind: RenderKind,
    pub span: Span,
    pub completion: Option<CompletionStatus>,
    pub children: Vec<RenderNode>,
}

impl RenderNode {
    pub fn new(kind: RenderKind, span: Span) -> Self {
        Self { kind, span, completion: None, children: Vec::new() }
    }

    pub fn completion(mut self, status: CompletionStatus) -> Self {
        self.completion = Some(status);
        self
    }

    pub fn children(mut self, children: Vec<RenderNode>) -> Self {
        self.children = children;
        self
    }
}
