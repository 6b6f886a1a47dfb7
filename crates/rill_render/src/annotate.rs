//! Completion annotation from raw source slices.
//!
//! A node's completion status cannot be read off the parsed tree alone: a
//! permissive streaming parser produces the same tree shape for `<think>abc`
//! and `<think>abc</think>`. The closing delimiter is only visible in the raw
//! source span the node occupies.

use rill_domain::{
    CompletionStatus, Document, NodeKind, RenderKind, RenderNode, SyntaxNode,
};

const THINK_CLOSE: &str = "</think>";
const FENCE: &str = "```";

/// Build the annotated render tree for one pass.
///
/// Produces a fresh tree; the input tree is untouched. Delimiter-bounded
/// kinds (think blocks, fenced code) carry a completion status derived from
/// the source slice; images are marked previewable in the same walk.
pub fn annotate(node: &SyntaxNode, doc: &Document) -> RenderNode {
    let children = node.children.iter().map(|c| annotate(c, doc)).collect();

    let kind = match &node.kind {
        NodeKind::Text(text) => RenderKind::Text(text.clone()),
        NodeKind::Element { tag } => RenderKind::Element { tag: tag.clone() },
        NodeKind::CodeFence { language, meta, body } => RenderKind::CodeFence {
            language: language.clone(),
            meta: meta.clone(),
            body: body.clone(),
            artifact: None,
        },
        NodeKind::Think => RenderKind::Think,
        NodeKind::Image { url, alt } => RenderKind::Image {
            url: url.clone(),
            alt: alt.clone(),
            preview: true,
        },
    };

    let mut annotated = RenderNode::new(kind, node.span).children(children);
    annotated.completion = completion_for(node, doc);
    annotated
}

/// Kind-specific closure test for delimiter-bounded nodes.
///
/// Yields `None` for kinds without an open/close delimiter in source syntax.
pub fn completion_for(node: &SyntaxNode, doc: &Document) -> Option<CompletionStatus> {
    match &node.kind {
        NodeKind::Think => Some(think_status(doc.slice(node.span))),
        NodeKind::CodeFence { .. } => Some(fence_status(doc.slice(node.span))),
        _ => None,
    }
}

/// A reasoning block is complete once its closing tag has arrived.
fn think_status(slice: &str) -> CompletionStatus {
    if slice.contains(THINK_CLOSE) {
        CompletionStatus::Complete
    } else {
        CompletionStatus::Streaming
    }
}

/// A fenced code block is complete once a closing fence follows the opening
/// one. A single fence marker is the in-progress tail of the stream and must
/// never be classified complete.
fn fence_status(slice: &str) -> CompletionStatus {
    match slice.find(FENCE) {
        Some(open) => {
            let rest = &slice[open + FENCE.len()..];
            if rest.contains(FENCE) {
                CompletionStatus::Complete
            } else {
                CompletionStatus::Streaming
            }
        }
        None => CompletionStatus::Streaming,
    }
}
