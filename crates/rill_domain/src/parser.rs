use crate::node::SyntaxNode;

/// Seam to the external markdown-to-tree parser.
///
/// The parser re-parses the full document on every update and must attach a
/// source span to every node it produces; completion detection depends on it.
pub trait MarkdownParser: Send + Sync {
    fn parse(&self, source: &str) -> SyntaxNode;
}
