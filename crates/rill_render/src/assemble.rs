//! Tree assembly: annotation, directive resolution, media counting.

use rill_domain::{ComponentRegistry, Document, RenderKind, RenderNode, SourceVersion, SyntaxNode};

use crate::annotate::annotate;
use crate::resolve::DirectiveResolver;

/// Product of one assembly pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AssembledTree {
    pub root: RenderNode,
    pub media_count: usize,
    pub version: SourceVersion,
}

/// Composes annotation and directive resolution, then derives the embedded
/// media count in a single traversal.
///
/// Emits no notifications itself; counting and notification stay separable
/// so each can be exercised without UI timing in the way.
pub struct RenderTreeAssembler {
    resolver: DirectiveResolver,
}

impl RenderTreeAssembler {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { resolver: DirectiveResolver::new(registry) }
    }

    pub fn assemble(&self, tree: &SyntaxNode, doc: &Document) -> AssembledTree {
        let annotated = annotate(tree, doc);
        let root = self.resolver.resolve_tree(annotated);
        let media_count = count_media(&root);
        AssembledTree { root, media_count, version: doc.version() }
    }
}

fn count_media(node: &RenderNode) -> usize {
    let own = usize::from(matches!(node.kind, RenderKind::Image { .. }));
    own + node.children.iter().map(count_media).sum::<usize>()
}
