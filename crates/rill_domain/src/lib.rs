mod artifact;
mod directive;
mod document;
mod error;
mod node;
mod parser;

pub use artifact::{Artifact, EngineId, InstanceId, RenderContext, ThemeMode};
pub use directive::{
    ComponentId, ComponentRegistry, DIRECTIVE_MARKER, DirectiveMeta, PlaceholderKey,
    ResolvedDirective,
};
pub use document::{Document, SourceVersion, Span};
pub use error::{Error, Result};
pub use node::{CompletionStatus, NodeKind, RenderKind, RenderNode, SyntaxNode};
pub use parser::MarkdownParser;
