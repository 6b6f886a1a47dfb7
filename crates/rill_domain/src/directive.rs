use std::collections::HashMap;

use derive_more::{Display, From};
use serde::{Deserialize, Serialize};

/// Reserved code-fence language marker for structured directives.
pub const DIRECTIVE_MARKER: &str = "component-json";

/// Identity of a renderable component registered by the embedder.
#[derive(Debug, Display, From, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(id: impl ToString) -> Self {
        Self(id.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Maps directive `type` strings to renderable component identities.
///
/// Supplied by the embedding application; a directive whose type is not
/// registered resolves to the default placeholder.
#[derive(Debug, Default, Clone)]
pub struct ComponentRegistry {
    components: HashMap<String, ComponentId>,
}

impl ComponentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(mut self, kind: impl ToString, component: ComponentId) -> Self {
        self.components.insert(kind.to_string(), component);
        self
    }

    pub fn resolve(&self, kind: &str) -> Option<&ComponentId> {
        self.components.get(kind)
    }
}

/// Info-string metadata accompanying a directive fence.
///
/// Arrives as a JSON object after the language tag; may be truncated
/// mid-stream, in which case the resolver falls back to the default
/// placeholder.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DirectiveMeta {
    /// Placeholder to show while the directive body is still arriving.
    pub placeholder: Option<String>,
}

/// Which placeholder component stands in for an unresolved directive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceholderKey {
    #[default]
    Default,
    Named(String),
}

/// A directive whose payload parsed successfully and whose type is known to
/// the registry.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDirective {
    pub target: ComponentId,
    pub props: serde_json::Value,
}

impl ResolvedDirective {
    pub fn new(target: ComponentId, props: serde_json::Value) -> Self {
        Self { target, props }
    }
}
