//! Lenient resolution of structured-directive fences.
//!
//! A fence tagged `component-json` carries a machine-readable directive whose
//! info-string metadata and body are both JSON, and both routinely arrive
//! truncated mid-stream. Every failure path yields a placeholder node; this
//! module never produces a visible error.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use rill_domain::{
    ComponentRegistry, DIRECTIVE_MARKER, DirectiveMeta, PlaceholderKey, RenderKind, RenderNode,
    ResolvedDirective, Span,
};

/// Resolves directive fences into directive or placeholder nodes.
///
/// Lives for the session so that repeated failures on the same span can be
/// tallied across passes. The source text carries no signal distinguishing
/// "still streaming" from "permanently invalid", so the tally is surfaced as
/// a debug diagnostic only.
pub struct DirectiveResolver {
    registry: ComponentRegistry,
    failures: Mutex<HashMap<usize, u32>>,
}

impl DirectiveResolver {
    pub fn new(registry: ComponentRegistry) -> Self {
        Self { registry, failures: Mutex::new(HashMap::new()) }
    }

    /// Rewrite directive fences throughout the tree.
    ///
    /// Non-directive nodes pass through with their spans and completion
    /// status intact; a resolved node keeps the span of the fence it
    /// replaces, so downstream consumers keying on position do not remount
    /// when a placeholder later resolves.
    pub fn resolve_tree(&self, node: RenderNode) -> RenderNode {
        let mut seen = HashSet::new();
        let resolved = self.resolve_node(node, &mut seen);
        // Drop tallies for blocks that disappeared or shifted offset; the
        // map stays bounded by the directives present in the current pass.
        self.failures
            .lock()
            .unwrap()
            .retain(|offset, _| seen.contains(offset));
        resolved
    }

    fn resolve_node(&self, node: RenderNode, seen: &mut HashSet<usize>) -> RenderNode {
        let RenderNode { kind, span, completion, children } = node;

        let kind = match kind {
            RenderKind::CodeFence { language: Some(language), meta, body, .. }
                if language == DIRECTIVE_MARKER =>
            {
                seen.insert(span.start);
                self.resolve_fence(meta.as_deref(), &body, span)
            }
            other => other,
        };

        let children = children
            .into_iter()
            .map(|c| self.resolve_node(c, seen))
            .collect();

        RenderNode { kind, span, completion, children }
    }

    /// The resolution ladder, each step independently recoverable:
    /// missing metadata, unparsable metadata, unparsable body, then a parsed
    /// directive looked up in the registry.
    fn resolve_fence(&self, meta: Option<&str>, body: &str, span: Span) -> RenderKind {
        // Steady state while only the fence opener and language tag have
        // arrived.
        let Some(meta) = meta else {
            return RenderKind::Placeholder(PlaceholderKey::Default);
        };

        let meta = match serde_json::from_str::<DirectiveMeta>(meta) {
            Ok(meta) => meta,
            Err(err) => {
                self.note_failure(span, "metadata", &err);
                return RenderKind::Placeholder(PlaceholderKey::Default);
            }
        };

        let payload = match serde_json::from_str::<serde_json::Value>(body) {
            Ok(payload) => payload,
            Err(err) => {
                self.note_failure(span, "payload", &err);
                let key = match meta.placeholder {
                    Some(name) => PlaceholderKey::Named(name),
                    None => PlaceholderKey::Default,
                };
                return RenderKind::Placeholder(key);
            }
        };

        self.clear_failures(span);

        let target = payload
            .get("type")
            .and_then(|t| t.as_str())
            .and_then(|kind| self.registry.resolve(kind));
        match target {
            Some(target) => {
                let props = payload
                    .get("props")
                    .cloned()
                    .unwrap_or(serde_json::Value::Null);
                RenderKind::Directive(ResolvedDirective::new(target.clone(), props))
            }
            // A parsed payload naming no registered component renders as the
            // default placeholder rather than an error.
            None => RenderKind::Placeholder(PlaceholderKey::Default),
        }
    }

    fn note_failure(&self, span: Span, what: &str, err: &serde_json::Error) {
        let mut failures = self.failures.lock().unwrap();
        let count = failures.entry(span.start).or_insert(0);
        *count += 1;
        if *count > 1 {
            tracing::debug!(
                offset = span.start,
                passes = *count,
                what,
                error = %err,
                "directive still unresolved after repeated passes"
            );
        }
    }

    fn clear_failures(&self, span: Span) {
        self.failures.lock().unwrap().remove(&span.start);
    }
}
