//! Session orchestration: pass versioning, leaf rendering, supersession.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_recursion::async_recursion;
use derive_setters::Setters;
use rill_domain::{
    ComponentRegistry, Document, EngineId, InstanceId, MarkdownParser, RenderContext, RenderKind,
    RenderNode, SourceVersion, Span, ThemeMode,
};
use rill_engine::FallbackRenderer;
use tokio::sync::{Mutex, mpsc};

use crate::assemble::{AssembledTree, RenderTreeAssembler};
use crate::notify::{ImageCountNotifier, MediaCountChanged};

/// Engine wiring and presentation settings for a session.
#[derive(Debug, Clone, Default, Setters)]
#[setters(strip_option, into)]
pub struct SessionConfig {
    pub theme: ThemeMode,
    /// Engine used to highlight ordinary code fences; `None` leaves them
    /// unhighlighted.
    pub highlight_engine: Option<EngineId>,
    /// Fence languages routed to a diagram engine instead of the
    /// highlighter.
    pub diagram_engines: HashMap<String, EngineId>,
}

struct Committed {
    version: SourceVersion,
    tree: Option<Arc<AssembledTree>>,
    notifier: ImageCountNotifier,
}

/// One rendering session over a streaming document.
///
/// Every update re-parses the full source, assembles an annotated tree,
/// renders engine-backed leaves through the fallback renderer, and commits
/// last-writer-wins: a pass that was superseded while suspended inside an
/// engine load is discarded at commit time, so visible output only ever
/// moves forward.
pub struct RenderSession {
    parser: Arc<dyn MarkdownParser>,
    fallback: Arc<FallbackRenderer>,
    assembler: RenderTreeAssembler,
    config: SessionConfig,
    issued: AtomicU64,
    committed: Mutex<Committed>,
}

impl RenderSession {
    pub fn new(
        parser: Arc<dyn MarkdownParser>,
        fallback: Arc<FallbackRenderer>,
        registry: ComponentRegistry,
        config: SessionConfig,
    ) -> (Self, mpsc::UnboundedReceiver<MediaCountChanged>) {
        let (notifier, rx) = ImageCountNotifier::new();
        let session = Self {
            parser,
            fallback,
            assembler: RenderTreeAssembler::new(registry),
            config,
            issued: AtomicU64::new(0),
            committed: Mutex::new(Committed {
                version: SourceVersion::default(),
                tree: None,
                notifier,
            }),
        };
        (session, rx)
    }

    /// Run one assembly pass over the updated source text.
    ///
    /// Returns the committed tree, or `None` when a newer pass committed
    /// while this one was suspended.
    pub async fn update(&self, text: &str) -> Option<Arc<AssembledTree>> {
        let version = SourceVersion(self.issued.fetch_add(1, Ordering::SeqCst) + 1);
        let doc = Document::new(text, version);
        let tree = self.parser.parse(doc.text());
        let mut pass = self.assembler.assemble(&tree, &doc);
        pass.root = self.render_leaves(pass.root, version).await;
        self.commit(pass).await
    }

    /// Latest committed tree, if any pass has committed yet.
    pub async fn current(&self) -> Option<Arc<AssembledTree>> {
        self.committed.lock().await.tree.clone()
    }

    #[async_recursion]
    async fn render_leaves(&self, node: RenderNode, version: SourceVersion) -> RenderNode {
        let RenderNode { kind, span, completion, children } = node;

        let kind = match kind {
            RenderKind::CodeFence { language, meta, body, .. } => {
                self.render_fence(language, meta, body, span, version).await
            }
            other => other,
        };

        let mut rendered = Vec::with_capacity(children.len());
        for child in children {
            rendered.push(self.render_leaves(child, version).await);
        }

        RenderNode { kind, span, completion, children: rendered }
    }

    /// Route a fence to its engine. A diagram fence always carries an
    /// artifact (possibly empty, possibly the last good frame); an ordinary
    /// fence carries highlighted markup when the highlighter produced some.
    ///
    /// Engine load failures are absorbed here: the user-visible result is
    /// unhighlighted text or a blank diagram slot, never an error state.
    async fn render_fence(
        &self,
        language: Option<String>,
        meta: Option<String>,
        body: String,
        span: Span,
        version: SourceVersion,
    ) -> RenderKind {
        let instance = InstanceId::at_offset(span.start);

        if let Some(lang) = language.as_deref()
            && let Some(engine) = self.config.diagram_engines.get(lang)
        {
            let ctx = RenderContext::new(self.config.theme, version);
            let artifact = match self.fallback.render(engine, &instance, &body, &ctx).await {
                Ok(artifact) => artifact,
                Err(err) => {
                    tracing::warn!(engine = %engine, error = %err, "diagram engine unavailable");
                    self.fallback.cached(&instance).await
                }
            };
            return RenderKind::Diagram { source: body, artifact };
        }

        let artifact = match &self.config.highlight_engine {
            Some(engine) => {
                let mut ctx = RenderContext::new(self.config.theme, version);
                ctx.language = language.clone();
                match self.fallback.render(engine, &instance, &body, &ctx).await {
                    Ok(artifact) if !artifact.is_empty() => Some(artifact),
                    Ok(_) => None,
                    Err(err) => {
                        tracing::warn!(engine = %engine, error = %err, "highlighter unavailable");
                        None
                    }
                }
            }
            None => None,
        };

        RenderKind::CodeFence { language, meta, body, artifact }
    }

    async fn commit(&self, pass: AssembledTree) -> Option<Arc<AssembledTree>> {
        let mut committed = self.committed.lock().await;
        if committed.version > pass.version {
            tracing::debug!(
                pass = pass.version.0,
                latest = committed.version.0,
                "discarding superseded pass"
            );
            return None;
        }

        let media_count = pass.media_count;
        let pass = Arc::new(pass);
        committed.version = pass.version;
        committed.tree = Some(pass.clone());
        // Observers must never see a count ahead of the visible tree.
        committed.notifier.update(media_count);
        Some(pass)
    }
}
