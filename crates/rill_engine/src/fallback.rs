use std::collections::HashMap;
use std::sync::Arc;

use rill_domain::{Artifact, EngineId, InstanceId, RenderContext, Result, SourceVersion, ThemeMode};
use tokio::sync::RwLock;

use crate::engine::RenderEngine;
use crate::loader::ResourceLoader;

struct CacheEntry {
    artifact: Artifact,
    version: SourceVersion,
}

/// Renders through an external engine, falling back to the last good artifact
/// when the engine rejects its input.
///
/// The contract is "always return something renderable": a truncated
/// mid-stream fragment routinely fails to render, and the previous frame is
/// the right thing to show in its place. Only an engine load failure
/// surfaces as an error.
pub struct FallbackRenderer {
    loader: Arc<ResourceLoader>,
    cache: RwLock<HashMap<InstanceId, CacheEntry>>,
    themes: RwLock<HashMap<EngineId, ThemeMode>>,
}

impl FallbackRenderer {
    pub fn new(loader: Arc<ResourceLoader>) -> Self {
        Self {
            loader,
            cache: RwLock::new(HashMap::new()),
            themes: RwLock::new(HashMap::new()),
        }
    }

    /// Render `input` for the block instance `instance`.
    ///
    /// On success the artifact is cached under `instance` and returned. On
    /// rejection the cached artifact is returned, or the empty artifact if
    /// none exists yet. A stale pass (older `ctx.version`) never overwrites a
    /// newer cached artifact.
    pub async fn render(
        &self,
        engine_id: &EngineId,
        instance: &InstanceId,
        input: &str,
        ctx: &RenderContext,
    ) -> Result<Artifact> {
        let engine = self.loader.acquire(engine_id).await?;
        self.sync_theme(engine_id, engine.as_ref(), ctx.theme).await;

        match engine.render(input, ctx).await {
            Ok(artifact) => {
                self.commit(instance, artifact.clone(), ctx.version).await;
                Ok(artifact)
            }
            Err(err) => {
                tracing::debug!(
                    engine = %engine_id,
                    instance = %instance,
                    error = %err,
                    "render rejected, serving last good artifact"
                );
                Ok(self.cached(instance).await)
            }
        }
    }

    /// Last successfully rendered artifact for `instance`, if any.
    pub async fn cached(&self, instance: &InstanceId) -> Artifact {
        self.cache
            .read()
            .await
            .get(instance)
            .map(|entry| entry.artifact.clone())
            .unwrap_or_else(Artifact::empty)
    }

    async fn commit(&self, instance: &InstanceId, artifact: Artifact, version: SourceVersion) {
        let mut cache = self.cache.write().await;
        match cache.get(instance) {
            // A superseded pass may still complete; keep the newer artifact.
            Some(entry) if entry.version > version => {}
            _ => {
                cache.insert(instance.clone(), CacheEntry { artifact, version });
            }
        }
    }

    /// Reconfigure the existing engine instance when the theme drifts from
    /// what it was last configured with. Never constructs a second instance.
    async fn sync_theme(&self, engine_id: &EngineId, engine: &dyn RenderEngine, theme: ThemeMode) {
        {
            let themes = self.themes.read().await;
            if themes.get(engine_id) == Some(&theme) {
                return;
            }
        }
        if let Err(err) = engine.reconfigure(theme).await {
            tracing::debug!(engine = %engine_id, error = %err, "engine reconfigure rejected");
            return;
        }
        self.themes.write().await.insert(engine_id.clone(), theme);
    }
}
