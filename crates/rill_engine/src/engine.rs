use std::sync::Arc;

use async_trait::async_trait;
use rill_domain::{Artifact, EngineId, RenderContext, ThemeMode};

/// Seam to an external rendering engine (syntax highlighter, diagram
/// renderer).
///
/// Rejections from `render` are the expected common case while the input is a
/// mid-stream fragment; the fallback renderer absorbs them. Errors here use
/// `anyhow` because they never cross the crate boundary as-is.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Render `input` into an artifact.
    async fn render(&self, input: &str, ctx: &RenderContext) -> anyhow::Result<Artifact>;

    /// Apply a new theme to the existing instance.
    ///
    /// Called instead of constructing a second engine; exactly one instance
    /// exists per engine id for the life of the loader.
    async fn reconfigure(&self, theme: ThemeMode) -> anyhow::Result<()>;
}

/// Performs the slow, fallible initialization of an engine.
///
/// Supplied by the embedder; typically wraps a WASM module instantiation or a
/// grammar-set load.
#[async_trait]
pub trait EngineFactory: Send + Sync {
    async fn load(&self, id: &EngineId) -> anyhow::Result<Arc<dyn RenderEngine>>;
}
