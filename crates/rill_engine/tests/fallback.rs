use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rill_domain::{Artifact, EngineId, InstanceId, RenderContext, SourceVersion, ThemeMode};
use rill_engine::{EngineFactory, FallbackRenderer, RenderEngine, ResourceLoader};

/// Engine whose outcomes are scripted per call: `true` renders the input,
/// `false` rejects it as a truncated fragment would be.
struct ScriptedEngine {
    script: Mutex<VecDeque<bool>>,
    reconfigures: AtomicUsize,
}

impl ScriptedEngine {
    fn new(script: impl IntoIterator<Item = bool>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into_iter().collect()),
            reconfigures: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl RenderEngine for ScriptedEngine {
    async fn render(&self, input: &str, _ctx: &RenderContext) -> anyhow::Result<Artifact> {
        let ok = self.script.lock().unwrap().pop_front().unwrap_or(true);
        if ok {
            Ok(Artifact::new(format!("<svg>{input}</svg>")))
        } else {
            anyhow::bail!("parse error in diagram source")
        }
    }

    async fn reconfigure(&self, _theme: ThemeMode) -> anyhow::Result<()> {
        self.reconfigures.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct SingleEngineFactory {
    engine: Arc<ScriptedEngine>,
}

#[async_trait]
impl EngineFactory for SingleEngineFactory {
    async fn load(&self, _id: &EngineId) -> anyhow::Result<Arc<dyn RenderEngine>> {
        Ok(self.engine.clone())
    }
}

fn renderer_with(engine: Arc<ScriptedEngine>) -> FallbackRenderer {
    let loader = Arc::new(ResourceLoader::new(Arc::new(SingleEngineFactory { engine })));
    FallbackRenderer::new(loader)
}

fn ctx(version: u64) -> RenderContext {
    RenderContext::new(ThemeMode::Dark, SourceVersion(version))
}

#[tokio::test]
async fn test_success_then_rejection_returns_last_good_artifact() {
    let engine = ScriptedEngine::new([true, false]);
    let fixture = renderer_with(engine);
    let id = EngineId::new("mermaid");
    let instance = InstanceId::at_offset(0);

    let first = fixture
        .render(&id, &instance, "graph TD; A-->B", &ctx(1))
        .await
        .unwrap();
    assert_eq!(first, Artifact::new("<svg>graph TD; A-->B</svg>"));

    // The follow-up chunk makes the source momentarily invalid.
    let actual = fixture
        .render(&id, &instance, "graph TD; A-->B; C--", &ctx(2))
        .await
        .unwrap();
    assert_eq!(actual, first);
}

#[tokio::test]
async fn test_rejection_before_any_success_returns_empty_artifact() {
    let engine = ScriptedEngine::new([false]);
    let fixture = renderer_with(engine);
    let id = EngineId::new("mermaid");
    let instance = InstanceId::at_offset(0);

    let actual = fixture.render(&id, &instance, "graph T", &ctx(1)).await.unwrap();
    assert_eq!(actual, Artifact::empty());
}

#[tokio::test]
async fn test_instance_never_regresses_after_first_success() {
    let engine = ScriptedEngine::new([true, false, false, false]);
    let fixture = renderer_with(engine);
    let id = EngineId::new("mermaid");
    let instance = InstanceId::at_offset(4);

    let good = fixture.render(&id, &instance, "ok", &ctx(1)).await.unwrap();
    for version in 2..5 {
        let actual = fixture
            .render(&id, &instance, "broken", &ctx(version))
            .await
            .unwrap();
        assert_eq!(actual, good);
        assert!(!actual.is_empty());
    }
}

#[tokio::test]
async fn test_stale_pass_does_not_overwrite_newer_cache_entry() {
    let engine = ScriptedEngine::new([true, true, false]);
    let fixture = renderer_with(engine);
    let id = EngineId::new("mermaid");
    let instance = InstanceId::at_offset(0);

    // Newer pass commits first.
    let newer = fixture.render(&id, &instance, "v2 source", &ctx(2)).await.unwrap();
    // A superseded pass completes late; its artifact must not replace the
    // cached one.
    fixture.render(&id, &instance, "v1 source", &ctx(1)).await.unwrap();

    let actual = fixture.render(&id, &instance, "broken", &ctx(3)).await.unwrap();
    assert_eq!(actual, newer);
}

#[tokio::test]
async fn test_theme_drift_reconfigures_existing_engine_once() {
    let engine = ScriptedEngine::new([true, true, true]);
    let fixture = renderer_with(engine.clone());
    let id = EngineId::new("mermaid");
    let instance = InstanceId::at_offset(0);

    let dark = RenderContext::new(ThemeMode::Dark, SourceVersion(1));
    fixture.render(&id, &instance, "a", &dark).await.unwrap();
    let dark = RenderContext::new(ThemeMode::Dark, SourceVersion(2));
    fixture.render(&id, &instance, "b", &dark).await.unwrap();
    let light = RenderContext::new(ThemeMode::Light, SourceVersion(3));
    fixture.render(&id, &instance, "c", &light).await.unwrap();

    // Once for the initial theme, once for the switch to light.
    assert_eq!(engine.reconfigures.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_instances_are_cached_independently() {
    let engine = ScriptedEngine::new([true, false, false]);
    let fixture = renderer_with(engine);
    let id = EngineId::new("mermaid");
    let first = InstanceId::at_offset(0);
    let second = InstanceId::at_offset(100);

    let good = fixture.render(&id, &first, "ok", &ctx(1)).await.unwrap();
    let actual = fixture.render(&id, &second, "broken", &ctx(2)).await.unwrap();
    assert_eq!(actual, Artifact::empty());

    let actual = fixture.render(&id, &first, "broken", &ctx(3)).await.unwrap();
    assert_eq!(actual, good);
}
