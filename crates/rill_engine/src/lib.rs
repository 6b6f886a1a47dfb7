mod engine;
mod fallback;
mod loader;

pub use engine::{EngineFactory, RenderEngine};
pub use fallback::FallbackRenderer;
pub use loader::ResourceLoader;
