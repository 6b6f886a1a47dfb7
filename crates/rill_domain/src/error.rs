use thiserror::Error;

use crate::artifact::EngineId;

// NOTE: render rejections and directive parse failures are expected
// consequences of partial streaming input and are absorbed where they occur;
// they intentionally have no variant here. Only engine load failure is
// observable by the embedder.
#[derive(Debug, Error)]
pub enum Error {
    #[error("Engine '{engine}' failed to load: {reason}")]
    ResourceLoad { engine: EngineId, reason: String },
}

impl Error {
    pub fn resource_load(engine: EngineId, reason: impl ToString) -> Self {
        Self::ResourceLoad { engine, reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
