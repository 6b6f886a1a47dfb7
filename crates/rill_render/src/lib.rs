//! Streaming-tolerant markdown annotation and resolution pipeline.
//!
//! Sits between an external markdown-to-tree parser and an external UI
//! binding. On every incremental update the pipeline re-derives, from the
//! full current source, which blocks are still mid-arrival, resolves
//! structured-directive fences into directives or placeholders, renders
//! engine-backed leaves with last-good fallback, and commits the result
//! last-writer-wins so visible output never flickers backwards.

mod annotate;
mod assemble;
mod notify;
mod resolve;
mod session;

pub use annotate::{annotate, completion_for};
pub use assemble::{AssembledTree, RenderTreeAssembler};
pub use notify::{ImageCountNotifier, MediaCountChanged};
pub use resolve::DirectiveResolver;
pub use session::{RenderSession, SessionConfig};
