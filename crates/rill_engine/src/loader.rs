use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use rill_domain::{EngineId, Error, Result};
use tokio::sync::watch;

use crate::engine::{EngineFactory, RenderEngine};

/// Outcome broadcast to coalesced waiters when a load settles.
type LoadOutcome = std::result::Result<Arc<dyn RenderEngine>, String>;

enum Slot {
    /// A load is in flight; waiters observe the channel until it settles.
    Loading(watch::Receiver<Option<LoadOutcome>>),
    Ready(Arc<dyn RenderEngine>),
}

/// Lazy, coalescing loader for external rendering engines.
///
/// Each engine id moves through `Unloaded -> Loading -> Ready` (or back to
/// `Unloaded` on failure, so a later `acquire` may re-attempt). At most one
/// load is in flight per id; concurrent callers wait on the in-flight load
/// and all receive the same handle.
///
/// Constructed once by the embedder and injected wherever engines are needed;
/// the slot map is the process-wide engine state.
pub struct ResourceLoader {
    factory: Arc<dyn EngineFactory>,
    slots: Mutex<HashMap<EngineId, Slot>>,
}

impl ResourceLoader {
    pub fn new(factory: Arc<dyn EngineFactory>) -> Self {
        Self { factory, slots: Mutex::new(HashMap::new()) }
    }

    /// Get the engine for `id`, loading it on first use.
    ///
    /// Suspends while the engine initializes or while coalescing behind an
    /// in-flight load. A failed load is reported once to every caller of the
    /// in-flight attempt; the next `acquire` starts a fresh attempt.
    pub async fn acquire(&self, id: &EngineId) -> Result<Arc<dyn RenderEngine>> {
        enum Role {
            Leader(watch::Sender<Option<LoadOutcome>>),
            Waiter(watch::Receiver<Option<LoadOutcome>>),
        }

        // The lock guards state transitions only and is never held across an
        // await point.
        let role = {
            let mut slots = self.slots.lock().unwrap();
            match slots.get(id) {
                Some(Slot::Ready(engine)) => return Ok(engine.clone()),
                Some(Slot::Loading(rx)) => Role::Waiter(rx.clone()),
                None => {
                    let (tx, rx) = watch::channel(None);
                    slots.insert(id.clone(), Slot::Loading(rx));
                    Role::Leader(tx)
                }
            }
        };

        match role {
            Role::Leader(tx) => self.load(id, tx).await,
            Role::Waiter(rx) => self.wait(id, rx).await,
        }
    }

    /// Whether the engine for `id` is already loaded.
    pub fn is_ready(&self, id: &EngineId) -> bool {
        matches!(self.slots.lock().unwrap().get(id), Some(Slot::Ready(_)))
    }

    async fn load(
        &self,
        id: &EngineId,
        tx: watch::Sender<Option<LoadOutcome>>,
    ) -> Result<Arc<dyn RenderEngine>> {
        let outcome = self.factory.load(id).await;
        let mut slots = self.slots.lock().unwrap();
        match outcome {
            Ok(engine) => {
                tracing::debug!(engine = %id, "engine loaded");
                slots.insert(id.clone(), Slot::Ready(engine.clone()));
                let _ = tx.send(Some(Ok(engine.clone())));
                Ok(engine)
            }
            Err(err) => {
                let reason = err.to_string();
                tracing::warn!(engine = %id, %reason, "engine load failed");
                // Back to Unloaded; a later acquire re-attempts.
                slots.remove(id);
                let _ = tx.send(Some(Err(reason.clone())));
                Err(Error::resource_load(id.clone(), reason))
            }
        }
    }

    async fn wait(
        &self,
        id: &EngineId,
        mut rx: watch::Receiver<Option<LoadOutcome>>,
    ) -> Result<Arc<dyn RenderEngine>> {
        loop {
            if let Some(outcome) = rx.borrow_and_update().clone() {
                return outcome.map_err(|reason| Error::resource_load(id.clone(), reason));
            }
            if rx.changed().await.is_err() {
                // The leading caller was dropped before the load settled.
                // Clear the slot only if it still holds the load this waiter
                // observed; a fresh acquire may have started a new one in the
                // meantime, and that load must keep its slot.
                let mut slots = self.slots.lock().unwrap();
                if let Some(Slot::Loading(current)) = slots.get(id)
                    && current.same_channel(&rx)
                {
                    slots.remove(id);
                }
                return Err(Error::resource_load(id.clone(), "engine load was abandoned"));
            }
        }
    }
}
