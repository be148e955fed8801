//! Write-behind channel for field edits.
//!
//! Local state is updated by the caller before `enqueue`; this module only
//! decides *when* the remote write happens. One timer per `(id, field)` key;
//! a newer enqueue replaces the pending value and restarts the timer. Writes
//! for one key go out one at a time, in enqueue order. Write failures are
//! logged and dropped, the local value is never rolled back.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::docs::api::DocumentApi;
use crate::docs::types::{DocField, DocId, FieldEdit};

pub type FieldKey = (DocId, DocField);

struct PendingWrite {
    generation: u64,
    edit: FieldEdit,
    timer: AbortHandle,
}

#[derive(Default)]
struct Slots {
    next_generation: u64,
    pending: HashMap<FieldKey, PendingWrite>,
    /// Held for the duration of a write to the key.
    in_flight: HashMap<FieldKey, Arc<AsyncMutex<()>>>,
}

impl Slots {
    fn key_lock(&mut self, key: FieldKey) -> Arc<AsyncMutex<()>> {
        self.in_flight.entry(key).or_default().clone()
    }
}

pub struct DebouncedWriter {
    api: Arc<dyn DocumentApi>,
    delay: Duration,
    slots: Arc<Mutex<Slots>>,
}

impl DebouncedWriter {
    pub fn new(api: Arc<dyn DocumentApi>, delay: Duration) -> Self {
        Self {
            api,
            delay,
            slots: Arc::new(Mutex::new(Slots::default())),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Applies to timers started after the change.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
    }

    /// Schedule `edit` for `id`, superseding any pending value for the same field.
    pub fn enqueue(&self, id: DocId, edit: FieldEdit) {
        let key = (id, edit.field());
        let Ok(mut slots) = self.slots.lock() else {
            warn!(doc_id = id, "debounce slots poisoned, dropping edit");
            return;
        };

        slots.next_generation += 1;
        let generation = slots.next_generation;

        // Spawned while the lock is held, so the timer cannot observe the
        // map before its own entry is in place.
        let timer = tokio::spawn(fire_after(
            self.api.clone(),
            self.slots.clone(),
            key,
            generation,
            self.delay,
        ))
        .abort_handle();

        let replaced = slots.pending.insert(
            key,
            PendingWrite {
                generation,
                edit,
                timer,
            },
        );
        if let Some(old) = replaced {
            old.timer.abort();
            debug!(doc_id = id, field = %key.1, "superseded pending write");
        }
    }

    /// Number of keys waiting on a timer.
    pub fn pending_count(&self) -> usize {
        self.slots.lock().map(|s| s.pending.len()).unwrap_or(0)
    }

    #[cfg(test)]
    fn pending_value(&self, id: DocId, field: DocField) -> Option<FieldEdit> {
        let slots = self.slots.lock().ok()?;
        slots.pending.get(&(id, field)).map(|p| p.edit.clone())
    }

    /// Cancel every timer and write the pending values now.
    ///
    /// A key whose previous write is still in flight waits for it first.
    pub async fn flush(&self) {
        let drained: Vec<(FieldKey, FieldEdit, Arc<AsyncMutex<()>>)> = match self.slots.lock() {
            Ok(mut slots) => {
                let pending: Vec<_> = slots.pending.drain().collect();
                pending
                    .into_iter()
                    .map(|(key, pending)| {
                        pending.timer.abort();
                        (key, pending.edit, slots.key_lock(key))
                    })
                    .collect()
            }
            Err(_) => return,
        };
        if drained.is_empty() {
            return;
        }

        debug!(count = drained.len(), "flushing pending writes");
        let api = &self.api;
        join_all(drained.into_iter().map(|((id, _), edit, lock)| async move {
            let _turn = lock.lock_owned().await;
            write(api.as_ref(), id, &edit).await;
        }))
        .await;
    }
}

impl Drop for DebouncedWriter {
    fn drop(&mut self) {
        if let Ok(mut slots) = self.slots.lock() {
            let dropped = slots.pending.len();
            for (_, pending) in slots.pending.drain() {
                pending.timer.abort();
            }
            if dropped > 0 {
                debug!(dropped, "discarding pending writes on teardown");
            }
        }
    }
}

async fn fire_after(
    api: Arc<dyn DocumentApi>,
    slots: Arc<Mutex<Slots>>,
    key: FieldKey,
    generation: u64,
    delay: Duration,
) {
    tokio::time::sleep(delay).await;

    // Wait out any write already sent for this key. Until the slot is
    // claimed below, a newer enqueue may still abort this task.
    let lock = match slots.lock() {
        Ok(mut slots) => slots.key_lock(key),
        Err(_) => return,
    };
    let _turn = lock.lock_owned().await;

    // Claim the slot. Once removed, a newer enqueue starts a fresh timer
    // instead of aborting this task, so an issued write is never cut short.
    let edit = {
        let Ok(mut slots) = slots.lock() else {
            return;
        };
        match slots.pending.get(&key) {
            Some(p) if p.generation == generation => {}
            _ => return,
        }
        match slots.pending.remove(&key) {
            Some(p) => p.edit,
            None => return,
        }
    };

    write(api.as_ref(), key.0, &edit).await;
}

async fn write(api: &dyn DocumentApi, id: DocId, edit: &FieldEdit) {
    match api.update_field(id, edit).await {
        Ok(()) => debug!(doc_id = id, field = %edit.field(), "field persisted"),
        Err(e) => warn!(doc_id = id, field = %edit.field(), error = %e, "background write failed"),
    }
}
