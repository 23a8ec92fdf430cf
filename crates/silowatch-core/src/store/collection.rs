// ── Generic reactive entity collection ──
//
// Ordered snapshot storage with O(1) id lookups and push-based change
// notification via `watch` channels.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::{Alert, EntityId, RegistrationCode};

/// Entities that carry their own backend id.
pub(crate) trait Keyed {
    fn entity_id(&self) -> &EntityId;
}

impl Keyed for Alert {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

impl Keyed for RegistrationCode {
    fn entity_id(&self) -> &EntityId {
        &self.id
    }
}

/// A reactive collection for a single entity type.
///
/// The snapshot is the source of truth and keeps backend order. Every
/// mutation builds a complete new `Vec` and publishes it in one `watch`
/// send, so readers never observe a half-applied refresh. `by_id` is a
/// lookup index rebuilt alongside.
pub(crate) struct EntityCollection<T: Keyed + Send + Sync + 'static> {
    by_id: DashMap<EntityId, Arc<T>>,
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Keyed + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            by_id: DashMap::new(),
            snapshot,
        }
    }

    /// Replace the whole collection with `items`, preserving their order.
    pub(crate) fn replace_all(&self, items: Vec<T>) {
        let values: Vec<Arc<T>> = items.into_iter().map(Arc::new).collect();

        self.snapshot.send_modify(|snap| {
            self.by_id.clear();
            for v in &values {
                self.by_id.insert(v.entity_id().clone(), Arc::clone(v));
            }
            *snap = Arc::new(values);
        });
    }

    /// Insert or update one entity. An existing entity keeps its position;
    /// a new one goes to the front. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, entity: T) -> bool {
        let entity = Arc::new(entity);
        let id = entity.entity_id().clone();
        let mut is_new = true;

        self.snapshot.send_modify(|snap| {
            let mut values: Vec<Arc<T>> = (**snap).clone();
            if let Some(slot) = values.iter_mut().find(|v| v.entity_id() == &id) {
                *slot = Arc::clone(&entity);
                is_new = false;
            } else {
                values.insert(0, Arc::clone(&entity));
            }
            self.by_id.insert(id.clone(), Arc::clone(&entity));
            *snap = Arc::new(values);
        });

        is_new
    }

    /// Remove an entity by id. Returns the removed entity if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let mut removed = None;

        self.snapshot.send_if_modified(|snap| {
            let Some((_, old)) = self.by_id.remove(id) else {
                return false;
            };
            let values: Vec<Arc<T>> = snap
                .iter()
                .filter(|v| v.entity_id() != id)
                .cloned()
                .collect();
            *snap = Arc::new(values);
            removed = Some(old);
            true
        });
        removed
    }

    pub(crate) fn get_by_id(&self, id: &EntityId) -> Option<Arc<T>> {
        self.by_id.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Get the current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes via a `watch::Receiver`.
    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.snapshot.borrow().len()
    }
}
