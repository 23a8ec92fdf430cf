// ── Central reactive data store ──
//
// Holds the latest fetched snapshot of each lifecycle collection.
// Mutations are broadcast to subscribers via `watch` channels.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use super::collection::EntityCollection;
use crate::model::{Alert, EntityId, RegistrationCode};
use crate::stream::EntityStream;

/// Point-in-time read snapshots of the backend's alert and registration
/// code collections.
///
/// The backend stays authoritative. Each refresh swaps in a complete,
/// backend-ordered snapshot; nothing here is edited field by field.
pub struct DataStore {
    pub(crate) alerts: EntityCollection<Alert>,
    pub(crate) registration_codes: EntityCollection<RegistrationCode>,
    pub(crate) last_full_refresh: watch::Sender<Option<DateTime<Utc>>>,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_full_refresh, _) = watch::channel(None);

        Self {
            alerts: EntityCollection::new(),
            registration_codes: EntityCollection::new(),
            last_full_refresh,
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn alerts_snapshot(&self) -> Arc<Vec<Arc<Alert>>> {
        self.alerts.snapshot()
    }

    pub fn registration_codes_snapshot(&self) -> Arc<Vec<Arc<RegistrationCode>>> {
        self.registration_codes.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn alert_by_id(&self, id: &EntityId) -> Option<Arc<Alert>> {
        self.alerts.get_by_id(id)
    }

    pub fn registration_code_by_id(&self, id: &EntityId) -> Option<Arc<RegistrationCode>> {
        self.registration_codes.get_by_id(id)
    }

    // ── Count accessors ──────────────────────────────────────────────

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    pub fn registration_code_count(&self) -> usize {
        self.registration_codes.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_alerts(&self) -> EntityStream<Alert> {
        EntityStream::new(self.alerts.subscribe())
    }

    pub fn subscribe_registration_codes(&self) -> EntityStream<RegistrationCode> {
        EntityStream::new(self.registration_codes.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_full_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_full_refresh.borrow()
    }

    /// How long ago the last full refresh occurred, or `None` if never refreshed.
    pub fn data_age(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        self.last_full_refresh().map(|t| now - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
