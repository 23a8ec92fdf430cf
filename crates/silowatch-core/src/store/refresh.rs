// ── Snapshot application ──
//
// Applies fetched collections and single-entity transition results to
// the DataStore.

use chrono::{DateTime, Utc};
use tracing::debug;

use super::DataStore;
use crate::model::{Alert, EntityId, RegistrationCode};

impl DataStore {
    /// Swap in a freshly fetched alert list (newest first).
    pub(crate) fn apply_alerts(&self, alerts: Vec<Alert>) {
        debug!(count = alerts.len(), "applying alert snapshot");
        self.alerts.replace_all(alerts);
    }

    /// Swap in a freshly fetched registration code list.
    pub(crate) fn apply_registration_codes(&self, codes: Vec<RegistrationCode>) {
        debug!(count = codes.len(), "applying registration code snapshot");
        self.registration_codes.replace_all(codes);
    }

    /// Record the backend's post-transition copy of one alert.
    pub(crate) fn apply_alert_update(&self, alert: Alert) {
        self.alerts.upsert(alert);
    }

    pub(crate) fn remove_alert(&self, id: &EntityId) {
        self.alerts.remove(id);
    }

    pub(crate) fn mark_refreshed(&self, at: DateTime<Utc>) {
        self.last_full_refresh.send_replace(Some(at));
    }
}
