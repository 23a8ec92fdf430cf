// ── Snapshot aggregation ──
//
// Summary counts over one alert or registration-code snapshot. Pure,
// single pass, never mutates its input.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::model::{
    Alert, AlertSeverity, AlertStatus, AlertType, CodeStatus, RegistrationCode,
};
use crate::status;

/// Counts by status, severity and type.
///
/// `by_severity` and `by_type` are dense: every declared key is present,
/// zero when no alert carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertStats {
    pub total: usize,
    pub active: usize,
    pub acknowledged: usize,
    pub resolved: usize,
    pub by_severity: BTreeMap<AlertSeverity, usize>,
    pub by_type: BTreeMap<AlertType, usize>,
}

impl AlertStats {
    pub fn compute<A: AsRef<Alert>>(alerts: &[A]) -> Self {
        let mut stats = Self {
            total: 0,
            active: 0,
            acknowledged: 0,
            resolved: 0,
            by_severity: AlertSeverity::iter().map(|s| (s, 0)).collect(),
            by_type: AlertType::iter().map(|t| (t, 0)).collect(),
        };

        for alert in alerts {
            let alert = alert.as_ref();
            stats.total += 1;
            match status::alert_status(alert) {
                AlertStatus::Active => stats.active += 1,
                AlertStatus::Acknowledged => stats.acknowledged += 1,
                AlertStatus::Resolved => stats.resolved += 1,
            }
            *stats.by_severity.entry(alert.severity).or_default() += 1;
            *stats.by_type.entry(alert.alert_type).or_default() += 1;
        }

        stats
    }

    pub fn severity(&self, severity: AlertSeverity) -> usize {
        self.by_severity.get(&severity).copied().unwrap_or_default()
    }

    pub fn of_type(&self, alert_type: AlertType) -> usize {
        self.by_type.get(&alert_type).copied().unwrap_or_default()
    }
}

// ── Registration codes ─────────────────────────────────────────────

/// Codes grouped by derived status at one instant. Input order is kept
/// within each group.
#[derive(Debug, Clone)]
pub struct CodePartition<A> {
    pub active: Vec<A>,
    pub expired: Vec<A>,
    pub used: Vec<A>,
    pub revoked: Vec<A>,
}

impl<A: AsRef<RegistrationCode> + Clone> CodePartition<A> {
    pub fn compute(codes: &[A], now: DateTime<Utc>) -> Self {
        let mut partition = Self {
            active: Vec::new(),
            expired: Vec::new(),
            used: Vec::new(),
            revoked: Vec::new(),
        };

        for code in codes {
            let bucket = match code.as_ref().status(now) {
                CodeStatus::Active => &mut partition.active,
                CodeStatus::Expired => &mut partition.expired,
                CodeStatus::Used => &mut partition.used,
                CodeStatus::Revoked => &mut partition.revoked,
            };
            bucket.push(code.clone());
        }

        partition
    }

    pub fn summary(&self) -> CodeSummary {
        CodeSummary {
            active: self.active.len(),
            expired: self.expired.len(),
            used: self.used.len(),
            revoked: self.revoked.len(),
            total: self.active.len() + self.expired.len() + self.used.len() + self.revoked.len(),
        }
    }
}

/// Counts per derived code status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CodeSummary {
    pub active: usize,
    pub expired: usize,
    pub used: usize,
    pub revoked: usize,
    pub total: usize,
}
