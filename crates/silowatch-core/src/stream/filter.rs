// ── Filter predicates for alert snapshots ──
//
// Narrow an already-fetched snapshot without re-querying the backend.
// One linear scan, strict conjunction, input order kept.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use crate::model::{Alert, AlertSeverity, AlertStatus};
use crate::status;

/// Dashboard tab, each pinning an alert status (or none for `All`).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum StatusTab {
    #[default]
    All,
    Active,
    Acknowledged,
    Resolved,
}

impl StatusTab {
    /// Map a tab index (0 all, 1 active, 2 acknowledged, 3 resolved).
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::All),
            1 => Some(Self::Active),
            2 => Some(Self::Acknowledged),
            3 => Some(Self::Resolved),
            _ => None,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::All => 0,
            Self::Active => 1,
            Self::Acknowledged => 2,
            Self::Resolved => 3,
        }
    }

    /// The status this tab pins, if any.
    pub fn status(self) -> Option<AlertStatus> {
        match self {
            Self::All => None,
            Self::Active => Some(AlertStatus::Active),
            Self::Acknowledged => Some(AlertStatus::Acknowledged),
            Self::Resolved => Some(AlertStatus::Resolved),
        }
    }
}

/// Tab, severity and secondary status predicates, all of which must pass.
///
/// The tab and `status` both constrain the same field. When they pin
/// different statuses the result is empty; [`status_conflict`] reports
/// that case but the result is left as is.
///
/// [`status_conflict`]: AlertFilter::status_conflict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub tab: StatusTab,
    pub severity: Option<AlertSeverity>,
    pub status: Option<AlertStatus>,
}

impl AlertFilter {
    pub fn matches(&self, alert: &Alert) -> bool {
        let current = status::alert_status(alert);
        self.tab.status().is_none_or(|s| s == current)
            && self.severity.is_none_or(|s| s == alert.severity)
            && self.status.is_none_or(|s| s == current)
    }

    /// Matching alerts in input order. The input is assumed newest first
    /// and is never re-sorted.
    pub fn apply<A: AsRef<Alert> + Clone>(&self, alerts: &[A]) -> Vec<A> {
        alerts
            .iter()
            .filter(|a| self.matches(a.as_ref()))
            .cloned()
            .collect()
    }

    /// `true` when the tab and the secondary status pin different statuses,
    /// which makes every result empty.
    pub fn status_conflict(&self) -> bool {
        matches!((self.tab.status(), self.status), (Some(tab), Some(s)) if tab != s)
    }

    pub fn is_unfiltered(&self) -> bool {
        self.tab == StatusTab::All && self.severity.is_none() && self.status.is_none()
    }
}
