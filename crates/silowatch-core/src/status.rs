// ── Status derivation ──
//
// The single place lifecycle status is decided. Filters, aggregates and
// the CLI all call through here; nothing else re-implements the priority
// order.

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{Alert, AlertStatus, CodeStatus};

/// Alert status is stored, so deriving it is the identity.
pub fn alert_status(alert: &Alert) -> AlertStatus {
    alert.status
}

/// Classify a registration code at `now`.
///
/// Priority is `used > revoked > expired > active`: a code that was
/// consumed and has since passed its deadline still reports `used`.
/// A code is expired from the instant `now` reaches `expires_at`.
pub fn code_status(
    used: bool,
    revoked_at: Option<DateTime<Utc>>,
    expires_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> CodeStatus {
    if used {
        CodeStatus::Used
    } else if revoked_at.is_some() {
        CodeStatus::Revoked
    } else if now >= expires_at {
        CodeStatus::Expired
    } else {
        CodeStatus::Active
    }
}

/// Time left before `expires_at`, or `None` once `now` has reached it.
/// Agrees with [`code_status`] on where expiry starts.
pub fn time_left(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Option<TimeDelta> {
    let left = expires_at - now;
    (left > TimeDelta::zero()).then_some(left)
}
