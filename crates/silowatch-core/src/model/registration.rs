// ── Registration code domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::entity_id::EntityId;
use crate::status;

/// Placeholder location name used when a code carries none.
pub const UNSPECIFIED_LOCATION: &str = "Unspecified Location";

/// Where the device being provisioned will live.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    pub coordinates: Option<serde_json::Value>,
}

impl Location {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
        }
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::named(UNSPECIFIED_LOCATION)
    }
}

/// Status of a registration code, computed at read time. Never persisted.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum CodeStatus {
    Active,
    Expired,
    Used,
    Revoked,
}

/// A one-time token that authorizes a single device provisioning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationCode {
    pub id: EntityId,
    pub code: String,
    pub device_name: String,
    pub farm_id: EntityId,
    pub farm_name: Option<String>,
    pub user_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub revoked_at: Option<DateTime<Utc>>,
    pub location: Option<Location>,
}

impl RegistrationCode {
    /// Status as of `now`. Two calls at different instants may disagree.
    pub fn status(&self, now: DateTime<Utc>) -> CodeStatus {
        status::code_status(self.used, self.revoked_at, self.expires_at, now)
    }

    /// Time left before expiry, or `None` once `now` has reached it.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        status::time_left(self.expires_at, now)
    }

    /// The code's location, or the "Unspecified Location" placeholder.
    pub fn location_or_default(&self) -> Location {
        self.location.clone().unwrap_or_default()
    }
}

impl AsRef<RegistrationCode> for RegistrationCode {
    fn as_ref(&self) -> &RegistrationCode {
        self
    }
}

/// A freshly minted code as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedCode {
    pub code: String,
    pub expires_at: DateTime<Utc>,
    pub device_name: String,
    pub farm_name: Option<String>,
}

impl GeneratedCode {
    /// Time left before the new code expires, or `None` once it has.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<chrono::Duration> {
        status::time_left(self.expires_at, now)
    }
}
