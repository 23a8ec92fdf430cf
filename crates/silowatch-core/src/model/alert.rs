// ── Alert domain types ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr};

use super::entity_id::EntityId;

/// Every alert type the backend declares.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertType {
    SensorOffline,
    BatteryLow,
    TemperatureHigh,
    TemperatureLow,
    HumidityHigh,
    HumidityLow,
    #[serde(rename = "co2_high")]
    #[strum(serialize = "co2_high")]
    Co2High,
    FillLevelHigh,
    FillLevelLow,
    ConnectionLost,
    SystemError,
}

/// Alert severity, ordered from least to most urgent.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

/// Stored alert lifecycle status.
///
/// Moves forward only: `active -> acknowledged -> resolved`, or straight
/// from `active` to `resolved`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertStatus {
    Active,
    Acknowledged,
    Resolved,
}

impl AlertStatus {
    /// No acknowledge or resolve is accepted from a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved)
    }
}

/// A sensor or device condition that needs operator attention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: EntityId,
    #[serde(rename = "type")]
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
    pub status: AlertStatus,
    pub title: String,
    pub message: String,

    // Related entities
    pub farm_id: Option<EntityId>,
    pub farm_name: Option<String>,
    pub device_id: Option<EntityId>,
    pub device_name: Option<String>,
    pub sensor_type: Option<String>,

    // Reading that tripped the alert
    pub value: Option<f64>,
    pub threshold: Option<f64>,
    pub unit: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub acknowledged_at: Option<DateTime<Utc>>,
    pub acknowledged_by: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolved_by: Option<String>,

    pub metadata: serde_json::Map<String, serde_json::Value>,
}

impl AsRef<Alert> for Alert {
    fn as_ref(&self) -> &Alert {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn alert_types_use_wire_names() {
        let names: Vec<&'static str> = AlertType::iter().map(Into::into).collect();
        assert_eq!(
            names,
            vec![
                "sensor_offline",
                "battery_low",
                "temperature_high",
                "temperature_low",
                "humidity_high",
                "humidity_low",
                "co2_high",
                "fill_level_high",
                "fill_level_low",
                "connection_lost",
                "system_error",
            ]
        );
        assert_eq!("co2_high".parse::<AlertType>().ok(), Some(AlertType::Co2High));
        assert_eq!(
            serde_json::to_value(AlertType::Co2High).ok(),
            Some(serde_json::json!("co2_high"))
        );
    }

    #[test]
    fn severity_is_ordered() {
        assert!(AlertSeverity::Low < AlertSeverity::Medium);
        assert!(AlertSeverity::High < AlertSeverity::Critical);
    }

    #[test]
    fn only_resolved_is_terminal() {
        assert!(!AlertStatus::Active.is_terminal());
        assert!(!AlertStatus::Acknowledged.is_terminal());
        assert!(AlertStatus::Resolved.is_terminal());
    }
}
