// ── API-to-domain type conversions ──
//
// Bridges raw `silowatch_api` wire records into canonical
// `silowatch_core::model` types. This is the one place record shape is
// validated: enum strings are parsed, required timestamps enforced, empty
// optional strings dropped. Everything downstream trusts the result.

use std::str::FromStr;

use silowatch_api::models::{
    AlertRecord, Decoded, GenerateCodeResponse, LocationRecord, RegistrationCodeRecord,
};
use tracing::warn;

use crate::error::CoreError;
use crate::model::{Alert, EntityId, GeneratedCode, Location, RegistrationCode};

// ── Helpers ────────────────────────────────────────────────────────

fn invalid(entity_type: &str, id: &str, reason: impl Into<String>) -> CoreError {
    CoreError::InvalidRecord {
        entity_type: entity_type.into(),
        identifier: id.into(),
        reason: reason.into(),
    }
}

/// Parse a wire enum string, naming the offending field on failure.
fn parse_enum<T: FromStr>(
    entity_type: &str,
    id: &str,
    field: &str,
    raw: &str,
) -> Result<T, CoreError> {
    raw.parse()
        .map_err(|_| invalid(entity_type, id, format!("unknown {field} {raw:?}")))
}

/// Treat empty strings as absent.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

/// Convert a page of decoded list elements, skipping (and logging) both
/// undecodable documents and records that fail validation.
pub(crate) fn convert_all<R, T>(records: Vec<Decoded<R>>, entity_type: &str) -> Vec<T>
where
    T: TryFrom<R, Error = CoreError>,
{
    let total = records.len();
    let converted: Vec<T> = records
        .into_iter()
        .map(|rec| {
            rec.map_err(|m| {
                invalid(
                    entity_type,
                    m.id.as_deref().unwrap_or("<missing>"),
                    m.reason,
                )
            })
            .and_then(T::try_from)
        })
        .filter_map(|rec| match rec {
            Ok(item) => Some(item),
            Err(e) => {
                warn!(entity_type, error = %e, "skipping invalid record");
                None
            }
        })
        .collect();

    if converted.len() < total {
        warn!(
            entity_type,
            skipped = total - converted.len(),
            total,
            "snapshot contained invalid records"
        );
    }
    converted
}

// ── Alert ──────────────────────────────────────────────────────────

impl TryFrom<AlertRecord> for Alert {
    type Error = CoreError;

    fn try_from(r: AlertRecord) -> Result<Self, Self::Error> {
        const KIND: &str = "alert";

        if r.id.is_empty() {
            return Err(invalid(KIND, "<missing>", "empty id"));
        }
        let alert_type = parse_enum(KIND, &r.id, "type", &r.alert_type)?;
        let severity = parse_enum(KIND, &r.id, "severity", &r.severity)?;
        let status = parse_enum(KIND, &r.id, "status", &r.status)?;
        let created_at = r
            .created_at
            .ok_or_else(|| invalid(KIND, &r.id, "missing createdAt"))?;

        Ok(Alert {
            id: EntityId::from(r.id),
            alert_type,
            severity,
            status,
            title: r.title,
            message: r.message,
            farm_id: non_empty(r.farm_id).map(EntityId::from),
            farm_name: non_empty(r.farm_name),
            device_id: non_empty(r.device_id).map(EntityId::from),
            device_name: non_empty(r.device_name),
            sensor_type: non_empty(r.sensor_type),
            value: r.value,
            threshold: r.threshold,
            unit: non_empty(r.unit),
            created_at,
            updated_at: r.updated_at.unwrap_or(created_at),
            acknowledged_at: r.acknowledged_at,
            acknowledged_by: non_empty(r.acknowledged_by),
            resolved_at: r.resolved_at,
            resolved_by: non_empty(r.resolved_by),
            metadata: r.metadata,
        })
    }
}

// ── Registration code ──────────────────────────────────────────────

impl From<LocationRecord> for Location {
    fn from(r: LocationRecord) -> Self {
        Self {
            name: r.name,
            coordinates: r.coordinates.filter(|c| !c.is_null()),
        }
    }
}

impl From<&Location> for LocationRecord {
    fn from(l: &Location) -> Self {
        Self {
            name: l.name.clone(),
            coordinates: l.coordinates.clone(),
        }
    }
}

impl TryFrom<RegistrationCodeRecord> for RegistrationCode {
    type Error = CoreError;

    fn try_from(r: RegistrationCodeRecord) -> Result<Self, Self::Error> {
        const KIND: &str = "registration code";

        if r.id.is_empty() {
            return Err(invalid(KIND, "<missing>", "empty id"));
        }
        if r.code.is_empty() {
            return Err(invalid(KIND, &r.id, "empty code"));
        }
        let expires_at = r
            .expires_at
            .ok_or_else(|| invalid(KIND, &r.id, "missing expires_at"))?;

        Ok(RegistrationCode {
            id: EntityId::from(r.id),
            code: r.code,
            device_name: r.device_name,
            farm_id: EntityId::from(r.farm_id),
            farm_name: non_empty(r.farm_name),
            user_id: non_empty(r.user_id),
            created_at: r.created_at,
            expires_at,
            used: r.used,
            revoked_at: r.revoked_at,
            location: r.location.map(Location::from),
        })
    }
}

impl From<GenerateCodeResponse> for GeneratedCode {
    fn from(r: GenerateCodeResponse) -> Self {
        Self {
            code: r.registration_code,
            expires_at: r.expires_at,
            device_name: r.device_name,
            farm_name: non_empty(r.farm_name),
        }
    }
}
