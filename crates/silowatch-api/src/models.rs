// Backend wire types
//
// Records as the persistence service actually sends them. Fields use
// `#[serde(default)]` liberally and enums stay raw strings: shape
// validation happens once, in `silowatch-core`'s conversion layer.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

// ── Response Envelope ────────────────────────────────────────────────

/// List envelope used by every collection endpoint.
///
/// ```json
/// { "data": [...] }
/// ```
///
/// Elements stay raw until [`decode_each`](Self::decode_each) so one
/// malformed document cannot sink the whole page.
#[derive(Debug, Deserialize)]
pub struct ListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<serde_json::Value>,
}

impl ListResponse {
    /// Decode every element independently.
    pub fn decode_each<T: DeserializeOwned>(self) -> Vec<Decoded<T>> {
        self.data.into_iter().map(decode_record).collect()
    }
}

/// A list element that could not be decoded into its record type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedRecord {
    /// The document's `id`, when it had a usable one.
    pub id: Option<String>,
    pub reason: String,
}

/// Outcome of decoding one list element.
pub type Decoded<T> = Result<T, MalformedRecord>;

fn decode_record<T: DeserializeOwned>(doc: serde_json::Value) -> Decoded<T> {
    let id = doc
        .get("id")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .map(str::to_owned);
    serde_json::from_value(doc).map_err(|e| MalformedRecord {
        id,
        reason: e.to_string(),
    })
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ── Alert ────────────────────────────────────────────────────────────

/// Alert document from `v1/alerts`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub alert_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub severity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default)]
    pub farm_id: Option<String>,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub device_name: Option<String>,
    #[serde(default)]
    pub sensor_type: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acknowledged_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub acknowledged_by: Option<String>,
    #[serde(default)]
    pub resolved_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub resolved_by: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// Body for the acknowledge / resolve endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct TransitionBody<'a> {
    pub actor: &'a str,
    pub at: DateTime<Utc>,
}

// ── Registration code ────────────────────────────────────────────────

/// Human-readable placement of a device to be provisioned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<serde_json::Value>,
}

/// Registration code document from `v1/registration-codes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationCodeRecord {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub device_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub farm_id: String,
    #[serde(default)]
    pub farm_name: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub used: bool,
    #[serde(default)]
    pub revoked_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub location: Option<LocationRecord>,
}

/// Request body for `generateRegistrationCode`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeBody<'a> {
    pub farm_id: &'a str,
    pub device_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<&'a LocationRecord>,
    pub expires_at: DateTime<Utc>,
}

/// Response of `generateRegistrationCode`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateCodeResponse {
    pub registration_code: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub farm_name: Option<String>,
}

/// Patch body for `revokeRegistrationCode`.
///
/// `used` travels with `revoked_at` so a racing redemption cannot bring
/// the code back to active.
#[derive(Debug, Clone, Serialize)]
pub struct RevokeCodeBody {
    pub used: bool,
    pub revoked_at: DateTime<Utc>,
}
