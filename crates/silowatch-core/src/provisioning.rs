// ── Provisioning generator ──
//
// Issues time-bounded device registration codes. The token is minted by
// the backend; the client validates input, stamps the absolute deadline,
// and passes failures straight back to the caller.

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{EntityId, GeneratedCode, Location};

/// Lifetime of every registration code. Not adjustable per request.
pub const REGISTRATION_CODE_TTL: TimeDelta = TimeDelta::hours(24);

/// Input for [`generate`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisioningRequest {
    pub farm_id: EntityId,
    pub device_name: String,
    pub location: Option<Location>,
}

impl ProvisioningRequest {
    pub fn new(farm_id: impl Into<EntityId>, device_name: impl Into<String>) -> Self {
        Self {
            farm_id: farm_id.into(),
            device_name: device_name.into(),
            location: None,
        }
    }

    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Reject missing input before anything goes over the wire.
    ///
    /// Returns the request with the device name trimmed.
    pub fn validate(&self) -> Result<Self, CoreError> {
        if self.farm_id.as_str().trim().is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "a farm must be selected".into(),
            });
        }
        let device_name = self.device_name.trim();
        if device_name.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: "a device name is required".into(),
            });
        }
        let location = self
            .location
            .clone()
            .filter(|l| !l.name.trim().is_empty());

        Ok(Self {
            farm_id: self.farm_id.clone(),
            device_name: device_name.to_owned(),
            location,
        })
    }
}

/// Deadline for a code generated at `now`.
pub fn expiry_for(now: DateTime<Utc>) -> DateTime<Utc> {
    now + REGISTRATION_CODE_TTL
}

/// Validate `request`, then ask the backend for a code expiring at
/// `now + REGISTRATION_CODE_TTL`. No retry.
pub async fn generate(
    backend: &dyn Backend,
    request: &ProvisioningRequest,
    now: DateTime<Utc>,
) -> Result<GeneratedCode, CoreError> {
    let request = request.validate()?;
    let expires_at = expiry_for(now);

    debug!(
        farm_id = %request.farm_id,
        device_name = %request.device_name,
        %expires_at,
        "requesting registration code"
    );
    let generated = backend
        .generate_registration_code(
            &request.farm_id,
            &request.device_name,
            request.location.as_ref(),
            expires_at,
        )
        .await?;

    info!(
        farm_id = %request.farm_id,
        device_name = %generated.device_name,
        expires_at = %generated.expires_at,
        "registration code generated"
    );
    Ok(generated)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::CodeStatus;
    use crate::testing::{FakeBackend, t0};
    use chrono::Duration;

    #[tokio::test]
    async fn generated_code_expires_after_24_hours() {
        let fake = FakeBackend::default();
        let request = ProvisioningRequest::new("F1", "Field A Sensor");

        let generated = generate(&fake, &request, t0()).await.unwrap();
        assert_eq!(generated.expires_at, t0() + Duration::hours(24));
        assert_eq!(generated.device_name, "Field A Sensor");

        let stored = fake.codes().into_iter().next().unwrap();
        assert_eq!(stored.status(t0() + Duration::hours(23)), CodeStatus::Active);
        assert_eq!(stored.status(t0() + Duration::hours(25)), CodeStatus::Expired);
    }

    #[tokio::test]
    async fn missing_farm_is_rejected_before_remote_call() {
        let fake = FakeBackend::default();
        let err = generate(&fake, &ProvisioningRequest::new("", "Field A Sensor"), t0())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(fake.writes(), 0);
    }

    #[tokio::test]
    async fn blank_device_name_is_rejected() {
        let fake = FakeBackend::default();
        let err = generate(&fake, &ProvisioningRequest::new("F1", "  \t "), t0())
            .await
            .unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(fake.codes().is_empty());
    }

    #[test]
    fn validate_trims_name_and_drops_blank_location() {
        let request = ProvisioningRequest::new("F1", "  Bin 4 sensor ")
            .with_location(Location::named(" "))
            .validate()
            .unwrap();

        assert_eq!(request.device_name, "Bin 4 sensor");
        assert_eq!(request.location, None);
    }

    #[tokio::test]
    async fn location_is_forwarded() {
        let fake = FakeBackend::default();
        let request =
            ProvisioningRequest::new("F1", "Field A Sensor").with_location(Location::named("North bin"));

        generate(&fake, &request, t0()).await.unwrap();
        let stored = fake.codes().into_iter().next().unwrap();
        assert_eq!(stored.location, Some(Location::named("North bin")));
    }
}
