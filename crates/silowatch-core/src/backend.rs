// ── Persistence backend seam ──
//
// Everything core needs from the remote persistence service, expressed as
// an object-safe trait so the controller can hold `Arc<dyn Backend>` and
// tests can swap in an in-process fake. `BackendClient` is the production
// implementation.

use std::future::Future;
use std::pin::Pin;

use chrono::{DateTime, Utc};
use silowatch_api::BackendClient;
use silowatch_api::models::LocationRecord;

use crate::convert::convert_all;
use crate::error::CoreError;
use crate::model::{Alert, EntityId, GeneratedCode, Location, RegistrationCode};

/// A boxed future that is Send and has a lifetime.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Remote operations consumed by the lifecycle core.
///
/// Implementations map "entity does not exist" to [`CoreError::NotFound`].
pub trait Backend: Send + Sync {
    /// All alerts, newest first.
    fn list_alerts(&self) -> BoxFuture<'_, Result<Vec<Alert>, CoreError>>;

    /// One alert, read fresh.
    fn get_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Alert, CoreError>>;

    /// Persist the acknowledge transition and return the stored record.
    fn acknowledge_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>>;

    /// Persist the resolve transition and return the stored record.
    fn resolve_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>>;

    /// Remove an alert permanently.
    fn delete_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<(), CoreError>>;

    /// Mint a new registration code. The token is generated remotely.
    fn generate_registration_code<'a>(
        &'a self,
        farm_id: &'a EntityId,
        device_name: &'a str,
        location: Option<&'a Location>,
        expires_at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<GeneratedCode, CoreError>>;

    /// Unused codes whose deadline is after `now`, latest expiry first.
    fn list_active_registration_codes(
        &self,
        now: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>>;

    /// Every code, newest first.
    fn list_registration_codes(&self) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>>;

    /// Mark a code used and revoked at `at`.
    fn revoke_registration_code<'a>(
        &'a self,
        id: &'a EntityId,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<(), CoreError>>;
}

// ── HTTP implementation ────────────────────────────────────────────

/// Rewrite a 404 into a `NotFound` naming the entity that was asked for.
fn not_found_as(entity_type: &str, id: &EntityId, err: silowatch_api::Error) -> CoreError {
    if err.is_not_found() {
        CoreError::NotFound {
            entity_type: entity_type.into(),
            identifier: id.to_string(),
        }
    } else {
        CoreError::from(err)
    }
}

impl Backend for BackendClient {
    fn list_alerts(&self) -> BoxFuture<'_, Result<Vec<Alert>, CoreError>> {
        Box::pin(async move {
            let records = BackendClient::list_alerts(self).await?;
            Ok(convert_all(records, "alert"))
        })
    }

    fn get_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            let record = BackendClient::get_alert(self, id.as_str())
                .await
                .map_err(|e| not_found_as("alert", id, e))?;
            Alert::try_from(record)
        })
    }

    fn acknowledge_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            let record = BackendClient::acknowledge_alert(self, id.as_str(), actor, at)
                .await
                .map_err(|e| not_found_as("alert", id, e))?;
            Alert::try_from(record)
        })
    }

    fn resolve_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            let record = BackendClient::resolve_alert(self, id.as_str(), actor, at)
                .await
                .map_err(|e| not_found_as("alert", id, e))?;
            Alert::try_from(record)
        })
    }

    fn delete_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            BackendClient::delete_alert(self, id.as_str())
                .await
                .map_err(|e| not_found_as("alert", id, e))
        })
    }

    fn generate_registration_code<'a>(
        &'a self,
        farm_id: &'a EntityId,
        device_name: &'a str,
        location: Option<&'a Location>,
        expires_at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<GeneratedCode, CoreError>> {
        Box::pin(async move {
            let location = location.map(LocationRecord::from);
            let resp = BackendClient::generate_registration_code(
                self,
                farm_id.as_str(),
                device_name,
                location.as_ref(),
                expires_at,
            )
            .await?;
            Ok(GeneratedCode::from(resp))
        })
    }

    fn list_active_registration_codes(
        &self,
        now: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>> {
        Box::pin(async move {
            let records = BackendClient::list_active_registration_codes(self, now).await?;
            Ok(convert_all(records, "registration code"))
        })
    }

    fn list_registration_codes(&self) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>> {
        Box::pin(async move {
            let records = BackendClient::list_registration_codes(self).await?;
            Ok(convert_all(records, "registration code"))
        })
    }

    fn revoke_registration_code<'a>(
        &'a self,
        id: &'a EntityId,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            BackendClient::revoke_registration_code(self, id.as_str(), at)
                .await
                .map_err(|e| not_found_as("registration code", id, e))
        })
    }
}
