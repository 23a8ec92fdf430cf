// ── Transition executor ──
//
// Validates and performs caller-requested state changes against the
// backend. The precondition is checked on a fresh read immediately before
// the write; nothing isolates that read from the write, so a concurrent
// actor can still win the race. The next refresh shows the outcome.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use strum::Display;
use tracing::{debug, info, warn};

use crate::backend::Backend;
use crate::error::CoreError;
use crate::model::{Alert, AlertStatus, EntityId};

/// Caller-triggered alert transitions that carry an actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum AlertAction {
    Acknowledge,
    Resolve,
}

impl AlertAction {
    /// Status the alert moves to, or `None` when `current` does not permit
    /// this action.
    ///
    /// | action      | allowed from              | target       |
    /// |-------------|---------------------------|--------------|
    /// | acknowledge | active                    | acknowledged |
    /// | resolve     | active, acknowledged      | resolved     |
    pub fn target_status(self, current: AlertStatus) -> Option<AlertStatus> {
        match (self, current) {
            (Self::Acknowledge, AlertStatus::Active) => Some(AlertStatus::Acknowledged),
            (Self::Resolve, AlertStatus::Active | AlertStatus::Acknowledged) => {
                Some(AlertStatus::Resolved)
            }
            _ => None,
        }
    }
}

/// Performs alert and registration-code transitions through a [`Backend`].
#[derive(Clone)]
pub struct TransitionExecutor {
    backend: Arc<dyn Backend>,
}

impl TransitionExecutor {
    pub fn new(backend: Arc<dyn Backend>) -> Self {
        Self { backend }
    }

    /// `active -> acknowledged`. Not idempotent: a second call fails with
    /// [`CoreError::PreconditionFailed`].
    pub async fn acknowledge(
        &self,
        id: &EntityId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert, CoreError> {
        self.apply(AlertAction::Acknowledge, id, actor, now).await
    }

    /// `active | acknowledged -> resolved`.
    pub async fn resolve(
        &self,
        id: &EntityId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert, CoreError> {
        self.apply(AlertAction::Resolve, id, actor, now).await
    }

    /// Delete from any status. Irreversible.
    pub async fn delete(&self, id: &EntityId) -> Result<(), CoreError> {
        require_id(id)?;
        debug!(%id, "deleting alert");
        self.backend.delete_alert(id).await?;
        info!(%id, "alert deleted");
        Ok(())
    }

    /// Revoke a registration code regardless of its current status.
    ///
    /// The backend write sets `used` together with `revoked_at`, so a
    /// redemption racing this call cannot leave the code active.
    pub async fn revoke_code(&self, id: &EntityId, now: DateTime<Utc>) -> Result<(), CoreError> {
        require_id(id)?;
        debug!(%id, "revoking registration code");
        self.backend.revoke_registration_code(id, now).await?;
        info!(%id, "registration code revoked");
        Ok(())
    }

    async fn apply(
        &self,
        action: AlertAction,
        id: &EntityId,
        actor: &str,
        now: DateTime<Utc>,
    ) -> Result<Alert, CoreError> {
        require_id(id)?;
        let actor = actor.trim();
        if actor.is_empty() {
            return Err(CoreError::ValidationFailed {
                message: format!("an actor name is required to {action} an alert"),
            });
        }

        let current = self.backend.get_alert(id).await?;
        let Some(target) = action.target_status(current.status) else {
            debug!(%id, %action, current = %current.status, "transition precondition failed");
            return Err(CoreError::PreconditionFailed {
                entity_type: "alert".into(),
                identifier: id.to_string(),
                action: action.to_string(),
                current: current.status.to_string(),
            });
        };

        // A lagging local clock must not stamp a transition before creation.
        let at = now.max(current.created_at);
        debug!(%id, %action, from = %current.status, to = %target, %at, "writing alert transition");
        let updated = match action {
            AlertAction::Acknowledge => self.backend.acknowledge_alert(id, actor, at).await?,
            AlertAction::Resolve => self.backend.resolve_alert(id, actor, at).await?,
        };

        if updated.status != target {
            warn!(
                %id,
                expected = %target,
                stored = %updated.status,
                "backend stored a different status than requested"
            );
        }
        info!(%id, %action, actor, "alert transition applied");
        Ok(updated)
    }
}

fn require_id(id: &EntityId) -> Result<(), CoreError> {
    if id.as_str().trim().is_empty() {
        return Err(CoreError::ValidationFailed {
            message: "an id is required".into(),
        });
    }
    Ok(())
}
