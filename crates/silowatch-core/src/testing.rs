// ── In-process backend fake for unit tests ──

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, TimeZone, Utc};
use tokio::sync::Notify;

use crate::backend::{Backend, BoxFuture};
use crate::error::CoreError;
use crate::model::{
    Alert, AlertSeverity, AlertStatus, AlertType, EntityId, GeneratedCode, Location,
    RegistrationCode,
};

pub(crate) fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 10, 0, 0)
        .single()
        .unwrap_or_default()
}

pub(crate) fn alert(id: &str, status: AlertStatus) -> Alert {
    Alert {
        id: EntityId::from(id),
        alert_type: AlertType::TemperatureHigh,
        severity: AlertSeverity::High,
        status,
        title: format!("Alert {id}"),
        message: "Temperature above threshold".into(),
        farm_id: Some(EntityId::from("F1")),
        farm_name: Some("Home Farm".into()),
        device_id: None,
        device_name: None,
        sensor_type: Some("temperature".into()),
        value: Some(31.5),
        threshold: Some(30.0),
        unit: Some("C".into()),
        created_at: t0(),
        updated_at: t0(),
        acknowledged_at: None,
        acknowledged_by: None,
        resolved_at: None,
        resolved_by: None,
        metadata: serde_json::Map::new(),
    }
}

pub(crate) fn code(id: &str, expires_at: DateTime<Utc>) -> RegistrationCode {
    RegistrationCode {
        id: EntityId::from(id),
        code: format!("CODE{id}"),
        device_name: "Field A Sensor".into(),
        farm_id: EntityId::from("F1"),
        farm_name: Some("Home Farm".into()),
        user_id: None,
        created_at: Some(expires_at - chrono::Duration::hours(24)),
        expires_at,
        used: false,
        revoked_at: None,
        location: None,
    }
}

/// Backend that keeps everything in memory and counts calls.
///
/// With a gate installed, every write waits for one `notify_one()` before
/// touching state, which lets tests observe a transition in flight.
#[derive(Default)]
pub(crate) struct FakeBackend {
    alerts: Mutex<Vec<Alert>>,
    codes: Mutex<Vec<RegistrationCode>>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    gate: Option<Arc<Notify>>,
    fail_reads: bool,
}

impl FakeBackend {
    pub(crate) fn with_alerts(alerts: Vec<Alert>) -> Self {
        Self {
            alerts: Mutex::new(alerts),
            ..Self::default()
        }
    }

    pub(crate) fn with_codes(codes: Vec<RegistrationCode>) -> Self {
        Self {
            codes: Mutex::new(codes),
            ..Self::default()
        }
    }

    pub(crate) fn and_codes(self, codes: Vec<RegistrationCode>) -> Self {
        *lock(&self.codes) = codes;
        self
    }

    pub(crate) fn gated(mut self, gate: Arc<Notify>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub(crate) fn failing_reads(mut self) -> Self {
        self.fail_reads = true;
        self
    }

    pub(crate) fn alerts(&self) -> Vec<Alert> {
        lock(&self.alerts).clone()
    }

    /// Replace the stored alerts, as if another client had written them.
    pub(crate) fn set_alerts(&self, alerts: Vec<Alert>) {
        *lock(&self.alerts) = alerts;
    }

    pub(crate) fn codes(&self) -> Vec<RegistrationCode> {
        lock(&self.codes).clone()
    }

    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub(crate) fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<(), CoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads {
            return Err(CoreError::Api {
                message: "backend unavailable".into(),
                code: None,
                status: Some(503),
            });
        }
        Ok(())
    }

    async fn write(&self) {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
    }

    fn update_alert(
        &self,
        id: &EntityId,
        f: impl FnOnce(&mut Alert),
    ) -> Result<Alert, CoreError> {
        let mut alerts = lock(&self.alerts);
        let alert = alerts
            .iter_mut()
            .find(|a| &a.id == id)
            .ok_or_else(|| not_found("alert", id))?;
        f(alert);
        Ok(alert.clone())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn not_found(entity_type: &str, id: &EntityId) -> CoreError {
    CoreError::NotFound {
        entity_type: entity_type.into(),
        identifier: id.to_string(),
    }
}

impl Backend for FakeBackend {
    fn list_alerts(&self) -> BoxFuture<'_, Result<Vec<Alert>, CoreError>> {
        Box::pin(async move {
            self.read()?;
            Ok(self.alerts())
        })
    }

    fn get_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            self.read()?;
            lock(&self.alerts)
                .iter()
                .find(|a| &a.id == id)
                .cloned()
                .ok_or_else(|| not_found("alert", id))
        })
    }

    fn acknowledge_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            self.write().await;
            self.update_alert(id, |a| {
                a.status = AlertStatus::Acknowledged;
                a.acknowledged_at = Some(at);
                a.acknowledged_by = Some(actor.to_owned());
                a.updated_at = at;
            })
        })
    }

    fn resolve_alert<'a>(
        &'a self,
        id: &'a EntityId,
        actor: &'a str,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<Alert, CoreError>> {
        Box::pin(async move {
            self.write().await;
            self.update_alert(id, |a| {
                a.status = AlertStatus::Resolved;
                a.resolved_at = Some(at);
                a.resolved_by = Some(actor.to_owned());
                a.updated_at = at;
            })
        })
    }

    fn delete_alert<'a>(&'a self, id: &'a EntityId) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.write().await;
            let mut alerts = lock(&self.alerts);
            let before = alerts.len();
            alerts.retain(|a| &a.id != id);
            if alerts.len() == before {
                return Err(not_found("alert", id));
            }
            Ok(())
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
            self.write().await;
            let mut codes = lock(&self.codes);
            let n = codes.len() + 1;
            let token = format!("GEN{n:05}");
            codes.insert(
                0,
                RegistrationCode {
                    id: EntityId::from(format!("gen-{n}")),
                    code: token.clone(),
                    device_name: device_name.to_owned(),
                    farm_id: farm_id.clone(),
                    farm_name: Some("Home Farm".into()),
                    user_id: None,
                    created_at: Some(expires_at - chrono::Duration::hours(24)),
                    expires_at,
                    used: false,
                    revoked_at: None,
                    location: location.cloned(),
                },
            );
            Ok(GeneratedCode {
                code: token,
                expires_at,
                device_name: device_name.to_owned(),
                farm_name: Some("Home Farm".into()),
            })
        })
    }

    fn list_active_registration_codes(
        &self,
        now: DateTime<Utc>,
    ) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>> {
        Box::pin(async move {
            self.read()?;
            let mut active: Vec<RegistrationCode> = self
                .codes()
                .into_iter()
                .filter(|c| !c.used && c.expires_at > now)
                .collect();
            active.sort_by(|a, b| b.expires_at.cmp(&a.expires_at));
            Ok(active)
        })
    }

    fn list_registration_codes(&self) -> BoxFuture<'_, Result<Vec<RegistrationCode>, CoreError>> {
        Box::pin(async move {
            self.read()?;
            Ok(self.codes())
        })
    }

    fn revoke_registration_code<'a>(
        &'a self,
        id: &'a EntityId,
        at: DateTime<Utc>,
    ) -> BoxFuture<'a, Result<(), CoreError>> {
        Box::pin(async move {
            self.write().await;
            let mut codes = lock(&self.codes);
            let code = codes
                .iter_mut()
                .find(|c| &c.id == id)
                .ok_or_else(|| not_found("registration code", id))?;
            code.used = true;
            code.revoked_at = Some(at);
            Ok(())
        })
    }
}
