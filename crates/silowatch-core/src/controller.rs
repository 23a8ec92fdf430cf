// ── Controller abstraction ──
//
// Connection lifecycle for one silowatch backend. Owns the DataStore,
// runs the periodic refresh and serializes writes through the command
// processor task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use silowatch_api::BackendClient;
use silowatch_api::transport::{TlsMode, TransportConfig};

use crate::backend::Backend;
use crate::command::{Command, CommandEnvelope, CommandResult, TransitionHandle, TransitionState};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Alert, RegistrationCode};
use crate::provisioning;
use crate::stats::{AlertStats, CodePartition};
use crate::store::DataStore;
use crate::stream::{AlertFilter, EntityStream};
use crate::transition::TransitionExecutor;

const COMMAND_CHANNEL_SIZE: usize = 64;

// ── ConnectionState ──────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Failed,
}

// ── Controller ───────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Holds the backend
/// handle, the local snapshots and the background tasks that keep them
/// current.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    backend: Arc<dyn Backend>,
    executor: TransitionExecutor,
    connection_state: watch::Sender<ConnectionState>,
    command_tx: mpsc::Sender<CommandEnvelope>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl Controller {
    /// Build a controller talking HTTP to `config.url`. Does NOT connect;
    /// call [`connect()`](Self::connect) to load data and start background
    /// tasks.
    pub fn new(config: ControllerConfig) -> Result<Self, CoreError> {
        let transport = build_transport(&config);
        let client = BackendClient::from_api_key(config.url.as_str(), &config.api_key, &transport)?;
        Ok(Self::with_backend(config, Arc::new(client)))
    }

    /// Build a controller over any [`Backend`] implementation.
    pub fn with_backend(config: ControllerConfig, backend: Arc<dyn Backend>) -> Self {
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store: Arc::new(DataStore::new()),
                executor: TransitionExecutor::new(Arc::clone(&backend)),
                backend,
                connection_state,
                command_tx,
                command_rx: Mutex::new(Some(command_rx)),
                cancel: CancellationToken::new(),
                task_handles: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Access the controller configuration.
    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    /// Access the underlying DataStore.
    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────

    /// Load both collections, then spawn the command processor and (when
    /// `refresh_interval_secs > 0`) the periodic refresh.
    ///
    /// A failed initial load leaves the state at
    /// [`Failed`](ConnectionState::Failed) and returns the error. Calling
    /// this while already connected does nothing.
    pub async fn connect(&self) -> Result<(), CoreError> {
        if self.inner.cancel.is_cancelled() {
            return Err(CoreError::ControllerDisconnected);
        }
        if *self.inner.connection_state.borrow() == ConnectionState::Connected {
            debug!("already connected");
            return Ok(());
        }
        self.inner
            .connection_state
            .send_replace(ConnectionState::Connecting);

        if let Err(e) = self.full_refresh().await {
            self.inner
                .connection_state
                .send_replace(ConnectionState::Failed);
            warn!(error = %e, url = %self.inner.config.url, "initial load failed");
            return Err(e);
        }

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        let interval_secs = self.inner.config.refresh_interval_secs;
        if interval_secs > 0 {
            let ctrl = self.clone();
            let cancel = self.inner.cancel.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval_secs, cancel)));
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Connected);
        info!(url = %self.inner.config.url, "connected to backend");
        Ok(())
    }

    /// Cancel background tasks and reset the state to
    /// [`Disconnected`](ConnectionState::Disconnected). Commands still
    /// queued resolve to [`CoreError::ControllerDisconnected`].
    pub async fn disconnect(&self) {
        self.inner.cancel.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        self.inner
            .connection_state
            .send_replace(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    /// Fetch alerts and registration codes in parallel and swap both
    /// snapshots. Either failure leaves the store untouched.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let backend = &self.inner.backend;
        let (alerts, codes) = tokio::join!(backend.list_alerts(), backend.list_registration_codes());
        let (alerts, codes) = (alerts?, codes?);

        let store = &self.inner.store;
        store.apply_alerts(alerts);
        store.apply_registration_codes(codes);
        store.mark_refreshed(Utc::now());

        debug!(
            alerts = store.alert_count(),
            registration_codes = store.registration_code_count(),
            "data refresh complete"
        );
        Ok(())
    }

    /// Re-fetch only the alert list.
    pub async fn refresh_alerts(&self) -> Result<(), CoreError> {
        let alerts = self.inner.backend.list_alerts().await?;
        self.inner.store.apply_alerts(alerts);
        Ok(())
    }

    /// Re-fetch only the registration code list.
    pub async fn refresh_registration_codes(&self) -> Result<(), CoreError> {
        let codes = self.inner.backend.list_registration_codes().await?;
        self.inner.store.apply_registration_codes(codes);
        Ok(())
    }

    // ── Command execution ────────────────────────────────────────

    /// Queue a command and return a handle that reports its progress.
    ///
    /// The handle reads [`Pending`](TransitionState::Pending) until the
    /// backend answers.
    pub async fn submit(&self, cmd: Command) -> Result<TransitionHandle, CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::ControllerDisconnected);
        }

        let (state_tx, state_rx) = watch::channel(TransitionState::Pending);
        self.inner
            .command_tx
            .send(CommandEnvelope {
                command: cmd,
                state_tx,
            })
            .await
            .map_err(|_| CoreError::ControllerDisconnected)?;

        Ok(TransitionHandle::new(state_rx))
    }

    /// Submit a command and wait for its result.
    pub async fn execute(&self, cmd: Command) -> Result<CommandResult, CoreError> {
        self.submit(cmd).await?.wait().await
    }

    // ── One-shot convenience ─────────────────────────────────────

    /// One-shot: connect, run closure, disconnect.
    ///
    /// Periodic refresh is disabled since the CLI only needs a single
    /// request-response cycle.
    pub async fn oneshot<F, Fut, T>(config: ControllerConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Controller) -> Fut,
        Fut: std::future::Future<Output = Result<T, CoreError>>,
    {
        let mut cfg = config;
        cfg.refresh_interval_secs = 0;

        let controller = Controller::new(cfg)?;
        controller.connect().await?;
        let result = f(controller.clone()).await;
        controller.disconnect().await;
        result
    }

    // ── State observation ────────────────────────────────────────

    /// Subscribe to connection state changes.
    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    pub fn alerts_snapshot(&self) -> Arc<Vec<Arc<Alert>>> {
        self.inner.store.alerts_snapshot()
    }

    pub fn registration_codes_snapshot(&self) -> Arc<Vec<Arc<RegistrationCode>>> {
        self.inner.store.registration_codes_snapshot()
    }

    /// Alerts from the current snapshot that pass `filter`, newest first.
    pub fn filtered_alerts(&self, filter: &AlertFilter) -> Vec<Arc<Alert>> {
        filter.apply(&self.alerts_snapshot())
    }

    pub fn alert_stats(&self) -> AlertStats {
        AlertStats::compute(&self.alerts_snapshot())
    }

    /// Current code snapshot grouped by derived status as of now.
    pub fn code_partition(&self) -> CodePartition<Arc<RegistrationCode>> {
        CodePartition::compute(&self.registration_codes_snapshot(), Utc::now())
    }

    /// Unused, unexpired codes straight from the backend, latest expiry
    /// first. Not cached.
    pub async fn active_registration_codes(&self) -> Result<Vec<RegistrationCode>, CoreError> {
        self.inner
            .backend
            .list_active_registration_codes(Utc::now())
            .await
    }

    // ── Reactive streams ─────────────────────────────────────────

    /// Follow the alert snapshot as refreshes and writes replace it.
    pub fn alerts(&self) -> EntityStream<Alert> {
        self.inner.store.subscribe_alerts()
    }

    /// Follow the registration code snapshot.
    pub fn registration_codes(&self) -> EntityStream<RegistrationCode> {
        self.inner.store.subscribe_registration_codes()
    }
}

// ── Background tasks ─────────────────────────────────────────────

/// Periodically refresh both collections.
async fn refresh_task(controller: Controller, interval_secs: u64, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                if let Err(e) = controller.full_refresh().await {
                    warn!(error = %e, "periodic refresh failed");
                }
            }
        }
    }
}

/// Run queued commands one at a time and publish each outcome on its
/// envelope's state channel.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let action = envelope.command.action();
                let state = match route_command(&controller, envelope.command).await {
                    Ok(result) => TransitionState::Succeeded(result),
                    Err(e) => {
                        if e.is_precondition_failed() {
                            debug!(action, error = %e, "command rejected");
                        } else {
                            warn!(action, error = %e, "command failed");
                        }
                        TransitionState::Failed(e)
                    }
                };
                envelope.state_tx.send_replace(state);
            }
        }
    }
}

// ── Command routing ──────────────────────────────────────────────

/// Run one command against the backend, apply the result locally, then
/// re-fetch the affected collection. A failed re-fetch only logs; the
/// write itself already succeeded.
async fn route_command(controller: &Controller, cmd: Command) -> Result<CommandResult, CoreError> {
    let inner = &controller.inner;
    let actor = inner.config.actor.as_str();

    match cmd {
        Command::AcknowledgeAlert { id } => {
            let alert = inner.executor.acknowledge(&id, actor, Utc::now()).await?;
            inner.store.apply_alert_update(alert.clone());
            refetch_alerts(controller).await;
            Ok(CommandResult::Alert(alert))
        }
        Command::ResolveAlert { id } => {
            let alert = inner.executor.resolve(&id, actor, Utc::now()).await?;
            inner.store.apply_alert_update(alert.clone());
            refetch_alerts(controller).await;
            Ok(CommandResult::Alert(alert))
        }
        Command::DeleteAlert { id } => {
            inner.executor.delete(&id).await?;
            inner.store.remove_alert(&id);
            refetch_alerts(controller).await;
            Ok(CommandResult::Ok)
        }
        Command::GenerateRegistrationCode(request) => {
            let generated =
                provisioning::generate(inner.backend.as_ref(), &request, Utc::now()).await?;
            refetch_codes(controller).await;
            Ok(CommandResult::GeneratedCode(generated))
        }
        Command::RevokeRegistrationCode { id } => {
            inner.executor.revoke_code(&id, Utc::now()).await?;
            refetch_codes(controller).await;
            Ok(CommandResult::Ok)
        }
    }
}

async fn refetch_alerts(controller: &Controller) {
    if let Err(e) = controller.refresh_alerts().await {
        warn!(error = %e, "alert re-fetch after write failed");
    }
}

async fn refetch_codes(controller: &Controller) {
    if let Err(e) = controller.refresh_registration_codes().await {
        warn!(error = %e, "registration code re-fetch after write failed");
    }
}

// ── Helpers ──────────────────────────────────────────────────────

/// Build a [`TransportConfig`] from the controller configuration.
fn build_transport(config: &ControllerConfig) -> TransportConfig {
    TransportConfig {
        tls: tls_to_transport(&config.tls),
        timeout: config.timeout,
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}
