// ── Command API ──
//
// Every write goes through the `Command` enum. The controller's command
// processor routes each variant and publishes progress on a per-command
// `watch` channel, so callers can render a pending state and still await
// the outcome.

use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::{Alert, EntityId, GeneratedCode};
use crate::provisioning::ProvisioningRequest;

/// A command sent through the command channel, paired with the sender
/// that reports its progress.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub state_tx: watch::Sender<TransitionState>,
}

/// All write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Alerts ───────────────────────────────────────────────────────
    AcknowledgeAlert { id: EntityId },
    ResolveAlert { id: EntityId },
    DeleteAlert { id: EntityId },

    // ── Registration codes ───────────────────────────────────────────
    GenerateRegistrationCode(ProvisioningRequest),
    RevokeRegistrationCode { id: EntityId },
}

impl Command {
    /// Short verb for logs.
    pub fn action(&self) -> &'static str {
        match self {
            Self::AcknowledgeAlert { .. } => "acknowledge_alert",
            Self::ResolveAlert { .. } => "resolve_alert",
            Self::DeleteAlert { .. } => "delete_alert",
            Self::GenerateRegistrationCode(_) => "generate_registration_code",
            Self::RevokeRegistrationCode { .. } => "revoke_registration_code",
        }
    }
}

/// Result of a command execution.
#[derive(Debug, Clone)]
pub enum CommandResult {
    Ok,
    Alert(Alert),
    GeneratedCode(GeneratedCode),
}

/// Progress of one submitted command.
#[derive(Debug, Clone)]
pub enum TransitionState {
    Pending,
    Succeeded(CommandResult),
    Failed(CoreError),
}

impl TransitionState {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

/// Observer for a submitted command.
///
/// The state starts at [`TransitionState::Pending`] and changes exactly
/// once. If the controller goes away first, [`wait`](Self::wait) yields
/// [`CoreError::ControllerDisconnected`].
#[derive(Debug)]
pub struct TransitionHandle {
    rx: watch::Receiver<TransitionState>,
}

impl TransitionHandle {
    pub(crate) fn new(rx: watch::Receiver<TransitionState>) -> Self {
        Self { rx }
    }

    /// The state right now.
    pub fn state(&self) -> TransitionState {
        self.rx.borrow().clone()
    }

    pub fn is_pending(&self) -> bool {
        self.rx.borrow().is_pending()
    }

    /// Wait for the command to finish.
    pub async fn wait(mut self) -> Result<CommandResult, CoreError> {
        loop {
            match &*self.rx.borrow_and_update() {
                TransitionState::Pending => {}
                TransitionState::Succeeded(result) => return Ok(result.clone()),
                TransitionState::Failed(err) => return Err(err.clone()),
            }
            if self.rx.changed().await.is_err() {
                // Sender dropped; one last look in case it finished first.
                return match &*self.rx.borrow() {
                    TransitionState::Succeeded(result) => Ok(result.clone()),
                    TransitionState::Failed(err) => Err(err.clone()),
                    TransitionState::Pending => Err(CoreError::ControllerDisconnected),
                };
            }
        }
    }
}
