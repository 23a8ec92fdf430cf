// silowatch-core: Lifecycle and aggregation layer between silowatch-api and consumers (CLI).

pub mod backend;
pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod provisioning;
pub mod stats;
pub mod status;
pub mod store;
pub mod stream;
pub mod transition;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use backend::{Backend, BoxFuture};
pub use command::{Command, CommandResult, TransitionHandle, TransitionState};
pub use config::{ControllerConfig, TlsVerification};
pub use controller::{ConnectionState, Controller};
pub use error::CoreError;
pub use provisioning::{ProvisioningRequest, REGISTRATION_CODE_TTL};
pub use stats::{AlertStats, CodePartition, CodeSummary};
pub use store::DataStore;
pub use stream::{AlertFilter, EntityStream, StatusTab};
pub use transition::{AlertAction, TransitionExecutor};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    Alert, AlertSeverity, AlertStatus, AlertType, CodeStatus, EntityId, GeneratedCode, Location,
    RegistrationCode,
};
