// ── Domain model ──
//
// Canonical, validated representations of the two lifecycle entities the
// backend owns: alerts and device registration codes. Wire records from
// silowatch-api are converted into these exactly once (see `convert`).

pub mod alert;
pub mod entity_id;
pub mod registration;

// ── Re-exports ──────────────────────────────────────────────────────
// Flat access: `use silowatch_core::model::*` gives you everything.

pub use alert::{Alert, AlertSeverity, AlertStatus, AlertType};
pub use entity_id::EntityId;
pub use registration::{CodeStatus, GeneratedCode, Location, RegistrationCode};
