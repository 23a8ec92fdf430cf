// ── Runtime connection configuration ──
//
// These types describe *how* to reach the farm backend.
// They carry credential data and connection tuning, but never touch disk.
// The CLI constructs a `ControllerConfig` and hands it in.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use url::Url;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict). Default for hosted backends.
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development backends).
    DangerAcceptInvalid,
}

/// Configuration for talking to one backend.
///
/// Built by the CLI, passed to `Controller` -- core never reads config files.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Backend base URL (e.g., `https://api.silowatch.example`).
    pub url: Url,
    /// API key sent as a bearer token.
    pub api_key: SecretString,
    /// Name recorded as `acknowledgedBy` / `resolvedBy` on transitions.
    pub actor: String,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout.
    pub timeout: Duration,
    /// How often to perform a full refresh (seconds). 0 = never.
    pub refresh_interval_secs: u64,
}

impl ControllerConfig {
    pub fn new(url: Url, api_key: SecretString, actor: impl Into<String>) -> Self {
        Self {
            url,
            api_key,
            actor: actor.into(),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 60,
        }
    }
}
