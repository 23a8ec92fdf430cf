//! Global flag overrides on top of `silowatch-config` profiles.
//!
//! This is the single boundary where CLI options cross into
//! `silowatch_core::ControllerConfig`.

use std::time::Duration;

use secrecy::SecretString;

use silowatch_config::{self as cfg, Config, Profile};
use silowatch_core::ControllerConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .unwrap_or_else(|| config.active_profile_name().to_owned())
}

/// Build a `ControllerConfig` from the config file, profile and flags.
///
/// Flags win over the profile. Without a matching profile, `--backend`
/// and `--api-key` alone are enough.
pub fn build_controller_config(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let config = cfg::load_config_or_default();
    let profile_name = active_profile_name(global, &config);

    match config.profiles.get(&profile_name) {
        Some(profile) => resolve_profile(profile, &profile_name, &config, global),
        None if global.profile.is_some() => Err(CliError::ProfileNotFound {
            name: profile_name,
            available: available_profiles(&config),
        }),
        None => from_flags(&profile_name, &config, global),
    }
}

/// Translate a profile plus global flags into a `ControllerConfig`.
pub fn resolve_profile(
    profile: &Profile,
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    // 1. Backend URL (flag > env > profile)
    let url = cfg::parse_backend_url(global.backend.as_deref().unwrap_or(&profile.backend))?;

    // 2. API key (flag > profile chain)
    let api_key = match global.api_key {
        Some(ref key) => SecretString::from(key.clone()),
        None => cfg::resolve_api_key(profile, profile_name)?,
    };

    // 3. Actor (flag > profile > $USER)
    let actor = match global.actor {
        Some(ref actor) => actor.clone(),
        None => cfg::resolve_actor(profile, profile_name)?,
    };

    let mut controller = ControllerConfig::new(url, api_key, actor);
    controller.tls = cfg::tls_for(
        global.insecure || profile.insecure.unwrap_or(config.defaults.insecure),
        profile.ca_cert.as_deref(),
    );
    controller.timeout = Duration::from_secs(
        global
            .timeout
            .or(profile.timeout)
            .unwrap_or(config.defaults.timeout),
    );
    if let Some(secs) = profile.refresh_interval {
        controller.refresh_interval_secs = secs;
    }
    Ok(controller)
}

fn from_flags(
    profile_name: &str,
    config: &Config,
    global: &GlobalOpts,
) -> Result<ControllerConfig, CliError> {
    let backend = global.backend.as_deref().ok_or_else(|| CliError::NoConfig {
        path: cfg::config_path().display().to_string(),
    })?;
    let url = cfg::parse_backend_url(backend)?;

    let api_key = global
        .api_key
        .clone()
        .map(SecretString::from)
        .ok_or_else(|| CliError::NoCredentials {
            profile: profile_name.into(),
        })?;

    let actor = match global.actor {
        Some(ref actor) => actor.clone(),
        None => cfg::resolve_actor(&Profile::default(), profile_name)?,
    };

    let mut controller = ControllerConfig::new(url, api_key, actor);
    controller.tls = cfg::tls_for(global.insecure || config.defaults.insecure, None);
    controller.timeout = Duration::from_secs(global.timeout.unwrap_or(config.defaults.timeout));
    Ok(controller)
}

pub fn available_profiles(config: &Config) -> String {
    let mut names: Vec<&str> = config.profiles.keys().map(String::as_str).collect();
    if names.is_empty() {
        return "(none)".into();
    }
    names.sort_unstable();
    names.join(", ")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::cli::{ColorMode, OutputFormat};
    use secrecy::ExposeSecret;
    use silowatch_core::TlsVerification;

    fn global() -> GlobalOpts {
        GlobalOpts {
            profile: None,
            backend: None,
            api_key: Some("flag-key".into()),
            actor: None,
            output: OutputFormat::Table,
            color: ColorMode::Auto,
            verbose: 0,
            quiet: false,
            yes: false,
            insecure: false,
            timeout: None,
        }
    }

    fn profile() -> Profile {
        Profile {
            backend: "https://api.farm.example".into(),
            actor: Some("Jane Doe".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn profile_falls_back_to_file_defaults() {
        let mut config = Config::default();
        config.defaults.insecure = true;
        config.defaults.timeout = 7;

        let cc = resolve_profile(&profile(), "home", &config, &global()).unwrap();
        assert_eq!(cc.url.as_str(), "https://api.farm.example/");
        assert_eq!(cc.api_key.expose_secret(), "flag-key");
        assert_eq!(cc.actor, "Jane Doe");
        assert_eq!(cc.tls, TlsVerification::DangerAcceptInvalid);
        assert_eq!(cc.timeout, Duration::from_secs(7));
    }

    #[test]
    fn profile_and_flags_override_defaults() {
        let mut config = Config::default();
        config.defaults.insecure = true;
        config.defaults.timeout = 7;
        let mut p = profile();
        p.insecure = Some(false);
        p.timeout = Some(12);
        p.refresh_interval = Some(15);

        let cc = resolve_profile(&p, "home", &config, &global()).unwrap();
        assert_eq!(cc.tls, TlsVerification::SystemDefaults);
        assert_eq!(cc.timeout, Duration::from_secs(12));
        assert_eq!(cc.refresh_interval_secs, 15);

        let mut flags = global();
        flags.timeout = Some(3);
        flags.backend = Some("http://localhost:8080".into());
        let cc = resolve_profile(&p, "home", &config, &flags).unwrap();
        assert_eq!(cc.timeout, Duration::from_secs(3));
        assert_eq!(cc.url.as_str(), "http://localhost:8080/");
    }
}
