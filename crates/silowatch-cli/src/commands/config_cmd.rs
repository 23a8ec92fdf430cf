//! Config subcommand handlers.

use dialoguer::{Input, Password, Select};
use serde::Serialize;

use silowatch_config::{self as cfg, Config, Profile};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{active_profile_name, available_profiles};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Redacted view of a profile for `config show`.
#[derive(Debug, Serialize)]
struct ProfileView {
    name: String,
    backend: String,
    api_key: String,
    actor: Option<String>,
    ca_cert: Option<String>,
    insecure: bool,
    timeout: u64,
}

impl ProfileView {
    fn new(name: &str, profile: &Profile, config: &Config) -> Self {
        let api_key = match (&profile.api_key_env, &profile.api_key) {
            (Some(var), _) => format!("${var}"),
            (None, Some(_)) => "******** (config file)".into(),
            (None, None) => "(keyring)".into(),
        };
        Self {
            name: name.to_owned(),
            backend: profile.backend.clone(),
            api_key,
            actor: profile.actor.clone(),
            ca_cert: profile.ca_cert.as_ref().map(|p| p.display().to_string()),
            insecure: profile.insecure.unwrap_or(config.defaults.insecure),
            timeout: profile.timeout.unwrap_or(config.defaults.timeout),
        }
    }

    fn detail(&self) -> String {
        [
            format!("Profile:   {}", self.name),
            format!("Backend:   {}", self.backend),
            format!("API key:   {}", self.api_key),
            format!("Actor:     {}", self.actor.as_deref().unwrap_or("($USER)")),
            format!("CA cert:   {}", self.ca_cert.as_deref().unwrap_or("-")),
            format!("Insecure:  {}", self.insecure),
            format!("Timeout:   {}s", self.timeout),
        ]
        .join("\n")
    }
}

fn require_profile<'a>(config: &'a Config, name: &str) -> Result<&'a Profile, CliError> {
    config
        .profiles
        .get(name)
        .ok_or_else(|| CliError::ProfileNotFound {
            name: name.to_owned(),
            available: available_profiles(config),
        })
}

fn non_empty(field: &str, value: &str) -> Result<String, CliError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(CliError::Validation {
            field: field.into(),
            reason: "value cannot be empty".into(),
        });
    }
    Ok(trimmed.to_owned())
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        ConfigCommand::Init => init(),

        ConfigCommand::Path => {
            println!("{}", cfg::config_path().display());
            Ok(())
        }

        ConfigCommand::Show => {
            let config = cfg::load_config()?;
            let name = active_profile_name(global, &config);
            let view = ProfileView::new(&name, require_profile(&config, &name)?, &config);
            let out =
                output::render_single(&global.output, &view, ProfileView::detail, |v| {
                    v.name.clone()
                });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ConfigCommand::Profiles => {
            let config = cfg::load_config_or_default();
            if config.profiles.is_empty() {
                eprintln!("No profiles configured. Run: silowatch config init");
                return Ok(());
            }
            let default = config.active_profile_name();
            let mut names: Vec<&String> = config.profiles.keys().collect();
            names.sort_unstable();
            for name in names {
                let marker = if name == default { " *" } else { "" };
                println!("{name}{marker}");
            }
            Ok(())
        }

        ConfigCommand::Use { name } => {
            let mut config = cfg::load_config_or_default();
            require_profile(&config, &name)?;
            config.default_profile = Some(name.clone());
            cfg::save_config(&config)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        ConfigCommand::SetKey { profile } => {
            let config = cfg::load_config_or_default();
            let name = profile.unwrap_or_else(|| active_profile_name(global, &config));
            require_profile(&config, &name)?;

            let key = Password::new()
                .with_prompt("API key")
                .interact()
                .map_err(prompt_err)?;
            cfg::store_api_key(&name, &non_empty("api_key", &key)?)?;

            eprintln!("✓ API key stored in system keyring for profile '{name}'");
            Ok(())
        }
    }
}

// ── Init wizard ─────────────────────────────────────────────────────

fn init() -> Result<(), CliError> {
    let config_path = cfg::config_path();
    eprintln!("silowatch configuration wizard");
    eprintln!("   Config path: {}\n", config_path.display());

    let mut config = cfg::load_config_or_default();

    let profile_name: String = Input::new()
        .with_prompt("Profile name")
        .default("default".into())
        .interact_text()
        .map_err(prompt_err)?;

    let backend: String = Input::new()
        .with_prompt("Backend URL")
        .default("https://api.silowatch.example".into())
        .interact_text()
        .map_err(prompt_err)?;
    cfg::parse_backend_url(&backend)?;

    let key = Password::new()
        .with_prompt("API key")
        .interact()
        .map_err(prompt_err)?;
    let key = non_empty("api_key", &key)?;

    let store_choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
    ];
    let store_selection = Select::new()
        .with_prompt("Where to store the API key?")
        .items(store_choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    let api_key = if store_selection == 0 {
        cfg::store_api_key(&profile_name, &key)?;
        eprintln!("   ✓ API key stored in system keyring");
        None
    } else {
        Some(key)
    };

    let actor: String = Input::new()
        .with_prompt("Name recorded on acknowledge/resolve (blank for $USER)")
        .allow_empty(true)
        .interact_text()
        .map_err(prompt_err)?;
    let actor = Some(actor.trim().to_owned()).filter(|a| !a.is_empty());

    config.profiles.insert(
        profile_name.clone(),
        Profile {
            backend,
            api_key,
            actor,
            ..Profile::default()
        },
    );
    config.default_profile = Some(profile_name.clone());
    cfg::save_config(&config)?;

    eprintln!("\n✓ Configuration written to {}", config_path.display());
    eprintln!("  Active profile: {profile_name}");
    eprintln!("\n  Test it: silowatch alerts stats");
    Ok(())
}
