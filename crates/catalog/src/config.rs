//! CLI configuration: a thin layer over `catalog_config` that applies
//! `GlobalOpts` flag overrides (--server, --user, --session-token, ...).

use std::time::Duration;

use secrecy::SecretString;

use catalog_core::{ControllerConfig, TlsVerification};

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use catalog_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Build the `ControllerConfig` for this invocation.
///
/// Flags override the active profile; with no profile, `--server` alone
/// is enough for browse-only use.
pub fn resolve(global: &GlobalOpts, cfg: &Config) -> Result<ControllerConfig, CliError> {
    let profile_name = active_profile_name(global, cfg);

    let mut config = match cfg.profile(&profile_name) {
        Some(profile) if global.server.is_none() => {
            catalog_config::profile_to_controller_config(profile, &profile_name, &cfg.defaults)?
        }
        Some(profile) => {
            // Keep the profile's policies but point at another server.
            let mut config = from_server_flag(global)?;
            let from_profile =
                catalog_config::profile_to_controller_config(profile, &profile_name, &cfg.defaults)?;
            config.session_token = from_profile.session_token;
            config.user_id = from_profile.user_id;
            config.recent_items_limit = from_profile.recent_items_limit;
            config.stale_completions = from_profile.stale_completions;
            config.image_cleanup = from_profile.image_cleanup;
            config.timeout = from_profile.timeout;
            config
        }
        None if global.profile.is_some() => {
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: available_profiles(cfg),
            });
        }
        None => {
            let mut config = from_server_flag(global)?;
            config.timeout = Duration::from_secs(cfg.defaults.timeout);
            config.recent_items_limit = cfg.defaults.recent_items;
            config
        }
    };

    if let Some(user) = global.user {
        config.user_id = Some(user);
    }
    if let Some(ref token) = global.session_token {
        config.session_token = Some(SecretString::from(token.clone()));
    }
    if global.insecure {
        config.tls = TlsVerification::DangerAcceptInvalid;
    }
    if let Some(secs) = global.timeout {
        config.timeout = Duration::from_secs(secs);
    }
    // One-shot invocations never run the background refresh.
    config.refresh_interval_secs = 0;

    Ok(config)
}

fn from_server_flag(global: &GlobalOpts) -> Result<ControllerConfig, CliError> {
    let url_str = global.server.as_deref().ok_or_else(|| CliError::NoConfig {
        path: config_path().display().to_string(),
    })?;
    let url: url::Url = url_str.parse().map_err(|_| CliError::Validation {
        field: "server".into(),
        reason: format!("invalid URL: {url_str}"),
    })?;
    Ok(ControllerConfig::new(url))
}

/// Comma-separated profile names for help text.
pub fn available_profiles(cfg: &Config) -> String {
    let names = cfg.profile_names();
    if names.is_empty() {
        "(none)".into()
    } else {
        names.join(", ")
    }
}
