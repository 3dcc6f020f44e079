//! Config subcommand handlers.

use dialoguer::{Input, Select};

use catalog_core::{ImageCleanup, StaleCompletionPolicy};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Profile};
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

fn invalid(field: &str, reason: impl Into<String>) -> CliError {
    CliError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

/// Prompt for a session token and store it in the keyring or, on
/// request, return it for the config file.
fn prompt_token(profile_name: &str) -> Result<Option<String>, CliError> {
    let token = rpassword::prompt_password("Session token (empty to skip): ").map_err(prompt_err)?;
    if token.is_empty() {
        return Ok(None);
    }

    let choices = &["Store in system keyring (recommended)", "Save to config file (plaintext)"];
    let selection = Select::new()
        .with_prompt("Where to store the session token?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    if selection == 0 {
        catalog_config::store_session_token(profile_name, &token)?;
        eprintln!("   ✓ Session token stored in system keyring");
        Ok(None)
    } else {
        Ok(Some(token))
    }
}

/// Render config as TOML. Tokens are already masked by the caller.
fn format_config_redacted(cfg: &Config) -> String {
    let mut lines = vec![
        format!(
            "default_profile = {:?}",
            cfg.default_profile.as_deref().unwrap_or("default")
        ),
        String::new(),
        "[defaults]".into(),
        format!("output = {:?}", cfg.defaults.output),
        format!("timeout = {}", cfg.defaults.timeout),
        format!("recent_items = {}", cfg.defaults.recent_items),
    ];
    for name in cfg.profile_names() {
        let Some(p) = cfg.profile(name) else { continue };
        lines.push(String::new());
        lines.push(format!("[profiles.{name}]"));
        lines.push(format!("server = {:?}", p.server));
        if let Some(user) = p.user_id {
            lines.push(format!("user_id = {user}"));
        }
        if let Some(ref token) = p.session_token {
            lines.push(format!("session_token = {token:?}"));
        }
        if let Some(ref env) = p.session_token_env {
            lines.push(format!("session_token_env = {env:?}"));
        }
        if let Some(policy) = p.stale_completions {
            lines.push(format!("stale_completions = \"{policy}\""));
        }
        if let Some(cleanup) = p.image_cleanup {
            lines.push(format!("image_cleanup = \"{cleanup}\""));
        }
    }
    lines.join("\n")
}

// ── Handler ─────────────────────────────────────────────────────────

pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("catalog configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            let server: String = Input::new()
                .with_prompt("Server URL")
                .default("http://localhost:5000".into())
                .interact_text()
                .map_err(prompt_err)?;
            if server.parse::<url::Url>().is_err() {
                return Err(invalid("server", format!("invalid URL: {server}")));
            }

            let user: String = Input::new()
                .with_prompt("User id (empty for browse-only)")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_err)?;
            let user_id = if user.trim().is_empty() {
                None
            } else {
                Some(
                    user.trim()
                        .parse::<i64>()
                        .map_err(|_| invalid("user_id", "must be a number"))?,
                )
            };

            let session_token = if user_id.is_some() {
                prompt_token(&profile_name)?
            } else {
                None
            };

            let mut cfg = config::load_config_or_default();
            cfg.profiles.insert(
                profile_name.clone(),
                Profile {
                    server,
                    user_id,
                    session_token,
                    ..Profile::default()
                },
            );
            cfg.default_profile = Some(profile_name.clone());
            config::save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Active profile: {profile_name}");
            eprintln!("\n  Test it: catalog categories list");
            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let mut cfg = config::load_config_or_default();
            for profile in cfg.profiles.values_mut() {
                if profile.session_token.is_some() {
                    profile.session_token = Some("********".into());
                }
            }
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);
            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "server" => {
                    if value.parse::<url::Url>().is_err() {
                        return Err(invalid("server", format!("invalid URL: {value}")));
                    }
                    profile.server = value;
                }
                "user_id" | "user-id" => {
                    profile.user_id = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("user_id", "must be a number"))?,
                    );
                }
                "session_token" | "session-token" => profile.session_token = Some(value),
                "session_token_env" | "session-token-env" => {
                    profile.session_token_env = Some(value);
                }
                "insecure" => {
                    profile.insecure = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("insecure", "must be 'true' or 'false'"))?,
                    );
                }
                "timeout" => {
                    profile.timeout = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("timeout", "must be a number (seconds)"))?,
                    );
                }
                "refresh_interval" | "refresh-interval" => {
                    profile.refresh_interval = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("refresh_interval", "must be a number (seconds)"))?,
                    );
                }
                "recent_items" | "recent-items" => {
                    profile.recent_items = Some(
                        value
                            .parse()
                            .map_err(|_| invalid("recent_items", "must be a number"))?,
                    );
                }
                "stale_completions" | "stale-completions" => {
                    profile.stale_completions = Some(
                        value
                            .parse::<StaleCompletionPolicy>()
                            .map_err(|_| invalid("stale_completions", "must be 'apply' or 'suppress'"))?,
                    );
                }
                "image_cleanup" | "image-cleanup" => {
                    profile.image_cleanup = Some(
                        value
                            .parse::<ImageCleanup>()
                            .map_err(|_| invalid("image_cleanup", "must be 'reclaim' or 'retain'"))?,
                    );
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                other => {
                    return Err(invalid(
                        other,
                        format!(
                            "unknown config key '{other}'. Valid keys: server, user_id, \
                             session_token, session_token_env, insecure, timeout, \
                             refresh_interval, recent_items, stale_completions, \
                             image_cleanup, ca_cert"
                        ),
                    ));
                }
            }

            config::save_config(&cfg)?;
            eprintln!("✓ Set {key} on profile '{profile_name}'");
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: catalog config init");
            } else {
                for name in cfg.profile_names() {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();
            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: config::available_profiles(&cfg),
                    name,
                });
            }
            cfg.default_profile = Some(name.clone());
            config::save_config(&cfg)?;
            eprintln!("✓ Default profile set to '{name}'");
            Ok(())
        }

        // ── SetToken ───────────────────────────────────────────────
        ConfigCommand::SetToken { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));
            let token = rpassword::prompt_password(format!("Session token for '{profile_name}': "))
                .map_err(prompt_err)?;
            if token.is_empty() {
                return Err(invalid("session_token", "token cannot be empty"));
            }
            catalog_config::store_session_token(&profile_name, &token)?;
            eprintln!("✓ Session token stored in system keyring for '{profile_name}'");
            Ok(())
        }
    }
}
