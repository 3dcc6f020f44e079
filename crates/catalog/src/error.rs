//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` variants into user-facing errors with actionable help text.

use miette::Diagnostic;
use thiserror::Error;

use catalog_config::ConfigError;
use catalog_core::{CoreError, EntityKind, EntityRef};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONFLICT: i32 = 6;
    pub const CONNECTION: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not reach the catalog server: {message}")]
    #[diagnostic(
        code(catalog::connection_failed),
        help(
            "Check that the server is running and the URL is right.\n\
             Try: catalog --server http://localhost:5000 categories list"
        )
    )]
    ConnectionFailed { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("The server rejected the session token")]
    #[diagnostic(
        code(catalog::auth_failed),
        help("Sign in again and store the new token: catalog config set-token")
    )]
    AuthFailed,

    #[error("Not signed in")]
    #[diagnostic(
        code(catalog::not_signed_in),
        help(
            "Editing needs a user id and a session token.\n\
             Run: catalog config set user_id <ID> && catalog config set-token"
        )
    )]
    NotSignedIn,

    #[error("{target} belongs to another user")]
    #[diagnostic(
        code(catalog::permission_denied),
        help("Only the owner can change or delete it.")
    )]
    PermissionDenied { target: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(catalog::not_found),
        help("Run: catalog {list_command} to see what exists")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    #[error("Local state was out of date: {message}")]
    #[diagnostic(
        code(catalog::stale),
        help("The catalog changed on the server. Re-run the command.")
    )]
    Stale { message: String },

    // ── API ──────────────────────────────────────────────────────────
    #[error("Server error ({code}): {message}")]
    #[diagnostic(code(catalog::api_error))]
    ApiError { code: String, message: String },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(catalog::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(catalog::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: catalog config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No catalog server configured")]
    #[diagnostic(
        code(catalog::no_config),
        help(
            "Create a profile with: catalog config init\n\
             Or pass --server. Config expected at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(catalog::config))]
    Config(#[from] ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(catalog::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO ───────────────────────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } => exit_code::CONNECTION,
            Self::AuthFailed | Self::NotSignedIn => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Stale { .. } => exit_code::CONFLICT,
            Self::Validation { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::NoConfig { .. }
            | Self::ProfileNotFound { .. }
            | Self::Config(_) => exit_code::USAGE,
            Self::ApiError { .. } | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

fn list_command(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Category => "categories list",
        EntityKind::Item => "items list",
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { message } => CliError::Validation {
                field: "input".into(),
                reason: message,
            },

            CoreError::InvalidImage { message } => CliError::Validation {
                field: "image".into(),
                reason: message,
            },

            CoreError::Config { message } => CliError::Validation {
                field: "config".into(),
                reason: message,
            },

            CoreError::NoActiveSession => CliError::Validation {
                field: "session".into(),
                reason: "no item is being edited".into(),
            },

            CoreError::Transport {
                status: Some(401 | 403),
                ..
            } => CliError::AuthFailed,

            CoreError::Transport {
                message,
                status: Some(status),
            } => CliError::ApiError {
                code: status.to_string(),
                message,
            },

            CoreError::Transport {
                message,
                status: None,
            } => CliError::ConnectionFailed { message },

            CoreError::Disconnected => CliError::ConnectionFailed {
                message: "not connected".into(),
            },

            CoreError::NotFound(target) => {
                let (resource_type, identifier) = match target {
                    EntityRef::Category(id) => ("category", id.to_string()),
                    EntityRef::Item(id) => ("item", id.to_string()),
                };
                CliError::NotFound {
                    resource_type: resource_type.into(),
                    identifier,
                    list_command: list_command(target.kind()).into(),
                }
            }

            CoreError::NotSignedIn => CliError::NotSignedIn,

            CoreError::NotOwner(target) => CliError::PermissionDenied {
                target: target.to_string(),
            },

            CoreError::Consistency { message } => CliError::Stale { message },
        }
    }
}
