// ── Runtime controller configuration ──
//
// Describes how to reach a catalog server and how the coordinator
// resolves the undecided corners of its save flow. Never touches disk;
// `catalog-config` builds one of these from profiles.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use url::Url;

use crate::model::OwnerId;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

/// What to do when a save completes after its session was cancelled or
/// superseded.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StaleCompletionPolicy {
    /// Server truth wins: the store is updated, the newer session stays open.
    #[default]
    Apply,
    /// Drop the result locally; the next refresh reconciles.
    Suppress,
}

/// Whether images orphaned by a save are deleted.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ImageCleanup {
    /// Delete a replaced image, and an upload whose item save failed.
    #[default]
    Reclaim,
    /// Leave every uploaded image on the server.
    Retain,
}

/// Configuration for one catalog server.
///
/// Built by the CLI (or any other host) and handed to `Controller`.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Server root (e.g. `http://localhost:5000`).
    pub url: Url,
    /// Sent as the `state` header on every request.
    pub session_token: Option<SecretString>,
    /// The signed-in user, for ownership checks.
    pub user_id: Option<OwnerId>,
    pub tls: TlsVerification,
    pub timeout: Duration,
    /// Full refresh period in seconds. 0 disables the background task.
    pub refresh_interval_secs: u64,
    /// Items shown when no category is selected.
    pub recent_items_limit: usize,
    pub stale_completions: StaleCompletionPolicy,
    pub image_cleanup: ImageCleanup,
}

impl ControllerConfig {
    pub const DEFAULT_RECENT_ITEMS: usize = 10;

    /// Defaults for everything but the server URL.
    pub fn new(url: Url) -> Self {
        Self {
            url,
            session_token: None,
            user_id: None,
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            refresh_interval_secs: 0,
            recent_items_limit: Self::DEFAULT_RECENT_ITEMS,
            stale_completions: StaleCompletionPolicy::default(),
            image_cleanup: ImageCleanup::default(),
        }
    }
}
