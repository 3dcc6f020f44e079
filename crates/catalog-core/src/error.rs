// ── Core error types ──
//
// User-facing errors from catalog-core. HTTP details are folded into
// three classes (validation, transport, consistency) plus local
// precondition failures. `From<catalog_api::Error>` does the folding.

use thiserror::Error;

use crate::model::EntityRef;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Server-side outcomes ─────────────────────────────────────────
    /// Input rejected, by the server (HTTP 400/422) or locally before
    /// sending. Never retried.
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Network or server failure. Never retried by the core.
    #[error("Transport failure: {message}")]
    Transport {
        message: String,
        status: Option<u16>,
    },

    /// Local state no longer agrees with what an operation expected.
    #[error("Consistency violation: {message}")]
    Consistency { message: String },

    // ── Local preconditions ──────────────────────────────────────────
    #[error("{0} not found")]
    NotFound(EntityRef),

    #[error("No edit session is open")]
    NoActiveSession,

    #[error("Sign in to modify the catalog")]
    NotSignedIn,

    #[error("{0} belongs to another user")]
    NotOwner(EntityRef),

    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    #[error("Controller is not connected")]
    Disconnected,

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    /// HTTP status carried by a transport failure.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => *status,
            _ => None,
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<catalog_api::Error> for CoreError {
    fn from(err: catalog_api::Error) -> Self {
        match err {
            catalog_api::Error::Validation { message, status } => CoreError::Validation {
                message: if message.is_empty() {
                    format!("request rejected with HTTP {status}")
                } else {
                    message
                },
            },
            catalog_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            catalog_api::Error::Tls(message) => CoreError::Config { message },
            catalog_api::Error::InvalidHeader(message) => CoreError::Config { message },
            catalog_api::Error::Deserialization { message, body: _ } => CoreError::Transport {
                message: format!("unexpected response: {message}"),
                status: None,
            },
            other => CoreError::Transport {
                status: other.status(),
                message: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemId;

    #[test]
    fn bad_request_becomes_validation() {
        let err = CoreError::from(catalog_api::Error::Validation {
            status: 400,
            message: "name is required".into(),
        });
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation failed: name is required");
    }

    #[test]
    fn server_error_becomes_transport_with_status() {
        let err = CoreError::from(catalog_api::Error::Server {
            status: 502,
            message: "bad gateway".into(),
        });
        assert!(err.is_transport());
        assert_eq!(err.status(), Some(502));
    }

    #[test]
    fn not_found_keeps_status() {
        let err = CoreError::from(catalog_api::Error::NotFound {
            path: "/api/item/4".into(),
        });
        assert_eq!(err.status(), Some(404));
    }

    #[test]
    fn entity_refs_render_in_messages() {
        assert_eq!(
            CoreError::NotOwner(ItemId(3).into()).to_string(),
            "item 3 belongs to another user"
        );
    }
}
