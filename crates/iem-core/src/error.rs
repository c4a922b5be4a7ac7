// ── Core error types ──
//
// Adds the resolution tier on top of the transport/rejection/malformed
// tiers from `iem_api::Error`, which are carried through unchanged so the
// caller still sees the HTTP status (or -1) of the call that failed.

use strum::Display;
use thiserror::Error;

/// What kind of record a name lookup was searching for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum EntityKind {
    Application,
    Device,
    Configuration,
    #[strum(to_string = "configuration version")]
    ConfigVersion,
    Category,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Resolution errors ────────────────────────────────────────────
    /// No record in the listing carried exactly this name.
    #[error("{kind} '{name}' not found")]
    NotFound { kind: EntityKind, name: String },

    // ── API errors (transport, rejection, malformed) ─────────────────
    #[error(transparent)]
    Api(#[from] iem_api::Error),
}

impl CoreError {
    pub(crate) fn not_found(kind: EntityKind, name: &str) -> Self {
        Self::NotFound {
            kind,
            name: name.to_owned(),
        }
    }

    /// Returns `true` for a failed name lookup.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// The underlying API error, if the failure came from a remote call.
    pub fn api_error(&self) -> Option<&iem_api::Error> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}
