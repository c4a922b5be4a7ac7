use thiserror::Error;

/// Status code reported for failures where no HTTP response was obtained.
pub const TRANSPORT_STATUS: i32 = -1;

/// Top-level error type for the `iem-api` crate.
///
/// Three tiers, distinguished by what came back from the wire:
/// nothing at all (transport), a non-200 response (rejection), or a
/// 200 response whose body lacks the field the operation promised
/// (malformed). `iem-core` adds a fourth tier for failed name lookups.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing or construction error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    /// Bearer token contains bytes that cannot be sent in a header.
    #[error("Bearer token is not a valid header value")]
    InvalidToken,

    // ── Remote rejection ────────────────────────────────────────────
    /// Any non-200 response. `message` is the first entry of the
    /// `errors` envelope, or the raw body when the envelope is absent.
    #[error("IEM rejected the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// HTTP 200 whose body is not JSON or lacks the expected field.
    #[error("Malformed {label} response: expected `{pointer}` in body")]
    Malformed {
        label: &'static str,
        status: u16,
        pointer: &'static str,
        body: String,
    },
}

impl Error {
    /// Status code in the flat outcome model.
    ///
    /// The HTTP status for a rejection, `-1` for everything else. A
    /// malformed 200 reply yielded no usable response, so it reports
    /// `-1` as well; `success` is true iff this is 200.
    pub fn status_code(&self) -> i32 {
        match self {
            Self::Rejected { status, .. } => i32::from(*status),
            _ => TRANSPORT_STATUS,
        }
    }

    /// HTTP status the appliance actually sent, if any.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Malformed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Semantic label used in the flat outcome model.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) | Self::InvalidToken => "error",
            Self::Rejected { .. } => "Error Message",
            Self::Malformed { .. } => "Malformed Response",
        }
    }

    /// Human-readable payload for the flat outcome model.
    pub fn message(&self) -> String {
        match self {
            Self::Rejected { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// Returns `true` if no response was obtained at all.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::InvalidUrl(_) | Self::Tls(_) | Self::InvalidToken
        )
    }

    /// Returns `true` if the request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }

    /// Returns `true` if the appliance rejected the credentials or token.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Rejected { status: 401 | 403, .. })
    }

    /// Returns `true` if this is an HTTP 404 rejection.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Rejected { status: 404, .. })
    }
}
