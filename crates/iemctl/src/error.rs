//! CLI error types with miette diagnostics.
//!
//! Maps core, API and configuration errors into user-facing errors with
//! actionable help text and a stable exit code.

use miette::Diagnostic;
use thiserror::Error;

use iem_config::ConfigError;
use iem_core::iem_api::{self, Outcome};
use iem_core::{CoreError, DeployError, EntityKind};

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to the IEM at {url}")]
    #[diagnostic(
        code(iem::connection_failed),
        help(
            "Check that the IEM is running and reachable.\n\
             Reason: {reason}"
        )
    )]
    ConnectionFailed {
        url: String,
        reason: String,
        outcome: Box<Outcome>,
    },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(iem::tls_error),
        help("Check the --ca-cert bundle, or drop --strict-tls for self-signed IEMs.")
    )]
    TlsError {
        message: String,
        outcome: Box<Outcome>,
    },

    #[error("Request timed out")]
    #[diagnostic(
        code(iem::timeout),
        help("Increase the timeout with --timeout or check IEM responsiveness.")
    )]
    Timeout { outcome: Box<Outcome> },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed ({status}): {message}")]
    #[diagnostic(
        code(iem::auth_failed),
        help("Verify IE_USER / IE_PASSWORD (or --username / --password).")
    )]
    AuthFailed {
        status: i32,
        message: String,
        outcome: Box<Outcome>,
    },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(iem::not_found),
        help("Run: iemctl {list_command} to see what is available")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────
    #[error("IEM rejected the request ({status}): {message}")]
    #[diagnostic(code(iem::api_error))]
    ApiError {
        status: u16,
        message: String,
        outcome: Box<Outcome>,
    },

    #[error("Malformed response for '{label}' (HTTP {status}): no value at {pointer}")]
    #[diagnostic(
        code(iem::malformed_response),
        help("The IEM answered 200 with an unexpected body; run with -vv to inspect it.")
    )]
    MalformedResponse {
        label: &'static str,
        status: u16,
        pointer: &'static str,
        outcome: Box<Outcome>,
    },

    // ── Deployments ──────────────────────────────────────────────────
    #[error("Deployment to '{device}' failed at stage '{stage}'")]
    #[diagnostic(code(iem::deploy_failed))]
    DeployFailed {
        device: String,
        stage: String,
        #[source]
        cause: Box<CliError>,
    },

    #[error("{failed} of {total} deployments failed")]
    #[diagnostic(
        code(iem::deployment_failed),
        help("See the per-device report above; rerun with --on-failure continue to attempt every device.")
    )]
    DeploymentFailed {
        failed: usize,
        total: usize,
        /// Exit code of the first failure.
        exit: i32,
    },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(iem::validation))]
    Validation { field: String, reason: String },

    #[error("No {field} configured")]
    #[diagnostic(
        code(iem::missing_setting),
        help("Set {env}, pass {flag}, or add it to the config file.")
    )]
    MissingSetting {
        field: &'static str,
        env: &'static str,
        flag: &'static str,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(code(iem::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(iem::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(iem::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::NotFound { .. } | Self::ApiError { status: 404, .. } => exit_code::NOT_FOUND,
            Self::DeployFailed { cause, .. } => cause.exit_code(),
            Self::DeploymentFailed { exit, .. } => *exit,
            Self::Validation { .. }
            | Self::MissingSetting { .. }
            | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Flat result of the failed API call behind this error, if any.
    ///
    /// Deployment failures return `None`: their per-device report already
    /// carries the failure.
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Self::ConnectionFailed { outcome, .. }
            | Self::TlsError { outcome, .. }
            | Self::Timeout { outcome }
            | Self::AuthFailed { outcome, .. }
            | Self::ApiError { outcome, .. }
            | Self::MalformedResponse { outcome, .. } => Some(outcome),
            _ => None,
        }
    }
}

fn list_command(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Application => "apps list",
        EntityKind::Device => "devices list",
        EntityKind::Configuration | EntityKind::ConfigVersion => "configs list --app-id <ID>",
        EntityKind::Category => "categories list",
    }
}

// ── Error mapping ────────────────────────────────────────────────────

impl From<iem_api::Error> for CliError {
    fn from(err: iem_api::Error) -> Self {
        let outcome = Box::new(Outcome::from_error(&err));
        match err {
            iem_api::Error::Transport(e) if e.is_timeout() => Self::Timeout { outcome },
            iem_api::Error::Transport(e) => Self::ConnectionFailed {
                url: e
                    .url()
                    .map_or_else(|| "(unknown)".into(), ToString::to_string),
                reason: e.to_string(),
                outcome,
            },
            iem_api::Error::InvalidUrl(e) => Self::Validation {
                field: "url".into(),
                reason: e.to_string(),
            },
            iem_api::Error::Tls(message) => Self::TlsError { message, outcome },
            iem_api::Error::InvalidToken => Self::AuthFailed {
                status: iem_api::TRANSPORT_STATUS,
                message: "token contains characters not allowed in a header".into(),
                outcome,
            },
            iem_api::Error::Rejected { status, message } if matches!(status, 401 | 403) => {
                Self::AuthFailed {
                    status: i32::from(status),
                    message,
                    outcome,
                }
            }
            iem_api::Error::Rejected { status, message } => Self::ApiError {
                status,
                message,
                outcome,
            },
            iem_api::Error::Malformed {
                label,
                status,
                pointer,
                ..
            } => Self::MalformedResponse {
                label,
                status,
                pointer,
                outcome,
            },
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::NotFound { kind, name } => Self::NotFound {
                resource_type: kind.to_string(),
                identifier: name,
                list_command: list_command(kind).into(),
            },
            CoreError::Api(e) => e.into(),
        }
    }
}

impl From<DeployError> for CliError {
    fn from(err: DeployError) -> Self {
        Self::DeployFailed {
            device: err.device_name,
            stage: err.stage.to_string(),
            cause: Box::new(err.source.into()),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Missing { field, env, flag } => Self::MissingSetting { field, env, flag },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}
