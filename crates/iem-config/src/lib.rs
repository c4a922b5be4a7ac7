//! Configuration for `iemctl`.
//!
//! Layered with figment, lowest priority first: built-in defaults, the
//! TOML config file, the `IE_*` / `IED_NAME` / `APP_ID` environment
//! variables, then command-line overrides. The result translates to an
//! `iem_core::ConnectionConfig`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Format, Serialized, Toml},
};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::debug;

use iem_core::iem_api::TlsMode;
use iem_core::{ConnectionConfig, Credentials};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no {field} configured (set {env} or pass {flag})")]
    Missing {
        field: &'static str,
        env: &'static str,
        flag: &'static str,
    },

    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Effective configuration after all layers are merged.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    /// IEM root URL, e.g. `https://iem.example.com`.
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub username: Option<String>,
    /// Plaintext in the file; wrapped in a `SecretString` once loaded.
    #[serde(default, deserialize_with = "lenient_string")]
    pub password: Option<String>,
    /// Default target device for single-device commands.
    #[serde(default, deserialize_with = "lenient_string")]
    pub device: Option<String>,
    /// Default application ID for deployments.
    #[serde(default, deserialize_with = "lenient_string")]
    pub app_id: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Verify certificates against the system roots.
    #[serde(default)]
    pub strict_tls: bool,

    /// PEM bundle to trust; implies strict verification.
    pub ca_cert: Option<PathBuf>,

    /// `abort` or `continue`.
    #[serde(default = "default_on_failure")]
    pub on_failure: String,

    #[serde(default = "default_output")]
    pub output: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: None,
            username: None,
            password: None,
            device: None,
            app_id: None,
            timeout: default_timeout(),
            strict_tls: false,
            ca_cert: None,
            on_failure: default_on_failure(),
            output: default_output(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}
fn default_on_failure() -> String {
    "abort".into()
}
fn default_output() -> String {
    "table".into()
}

/// TOML scalars are typed, so `password = 1234` arrives as a number.
/// Accept any scalar and keep its text.
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Signed(i64),
        Unsigned(u64),
        Float(f64),
        Flag(bool),
    }

    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|scalar| match scalar {
        Scalar::Text(s) => s,
        Scalar::Signed(n) => n.to_string(),
        Scalar::Unsigned(n) => n.to_string(),
        Scalar::Float(n) => n.to_string(),
        Scalar::Flag(b) => b.to_string(),
    }))
}

const REDACTED: &str = "********";

impl Settings {
    /// Copy with the password masked, for display.
    #[must_use]
    pub fn redacted(&self) -> Self {
        Self {
            password: self.password.as_ref().map(|_| REDACTED.to_owned()),
            ..self.clone()
        }
    }

    /// Render as TOML with the password masked.
    pub fn to_redacted_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(&self.redacted())?)
    }

    pub fn tls_mode(&self) -> TlsMode {
        if let Some(ref ca) = self.ca_cert {
            TlsMode::CustomCa(ca.clone())
        } else if self.strict_tls {
            TlsMode::System
        } else {
            TlsMode::DangerAcceptInvalid
        }
    }

    /// Build the core connection config; URL and both credentials are
    /// required.
    pub fn connection(&self) -> Result<ConnectionConfig, ConfigError> {
        let raw_url = self.url.as_deref().ok_or(ConfigError::Missing {
            field: "IEM URL",
            env: "IE_URL",
            flag: "--ie-url",
        })?;
        let url: url::Url = raw_url.parse().map_err(|e| ConfigError::Validation {
            field: "url".into(),
            reason: format!("{raw_url}: {e}"),
        })?;
        let username = self.username.clone().ok_or(ConfigError::Missing {
            field: "username",
            env: "IE_USER",
            flag: "--username",
        })?;
        let password = self.password.clone().ok_or(ConfigError::Missing {
            field: "password",
            env: "IE_PASSWORD",
            flag: "--password",
        })?;

        let mut config = ConnectionConfig::new(url, Credentials::new(username, password));
        config.tls = self.tls_mode();
        config.timeout = Duration::from_secs(self.timeout);
        Ok(config)
    }
}

/// Values supplied on the command line. Unset fields leave lower layers
/// untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strict_tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_failure: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "iem-tools", "iemctl").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("iemctl");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Historical environment variable names and the settings keys they set.
const ENV_MAPPING: [(&str, &str); 5] = [
    ("IE_URL", "url"),
    ("IE_USER", "username"),
    ("IE_PASSWORD", "password"),
    ("IED_NAME", "device"),
    ("APP_ID", "app_id"),
];

fn env_key(name: &str) -> Option<&'static str> {
    ENV_MAPPING
        .iter()
        .find(|(env, _)| *env == name)
        .map(|(_, key)| *key)
}

/// The legacy environment variables that are set, keyed by setting.
///
/// Values are kept verbatim: device names like `007` and passwords like
/// `0042` must not pass through figment's type inference.
fn env_layer() -> BTreeMap<&'static str, String> {
    ENV_MAPPING
        .iter()
        .filter_map(|(env, key)| std::env::var(env).ok().map(|value| (*key, value)))
        .collect()
}

/// Defaults, file and environment layers, without CLI overrides.
pub fn figment(path: &Path) -> Figment {
    Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(path))
        .merge(Serialized::defaults(env_layer()))
}

/// Load settings from `path` (or the default location) with `overrides`
/// applied last. A missing file is not an error.
pub fn load_settings(path: Option<&Path>, overrides: &Overrides) -> Result<Settings, ConfigError> {
    let path = path.map_or_else(config_path, Path::to_path_buf);
    debug!(path = %path.display(), "loading configuration");
    let settings = figment(&path)
        .merge(Serialized::globals(overrides))
        .extract()?;
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_mapping_covers_legacy_names() {
        assert_eq!(env_key("IE_URL"), Some("url"));
        assert_eq!(env_key("IED_NAME"), Some("device"));
        assert_eq!(env_key("ied_name"), None);
        assert_eq!(env_key("HOME"), None);
    }

    #[test]
    fn redaction_masks_only_password() {
        let settings = Settings {
            username: Some("admin".into()),
            password: Some("hunter2".into()),
            ..Settings::default()
        };
        let shown = settings.redacted();
        assert_eq!(shown.password.as_deref(), Some(REDACTED));
        assert_eq!(shown.username.as_deref(), Some("admin"));
        assert_eq!(Settings::default().redacted().password, None);
    }

    #[test]
    fn tls_mode_prefers_custom_ca() {
        let settings = Settings {
            strict_tls: true,
            ca_cert: Some(PathBuf::from("/etc/iem/ca.pem")),
            ..Settings::default()
        };
        assert_eq!(settings.tls_mode(), TlsMode::CustomCa("/etc/iem/ca.pem".into()));
        assert_eq!(Settings::default().tls_mode(), TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn connection_requires_url() {
        let err = Settings::default().connection().err();
        assert!(matches!(err, Some(ConfigError::Missing { env: "IE_URL", .. })));
    }
}
