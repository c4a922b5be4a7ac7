// ── Runtime connection configuration ──
//
// These types describe *how* to reach an Industrial Edge Manager.
// They carry credentials and transport tuning but never touch disk;
// `iem-config` and the CLI build a `ConnectionConfig` and hand it in.

use std::time::Duration;

use iem_api::{IemClient, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// Username/password pair for `POST /login/direct`.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}

/// Configuration for talking to a single IEM.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// IEM root URL (e.g., `https://iem.example.com`).
    pub url: Url,
    pub credentials: Credentials,
    /// Certificate verification. Defaults to accepting self-signed certs.
    pub tls: TlsMode,
    /// Request timeout.
    pub timeout: Duration,
}

impl ConnectionConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            tls: TlsMode::default(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
        }
    }

    /// Build the HTTP client for this connection.
    pub fn client(&self) -> Result<IemClient, CoreError> {
        Ok(IemClient::new(self.url.clone(), &self.transport())?)
    }
}
