// Session authentication
//
// `POST /portal/api/v1/login/direct` exchanges username/password for an
// opaque bearer token. Nothing is stored client-side: callers hold the
// token and pass it into every subsequent call.

use std::fmt;

use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::{Serialize, Serializer};
use serde_json::json;
use tracing::debug;

use crate::client::{Api, IemClient};
use crate::response::ApiResult;

/// Opaque session credential returned by [`IemClient::login_direct`].
///
/// Sent verbatim in the `Authorization` header. Redacted in `Debug`.
#[derive(Clone)]
pub struct BearerToken(SecretString);

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(SecretString::from(token.into()))
    }

    /// The raw token text.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("BearerToken(****)")
    }
}

impl PartialEq for BearerToken {
    fn eq(&self, other: &Self) -> bool {
        self.expose() == other.expose()
    }
}

impl Eq for BearerToken {}

impl From<String> for BearerToken {
    fn from(token: String) -> Self {
        Self::new(token)
    }
}

/// Serializes as the raw token so `iemctl login` can hand it to scripts.
impl Serialize for BearerToken {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.expose())
    }
}

impl IemClient {
    /// Log in with username and password.
    ///
    /// Returns the `data.access_token` field of the reply.
    pub async fn login_direct(
        &self,
        username: &str,
        password: &SecretString,
    ) -> ApiResult<BearerToken> {
        let url = self.url(Api::Portal, &["login", "direct"])?;
        let body = json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let builder = self.request(Method::POST, url, None)?.json(&body);
        let received = self.send(builder).await?;
        let response = received.extract::<String>("bearertoken", "/data/access_token")?;

        debug!("login successful");
        Ok(response.map(BearerToken::from))
    }

    /// End the session behind `token`.
    pub async fn logout(&self, token: &BearerToken) -> ApiResult<String> {
        let url = self.url(Api::Service, &["logout"])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        let received = self.send(builder).await?;
        Ok(received.status("Status", "Logout was successful."))
    }
}
