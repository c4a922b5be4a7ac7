// Batch operations: install, uninstall and deploy.
//
// All three are fire-and-forget. The appliance queues a batch and replies
// with its identifier; completion is never polled.

use chrono::{DateTime, Utc};
use reqwest::Method;
use reqwest::multipart::Form;
use serde_json::{Value, json};
use strum::{AsRefStr, Display, EnumString};
use tracing::info;

use crate::auth::BearerToken;
use crate::client::{Api, IemClient};
use crate::response::ApiResult;

/// Operation keyword sent in the `operation` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr, EnumString)]
#[strum(serialize_all = "camelCase")]
pub enum BatchOperation {
    InstallApplication,
    UninstallApplication,
}

impl BatchOperation {
    fn label(self) -> &'static str {
        match self {
            Self::InstallApplication => "Install App Batch ID",
            Self::UninstallApplication => "Uninstall App Batch ID",
        }
    }
}

/// Multipart body naming the single target device.
fn info_map(device_id: &str) -> Form {
    let info = json!({ "devices": [device_id] });
    Form::new().text("infoMap", info.to_string())
}

/// Unix time in microseconds, the unit the `schedule` parameter expects.
pub fn schedule_micros(at: DateTime<Utc>) -> i64 {
    at.timestamp_micros()
}

impl IemClient {
    /// Queue an install or uninstall of `app_id` on one device.
    ///
    /// With `schedule` set, the appliance defers the batch until then.
    pub async fn run_batch(
        &self,
        token: &BearerToken,
        operation: BatchOperation,
        device_id: &str,
        app_id: &str,
        schedule: Option<DateTime<Utc>>,
    ) -> ApiResult<Value> {
        let url = self.url(Api::Portal, &["batches"])?;
        let mut query = vec![
            ("appid", app_id.to_owned()),
            ("operation", operation.to_string()),
        ];
        if let Some(at) = schedule {
            query.push(("schedule", schedule_micros(at).to_string()));
        }

        let builder = self
            .request(Method::POST, url, Some(token))?
            .query(&query)
            .multipart(info_map(device_id));
        let response = self.send(builder).await?.extract(operation.label(), "/data")?;

        info!(%operation, app_id, device_id, "batch queued");
        Ok(response)
    }

    /// Install an application without any configuration.
    pub async fn install_app(
        &self,
        token: &BearerToken,
        device_id: &str,
        app_id: &str,
        schedule: Option<DateTime<Utc>>,
    ) -> ApiResult<Value> {
        self.run_batch(
            token,
            BatchOperation::InstallApplication,
            device_id,
            app_id,
            schedule,
        )
        .await
    }

    /// Uninstall an application from a device.
    pub async fn uninstall_app(
        &self,
        token: &BearerToken,
        device_id: &str,
        app_id: &str,
        schedule: Option<DateTime<Utc>>,
    ) -> ApiResult<Value> {
        self.run_batch(
            token,
            BatchOperation::UninstallApplication,
            device_id,
            app_id,
            schedule,
        )
        .await
    }

    /// Deploy a specific application version to one device.
    ///
    /// The reply's `data` field is returned when present; some IEM
    /// releases answer with an empty body, in which case the payload is a
    /// fixed confirmation string.
    pub async fn deploy_app(
        &self,
        token: &BearerToken,
        app_id: &str,
        version_id: &str,
        device_id: &str,
    ) -> ApiResult<Value> {
        let url = self.url(
            Api::Service,
            &["applications", app_id, "versions", version_id, "batch"],
        )?;
        let builder = self
            .request(Method::POST, url, Some(token))?
            .query(&[
                ("operation", BatchOperation::InstallApplication.as_ref()),
                ("isRetainSecret", "false"),
                ("allow", "true"),
            ])
            .multipart(info_map(device_id));

        let response = self
            .send(builder)
            .await?
            .extract_optional("Deploy Batch", "/data")
            .map(|data| data.unwrap_or_else(|| json!("Application Download was triggered.")));

        info!(app_id, version_id, device_id, "deployment triggered");
        Ok(response)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn operation_keywords_are_camel_case() {
        assert_eq!(BatchOperation::InstallApplication.to_string(), "installApplication");
        assert_eq!(
            BatchOperation::UninstallApplication.as_ref(),
            "uninstallApplication"
        );
        assert_eq!(
            "uninstallApplication".parse::<BatchOperation>().ok(),
            Some(BatchOperation::UninstallApplication)
        );
    }

    #[test]
    fn schedule_is_microseconds() {
        let at = Utc
            .with_ymd_and_hms(2024, 1, 1, 0, 0, 0)
            .single()
            .unwrap();
        assert_eq!(schedule_micros(at), 1_704_067_200_000_000);
    }
}
