// Edge device endpoints

use reqwest::Method;
use serde_json::Value;

use crate::auth::BearerToken;
use crate::client::{Api, IemClient};
use crate::models::{Device, EdgeDevice, InstalledApp};
use crate::response::ApiResult;

/// Page size used by [`IemClient::list_all_devices`].
pub const ALL_DEVICES_PAGE_SIZE: u32 = 100;

impl IemClient {
    /// List edge devices visible to the current user.
    ///
    /// `size` and `page` are only sent when given; the appliance defaults
    /// to 10 devices on page 1.
    pub async fn list_devices(
        &self,
        token: &BearerToken,
        size: Option<u32>,
        page: Option<u32>,
    ) -> ApiResult<Vec<Device>> {
        let url = self.url(Api::Portal, &["devices"])?;
        let mut query = Vec::with_capacity(2);
        if let Some(size) = size {
            query.push(("size", size.to_string()));
        }
        if let Some(page) = page {
            query.push(("page", page.to_string()));
        }

        let builder = self.request(Method::GET, url, Some(token))?.query(&query);
        self.send(builder).await?.extract("Devices list", "/data")
    }

    /// First page of 100 devices -- what name resolution scans.
    pub async fn list_all_devices(&self, token: &BearerToken) -> ApiResult<Vec<Device>> {
        self.list_devices(token, Some(ALL_DEVICES_PAGE_SIZE), Some(1))
            .await
    }

    /// Service-API device listing, which includes activation state.
    pub async fn list_edge_devices(&self, token: &BearerToken) -> ApiResult<Vec<EdgeDevice>> {
        let url = self.url(Api::Service, &["devices"])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder).await?.extract("Edge devices", "/data")
    }

    /// Applications installed on one device.
    pub async fn list_installed_apps(
        &self,
        token: &BearerToken,
        device_id: &str,
    ) -> ApiResult<Vec<InstalledApp>> {
        let url = self.url(Api::Portal, &["devices", "installed-apps"])?;
        let builder = self
            .request(Method::GET, url, Some(token))?
            .query(&[("deviceid", device_id)]);
        self.send(builder).await?.extract("Installed Apps", "/data")
    }

    /// Resolve a device ID through the discovery endpoint.
    pub async fn device_id_by_name(&self, token: &BearerToken, name: &str) -> ApiResult<String> {
        let url = self.url(Api::Service, &["devices", name, "discovery"])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder)
            .await?
            .extract("devicebyname", "/discoveryDetails/deviceId")
    }

    /// Register a new device. The reply body is the onboarding file,
    /// returned as raw text.
    pub async fn create_device(&self, token: &BearerToken, device: &Value) -> ApiResult<String> {
        let url = self.url(Api::Service, &["devices", "create"])?;
        let builder = self.request(Method::POST, url, Some(token))?.json(device);
        Ok(self.send(builder).await?.text("onboardingFile"))
    }
}
