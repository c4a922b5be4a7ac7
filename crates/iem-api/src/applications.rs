// Application catalog endpoints

use reqwest::Method;
use serde_json::Value;

use crate::auth::BearerToken;
use crate::client::{Api, IemClient};
use crate::models::Application;
use crate::response::ApiResult;

impl IemClient {
    /// List the applications in the IEM catalog (unpaged).
    pub async fn list_apps(&self, token: &BearerToken) -> ApiResult<Vec<Application>> {
        let url = self.url(Api::Portal, &["applications"])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder).await?.extract("Apps list", "/data")
    }

    /// Look up an application ID by its catalog title.
    pub async fn app_id_by_title(&self, token: &BearerToken, title: &str) -> ApiResult<String> {
        let url = self.url(Api::Service, &["applications", "names", title])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder)
            .await?
            .extract("appId", "/data/applicationId")
    }

    /// ID of the most recent version of a developer application.
    pub async fn newest_app_version_id(
        &self,
        token: &BearerToken,
        app_id: &str,
    ) -> ApiResult<String> {
        let url = self.url(Api::Service, &["dev-apps", app_id])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder)
            .await?
            .extract("NewestAppVersionId", "/data/devappdetail/versions/0/versionId")
    }

    /// Delete a developer application from the IEM.
    pub async fn delete_app(&self, token: &BearerToken, app_id: &str) -> ApiResult<Value> {
        let url = self.url(Api::Service, &["dev-apps", app_id])?;
        let builder = self.request(Method::DELETE, url, Some(token))?;
        self.send(builder).await?.extract("Deleted App", "/data")
    }
}
