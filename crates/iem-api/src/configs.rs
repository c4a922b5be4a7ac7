// Application configuration endpoints

use reqwest::Method;
use reqwest::multipart::{Form, Part};
use serde_json::json;

use crate::auth::BearerToken;
use crate::client::{Api, IemClient};
use crate::error::Error;
use crate::models::{AppConfiguration, ConfigFile, NewConfiguration};
use crate::response::ApiResult;

impl IemClient {
    /// All configuration slots of an application, with their versions.
    pub async fn list_app_configurations(
        &self,
        token: &BearerToken,
        app_id: &str,
    ) -> ApiResult<Vec<AppConfiguration>> {
        let url = self.url(Api::Service, &["applications", app_id, "configs"])?;
        let builder = self.request(Method::GET, url, Some(token))?;
        self.send(builder)
            .await?
            .extract("fullConfigDetails", "/data")
    }

    /// Declare a new versioned, unsecured configuration slot.
    ///
    /// Returns the new `appConfigId`.
    pub async fn add_versioned_configuration(
        &self,
        token: &BearerToken,
        app_id: &str,
        config: &NewConfiguration,
    ) -> ApiResult<String> {
        let url = self.url(Api::Service, &["applications", app_id, "configs"])?;
        let body = json!({
            "displayName": config.display_name,
            "description": config.description,
            "volPath": config.vol_path,
            "relativePath": config.relative_path,
            "secured": "false",
            "versioned": "true",
        });
        let builder = self.request(Method::POST, url, Some(token))?.json(&body);
        self.send(builder)
            .await?
            .extract("configId", "/data/appConfigId")
    }

    /// Upload a JSON document as a new version of a configuration slot.
    pub async fn upload_configuration_file(
        &self,
        token: &BearerToken,
        app_id: &str,
        config_id: &str,
        file: &ConfigFile,
    ) -> ApiResult<String> {
        let url = self.url(
            Api::Service,
            &["applications", app_id, "configs", config_id, "versions"],
        )?;
        let version = json!({
            "refName": file.reference_name,
            "description": file.description,
        });
        let part = Part::text(file.content.clone())
            .file_name(file.filename.clone())
            .mime_str("application/json")
            .map_err(Error::Transport)?;
        let form = Form::new()
            .text("configversion", version.to_string())
            .text("filename", file.filename.clone())
            .part("file", part);

        let builder = self.request(Method::POST, url, Some(token))?.multipart(form);
        Ok(self
            .send(builder)
            .await?
            .status("Status", "Upload was successful."))
    }
}
