// ── Dependent-action workflows ──
//
// login → resolve names → invoke one batch action. Each workflow logs in
// itself and returns once the action call answers; batches are never
// polled for completion.

use chrono::{DateTime, Utc};
use iem_api::{BearerToken, IemClient, Response};
use serde::Serialize;
use serde_json::Value;
use strum::Display;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::Credentials;
use crate::error::CoreError;
use crate::resolve;

/// Where a single-device deployment currently is.
///
/// `LoggedOut → LoggingIn → Authenticated → ResolvingDevice → Deploying →
/// Done`, or `Failed` from any step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "title_case")]
pub enum Stage {
    LoggedOut,
    LoggingIn,
    Authenticated,
    ResolvingDevice,
    Deploying,
    Done,
    Failed,
}

/// A deployment that reached `Done`.
#[derive(Debug, Clone, Serialize)]
pub struct Deployment {
    pub device_name: String,
    pub device_id: String,
    pub app_id: String,
    pub version_id: String,
    /// Opaque reply of the batch endpoint.
    pub batch: Value,
    pub history: Vec<Stage>,
}

/// A deployment that ended in `Failed`.
#[derive(Debug, Error)]
#[error("deployment to '{device_name}' failed while {}: {source}", stage_verb(*.stage))]
pub struct DeployError {
    pub device_name: String,
    /// The stage that was active when the failure happened.
    pub stage: Stage,
    pub history: Vec<Stage>,
    #[source]
    pub source: CoreError,
}

fn stage_verb(stage: Stage) -> &'static str {
    match stage {
        Stage::LoggedOut | Stage::LoggingIn => "logging in",
        Stage::Authenticated => "looking up the application",
        Stage::ResolvingDevice => "resolving the device",
        Stage::Deploying => "deploying",
        Stage::Done | Stage::Failed => "finishing",
    }
}

/// Records stage transitions for one device.
struct Tracker {
    device_name: String,
    history: Vec<Stage>,
}

impl Tracker {
    fn start(device_name: &str) -> Self {
        Self {
            device_name: device_name.to_owned(),
            history: vec![Stage::LoggedOut],
        }
    }

    fn current(&self) -> Stage {
        self.history.last().copied().unwrap_or(Stage::LoggedOut)
    }

    fn advance(&mut self, stage: Stage) {
        info!(device = %self.device_name, %stage, "deployment stage");
        self.history.push(stage);
    }

    fn fail(&mut self, source: impl Into<CoreError>) -> DeployError {
        let source = source.into();
        let stage = self.current();
        warn!(device = %self.device_name, %stage, error = %source, "deployment failed");
        self.history.push(Stage::Failed);
        DeployError {
            device_name: self.device_name.clone(),
            stage,
            history: std::mem::take(&mut self.history),
            source,
        }
    }
}

/// How an install/uninstall names its application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppRef {
    Id(String),
    /// Catalog title, resolved by scanning the application list.
    Title(String),
}

/// Orchestrates multi-step operations against one IEM.
#[derive(Debug, Clone, Copy)]
pub struct Workflow<'a> {
    client: &'a IemClient,
    credentials: &'a Credentials,
}

impl<'a> Workflow<'a> {
    pub fn new(client: &'a IemClient, credentials: &'a Credentials) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// Obtain a fresh bearer token.
    pub async fn login(&self) -> Result<BearerToken, CoreError> {
        let token = self
            .client
            .login_direct(&self.credentials.username, &self.credentials.password)
            .await?
            .into_payload();
        Ok(token)
    }

    /// Deploy `version_id` of `app_id` to the device called `device_name`.
    pub async fn deploy(
        &self,
        app_id: &str,
        version_id: &str,
        device_name: &str,
    ) -> Result<Deployment, DeployError> {
        let mut tracker = Tracker::start(device_name);
        let token = self.authenticate(&mut tracker).await?;
        self.deploy_authenticated(tracker, &token, app_id, version_id)
            .await
    }

    /// Deploy an application named by ID or catalog title.
    ///
    /// Without `version_id` the newest version is deployed. Both lookups
    /// run after the single login and fail at `Authenticated`.
    pub async fn deploy_ref(
        &self,
        app: &AppRef,
        version_id: Option<&str>,
        device_name: &str,
    ) -> Result<Deployment, DeployError> {
        let mut tracker = Tracker::start(device_name);
        let token = self.authenticate(&mut tracker).await?;

        let app_id = match app {
            AppRef::Id(id) => id.clone(),
            AppRef::Title(title) => resolve::resolve_app_id(self.client, &token, title)
                .await
                .map_err(|e| tracker.fail(e))?,
        };
        let version_id = match version_id {
            Some(version) => version.to_owned(),
            None => self
                .client
                .newest_app_version_id(&token, &app_id)
                .await
                .map_err(|e| tracker.fail(e))?
                .into_payload(),
        };

        self.deploy_authenticated(tracker, &token, &app_id, &version_id)
            .await
    }

    /// Deploy the newest version of the application titled `app_title`.
    ///
    /// The title goes through the exact-name lookup endpoint rather than a
    /// catalog scan.
    pub async fn deploy_latest(
        &self,
        app_title: &str,
        device_name: &str,
    ) -> Result<Deployment, DeployError> {
        let mut tracker = Tracker::start(device_name);
        let token = self.authenticate(&mut tracker).await?;

        let app_id = match self.client.app_id_by_title(&token, app_title).await {
            Ok(response) => response.into_payload(),
            Err(e) => return Err(tracker.fail(e)),
        };
        let version_id = match self.client.newest_app_version_id(&token, &app_id).await {
            Ok(response) => response.into_payload(),
            Err(e) => return Err(tracker.fail(e)),
        };
        debug!(app_title, %app_id, %version_id, "newest version selected");

        self.deploy_authenticated(tracker, &token, &app_id, &version_id)
            .await
    }

    async fn authenticate(&self, tracker: &mut Tracker) -> Result<BearerToken, DeployError> {
        tracker.advance(Stage::LoggingIn);
        let token = self.login().await.map_err(|e| tracker.fail(e))?;
        tracker.advance(Stage::Authenticated);
        Ok(token)
    }

    async fn deploy_authenticated(
        &self,
        mut tracker: Tracker,
        token: &BearerToken,
        app_id: &str,
        version_id: &str,
    ) -> Result<Deployment, DeployError> {
        tracker.advance(Stage::ResolvingDevice);
        let device_name = tracker.device_name.clone();
        let device_id = resolve::resolve_device_id(self.client, token, &device_name)
            .await
            .map_err(|e| tracker.fail(e))?;

        tracker.advance(Stage::Deploying);
        let batch = self
            .client
            .deploy_app(token, app_id, version_id, &device_id)
            .await
            .map_err(|e| tracker.fail(e))?
            .into_payload();

        tracker.advance(Stage::Done);
        Ok(Deployment {
            device_name: tracker.device_name,
            device_id,
            app_id: app_id.to_owned(),
            version_id: version_id.to_owned(),
            batch,
            history: tracker.history,
        })
    }

    /// Queue an install of `app` on `device_name`, optionally scheduled.
    pub async fn install(
        &self,
        app: &AppRef,
        device_name: &str,
        schedule: Option<DateTime<Utc>>,
    ) -> Result<Response<Value>, CoreError> {
        let (token, app_id, device_id) = self.prepare_batch(app, device_name).await?;
        Ok(self
            .client
            .install_app(&token, &device_id, &app_id, schedule)
            .await?)
    }

    /// Queue an uninstall of `app` from `device_name`, optionally scheduled.
    pub async fn uninstall(
        &self,
        app: &AppRef,
        device_name: &str,
        schedule: Option<DateTime<Utc>>,
    ) -> Result<Response<Value>, CoreError> {
        let (token, app_id, device_id) = self.prepare_batch(app, device_name).await?;
        Ok(self
            .client
            .uninstall_app(&token, &device_id, &app_id, schedule)
            .await?)
    }

    /// Login plus both lookups shared by install and uninstall.
    async fn prepare_batch(
        &self,
        app: &AppRef,
        device_name: &str,
    ) -> Result<(BearerToken, String, String), CoreError> {
        let token = self.login().await?;
        let app_id = match app {
            AppRef::Id(id) => id.clone(),
            AppRef::Title(title) => resolve::resolve_app_id(self.client, &token, title).await?,
        };
        let device_id = resolve::resolve_device_id(self.client, &token, device_name).await?;
        Ok((token, app_id, device_id))
    }
}
