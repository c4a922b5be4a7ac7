//! `pipeline` and `standalone`: deploy an app version to devices.

use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use tabled::Tabled;
use tracing::info;

use iem_config::Settings;
use iem_core::{AppRef, DeviceOutcome, FailurePolicy, Pipeline, PipelineReport, parse_device_list};

use crate::cli::{OnFailure, PipelineArgs, StandaloneArgs};
use crate::error::{CliError, exit_code};
use crate::output;

use super::Context;

// ── Report rows ─────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct DeviceReport {
    device: String,
    status: &'static str,
    device_id: Option<String>,
    /// Stage reached (or failed in).
    stage: Option<String>,
    /// Batch reply for deployed devices, error text for failed ones.
    detail: Value,
}

#[derive(Tabled)]
struct DeviceReportRow {
    #[tabled(rename = "Device")]
    device: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Device ID")]
    device_id: String,
    #[tabled(rename = "Stage")]
    stage: String,
    #[tabled(rename = "Detail")]
    detail: String,
}

impl From<&DeviceOutcome> for DeviceReport {
    fn from(outcome: &DeviceOutcome) -> Self {
        match outcome {
            DeviceOutcome::Deployed(d) => Self {
                device: d.device_name.clone(),
                status: "deployed",
                device_id: Some(d.device_id.clone()),
                stage: d.history.last().map(ToString::to_string),
                detail: d.batch.clone(),
            },
            DeviceOutcome::Failed(e) => Self {
                device: e.device_name.clone(),
                status: "failed",
                device_id: None,
                stage: Some(e.stage.to_string()),
                detail: Value::String(e.source.to_string()),
            },
            DeviceOutcome::Skipped(name) => Self {
                device: name.clone(),
                status: "skipped",
                device_id: None,
                stage: None,
                detail: Value::Null,
            },
        }
    }
}

fn detail_text(detail: &Value) -> String {
    match detail {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn render_report(ctx: &Context<'_>, reports: &[DeviceReport]) -> String {
    let color = output::should_color(ctx.global.color);
    output::render_rows(ctx.format, reports, |r| DeviceReportRow {
        device: r.device.clone(),
        status: output::paint_status(
            r.status,
            match r.status {
                "deployed" => Some(true),
                "failed" => Some(false),
                _ => None,
            },
            color,
        ),
        device_id: r.device_id.clone().unwrap_or_else(|| "-".into()),
        stage: r.stage.clone().unwrap_or_else(|| "-".into()),
        detail: detail_text(&r.detail),
    })
}

// ── Handlers ────────────────────────────────────────────────────────

fn failure_policy(flag: Option<OnFailure>, settings: &Settings) -> Result<FailurePolicy, CliError> {
    match flag {
        Some(OnFailure::Abort) => Ok(FailurePolicy::Abort),
        Some(OnFailure::Continue) => Ok(FailurePolicy::Continue),
        None => FailurePolicy::from_str(&settings.on_failure).map_err(|_| CliError::Validation {
            field: "on_failure".into(),
            reason: format!("expected 'abort' or 'continue', got '{}'", settings.on_failure),
        }),
    }
}

fn app_id(flag: Option<&String>, settings: &Settings) -> Result<String, CliError> {
    flag.or(settings.app_id.as_ref())
        .cloned()
        .ok_or(CliError::MissingSetting {
            field: "application ID",
            env: "APP_ID",
            flag: "--app-id",
        })
}

pub async fn pipeline(args: &PipelineArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let app_id = app_id(args.app_id.as_ref(), ctx.settings)?;
    let devices = parse_device_list(&args.devices);
    if devices.is_empty() {
        return Err(CliError::Validation {
            field: "devices".into(),
            reason: "no device names given".into(),
        });
    }
    let policy = failure_policy(args.on_failure, ctx.settings)?;

    info!(
        app_id = %app_id,
        version = %args.app_version_id,
        devices = devices.len(),
        %policy,
        "starting pipeline"
    );
    let report = Pipeline::new(ctx.workflow())
        .with_policy(policy)
        .run(&app_id, &args.app_version_id, &devices)
        .await;

    let reports: Vec<DeviceReport> = report.outcomes.iter().map(DeviceReport::from).collect();
    ctx.print(&render_report(ctx, &reports));
    pipeline_result(report)
}

fn pipeline_result(report: PipelineReport) -> Result<(), CliError> {
    if report.is_success() {
        return Ok(());
    }
    let total = report.outcomes.len();
    let failed = report
        .outcomes
        .iter()
        .filter(|o| matches!(o, DeviceOutcome::Failed(_)))
        .count();
    let exit = report
        .outcomes
        .into_iter()
        .find_map(|outcome| match outcome {
            DeviceOutcome::Failed(err) => Some(CliError::from(err).exit_code()),
            _ => None,
        })
        .unwrap_or(exit_code::GENERAL);
    Err(CliError::DeploymentFailed {
        failed,
        total,
        exit,
    })
}

pub async fn standalone(args: &StandaloneArgs, ctx: &Context<'_>) -> Result<(), CliError> {
    let device = args
        .devices
        .clone()
        .or_else(|| ctx.settings.device.clone())
        .ok_or(CliError::MissingSetting {
            field: "device name",
            env: "IED_NAME",
            flag: "--devices",
        })?;
    let workflow = ctx.workflow();

    let result = match (&args.app_name, &args.app_version_id) {
        (Some(title), None) => workflow.deploy_latest(title, &device).await,
        (Some(title), Some(version)) => {
            let app = AppRef::Title(title.clone());
            workflow.deploy_ref(&app, Some(version), &device).await
        }
        (None, version) => {
            let app = AppRef::Id(app_id(args.app_id.as_ref(), ctx.settings)?);
            workflow.deploy_ref(&app, version.as_deref(), &device).await
        }
    };

    let outcome = match result {
        Ok(deployment) => DeviceOutcome::Deployed(deployment),
        Err(err) => DeviceOutcome::Failed(err),
    };
    ctx.print(&render_report(ctx, &[DeviceReport::from(&outcome)]));
    match outcome {
        DeviceOutcome::Failed(err) => Err(err.into()),
        _ => Ok(()),
    }
}
