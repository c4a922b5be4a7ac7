// ── Multi-device deployment ──
//
// Runs `Workflow::deploy` for each device in order. Every device gets a
// fresh login. Calls are strictly sequential.

use serde::Serialize;
use strum::{Display, EnumString};
use tracing::{info, warn};

use crate::workflow::{DeployError, Deployment, Workflow};

/// What to do with the remaining devices once one has failed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, Serialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Stop at the first failure; later devices are skipped.
    #[default]
    Abort,
    /// Attempt every device regardless.
    Continue,
}

/// Split a comma-separated device list.
///
/// Spaces are removed everywhere (device names never contain them) and
/// empty entries are dropped, so `"a, b,,c "` yields `["a", "b", "c"]`.
pub fn parse_device_list(raw: &str) -> Vec<String> {
    raw.replace(' ', "")
        .split(',')
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Result for one device of a pipeline run.
#[derive(Debug)]
pub enum DeviceOutcome {
    Deployed(Deployment),
    Failed(DeployError),
    /// Not attempted because an earlier device failed under `Abort`.
    Skipped(String),
}

impl DeviceOutcome {
    pub fn device_name(&self) -> &str {
        match self {
            Self::Deployed(d) => &d.device_name,
            Self::Failed(e) => &e.device_name,
            Self::Skipped(name) => name,
        }
    }

    pub fn is_deployed(&self) -> bool {
        matches!(self, Self::Deployed(_))
    }
}

/// Per-device results, in input order.
#[derive(Debug, Default)]
pub struct PipelineReport {
    pub outcomes: Vec<DeviceOutcome>,
}

impl PipelineReport {
    /// `true` when every device deployed.
    pub fn is_success(&self) -> bool {
        self.outcomes.iter().all(DeviceOutcome::is_deployed)
    }

    pub fn first_failure(&self) -> Option<&DeployError> {
        self.outcomes.iter().find_map(|outcome| match outcome {
            DeviceOutcome::Failed(err) => Some(err),
            _ => None,
        })
    }

    /// `true` if devices were skipped after a failure.
    pub fn aborted(&self) -> bool {
        self.outcomes
            .iter()
            .any(|outcome| matches!(outcome, DeviceOutcome::Skipped(_)))
    }

    pub fn deployed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_deployed()).count()
    }
}

/// Deploys one application version to many devices.
#[derive(Debug, Clone, Copy)]
pub struct Pipeline<'a> {
    workflow: Workflow<'a>,
    policy: FailurePolicy,
}

impl<'a> Pipeline<'a> {
    pub fn new(workflow: Workflow<'a>) -> Self {
        Self {
            workflow,
            policy: FailurePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub async fn run(&self, app_id: &str, version_id: &str, devices: &[String]) -> PipelineReport {
        let mut report = PipelineReport::default();
        let mut remaining = devices.iter();

        for device in remaining.by_ref() {
            match self.workflow.deploy(app_id, version_id, device).await {
                Ok(deployment) => {
                    info!(device = %device, device_id = %deployment.device_id, "deployed");
                    report.outcomes.push(DeviceOutcome::Deployed(deployment));
                }
                Err(err) => {
                    report.outcomes.push(DeviceOutcome::Failed(err));
                    if self.policy == FailurePolicy::Abort {
                        break;
                    }
                }
            }
        }

        let skipped: Vec<String> = remaining.cloned().collect();
        if !skipped.is_empty() {
            warn!(
                skipped = skipped.len(),
                "pipeline aborted, remaining devices not attempted"
            );
            report
                .outcomes
                .extend(skipped.into_iter().map(DeviceOutcome::Skipped));
        }
        report
    }
}
