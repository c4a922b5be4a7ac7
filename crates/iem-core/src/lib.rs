// iem-core: Name resolution and dependent-action workflows on top of iem-api.

pub mod config;
pub mod error;
pub mod pipeline;
pub mod resolve;
pub mod workflow;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{ConnectionConfig, Credentials};
pub use error::{CoreError, EntityKind};
pub use pipeline::{parse_device_list, DeviceOutcome, FailurePolicy, Pipeline, PipelineReport};
pub use workflow::{AppRef, DeployError, Deployment, Stage, Workflow};

// The wire layer is part of this crate's public surface.
pub use iem_api;
