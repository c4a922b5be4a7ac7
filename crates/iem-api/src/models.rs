// IEM wire types
//
// Only the fields this crate reads are typed; everything else the
// appliance sends is preserved in `extra` so listings round-trip into
// JSON/YAML output unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A remote record with an opaque server ID and a human-readable name.
///
/// Name resolution in `iem-core` is written against this trait.
pub trait Named {
    fn name(&self) -> &str;
    fn id(&self) -> &str;
}

/// Application in the IEM catalog (`GET /portal/api/v1/applications`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub application_id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Application installed on a specific edge device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstalledApp {
    pub application_id: String,
    pub title: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Edge device from the portal listing (`GET /portal/api/v1/devices`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    pub device_id: String,
    pub device_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Edge device from the service listing (`GET /p.service/api/v4/devices`),
/// which carries onboarding state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeDevice {
    pub device_name: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub is_activation_confirmed: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Configuration slot declared by an application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfiguration {
    pub app_config_id: String,
    pub display_name: String,
    #[serde(default, rename = "appConfigVersionLst")]
    pub versions: Vec<ConfigVersion>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One uploaded revision of an [`AppConfiguration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigVersion {
    pub app_config_version_id: String,
    pub ref_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Catalog category (`GET /p.service/api/v4/categories`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub category_id: String,
    pub name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Named for Application {
    fn name(&self) -> &str {
        &self.title
    }
    fn id(&self) -> &str {
        &self.application_id
    }
}

impl Named for InstalledApp {
    fn name(&self) -> &str {
        &self.title
    }
    fn id(&self) -> &str {
        &self.application_id
    }
}

impl Named for Device {
    fn name(&self) -> &str {
        &self.device_name
    }
    fn id(&self) -> &str {
        &self.device_id
    }
}

impl Named for AppConfiguration {
    fn name(&self) -> &str {
        &self.display_name
    }
    fn id(&self) -> &str {
        &self.app_config_id
    }
}

impl Named for ConfigVersion {
    fn name(&self) -> &str {
        &self.ref_name
    }
    fn id(&self) -> &str {
        &self.app_config_version_id
    }
}

impl Named for Category {
    fn name(&self) -> &str {
        &self.name
    }
    fn id(&self) -> &str {
        &self.category_id
    }
}

// ── Request bodies ───────────────────────────────────────────────────

/// A new versioned configuration slot for an application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewConfiguration {
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub vol_path: String,
    pub relative_path: String,
}

/// A JSON document uploaded as a new configuration version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    /// Version reference name shown in the IEM UI (`refName`).
    pub reference_name: String,
    pub description: String,
    pub filename: String,
    pub content: String,
}
