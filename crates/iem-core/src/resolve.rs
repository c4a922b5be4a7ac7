//! Name → ID resolution.
//!
//! Every lookup follows the same protocol: fetch the listing, propagate a
//! failed listing unchanged, then scan in order and take the **first**
//! record whose name matches exactly. Matching is case-sensitive with no
//! trimming, and duplicate names are not detected -- later records with
//! the same name are never seen. Listings are small (one page of 100
//! devices, the app catalog), so there is no index or cache.

use iem_api::{ApiResult, BearerToken, IemClient, Named};
use tracing::debug;

use crate::error::{CoreError, EntityKind};

/// First record whose name equals `name` exactly.
pub fn first_match<'a, T: Named>(records: &'a [T], name: &str) -> Option<&'a T> {
    records.iter().find(|record| record.name() == name)
}

/// Apply the resolution protocol to an already-issued listing call.
pub fn resolve_in<T: Named>(
    listing: ApiResult<Vec<T>>,
    kind: EntityKind,
    name: &str,
) -> Result<String, CoreError> {
    let records = listing?.into_payload();
    match first_match(&records, name) {
        Some(record) => {
            debug!(%kind, name, id = record.id(), "resolved");
            Ok(record.id().to_owned())
        }
        None => {
            debug!(%kind, name, scanned = records.len(), "no match");
            Err(CoreError::not_found(kind, name))
        }
    }
}

/// Application ID for a catalog title.
pub async fn resolve_app_id(
    client: &IemClient,
    token: &BearerToken,
    title: &str,
) -> Result<String, CoreError> {
    resolve_in(client.list_apps(token).await, EntityKind::Application, title)
}

/// Device ID for a device name, scanning the first 100 devices.
pub async fn resolve_device_id(
    client: &IemClient,
    token: &BearerToken,
    name: &str,
) -> Result<String, CoreError> {
    resolve_in(client.list_all_devices(token).await, EntityKind::Device, name)
}

/// Application ID of `title` if it is installed on `device_id`.
///
/// Absence is an answer here, not an error.
pub async fn find_installed_app(
    client: &IemClient,
    token: &BearerToken,
    device_id: &str,
    title: &str,
) -> Result<Option<String>, CoreError> {
    let apps = client
        .list_installed_apps(token, device_id)
        .await?
        .into_payload();
    Ok(first_match(&apps, title).map(|app| app.application_id.clone()))
}

/// Configuration slot ID by display name.
pub async fn resolve_config_id(
    client: &IemClient,
    token: &BearerToken,
    app_id: &str,
    display_name: &str,
) -> Result<String, CoreError> {
    resolve_in(
        client.list_app_configurations(token, app_id).await,
        EntityKind::Configuration,
        display_name,
    )
}

/// Configuration version ID by slot display name and version ref name.
pub async fn resolve_config_version_id(
    client: &IemClient,
    token: &BearerToken,
    app_id: &str,
    display_name: &str,
    ref_name: &str,
) -> Result<String, CoreError> {
    let configs = client
        .list_app_configurations(token, app_id)
        .await?
        .into_payload();
    let config = first_match(&configs, display_name)
        .ok_or_else(|| CoreError::not_found(EntityKind::Configuration, display_name))?;
    first_match(&config.versions, ref_name)
        .map(|version| version.app_config_version_id.clone())
        .ok_or_else(|| CoreError::not_found(EntityKind::ConfigVersion, ref_name))
}

/// Catalog category ID by name.
pub async fn resolve_category_id(client: &IemClient, name: &str) -> Result<String, CoreError> {
    resolve_in(client.list_categories().await, EntityKind::Category, name)
}

/// Whether the named device has confirmed its activation.
pub async fn activation_status(
    client: &IemClient,
    token: &BearerToken,
    device_name: &str,
) -> Result<bool, CoreError> {
    let devices = client.list_edge_devices(token).await?.into_payload();
    devices
        .iter()
        .find(|device| device.device_name == device_name)
        .map(|device| device.is_activation_confirmed)
        .ok_or_else(|| CoreError::not_found(EntityKind::Device, device_name))
}
