// iem-api: Async Rust client for the Industrial Edge Manager REST API

pub mod applications;
pub mod auth;
pub mod batches;
pub mod categories;
pub mod client;
pub mod configs;
pub mod devices;
pub mod error;
pub mod models;
pub mod response;
pub mod transport;

pub use auth::BearerToken;
pub use batches::{BatchOperation, schedule_micros};
pub use client::IemClient;
pub use devices::ALL_DEVICES_PAGE_SIZE;
pub use error::{Error, TRANSPORT_STATUS};
pub use models::{
    AppConfiguration, Application, Category, ConfigFile, ConfigVersion, Device, EdgeDevice,
    InstalledApp, Named, NewConfiguration,
};
pub use response::{ApiResult, Outcome, Response};
pub use transport::{TlsMode, TransportConfig};
