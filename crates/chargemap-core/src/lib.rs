//! Core library for chargemap.
//!
//! Everything a front end needs to talk to the charging-station API:
//!
//! - `api`: the HTTP client and the `AuthApi` / `StationApi` seams
//! - `session`: the Session Cache (who is signed in)
//! - `stations`: the Station Collection Cache
//! - `filter`: client-side station filtering
//! - `models`: `Identity`, `Station` and request bodies
//! - `config`: persisted client configuration

pub mod api;
pub mod config;
pub mod error;
pub mod fence;
pub mod filter;
pub mod models;
pub mod session;
pub mod stations;
pub mod utils;

pub use api::{ApiClient, ApiError, AuthApi, StationApi};
pub use config::Config;
pub use error::{ClientError, Result};
pub use fence::Fenced;
pub use filter::{filter_stations, StationFilter};
pub use models::{
    ConnectorType, Identity, Location, LoginRequest, SignupForm, Station, StationFields,
    StationStatus,
};
pub use session::{SessionCache, SessionStatus};
pub use stations::{CachedData, StationCache};

#[cfg(test)]
pub(crate) mod testing;
