//! Data models for the charging-station API.
//!
//! - `Identity`: the signed-in user
//! - `Station`, `StationFields`: charging stations and their editable fields
//! - `LoginRequest`, `SignupForm`: authentication bodies

pub mod identity;
pub mod station;

pub use identity::{Identity, LoginRequest, SignupForm, SignupRequest};
pub use station::{ConnectorType, Location, NewStation, Station, StationFields, StationStatus};
