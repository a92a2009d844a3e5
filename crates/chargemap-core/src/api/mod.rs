//! REST API client module for the charging-station service.
//!
//! `ApiClient` talks HTTP; the caches only see it through the `AuthApi`
//! and `StationApi` traits so they can be driven by any backend.
//!
//! The API authenticates with a session cookie set by the login and
//! signup endpoints; the client keeps it in an in-process cookie store.

use std::future::Future;

use crate::models::{Identity, LoginRequest, NewStation, SignupRequest, Station, StationFields};

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;

/// Authentication endpoints (`/api/auth/*`).
pub trait AuthApi: Send + Sync {
    /// `GET /api/auth/me`
    fn me(&self) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// `POST /api/auth/login`
    fn login(
        &self,
        request: &LoginRequest,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// `POST /api/auth/signup`
    fn signup(
        &self,
        request: &SignupRequest<'_>,
    ) -> impl Future<Output = Result<Identity, ApiError>> + Send;

    /// `POST /api/auth/logout`
    fn logout(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}

/// Station endpoints (`/api/stations/*`).
pub trait StationApi: Send + Sync {
    /// `GET /api/stations/all`
    fn fetch_stations(&self) -> impl Future<Output = Result<Vec<Station>, ApiError>> + Send;

    /// `POST /api/stations`
    fn create_station(
        &self,
        station: &NewStation<'_>,
    ) -> impl Future<Output = Result<Station, ApiError>> + Send;

    /// `PUT /api/stations/{id}`
    fn update_station(
        &self,
        id: &str,
        fields: &StationFields,
    ) -> impl Future<Output = Result<Station, ApiError>> + Send;

    /// `DELETE /api/stations/{id}`
    fn delete_station(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}
