//! API client for communicating with the charging-station REST API.
//!
//! This module provides the `ApiClient` struct, the HTTP implementation of
//! `AuthApi` and `StationApi`.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::models::{Identity, LoginRequest, NewStation, SignupRequest, Station, StationFields};

use super::{ApiError, AuthApi, StationApi};

// ============================================================================
// Constants
// ============================================================================

const ME_PATH: &str = "/api/auth/me";
const LOGIN_PATH: &str = "/api/auth/login";
const SIGNUP_PATH: &str = "/api/auth/signup";
const LOGOUT_PATH: &str = "/api/auth/logout";
const STATIONS_PATH: &str = "/api/stations";
const ALL_STATIONS_PATH: &str = "/api/stations/all";

/// API client for the charging-station service.
/// Clone is cheap - reqwest::Client uses Arc internally, so clones share the
/// connection pool and the cookie jar holding the session.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Arc<str>,
}

impl ApiClient {
    /// Create a new API client
    pub fn new(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: Arc::from(config.api_base_url.trim_end_matches('/')),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn station_url(&self, id: &str) -> String {
        format!("{}{}/{}", self.base_url, STATIONS_PATH, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body))
        }
    }

    /// Decode a success body, treating an `error` field as a failure.
    fn decode<T: DeserializeOwned>(url: &str, body: &str) -> Result<T, ApiError> {
        if let Some(message) = ApiError::error_in_body(body) {
            return Err(ApiError::ErrorBody(message));
        }
        serde_json::from_str(body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse JSON response from {}: {}", url, e))
        })
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, ApiError> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await?;
        debug!(url = url, bytes = body.len(), "Response received");
        Self::decode(url, &body)
    }

    /// Send a request whose success body carries nothing we need.
    async fn send_empty(&self, request: RequestBuilder, url: &str) -> Result<(), ApiError> {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let body = response.text().await.unwrap_or_default();
        debug!(url = url, bytes = body.len(), "Response received");
        match ApiError::error_in_body(&body) {
            Some(message) => Err(ApiError::ErrorBody(message)),
            None => Ok(()),
        }
    }
}

impl AuthApi for ApiClient {
    async fn me(&self) -> Result<Identity, ApiError> {
        let url = self.url(ME_PATH);
        self.send_json(self.client.get(&url), &url).await
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        let url = self.url(LOGIN_PATH);
        self.send_json(self.client.post(&url).json(request), &url).await
    }

    async fn signup(&self, request: &SignupRequest<'_>) -> Result<Identity, ApiError> {
        let url = self.url(SIGNUP_PATH);
        self.send_json(self.client.post(&url).json(request), &url).await
    }

    async fn logout(&self) -> Result<(), ApiError> {
        let url = self.url(LOGOUT_PATH);
        self.send_empty(self.client.post(&url), &url).await
    }
}

impl StationApi for ApiClient {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        let url = self.url(ALL_STATIONS_PATH);
        self.send_json(self.client.get(&url), &url).await
    }

    async fn create_station(&self, station: &NewStation<'_>) -> Result<Station, ApiError> {
        let url = self.url(STATIONS_PATH);
        self.send_json(self.client.post(&url).json(station), &url).await
    }

    async fn update_station(&self, id: &str, fields: &StationFields) -> Result<Station, ApiError> {
        let url = self.station_url(id);
        self.send_json(self.client.put(&url).json(fields), &url).await
    }

    async fn delete_station(&self, id: &str) -> Result<(), ApiError> {
        let url = self.station_url(id);
        self.send_empty(self.client.delete(&url), &url).await
    }
}
