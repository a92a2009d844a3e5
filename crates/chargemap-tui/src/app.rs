//! Application state management for chargemap.
//!
//! This module contains the core `App` struct that owns the UI state and the
//! two caches from `chargemap-core`, and coordinates the background tasks
//! that talk to the API.

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use chargemap_core::session::PASSWORDS_DO_NOT_MATCH;
use chargemap_core::{
    ApiClient, CachedData, ClientError, Config, ConnectorType, Fenced, Identity, SessionCache,
    SignupForm, Station, StationCache, StationFields, StationFilter, StationStatus,
};

use crate::forms::{check_signup, cycle_option, LoginFocus, SignupFocus, StationForm};

// ============================================================================
// Constants
// ============================================================================

/// Buffer size for the background task message channel.
const CHANNEL_BUFFER_SIZE: usize = 32;

/// Number of items to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

/// Environment variable prefilling the login email.
pub const EMAIL_ENV: &str = "CHARGEMAP_EMAIL";

const SIGNUP_SUCCESS: &str = "User created successfully!";
const LOGIN_SUCCESS: &str = "Login successful!";
const CHECKING_SESSION: &str = "Checking session...";
const LOGIN_REQUIRED: &str = "Email and password required";
const SESSION_NOT_ESTABLISHED: &str = "Something went wrong";

// ============================================================================
// UI State Types
// ============================================================================

/// Main navigation tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Stations,
    Map,
}

impl Tab {
    pub fn title(&self) -> &'static str {
        match self {
            Tab::Stations => "Stations",
            Tab::Map => "Map",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            Tab::Stations => Tab::Map,
            Tab::Map => Tab::Stations,
        }
    }

    pub fn prev(&self) -> Self {
        // Two tabs: previous and next coincide.
        self.next()
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    LoggingIn,
    SigningUp,
    EditingStation,
    ConfirmingDelete,
    EditingPowerFilter,
    ShowingHelp,
    ConfirmingQuit,
    Quitting,
}

// ============================================================================
// Background Task Results
// ============================================================================

/// Results sent back from spawned tasks to the UI loop.
enum TaskResult {
    /// Outcome of a session probe; superseded answers predate a session change
    Session(Fenced<Option<Identity>>),
    /// Login or signup finished; `signup` picks the success message
    SignedIn {
        result: std::result::Result<Identity, ClientError>,
        signup: bool,
    },
    /// Station list loaded. `Ok(None)` means a later change overtook the
    /// read; `after_mutation` marks reloads following a create/update/delete.
    Stations {
        result: std::result::Result<Option<CachedData<Vec<Station>>>, ClientError>,
        after_mutation: bool,
    },
    /// A create, update or delete finished
    StationMutated(std::result::Result<String, ClientError>),
    /// The logout request finished; local state was already cleared
    LoggedOut(std::result::Result<(), ClientError>),
}

// ============================================================================
// Main Application Struct
// ============================================================================

pub struct App {
    // Core services
    pub config: Config,
    pub session: SessionCache<ApiClient>,
    pub station_cache: StationCache<ApiClient>,

    // UI State
    pub state: AppState,
    pub current_tab: Tab,
    pub identity: Option<Identity>,
    pub station_data: Option<CachedData<Vec<Station>>>,
    pub loading: bool,
    pub submitting: bool,
    pub station_selection: usize,
    pub filter: StationFilter,
    pub power_filter_input: String,
    pub pending_delete: Option<Station>,

    // Login form state
    pub login_email: String,
    pub login_password: String,
    pub login_focus: LoginFocus,
    pub login_error: Option<String>,

    // Signup form state
    pub signup: SignupForm,
    pub signup_focus: SignupFocus,
    pub signup_error: Option<String>,

    pub station_form: StationForm,

    pub status_message: Option<String>,

    // Background task channel
    task_tx: mpsc::Sender<TaskResult>,
    task_rx: mpsc::Receiver<TaskResult>,
}

impl App {
    /// Create a new application instance. One API client is shared by both caches.
    pub fn new(config: Config) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        debug!(base_url = api.base_url(), "API client configured");

        let session = SessionCache::with_shared(Arc::clone(&api));
        let station_cache = StationCache::with_shared(api);

        let (task_tx, task_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);

        let login_email = std::env::var(EMAIL_ENV)
            .ok()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| config.last_email.clone())
            .unwrap_or_default();

        Ok(Self {
            config,
            session,
            station_cache,

            state: AppState::Normal,
            current_tab: Tab::Stations,
            identity: None,
            station_data: None,
            loading: false,
            submitting: false,
            station_selection: 0,
            filter: StationFilter::default(),
            power_filter_input: String::new(),
            pending_delete: None,

            login_email,
            login_password: String::new(),
            login_focus: LoginFocus::Email,
            login_error: None,

            signup: SignupForm::default(),
            signup_focus: SignupFocus::Username,
            signup_error: None,

            station_form: StationForm::default(),

            status_message: None,

            task_tx,
            task_rx,
        })
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Ask the API who we are; the login overlay opens if nobody is.
    pub fn check_session(&mut self) {
        self.status_message = Some(CHECKING_SESSION.to_string());
        let tx = self.task_tx.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            let identity = session.probe_fenced().await;
            Self::send_result(&tx, TaskResult::Session(identity)).await;
        });
    }

    /// Start the login process (show login overlay)
    pub fn start_login(&mut self) {
        self.state = AppState::LoggingIn;
        self.login_focus = if self.login_email.is_empty() {
            LoginFocus::Email
        } else {
            LoginFocus::Password
        };
        self.login_error = None;
    }

    pub fn start_signup(&mut self) {
        self.state = AppState::SigningUp;
        self.signup = SignupForm {
            email: self.login_email.clone(),
            ..SignupForm::default()
        };
        self.signup_focus = SignupFocus::Username;
        self.signup_error = None;
    }

    /// Submit the login form in the background.
    pub fn submit_login(&mut self) {
        if self.submitting {
            return;
        }
        let email = self.login_email.trim().to_string();
        let password = self.login_password.clone();
        if email.is_empty() || password.is_empty() {
            self.login_error = Some(LOGIN_REQUIRED.to_string());
            return;
        }

        self.login_error = None;
        self.submitting = true;
        self.status_message = Some("Logging in...".to_string());

        let tx = self.task_tx.clone();
        let session = self.session.clone();
        tokio::spawn(async move {
            let result = match session.login(&email, &password).await {
                Ok(_) => Self::establish(&session).await,
                Err(e) => Err(e),
            };
            Self::send_result(&tx, TaskResult::SignedIn { result, signup: false }).await;
        });
    }

    /// Submit the signup form in the background. Missing fields and a
    /// password mismatch are caught before any request.
    pub fn submit_signup(&mut self) {
        if self.submitting {
            return;
        }
        if let Err(message) = check_signup(&self.signup) {
            self.signup_error = Some(message);
            return;
        }
        if !self.signup.passwords_match() {
            self.signup_error = Some(PASSWORDS_DO_NOT_MATCH.to_string());
            return;
        }

        self.signup_error = None;
        self.submitting = true;
        self.status_message = Some("Creating account...".to_string());

        let tx = self.task_tx.clone();
        let session = self.session.clone();
        let form = self.signup.clone();
        tokio::spawn(async move {
            let result = match session.signup(&form).await {
                Ok(_) => Self::establish(&session).await,
                Err(e) => Err(e),
            };
            Self::send_result(&tx, TaskResult::SignedIn { result, signup: true }).await;
        });
    }

    /// Login and signup only invalidate the session; the identity shown is
    /// whatever a fresh probe reports. If that probe is overtaken, the
    /// session as last committed decides.
    async fn establish(session: &SessionCache<ApiClient>) -> std::result::Result<Identity, ClientError> {
        let identity = match session.probe_fenced().await {
            Fenced::Committed(identity) => identity,
            Fenced::Superseded(_) => session.identity().await,
        };
        identity.ok_or_else(|| ClientError::Auth(SESSION_NOT_ESTABLISHED.to_string()))
    }

    /// Clear the session and the station list locally, then send the
    /// logout request. The next sign-in starts from a fresh fetch.
    pub fn logout(&mut self) {
        info!("Logging out");
        self.identity = None;
        self.station_data = None;
        self.station_selection = 0;
        self.login_password.clear();
        self.station_form = StationForm::default();
        self.pending_delete = None;
        self.start_login();

        let tx = self.task_tx.clone();
        let session = self.session.clone();
        let cache = self.station_cache.clone();
        tokio::spawn(async move {
            cache.invalidate().await;
            let result = session.logout().await;
            Self::send_result(&tx, TaskResult::LoggedOut(result)).await;
        });
    }

    fn remember_email(&mut self) {
        let email = self.login_email.trim().to_string();
        if email.is_empty() || self.config.last_email.as_deref() == Some(email.as_str()) {
            return;
        }
        self.config.last_email = Some(email);
        if let Err(e) = self.config.save() {
            warn!(error = %e, "Failed to save config");
        }
    }

    // =========================================================================
    // Stations
    // =========================================================================

    /// Load stations in the background. `force` bypasses the cache.
    pub fn refresh_stations(&mut self, force: bool) {
        self.loading = true;
        let tx = self.task_tx.clone();
        let cache = self.station_cache.clone();
        tokio::spawn(async move {
            let result = Self::load_stations(&cache, force).await;
            Self::send_result(
                &tx,
                TaskResult::Stations {
                    result,
                    after_mutation: false,
                },
            )
            .await;
        });
    }

    /// Read the list through the cache. Only a committed list is returned;
    /// a superseded one is dropped since whatever overtook it reloads itself.
    async fn load_stations(
        cache: &StationCache<ApiClient>,
        force: bool,
    ) -> std::result::Result<Option<CachedData<Vec<Station>>>, ClientError> {
        let fetched = if force {
            cache.refresh_fenced().await?
        } else {
            cache.list_fenced().await?
        };
        Ok(fetched.committed())
    }

    /// Reload after a successful mutation and report it.
    async fn reload_after_mutation(tx: &mpsc::Sender<TaskResult>, cache: &StationCache<ApiClient>) {
        let result = Self::load_stations(cache, false).await;
        Self::send_result(
            tx,
            TaskResult::Stations {
                result,
                after_mutation: true,
            },
        )
        .await;
    }

    /// Every station held, unfiltered.
    pub fn all_stations(&self) -> &[Station] {
        self.station_data
            .as_ref()
            .map(|d| d.data.as_slice())
            .unwrap_or(&[])
    }

    /// Stations passing the filter bar, in list order.
    pub fn visible_stations(&self) -> Vec<Station> {
        self.filter.apply(self.all_stations())
    }

    pub fn selected_station(&self) -> Option<Station> {
        self.visible_stations().into_iter().nth(self.station_selection)
    }

    /// Whether the signed-in identity created this station.
    pub fn is_owned(&self, station: &Station) -> bool {
        self.identity
            .as_ref()
            .is_some_and(|identity| station.is_owned_by(&identity.id))
    }

    pub fn cache_age(&self) -> Option<String> {
        self.station_data.as_ref().map(|d| d.age_display())
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_stations().len();
        if self.station_selection >= count {
            self.station_selection = count.saturating_sub(1);
        }
    }

    pub fn select_next(&mut self, step: usize) {
        let count = self.visible_stations().len();
        if count > 0 {
            self.station_selection = (self.station_selection + step).min(count - 1);
        }
    }

    pub fn select_prev(&mut self, step: usize) {
        self.station_selection = self.station_selection.saturating_sub(step);
    }

    pub fn select_last(&mut self) {
        self.station_selection = self.visible_stations().len().saturating_sub(1);
    }

    pub fn open_new_station(&mut self) {
        if !self.is_authenticated() {
            self.start_login();
            return;
        }
        self.station_form = StationForm::default();
        self.state = AppState::EditingStation;
    }

    /// Open the edit form for the selected station if the user owns it.
    pub fn open_edit_station(&mut self) {
        let Some(station) = self.selected_station() else {
            return;
        };
        if !self.is_owned(&station) {
            self.status_message = Some("Only the creator can edit this station".to_string());
            return;
        }
        self.station_form = StationForm::edit(&station);
        self.state = AppState::EditingStation;
    }

    pub fn close_station_form(&mut self) {
        self.station_form = StationForm::default();
        self.state = AppState::Normal;
    }

    /// Validate the form and send it. On success the form is reset and the
    /// list refetched, in that order, within one task.
    pub fn submit_station_form(&mut self) {
        if self.submitting {
            return;
        }
        let fields = match self.station_form.validate() {
            Ok(fields) => fields,
            Err(message) => {
                self.station_form.error = Some(message);
                return;
            }
        };
        let Some(owner_id) = self.identity.as_ref().map(|i| i.id.clone()) else {
            self.station_form.error = Some("Please log in first".to_string());
            return;
        };

        self.station_form.error = None;
        self.submitting = true;

        let tx = self.task_tx.clone();
        let cache = self.station_cache.clone();
        let editing_id = self.station_form.editing_id.clone();
        tokio::spawn(async move {
            let result = Self::save_station(&cache, editing_id.as_deref(), &fields, &owner_id).await;
            let saved = result.is_ok();
            Self::send_result(&tx, TaskResult::StationMutated(result)).await;
            if saved {
                Self::reload_after_mutation(&tx, &cache).await;
            }
        });
    }

    async fn save_station(
        cache: &StationCache<ApiClient>,
        editing_id: Option<&str>,
        fields: &StationFields,
        owner_id: &str,
    ) -> std::result::Result<String, ClientError> {
        match editing_id {
            Some(id) => {
                let station = cache.update(id, fields).await?;
                Ok(format!("Updated {}", station.name))
            }
            None => {
                let station = cache.create(fields, owner_id).await?;
                Ok(format!("Added {}", station.name))
            }
        }
    }

    /// Ask for confirmation before deleting the selected station.
    pub fn request_delete(&mut self) {
        let Some(station) = self.selected_station() else {
            return;
        };
        if !self.is_owned(&station) {
            self.status_message = Some("Only the creator can delete this station".to_string());
            return;
        }
        self.pending_delete = Some(station);
        self.state = AppState::ConfirmingDelete;
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(station) = self.pending_delete.take() else {
            return;
        };

        self.status_message = Some(format!("Deleting {}...", station.name));
        let tx = self.task_tx.clone();
        let cache = self.station_cache.clone();
        tokio::spawn(async move {
            let result = cache
                .delete(&station.id)
                .await
                .map(|()| format!("Deleted {}", station.name));
            let deleted = result.is_ok();
            Self::send_result(&tx, TaskResult::StationMutated(result)).await;
            if deleted {
                Self::reload_after_mutation(&tx, &cache).await;
            }
        });
    }

    // =========================================================================
    // Filters
    // =========================================================================

    pub fn cycle_status_filter(&mut self) {
        self.filter.status = cycle_option(self.filter.status, &StationStatus::ALL, true);
        self.station_selection = 0;
    }

    pub fn cycle_connector_filter(&mut self) {
        self.filter.connector_type =
            cycle_option(self.filter.connector_type, &ConnectorType::ALL, true);
        self.station_selection = 0;
    }

    pub fn start_power_filter(&mut self) {
        self.power_filter_input = self
            .filter
            .power_output
            .map(|p| p.to_string())
            .unwrap_or_default();
        self.state = AppState::EditingPowerFilter;
    }

    /// Apply the typed power value; an unparsable value leaves the filter as it was.
    pub fn apply_power_filter(&mut self) {
        match StationFilter::parse_power(&self.power_filter_input) {
            Ok(power) => {
                self.filter.power_output = power;
                self.station_selection = 0;
                self.state = AppState::Normal;
            }
            Err(message) => {
                self.status_message = Some(message);
            }
        }
    }

    pub fn clear_filters(&mut self) {
        self.filter = StationFilter::default();
        self.power_filter_input.clear();
        self.station_selection = 0;
    }

    // =========================================================================
    // Background Tasks
    // =========================================================================

    /// Helper to send task results, logging any channel errors
    async fn send_result(tx: &mpsc::Sender<TaskResult>, result: TaskResult) {
        if let Err(e) = tx.send(result).await {
            error!(error = %e, "Failed to send task result - channel closed");
        }
    }

    /// Check for completed background tasks and process results
    pub fn check_background_tasks(&mut self) {
        let mut results = Vec::new();
        while let Ok(result) = self.task_rx.try_recv() {
            results.push(result);
        }

        for result in results {
            self.process_task_result(result);
        }
    }

    fn process_task_result(&mut self, result: TaskResult) {
        match result {
            TaskResult::Session(Fenced::Committed(Some(identity))) => {
                info!(user = %identity.username, "Session active");
                self.identity = Some(identity);
                self.status_message = None;
                if matches!(self.state, AppState::LoggingIn | AppState::SigningUp) {
                    self.state = AppState::Normal;
                }
                self.refresh_stations(false);
            }
            TaskResult::Session(Fenced::Committed(None)) => {
                debug!("No active session");
                self.identity = None;
                self.status_message = None;
                if !matches!(self.state, AppState::Quitting | AppState::ConfirmingQuit) {
                    self.start_login();
                }
            }
            TaskResult::Session(Fenced::Superseded(_)) => {
                debug!("Ignoring session probe overtaken by a login, signup or logout");
                if self.status_message.as_deref() == Some(CHECKING_SESSION) {
                    self.status_message = None;
                }
            }
            TaskResult::SignedIn { result, signup } => {
                self.submitting = false;
                match result {
                    Ok(identity) => {
                        self.identity = Some(identity);
                        self.login_password.clear();
                        if signup {
                            self.login_email = self.signup.email.clone();
                            self.signup = SignupForm::default();
                            self.status_message = Some(SIGNUP_SUCCESS.to_string());
                        } else {
                            self.status_message = Some(LOGIN_SUCCESS.to_string());
                        }
                        self.remember_email();
                        self.state = AppState::Normal;
                        self.refresh_stations(false);
                    }
                    Err(e) => {
                        self.status_message = None;
                        if signup {
                            self.signup_error = Some(e.to_string());
                        } else {
                            self.login_error = Some(e.to_string());
                        }
                    }
                }
            }
            TaskResult::Stations {
                result,
                after_mutation,
            } => {
                self.loading = false;
                match result {
                    Ok(Some(data)) => {
                        debug!(count = data.data.len(), "Stations received");
                        self.station_data = Some(data);
                        self.clamp_selection();
                    }
                    Ok(None) => {
                        debug!("Station list overtaken by a newer change, keeping current view");
                    }
                    Err(e) => {
                        // The mutation invalidated the cache, so nothing held is current.
                        if after_mutation {
                            self.station_data = None;
                            self.clamp_selection();
                        }
                        self.status_message = Some(format!("Error: {}", e));
                    }
                }
            }
            TaskResult::StationMutated(result) => {
                self.submitting = false;
                match result {
                    Ok(message) => {
                        if self.state == AppState::EditingStation {
                            self.close_station_form();
                        }
                        self.status_message = Some(message);
                    }
                    Err(e) => {
                        if self.state == AppState::EditingStation {
                            self.station_form.error = Some(e.to_string());
                        } else {
                            self.status_message = Some(format!("Error: {}", e));
                        }
                    }
                }
            }
            TaskResult::LoggedOut(Ok(())) => {
                self.status_message = Some("Logged out".to_string());
            }
            TaskResult::LoggedOut(Err(e)) => {
                self.status_message = Some(format!("Error: {}", e));
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chargemap_core::Location;

    fn identity(id: &str) -> Identity {
        Identity {
            id: id.to_string(),
            email: format!("{}@example.com", id),
            username: id.to_string(),
            full_name: String::new(),
        }
    }

    fn station(id: &str, owner: &str, status: StationStatus) -> Station {
        Station {
            id: id.to_string(),
            name: format!("Station {}", id),
            status,
            power_output: 22.0,
            connector_type: ConnectorType::TypeA,
            location: Location::new(12.0, 77.0),
            owner_id: owner.to_string(),
        }
    }

    fn app_with_stations() -> App {
        let mut app = App::new(Config::default()).expect("app");
        app.identity = Some(identity("u1"));
        app.station_data = Some(CachedData::new(vec![
            station("s1", "u1", StationStatus::Active),
            station("s2", "u2", StationStatus::Inactive),
            station("s3", "u1", StationStatus::Inactive),
        ]));
        app
    }

    #[test]
    fn test_tab_next_prev() {
        assert_eq!(Tab::Stations.next(), Tab::Map);
        assert_eq!(Tab::Map.next(), Tab::Stations);
        assert_eq!(Tab::Stations.prev(), Tab::Map);
    }

    #[test]
    fn test_ownership_gates_edit_and_delete() {
        let mut app = app_with_stations();

        app.station_selection = 1;
        app.open_edit_station();
        assert_eq!(app.state, AppState::Normal);
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());

        app.station_selection = 0;
        app.open_edit_station();
        assert_eq!(app.state, AppState::EditingStation);
        assert_eq!(app.station_form.editing_id.as_deref(), Some("s1"));

        app.close_station_form();
        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        assert_eq!(app.pending_delete.as_ref().map(|s| s.id.as_str()), Some("s1"));
    }

    #[test]
    fn test_signed_out_user_owns_nothing() {
        let mut app = app_with_stations();
        app.identity = None;
        assert!(app.all_stations().iter().all(|s| !app.is_owned(s)));
    }

    #[test]
    fn test_status_filter_cycles_and_resets_selection() {
        let mut app = app_with_stations();
        app.station_selection = 2;

        app.cycle_status_filter();
        assert_eq!(app.filter.status, Some(StationStatus::Active));
        assert_eq!(app.station_selection, 0);
        assert_eq!(app.visible_stations().len(), 1);

        app.cycle_status_filter();
        assert_eq!(app.visible_stations().len(), 2);

        app.cycle_status_filter();
        assert!(app.filter.is_empty());
        assert_eq!(app.visible_stations().len(), 3);
    }

    #[test]
    fn test_power_filter_rejects_garbage() {
        let mut app = app_with_stations();
        app.start_power_filter();
        app.power_filter_input = "fast".to_string();
        app.apply_power_filter();
        assert_eq!(app.state, AppState::EditingPowerFilter);
        assert!(app.filter.power_output.is_none());

        app.power_filter_input = "22".to_string();
        app.apply_power_filter();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.filter.power_output, Some(22.0));
        assert_eq!(app.visible_stations().len(), 3);
    }

    #[test]
    fn test_selection_is_clamped() {
        let mut app = app_with_stations();
        app.select_next(PAGE_SCROLL_SIZE);
        assert_eq!(app.station_selection, 2);
        app.select_prev(PAGE_SCROLL_SIZE);
        assert_eq!(app.station_selection, 0);
    }

    #[test]
    fn test_signup_mismatch_is_local() {
        let mut app = App::new(Config::default()).expect("app");
        app.start_signup();
        app.signup = SignupForm {
            username: "asha".to_string(),
            full_name: "Asha Rao".to_string(),
            email: "asha@example.com".to_string(),
            password: "one".to_string(),
            confirm_password: "two".to_string(),
        };
        app.submit_signup();
        assert_eq!(app.signup_error.as_deref(), Some("Passwords do not match"));
        assert!(!app.submitting);
    }

    #[test]
    fn test_login_requires_fields() {
        let mut app = App::new(Config::default()).expect("app");
        app.login_email.clear();
        app.submit_login();
        assert_eq!(app.login_error.as_deref(), Some(LOGIN_REQUIRED));
        assert!(!app.submitting);
    }

    #[test]
    fn test_invalid_station_form_stays_open() {
        let mut app = app_with_stations();
        app.open_new_station();
        app.submit_station_form();
        assert_eq!(app.state, AppState::EditingStation);
        assert_eq!(app.station_form.error.as_deref(), Some("Name is required"));
        assert!(!app.submitting);
    }

    #[test]
    fn test_login_failure_shows_server_message() {
        let mut app = App::new(Config::default()).expect("app");
        app.start_login();
        app.submitting = true;
        app.process_task_result(TaskResult::SignedIn {
            result: Err(ClientError::Auth("invalid credentials".to_string())),
            signup: false,
        });
        assert_eq!(app.state, AppState::LoggingIn);
        assert_eq!(app.login_error.as_deref(), Some("invalid credentials"));
        assert!(!app.submitting);
    }

    #[test]
    fn test_session_none_opens_login() {
        let mut app = App::new(Config::default()).expect("app");
        app.identity = Some(identity("u1"));
        app.process_task_result(TaskResult::Session(Fenced::Committed(None)));
        assert!(!app.is_authenticated());
        assert_eq!(app.state, AppState::LoggingIn);
    }

    #[test]
    fn test_failed_mutation_keeps_form_open() {
        let mut app = app_with_stations();
        app.open_new_station();
        app.submitting = true;
        app.process_task_result(TaskResult::StationMutated(Err(ClientError::Mutation(
            "Failed to add charger".to_string(),
        ))));
        assert_eq!(app.state, AppState::EditingStation);
        assert_eq!(app.station_form.error.as_deref(), Some("Failed to add charger"));
    }

    #[test]
    fn test_stations_result_clamps_selection() {
        let mut app = app_with_stations();
        app.station_selection = 2;
        app.loading = true;
        app.process_task_result(TaskResult::Stations {
            result: Ok(Some(CachedData::new(vec![station(
                "s1",
                "u1",
                StationStatus::Active,
            )]))),
            after_mutation: false,
        });
        assert!(!app.loading);
        assert_eq!(app.station_selection, 0);
        assert_eq!(app.all_stations().len(), 1);
    }

    #[tokio::test]
    async fn test_logout_clears_identity_immediately() {
        let mut app = app_with_stations();
        app.logout();
        assert!(!app.is_authenticated());
        assert_eq!(app.state, AppState::LoggingIn);

        app.process_task_result(TaskResult::LoggedOut(Err(ClientError::Auth(
            "Logout failed".to_string(),
        ))));
        assert!(!app.is_authenticated());
        assert_eq!(app.status_message.as_deref(), Some("Error: Logout failed"));
    }

    #[tokio::test]
    async fn test_login_success_message() {
        let mut app = App::new(Config::default()).expect("app");
        app.login_email.clear();
        app.start_login();
        app.submitting = true;
        app.process_task_result(TaskResult::SignedIn {
            result: Ok(identity("u1")),
            signup: false,
        });
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.status_message.as_deref(), Some("Login successful!"));
    }

    #[tokio::test]
    async fn test_overtaken_session_probe_keeps_fresh_login() {
        let mut app = App::new(Config::default()).expect("app");
        app.login_email.clear();
        app.status_message = Some(CHECKING_SESSION.to_string());
        app.start_login();
        app.process_task_result(TaskResult::SignedIn {
            result: Ok(identity("u1")),
            signup: false,
        });

        app.process_task_result(TaskResult::Session(Fenced::Superseded(None)));
        assert!(app.is_authenticated());
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.status_message.as_deref(), Some("Login successful!"));
    }

    #[test]
    fn test_overtaken_probe_clears_checking_message() {
        let mut app = App::new(Config::default()).expect("app");
        app.status_message = Some(CHECKING_SESSION.to_string());
        app.process_task_result(TaskResult::Session(Fenced::Superseded(None)));
        assert_eq!(app.status_message, None);
        assert!(!app.is_authenticated());
    }

    #[test]
    fn test_overtaken_station_list_is_dropped() {
        let mut app = app_with_stations();
        app.loading = true;
        app.process_task_result(TaskResult::Stations {
            result: Ok(None),
            after_mutation: false,
        });
        assert!(!app.loading);
        assert_eq!(app.all_stations().len(), 3);
    }

    #[test]
    fn test_failed_reload_after_delete_hides_deleted_station() {
        let mut app = app_with_stations();
        app.station_selection = 2;
        app.process_task_result(TaskResult::StationMutated(Ok("Deleted Station s1".to_string())));
        app.process_task_result(TaskResult::Stations {
            result: Err(ClientError::Fetch("Failed to fetch chargers".to_string())),
            after_mutation: true,
        });
        assert!(app.all_stations().iter().all(|s| s.id != "s1"));
        assert_eq!(app.station_selection, 0);
        assert_eq!(app.status_message.as_deref(), Some("Error: Failed to fetch chargers"));
    }

    #[test]
    fn test_failed_manual_refresh_keeps_list() {
        let mut app = app_with_stations();
        app.process_task_result(TaskResult::Stations {
            result: Err(ClientError::Fetch("Failed to fetch chargers".to_string())),
            after_mutation: false,
        });
        assert_eq!(app.all_stations().len(), 3);
    }

    #[tokio::test]
    async fn test_logout_drops_station_list() {
        let mut app = app_with_stations();
        app.station_selection = 1;
        app.logout();
        assert!(app.station_data.is_none());
        assert!(app.all_stations().is_empty());
        assert_eq!(app.station_selection, 0);
    }
}
