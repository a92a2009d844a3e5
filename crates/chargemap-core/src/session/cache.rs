use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::AuthApi;
use crate::error::{ClientError, Result};
use crate::fence::{Fenced, RequestFence, Watermark};
use crate::models::{Identity, LoginRequest, SignupForm};

const LOGIN_FAILED: &str = "Something went wrong";
const SIGNUP_FAILED: &str = "Signup failed";
const LOGOUT_FAILED: &str = "Logout failed";
pub const PASSWORDS_DO_NOT_MATCH: &str = "Passwords do not match";

/// What the client currently believes about the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStatus {
    /// Never probed, or invalidated by a login/signup and not yet re-probed.
    Unknown,
    Authenticated(Identity),
    Unauthenticated,
}

impl SessionStatus {
    pub fn identity(&self) -> Option<&Identity> {
        match self {
            SessionStatus::Authenticated(identity) => Some(identity),
            SessionStatus::Unknown | SessionStatus::Unauthenticated => None,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    status: SessionStatus,
    watermark: Watermark,
}

/// Owns the signed-in identity.
///
/// Clones share state; hand one to each task that needs the session.
pub struct SessionCache<A> {
    api: Arc<A>,
    fence: Arc<RequestFence>,
    state: Arc<RwLock<SessionState>>,
}

impl<A> Clone for SessionCache<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            fence: Arc::clone(&self.fence),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: AuthApi> SessionCache<A> {
    pub fn new(api: A) -> Self {
        Self::with_shared(Arc::new(api))
    }

    pub fn with_shared(api: Arc<A>) -> Self {
        Self {
            api,
            fence: Arc::new(RequestFence::new()),
            state: Arc::new(RwLock::new(SessionState {
                status: SessionStatus::Unknown,
                watermark: Watermark::default(),
            })),
        }
    }

    pub async fn status(&self) -> SessionStatus {
        self.state.read().await.status.clone()
    }

    pub async fn identity(&self) -> Option<Identity> {
        self.state.read().await.status.identity().cloned()
    }

    /// Ask the API who we are.
    ///
    /// Never fails: any error, including a success status with an `error`
    /// body, means "not signed in". Always goes to the network.
    pub async fn probe(&self) -> Option<Identity> {
        self.probe_fenced().await.into_inner()
    }

    /// Like [`probe`](Self::probe), but also reports whether the answer was
    /// committed. A superseded answer predates a login, signup or logout and
    /// says nothing about the current session.
    pub async fn probe_fenced(&self) -> Fenced<Option<Identity>> {
        let ticket = self.fence.issue();

        let identity = match self.api.me().await {
            Ok(identity) => Some(identity),
            Err(e) => {
                debug!(error = %e, "Session probe failed, treating as signed out");
                None
            }
        };

        let mut state = self.state.write().await;
        if state.watermark.admit(ticket) {
            state.status = match identity {
                Some(ref identity) => SessionStatus::Authenticated(identity.clone()),
                None => SessionStatus::Unauthenticated,
            };
            Fenced::Committed(identity)
        } else {
            debug!("Discarding session probe older than current state");
            Fenced::Superseded(identity)
        }
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<Identity> {
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        match self.api.login(&request).await {
            Ok(identity) => {
                info!(user = %identity.username, "Login successful");
                self.set_status(SessionStatus::Unknown).await;
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Login failed");
                Err(ClientError::auth(&e, LOGIN_FAILED))
            }
        }
    }

    /// Create an account. A password/confirmation mismatch is rejected
    /// without contacting the API.
    pub async fn signup(&self, form: &SignupForm) -> Result<Identity> {
        if !form.passwords_match() {
            return Err(ClientError::Validation(PASSWORDS_DO_NOT_MATCH.to_string()));
        }

        match self.api.signup(&form.request()).await {
            Ok(identity) => {
                info!(user = %identity.username, "Signup successful");
                self.set_status(SessionStatus::Unknown).await;
                Ok(identity)
            }
            Err(e) => {
                warn!(error = %e, "Signup failed");
                Err(ClientError::auth(&e, SIGNUP_FAILED))
            }
        }
    }

    /// End the session.
    ///
    /// The local session is cleared before the request is sent and stays
    /// cleared even if the request fails; the error is still returned so it
    /// can be reported.
    pub async fn logout(&self) -> Result<()> {
        self.set_status(SessionStatus::Unauthenticated).await;

        match self.api.logout().await {
            Ok(()) => {
                info!("Logged out");
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Logout request failed, local session already cleared");
                Err(ClientError::auth(&e, LOGOUT_FAILED))
            }
        }
    }

    /// Replace the status as a new event in the fence timeline.
    async fn set_status(&self, status: SessionStatus) {
        let ticket = self.fence.issue();
        let mut state = self.state.write().await;
        if state.watermark.admit(ticket) {
            state.status = status;
        }
    }
}
