//! In-memory stand-in for the remote API, used by the cache tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use reqwest::StatusCode;
use tokio::sync::Semaphore;

use crate::api::{ApiError, AuthApi, StationApi};
use crate::models::{
    ConnectorType, Identity, Location, LoginRequest, NewStation, SignupRequest, Station,
    StationFields, StationStatus,
};

pub fn identity(id: &str, email: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: email.to_string(),
        username: id.to_string(),
        full_name: format!("User {}", id),
    }
}

pub fn station(id: &str, name: &str, owner: &str) -> Station {
    Station {
        id: id.to_string(),
        name: name.to_string(),
        status: StationStatus::Active,
        power_output: 22.0,
        connector_type: ConnectorType::TypeA,
        location: Location::new(20.0, 78.0),
        owner_id: owner.to_string(),
    }
}

#[derive(Default)]
struct World {
    users: Vec<(Identity, String)>,
    signed_in: Option<Identity>,
    stations: Vec<Station>,
    next_id: u32,
    calls: HashMap<&'static str, usize>,
    me_error_body: Option<String>,
    auth_fails_silently: bool,
    logout_fails: bool,
    fetch_fails: bool,
    mutations_fail: bool,
    me_gate: Option<Arc<Semaphore>>,
    fetch_gate: Option<Arc<Semaphore>>,
}

pub struct FakeApi {
    world: Mutex<World>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self {
            world: Mutex::new(World::default()),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut World) -> R) -> R {
        f(&mut self.world.lock().expect("fake api lock"))
    }

    fn record(&self, call: &'static str) {
        self.with(|w| *w.calls.entry(call).or_default() += 1);
    }

    pub fn calls_to(&self, call: &str) -> usize {
        self.with(|w| w.calls.get(call).copied().unwrap_or(0))
    }

    pub fn total_calls(&self) -> usize {
        self.with(|w| w.calls.values().sum())
    }

    pub fn add_user(&self, identity: Identity, password: &str) {
        self.with(|w| w.users.push((identity, password.to_string())));
    }

    pub fn seed_station(&self, station: Station) {
        self.with(|w| w.stations.push(station));
    }

    pub fn expire_session(&self) {
        self.with(|w| w.signed_in = None);
    }

    pub fn set_me_error_body(&self, message: &str) {
        self.with(|w| w.me_error_body = Some(message.to_string()));
    }

    pub fn fail_auth_silently(&self) {
        self.with(|w| w.auth_fails_silently = true);
    }

    pub fn fail_logout(&self) {
        self.with(|w| w.logout_fails = true);
    }

    pub fn fail_fetch(&self) {
        self.with(|w| w.fetch_fails = true);
    }

    pub fn fail_mutations(&self) {
        self.with(|w| w.mutations_fail = true);
    }

    /// Make `me` wait for a permit after computing its answer.
    pub fn hold_me(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.with(|w| w.me_gate = Some(Arc::clone(&gate)));
        gate
    }

    /// Make `fetch_stations` wait for a permit after computing its answer.
    pub fn hold_fetch(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.with(|w| w.fetch_gate = Some(Arc::clone(&gate)));
        gate
    }

    fn rejected(status: StatusCode, message: &str) -> ApiError {
        ApiError::from_status(status, &format!(r#"{{"error":"{}"}}"#, message))
    }

    async fn pass(gate: Option<Arc<Semaphore>>) {
        if let Some(gate) = gate {
            let _permit = gate.acquire().await.expect("gate closed");
        }
    }
}

impl AuthApi for FakeApi {
    async fn me(&self) -> Result<Identity, ApiError> {
        self.record("me");
        let (answer, gate) = self.with(|w| {
            let answer = match (&w.me_error_body, &w.signed_in) {
                (Some(message), _) => Err(ApiError::ErrorBody(message.clone())),
                (None, Some(identity)) => Ok(identity.clone()),
                (None, None) => Err(Self::rejected(StatusCode::UNAUTHORIZED, "Unauthorized")),
            };
            (answer, w.me_gate.clone())
        });
        Self::pass(gate).await;
        answer
    }

    async fn login(&self, request: &LoginRequest) -> Result<Identity, ApiError> {
        self.record("login");
        self.with(|w| {
            if w.auth_fails_silently {
                return Err(ApiError::ServerError(String::new()));
            }
            let found = w
                .users
                .iter()
                .find(|(i, p)| i.email == request.email && *p == request.password)
                .map(|(i, _)| i.clone());
            match found {
                Some(identity) => {
                    w.signed_in = Some(identity.clone());
                    Ok(identity)
                }
                None => Err(Self::rejected(StatusCode::BAD_REQUEST, "invalid credentials")),
            }
        })
    }

    async fn signup(&self, request: &SignupRequest<'_>) -> Result<Identity, ApiError> {
        self.record("signup");
        self.with(|w| {
            if w.users.iter().any(|(i, _)| i.email == request.email) {
                return Err(Self::rejected(StatusCode::BAD_REQUEST, "User already exists"));
            }
            w.next_id += 1;
            let identity = Identity {
                id: format!("u{}", w.next_id),
                email: request.email.to_string(),
                username: request.username.to_string(),
                full_name: request.fullname.to_string(),
            };
            w.users.push((identity.clone(), request.password.to_string()));
            w.signed_in = Some(identity.clone());
            Ok(identity)
        })
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record("logout");
        self.with(|w| {
            if w.logout_fails {
                return Err(ApiError::ServerError(String::new()));
            }
            w.signed_in = None;
            Ok(())
        })
    }
}

impl StationApi for FakeApi {
    async fn fetch_stations(&self) -> Result<Vec<Station>, ApiError> {
        self.record("fetch_stations");
        let (answer, gate) = self.with(|w| {
            let answer = if w.fetch_fails {
                Err(ApiError::ServerError("<html>".to_string()))
            } else {
                Ok(w.stations.clone())
            };
            (answer, w.fetch_gate.clone())
        });
        Self::pass(gate).await;
        answer
    }

    async fn create_station(&self, station: &NewStation<'_>) -> Result<Station, ApiError> {
        self.record("create_station");
        self.with(|w| {
            if w.mutations_fail {
                return Err(ApiError::ServerError(String::new()));
            }
            w.next_id += 1;
            let created = Station {
                id: format!("s{}", 100 + w.next_id),
                name: station.fields.name.clone(),
                status: station.fields.status,
                power_output: station.fields.power_output,
                connector_type: station.fields.connector_type,
                location: station.fields.location,
                owner_id: station.user.to_string(),
            };
            w.stations.push(created.clone());
            Ok(created)
        })
    }

    async fn update_station(&self, id: &str, fields: &StationFields) -> Result<Station, ApiError> {
        self.record("update_station");
        self.with(|w| {
            if w.mutations_fail {
                return Err(ApiError::ServerError(String::new()));
            }
            let existing = w
                .stations
                .iter_mut()
                .find(|s| s.id == id)
                .ok_or_else(|| Self::rejected(StatusCode::NOT_FOUND, "Station not found"))?;
            existing.name = fields.name.clone();
            existing.status = fields.status;
            existing.power_output = fields.power_output;
            existing.connector_type = fields.connector_type;
            existing.location = fields.location;
            Ok(existing.clone())
        })
    }

    async fn delete_station(&self, id: &str) -> Result<(), ApiError> {
        self.record("delete_station");
        self.with(|w| {
            if w.mutations_fail {
                return Err(ApiError::ServerError(String::new()));
            }
            let before = w.stations.len();
            w.stations.retain(|s| s.id != id);
            if w.stations.len() == before {
                return Err(Self::rejected(StatusCode::NOT_FOUND, "Station not found"));
            }
            Ok(())
        })
    }
}
