use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::api::StationApi;
use crate::error::{ClientError, Result};
use crate::fence::{Fenced, RequestFence, Watermark};
use crate::models::{NewStation, Station, StationFields};

const FETCH_FAILED: &str = "Failed to fetch chargers";
const CREATE_FAILED: &str = "Failed to add charger";
const UPDATE_FAILED: &str = "Failed to update charger";
const DELETE_FAILED: &str = "Failed to delete charger";

#[derive(Debug, Clone)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

impl<T> CachedData<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    pub fn age_minutes(&self) -> i64 {
        let now = Utc::now();
        (now - self.cached_at).num_minutes()
    }

    pub fn age_display(&self) -> String {
        let minutes = self.age_minutes();
        if minutes < 1 {
            // Also covers clock skew
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if minutes < 1440 {
            let hours = minutes / 60;
            if minutes % 60 >= 30 {
                format!("{}h ago", hours + 1)
            } else {
                format!("{}h ago", hours)
            }
        } else {
            let days = minutes / 1440;
            if (minutes % 1440) / 60 >= 12 {
                format!("{}d ago", days + 1)
            } else {
                format!("{}d ago", days)
            }
        }
    }
}

#[derive(Debug, Default)]
struct CollectionState {
    /// `None` until the first fetch and after every invalidation.
    entry: Option<CachedData<Vec<Station>>>,
    watermark: Watermark,
}

/// Owns the station list.
///
/// Mutations never patch the list; they invalidate it so the next read
/// refetches from the API. Clones share state.
pub struct StationCache<A> {
    api: Arc<A>,
    fence: Arc<RequestFence>,
    state: Arc<RwLock<CollectionState>>,
}

impl<A> Clone for StationCache<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            fence: Arc::clone(&self.fence),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: StationApi> StationCache<A> {
    pub fn new(api: A) -> Self {
        Self::with_shared(Arc::new(api))
    }

    pub fn with_shared(api: Arc<A>) -> Self {
        Self {
            api,
            fence: Arc::new(RequestFence::new()),
            state: Arc::new(RwLock::new(CollectionState::default())),
        }
    }

    /// The held collection, if it has been fetched and not invalidated since.
    pub async fn snapshot(&self) -> Option<CachedData<Vec<Station>>> {
        self.state.read().await.entry.clone()
    }

    /// Cached stations, fetching only when nothing valid is held.
    pub async fn list(&self) -> Result<Vec<Station>> {
        Ok(self.list_fenced().await?.into_inner().data)
    }

    /// Fetch the full collection and replace the cached one.
    pub async fn refresh(&self) -> Result<Vec<Station>> {
        Ok(self.refresh_fenced().await?.into_inner().data)
    }

    /// [`list`](Self::list), reporting whether the result is what the cache holds.
    pub async fn list_fenced(&self) -> Result<Fenced<CachedData<Vec<Station>>>> {
        if let Some(ref entry) = self.state.read().await.entry {
            return Ok(Fenced::Committed(entry.clone()));
        }
        self.refresh_fenced().await
    }

    /// [`refresh`](Self::refresh), reporting whether the fetched list was
    /// committed or lost to a later read or invalidation.
    pub async fn refresh_fenced(&self) -> Result<Fenced<CachedData<Vec<Station>>>> {
        let ticket = self.fence.issue();

        let stations = self.api.fetch_stations().await.map_err(|e| {
            warn!(error = %e, "Failed to fetch stations");
            ClientError::fetch(&e, FETCH_FAILED)
        })?;
        let fetched = CachedData::new(stations);

        let mut state = self.state.write().await;
        if state.watermark.admit(ticket) {
            debug!(count = fetched.data.len(), "Station list cached");
            state.entry = Some(fetched.clone());
            Ok(Fenced::Committed(fetched))
        } else {
            debug!("Discarding station list older than current state");
            Ok(Fenced::Superseded(fetched))
        }
    }

    pub async fn create(&self, fields: &StationFields, owner_id: &str) -> Result<Station> {
        let body = NewStation {
            fields,
            user: owner_id,
        };
        let station = self.api.create_station(&body).await.map_err(|e| {
            warn!(error = %e, "Failed to create station");
            ClientError::mutation(&e, CREATE_FAILED)
        })?;

        info!(id = %station.id, name = %station.name, "Station created");
        self.invalidate().await;
        Ok(station)
    }

    pub async fn update(&self, id: &str, fields: &StationFields) -> Result<Station> {
        let station = self.api.update_station(id, fields).await.map_err(|e| {
            warn!(id = id, error = %e, "Failed to update station");
            ClientError::mutation(&e, UPDATE_FAILED)
        })?;

        info!(id = id, "Station updated");
        self.invalidate().await;
        Ok(station)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.api.delete_station(id).await.map_err(|e| {
            warn!(id = id, error = %e, "Failed to delete station");
            ClientError::mutation(&e, DELETE_FAILED)
        })?;

        info!(id = id, "Station deleted");
        self.invalidate().await;
        Ok(())
    }

    /// Drop the held collection; reads issued before this call can no longer fill it.
    pub async fn invalidate(&self) {
        let ticket = self.fence.issue();
        let mut state = self.state.write().await;
        if state.watermark.admit(ticket) {
            state.entry = None;
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
