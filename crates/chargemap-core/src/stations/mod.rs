//! Station collection caching.
//!
//! `StationCache` holds the station list fetched from the API, in memory
//! only. Any successful create, update or delete invalidates the whole list
//! rather than patching it, so the client never shows a list the server
//! has not returned.

pub mod cache;

pub use cache::{CachedData, StationCache};
