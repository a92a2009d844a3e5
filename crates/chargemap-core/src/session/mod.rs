//! Session management.
//!
//! `SessionCache` tracks who is signed in. It is derived from the API's
//! "who am I" endpoint and never trusted across calls: every probe
//! re-queries. Login and signup invalidate it; logout clears it locally
//! before the request goes out.

pub mod cache;

pub use cache::{SessionCache, SessionStatus, PASSWORDS_DO_NOT_MATCH};
