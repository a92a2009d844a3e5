//! Request fencing for cached values.
//!
//! Every read takes a `Ticket` before it goes to the network, and every
//! invalidation takes one when it happens. A cache commits a result only if
//! its ticket is newer than the `Watermark` stored next to the cached value,
//! so a slow response can never overwrite state that a later read or
//! invalidation already produced.

use std::sync::atomic::{AtomicU64, Ordering};

/// Position of one operation in a cache's timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// Issues strictly increasing tickets. One per cache.
#[derive(Debug, Default)]
pub struct RequestFence {
    issued: AtomicU64,
}

impl RequestFence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> Ticket {
        Ticket(self.issued.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// The newest ticket reflected in a cached value.
///
/// Lives under the same lock as the value it guards.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Watermark(u64);

impl Watermark {
    /// Record `ticket` and return true if it is newer than anything seen so far.
    pub fn admit(&mut self, ticket: Ticket) -> bool {
        if ticket.0 > self.0 {
            self.0 = ticket.0;
            true
        } else {
            false
        }
    }
}

/// A response together with whether the cache kept it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fenced<T> {
    /// The cache now reflects this value.
    Committed(T),
    /// A later read or invalidation got there first; the cache ignored it.
    Superseded(T),
}

impl<T> Fenced<T> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Fenced::Committed(_))
    }

    /// The value, only if the cache kept it.
    pub fn committed(self) -> Option<T> {
        match self {
            Fenced::Committed(value) => Some(value),
            Fenced::Superseded(_) => None,
        }
    }

    pub fn into_inner(self) -> T {
        match self {
            Fenced::Committed(value) | Fenced::Superseded(value) => value,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Fenced<U> {
        match self {
            Fenced::Committed(value) => Fenced::Committed(f(value)),
            Fenced::Superseded(value) => Fenced::Superseded(f(value)),
        }
    }
}
