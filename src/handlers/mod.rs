//! # Handlers
//!
//! One function per route. Each takes the shared [`AppState`] and the
//! [`HandlerRequest`](crate::dispatcher::HandlerRequest) and returns a
//! [`HandlerResponse`](crate::dispatcher::HandlerResponse). Failures are
//! [`ApiError`](crate::error::ApiError)s converted at the handler boundary,
//! so nothing a client sends can escape as a panic or a transport error.

mod api;
mod users;

pub use api::{describe_api, health_check, ENDPOINTS};
pub use users::{create_user, delete_user, get_user, list_users, update_user};

use crate::store::{shared, SharedStore, UserStore};
use std::sync::Arc;
use std::time::Instant;

/// State shared by every handler
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    /// Reference point for the health check's `uptime`.
    ///
    /// Defaults to when the state was built; the binary resets it to the
    /// moment the process started with [`AppState::with_start_time`].
    pub started_at: Instant,
}

impl AppState {
    pub fn new(store: UserStore) -> Self {
        Self {
            store: shared(store),
            started_at: Instant::now(),
        }
    }

    /// State backed by the two seed users
    #[must_use]
    pub fn seeded() -> Self {
        Self::new(UserStore::seeded())
    }

    /// Measure uptime from `started_at` instead of from construction.
    #[must_use]
    pub fn with_start_time(mut self, started_at: Instant) -> Self {
        self.started_at = started_at;
        self
    }

    /// Another handle to the same store and start time.
    #[must_use]
    pub fn share(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            started_at: self.started_at,
        }
    }
}
