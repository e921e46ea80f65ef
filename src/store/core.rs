use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info};

use super::user::{User, UserPatch};
use crate::error::ApiError;

/// Store handle shared between handler invocations.
pub type SharedStore = Arc<Mutex<UserStore>>;

/// Wrap a store for sharing across coroutines.
#[must_use]
pub fn shared(store: UserStore) -> SharedStore {
    Arc::new(Mutex::new(store))
}

/// Lock the shared store.
///
/// A panic inside a store operation cannot leave the record list half
/// written (every mutation is a single `Vec` call), so a poisoned lock is
/// recovered rather than propagated.
pub fn lock(store: &SharedStore) -> MutexGuard<'_, UserStore> {
    store.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Ordered collection of users with a forward-only id counter.
#[derive(Debug, Clone)]
pub struct UserStore {
    users: Vec<User>,
    next_id: u64,
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}

impl UserStore {
    /// Create an empty store whose first id will be 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            next_id: 1,
        }
    }

    /// Create a store holding the two startup records.
    #[must_use]
    pub fn seeded() -> Self {
        let mut store = Self::new();
        store.insert("John Doe", "john@example.com");
        store.insert("Jane Smith", "jane@example.com");
        store
    }

    fn insert(&mut self, name: &str, email: &str) -> User {
        let user = User::new(self.next_id, name, email);
        self.next_id += 1;
        self.users.push(user.clone());
        user
    }

    fn position(&self, id: u64) -> Option<usize> {
        self.users.iter().position(|u| u.id == id)
    }

    /// All records in insertion order.
    #[must_use]
    pub fn list(&self) -> &[User] {
        &self.users
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    #[must_use]
    pub fn contains(&self, id: u64) -> bool {
        self.position(id).is_some()
    }

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no record has this id.
    pub fn get(&self, id: u64) -> Result<&User, ApiError> {
        self.users
            .iter()
            .find(|u| u.id == id)
            .ok_or(ApiError::NotFound)
    }

    /// Append a new record with the next id.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when `name` or `email` is missing or empty.
    pub fn create(&mut self, name: Option<&str>, email: Option<&str>) -> Result<User, ApiError> {
        let (name, email) = match (name, email) {
            (Some(n), Some(e)) if !n.is_empty() && !e.is_empty() => (n, e),
            _ => return Err(ApiError::Validation),
        };
        let user = self.insert(name, email);
        info!(user_id = user.id, total_users = self.users.len(), "User created");
        Ok(user)
    }

    /// Overwrite the fields present in `patch`, keeping the id and the rest.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no record has this id.
    pub fn update(&mut self, id: u64, patch: UserPatch) -> Result<User, ApiError> {
        let idx = self.position(id).ok_or(ApiError::NotFound)?;
        let user = &mut self.users[idx];
        if let Some(name) = patch.name {
            user.name = name;
        }
        if let Some(email) = patch.email {
            user.email = email;
        }
        debug!(user_id = id, "User updated");
        Ok(user.clone())
    }

    /// Remove a record and hand it back.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when no record has this id.
    pub fn delete(&mut self, id: u64) -> Result<User, ApiError> {
        let idx = self.position(id).ok_or(ApiError::NotFound)?;
        let removed = self.users.remove(idx);
        info!(user_id = id, total_users = self.users.len(), "User deleted");
        Ok(removed)
    }
}
