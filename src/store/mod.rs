//! # Store Module
//!
//! In-memory user records for the lifetime of the process.
//!
//! ## Overview
//!
//! [`UserStore`] owns the ordered list of [`User`] records and the id counter.
//! All mutation goes through its operations (`create`, `update`, `delete`);
//! the backing `Vec` is never exposed mutably.
//!
//! Handlers share one store through [`SharedStore`], an `Arc<Mutex<UserStore>>`.
//! Each operation takes the lock for its own duration only, so a request that
//! is still waiting on its body never blocks other requests.
//!
//! ## Id Allocation
//!
//! Ids come from a counter that only moves forward. Deleting the newest
//! record does not make its id available again:
//!
//! ```rust
//! use firstapp::store::UserStore;
//!
//! let mut store = UserStore::seeded();
//! store.delete(2).unwrap();
//! let user = store.create(Some("Ada"), Some("ada@example.com")).unwrap();
//! assert_eq!(user.id, 3);
//! ```

mod core;
mod user;

pub use core::{lock, shared, SharedStore, UserStore};
pub use user::{non_empty_field, User, UserPatch};
