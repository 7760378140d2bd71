//! Store trait for user records
//!
//! [`UserStore`] is object-safe so handlers can hold an `Arc<dyn UserStore>`
//! and the paginator can hand clones of that handle to spawned tasks.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use user_service::repository::{MemoryUserStore, UserStore};
//!
//! let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
//! # let _ = store;
//! ```

use async_trait::async_trait;

use super::error::{RepositoryError, RepositoryOperation};
use crate::model::{NewUser, User, UserFilter, UserId, UserPatch};
use crate::paging::{OrderSpec, Window};

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Persistence operations over the user collection
///
/// Implementations must be safe to call concurrently from several tasks;
/// a listing issues `count` and `fetch` at the same time against one store.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by identifier
    ///
    /// Returns `Ok(None)` when no record has this id.
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>>;

    /// Count users matching the filter
    async fn count(&self, filter: &UserFilter) -> RepositoryResult<i64>;

    /// Fetch one window of users matching the filter, in the given order
    async fn fetch(
        &self,
        filter: &UserFilter,
        order: &OrderSpec,
        window: Window,
    ) -> RepositoryResult<Vec<User>>;

    /// Insert a user and return it with its assigned identifier
    ///
    /// A blank name is rejected with `ValidationFailed`.
    async fn create(&self, user: NewUser) -> RepositoryResult<User>;

    /// Apply a partial update
    ///
    /// Updating an id that does not exist is not an error here; callers read
    /// the record back to detect that. A blank replacement name is rejected.
    async fn update(&self, id: UserId, patch: UserPatch) -> RepositoryResult<()>;
}

/// Reject names that are empty or only whitespace
pub(crate) fn check_name(name: &str, operation: RepositoryOperation) -> RepositoryResult<()> {
    if name.trim().is_empty() {
        return Err(RepositoryError::validation_failed(
            operation,
            "name must not be empty",
        ));
    }
    Ok(())
}
