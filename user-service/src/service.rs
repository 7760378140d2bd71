//! User operations behind the HTTP handlers
//!
//! [`UserService`] owns the store handle and turns every store outcome into
//! either a value or a classified [`ApiError`].

use std::sync::Arc;

use crate::api::ApiError;
use crate::model::{NewUser, User, UserFilter, UserId, UserPatch};
use crate::paging::{paginate, OrderSpec, Page, PageRequest};
use crate::repository::UserStore;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn UserStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Fetch one user, or `NotFound`
    pub async fn get_user(&self, id: UserId) -> Result<User, ApiError> {
        self.store
            .find_by_id(id)
            .await?
            .ok_or_else(|| ApiError::not_found(format!("user {id} not found")))
    }

    /// Store a new user; the id is assigned by the store and status starts unset
    pub async fn create_user(&self, user: NewUser) -> Result<User, ApiError> {
        let created = self.store.create(user).await?;
        tracing::info!(user_id = created.id, "user created");
        Ok(created)
    }

    /// Apply `patch` and return the record as stored afterwards
    ///
    /// A missing id is reported by the read-back, not the update.
    pub async fn patch_user(&self, id: UserId, patch: UserPatch) -> Result<User, ApiError> {
        self.store.update(id, patch).await?;
        self.get_user(id).await
    }

    pub async fn list_users(
        &self,
        filter: UserFilter,
        order: OrderSpec,
        request: PageRequest,
    ) -> Result<Page<User>, ApiError> {
        paginate(Arc::clone(&self.store), filter, order, request).await
    }
}

impl std::fmt::Debug for UserService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserService").finish_non_exhaustive()
    }
}
