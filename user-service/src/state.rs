//! Application state management

use std::sync::Arc;

use crate::config::{Config, PagingConfig};
use crate::repository::UserStore;
use crate::service::UserService;

/// Application state shared across handlers
#[derive(Clone, Debug)]
pub struct AppState {
    config: Arc<Config>,
    users: UserService,
}

impl AppState {
    /// Create a new AppState over the given store
    pub fn new(config: Config, store: Arc<dyn UserStore>) -> Self {
        Self {
            config: Arc::new(config),
            users: UserService::new(store),
        }
    }

    pub fn users(&self) -> &UserService {
        &self.users
    }

    /// Page-size bounds applied to listing requests
    pub fn paging(&self) -> PagingConfig {
        self.config.paging
    }
}
