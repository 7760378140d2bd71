//! # user-service
//!
//! HTTP service over a collection of user records: single-record lookup,
//! creation, partial update and a filtered, paginated listing.
//!
//! ## Features
//!
//! - **Paginated listing**: total count and page fetch run concurrently
//!   against the same filter
//! - **Safe ordering**: sort tokens are resolved against a whitelist before
//!   they can reach SQL
//! - **Fixed error taxonomy**: seven error kinds with stable codes and HTTP
//!   statuses
//! - **Storage**: PostgreSQL via `sqlx`, or an in-memory store when no
//!   database is configured
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use user_service::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let config = Config::load()?;
//!     init_tracing(&config)?;
//!
//!     let store: Arc<dyn UserStore> = Arc::new(MemoryUserStore::new());
//!     let app = router(AppState::new(config.clone(), store));
//!
//!     Server::new(config).serve(app).await
//! }
//! ```

pub mod api;
pub mod config;
pub mod database;
pub mod error;
pub mod model;
pub mod observability;
pub mod paging;
pub mod repository;
pub mod server;
pub mod service;
pub mod state;

/// Commonly used types for wiring the service
pub mod prelude {
    pub use crate::api::{router, ApiError, ErrorKind};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::model::{Gender, NewUser, Status, User, UserFilter, UserPatch};
    pub use crate::observability::init_tracing;
    pub use crate::paging::{OrderSpec, PageRequest, Paginator};
    pub use crate::repository::{MemoryUserStore, PgUserStore, UserStore};
    pub use crate::server::Server;
    pub use crate::state::AppState;
}
