//! User persistence
//!
//! [`UserStore`] is the seam between the service and its storage. Two
//! backends implement it:
//!
//! - [`PgUserStore`]: PostgreSQL through `sqlx`
//! - [`MemoryUserStore`]: a process-local map, used when no database is
//!   configured and throughout the tests
//!
//! Backend failures surface as [`RepositoryError`].

mod error;
mod memory;
mod postgres;
mod traits;

// Re-export all public types
pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::MemoryUserStore;
pub use postgres::PgUserStore;
pub use traits::{RepositoryResult, UserStore};
