//! Paginated listing
//!
//! - [`OrderSpec`]: whitelist-validated single-field sort
//! - [`PageRequest`] and [`Paginator`]: page arithmetic and the metadata
//!   returned to clients
//! - [`paginate`]: concurrent count and fetch against a [`UserStore`]
//!
//! [`UserStore`]: crate::repository::UserStore

mod order;
mod paginator;

pub use order::{OrderDirection, OrderSpec, USER_DEFAULT_SORT, USER_SORTABLE_FIELDS};
pub use paginator::{paginate, Page, PageRequest, Paginator, Window, DEFAULT_LIMIT};
