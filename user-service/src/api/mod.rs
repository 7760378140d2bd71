//! HTTP surface of the service
//!
//! - [`router`]: routes for the user resource plus the plain-text 404 fallback
//! - [`ApiError`] / [`ErrorKind`]: failure taxonomy and its wire rendering
//! - [`ItemResponse`]: the `{"data": ...}` success envelope

mod error;
mod handlers;
mod response;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Router,
};

pub use error::{ApiError, ErrorKind};
pub use handlers::{create_user, get_user, list_users, patch_user, ListUsersParams};
pub use response::{ItemResponse, UserBody, UserListBody};

use crate::state::AppState;

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/user", post(create_user))
        .route("/user/{id}", get(get_user).patch(patch_user))
        .route("/users", get(list_users))
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "404 not found")
}
