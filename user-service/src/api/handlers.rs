//! HTTP handlers for the user resource
//!
//! Extractor rejections are taken as `Result`s and converted into
//! [`ApiError`]s so that malformed input always produces the standard error
//! body with the `InvalidParameter` code.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};
use serde::Deserialize;

use super::error::ApiError;
use super::response::{ItemResponse, UserBody, UserListBody};
use crate::config::PagingConfig;
use crate::model::{Gender, NewUser, UserFilter, UserId, UserPatch};
use crate::paging::{OrderSpec, PageRequest};
use crate::state::AppState;

/// Query string of `GET /users`
///
/// Everything arrives as text so that bad numbers can fall back to defaults
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListUsersParams {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub order_by: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListUsersParams {
    /// Equality filter from `name` and `gender`; empty values mean "any"
    pub fn filter(&self) -> Result<UserFilter, ApiError> {
        let mut filter = UserFilter::new();

        if let Some(name) = non_empty(&self.name) {
            filter = filter.with_name(name);
        }
        if let Some(gender) = non_empty(&self.gender) {
            let gender: Gender = gender
                .parse()
                .map_err(|e| ApiError::invalid_parameter(format!("{e}")))?;
            filter = filter.with_gender(gender);
        }

        Ok(filter)
    }

    pub fn order(&self) -> OrderSpec {
        OrderSpec::for_users(self.order_by.as_deref().unwrap_or_default())
    }

    /// Page and limit after applying the configured bounds
    ///
    /// Unparseable values fall back to page 1 and `max_size`. The limit is
    /// clamped to `max_size` and negative limits become 0.
    pub fn page_request(&self, paging: PagingConfig) -> PageRequest {
        let page = parse_or(&self.page, 1);
        let limit = parse_or(&self.limit, paging.max_size).clamp(0, paging.max_size.max(0));
        PageRequest::new(page, limit)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn parse_or(value: &Option<String>, default: i64) -> i64 {
    value
        .as_deref()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `GET /user/{id}`
pub async fn get_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
) -> Result<ItemResponse<UserBody>, ApiError> {
    let Path(id) = id?;
    let user = state.users().get_user(id).await?;
    Ok(ItemResponse::new(UserBody { user }))
}

/// `GET /users`
pub async fn list_users(
    State(state): State<AppState>,
    params: Result<Query<ListUsersParams>, QueryRejection>,
) -> Result<ItemResponse<UserListBody>, ApiError> {
    let Query(params) = params?;

    let page = state
        .users()
        .list_users(
            params.filter()?,
            params.order(),
            params.page_request(state.paging()),
        )
        .await?;

    Ok(ItemResponse::new(page.into()))
}

/// `POST /user`
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<NewUser>, JsonRejection>,
) -> Result<ItemResponse<UserBody>, ApiError> {
    let Json(new_user) = payload?;
    let user = state.users().create_user(new_user).await?;
    Ok(ItemResponse::new(UserBody { user }))
}

/// `PATCH /user/{id}`
pub async fn patch_user(
    State(state): State<AppState>,
    id: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UserPatch>, JsonRejection>,
) -> Result<ItemResponse<UserBody>, ApiError> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let user = state.users().patch_user(id, patch).await?;
    Ok(ItemResponse::new(UserBody { user }))
}
