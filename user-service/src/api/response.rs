//! Success response types
//!
//! Every successful response is `200 OK` with the payload under `data`.
//!
//! # Example
//!
//! ```rust
//! use user_service::api::{ItemResponse, UserBody};
//! use user_service::model::{Gender, User};
//!
//! let user = User { id: 1, name: "ql".to_string(), gender: Gender::Male, status: None };
//! let response = ItemResponse::new(UserBody { user });
//! assert_eq!(response.data.user.id, 1);
//! ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::model::User;
use crate::paging::{Page, Paginator};

/// Envelope for a successful response
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemResponse<T> {
    /// The response data
    pub data: T,
}

impl<T> ItemResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

impl<T: Serialize> IntoResponse for ItemResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// `data` of single-user responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserBody {
    pub user: User,
}

/// `data` of the user listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserListBody {
    pub users: Vec<User>,
    pub paginator: Paginator,
}

impl From<Page<User>> for UserListBody {
    fn from(page: Page<User>) -> Self {
        Self {
            users: page.items,
            paginator: page.paginator,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gender;
    use crate::paging::PageRequest;

    #[tokio::test]
    async fn test_list_body_shape() {
        let page = Page {
            items: vec![User {
                id: 1,
                name: "ql".to_string(),
                gender: Gender::Female,
                status: None,
            }],
            paginator: Paginator::new(PageRequest::new(1, 10), 1),
        };
        let response = ItemResponse::new(UserListBody::from(page)).into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["data"]["users"][0]["gender"], "FEMALE");
        assert_eq!(json["data"]["paginator"]["total_record"], 1);
        assert_eq!(json["data"]["paginator"]["next_page"], 1);
    }
}
