//! Offset pagination over a [`UserStore`]
//!
//! [`paginate`] runs the total count and the window fetch for one listing as
//! two concurrent tasks and folds the results into a [`Page`]. The two reads
//! are not isolated from each other: a write landing between them can make
//! `total_record` and the returned items disagree slightly.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinError;

use super::order::OrderSpec;
use crate::api::ApiError;
use crate::model::{User, UserFilter};
use crate::repository::{RepositoryResult, UserStore};

/// Page size used when a request asks for zero items
pub const DEFAULT_LIMIT: i64 = 10;

/// Page number and size as requested by a caller
///
/// Upper bounds on `limit` are enforced by whoever builds the request; this
/// type only applies the `page < 1` and `limit == 0` defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    #[must_use]
    pub const fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Apply defaults: pages start at 1 and a zero limit means [`DEFAULT_LIMIT`]
    #[must_use]
    pub const fn normalized(self) -> Self {
        Self {
            page: if self.page < 1 { 1 } else { self.page },
            limit: if self.limit == 0 {
                DEFAULT_LIMIT
            } else {
                self.limit
            },
        }
    }

    #[must_use]
    pub const fn page(&self) -> i64 {
        self.page
    }

    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of records skipped before this page
    ///
    /// The first page always starts at 0, whatever the limit.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        if self.page <= 1 {
            0
        } else {
            (self.page - 1).saturating_mul(self.limit)
        }
    }

    #[must_use]
    pub const fn window(&self) -> Window {
        Window {
            offset: self.offset(),
            limit: self.limit,
        }
    }
}

/// Bounds of a fetch: skip `offset` records, then take at most `limit`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pub offset: i64,
    pub limit: i64,
}

/// Pagination metadata returned alongside a page of results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Paginator {
    pub total_record: i64,
    pub total_page: i64,
    pub offset: i64,
    pub limit: i64,
    pub page: i64,
    pub prev_page: i64,
    pub next_page: i64,
}

impl Paginator {
    /// Derive metadata for `request` given the matching record count
    ///
    /// `request` is taken as-is. A zero or negative limit yields
    /// `total_page == 0`.
    #[must_use]
    pub fn new(request: PageRequest, total_record: i64) -> Self {
        let page = request.page();
        let limit = request.limit();

        let total_page = if limit <= 0 {
            0
        } else {
            total_record / limit + i64::from(total_record % limit != 0)
        };

        Self {
            total_record,
            total_page,
            offset: request.offset(),
            limit,
            page,
            prev_page: if page > 1 { page - 1 } else { page },
            next_page: if page == total_page {
                page
            } else {
                page.saturating_add(1)
            },
        }
    }
}

/// One page of results with its metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub paginator: Paginator,
}

/// List one page of users matching `filter`
///
/// The count and the fetch each run in their own task with their own copy of
/// the filter. The first failure (including a panicked task) aborts the
/// listing with an internal error and the other result is dropped.
pub async fn paginate(
    store: Arc<dyn UserStore>,
    filter: UserFilter,
    order: OrderSpec,
    request: PageRequest,
) -> Result<Page<User>, ApiError> {
    let request = request.normalized();
    let window = request.window();

    let count = {
        let store = Arc::clone(&store);
        let filter = filter.clone();
        tokio::spawn(async move { store.count(&filter).await })
    };
    let fetch = tokio::spawn(async move { store.fetch(&filter, &order, window).await });

    let (total_record, items) = tokio::try_join!(
        async { settle(count.await, "count") },
        async { settle(fetch.await, "fetch") },
    )?;

    tracing::debug!(
        total_record,
        returned = items.len(),
        page = request.page(),
        limit = request.limit(),
        order = %order,
        "listed users"
    );

    Ok(Page {
        items,
        paginator: Paginator::new(request, total_record),
    })
}

/// Collapse a joined store task into the listing's error taxonomy
fn settle<T>(
    joined: Result<RepositoryResult<T>, JoinError>,
    query: &'static str,
) -> Result<T, ApiError> {
    match joined {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(error)) => {
            tracing::error!(%error, query, "user listing query failed");
            Err(ApiError::internal(format!("failed to {query} users")))
        }
        Err(error) => {
            tracing::error!(%error, query, "user listing task did not complete");
            Err(ApiError::internal(format!("failed to {query} users")))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::api::ErrorKind;
    use crate::model::{Gender, NewUser, UserId, UserPatch};
    use crate::repository::{MemoryUserStore, RepositoryError, RepositoryOperation};

    fn seeded(count: usize) -> Arc<dyn UserStore> {
        let users = (1..=count).map(|i| NewUser {
            name: format!("user{i:02}"),
            gender: if i % 2 == 0 {
                Gender::Female
            } else {
                Gender::Male
            },
        });
        Arc::new(MemoryUserStore::with_users(users))
    }

    /// Store that fails on the chosen operations and records every filter it sees
    #[derive(Default)]
    struct ScriptedStore {
        fail_count: bool,
        fail_fetch: bool,
        seen: Mutex<Vec<UserFilter>>,
    }

    #[async_trait]
    impl UserStore for ScriptedStore {
        async fn find_by_id(&self, _id: UserId) -> RepositoryResult<Option<User>> {
            Ok(None)
        }

        async fn count(&self, filter: &UserFilter) -> RepositoryResult<i64> {
            self.seen.lock().unwrap().push(filter.clone());
            if self.fail_count {
                return Err(RepositoryError::database_error(
                    RepositoryOperation::Count,
                    "relation \"users\" does not exist",
                ));
            }
            Ok(3)
        }

        async fn fetch(
            &self,
            filter: &UserFilter,
            _order: &OrderSpec,
            _window: Window,
        ) -> RepositoryResult<Vec<User>> {
            self.seen.lock().unwrap().push(filter.clone());
            if self.fail_fetch {
                return Err(RepositoryError::connection_failed("connection reset"));
            }
            Ok(Vec::new())
        }

        async fn create(&self, _user: NewUser) -> RepositoryResult<User> {
            unimplemented!()
        }

        async fn update(&self, _id: UserId, _patch: UserPatch) -> RepositoryResult<()> {
            unimplemented!()
        }
    }

    #[test]
    fn test_seventeen_records_second_page_of_eight() {
        let meta = Paginator::new(PageRequest::new(2, 8), 17);
        assert_eq!(
            meta,
            Paginator {
                total_record: 17,
                total_page: 3,
                offset: 8,
                limit: 8,
                page: 2,
                prev_page: 1,
                next_page: 3,
            }
        );
    }

    #[test]
    fn test_metadata_properties() {
        for total in [0_i64, 1, 7, 8, 9, 16, 17, 100] {
            for limit in 1_i64..=12 {
                for page in 1_i64..=6 {
                    let meta = Paginator::new(PageRequest::new(page, limit), total);
                    let expected_pages = (total + limit - 1) / limit;
                    assert_eq!(meta.total_page, expected_pages);
                    let expected_offset = if page == 1 { 0 } else { (page - 1) * limit };
                    assert_eq!(meta.offset, expected_offset);
                    assert_eq!(meta.prev_page, if page > 1 { page - 1 } else { page });
                    if page == meta.total_page {
                        assert_eq!(meta.next_page, page);
                    } else {
                        assert_eq!(meta.next_page, page + 1);
                    }
                }
            }
        }
    }

    #[test]
    fn test_last_page_next_is_itself() {
        let meta = Paginator::new(PageRequest::new(3, 8), 17);
        assert_eq!(meta.next_page, 3);
        assert_eq!(meta.prev_page, 2);
    }

    #[test]
    fn test_zero_limit_has_no_pages() {
        let meta = Paginator::new(PageRequest::new(1, 0), 17);
        assert_eq!(meta.total_page, 0);
        assert_eq!(meta.offset, 0);
    }

    #[test]
    fn test_largest_page_saturates() {
        let meta = Paginator::new(PageRequest::new(i64::MAX, 100), 17);
        assert_eq!(meta.total_page, 1);
        assert_eq!(meta.offset, i64::MAX);
        assert_eq!(meta.prev_page, i64::MAX - 1);
        assert_eq!(meta.next_page, i64::MAX);
    }

    #[test]
    fn test_normalization_defaults() {
        let request = PageRequest::new(0, 0).normalized();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), DEFAULT_LIMIT);

        let request = PageRequest::new(-4, 25).normalized();
        assert_eq!(request.page(), 1);
        assert_eq!(request.limit(), 25);
    }

    #[test]
    fn test_paginator_serializes_snake_case() {
        let json = serde_json::to_value(Paginator::new(PageRequest::new(1, 10), 0)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "total_record": 0,
                "total_page": 0,
                "offset": 0,
                "limit": 10,
                "page": 1,
                "prev_page": 1,
                "next_page": 2,
            })
        );
    }

    #[tokio::test]
    async fn test_paginate_second_page() {
        let page = paginate(
            seeded(17),
            UserFilter::new(),
            OrderSpec::for_users("id"),
            PageRequest::new(2, 8),
        )
        .await
        .unwrap();

        assert_eq!(page.paginator.total_record, 17);
        assert_eq!(page.paginator.total_page, 3);
        let ids: Vec<_> = page.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, (9..=16).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_paginate_applies_zero_limit_default() {
        let page = paginate(
            seeded(17),
            UserFilter::new(),
            OrderSpec::default(),
            PageRequest::new(0, 0),
        )
        .await
        .unwrap();

        assert_eq!(page.paginator.page, 1);
        assert_eq!(page.paginator.limit, DEFAULT_LIMIT);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.paginator.total_page, 2);
    }

    #[tokio::test]
    async fn test_paginate_filter_restricts_count_and_items() {
        let page = paginate(
            seeded(17),
            UserFilter::new().with_gender(Gender::Female),
            OrderSpec::for_users("id.desc"),
            PageRequest::new(1, 5),
        )
        .await
        .unwrap();

        assert_eq!(page.paginator.total_record, 8);
        assert_eq!(page.paginator.total_page, 2);
        let ids: Vec<_> = page.items.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![16, 14, 12, 10, 8]);
    }

    #[tokio::test]
    async fn test_count_and_fetch_receive_identical_filters() {
        let store = Arc::new(ScriptedStore::default());
        let filter = UserFilter::new().with_name("ql").with_gender(Gender::Male);

        paginate(
            store.clone(),
            filter.clone(),
            OrderSpec::default(),
            PageRequest::new(1, 10),
        )
        .await
        .unwrap();

        let seen = store.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|f| *f == filter));
    }

    #[tokio::test]
    async fn test_failing_count_is_internal() {
        let store = Arc::new(ScriptedStore {
            fail_count: true,
            ..ScriptedStore::default()
        });
        let err = paginate(
            store,
            UserFilter::new(),
            OrderSpec::default(),
            PageRequest::new(1, 10),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(!err.message.contains("relation"));
    }

    #[tokio::test]
    async fn test_failing_fetch_is_internal() {
        let store = Arc::new(ScriptedStore {
            fail_fetch: true,
            ..ScriptedStore::default()
        });
        let err = paginate(
            store,
            UserFilter::new(),
            OrderSpec::default(),
            PageRequest::new(1, 10),
        )
        .await
        .unwrap_err();

        assert_eq!(err.kind, ErrorKind::Internal);
    }
}
