//! In-process user store

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering as AtomicOrdering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::error::RepositoryOperation;
use super::traits::{check_name, RepositoryResult, UserStore};
use crate::model::{NewUser, User, UserFilter, UserId, UserPatch};
use crate::paging::{OrderDirection, OrderSpec, Window};

/// User store backed by an ordered map behind a `tokio` lock
///
/// Identifiers are assigned from 1 upward and never reused.
#[derive(Debug)]
pub struct MemoryUserStore {
    users: RwLock<BTreeMap<UserId, User>>,
    next_id: AtomicI64,
}

impl MemoryUserStore {
    /// An empty store
    #[must_use]
    pub fn new() -> Self {
        Self {
            users: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// A store pre-populated with `users`, assigned ids 1, 2, 3, ...
    #[must_use]
    pub fn with_users(users: impl IntoIterator<Item = NewUser>) -> Self {
        let map: BTreeMap<UserId, User> = users
            .into_iter()
            .zip(1..)
            .map(|(new, id)| (id, new_record(id, new)))
            .collect();
        let next_id = map.keys().next_back().map_or(1, |last| last + 1);

        Self {
            users: RwLock::new(map),
            next_id: AtomicI64::new(next_id),
        }
    }
}

impl Default for MemoryUserStore {
    fn default() -> Self {
        Self::new()
    }
}

fn new_record(id: UserId, new: NewUser) -> User {
    User {
        id,
        name: new.name,
        gender: new.gender,
        status: None,
    }
}

/// Compare two users on the sort field, breaking ties by id
fn compare(order: &OrderSpec, a: &User, b: &User) -> Ordering {
    let primary = match order.field() {
        "name" => a.name.cmp(&b.name),
        "gender" => a.gender.as_str().cmp(b.gender.as_str()),
        _ => a.id.cmp(&b.id),
    };
    let primary = match order.direction() {
        OrderDirection::Ascending => primary,
        OrderDirection::Descending => primary.reverse(),
    };
    primary.then_with(|| a.id.cmp(&b.id))
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn count(&self, filter: &UserFilter) -> RepositoryResult<i64> {
        let users = self.users.read().await;
        let matched = users.values().filter(|u| filter.matches(u)).count();
        Ok(i64::try_from(matched).unwrap_or(i64::MAX))
    }

    async fn fetch(
        &self,
        filter: &UserFilter,
        order: &OrderSpec,
        window: Window,
    ) -> RepositoryResult<Vec<User>> {
        let mut matched: Vec<User> = {
            let users = self.users.read().await;
            users.values().filter(|u| filter.matches(u)).cloned().collect()
        };
        matched.sort_by(|a, b| compare(order, a, b));

        let skip = usize::try_from(window.offset).unwrap_or(0);
        let take = usize::try_from(window.limit).unwrap_or(0);
        Ok(matched.into_iter().skip(skip).take(take).collect())
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        check_name(&user.name, RepositoryOperation::Create)?;
        let id = self.next_id.fetch_add(1, AtomicOrdering::SeqCst);
        let record = new_record(id, user);
        self.users.write().await.insert(id, record.clone());
        tracing::debug!(user_id = id, "created user");
        Ok(record)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> RepositoryResult<()> {
        if let Some(name) = &patch.name {
            check_name(name, RepositoryOperation::Update)?;
        }
        if let Some(user) = self.users.write().await.get_mut(&id) {
            patch.apply_to(user);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Status};
    use crate::repository::RepositoryErrorKind;

    fn new_user(name: &str, gender: Gender) -> NewUser {
        NewUser {
            name: name.to_string(),
            gender,
        }
    }

    fn store() -> MemoryUserStore {
        MemoryUserStore::with_users([
            new_user("carol", Gender::Female),
            new_user("alice", Gender::Female),
            new_user("bob", Gender::Male),
            new_user("alice", Gender::Male),
        ])
    }

    fn all() -> Window {
        Window {
            offset: 0,
            limit: 100,
        }
    }

    async fn ids(
        store: &MemoryUserStore,
        filter: &UserFilter,
        order: &str,
        window: Window,
    ) -> Vec<UserId> {
        store
            .fetch(filter, &OrderSpec::for_users(order), window)
            .await
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect()
    }

    #[tokio::test]
    async fn test_create_assigns_sequential_ids_after_seed() {
        let store = store();
        let created = store.create(new_user("dave", Gender::Male)).await.unwrap();
        assert_eq!(created.id, 5);
        assert_eq!(created.status, None);
        assert_eq!(store.find_by_id(5).await.unwrap(), Some(created));
    }

    #[tokio::test]
    async fn test_blank_names_are_rejected() {
        let store = store();
        let err = store.create(new_user(" ", Gender::Male)).await.unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(err.operation, RepositoryOperation::Create);

        let err = store
            .update(
                1,
                UserPatch {
                    name: Some(String::new()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::ValidationFailed);
        assert_eq!(store.find_by_id(1).await.unwrap().unwrap().name, "carol");
        assert_eq!(store.count(&UserFilter::new()).await.unwrap(), 4);
    }

    #[tokio::test]
    async fn test_find_missing_is_none() {
        assert_eq!(MemoryUserStore::new().find_by_id(1).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_count_respects_filter() {
        let store = store();
        assert_eq!(store.count(&UserFilter::new()).await.unwrap(), 4);
        assert_eq!(
            store.count(&UserFilter::new().with_name("alice")).await.unwrap(),
            2
        );
        assert_eq!(
            store
                .count(&UserFilter::new().with_name("alice").with_gender(Gender::Male))
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_fetch_orders_with_id_tiebreak() {
        let store = store();
        let any = UserFilter::new();
        assert_eq!(ids(&store, &any, "name", all()).await, vec![2, 4, 3, 1]);
        assert_eq!(ids(&store, &any, "name.desc", all()).await, vec![1, 3, 2, 4]);
        assert_eq!(ids(&store, &any, "gender", all()).await, vec![1, 2, 3, 4]);
        assert_eq!(ids(&store, &any, "id.desc", all()).await, vec![4, 3, 2, 1]);
    }

    #[tokio::test]
    async fn test_fetch_applies_window() {
        let store = store();
        let window = Window {
            offset: 1,
            limit: 2,
        };
        assert_eq!(ids(&store, &UserFilter::new(), "id", window).await, vec![2, 3]);

        let past_end = Window {
            offset: 10,
            limit: 2,
        };
        assert!(ids(&store, &UserFilter::new(), "id", past_end).await.is_empty());
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store = store();
        store
            .update(
                3,
                UserPatch {
                    status: Some(Status::Active),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        let user = store.find_by_id(3).await.unwrap().unwrap();
        assert_eq!(user.name, "bob");
        assert_eq!(user.status, Some(Status::Active));
    }

    #[tokio::test]
    async fn test_update_missing_is_silent() {
        let store = store();
        store
            .update(
                99,
                UserPatch {
                    name: Some("ghost".to_string()),
                    ..UserPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.count(&UserFilter::new()).await.unwrap(), 4);
    }
}
