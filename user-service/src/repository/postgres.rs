//! PostgreSQL user store
//!
//! Filter values and window bounds are always bound as parameters. The only
//! text spliced into SQL besides fixed fragments is the column and keyword of
//! an [`OrderSpec`], both drawn from compile-time literals.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};

use super::error::{RepositoryError, RepositoryOperation};
use super::traits::{check_name, RepositoryResult, UserStore};
use crate::model::{NewUser, User, UserFilter, UserId, UserPatch};
use crate::paging::{OrderSpec, Window};

const USER_COLUMNS: &str = "id, name, gender, status";

/// PostgreSQL-backed user store
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `users` table if it does not exist
    ///
    /// Should be called once during application startup.
    pub async fn ensure_schema(&self) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id BIGSERIAL PRIMARY KEY,
                name TEXT NOT NULL,
                gender TEXT NOT NULL,
                status TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| RepositoryError::from(e).with_operation(RepositoryOperation::Migrate))?;

        Ok(())
    }
}

fn push_filter(qb: &mut QueryBuilder<'static, Postgres>, filter: &UserFilter) {
    let mut joiner = " WHERE ";
    if let Some(name) = filter.name() {
        qb.push(joiner).push("name = ").push_bind(name.to_string());
        joiner = " AND ";
    }
    if let Some(gender) = filter.gender() {
        qb.push(joiner).push("gender = ").push_bind(gender.as_str());
    }
}

fn count_query(filter: &UserFilter) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM users");
    push_filter(&mut qb, filter);
    qb
}

fn fetch_query(
    filter: &UserFilter,
    order: &OrderSpec,
    window: Window,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filter(&mut qb, filter);

    qb.push(" ORDER BY ")
        .push(order.field())
        .push(" ")
        .push(order.direction().as_sql());
    // Stable paging across equal sort keys
    if order.field() != "id" {
        qb.push(", id ASC");
    }

    qb.push(" LIMIT ")
        .push_bind(window.limit)
        .push(" OFFSET ")
        .push_bind(window.offset);
    qb
}

fn update_query(id: UserId, patch: &UserPatch) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("UPDATE users SET ");
    {
        let mut set = qb.separated(", ");
        if let Some(name) = &patch.name {
            set.push("name = ");
            set.push_bind_unseparated(name.clone());
        }
        if let Some(gender) = patch.gender {
            set.push("gender = ");
            set.push_bind_unseparated(gender.as_str());
        }
        if let Some(status) = patch.status {
            set.push("status = ");
            set.push_bind_unseparated(status.as_str());
        }
    }
    qb.push(" WHERE id = ").push_bind(id);
    qb
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    name: String,
    gender: String,
    status: Option<String>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let decode = |e: crate::model::ParseVariantError| {
            RepositoryError::serialization_error(RepositoryOperation::Fetch, e.to_string())
                .with_entity("User", row.id.to_string())
        };

        let gender = row.gender.parse().map_err(decode)?;
        let status = row
            .status
            .as_deref()
            .map(str::parse::<crate::model::Status>)
            .transpose()
            .map_err(decode)?;

        Ok(Self {
            id: row.id,
            name: row.name,
            gender,
            status,
        })
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_id(&self, id: UserId) -> RepositoryResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            RepositoryError::from(e)
                .with_operation(RepositoryOperation::FindById)
                .with_entity("User", id.to_string())
        })?;

        row.map(User::try_from)
            .transpose()
            .map_err(|e| e.with_operation(RepositoryOperation::FindById))
    }

    async fn count(&self, filter: &UserFilter) -> RepositoryResult<i64> {
        let mut qb = count_query(filter);
        qb.build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| RepositoryError::from(e).with_operation(RepositoryOperation::Count))
    }

    async fn fetch(
        &self,
        filter: &UserFilter,
        order: &OrderSpec,
        window: Window,
    ) -> RepositoryResult<Vec<User>> {
        let mut qb = fetch_query(filter, order, window);
        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RepositoryError::from(e).with_operation(RepositoryOperation::Fetch))?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn create(&self, user: NewUser) -> RepositoryResult<User> {
        check_name(&user.name, RepositoryOperation::Create)?;
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "INSERT INTO users (name, gender) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.name)
        .bind(user.gender.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| RepositoryError::from(e).with_operation(RepositoryOperation::Create))?;

        let created =
            User::try_from(row).map_err(|e| e.with_operation(RepositoryOperation::Create))?;
        tracing::debug!(user_id = created.id, "created user");
        Ok(created)
    }

    async fn update(&self, id: UserId, patch: UserPatch) -> RepositoryResult<()> {
        if patch.is_empty() {
            return Ok(());
        }
        if let Some(name) = &patch.name {
            check_name(name, RepositoryOperation::Update)?;
        }

        let mut qb = update_query(id, &patch);
        let result = qb.build().execute(&self.pool).await.map_err(|e| {
            RepositoryError::from(e)
                .with_operation(RepositoryOperation::Update)
                .with_entity("User", id.to_string())
        })?;

        tracing::debug!(user_id = id, rows = result.rows_affected(), "updated user");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Gender, Status};
    use crate::repository::RepositoryErrorKind;

    fn window() -> Window {
        Window {
            offset: 8,
            limit: 8,
        }
    }

    #[test]
    fn test_count_without_filter() {
        assert_eq!(
            count_query(&UserFilter::new()).sql(),
            "SELECT COUNT(*) FROM users"
        );
    }

    #[test]
    fn test_count_with_both_filters() {
        let filter = UserFilter::new().with_name("ql").with_gender(Gender::Male);
        assert_eq!(
            count_query(&filter).sql(),
            "SELECT COUNT(*) FROM users WHERE name = $1 AND gender = $2"
        );
    }

    #[test]
    fn test_count_with_gender_only() {
        let filter = UserFilter::new().with_gender(Gender::Female);
        assert_eq!(
            count_query(&filter).sql(),
            "SELECT COUNT(*) FROM users WHERE gender = $1"
        );
    }

    #[test]
    fn test_fetch_shares_filter_clause_with_count() {
        let filter = UserFilter::new().with_name("ql");
        let fetch = fetch_query(&filter, &OrderSpec::for_users("name.desc"), window());
        assert_eq!(
            fetch.sql(),
            "SELECT id, name, gender, status FROM users WHERE name = $1 \
             ORDER BY name DESC, id ASC LIMIT $2 OFFSET $3"
        );
    }

    #[test]
    fn test_fetch_by_id_has_no_tiebreak() {
        let fetch = fetch_query(&UserFilter::new(), &OrderSpec::for_users("id"), window());
        assert_eq!(
            fetch.sql(),
            "SELECT id, name, gender, status FROM users ORDER BY id ASC LIMIT $1 OFFSET $2"
        );
    }

    #[test]
    fn test_fetch_never_splices_unvalidated_sort() {
        let order = OrderSpec::for_users("name;DROP TABLE users.desc");
        let fetch = fetch_query(&UserFilter::new(), &order, window());
        assert!(!fetch.sql().contains("DROP"));
        assert!(fetch.sql().contains("ORDER BY id ASC"));
    }

    #[test]
    fn test_update_sets_only_present_fields() {
        let patch = UserPatch {
            name: Some("renamed".to_string()),
            status: Some(Status::Inactive),
            ..UserPatch::default()
        };
        assert_eq!(
            update_query(7, &patch).sql(),
            "UPDATE users SET name = $1, status = $2 WHERE id = $3"
        );
    }

    #[test]
    fn test_row_conversion() {
        let user = User::try_from(UserRow {
            id: 3,
            name: "ql".to_string(),
            gender: "FEMALE".to_string(),
            status: Some("ACTIVE".to_string()),
        })
        .unwrap();
        assert_eq!(user.gender, Gender::Female);
        assert_eq!(user.status, Some(Status::Active));
    }

    #[test]
    fn test_row_with_unknown_gender_is_serialization_error() {
        let err = User::try_from(UserRow {
            id: 3,
            name: "ql".to_string(),
            gender: "X".to_string(),
            status: None,
        })
        .unwrap_err();
        assert_eq!(err.kind, RepositoryErrorKind::SerializationError);
        assert_eq!(err.entity_id.as_deref(), Some("3"));
    }
}
