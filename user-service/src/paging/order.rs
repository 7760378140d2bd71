//! Sort-order validation
//!
//! A client names its sort as `field` or `field.direction` (for example
//! `name.desc`). [`OrderSpec::validate`] resolves that token against a fixed
//! whitelist; the resulting field is always one of the whitelisted literals,
//! never text taken from the request. Stores only ever append an order
//! clause built from an [`OrderSpec`].
//!
//! # Example
//!
//! ```rust
//! use user_service::paging::{OrderDirection, OrderSpec};
//!
//! let order = OrderSpec::for_users("Name.DESC");
//! assert_eq!(order.field(), "name");
//! assert_eq!(order.direction(), OrderDirection::Descending);
//! assert_eq!(order.to_string(), "name desc");
//!
//! let fallback = OrderSpec::for_users("password");
//! assert_eq!(fallback.to_string(), "id asc");
//! ```

use std::fmt;

/// Fields a user listing may be sorted by, in match priority
pub const USER_SORTABLE_FIELDS: &[&str] = &["id", "name", "gender"];

/// Sort field used when the requested one is not sortable
pub const USER_DEFAULT_SORT: &str = "id";

/// Direction for ordering results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderDirection {
    /// Sort in ascending order (A-Z, 0-9)
    #[default]
    Ascending,
    /// Sort in descending order (Z-A, 9-0)
    Descending,
}

impl OrderDirection {
    /// SQL keyword for this direction
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ascending => write!(f, "asc"),
            Self::Descending => write!(f, "desc"),
        }
    }
}

/// A validated single-field sort
///
/// There is no public constructor other than [`OrderSpec::validate`] and its
/// shorthands, so `field` is always a whitelist member or the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderSpec {
    field: &'static str,
    direction: OrderDirection,
}

impl OrderSpec {
    /// Resolve a raw sort token against a whitelist
    ///
    /// The token is split on `.`; the first segment is compared against
    /// `whitelist` ignoring ASCII case (first match wins). A miss yields `default`
    /// ascending. On a hit, a second segment equal to `desc` in any case
    /// selects descending order; anything else is ascending.
    #[must_use]
    pub fn validate(raw: &str, whitelist: &[&'static str], default: &'static str) -> Self {
        let mut segments = raw.split('.');
        let requested = segments.next().unwrap_or_default();

        let Some(field) = whitelist
            .iter()
            .copied()
            .find(|f| f.eq_ignore_ascii_case(requested))
        else {
            return Self {
                field: default,
                direction: OrderDirection::Ascending,
            };
        };

        let direction = match segments.next() {
            Some(dir) if dir.eq_ignore_ascii_case("desc") => OrderDirection::Descending,
            _ => OrderDirection::Ascending,
        };

        Self { field, direction }
    }

    /// Resolve a sort token for the user listing
    #[must_use]
    pub fn for_users(raw: &str) -> Self {
        Self::validate(raw, USER_SORTABLE_FIELDS, USER_DEFAULT_SORT)
    }

    #[must_use]
    pub const fn field(&self) -> &'static str {
        self.field
    }

    #[must_use]
    pub const fn direction(&self) -> OrderDirection {
        self.direction
    }
}

impl Default for OrderSpec {
    fn default() -> Self {
        Self::for_users("")
    }
}

impl fmt::Display for OrderSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.direction)
    }
}
