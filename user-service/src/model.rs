//! User records and the value objects that travel with them
//!
//! [`User`] is the stored record. [`NewUser`] and [`UserPatch`] are the create
//! and partial-update payloads, and [`UserFilter`] is the equality predicate
//! used by listings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Server-assigned user identifier
pub type UserId = i64;

/// Error returned when a string does not name a known enum variant
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} '{value}'")]
pub struct ParseVariantError {
    kind: &'static str,
    value: String,
}

impl ParseVariantError {
    fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Gender of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Gender {
    Female,
    Male,
}

impl Gender {
    /// Wire and storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Female => "FEMALE",
            Self::Male => "MALE",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("female") {
            Ok(Self::Female)
        } else if s.eq_ignore_ascii_case("male") {
            Ok(Self::Male)
        } else {
            Err(ParseVariantError::new("gender", s))
        }
    }
}

/// Account status of a user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Active,
    Inactive,
}

impl Status {
    /// Wire and storage representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("active") {
            Ok(Self::Active)
        } else if s.eq_ignore_ascii_case("inactive") {
            Ok(Self::Inactive)
        } else {
            Err(ParseVariantError::new("status", s))
        }
    }
}

/// A stored user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub gender: Gender,
    pub status: Option<Status>,
}

/// Payload for creating a user
///
/// `id` and `status` are not part of the payload; when a client sends them
/// they are ignored during deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub gender: Gender,
}

/// Partial update of a user; `None` fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub status: Option<Status>,
}

impl UserPatch {
    /// Whether the patch modifies nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.gender.is_none() && self.status.is_none()
    }

    /// Apply the patch to a record in place
    pub fn apply_to(&self, user: &mut User) {
        if let Some(name) = &self.name {
            user.name.clone_from(name);
        }
        if let Some(gender) = self.gender {
            user.gender = gender;
        }
        if let Some(status) = self.status {
            user.status = Some(status);
        }
    }
}

/// Equality predicate over the filterable user fields
///
/// Count and fetch queries of one listing receive clones of the same filter,
/// so both see the same predicate.
///
/// # Example
///
/// ```rust
/// use user_service::model::{Gender, UserFilter};
///
/// let filter = UserFilter::new().with_name("ql").with_gender(Gender::Male);
/// assert_eq!(filter.name(), Some("ql"));
/// assert!(!filter.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserFilter {
    name: Option<String>,
    gender: Option<Gender>,
}

impl UserFilter {
    /// A filter that matches every user
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Match users with exactly this name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Match users with this gender
    #[must_use]
    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = Some(gender);
        self
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub const fn gender(&self) -> Option<Gender> {
        self.gender
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.gender.is_none()
    }

    /// Evaluate the predicate against a record
    #[must_use]
    pub fn matches(&self, user: &User) -> bool {
        self.name.as_deref().map_or(true, |name| user.name == name)
            && self.gender.map_or(true, |gender| user.gender == gender)
    }
}
