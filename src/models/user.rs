use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::timestamp;
use crate::pipeline::{Direction, Selection};
use crate::resource::{Deletable, Filter, Resource, SortKey};
use crate::samples;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    Staff,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Staff => "staff",
        }
    }

    /// Badge colour for the role column; display only.
    pub fn badge(self) -> &'static str {
        match self {
            Role::Admin => "red",
            Role::Manager => "blue",
            Role::Staff => "green",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "staff" => Ok(Role::Staff),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub role: Role,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub created_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserSortField {
    Username,
    Email,
    Role,
    CreatedAt,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserCriteria {
    pub role: Selection<Role>,
}

impl Filter<User> for UserCriteria {
    fn admits(&self, record: &User, _now: DateTime<Utc>) -> bool {
        self.role.admits(&record.role)
    }
}

impl Resource for User {
    const ENDPOINT: &'static str = "users";
    const LABEL: &'static str = "user";

    type Draft = NewUser;
    type SortField = UserSortField;
    type Criteria = UserCriteria;

    fn id(&self) -> i64 {
        self.id
    }

    fn search_fields(&self) -> Vec<&str> {
        vec![self.username.as_str(), self.email.as_str()]
    }

    fn sort_key(&self, field: UserSortField) -> SortKey<'_> {
        match field {
            UserSortField::Username => SortKey::Text(&self.username),
            UserSortField::Email => SortKey::Text(&self.email),
            UserSortField::Role => SortKey::Text(self.role.as_str()),
            UserSortField::CreatedAt => SortKey::Time(self.created_at),
        }
    }

    fn default_sort() -> (UserSortField, Direction) {
        (UserSortField::Username, Direction::Asc)
    }

    fn samples() -> Vec<Self> {
        samples::users()
    }

    fn from_draft(id: i64, draft: &NewUser, now: DateTime<Utc>) -> Self {
        User {
            id,
            username: draft.username.clone(),
            email: draft.email.clone(),
            role: draft.role,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Deletable for User {}
