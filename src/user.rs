//! Users and their application-wide role

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ids::UserId;

/// Application-wide role of a user.
///
/// The session cookie carries it in lowercase (`admin`), the GraphQL API in uppercase (`ADMIN`); both are accepted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Writer,
    Reader,
}

impl Role {
    /// The GraphQL enum value for this role
    pub fn as_graphql(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Writer => "WRITER",
            Role::Reader => "READER",
        }
    }
}

impl Default for Role {
    fn default() -> Self {
        Role::Reader
    }
}

impl FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "writer" => Ok(Role::Writer),
            "reader" => Ok(Role::Reader),
            other => Err(format!("unknown role {:?}", other)),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_graphql())
    }
}

impl Serialize for Role {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_graphql())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D>(deserializer: D) -> Result<Role, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A user, as returned by the `users`, `usersByList` and `userByEmail` queries
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub email: String,
    #[serde(rename = "githubID")]
    pub github_id: Option<String>,
    pub role: Option<Role>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}
