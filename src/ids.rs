//! Identifiers of the backend entities
//!
//! The backend hands out opaque string IDs. Each entity gets its own type so that a list ID cannot be
//! passed where a todo ID is expected.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

macro_rules! opaque_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    }
}

opaque_id!(
    /// ID of a [`List`](crate::list::List)
    ListId
);
opaque_id!(
    /// ID of a [`Todo`](crate::todo::Todo)
    TodoId
);
opaque_id!(
    /// ID of a [`User`](crate::user::User)
    UserId
);
