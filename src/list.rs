//! To-do lists

use serde::{Deserialize, Serialize};

use crate::access::AccessStatus;
use crate::ids::ListId;
use crate::todo::Todo;
use crate::user::User;

/// Lists accept at most this many tags
pub const MAX_TAGS: usize = 6;
/// Longest list name accepted by the list dialog
pub const MAX_LIST_NAME_LENGTH: usize = 256;

string_enum!(
    /// Who can see a list
    Visibility {
        Private => "PRIVATE",
        Shared => "SHARED",
        Public => "PUBLIC",
    }
);

/// A user sharing a list, with the state of their invitation
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collaborator {
    pub user: User,
    pub status: Option<AccessStatus>,
}

/// A to-do list. Every field is optional on the wire, since each query selects a different subset
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct List {
    pub id: ListId,
    pub name: String,
    pub description: String,
    pub visibility: Option<Visibility>,
    pub tags: Vec<String>,
    pub owner: Option<User>,
    pub collaborators: Vec<Collaborator>,
    pub todos: Vec<Todo>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl List {
    pub fn is_private(&self) -> bool {
        self.visibility == Some(Visibility::Private)
    }

    /// Whether `email` belongs to someone this list is shared with
    pub fn has_collaborator(&self, email: &str) -> bool {
        self.collaborators.iter().any(|c| c.user.email == email)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn unknown_visibility_is_kept_verbatim() {
        let list: List = serde_json::from_str(r#"{"id": "1", "name": "Groceries", "visibility": "TEAM"}"#).unwrap();
        assert_eq!(list.visibility, Some(Visibility::Other("TEAM".to_string())));
        assert_eq!(serde_json::to_value(&list.visibility).unwrap(), serde_json::json!("TEAM"));
        assert!(list.is_private() == false);
    }

    #[test]
    fn nested_selection_deserializes() {
        let raw = r#"{
            "id": "7",
            "name": "Trip",
            "visibility": "PRIVATE",
            "tags": ["travel"],
            "owner": {"id": "u1", "email": "owner@example.com"},
            "collaborators": [{"user": {"email": "friend@example.com"}}],
            "todos": [{"title": "Book hotel", "description": ""}]
        }"#;
        let list: List = serde_json::from_str(raw).unwrap();
        assert!(list.is_private());
        assert!(list.has_collaborator("friend@example.com"));
        assert_eq!(list.todos[0].title, "Book hotel");
        assert_eq!(list.owner.unwrap().email, "owner@example.com");
    }
}
