//! Operations on lists and list accesses

use serde_json::{json, Value};

use super::Operation;
use crate::ids::{ListId, UserId};
use crate::list::Visibility;
use crate::user::Role;

/// What the list dialog submits
#[derive(Clone, Debug, PartialEq)]
pub struct ListInput {
    pub name: String,
    pub description: String,
    pub visibility: Visibility,
    pub tags: Vec<String>,
}

impl ListInput {
    fn to_variable(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "visibility": self.visibility,
            "tags": self.tags,
        })
    }
}

/// An invitation to share a list
#[derive(Clone, Debug, PartialEq)]
pub struct ListAccessInput {
    pub list_id: ListId,
    pub user_id: UserId,
    pub access_level: Role,
}

static LISTS_GLOBAL: &str = r#"
    query ListsGlobal {
        result:listsGlobal {
            id
            name
            description
            tags
            owner {
                id
                email
            }
            visibility
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
        }
    }
"#;

static GET_LIST: &str = r#"
    query GetList($id: ID!) {
        result:list(id: $id) {
            id
            name
            description
            tags
            visibility
            createdAt
            updatedAt
            owner {
                id
            }
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
        }
    }
"#;

static CREATE_LIST: &str = r#"
    mutation CreateList($input: CreateListInput!) {
        result:createList(input: $input) {
            id
            name
            description
            visibility
            tags
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
            createdAt
            updatedAt
        }
    }
"#;

static UPDATE_LIST: &str = r#"
    mutation UpdateList($id: ID!, $input: UpdateListInput!) {
        result:updateList(id: $id, input: $input) {
            id
            name
            description
            visibility
            tags
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
            createdAt
            updatedAt
        }
    }
"#;

static LISTS: &str = r#"
    query Lists {
        result:lists {
            id
            name
            description
            tags
            visibility
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
        }
    }
"#;

static LISTS_ACCEPTED: &str = r#"
    query ListsAccepted {
        result:listsAccepted {
            id
            name
            description
            tags
            visibility
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
        }
    }
"#;

static LISTS_PENDING: &str = r#"
    query ListsPending {
        result:listsPending {
            id
            name
            description
            tags
            visibility
            createdAt
            updatedAt
            owner {
                email
            }
            collaborators {
                user {
                    email
                }
            }
            todos {
                title
                description
            }
        }
    }
"#;

static UPDATE_LIST_NAME: &str = r#"
    mutation UpdateListName($id: ID!, $name: String!) {
        result:updateListName(id: $id, name: $name) {
            name
            description
        }
    }
"#;

static UPDATE_LIST_DESCRIPTION: &str = r#"
    mutation UpdateListDescription($id: ID!, $description: String!) {
        result:updateListDescription(id: $id, description: $description) {
            name
            description
        }
    }
"#;

static DELETE_LIST: &str = r#"
    mutation DeleteList($id: ID!) {
        result:deleteList(id: $id) {
            id
            name
            description
        }
    }
"#;

static ADD_LIST_ACCESS: &str = r#"
    mutation AddListAccess($input: ListAccessInput!) {
        result:addListAccess(input: $input) {
            list {
                id
            }
            user {
                id
            }
            status
        }
    }
"#;

static REMOVE_LIST_ACCESS: &str = r#"
    mutation RemoveListAccess($listId: ID!) {
        result:removeListAccess(listId: $listId) {
            list {
                id
            }
            user {
                id
            }
            status
        }
    }
"#;

static REMOVE_COLLABORATOR: &str = r#"
    mutation RemoveCollaborator($listId: ID!, $userId: ID!) {
        result:removeCollaborator(listId: $listId, userId: $userId) {
            list {
                id
            }
            user {
                id
            }
            status
        }
    }
"#;

static ACCEPT_LIST: &str = r#"
    mutation AcceptListAccess($listId: ID!) {
        result:acceptList(listId: $listId)
    }
"#;

static GET_LIST_ACCESSES: &str = r#"
    query GetAccessesByListID($listId: ID!) {
        result:getListAccesses(listId: $listId) {
            list {
                id
                name
            }
            user {
                id
                email
                role
            }
            status
        }
    }
"#;

/// Every list of the application (admins only)
pub fn get_lists_global() -> Operation {
    Operation::query("ListsGlobal", LISTS_GLOBAL, Value::Null)
}

pub fn get_list_by_id(id: &ListId) -> Operation {
    Operation::query("GetList", GET_LIST, json!({ "id": id }))
}

pub fn create_list(input: &ListInput) -> Operation {
    Operation::mutation("CreateList", CREATE_LIST, json!({ "input": input.to_variable() }))
}

pub fn update_list(id: &ListId, input: &ListInput) -> Operation {
    Operation::mutation("UpdateList", UPDATE_LIST, json!({ "id": id, "input": input.to_variable() }))
}

/// Lists owned by the current user
pub fn get_lists() -> Operation {
    Operation::query("Lists", LISTS, Value::Null)
}

/// Lists shared with the current user, whose invitation has been accepted
pub fn get_accepted_lists() -> Operation {
    Operation::query("ListsAccepted", LISTS_ACCEPTED, Value::Null)
}

/// Lists the current user has been invited to, but has not accepted yet
pub fn get_lists_pending() -> Operation {
    Operation::query("ListsPending", LISTS_PENDING, Value::Null)
}

pub fn update_list_name(id: &ListId, name: &str) -> Operation {
    Operation::mutation("UpdateListName", UPDATE_LIST_NAME, json!({ "id": id, "name": name }))
}

pub fn update_list_description(id: &ListId, description: &str) -> Operation {
    Operation::mutation("UpdateListDescription", UPDATE_LIST_DESCRIPTION, json!({ "id": id, "description": description }))
}

pub fn delete_list(id: &ListId) -> Operation {
    Operation::mutation("DeleteList", DELETE_LIST, json!({ "id": id }))
}

/// Invite a user to a list
pub fn add_list_access(input: &ListAccessInput) -> Operation {
    Operation::mutation("AddListAccess", ADD_LIST_ACCESS, json!({
        "input": {
            "listId": input.list_id,
            "userId": input.user_id,
            "accessLevel": input.access_level,
        }
    }))
}

/// Drop the current user's access to a list (this is how an invitation is rejected)
pub fn remove_list_access(list_id: &ListId) -> Operation {
    Operation::mutation("RemoveListAccess", REMOVE_LIST_ACCESS, json!({ "listId": list_id }))
}

pub fn remove_collaborator(list_id: &ListId, user_id: &UserId) -> Operation {
    Operation::mutation("RemoveCollaborator", REMOVE_COLLABORATOR, json!({ "listId": list_id, "userId": user_id }))
}

/// Accept a pending invitation
pub fn accept_list_access(list_id: &ListId) -> Operation {
    Operation::mutation("AcceptListAccess", ACCEPT_LIST, json!({ "listId": list_id }))
}

pub fn get_accesses_by_list_id(list_id: &ListId) -> Operation {
    Operation::query("GetAccessesByListID", GET_LIST_ACCESSES, json!({ "listId": list_id }))
}
