//! Operations on users

use serde_json::{json, Value};

use super::Operation;
use crate::ids::{ListId, UserId};
use crate::user::Role;

#[derive(Clone, Debug, PartialEq)]
pub struct UserInput {
    pub email: String,
    pub github_id: String,
    pub role: Role,
}

impl UserInput {
    fn to_variable(&self) -> Value {
        json!({
            "email": self.email,
            "githubID": self.github_id,
            "role": self.role,
        })
    }
}

static USERS: &str = r#"
    query GetUsers {
        result:users {
            id
            email
            role
        }
    }
"#;

static USER_BY_ID: &str = r#"
    query GetUserByID($id: ID!) {
        result:user(id: $id) {
            id
            email
            role
        }
    }
"#;

static CURRENT_USER: &str = r#"
    query GetUserByEmail {
        result:userByEmail {
            id
            email
            role
        }
    }
"#;

static CREATE_USER: &str = r#"
    mutation CreateUser($input: CreateUserInput!) {
        result:createUser(input: $input) {
            id
            createdAt
            updatedAt
        }
    }
"#;

static DELETE_USER: &str = r#"
    mutation DeleteUser($id: ID!) {
        result:deleteUser(id: $id) {
            id
        }
    }
"#;

static UPDATE_USER: &str = r#"
    mutation UpdateUser($id: ID!, $input: UpdateUserInput!) {
        result:updateUser(id: $id, input: $input) {
            id
            createdAt
            updatedAt
        }
    }
"#;

static USERS_BY_LIST: &str = r#"
    query GetUsersByList($id: ID!) {
        result:usersByList(id: $id) {
            id
            email
            role
        }
    }
"#;

pub fn get_users() -> Operation {
    Operation::query("GetUsers", USERS, Value::Null)
}

pub fn get_user_by_id(id: &UserId) -> Operation {
    Operation::query("GetUserByID", USER_BY_ID, json!({ "id": id }))
}

/// The user owning the current session (the backend resolves it from the session cookie)
pub fn get_user() -> Operation {
    Operation::query("GetUserByEmail", CURRENT_USER, Value::Null)
}

pub fn create_user(input: &UserInput) -> Operation {
    Operation::mutation("CreateUser", CREATE_USER, json!({ "input": input.to_variable() }))
}

pub fn delete_user(id: &UserId) -> Operation {
    Operation::mutation("DeleteUser", DELETE_USER, json!({ "id": id }))
}

pub fn update_user(id: &UserId, input: &UserInput) -> Operation {
    Operation::mutation("UpdateUser", UPDATE_USER, json!({ "id": id, "input": input.to_variable() }))
}

/// Users that have access to a list
pub fn get_users_by_list(list_id: &ListId) -> Operation {
    Operation::query("GetUsersByList", USERS_BY_LIST, json!({ "id": list_id }))
}
