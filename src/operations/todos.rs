//! Operations on todos

use serde_json::{json, Value};

use super::{or_empty, Operation};
use crate::ids::{ListId, TodoId, UserId};
use crate::todo::Priority;

/// What the todo dialog submits
#[derive(Clone, Debug, PartialEq)]
pub struct TodoInput {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub tags: Vec<String>,
    pub list_id: ListId,
    pub assigned_to: Option<UserId>,
    /// RFC3339 timestamp
    pub start_date: Option<String>,
    /// RFC3339 timestamp
    pub due_date: Option<String>,
    pub completed: bool,
}

impl TodoInput {
    fn to_create_variable(&self) -> Value {
        let mut input = self.to_update_variable();
        input["listId"] = json!(self.list_id);
        input
    }

    /// The update input has no `listId`: todos do not move between lists
    fn to_update_variable(&self) -> Value {
        json!({
            "title": self.title,
            "description": self.description,
            "priority": self.priority,
            "tags": self.tags,
            "assignedTo": or_empty(self.assigned_to.as_ref().map(|id| id.as_str())),
            "startDate": or_empty(self.start_date.as_ref()),
            "dueDate": or_empty(self.due_date.as_ref()),
            "completed": self.completed,
        })
    }
}

/// Appends the full todo selection set (and the closing braces) to the head of a query
macro_rules! with_todo_fields {
    ($head:literal) => {
        concat!($head, r#"
            id
            title
            description
            priority
            completed
            createdAt
            updatedAt
            list {
                id
                name
                description
                visibility
                tags
                owner {
                    email
                    githubID
                    role
                    createdAt
                    updatedAt
                }
                createdAt
                updatedAt
            }
            startDate
            dueDate
            tags
            assignedTo {
                id
                email
                githubID
                role
                createdAt
                updatedAt
            }
        }
    }
"#)
    };
}

static TODOS_GLOBAL: &str = with_todo_fields!(r#"
    query TodosGlobal {
        result:todosGlobal {"#);

static TODOS: &str = with_todo_fields!(r#"
    query GetTodos {
        result:todos {"#);

static TODOS_BY_LIST: &str = with_todo_fields!(r#"
    query GetTodosByList($id: ID!) {
        result:todosByList(id: $id) {"#);

static CREATE_TODO: &str = with_todo_fields!(r#"
    mutation CreateTodo($input: CreateTodoInput!) {
        result:createTodo(input: $input) {"#);

static UPDATE_TODO: &str = with_todo_fields!(r#"
    mutation UpdateTodo($id: ID!, $input: UpdateTodoInput!) {
        result:updateTodo(id: $id, input: $input) {"#);

static GET_TODO: &str = r#"
    query GetTodo($id: ID!) {
        result:todo(id: $id) {
            id
            title
            priority
        }
    }
"#;

static DELETE_TODO: &str = r#"
    mutation DeleteTodo($id: ID!) {
        result:deleteTodo(id: $id) {
            id
            title
            description
        }
    }
"#;

static UPDATE_TODO_TITLE: &str = r#"
    mutation UpdateTodoTitle($id: ID!, $title: String!) {
        result:updateTodoTitle(id: $id, title: $title) {
            title
            description
        }
    }
"#;

static UPDATE_TODO_DESCRIPTION: &str = r#"
    mutation UpdateTodoDescription($id: ID!, $description: String!) {
        result:updateTodoDescription(id: $id, description: $description) {
            title
            description
        }
    }
"#;

static UPDATE_TODO_PRIORITY: &str = r#"
    mutation UpdateTodoPriority($id: ID!, $priority: String!) {
        result:updateTodoPriority(id: $id, priority: $priority) {
            title
            description
        }
    }
"#;

static UPDATE_TODO_ASSIGN_TO: &str = r#"
    mutation UpdateTodoAssignTo($id: ID!, $assignTo: String!) {
        result:updateTodoAssignTo(id: $id, assignTo: $assignTo) {
            title
            description
        }
    }
"#;

static COMPLETE_TODO: &str = r#"
    mutation CompleteTodo($id: ID!) {
        result:completeTodo(id: $id) {
            id
            title
            description
            completed
        }
    }
"#;

/// Every todo of the application (admins only)
pub fn get_todos_global() -> Operation {
    Operation::query("TodosGlobal", TODOS_GLOBAL, Value::Null)
}

pub fn get_todo_by_id(id: &TodoId) -> Operation {
    Operation::query("GetTodo", GET_TODO, json!({ "id": id }))
}

pub fn create_todo(input: &TodoInput) -> Operation {
    Operation::mutation("CreateTodo", CREATE_TODO, json!({ "input": input.to_create_variable() }))
}

pub fn delete_todo(id: &TodoId) -> Operation {
    Operation::mutation("DeleteTodo", DELETE_TODO, json!({ "id": id }))
}

pub fn update_todo(id: &TodoId, input: &TodoInput) -> Operation {
    Operation::mutation("UpdateTodo", UPDATE_TODO, json!({ "id": id, "input": input.to_update_variable() }))
}

/// Todos of the lists the current user can see
pub fn get_todos() -> Operation {
    Operation::query("GetTodos", TODOS, Value::Null)
}

pub fn update_todo_title(id: &TodoId, title: &str) -> Operation {
    Operation::mutation("UpdateTodoTitle", UPDATE_TODO_TITLE, json!({ "id": id, "title": title }))
}

pub fn update_todo_description(id: &TodoId, description: &str) -> Operation {
    Operation::mutation("UpdateTodoDescription", UPDATE_TODO_DESCRIPTION, json!({ "id": id, "description": description }))
}

pub fn update_todo_priority(id: &TodoId, priority: &Priority) -> Operation {
    Operation::mutation("UpdateTodoPriority", UPDATE_TODO_PRIORITY, json!({ "id": id, "priority": priority }))
}

pub fn update_todo_assign_to(id: &TodoId, assign_to: &UserId) -> Operation {
    Operation::mutation("UpdateTodoAssignTo", UPDATE_TODO_ASSIGN_TO, json!({ "id": id, "assignTo": assign_to }))
}

pub fn complete_todo(id: &TodoId) -> Operation {
    Operation::mutation("CompleteTodo", COMPLETE_TODO, json!({ "id": id }))
}

pub fn get_todos_by_list(list_id: &ListId) -> Operation {
    Operation::query("GetTodosByList", TODOS_BY_LIST, json!({ "id": list_id }))
}
