//! An in-memory backend, so that controllers can be tested without a server
//!
//! It answers the operations of [`crate::operations`] by name, and wraps its answers in the same
//! `{data: {result}}` / `{errors}` envelopes a real server would send.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::sync::Notify;
use url::Url;

use crate::access::{AccessStatus, ListAccess};
use crate::bus::NotificationBus;
use crate::client::unwrap_envelope;
use crate::config::Settings;
use crate::controllers::Context;
use crate::error::Error;
use crate::format::to_rfc3339;
use crate::ids::{ListId, TodoId, UserId};
use crate::list::{Collaborator, List, Visibility};
use crate::mock_behaviour::MockBehaviour;
use crate::operations::Operation;
use crate::session::SessionContext;
use crate::todo::{Priority, Todo};
use crate::traits::{RestResponse, Route, Shell, Transport};
use crate::user::{Role, User};
use crate::view_state::lock;

#[derive(Clone, Debug)]
struct ListRow {
    id: ListId,
    name: String,
    description: String,
    visibility: Visibility,
    tags: Vec<String>,
    owner: UserId,
    created_at: String,
    updated_at: String,
}

#[derive(Clone, Debug)]
struct TodoRow {
    id: TodoId,
    list_id: ListId,
    title: String,
    description: String,
    priority: Priority,
    tags: Vec<String>,
    completed: bool,
    assigned_to: Option<UserId>,
    start_date: String,
    due_date: String,
    created_at: String,
    updated_at: String,
}

#[derive(Clone, Debug)]
struct AccessRow {
    list_id: ListId,
    user_id: UserId,
    status: AccessStatus,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListInputVar {
    name: String,
    #[serde(default)]
    description: String,
    visibility: Visibility,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TodoInputVar {
    title: String,
    #[serde(default)]
    description: String,
    priority: Priority,
    #[serde(default)]
    tags: Vec<String>,
    list_id: Option<ListId>,
    #[serde(default)]
    assigned_to: String,
    #[serde(default)]
    start_date: String,
    #[serde(default)]
    due_date: String,
    #[serde(default)]
    completed: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccessInputVar {
    list_id: ListId,
    user_id: UserId,
    #[allow(dead_code)]
    access_level: Role,
}

#[derive(Deserialize)]
struct UserInputVar {
    email: String,
    #[serde(rename = "githubID", default)]
    github_id: String,
    role: Role,
}

#[derive(Default, Debug)]
struct MockData {
    current_user: Option<UserId>,
    users: Vec<User>,
    lists: Vec<ListRow>,
    todos: Vec<TodoRow>,
    accesses: Vec<AccessRow>,
}

/// A [`Transport`] backed by in-memory data
#[derive(Debug)]
pub struct MockBackend {
    data: Mutex<MockData>,
    calls: Mutex<Vec<&'static str>>,
    behaviour: Arc<Mutex<MockBehaviour>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::new_with_behaviour(Arc::new(Mutex::new(MockBehaviour::new())))
    }

    /// The behaviour is shared, so that tests can change it while controllers use the backend
    pub fn new_with_behaviour(behaviour: Arc<Mutex<MockBehaviour>>) -> Self {
        Self {
            data: Mutex::new(MockData::default()),
            calls: Mutex::new(Vec::new()),
            behaviour,
        }
    }

    pub fn behaviour(&self) -> Arc<Mutex<MockBehaviour>> {
        Arc::clone(&self.behaviour)
    }

    /// Names of the operations received so far
    pub fn calls(&self) -> Vec<&'static str> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    pub fn reset_calls(&self) {
        lock(&self.calls).clear();
    }

    pub fn add_user(&self, email: &str, role: Role) -> UserId {
        let now = now();
        let user = User {
            id: new_id(),
            email: email.to_string(),
            github_id: Some(email.split('@').next().unwrap_or_default().to_string()),
            role: Some(role),
            created_at: Some(now.clone()),
            updated_at: Some(now),
        };
        let id = user.id.clone();
        lock(&self.data).users.push(user);
        id
    }

    /// The user the backend resolves from the session cookie
    pub fn log_in_as(&self, user_id: &UserId) {
        lock(&self.data).current_user = Some(user_id.clone());
    }

    pub fn add_list(&self, owner: &UserId, name: &str, visibility: Visibility) -> ListId {
        let mut data = lock(&self.data);
        data.insert_list(owner, ListInputVar {
            name: name.to_string(),
            description: String::new(),
            visibility,
            tags: Vec::new(),
        })
    }

    pub fn add_todo(&self, list_id: &ListId, title: &str, priority: Priority) -> TodoId {
        let now = now();
        let row = TodoRow {
            id: new_id(),
            list_id: list_id.clone(),
            title: title.to_string(),
            description: String::new(),
            priority,
            tags: Vec::new(),
            completed: false,
            assigned_to: None,
            start_date: String::new(),
            due_date: String::new(),
            created_at: now.clone(),
            updated_at: now,
        };
        let id = row.id.clone();
        lock(&self.data).todos.push(row);
        id
    }

    pub fn set_todo_dates(&self, todo_id: &TodoId, start_date: &str, due_date: &str) {
        let mut data = lock(&self.data);
        if let Some(row) = data.todos.iter_mut().find(|t| &t.id == todo_id) {
            row.start_date = start_date.to_string();
            row.due_date = due_date.to_string();
        }
    }

    pub fn set_todo_completed(&self, todo_id: &TodoId, completed: bool) {
        let mut data = lock(&self.data);
        if let Some(row) = data.todos.iter_mut().find(|t| &t.id == todo_id) {
            row.completed = completed;
        }
    }

    /// Give `user_id` access to a list
    pub fn share(&self, list_id: &ListId, user_id: &UserId, status: AccessStatus) {
        lock(&self.data).accesses.push(AccessRow {
            list_id: list_id.clone(),
            user_id: user_id.clone(),
            status,
        });
    }

    /// A list, as the `list(id)` query would return it
    pub fn list(&self, list_id: &ListId) -> Option<List> {
        let data = lock(&self.data);
        data.lists.iter().find(|l| &l.id == list_id).map(|row| data.render_list(row))
    }

    pub fn todo(&self, todo_id: &TodoId) -> Option<Todo> {
        let data = lock(&self.data);
        data.todos.iter().find(|t| &t.id == todo_id).map(|row| data.render_todo(row))
    }

    pub fn todo_count(&self) -> usize {
        lock(&self.data).todos.len()
    }

    pub fn access_status(&self, list_id: &ListId, user_id: &UserId) -> Option<AccessStatus> {
        lock(&self.data)
            .accesses
            .iter()
            .find(|a| &a.list_id == list_id && &a.user_id == user_id)
            .map(|a| a.status.clone())
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn execute(&self, operation: &Operation) -> Result<Value, Error> {
        log::debug!("Mock backend received {}", operation.name());
        lock(&self.calls).push(operation.name());
        {
            let mut behaviour = lock(&self.behaviour);
            if operation.is_mutation() {
                behaviour.can_mutate()?;
            } else {
                behaviour.can_query()?;
            }
        }

        let body = match lock(&self.data).answer(operation) {
            Ok(result) => json!({ "data": { "result": result } }),
            Err(message) => json!({ "data": { "result": null }, "errors": [{ "message": message }] }),
        };
        unwrap_envelope(body)
    }

    async fn execute_rest(&self, path: &str, method: Method, body: Option<Value>) -> Result<RestResponse, Error> {
        log::debug!("Mock backend received {} {}", method, path);
        lock(&self.calls).push("REST");
        lock(&self.behaviour).can_call_rest()?;

        match (method, path.trim_start_matches('/')) {
            (Method::POST, "login/logout") => {
                let email = body.as_ref().and_then(|b| b.get("email")).and_then(|e| e.as_str());
                match email {
                    Some(_) => {
                        lock(&self.data).current_user = None;
                        Ok(RestResponse { status: 200, body: "{}".to_string() })
                    },
                    None => Err(Error::Transport { status: 400, status_text: "Bad Request".to_string() }),
                }
            },
            _ => Err(Error::Transport { status: 404, status_text: "Not Found".to_string() }),
        }
    }
}

type Answer = Result<Value, String>;

impl MockData {
    fn answer(&mut self, op: &Operation) -> Answer {
        match op.name() {
            // Lists
            "ListsGlobal" => {
                let lists: Vec<List> = self.lists.iter().map(|l| self.render_list(l)).collect();
                to_json(&lists)
            },
            "GetList" => {
                let id: ListId = var(op, "id")?;
                let list = self.lists.iter().find(|l| l.id == id).map(|l| self.render_list(l));
                to_json(&list)
            },
            "Lists" => {
                let me = self.me()?;
                let lists: Vec<List> = self.lists.iter().filter(|l| l.owner == me).map(|l| self.render_list(l)).collect();
                to_json(&lists)
            },
            "ListsAccepted" => self.shared_lists(AccessStatus::Accepted),
            "ListsPending" => self.shared_lists(AccessStatus::Pending),
            "CreateList" => {
                let me = self.me()?;
                let input: ListInputVar = var(op, "input")?;
                let id = self.insert_list(&me, input);
                self.list_answer(&id)
            },
            "UpdateList" => {
                let id: ListId = var(op, "id")?;
                let input: ListInputVar = var(op, "input")?;
                let row = self.list_row(&id)?;
                row.name = input.name;
                row.description = input.description;
                row.visibility = input.visibility;
                row.tags = input.tags;
                row.updated_at = now();
                self.list_answer(&id)
            },
            "UpdateListName" => {
                let id: ListId = var(op, "id")?;
                self.list_row(&id)?.name = var(op, "name")?;
                self.list_answer(&id)
            },
            "UpdateListDescription" => {
                let id: ListId = var(op, "id")?;
                self.list_row(&id)?.description = var(op, "description")?;
                self.list_answer(&id)
            },
            "DeleteList" => {
                let id: ListId = var(op, "id")?;
                let answer = self.list_answer(&id)?;
                self.lists.retain(|l| l.id != id);
                self.todos.retain(|t| t.list_id != id);
                self.accesses.retain(|a| a.list_id != id);
                Ok(answer)
            },
            "AddListAccess" => {
                let input: AccessInputVar = var(op, "input")?;
                self.list_row(&input.list_id)?;
                self.user(&input.user_id)?;
                if self.accesses.iter().any(|a| a.list_id == input.list_id && a.user_id == input.user_id) {
                    return Err("user already has access to this list".to_string());
                }
                let row = AccessRow { list_id: input.list_id, user_id: input.user_id, status: AccessStatus::Pending };
                let answer = self.render_access(&row);
                self.accesses.push(row);
                to_json(&answer)
            },
            "RemoveListAccess" => {
                let me = self.me()?;
                let list_id: ListId = var(op, "listId")?;
                self.remove_access(&list_id, &me)
            },
            "RemoveCollaborator" => {
                let list_id: ListId = var(op, "listId")?;
                let user_id: UserId = var(op, "userId")?;
                self.remove_access(&list_id, &user_id)
            },
            "AcceptListAccess" => {
                let me = self.me()?;
                let list_id: ListId = var(op, "listId")?;
                match self.accesses.iter_mut().find(|a| a.list_id == list_id && a.user_id == me) {
                    Some(access) if access.status == AccessStatus::Pending => {
                        access.status = AccessStatus::Accepted;
                        Ok(Value::Bool(true))
                    },
                    _ => Err("no pending invitation for this list".to_string()),
                }
            },
            "GetAccessesByListID" => {
                let list_id: ListId = var(op, "listId")?;
                let accesses: Vec<ListAccess> = self.accesses
                    .iter()
                    .filter(|a| a.list_id == list_id)
                    .map(|a| self.render_access(a))
                    .collect();
                to_json(&accesses)
            },

            // Todos
            "TodosGlobal" => {
                let todos: Vec<Todo> = self.todos.iter().map(|t| self.render_todo(t)).collect();
                to_json(&todos)
            },
            "GetTodos" => {
                let me = self.me()?;
                let todos: Vec<Todo> = self.todos
                    .iter()
                    .filter(|t| self.can_see(&t.list_id, &me))
                    .map(|t| self.render_todo(t))
                    .collect();
                to_json(&todos)
            },
            "GetTodosByList" => {
                let list_id: ListId = var(op, "id")?;
                let todos: Vec<Todo> = self.todos
                    .iter()
                    .filter(|t| t.list_id == list_id)
                    .map(|t| self.render_todo(t))
                    .collect();
                to_json(&todos)
            },
            "GetTodo" => {
                let id: TodoId = var(op, "id")?;
                let todo = self.todos.iter().find(|t| t.id == id).map(|t| self.render_todo(t));
                to_json(&todo)
            },
            "CreateTodo" => {
                let input: TodoInputVar = var(op, "input")?;
                let list_id = input.list_id.clone().ok_or_else(|| "listId is required".to_string())?;
                self.list_row(&list_id)?;
                let assigned_to = self.assignee(&input.assigned_to)?;
                let now = now();
                let row = TodoRow {
                    id: new_id(),
                    list_id,
                    title: input.title,
                    description: input.description,
                    priority: input.priority,
                    tags: input.tags,
                    completed: input.completed,
                    assigned_to,
                    start_date: input.start_date,
                    due_date: input.due_date,
                    created_at: now.clone(),
                    updated_at: now,
                };
                let id = row.id.clone();
                self.todos.push(row);
                self.todo_answer(&id)
            },
            "UpdateTodo" => {
                let id: TodoId = var(op, "id")?;
                let input: TodoInputVar = var(op, "input")?;
                let assigned_to = self.assignee(&input.assigned_to)?;
                let row = self.todo_row(&id)?;
                row.title = input.title;
                row.description = input.description;
                row.priority = input.priority;
                row.tags = input.tags;
                row.completed = input.completed;
                row.assigned_to = assigned_to;
                row.start_date = input.start_date;
                row.due_date = input.due_date;
                row.updated_at = now();
                self.todo_answer(&id)
            },
            "DeleteTodo" => {
                let id: TodoId = var(op, "id")?;
                let answer = self.todo_answer(&id)?;
                self.todos.retain(|t| t.id != id);
                Ok(answer)
            },
            "UpdateTodoTitle" => {
                let id: TodoId = var(op, "id")?;
                self.todo_row(&id)?.title = var(op, "title")?;
                self.todo_answer(&id)
            },
            "UpdateTodoDescription" => {
                let id: TodoId = var(op, "id")?;
                self.todo_row(&id)?.description = var(op, "description")?;
                self.todo_answer(&id)
            },
            "UpdateTodoPriority" => {
                let id: TodoId = var(op, "id")?;
                self.todo_row(&id)?.priority = var(op, "priority")?;
                self.todo_answer(&id)
            },
            "UpdateTodoAssignTo" => {
                let id: TodoId = var(op, "id")?;
                let assign_to: String = var(op, "assignTo")?;
                let assigned_to = self.assignee(&assign_to)?;
                self.todo_row(&id)?.assigned_to = assigned_to;
                self.todo_answer(&id)
            },
            "CompleteTodo" => {
                let id: TodoId = var(op, "id")?;
                self.todo_row(&id)?.completed = true;
                self.todo_answer(&id)
            },

            // Users
            "GetUsers" => to_json(&self.users),
            "GetUserByID" => {
                let id: UserId = var(op, "id")?;
                to_json(&self.users.iter().find(|u| u.id == id))
            },
            "GetUserByEmail" => {
                let me = self.me()?;
                to_json(&self.users.iter().find(|u| u.id == me))
            },
            "GetUsersByList" => {
                let list_id: ListId = var(op, "id")?;
                let owner = self.lists.iter().find(|l| l.id == list_id).map(|l| l.owner.clone());
                let users: Vec<&User> = self.users
                    .iter()
                    .filter(|u| {
                        owner.as_ref() == Some(&u.id)
                            || self.accesses.iter().any(|a| a.list_id == list_id && a.user_id == u.id)
                    })
                    .collect();
                to_json(&users)
            },
            "CreateUser" => {
                let input: UserInputVar = var(op, "input")?;
                let now = now();
                let user = User {
                    id: new_id(),
                    email: input.email,
                    github_id: Some(input.github_id),
                    role: Some(input.role),
                    created_at: Some(now.clone()),
                    updated_at: Some(now),
                };
                let answer = to_json(&user);
                self.users.push(user);
                answer
            },
            "UpdateUser" => {
                let id: UserId = var(op, "id")?;
                let input: UserInputVar = var(op, "input")?;
                let user = self.users.iter_mut().find(|u| u.id == id).ok_or_else(|| "user not found".to_string())?;
                user.email = input.email;
                user.github_id = Some(input.github_id);
                user.role = Some(input.role);
                user.updated_at = Some(now());
                to_json(&*user)
            },
            "DeleteUser" => {
                let id: UserId = var(op, "id")?;
                let answer = to_json(&self.user(&id)?)?;
                self.users.retain(|u| u.id != id);
                self.accesses.retain(|a| a.user_id != id);
                Ok(answer)
            },

            other => Err(format!("unknown operation {}", other)),
        }
    }

    fn me(&self) -> Result<UserId, String> {
        self.current_user.clone().ok_or_else(|| "unauthenticated".to_string())
    }

    fn user(&self, id: &UserId) -> Result<User, String> {
        self.users.iter().find(|u| &u.id == id).cloned().ok_or_else(|| "user not found".to_string())
    }

    fn assignee(&self, raw: &str) -> Result<Option<UserId>, String> {
        if raw.is_empty() {
            return Ok(None);
        }
        let id = UserId::from(raw);
        self.user(&id)?;
        Ok(Some(id))
    }

    fn list_row(&mut self, id: &ListId) -> Result<&mut ListRow, String> {
        self.lists.iter_mut().find(|l| &l.id == id).ok_or_else(|| "list not found".to_string())
    }

    fn todo_row(&mut self, id: &TodoId) -> Result<&mut TodoRow, String> {
        self.todos.iter_mut().find(|t| &t.id == id).ok_or_else(|| "todo not found".to_string())
    }

    fn insert_list(&mut self, owner: &UserId, input: ListInputVar) -> ListId {
        let now = now();
        let row = ListRow {
            id: new_id(),
            name: input.name,
            description: input.description,
            visibility: input.visibility,
            tags: input.tags,
            owner: owner.clone(),
            created_at: now.clone(),
            updated_at: now,
        };
        let id = row.id.clone();
        self.lists.push(row);
        self.accesses.push(AccessRow { list_id: id.clone(), user_id: owner.clone(), status: AccessStatus::Owner });
        id
    }

    fn remove_access(&mut self, list_id: &ListId, user_id: &UserId) -> Answer {
        let pos = self.accesses
            .iter()
            .position(|a| &a.list_id == list_id && &a.user_id == user_id && a.status != AccessStatus::Owner)
            .ok_or_else(|| "no such access".to_string())?;
        let row = self.accesses.remove(pos);
        to_json(&self.render_access(&row))
    }

    fn can_see(&self, list_id: &ListId, user_id: &UserId) -> bool {
        self.accesses.iter().any(|a| {
            &a.list_id == list_id && &a.user_id == user_id && a.status != AccessStatus::Pending
        })
    }

    fn shared_lists(&self, status: AccessStatus) -> Answer {
        let me = self.me()?;
        let lists: Vec<List> = self.lists
            .iter()
            .filter(|l| self.accesses.iter().any(|a| a.list_id == l.id && a.user_id == me && a.status == status))
            .map(|l| self.render_list(l))
            .collect();
        to_json(&lists)
    }

    fn list_answer(&self, id: &ListId) -> Answer {
        let row = self.lists.iter().find(|l| &l.id == id).ok_or_else(|| "list not found".to_string())?;
        to_json(&self.render_list(row))
    }

    fn todo_answer(&self, id: &TodoId) -> Answer {
        let row = self.todos.iter().find(|t| &t.id == id).ok_or_else(|| "todo not found".to_string())?;
        to_json(&self.render_todo(row))
    }

    /// A list without its todos and collaborators, as nested in other objects
    fn render_list_ref(&self, row: &ListRow) -> List {
        List {
            id: row.id.clone(),
            name: row.name.clone(),
            description: row.description.clone(),
            visibility: Some(row.visibility.clone()),
            tags: row.tags.clone(),
            owner: self.users.iter().find(|u| u.id == row.owner).cloned(),
            collaborators: Vec::new(),
            todos: Vec::new(),
            created_at: Some(row.created_at.clone()),
            updated_at: Some(row.updated_at.clone()),
        }
    }

    fn render_list(&self, row: &ListRow) -> List {
        let mut list = self.render_list_ref(row);
        list.collaborators = self.accesses
            .iter()
            .filter(|a| a.list_id == row.id && a.status != AccessStatus::Owner)
            .filter_map(|a| {
                self.users.iter().find(|u| u.id == a.user_id).map(|user| Collaborator {
                    user: user.clone(),
                    status: Some(a.status.clone()),
                })
            })
            .collect();
        list.todos = self.todos
            .iter()
            .filter(|t| t.list_id == row.id)
            .map(|t| Todo { list: None, ..self.render_todo(t) })
            .collect();
        list
    }

    fn render_todo(&self, row: &TodoRow) -> Todo {
        Todo {
            id: row.id.clone(),
            title: row.title.clone(),
            description: row.description.clone(),
            priority: Some(row.priority.clone()),
            tags: row.tags.clone(),
            completed: row.completed,
            list: self.lists.iter().find(|l| l.id == row.list_id).map(|l| Box::new(self.render_list_ref(l))),
            assigned_to: row.assigned_to.as_ref().and_then(|id| self.users.iter().find(|u| &u.id == id).cloned()),
            start_date: non_empty(&row.start_date),
            due_date: non_empty(&row.due_date),
            created_at: Some(row.created_at.clone()),
            updated_at: Some(row.updated_at.clone()),
        }
    }

    fn render_access(&self, row: &AccessRow) -> ListAccess {
        ListAccess {
            list: self.lists.iter().find(|l| l.id == row.list_id).map(|l| self.render_list_ref(l)),
            user: self.users.iter().find(|u| u.id == row.user_id).cloned(),
            status: Some(row.status.clone()),
        }
    }
}

fn var<T: serde::de::DeserializeOwned>(op: &Operation, name: &str) -> Result<T, String> {
    let value = op.variable(name).ok_or_else(|| format!("missing variable ${}", name))?;
    serde_json::from_value(value.clone()).map_err(|err| format!("invalid variable ${}: {}", name, err))
}

fn to_json<T: Serialize>(value: &T) -> Answer {
    serde_json::to_value(value).map_err(|err| err.to_string())
}

fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

fn new_id<T: From<String>>() -> T {
    T::from(uuid::Uuid::new_v4().to_hyphenated().to_string())
}

fn now() -> String {
    to_rfc3339(&Utc::now())
}

/// A [`Shell`] that records what controllers ask it to do
#[derive(Debug, Default)]
pub struct MockShell {
    toasts: Mutex<Vec<String>>,
    routes: Mutex<Vec<Route>>,
    redirects: Mutex<Vec<Url>>,
}

impl MockShell {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toasts(&self) -> Vec<String> {
        lock(&self.toasts).clone()
    }

    pub fn last_toast(&self) -> Option<String> {
        lock(&self.toasts).last().cloned()
    }

    pub fn routes(&self) -> Vec<Route> {
        lock(&self.routes).clone()
    }

    pub fn last_route(&self) -> Option<Route> {
        lock(&self.routes).last().cloned()
    }

    pub fn redirects(&self) -> Vec<Url> {
        lock(&self.redirects).clone()
    }
}

impl Shell for MockShell {
    fn toast(&self, message: &str) {
        log::info!("Toast: {}", message);
        lock(&self.toasts).push(message.to_string());
    }

    fn navigate(&self, route: Route) {
        lock(&self.routes).push(route);
    }

    fn redirect(&self, url: &Url) {
        lock(&self.redirects).push(url.clone());
    }
}

/// A [`Transport`] that holds back the answer to its first GraphQL request until [`GatedTransport::release`] is called
pub struct GatedTransport {
    inner: Arc<MockBackend>,
    gate: Notify,
    first: AtomicBool,
}

impl GatedTransport {
    pub fn new(inner: Arc<MockBackend>) -> Self {
        Self { inner, gate: Notify::new(), first: AtomicBool::new(true) }
    }

    pub fn release(&self) {
        self.gate.notify_one();
    }
}

#[async_trait]
impl Transport for GatedTransport {
    async fn execute(&self, operation: &Operation) -> Result<Value, Error> {
        let result = self.inner.execute(operation).await;
        if self.first.swap(false, Ordering::SeqCst) {
            self.gate.notified().await;
        }
        result
    }

    async fn execute_rest(&self, path: &str, method: Method, body: Option<Value>) -> Result<RestResponse, Error> {
        self.inner.execute_rest(path, method, body).await
    }
}

/// A controller [`Context`] wired to a mock backend and a mock shell
pub struct MockEnvironment {
    pub backend: Arc<MockBackend>,
    pub shell: Arc<MockShell>,
    pub context: Context,
}

impl MockEnvironment {
    /// `cookies` is the cookie header the session is read from, e.g. `user_role=writer`
    pub fn new(cookies: &str) -> Self {
        Self::with_backend(Arc::new(MockBackend::new()), cookies)
    }

    pub fn with_backend(backend: Arc<MockBackend>, cookies: &str) -> Self {
        let shell = Arc::new(MockShell::new());
        let settings = Settings::default();
        let context = Context {
            transport: backend.clone(),
            bus: NotificationBus::new(settings.bus_capacity),
            session: SessionContext::from_cookie_header(cookies),
            shell: shell.clone(),
            settings,
        };
        Self { backend, shell, context }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::client::{fetch, fetch_all};
    use crate::operations::lists::{self, ListInput};

    #[tokio::test]
    async fn created_lists_can_be_fetched_back() {
        let backend = MockBackend::new();
        let me = backend.add_user("me@example.com", Role::Writer);
        backend.log_in_as(&me);

        let input = ListInput {
            name: "Groceries".to_string(),
            description: "weekly".to_string(),
            visibility: Visibility::Shared,
            tags: vec!["home".to_string()],
        };
        let created: List = fetch(&backend, &lists::create_list(&input)).await.unwrap().unwrap();
        let fetched: List = fetch(&backend, &lists::get_list_by_id(&created.id)).await.unwrap().unwrap();
        assert_eq!(fetched.name, "Groceries");
        assert_eq!(fetched.tags, vec!["home".to_string()]);
        assert_eq!(fetched.owner.unwrap().email, "me@example.com");

        let mine: Vec<List> = fetch_all(&backend, &lists::get_lists()).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(backend.calls(), vec!["CreateList", "GetList", "Lists"]);
    }

    #[tokio::test]
    async fn unknown_ids_are_application_errors() {
        let backend = MockBackend::new();
        match backend.execute(&lists::delete_list(&ListId::from("nope"))).await {
            Err(Error::Application(errors)) => assert_eq!(errors[0].message, "list not found"),
            other => panic!("unexpected {:?}", other),
        }
        let missing: Option<List> = fetch(&backend, &lists::get_list_by_id(&ListId::from("nope"))).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn injected_failures_are_http_errors() {
        let backend = MockBackend::new_with_behaviour(Arc::new(Mutex::new(MockBehaviour::fail_now(1))));
        let err = backend.execute(&lists::get_lists_global()).await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        assert!(backend.execute(&lists::get_lists_global()).await.is_ok());
    }
}
