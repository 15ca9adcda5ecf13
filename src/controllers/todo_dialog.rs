//! The dialog creating a todo in a list, or editing one

use std::sync::Mutex;

use super::{Context, Outcome};
use crate::access::ListAccess;
use crate::bus::AppEvent;
use crate::client::{fetch, fetch_all};
use crate::error::Error;
use crate::format::{parse_datetime_input, to_rfc3339};
use crate::ids::{ListId, TodoId, UserId};
use crate::list::MAX_TAGS;
use crate::operations::lists;
use crate::operations::todos::{self, TodoInput};
use crate::todo::{Priority, Todo, MAX_TITLE_LENGTH};
use crate::user::User;
use crate::view_state::{any_error, lock, FieldState, TagSelection};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodoValidation {
    pub title: FieldState,
    pub priority: FieldState,
    pub assigned_to: FieldState,
    pub start: FieldState,
    pub due: FieldState,
}

impl TodoValidation {
    fn fields(&self) -> Vec<&FieldState> {
        vec![&self.title, &self.priority, &self.assigned_to, &self.start, &self.due]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TodoForm {
    pub is_open: bool,
    /// The todo being edited, `None` when creating one
    pub edit_id: Option<TodoId>,
    pub list_id: ListId,
    pub title: String,
    pub description: String,
    pub priority: Option<Priority>,
    pub tags: TagSelection,
    pub completed: bool,
    /// Email of the assignee, as typed or picked
    pub assignee_email: String,
    pub assignee_id: Option<UserId>,
    /// What the date-time pickers contain
    pub start_input: String,
    pub due_input: String,
    /// Users the todo can be assigned to: the list's owner and its collaborators who accepted the invitation
    pub existing_users: Vec<User>,
    pub validation: TodoValidation,
}

impl Default for TodoForm {
    fn default() -> Self {
        Self {
            is_open: false,
            edit_id: None,
            list_id: ListId::default(),
            title: String::new(),
            description: String::new(),
            priority: None,
            tags: TagSelection::new(MAX_TAGS),
            completed: false,
            assignee_email: String::new(),
            assignee_id: None,
            start_input: String::new(),
            due_input: String::new(),
            existing_users: Vec::new(),
            validation: TodoValidation::default(),
        }
    }
}

impl TodoForm {
    pub fn is_edit_mode(&self) -> bool {
        self.edit_id.is_some()
    }

    pub fn title_text(&self) -> &'static str {
        if self.is_edit_mode() { "Edit todo" } else { "Create todo" }
    }

    fn validate(&mut self) {
        let length = self.title.trim().chars().count();
        self.validation.title = if length == 0 {
            FieldState::error("Todo title should not be empty")
        } else if length > MAX_TITLE_LENGTH {
            FieldState::error(format!("Todo title should not exceed {} symbols", MAX_TITLE_LENGTH))
        } else {
            FieldState::valid()
        };

        self.validation.priority = match &self.priority {
            Some(p) if p.as_str().is_empty() == false => FieldState::valid(),
            _ => FieldState::error("Todo priority should not be empty"),
        };

        let email = self.assignee_email.trim();
        self.validation.assigned_to = if email.is_empty() || self.existing_users.iter().any(|u| u.email == email) {
            FieldState::valid()
        } else {
            FieldState::error("This user is not part of the list")
        };

        self.validation.start = date_state(&self.start_input);
        self.validation.due = date_state(&self.due_input);
    }

    fn to_input(&self) -> Option<TodoInput> {
        Some(TodoInput {
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            priority: self.priority.clone()?,
            tags: self.tags.tags().to_vec(),
            list_id: self.list_id.clone(),
            assigned_to: self.assignee_id.clone(),
            start_date: parse_datetime_input(&self.start_input).ok()?.map(|d| to_rfc3339(&d)),
            due_date: parse_datetime_input(&self.due_input).ok()?.map(|d| to_rfc3339(&d)),
            completed: self.completed,
        })
    }
}

fn date_state(input: &str) -> FieldState {
    match parse_datetime_input(input) {
        Ok(_) => FieldState::valid(),
        Err(()) => FieldState::error("Date time is not valid"),
    }
}

pub struct TodoDialogController {
    ctx: Context,
    form: Mutex<TodoForm>,
}

impl TodoDialogController {
    pub fn new(ctx: Context) -> Self {
        Self { ctx, form: Mutex::new(TodoForm::default()) }
    }

    pub fn form(&self) -> TodoForm {
        lock(&self.form).clone()
    }

    /// Open an empty dialog for a new todo of `list_id`
    pub async fn open_create(&self, list_id: &ListId) -> Outcome {
        *lock(&self.form) = TodoForm {
            is_open: true,
            list_id: list_id.clone(),
            ..TodoForm::default()
        };
        self.fetch_users(list_id).await
    }

    /// Open the dialog filled with an existing todo
    pub async fn open_edit(&self, list_id: &ListId, todo: &Todo) -> Outcome {
        let (assignee_email, assignee_id) = match &todo.assigned_to {
            Some(user) => (user.email.clone(), Some(user.id.clone())),
            None => (String::new(), None),
        };
        *lock(&self.form) = TodoForm {
            is_open: true,
            edit_id: Some(todo.id.clone()),
            list_id: list_id.clone(),
            title: todo.title.clone(),
            description: todo.description.clone(),
            priority: todo.priority.clone(),
            tags: TagSelection::with_tags(&todo.tags, MAX_TAGS),
            completed: todo.completed,
            assignee_email,
            assignee_id,
            start_input: todo.start().map(|d| to_rfc3339(&d)).unwrap_or_default(),
            due_input: todo.due().map(|d| to_rfc3339(&d)).unwrap_or_default(),
            ..TodoForm::default()
        };
        self.fetch_users(list_id).await
    }

    async fn fetch_users(&self, list_id: &ListId) -> Outcome {
        let accesses = match fetch_all::<ListAccess>(self.ctx.transport(), &lists::get_accesses_by_list_id(list_id)).await {
            Ok(accesses) => accesses,
            Err(err) => return self.ctx.fail("Error fetching users", "Failed to fetch users.", err),
        };
        let users: Vec<User> = accesses
            .into_iter()
            .filter(|a| a.is_pending() == false)
            .filter_map(|a| a.user)
            .collect();

        let mut form = lock(&self.form);
        // The dialog may have been closed, or opened for another list, meanwhile
        if form.is_open == false || &form.list_id != list_id {
            return Outcome::Discarded;
        }
        form.existing_users = users;
        Outcome::Applied
    }

    pub fn cancel(&self) {
        *lock(&self.form) = TodoForm::default();
    }

    pub fn set_title(&self, title: &str) {
        let mut form = lock(&self.form);
        form.title = title.to_string();
        if title.trim().is_empty() == false {
            form.validation.title.clear();
        }
    }

    pub fn set_description(&self, description: &str) {
        lock(&self.form).description = description.to_string();
    }

    pub fn set_priority(&self, priority: Priority) {
        let mut form = lock(&self.form);
        form.priority = Some(priority);
        form.validation.priority.clear();
    }

    pub fn set_completed(&self, completed: bool) {
        lock(&self.form).completed = completed;
    }

    /// Pick the assignee among the existing users
    pub fn select_assignee(&self, user: &User) {
        let mut form = lock(&self.form);
        form.assignee_email = user.email.clone();
        form.assignee_id = Some(user.id.clone());
        form.validation.assigned_to.clear();
    }

    /// The assignee email typed by hand. It is checked against the existing users on submission
    pub fn set_assignee_email(&self, email: &str) {
        let mut form = lock(&self.form);
        let email = email.trim();
        form.assignee_id = form.existing_users.iter().find(|u| u.email == email).map(|u| u.id.clone());
        form.assignee_email = email.to_string();
    }

    pub fn set_start(&self, input: &str) {
        let mut form = lock(&self.form);
        form.start_input = input.to_string();
        form.validation.start = date_state(input);
    }

    pub fn set_due(&self, input: &str) {
        let mut form = lock(&self.form);
        form.due_input = input.to_string();
        form.validation.due = date_state(input);
    }

    /// Returns false when the tag limit is reached
    pub fn select_tag(&self, tag: &str) -> bool {
        let selected = lock(&self.form).tags.select(tag);
        if selected == false {
            self.ctx.shell.toast(&format!("You can select a maximum of {} tags.", MAX_TAGS));
        }
        selected
    }

    pub fn deselect_tag(&self, tag: &str) {
        lock(&self.form).tags.deselect(tag);
    }

    pub async fn submit(&self) -> Outcome {
        let (edit_id, input) = {
            let mut form = lock(&self.form);
            form.validate();
            if any_error(form.validation.fields()) {
                log::debug!("Todo form is invalid: {:?}", form.validation);
                return Outcome::Blocked;
            }
            let mut input = match form.to_input() {
                Some(input) => input,
                None => return Outcome::Blocked,
            };
            if form.edit_id.is_none() {
                input.completed = false;
            }
            (form.edit_id.clone(), input)
        };
        let list_id = input.list_id.clone();

        match edit_id {
            None => match self.send(&todos::create_todo(&input)).await {
                Ok(todo) => {
                    self.ctx.bus.publish(AppEvent::TodoAdded(todo));
                    self.ctx.bus.publish(AppEvent::TodosChanged { list_id: Some(list_id) });
                    self.cancel();
                    self.ctx.succeed(&format!("Todo created with title: {}", input.title))
                },
                Err(err) => self.ctx.fail("Error creating todo", "Failed to create todo.", err),
            },
            Some(todo_id) => match self.send(&todos::update_todo(&todo_id, &input)).await {
                Ok(todo) => {
                    self.ctx.bus.publish(AppEvent::TodoUpdated(todo));
                    self.ctx.bus.publish(AppEvent::TodosChanged { list_id: Some(list_id) });
                    self.cancel();
                    self.ctx.succeed(&format!("Todo updated with title: {}", input.title))
                },
                Err(err) => self.ctx.fail("Error updating todo", "Failed to update todo.", err),
            },
        }
    }

    async fn send(&self, operation: &crate::operations::Operation) -> Result<Todo, Error> {
        fetch::<Todo>(self.ctx.transport(), operation)
            .await?
            .ok_or_else(|| Error::Protocol(format!("{} returned no todo", operation.name())))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::access::AccessStatus;
    use crate::list::Visibility;
    use crate::mock_backend::MockEnvironment;
    use crate::user::Role;

    struct Fixture {
        env: MockEnvironment,
        list: ListId,
        friend: UserId,
    }

    fn fixture() -> Fixture {
        let env = MockEnvironment::new("user_role=writer");
        let me = env.backend.add_user("me@example.com", Role::Writer);
        let friend = env.backend.add_user("friend@example.com", Role::Writer);
        let invited = env.backend.add_user("invited@example.com", Role::Reader);
        env.backend.log_in_as(&me);
        let list = env.backend.add_list(&me, "Groceries", Visibility::Shared);
        env.backend.share(&list, &friend, AccessStatus::Accepted);
        env.backend.share(&list, &invited, AccessStatus::Pending);
        Fixture { env, list, friend }
    }

    #[tokio::test]
    async fn empty_title_is_not_sent() {
        let f = fixture();
        let dialog = TodoDialogController::new(f.env.context.clone());
        dialog.open_create(&f.list).await;
        f.env.backend.reset_calls();

        dialog.set_title("");
        dialog.set_priority(Priority::Low);
        assert!(matches!(dialog.submit().await, Outcome::Blocked));
        let form = dialog.form();
        assert!(form.validation.title.is_error());
        assert_eq!(form.validation.title.message, "Todo title should not be empty");
        assert_eq!(f.env.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn assignee_must_be_a_collaborator() {
        let f = fixture();
        let dialog = TodoDialogController::new(f.env.context.clone());
        assert!(dialog.open_create(&f.list).await.is_applied());
        let emails: Vec<String> = dialog.form().existing_users.iter().map(|u| u.email.clone()).collect();
        assert_eq!(emails, vec!["me@example.com".to_string(), "friend@example.com".to_string()]);
        f.env.backend.reset_calls();

        dialog.set_title("Milk");
        dialog.set_priority(Priority::High);
        dialog.set_assignee_email("invited@example.com");
        assert!(matches!(dialog.submit().await, Outcome::Blocked));
        assert_eq!(dialog.form().validation.assigned_to.message, "This user is not part of the list");
        assert_eq!(f.env.backend.call_count(), 0);

        let friend = dialog.form().existing_users[1].clone();
        dialog.select_assignee(&friend);
        assert!(dialog.form().validation.assigned_to.is_error() == false);
        assert!(dialog.submit().await.is_applied());
        assert_eq!(f.env.backend.calls(), vec!["CreateTodo"]);
    }

    #[tokio::test]
    async fn creating_a_todo() {
        let f = fixture();
        let mut events = f.env.context.bus.subscribe();
        let dialog = TodoDialogController::new(f.env.context.clone());
        dialog.open_create(&f.list).await;
        assert_eq!(dialog.form().title_text(), "Create todo");

        dialog.set_title("  Milk ");
        dialog.set_priority(Priority::Medium);
        dialog.set_assignee_email("friend@example.com");
        dialog.set_start("2024-05-01T09:00:00+02:00");
        dialog.set_due("");
        dialog.select_tag("dairy");
        assert!(dialog.submit().await.is_applied());
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Todo created with title: Milk"));
        assert!(dialog.form().is_open == false);

        let events = events.drain();
        assert_eq!(events.len(), 2);
        match &events[0] {
            AppEvent::TodoAdded(todo) => {
                assert_eq!(todo.title, "Milk");
                assert_eq!(todo.assigned_to.as_ref().map(|u| u.id.clone()), Some(f.friend.clone()));
                assert_eq!(todo.start_date.as_deref(), Some("2024-05-01T09:00:00+02:00"));
                assert_eq!(todo.due_date, None);
                assert_eq!(todo.tags, vec!["dairy".to_string()]);
                assert!(todo.completed == false);
            },
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(events[1], AppEvent::TodosChanged { list_id: Some(f.list.clone()) });
    }

    #[tokio::test]
    async fn editing_a_todo() {
        let f = fixture();
        let id = f.env.backend.add_todo(&f.list, "Milk", Priority::Low);
        f.env.backend.set_todo_dates(&id, "2024-05-01T09:00:00+00:00", "2024-05-02T09:00:00+00:00");
        let todo = f.env.backend.todo(&id).unwrap();

        let dialog = TodoDialogController::new(f.env.context.clone());
        dialog.open_edit(&f.list, &todo).await;
        let form = dialog.form();
        assert_eq!(form.title_text(), "Edit todo");
        assert_eq!(form.start_input, "2024-05-01T09:00:00+00:00");

        dialog.set_title("Oat milk");
        dialog.set_completed(true);
        assert!(dialog.submit().await.is_applied());
        let stored = f.env.backend.todo(&id).unwrap();
        assert_eq!(stored.title, "Oat milk");
        assert!(stored.completed);
        assert_eq!(stored.due_date.as_deref(), Some("2024-05-02T09:00:00+00:00"));
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Todo updated with title: Oat milk"));
    }

    #[tokio::test]
    async fn garbage_dates_are_rejected() {
        let f = fixture();
        let dialog = TodoDialogController::new(f.env.context.clone());
        dialog.open_create(&f.list).await;
        dialog.set_title("Milk");
        dialog.set_priority(Priority::Low);
        dialog.set_due("next tuesday");
        assert_eq!(dialog.form().validation.due.message, "Date time is not valid");
        assert!(matches!(dialog.submit().await, Outcome::Blocked));

        dialog.set_due("2024-05-01 10:00");
        assert!(dialog.form().validation.due.is_error() == false);
        assert!(dialog.submit().await.is_applied());
    }

    #[tokio::test]
    async fn missing_priority_and_long_titles() {
        let f = fixture();
        let dialog = TodoDialogController::new(f.env.context.clone());
        dialog.open_create(&f.list).await;
        dialog.set_title(&"x".repeat(257));
        assert!(matches!(dialog.submit().await, Outcome::Blocked));
        let validation = dialog.form().validation;
        assert_eq!(validation.title.message, "Todo title should not exceed 256 symbols");
        assert_eq!(validation.priority.message, "Todo priority should not be empty");
    }

    #[tokio::test]
    async fn failing_user_fetch() {
        let f = fixture();
        f.env.backend.behaviour().lock().unwrap().query_behaviour = (0, 1);
        let dialog = TodoDialogController::new(f.env.context.clone());
        assert!(dialog.open_create(&f.list).await.is_failed());
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Failed to fetch users."));
        assert!(dialog.form().is_open);
        assert!(dialog.form().existing_users.is_empty());
    }
}
