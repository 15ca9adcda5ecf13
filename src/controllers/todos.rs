//! The todos screen: every todo of the user (or of the application, for admins), across lists

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::fetch_all;
use crate::error::Error;
use crate::filter::TodoFilter;
use crate::ids::{ListId, TodoId};
use crate::operations::todos;
use crate::todo::Todo;
use crate::view_state::{lock, Liveness, RequestSequencer};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct TodosState {
    pub todos: Vec<Todo>,
    pub filter: TodoFilter,
}

impl TodosState {
    pub fn visible_todos(&self) -> Vec<Todo> {
        self.filter.apply(&self.todos)
    }

    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.completed).count()
    }

    pub fn total_count(&self) -> usize {
        self.todos.len()
    }
}

pub struct TodosController {
    ctx: Context,
    state: Mutex<TodosState>,
    seq: RequestSequencer,
    liveness: Liveness,
}

impl TodosController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Mutex::new(TodosState::default()),
            seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> TodosState {
        lock(&self.state).clone()
    }

    pub async fn load(&self) -> Outcome {
        match self.fetch_todos().await {
            Ok(outcome) => outcome,
            Err(err) => self.ctx.fail("Error fetching todos", "Failed to load todos.", err),
        }
    }

    async fn fetch_todos(&self) -> Result<Outcome, Error> {
        let query = if self.ctx.session.current().is_admin() { todos::get_todos_global() } else { todos::get_todos() };
        let token = self.seq.issue();
        let result = fetch_all::<Todo>(self.ctx.transport(), &query).await;
        if self.seq.accepts(token, &self.liveness) == false {
            return Ok(Outcome::Discarded);
        }
        lock(&self.state).todos = result?;
        Ok(Outcome::Applied)
    }

    pub fn set_priority_filter(&self, key: &str) {
        lock(&self.state).filter.set_priority_key(key);
    }

    pub fn set_completed_filter(&self, key: &str) {
        lock(&self.state).filter.set_completed_key(key);
    }

    pub fn set_title_filter(&self, prefix: &str) {
        lock(&self.state).filter.title_prefix = prefix.to_string();
    }

    pub fn set_list_name_filter(&self, prefix: &str) {
        lock(&self.state).filter.list_name_prefix = prefix.to_string();
    }

    pub fn clear_filters(&self) {
        lock(&self.state).filter.clear();
    }

    pub fn can_complete(&self, todo: &Todo) -> bool {
        todo.completed == false && self.ctx.session.current().can_edit()
    }

    /// To be called once the user confirmed
    pub async fn delete_todo(&self, todo_id: &TodoId) -> Outcome {
        let list_id = self.list_of(todo_id);
        if let Err(err) = self.ctx.transport.execute(&todos::delete_todo(todo_id)).await {
            return self.ctx.fail("Error deleting todo", "Failed to delete todo.", err);
        }
        let outdated = self.seq.supersede();
        lock(&self.state).todos.retain(|t| &t.id != todo_id);
        if outdated {
            if let Err(err) = self.fetch_todos().await {
                log::warn!("Unable to reload the todos after deleting {}: {}", todo_id, err);
            }
        }
        self.ctx.bus.publish(AppEvent::TodosChanged { list_id });
        self.ctx.succeed("Todo successfully removed")
    }

    /// To be called once the user confirmed
    pub async fn complete_todo(&self, todo_id: &TodoId) -> Outcome {
        let list_id = self.list_of(todo_id);
        if let Err(err) = self.ctx.transport.execute(&todos::complete_todo(todo_id)).await {
            return self.ctx.fail("Error completing todo", "Failed to complete todo.", err);
        }
        if let Err(err) = self.fetch_todos().await {
            log::warn!("Unable to reload the todos after completing {}: {}", todo_id, err);
            if let Some(done) = lock(&self.state).todos.iter_mut().find(|t| &t.id == todo_id) {
                done.completed = true;
            }
        }
        self.ctx.bus.publish(AppEvent::TodosChanged { list_id });
        self.ctx.succeed("Todo completed successfully")
    }

    /// A todo and its list, to fill the edit dialog with
    pub fn todo_for_edit(&self, todo_id: &TodoId) -> Option<(ListId, Todo)> {
        let state = lock(&self.state);
        let todo = state.todos.iter().find(|t| &t.id == todo_id)?;
        let list_id = todo.list.as_ref()?.id.clone();
        Some((list_id, todo.clone()))
    }

    fn list_of(&self, todo_id: &TodoId) -> Option<ListId> {
        lock(&self.state)
            .todos
            .iter()
            .find(|t| &t.id == todo_id)
            .and_then(|t| t.list.as_ref().map(|l| l.id.clone()))
    }
}

#[async_trait]
impl Controller for TodosController {
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.require_session().is_none() {
            return Outcome::Redirected;
        }
        self.load().await
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::TodosChanged { .. } | AppEvent::TodoAdded(_) | AppEvent::TodoUpdated(_) | AppEvent::Resync => {
                self.load().await
            },
            _ => Outcome::Discarded,
        }
    }

    fn tear_down(&self) {
        self.liveness.kill();
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::access::AccessStatus;
    use crate::list::Visibility;
    use crate::mock_backend::MockEnvironment;
    use crate::todo::Priority;
    use crate::user::Role;

    struct Fixture {
        env: MockEnvironment,
        groceries: ListId,
        milk: TodoId,
    }

    fn fixture(cookie: &str) -> Fixture {
        let env = MockEnvironment::new(cookie);
        let me = env.backend.add_user("me@example.com", Role::Writer);
        let friend = env.backend.add_user("friend@example.com", Role::Writer);
        env.backend.log_in_as(&me);

        let groceries = env.backend.add_list(&me, "Groceries", Visibility::Private);
        let milk = env.backend.add_todo(&groceries, "Milk", Priority::High);
        let bread = env.backend.add_todo(&groceries, "Bread", Priority::Low);
        env.backend.set_todo_completed(&bread, true);

        let work = env.backend.add_list(&friend, "Work", Visibility::Shared);
        env.backend.add_todo(&work, "Meeting", Priority::High);
        env.backend.share(&work, &me, AccessStatus::Accepted);

        let hidden = env.backend.add_list(&friend, "Hidden", Visibility::Private);
        env.backend.add_todo(&hidden, "Secret", Priority::Medium);

        Fixture { env, groceries, milk }
    }

    #[tokio::test]
    async fn counters_and_filters() {
        let f = fixture("user_role=writer");
        let screen = TodosController::new(f.env.context.clone());
        assert!(screen.activate().await.is_applied());

        let state = screen.state();
        assert_eq!(state.total_count(), 3);
        assert_eq!(state.completed_count(), 1);

        screen.set_priority_filter("HIGH");
        assert_eq!(screen.state().visible_todos().len(), 2);
        screen.set_list_name_filter("wo");
        let visible = screen.state().visible_todos();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].title, "Meeting");
        screen.set_title_filter("milk");
        assert!(screen.state().visible_todos().is_empty());

        screen.clear_filters();
        assert_eq!(screen.state().visible_todos().len(), 3);
        assert!(screen.state().filter.is_empty());
    }

    #[tokio::test]
    async fn admins_see_every_todo() {
        let f = fixture("user_role=admin");
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;
        assert_eq!(screen.state().total_count(), 4);
        assert_eq!(f.env.backend.calls(), vec!["TodosGlobal"]);
    }

    #[tokio::test]
    async fn delete_notifies_the_list_screen() {
        let f = fixture("user_role=writer");
        let mut events = f.env.context.bus.subscribe();
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;

        assert!(screen.delete_todo(&f.milk).await.is_applied());
        assert_eq!(screen.state().total_count(), 2);
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Todo successfully removed"));
        assert_eq!(events.drain(), vec![AppEvent::TodosChanged { list_id: Some(f.groceries.clone()) }]);
    }

    #[tokio::test]
    async fn failed_completion_changes_nothing() {
        let f = fixture("user_role=writer");
        let mut events = f.env.context.bus.subscribe();
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;
        let before = screen.state();

        f.env.backend.behaviour().lock().unwrap().mutation_behaviour = (0, 1);
        assert!(screen.complete_todo(&f.milk).await.is_failed());
        assert_eq!(screen.state(), before);
        assert!(events.drain().is_empty());
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Failed to complete todo."));

        assert!(screen.complete_todo(&f.milk).await.is_applied());
        assert_eq!(screen.state().completed_count(), 2);
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Todo completed successfully"));
    }

    #[tokio::test]
    async fn completion_is_shown_even_if_the_reload_fails() {
        let f = fixture("user_role=writer");
        let mut events = f.env.context.bus.subscribe();
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;

        f.env.backend.behaviour().lock().unwrap().query_behaviour = (0, 1);
        let before = f.env.shell.toasts().len();
        assert!(screen.complete_todo(&f.milk).await.is_applied());
        assert_eq!(screen.state().completed_count(), 2);
        assert_eq!(f.env.shell.toasts().split_off(before), vec!["Todo completed successfully".to_string()]);
        assert_eq!(events.drain(), vec![AppEvent::TodosChanged { list_id: Some(f.groceries.clone()) }]);
    }

    #[tokio::test]
    async fn edit_form_preparation() {
        let f = fixture("user_role=writer");
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;

        let (list_id, todo) = screen.todo_for_edit(&f.milk).unwrap();
        assert_eq!(list_id, f.groceries);
        assert_eq!(todo.title, "Milk");
        assert!(screen.can_complete(&todo));
        assert!(screen.todo_for_edit(&TodoId::from("unknown")).is_none());
    }

    #[tokio::test]
    async fn reloads_when_todos_change_elsewhere() {
        let f = fixture("user_role=writer");
        let screen = TodosController::new(f.env.context.clone());
        screen.activate().await;

        f.env.backend.add_todo(&f.groceries, "Eggs", Priority::Low);
        let outcome = screen.handle_event(&AppEvent::TodosChanged { list_id: Some(f.groceries.clone()) }).await;
        assert!(outcome.is_applied());
        assert_eq!(screen.state().total_count(), 4);
        assert!(matches!(screen.handle_event(&AppEvent::PendingListsChanged).await, Outcome::Discarded));
    }
}
