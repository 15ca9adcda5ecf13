//! The screen of a single list: its details, its todos, and the actions on both

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::{fetch, fetch_all};
use crate::error::Error;
use crate::filter::TodoFilter;
use crate::format;
use crate::ids::{ListId, TodoId, UserId};
use crate::list::List;
use crate::operations::{lists, todos};
use crate::todo::Todo;
use crate::traits::Route;
use crate::view_state::{lock, Liveness, RequestSequencer};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListState {
    pub list_id: Option<ListId>,
    pub list: Option<List>,
    pub todos: Vec<Todo>,
    pub filter: TodoFilter,
    /// The todo whose details are displayed
    pub selected: Option<Todo>,
}

impl ListState {
    /// The todos that pass the filters
    pub fn visible_todos(&self) -> Vec<Todo> {
        self.filter.apply(&self.todos)
    }

    /// e.g. `50.00%`
    pub fn completion(&self) -> String {
        format::display_completion_percentage(&self.todos)
    }
}

pub struct ListController {
    ctx: Context,
    state: Mutex<ListState>,
    todos_seq: RequestSequencer,
    list_seq: RequestSequencer,
    liveness: Liveness,
}

impl ListController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Mutex::new(ListState::default()),
            todos_seq: RequestSequencer::new(),
            list_seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> ListState {
        lock(&self.state).clone()
    }

    fn list_id(&self) -> Option<ListId> {
        lock(&self.state).list_id.clone()
    }

    /// Display the list `list_id`
    pub async fn open(&self, list_id: ListId) -> Outcome {
        {
            let mut state = lock(&self.state);
            *state = ListState::default();
            state.list_id = Some(list_id);
        }
        self.activate().await
    }

    pub async fn load_todos(&self) -> Outcome {
        match self.fetch_todos().await {
            Ok(outcome) => outcome,
            Err(err) => self.ctx.fail("Error fetching todos", "Failed to load todos.", err),
        }
    }

    /// Like `load_todos`, but leaves reporting a failure to the caller
    async fn fetch_todos(&self) -> Result<Outcome, Error> {
        let list_id = match self.list_id() {
            Some(id) => id,
            None => return Ok(Outcome::Blocked),
        };
        let token = self.todos_seq.issue();
        let result = fetch_all::<Todo>(self.ctx.transport(), &todos::get_todos_by_list(&list_id)).await;
        if self.todos_seq.accepts(token, &self.liveness) == false {
            return Ok(Outcome::Discarded);
        }
        let todos = result?;
        let mut state = lock(&self.state);
        if let Some(selected) = state.selected.as_ref().map(|t| t.id.clone()) {
            state.selected = todos.iter().find(|t| t.id == selected).cloned();
        }
        state.todos = todos;
        Ok(Outcome::Applied)
    }

    pub async fn load_list(&self) -> Outcome {
        let list_id = match self.list_id() {
            Some(id) => id,
            None => return Outcome::Blocked,
        };
        let token = self.list_seq.issue();
        let result = fetch::<List>(self.ctx.transport(), &lists::get_list_by_id(&list_id)).await;
        if self.list_seq.accepts(token, &self.liveness) == false {
            return Outcome::Discarded;
        }
        match result {
            Ok(Some(list)) => {
                lock(&self.state).list = Some(list);
                Outcome::Applied
            },
            Ok(None) => {
                let err = Error::Application(vec![crate::error::GraphQlError {
                    message: format!("list {} not found", list_id),
                    path: Vec::new(),
                }]);
                self.ctx.fail("Error fetching list", "Failed to load list", err)
            },
            Err(err) => self.ctx.fail("Error fetching list", "Failed to load list", err),
        }
    }

    pub fn set_priority_filter(&self, key: &str) {
        lock(&self.state).filter.set_priority_key(key);
    }

    pub fn set_completed_filter(&self, key: &str) {
        lock(&self.state).filter.set_completed_key(key);
    }

    pub fn clear_filters(&self) {
        lock(&self.state).filter.clear();
    }

    /// Show the details of a todo
    pub fn select_todo(&self, todo_id: &TodoId) {
        let mut state = lock(&self.state);
        state.selected = state.todos.iter().find(|t| &t.id == todo_id).cloned();
    }

    pub fn close_details(&self) {
        lock(&self.state).selected = None;
    }

    /// Whether the "complete" button is displayed for a todo
    pub fn can_complete(&self, todo: &Todo) -> bool {
        todo.completed == false && self.ctx.session.current().can_edit()
    }

    /// Whether collaborators can be managed (only lists that are not private can be shared)
    pub fn is_list_shared(&self) -> bool {
        let shareable = lock(&self.state).list.as_ref().map(|l| l.is_private() == false).unwrap_or(false);
        shareable && self.ctx.session.current().can_edit()
    }

    pub fn back_to_lists(&self) {
        self.close_details();
        self.ctx.shell.navigate(Route::Lists);
    }

    /// Deletes the selected todo. To be called once the user confirmed
    pub async fn delete_selected_todo(&self) -> Outcome {
        let (list_id, todo) = match (self.list_id(), lock(&self.state).selected.clone()) {
            (Some(list_id), Some(todo)) => (list_id, todo),
            _ => return Outcome::Blocked,
        };

        if let Err(err) = self.ctx.transport.execute(&todos::delete_todo(&todo.id)).await {
            return self.ctx.fail("Error deleting todo", "Failed to delete todo.", err);
        }
        let outdated = self.todos_seq.supersede();
        {
            let mut state = lock(&self.state);
            state.todos.retain(|t| t.id != todo.id);
            state.selected = None;
        }
        if outdated {
            if let Err(err) = self.fetch_todos().await {
                log::warn!("Unable to reload the todos after deleting {}: {}", todo.id, err);
            }
        }
        self.ctx.bus.publish(AppEvent::TodosChanged { list_id: Some(list_id) });
        self.ctx.succeed(&format!("Todo removed with name: {}", todo.title))
    }

    /// Completes the selected todo. To be called once the user confirmed
    pub async fn complete_selected_todo(&self) -> Outcome {
        let (list_id, todo) = match (self.list_id(), lock(&self.state).selected.clone()) {
            (Some(list_id), Some(todo)) => (list_id, todo),
            _ => return Outcome::Blocked,
        };

        if let Err(err) = self.ctx.transport.execute(&todos::complete_todo(&todo.id)).await {
            return self.ctx.fail("Error completing todo", "Failed to complete todo.", err);
        }
        self.close_details();
        if let Err(err) = self.fetch_todos().await {
            log::warn!("Unable to reload the todos after completing {}: {}", todo.id, err);
            if let Some(done) = lock(&self.state).todos.iter_mut().find(|t| t.id == todo.id) {
                done.completed = true;
            }
        }
        self.ctx.bus.publish(AppEvent::TodosChanged { list_id: Some(list_id) });
        self.ctx.succeed(&format!("Todo completed with name: {}", todo.title))
    }

    /// Deletes the whole list. To be called once the user confirmed
    pub async fn delete_list(&self) -> Outcome {
        let list_id = match self.list_id() {
            Some(id) => id,
            None => return Outcome::Blocked,
        };
        let name = lock(&self.state).list.as_ref().map(|l| l.name.clone()).unwrap_or_default();

        if let Err(err) = self.ctx.transport.execute(&lists::delete_list(&list_id)).await {
            return self.ctx.fail("Error deleting list", "Failed to delete list.", err);
        }
        self.ctx.bus.publish(AppEvent::ListDeleted(list_id.clone()));
        self.ctx.bus.publish(AppEvent::TodosChanged { list_id: Some(list_id) });
        self.ctx.shell.navigate(Route::Lists);
        self.ctx.succeed(&format!("List removed with name: {}", name))
    }

    /// The list, freshly fetched, to fill the edit dialog with
    pub async fn list_for_edit(&self) -> Option<List> {
        self.load_list().await;
        lock(&self.state).list.clone()
    }

    /// The selected todo and its list, to fill the edit dialog with
    pub fn todo_for_edit(&self) -> Option<(ListId, Todo)> {
        let state = lock(&self.state);
        match (&state.list_id, &state.selected) {
            (Some(list_id), Some(todo)) => Some((list_id.clone(), todo.clone())),
            _ => None,
        }
    }

    /// The list and its owner, to open the collaborators dialog with
    pub fn collaborators_target(&self) -> Option<(ListId, Option<UserId>)> {
        let state = lock(&self.state);
        let owner = state.list.as_ref().and_then(|l| l.owner.as_ref()).map(|o| o.id.clone());
        state.list_id.clone().map(|id| (id, owner))
    }

    /// A patch dropped a todos load still in flight: fetch again
    async fn refetch_todos_if(&self, outdated: bool) -> Outcome {
        if outdated {
            self.load_todos().await
        } else {
            Outcome::Applied
        }
    }

    fn belongs_here(&self, todo: &Todo) -> bool {
        match (self.list_id(), todo.list.as_ref()) {
            (Some(mine), Some(list)) => mine == list.id,
            _ => false,
        }
    }
}

#[async_trait]
impl Controller for ListController {
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.require_session().is_none() {
            return Outcome::Redirected;
        }
        let todos = self.load_todos().await;
        let list = self.load_list().await;
        match (todos, list) {
            (Outcome::Applied, other) => other,
            (other, _) => other,
        }
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::TodoAdded(todo) if self.belongs_here(todo) => {
                let outdated = self.todos_seq.supersede();
                {
                    let mut state = lock(&self.state);
                    if state.todos.iter().any(|t| t.id == todo.id) == false {
                        state.todos.push(todo.clone());
                    }
                }
                self.refetch_todos_if(outdated).await
            },
            AppEvent::TodoUpdated(todo) => {
                let known = lock(&self.state).todos.iter().any(|t| t.id == todo.id);
                if known == false {
                    return Outcome::Discarded;
                }
                let outdated = self.todos_seq.supersede();
                {
                    let mut state = lock(&self.state);
                    if let Some(existing) = state.todos.iter_mut().find(|t| t.id == todo.id) {
                        existing.merge(todo.clone());
                    }
                    state.selected = None;
                }
                self.refetch_todos_if(outdated).await
            },
            AppEvent::ListUpdated(list) if Some(&list.id) == self.list_id().as_ref() => self.load_list().await,
            AppEvent::Resync => self.activate().await,
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
    use std::sync::Arc;

    use crate::list::Visibility;
    use crate::mock_backend::{GatedTransport, MockBackend, MockEnvironment};
    use crate::mock_behaviour::MockBehaviour;
    use crate::todo::Priority;
    use crate::user::Role;

    struct Fixture {
        env: MockEnvironment,
        list: ListId,
        milk: TodoId,
    }

    fn fixture(cookie: &str) -> Fixture {
        let env = MockEnvironment::new(cookie);
        let me = env.backend.add_user("me@example.com", Role::Writer);
        env.backend.log_in_as(&me);
        let list = env.backend.add_list(&me, "Groceries", Visibility::Shared);
        let milk = env.backend.add_todo(&list, "Milk", Priority::High);
        env.backend.add_todo(&list, "Bread", Priority::Low);
        Fixture { env, list, milk }
    }

    #[tokio::test]
    async fn open_loads_todos_and_details() {
        let f = fixture("user_role=writer");
        let screen = ListController::new(f.env.context.clone());
        assert!(screen.open(f.list.clone()).await.is_applied());

        let state = screen.state();
        assert_eq!(state.list.as_ref().unwrap().name, "Groceries");
        assert_eq!(state.todos.len(), 2);
        assert_eq!(state.completion(), "0.00%");
        assert!(screen.is_list_shared());
    }

    #[tokio::test]
    async fn filters_and_clear() {
        let f = fixture("user_role=writer");
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;

        screen.set_priority_filter("HIGH");
        assert_eq!(screen.state().visible_todos().len(), 1);
        screen.set_completed_filter("Completed");
        assert!(screen.state().visible_todos().is_empty());

        screen.clear_filters();
        screen.clear_filters();
        assert_eq!(screen.state().visible_todos().len(), 2);
    }

    #[tokio::test]
    async fn complete_reloads_and_notifies() {
        let f = fixture("user_role=writer");
        let mut events = f.env.context.bus.subscribe();
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;

        screen.select_todo(&f.milk);
        assert!(screen.complete_selected_todo().await.is_applied());
        let state = screen.state();
        assert!(state.selected.is_none());
        assert!(state.todos.iter().find(|t| t.id == f.milk).unwrap().completed);
        assert_eq!(state.completion(), "50.00%");
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Todo completed with name: Milk"));
        assert_eq!(events.drain(), vec![AppEvent::TodosChanged { list_id: Some(f.list.clone()) }]);
    }

    #[tokio::test]
    async fn completed_todo_stays_completed_when_the_reload_fails() {
        let f = fixture("user_role=writer");
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;
        screen.select_todo(&f.milk);

        f.env.backend.behaviour().lock().unwrap().query_behaviour = (0, 1);
        let before = f.env.shell.toasts().len();
        assert!(screen.complete_selected_todo().await.is_applied());
        assert!(screen.state().todos.iter().find(|t| t.id == f.milk).unwrap().completed);
        assert_eq!(f.env.shell.toasts().split_off(before), vec!["Todo completed with name: Milk".to_string()]);
    }

    #[tokio::test]
    async fn added_todo_survives_an_older_load() {
        let backend = Arc::new(MockBackend::new());
        let me = backend.add_user("me@example.com", Role::Writer);
        backend.log_in_as(&me);
        let list = backend.add_list(&me, "Groceries", Visibility::Private);
        backend.add_todo(&list, "Milk", Priority::High);

        let gated = Arc::new(GatedTransport::new(backend.clone()));
        let mut ctx = MockEnvironment::with_backend(backend.clone(), "user_role=writer").context;
        ctx.transport = gated.clone();
        let screen = ListController::new(ctx);

        let slow = screen.open(list.clone());
        let patch = async {
            let id = backend.add_todo(&list, "Bread", Priority::Low);
            let outcome = screen.handle_event(&AppEvent::TodoAdded(backend.todo(&id).unwrap())).await;
            gated.release();
            outcome
        };
        let (_, patch) = tokio::join!(slow, patch);

        assert!(patch.is_applied());
        let mut titles = screen.state().todos.iter().map(|t| t.title.clone()).collect::<Vec<_>>();
        titles.sort();
        assert_eq!(titles, vec!["Bread".to_string(), "Milk".to_string()]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_the_todo() {
        let f = fixture("user_role=writer");
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;
        screen.select_todo(&f.milk);

        f.env.backend.behaviour().lock().unwrap().mutation_behaviour = (0, 1);
        assert!(screen.delete_selected_todo().await.is_failed());
        assert_eq!(screen.state().todos.len(), 2);
        assert!(screen.state().selected.is_some());
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Failed to delete todo."));

        assert!(screen.delete_selected_todo().await.is_applied());
        assert_eq!(screen.state().todos.len(), 1);
        assert_eq!(f.env.backend.todo_count(), 1);
    }

    #[tokio::test]
    async fn delete_list_goes_back_to_lists() {
        let f = fixture("user_role=writer");
        let mut events = f.env.context.bus.subscribe();
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;

        assert!(screen.delete_list().await.is_applied());
        assert_eq!(f.env.shell.last_route(), Some(Route::Lists));
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("List removed with name: Groceries"));
        assert_eq!(events.try_next(), Some(AppEvent::ListDeleted(f.list.clone())));
    }

    #[tokio::test]
    async fn events_from_dialogs_patch_the_table() {
        let f = fixture("user_role=writer");
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;

        let mut added = f.env.backend.todo(&f.milk).unwrap();
        added.id = TodoId::from("other");
        assert!(screen.handle_event(&AppEvent::TodoAdded(added.clone())).await.is_applied());
        screen.handle_event(&AppEvent::TodoAdded(added)).await;
        assert_eq!(screen.state().todos.len(), 3);

        let mut elsewhere = f.env.backend.todo(&f.milk).unwrap();
        elsewhere.id = TodoId::from("elsewhere");
        elsewhere.list.as_mut().unwrap().id = ListId::from("another list");
        assert!(matches!(screen.handle_event(&AppEvent::TodoAdded(elsewhere)).await, Outcome::Discarded));

        let mut renamed = f.env.backend.todo(&f.milk).unwrap();
        renamed.title = "Oat milk".to_string();
        screen.handle_event(&AppEvent::TodoUpdated(renamed)).await;
        assert!(screen.state().todos.iter().any(|t| t.title == "Oat milk"));
    }

    #[tokio::test]
    async fn readers_cannot_complete() {
        let f = fixture("user_role=reader");
        let screen = ListController::new(f.env.context.clone());
        screen.open(f.list.clone()).await;
        let todo = screen.state().todos[0].clone();
        assert!(screen.can_complete(&todo) == false);
        assert!(screen.is_list_shared() == false);
    }

    #[tokio::test]
    async fn failing_list_query_keeps_the_todos() {
        let f = fixture("user_role=writer");
        *f.env.backend.behaviour().lock().unwrap() = MockBehaviour {
            query_behaviour: (1, 1),
            ..MockBehaviour::default()
        };
        let screen = ListController::new(f.env.context.clone());
        assert!(screen.open(f.list.clone()).await.is_failed());
        assert_eq!(screen.state().todos.len(), 2);
        assert!(screen.state().list.is_none());
        assert_eq!(f.env.shell.last_toast().as_deref(), Some("Failed to load list"));
    }
}
