//! The lists screen: the user's own lists (every list for admins) and the lists shared with them

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::fetch_all;
use crate::format::list_status_text;
use crate::ids::ListId;
use crate::list::List;
use crate::operations::lists;
use crate::session::Session;
use crate::traits::Route;
use crate::view_state::{lock, Liveness, RequestSequencer};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListsState {
    pub lists: Vec<List>,
    /// Lists of other users, whose invitation has been accepted
    pub accepted: Vec<List>,
    /// Caption above the lists
    pub status_text: &'static str,
}

pub struct ListsController {
    ctx: Context,
    state: Mutex<ListsState>,
    seq: RequestSequencer,
    liveness: Liveness,
}

impl ListsController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Mutex::new(ListsState::default()),
            seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> ListsState {
        lock(&self.state).clone()
    }

    /// Fetch both tables. When one of them fails, the other one is still updated
    pub async fn load(&self) -> Outcome {
        let session = self.ctx.session.current();
        let own_query = if session.is_admin() { lists::get_lists_global() } else { lists::get_lists() };

        let token = self.seq.issue();
        let own = fetch_all::<List>(self.ctx.transport(), &own_query).await;
        let accepted = fetch_all::<List>(self.ctx.transport(), &lists::get_accepted_lists()).await;
        if self.seq.accepts(token, &self.liveness) == false {
            log::debug!("Dropping a stale response to the lists queries");
            return Outcome::Discarded;
        }

        let mut failure = None;
        {
            let mut state = lock(&self.state);
            match own {
                Ok(own) => {
                    state.status_text = list_status_text(own.len(), &session);
                    state.lists = own;
                },
                Err(err) => failure = Some(err),
            }
            match accepted {
                Ok(accepted) => state.accepted = accepted,
                Err(err) => failure = failure.or(Some(err)),
            }
        }

        match failure {
            None => Outcome::Applied,
            Some(err) => self.ctx.fail("Error fetching lists", "Failed to load lists.", err),
        }
    }

    /// Open the screen of a list
    pub fn open_list(&self, list_id: &ListId) {
        self.ctx.shell.navigate(Route::List(list_id.clone()));
    }

    fn add_list(&self, list: &List, session: &Session) {
        let mut state = lock(&self.state);
        match state.lists.iter_mut().find(|l| l.id == list.id) {
            Some(existing) => *existing = list.clone(),
            None => state.lists.push(list.clone()),
        }
        state.status_text = list_status_text(state.lists.len(), session);
    }

    /// A patch dropped a load still in flight: fetch again, so the lists it was about to bring are not lost
    async fn refetch_if(&self, outdated: bool) -> Outcome {
        if outdated {
            self.load().await
        } else {
            Outcome::Applied
        }
    }

    fn remove_list(&self, list_id: &ListId, session: &Session) {
        let mut state = lock(&self.state);
        state.lists.retain(|l| &l.id != list_id);
        state.accepted.retain(|l| &l.id != list_id);
        state.status_text = list_status_text(state.lists.len(), session);
    }
}

#[async_trait]
impl Controller for ListsController {
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.require_session().is_none() {
            return Outcome::Redirected;
        }
        self.load().await
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::ListAdded(list) => {
                let outdated = self.seq.supersede();
                self.add_list(list, &self.ctx.session.current());
                self.refetch_if(outdated).await
            },
            AppEvent::ListDeleted(list_id) => {
                let outdated = self.seq.supersede();
                self.remove_list(list_id, &self.ctx.session.current());
                self.refetch_if(outdated).await
            },
            AppEvent::ListUpdated(_) | AppEvent::ListAccepted(_) | AppEvent::Resync => self.load().await,
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


    use crate::access::AccessStatus;
    use crate::list::Visibility;
    use crate::mock_backend::{GatedTransport, MockBackend, MockEnvironment};
    use crate::mock_behaviour::MockBehaviour;
    use crate::user::Role;

    fn env(role: Role) -> (MockEnvironment, crate::ids::UserId) {
        let env = MockEnvironment::new(&format!("user_role={}", role.as_graphql().to_lowercase()));
        let me = env.backend.add_user("me@example.com", role);
        env.backend.log_in_as(&me);
        (env, me)
    }

    #[tokio::test]
    async fn own_and_accepted_lists() {
        let (env, me) = env(Role::Writer);
        let other = env.backend.add_user("other@example.com", Role::Writer);
        env.backend.add_list(&me, "Mine", Visibility::Private);
        let shared = env.backend.add_list(&other, "Theirs", Visibility::Shared);
        env.backend.add_list(&other, "Hidden", Visibility::Private);
        env.backend.share(&shared, &me, AccessStatus::Accepted);

        let screen = ListsController::new(env.context.clone());
        assert!(screen.activate().await.is_applied());
        let state = screen.state();
        assert_eq!(state.lists.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(), vec!["Mine"]);
        assert_eq!(state.accepted[0].name, "Theirs");
        assert_eq!(state.status_text, "Your personal lists:");
    }

    #[tokio::test]
    async fn admins_see_every_list() {
        let (env, _me) = env(Role::Admin);
        let other = env.backend.add_user("other@example.com", Role::Writer);
        env.backend.add_list(&other, "Hidden", Visibility::Private);

        let screen = ListsController::new(env.context.clone());
        assert!(screen.activate().await.is_applied());
        assert_eq!(screen.state().lists.len(), 1);
        assert_eq!(screen.state().status_text, "All lists in the application:");
    }

    #[tokio::test]
    async fn no_session_redirects_to_login() {
        let env = MockEnvironment::new("theme=dark");
        let screen = ListsController::new(env.context.clone());
        assert!(matches!(screen.activate().await, Outcome::Redirected));
        assert_eq!(env.shell.last_toast().as_deref(), Some("Please log in first."));
        assert_eq!(env.shell.last_route(), Some(Route::Login));
        assert_eq!(env.backend.call_count(), 0);
    }

    #[tokio::test]
    async fn server_error_keeps_the_loaded_lists() {
        let (env, me) = env(Role::Writer);
        env.backend.add_list(&me, "Mine", Visibility::Private);
        let screen = ListsController::new(env.context.clone());
        assert!(screen.activate().await.is_applied());
        let before = screen.state();

        *env.backend.behaviour().lock().unwrap() = MockBehaviour::fail_now(2);
        match screen.load().await {
            Outcome::Failed(err) => assert_eq!(err.status(), Some(500)),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(screen.state(), before);
        assert_eq!(env.shell.last_toast().as_deref(), Some("Failed to load lists."));
    }

    #[tokio::test]
    async fn events_patch_the_lists() {
        let (env, me) = env(Role::Writer);
        let kept = env.backend.add_list(&me, "Kept", Visibility::Private);
        let screen = ListsController::new(env.context.clone());
        screen.activate().await;
        env.backend.reset_calls();

        let added = List { id: ListId::from("new"), name: "New".to_string(), ..List::default() };
        screen.handle_event(&AppEvent::ListAdded(added.clone())).await;
        screen.handle_event(&AppEvent::ListAdded(added)).await;
        assert_eq!(screen.state().lists.len(), 2);

        screen.handle_event(&AppEvent::ListDeleted(ListId::from("new"))).await;
        assert_eq!(screen.state().lists.len(), 1);
        assert_eq!(screen.state().lists[0].id, kept);
        assert_eq!(env.backend.call_count(), 0);

        assert!(screen.handle_event(&AppEvent::ListAccepted(ListId::from("x"))).await.is_applied());
        assert_eq!(env.backend.calls(), vec!["Lists", "ListsAccepted"]);
    }

    #[tokio::test]
    async fn stale_responses_are_dropped() {
        let backend = Arc::new(MockBackend::new());
        let me = backend.add_user("me@example.com", Role::Writer);
        backend.log_in_as(&me);
        backend.add_list(&me, "Old", Visibility::Private);

        let gated = Arc::new(GatedTransport::new(backend.clone()));
        let mut ctx = MockEnvironment::with_backend(backend.clone(), "user_role=writer").context;
        ctx.transport = gated.clone();
        let screen = ListsController::new(ctx);

        let slow = screen.load();
        let fast = async {
            backend.add_list(&me, "New", Visibility::Private);
            let outcome = screen.load().await;
            gated.release();
            outcome
        };
        let (slow, fast) = tokio::join!(slow, fast);

        assert!(matches!(slow, Outcome::Discarded));
        assert!(fast.is_applied());
        assert_eq!(screen.state().lists.len(), 2);
    }

    #[tokio::test]
    async fn patch_is_not_overwritten_by_an_older_load() {
        let backend = Arc::new(MockBackend::new());
        let me = backend.add_user("me@example.com", Role::Writer);
        backend.log_in_as(&me);
        backend.add_list(&me, "Old", Visibility::Private);

        let gated = Arc::new(GatedTransport::new(backend.clone()));
        let mut ctx = MockEnvironment::with_backend(backend.clone(), "user_role=writer").context;
        ctx.transport = gated.clone();
        let screen = ListsController::new(ctx);

        // The first load answers with "Old" only, but only after "New" was created and announced
        let slow = screen.load();
        let patch = async {
            let id = backend.add_list(&me, "New", Visibility::Private);
            let created = backend.list(&id).unwrap();
            let outcome = screen.handle_event(&AppEvent::ListAdded(created)).await;
            gated.release();
            outcome
        };
        let (slow, patch) = tokio::join!(slow, patch);

        assert!(matches!(slow, Outcome::Discarded));
        assert!(patch.is_applied());
        let mut names = screen.state().lists.iter().map(|l| l.name.clone()).collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["New".to_string(), "Old".to_string()]);
    }

    #[tokio::test]
    async fn torn_down_views_ignore_late_answers() {
        let (env, me) = env(Role::Writer);
        env.backend.add_list(&me, "Mine", Visibility::Private);
        let screen = ListsController::new(env.context.clone());
        screen.tear_down();
        assert!(matches!(screen.load().await, Outcome::Discarded));
        assert!(screen.state().lists.is_empty());
    }
}
