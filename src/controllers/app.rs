//! The application shell: side navigation, pending-invitation notifications and logout

use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::json;

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::{fetch, fetch_all};
use crate::format::pending_invitations_text;
use crate::list::List;
use crate::operations::{lists, users};
use crate::traits::Route;
use crate::user::User;
use crate::view_state::{lock, Liveness, RequestSequencer};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    /// Lists the current user has been invited to
    pub pending_lists: Vec<List>,
    /// The highlighted side navigation item
    pub selected_nav: Option<&'static str>,
    pub user: Option<User>,
}

impl AppState {
    /// Text of the notifications popover
    pub fn notifications_text(&self) -> Option<String> {
        let names: Vec<String> = self.pending_lists.iter().map(|l| l.name.clone()).collect();
        pending_invitations_text(&names)
    }
}

pub struct AppController {
    ctx: Context,
    state: Mutex<AppState>,
    pending_seq: RequestSequencer,
    liveness: Liveness,
}

impl AppController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            state: Mutex::new(AppState::default()),
            pending_seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn state(&self) -> AppState {
        lock(&self.state).clone()
    }

    pub async fn load_pending_lists(&self) -> Outcome {
        let token = self.pending_seq.issue();
        let result = fetch_all::<List>(self.ctx.transport(), &lists::get_lists_pending()).await;
        if self.pending_seq.accepts(token, &self.liveness) == false {
            return Outcome::Discarded;
        }
        match result {
            Ok(pending) => {
                lock(&self.state).pending_lists = pending;
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Error fetching pending lists", "Failed to load notifications.", err),
        }
    }

    /// Navigate from the side navigation
    pub fn navigate(&self, route: Route) {
        self.route_matched(&route);
        self.ctx.shell.navigate(route);
    }

    /// Keep the side navigation in line with the displayed screen
    pub fn route_matched(&self, route: &Route) {
        if *route == Route::Login {
            return;
        }
        lock(&self.state).selected_nav = route.nav_item();
    }

    async fn fetch_user(&self) -> Outcome {
        match fetch::<User>(self.ctx.transport(), &users::get_user()).await {
            Ok(user) => {
                lock(&self.state).user = user;
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Error fetching user", "Failed to load user.", err),
        }
    }

    /// Ends the session on the backend, then goes back to the login screen
    pub async fn logout(&self) -> Outcome {
        if let Outcome::Failed(err) = self.fetch_user().await {
            return Outcome::Failed(err);
        }
        let email = match lock(&self.state).user.as_ref().map(|u| u.email.clone()) {
            Some(email) if email.is_empty() == false => email,
            _ => {
                self.ctx.shell.toast("No user email found");
                return Outcome::Blocked;
            },
        };

        let body = json!({ "email": email });
        match self.ctx.transport.execute_rest(self.ctx.settings.logout_path(), Method::POST, Some(body)).await {
            Ok(_) => {
                {
                    let mut state = lock(&self.state);
                    state.user = None;
                    state.pending_lists.clear();
                }
                self.ctx.shell.navigate(Route::Login);
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Error during logout", "An error occurred during logout", err),
        }
    }
}

#[async_trait]
impl Controller for AppController {
    /// The shell is displayed on the login screen too: without a session there is simply nothing to load
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.session.current().is_logged_in() == false {
            return Outcome::Blocked;
        }
        self.load_pending_lists().await
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::PendingListsChanged | AppEvent::Resync => self.load_pending_lists().await,
            _ => Outcome::Discarded,
        }
    }

    fn tear_down(&self) {
        self.liveness.kill();
    }
}
