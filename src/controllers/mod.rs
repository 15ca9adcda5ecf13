//! One controller per screen and dialog of the application
//!
//! Controllers own their state (a snapshot of it is available through `state()`), and expose one async
//! method per user action. They never return errors: failures are logged, shown to the user as a toast,
//! and reported through the returned [`Outcome`].
//!
//! Local state only changes once the backend confirmed a mutation (by patching with the returned value,
//! or by re-fetching). A failed call therefore leaves the state exactly as it was.

use std::sync::Arc;

use async_trait::async_trait;

use crate::bus::{AppEvent, NotificationBus, Subscription};
use crate::config::Settings;
use crate::error::Error;
use crate::session::{Session, SessionContext};
use crate::traits::{Route, Shell, Transport};

pub mod add_user_dialog;
pub mod app;
pub mod calendar;
pub mod invites;
pub mod list;
pub mod list_dialog;
pub mod lists;
pub mod login;
pub mod todo_dialog;
pub mod todos;

pub use add_user_dialog::AddUserDialogController;
pub use app::AppController;
pub use calendar::CalendarController;
pub use invites::InvitesController;
pub use list::ListController;
pub use list_dialog::ListDialogController;
pub use lists::ListsController;
pub use login::LoginController;
pub use todo_dialog::TodoDialogController;
pub use todos::TodosController;

/// What became of a user action or a bus event
#[derive(Debug)]
pub enum Outcome {
    /// The state has been updated
    Applied,
    /// Local validation failed (or a precondition did not hold); nothing was sent
    Blocked,
    /// There is no session: the user has been sent to the login screen
    Redirected,
    /// The result arrived too late (a newer request was issued, or the view is gone) and was dropped.
    /// Also used for events a controller does not care about
    Discarded,
    /// The backend call failed. The user has been notified, the state is unchanged
    Failed(Error),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed(_))
    }
}

/// What every controller is built with
#[derive(Clone)]
pub struct Context {
    pub transport: Arc<dyn Transport>,
    pub bus: NotificationBus,
    pub session: SessionContext,
    pub shell: Arc<dyn Shell>,
    pub settings: Settings,
}

impl Context {
    pub fn new(transport: Arc<dyn Transport>, shell: Arc<dyn Shell>, session: SessionContext, settings: Settings) -> Self {
        let bus = NotificationBus::new(settings.bus_capacity);
        Self { transport, bus, session, shell, settings }
    }

    pub(crate) fn transport(&self) -> &dyn Transport {
        self.transport.as_ref()
    }

    /// The current session, or `None` after sending the user to the login screen
    pub(crate) fn require_session(&self) -> Option<Session> {
        let session = self.session.current();
        if session.is_logged_in() {
            Some(session)
        } else {
            self.shell.toast("Please log in first.");
            self.shell.navigate(Route::Login);
            None
        }
    }

    pub(crate) fn fail(&self, context: &str, toast: &str, err: Error) -> Outcome {
        log::error!("{}: {}", context, err);
        self.shell.toast(toast);
        Outcome::Failed(err)
    }

    pub(crate) fn succeed(&self, toast: &str) -> Outcome {
        self.shell.toast(toast);
        Outcome::Applied
    }
}

/// The lifecycle shared by screen controllers
#[async_trait]
pub trait Controller: Send + Sync {
    /// Called when the screen is displayed: checks the session, then loads the screen's data
    async fn activate(&self) -> Outcome;

    /// Reacts to something another view did
    async fn handle_event(&self, _event: &AppEvent) -> Outcome {
        Outcome::Discarded
    }

    /// Called when the screen goes away. Responses arriving later are dropped
    fn tear_down(&self);
}

/// Hand every event waiting in `subscription` to `controller`
pub async fn dispatch_pending(subscription: &mut Subscription, controller: &dyn Controller) -> Vec<Outcome> {
    let mut outcomes = Vec::new();
    for event in subscription.drain() {
        log::debug!("Dispatching: {}", event);
        outcomes.push(controller.handle_event(&event).await);
    }
    outcomes
}
