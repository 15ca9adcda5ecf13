//! The invitations screen: lists other users shared with the current user, waiting for an answer

use std::sync::Mutex;

use async_trait::async_trait;

use super::{Context, Controller, Outcome};
use crate::bus::AppEvent;
use crate::client::fetch_all;
use crate::ids::ListId;
use crate::list::List;
use crate::operations::lists;
use crate::view_state::{lock, Liveness, RequestSequencer};

pub struct InvitesController {
    ctx: Context,
    invites: Mutex<Vec<List>>,
    seq: RequestSequencer,
    liveness: Liveness,
}

impl InvitesController {
    pub fn new(ctx: Context) -> Self {
        Self {
            ctx,
            invites: Mutex::new(Vec::new()),
            seq: RequestSequencer::new(),
            liveness: Liveness::new(),
        }
    }

    pub fn invites(&self) -> Vec<List> {
        lock(&self.invites).clone()
    }

    pub async fn load(&self) -> Outcome {
        let token = self.seq.issue();
        let result = fetch_all::<List>(self.ctx.transport(), &lists::get_lists_pending()).await;
        if self.seq.accepts(token, &self.liveness) == false {
            return Outcome::Discarded;
        }
        match result {
            Ok(pending) => {
                *lock(&self.invites) = pending;
                Outcome::Applied
            },
            Err(err) => self.ctx.fail("Error fetching invites", "Failed to load invites.", err),
        }
    }

    pub async fn accept(&self, list_id: &ListId) -> Outcome {
        if let Err(err) = self.ctx.transport.execute(&lists::accept_list_access(list_id)).await {
            return self.ctx.fail("Error while accepting invitation", "Failed to accept invitation", err);
        }
        self.remove_invite(list_id);
        self.ctx.bus.publish(AppEvent::ListAccepted(list_id.clone()));
        self.ctx.bus.publish(AppEvent::PendingListsChanged);
        self.ctx.succeed("Invitation accepted")
    }

    pub async fn reject(&self, list_id: &ListId) -> Outcome {
        if let Err(err) = self.ctx.transport.execute(&lists::remove_list_access(list_id)).await {
            return self.ctx.fail("Error while rejecting invitation", "Failed to reject invitation", err);
        }
        self.remove_invite(list_id);
        self.ctx.bus.publish(AppEvent::PendingListsChanged);
        Outcome::Applied
    }

    fn remove_invite(&self, list_id: &ListId) {
        lock(&self.invites).retain(|l| &l.id != list_id);
    }
}

#[async_trait]
impl Controller for InvitesController {
    async fn activate(&self) -> Outcome {
        self.liveness.revive();
        if self.ctx.require_session().is_none() {
            return Outcome::Redirected;
        }
        self.load().await
    }

    async fn handle_event(&self, event: &AppEvent) -> Outcome {
        match event {
            AppEvent::PendingListsChanged | AppEvent::Resync => self.load().await,
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
    use crate::ids::UserId;
    use crate::list::Visibility;
    use crate::mock_backend::MockEnvironment;
    use crate::user::Role;

    fn invited() -> (MockEnvironment, UserId, ListId, ListId) {
        let env = MockEnvironment::new("user_role=writer");
        let me = env.backend.add_user("me@example.com", Role::Writer);
        let friend = env.backend.add_user("friend@example.com", Role::Writer);
        env.backend.log_in_as(&me);
        let trip = env.backend.add_list(&friend, "Trip", Visibility::Shared);
        let party = env.backend.add_list(&friend, "Party", Visibility::Shared);
        env.backend.share(&trip, &me, AccessStatus::Pending);
        env.backend.share(&party, &me, AccessStatus::Pending);
        (env, me, trip, party)
    }

    #[tokio::test]
    async fn accepting_an_invitation() {
        let (env, me, trip, _) = invited();
        let mut events = env.context.bus.subscribe();
        let invites = InvitesController::new(env.context.clone());
        assert!(invites.activate().await.is_applied());
        assert_eq!(invites.invites().len(), 2);

        assert!(invites.accept(&trip).await.is_applied());
        assert_eq!(invites.invites().iter().map(|l| l.name.as_str()).collect::<Vec<_>>(), vec!["Party"]);
        assert_eq!(env.backend.access_status(&trip, &me), Some(AccessStatus::Accepted));
        assert_eq!(events.drain(), vec![AppEvent::ListAccepted(trip), AppEvent::PendingListsChanged]);
        assert_eq!(env.shell.last_toast().as_deref(), Some("Invitation accepted"));
    }

    #[tokio::test]
    async fn rejecting_an_invitation() {
        let (env, me, _, party) = invited();
        let mut events = env.context.bus.subscribe();
        let invites = InvitesController::new(env.context.clone());
        invites.activate().await;

        assert!(invites.reject(&party).await.is_applied());
        assert_eq!(invites.invites().len(), 1);
        assert_eq!(env.backend.access_status(&party, &me), None);
        assert_eq!(events.drain(), vec![AppEvent::PendingListsChanged]);
    }

    #[tokio::test]
    async fn failures_keep_the_invitation() {
        let (env, _, trip, party) = invited();
        let mut events = env.context.bus.subscribe();
        let invites = InvitesController::new(env.context.clone());
        invites.activate().await;

        env.backend.behaviour().lock().unwrap().mutation_behaviour = (0, 2);
        assert!(invites.accept(&trip).await.is_failed());
        assert_eq!(env.shell.last_toast().as_deref(), Some("Failed to accept invitation"));
        assert!(invites.reject(&party).await.is_failed());
        assert_eq!(env.shell.last_toast().as_deref(), Some("Failed to reject invitation"));
        assert_eq!(invites.invites().len(), 2);
        assert!(events.drain().is_empty());
    }

    #[tokio::test]
    async fn unknown_invitation_is_an_application_error() {
        let (env, _, _, _) = invited();
        let invites = InvitesController::new(env.context.clone());
        match invites.accept(&ListId::from("nope")).await {
            Outcome::Failed(crate::error::Error::Application(errors)) => {
                assert_eq!(errors[0].message, "no pending invitation for this list")
            },
            other => panic!("unexpected {:?}", other),
        }
    }
}
