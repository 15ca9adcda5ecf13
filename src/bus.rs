//! A typed notification bus, so that sibling controllers stay consistent after a mutation
//!
//! Delivery is at-least-once, with no ordering guarantee across subscribers: handlers must be idempotent.
//! Publishing never waits for subscribers, who react (re-fetch or patch their state) whenever they drain their
//! subscription.

use std::fmt::{Display, Error, Formatter};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

use crate::ids::ListId;
use crate::list::List;
use crate::todo::Todo;

/// Something that happened in a view, that other views may care about
#[derive(Clone, Debug, PartialEq)]
pub enum AppEvent {
    /// A list has been created, with its value as confirmed by the backend
    ListAdded(List),
    /// A list has been edited, with its value as confirmed by the backend
    ListUpdated(List),
    ListDeleted(ListId),
    /// The current user accepted an invitation to this list
    ListAccepted(ListId),
    /// The pending invitations of the current user changed
    PendingListsChanged,
    TodoAdded(Todo),
    TodoUpdated(Todo),
    /// Todos have been created, edited, completed or deleted, in a given list if known
    TodosChanged { list_id: Option<ListId> },
    /// Some events have been missed: everything must be reloaded
    Resync,
}

impl Display for AppEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            AppEvent::ListAdded(list) => write!(f, "list {} added", list.id),
            AppEvent::ListUpdated(list) => write!(f, "list {} updated", list.id),
            AppEvent::ListDeleted(id) => write!(f, "list {} deleted", id),
            AppEvent::ListAccepted(id) => write!(f, "list {} accepted", id),
            AppEvent::PendingListsChanged => write!(f, "pending lists changed"),
            AppEvent::TodoAdded(todo) => write!(f, "todo {} added", todo.id),
            AppEvent::TodoUpdated(todo) => write!(f, "todo {} updated", todo.id),
            AppEvent::TodosChanged { list_id: Some(id) } => write!(f, "todos of list {} changed", id),
            AppEvent::TodosChanged { list_id: None } => write!(f, "todos changed"),
            AppEvent::Resync => write!(f, "resync"),
        }
    }
}

/// The sending half, cheap to clone and shared by every controller of a session
#[derive(Clone, Debug)]
pub struct NotificationBus {
    sender: broadcast::Sender<AppEvent>,
}

impl NotificationBus {
    /// `capacity` is how many events a subscriber may lag behind before it is asked to resync
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn publish(&self, event: AppEvent) {
        log::debug!("Publishing: {}", event);
        if self.sender.send(event).is_err() {
            log::trace!("Nobody listens to the bus");
        }
    }

    /// Only events published after this call are received
    pub fn subscribe(&self) -> Subscription {
        Subscription { receiver: self.sender.subscribe() }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// The receiving half. Dropping it unsubscribes
#[derive(Debug)]
pub struct Subscription {
    receiver: broadcast::Receiver<AppEvent>,
}

impl Subscription {
    /// Wait for the next event. `None` once the bus is gone
    pub async fn recv(&mut self) -> Option<AppEvent> {
        match self.receiver.recv().await {
            Ok(event) => Some(event),
            Err(RecvError::Lagged(n)) => {
                log::warn!("Subscriber missed {} events, asking for a resync", n);
                Some(AppEvent::Resync)
            },
            Err(RecvError::Closed) => None,
        }
    }

    /// The next event, if one is already waiting
    pub fn try_next(&mut self) -> Option<AppEvent> {
        match self.receiver.try_recv() {
            Ok(event) => Some(event),
            Err(TryRecvError::Lagged(n)) => {
                log::warn!("Subscriber missed {} events, asking for a resync", n);
                Some(AppEvent::Resync)
            },
            Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => None,
        }
    }

    /// Every event waiting right now
    pub fn drain(&mut self) -> Vec<AppEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.try_next() {
            events.push(event);
        }
        events
    }
}
