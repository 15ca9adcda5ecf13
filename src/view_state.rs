//! Building blocks of the controllers' local state

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Whether a field is displayed as erroneous
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Severity {
    None,
    Error,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::None
    }
}

/// The validation state of a single form field
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldState {
    pub message: String,
    pub severity: Severity,
}

impl FieldState {
    pub fn valid() -> Self {
        Self::default()
    }

    pub fn error<S: ToString>(message: S) -> Self {
        Self { message: message.to_string(), severity: Severity::Error }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn clear(&mut self) {
        *self = Self::valid();
    }
}

/// Submission is blocked while this returns true
pub fn any_error<'a, I>(fields: I) -> bool
where
    I: IntoIterator<Item = &'a FieldState>,
{
    fields.into_iter().any(|field| field.is_error())
}

/// The tags picked in a form, with an upper bound
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TagSelection {
    tags: Vec<String>,
    max: usize,
}

impl TagSelection {
    pub fn new(max: usize) -> Self {
        Self { tags: Vec::new(), max }
    }

    /// Keeps the first `max` distinct tags
    pub fn with_tags(tags: &[String], max: usize) -> Self {
        let mut selection = Self::new(max);
        for tag in tags {
            selection.select(tag);
        }
        selection
    }

    /// Returns false (and leaves the selection untouched) when the limit is reached
    pub fn select(&mut self, tag: &str) -> bool {
        if self.tags.iter().any(|t| t == tag) {
            return true;
        }
        if self.tags.len() >= self.max {
            return false;
        }
        self.tags.push(tag.to_string());
        true
    }

    pub fn deselect(&mut self, tag: &str) {
        self.tags.retain(|t| t != tag);
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn is_full(&self) -> bool {
        self.tags.len() >= self.max
    }
}

/// Cleared when a view is torn down, so that late responses are not applied to it
#[derive(Clone, Debug)]
pub struct Liveness(Arc<AtomicBool>);

impl Liveness {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(true)))
    }

    pub fn is_alive(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn revive(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn kill(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl Default for Liveness {
    fn default() -> Self {
        Self::new()
    }
}

/// Identifies one request of a [`RequestSequencer`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// Hands out increasing tokens for the fetches of one dataset
///
/// Only the response to the latest request is applied: when two fetches overlap, the one that was issued
/// first is dropped, whatever the order their responses arrive in.
#[derive(Debug, Default)]
pub struct RequestSequencer {
    latest: AtomicU64,
    /// Highest token whose response came back
    answered: AtomicU64,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    /// Whether the response to `token` may be written into a view
    pub fn accepts(&self, token: RequestToken, liveness: &Liveness) -> bool {
        self.answered.fetch_max(token.0, Ordering::SeqCst);
        liveness.is_alive() && self.is_current(token)
    }

    /// Drops every request still in flight, before the dataset is patched locally.
    ///
    /// Returns whether a request was dropped: its answer predates the patch, so the dataset has to be fetched again.
    pub fn supersede(&self) -> bool {
        let outstanding = self.answered.load(Ordering::SeqCst) < self.latest.load(Ordering::SeqCst);
        let token = self.issue();
        self.answered.fetch_max(token.0, Ordering::SeqCst);
        outstanding
    }
}

/// Locks a controller's state
///
/// The state is plain data that is never left half-written, so a poisoned lock is still usable.
pub fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
