//! The seams between this crate and the outside world

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use url::Url;

use crate::error::Error;
use crate::ids::ListId;
use crate::operations::Operation;

/// Raw answer of a REST call
#[derive(Clone, Debug, PartialEq)]
pub struct RestResponse {
    pub status: u16,
    pub body: String,
}

/// Something able to run operations against the backend
///
/// This is usually a [`Client`](crate::client::Client), but tests use the in-memory `MockBackend`.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Executes a GraphQL operation and returns the content of the `data.result` envelope.
    ///
    /// An explicit `null` result is returned as `Value::Null`; a missing envelope is an [`Error::Protocol`].
    async fn execute(&self, operation: &Operation) -> Result<Value, Error>;

    /// Executes a REST call. `path` is relative to the base URL. Non-2xx statuses are errors
    async fn execute_rest(&self, path: &str, method: Method, body: Option<Value>) -> Result<RestResponse, Error>;
}

/// Screens the shell can display
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Login,
    Lists,
    List(ListId),
    Todos,
    Calendar,
    Invites,
}

impl Route {
    /// Name of the side navigation item highlighting this route, if any
    pub fn nav_item(&self) -> Option<&'static str> {
        match self {
            Route::Login => None,
            Route::Lists | Route::List(_) => Some("listsNav"),
            Route::Todos => Some("todosNav"),
            Route::Calendar => Some("calendarNav"),
            Route::Invites => Some("invitesNav"),
        }
    }
}

/// What the controllers need from the UI that hosts them
pub trait Shell: Send + Sync {
    /// Shows a short-lived notification
    fn toast(&self, message: &str);
    /// Switches to another screen of the application
    fn navigate(&self, route: Route);
    /// Leaves the application for an external page (full-page redirect)
    fn redirect(&self, url: &Url);
}
