//! Errors returned by the transport and the operation helpers
//!
//! Field-level validation problems are not errors: they are stored in the form state of the controllers
//! (see [`crate::view_state::FieldState`]) and never reach the network layer.

use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single entry of the `errors` array of a GraphQL response
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub path: Vec<serde_json::Value>,
}

impl Display for GraphQlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[derive(Debug, Error)]
pub enum Error {
    /// The server answered with a non-2xx HTTP status
    #[error("request failed with {status_text} and status: {status}")]
    Transport { status: u16, status_text: String },

    /// The request could not be sent, or the response could not be read
    #[error("network failure: {0}")]
    Network(#[from] reqwest::Error),

    /// The response body is not a `{data: {result: ...}}` envelope
    #[error("malformed response: {0}")]
    Protocol(String),

    /// The backend reported a domain failure inside a successful HTTP response
    #[error("backend reported: {}", join_messages(.0))]
    Application(Vec<GraphQlError>),

    /// The payload does not have the expected shape
    #[error("unexpected payload: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// There is no session cookie
    #[error("no active session")]
    Unauthenticated,
}

impl Error {
    /// The HTTP status carried by this error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Transport { status, .. } => Some(*status),
            Error::Network(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}
