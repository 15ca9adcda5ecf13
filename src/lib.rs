//! This crate is the headless core of a collaborative to-do list front-end.
//!
//! It talks to the backend exclusively through one GraphQL endpoint (plus a REST logout endpoint):
//! * [`operations`] builds the parameterized GraphQL operations,
//! * [`client`] sends them over HTTP (see the [`Transport`](traits::Transport) trait for the seam tests mock),
//! * [`controllers`] hold the state of every screen and dialog, and react to user actions,
//! * [`bus`] lets sibling controllers stay consistent after a mutation, without a shared cache.
//!
//! A renderer (terminal, web or native) binds to the controllers' state snapshots and forwards user actions
//! to their handler methods. Failures never escape a handler: they are logged, shown as a transient
//! notification through the [`Shell`](traits::Shell), and reported back as an [`Outcome`](controllers::Outcome).

/// Declares an enum mirroring a GraphQL enum, keeping unknown values instead of failing to deserialize
macro_rules! string_enum {
    ($(#[$doc:meta])* $name:ident { $($variant:ident => $wire:literal,)* }) => {
        $(#[$doc])*
        #[derive(Clone, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)*
            /// A value this crate does not know about, kept verbatim
            Other(String),
        }

        impl $name {
            pub fn as_str(&self) -> &str {
                match self {
                    $($name::$variant => $wire,)*
                    $name::Other(s) => s.as_str(),
                }
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                match s {
                    $($wire => $name::$variant,)*
                    other => $name::Other(other.to_string()),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl serde::Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: serde::Serializer,
            {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> serde::Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<$name, D::Error>
            where
                D: serde::Deserializer<'de>,
            {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Ok($name::from(s.as_str()))
            }
        }
    }
}

pub mod config;
pub mod error;
pub use error::Error;

pub mod ids;
pub use ids::{ListId, TodoId, UserId};
pub mod access;
pub mod list;
pub use list::List;
pub mod todo;
pub use todo::Todo;
pub mod user;
pub use user::{Role, User};

pub mod operations;
pub use operations::Operation;
pub mod traits;
pub mod client;
pub use client::Client;
pub mod session;

pub mod bus;
pub mod controllers;
pub mod filter;
pub mod format;
pub mod view_state;

#[cfg(any(test, feature = "mock_backend"))]
pub mod mock_behaviour;
#[cfg(any(test, feature = "mock_backend"))]
pub mod mock_backend;

pub mod utils;
