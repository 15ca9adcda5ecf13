//! GraphQL operation builders
//!
//! Every builder is a pure function returning an [`Operation`]: a fixed query text plus a map of named variables.
//! User-provided values (names, descriptions, tags...) only ever travel as variables, never inside the query text.
//!
//! Every query aliases its root field as `result`, so that responses always have the `{data: {result: ...}}` shape.
//!
//! Optional string inputs (description, assignee, dates) are sent as empty strings rather than omitted.
//! This mirrors what the backend has always received from this front-end.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;

pub mod lists;
pub mod todos;
pub mod users;

/// Whether an operation reads or writes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
}

/// A GraphQL operation, ready to be sent
///
/// It serializes to the `{query, variables}` request body expected by the endpoint.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Operation {
    #[serde(skip)]
    name: &'static str,
    #[serde(skip)]
    kind: OperationKind,
    query: &'static str,
    variables: Map<String, Value>,
}

impl Operation {
    pub(crate) fn query(name: &'static str, query: &'static str, variables: Value) -> Self {
        Self::new(name, OperationKind::Query, query, variables)
    }

    pub(crate) fn mutation(name: &'static str, query: &'static str, variables: Value) -> Self {
        Self::new(name, OperationKind::Mutation, query, variables)
    }

    fn new(name: &'static str, kind: OperationKind, query: &'static str, variables: Value) -> Self {
        let variables = match variables {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                let mut map = Map::new();
                map.insert("value".to_string(), other);
                map
            }
        };
        Self { name, kind, query, variables }
    }

    /// The GraphQL operation name, as declared in the query text
    pub fn name(&self) -> &'static str { self.name }
    pub fn kind(&self) -> OperationKind { self.kind }
    pub fn query_text(&self) -> &'static str { self.query }
    pub fn variables(&self) -> &Map<String, Value> { &self.variables }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    pub fn is_mutation(&self) -> bool {
        self.kind == OperationKind::Mutation
    }

    /// The JSON request body. Variables are sorted by name, so equal operations give byte-identical bodies
    pub fn to_body(&self) -> Result<String, Error> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Sends `None` as an empty string, see the module documentation
fn or_empty<S: AsRef<str>>(value: Option<S>) -> String {
    value.map(|s| s.as_ref().to_string()).unwrap_or_default()
}
