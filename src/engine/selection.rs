// Request boundary: operation kind, selection tree, field arguments

//! # Selection Tree
//!
//! Requests arrive already parsed into an operation kind plus a recursive
//! selection of [`Field`]s. Each field owns its [`Arguments`]; argument scopes
//! are never merged across levels, a nested field only sees the arguments
//! written on that field.
//!
//! ```rust
//! # use movie_graph::{Field, Request};
//! # use serde_json::json;
//! let request = Request::query(vec![Field::new("movie")
//!     .with_argument("movieId", json!("1"))
//!     .with_selection(vec![
//!         Field::new("id"),
//!         Field::new("tags").with_selection(vec![Field::new("id"), Field::new("name")]),
//!     ])]);
//! assert_eq!(request.selection[0].selection.len(), 2);
//! ```

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::id_from_json;
use crate::{MovieGraphError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationKind {
    Query,
    Mutation,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Query => f.write_str("query"),
            OperationKind::Mutation => f.write_str("mutation"),
        }
    }
}

/// Field-local arguments, already bound to concrete JSON values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Arguments(Map<String, Value>);

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<S: Into<String>>(&mut self, name: S, value: Value) {
        self.0.insert(name.into(), value);
    }

    /// Raw value; explicit `null` is reported as absent
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name).filter(|v| !v.is_null())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Required identifier, normalized to its string form
    pub fn required_id(&self, name: &str) -> Result<String> {
        let value = self.get(name).ok_or_else(|| {
            MovieGraphError::InvalidArgument(format!("missing required argument '{}'", name))
        })?;
        id_from_json(value).ok_or_else(|| {
            MovieGraphError::InvalidArgument(format!("argument '{}' is not a valid id", name))
        })
    }

    /// Optional identifier list. A single id is accepted as a one-element list.
    pub fn id_list(&self, name: &str) -> Result<Option<Vec<String>>> {
        let value = match self.get(name) {
            Some(value) => value,
            None => return Ok(None),
        };
        let items = match value {
            Value::Array(items) => items.iter().collect::<Vec<_>>(),
            single => vec![single],
        };
        items
            .into_iter()
            .map(|item| {
                id_from_json(item).ok_or_else(|| {
                    MovieGraphError::InvalidArgument(format!(
                        "argument '{}' contains an invalid id: {}",
                        name, item
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Some)
    }

    /// Required identifier list
    pub fn required_id_list(&self, name: &str) -> Result<Vec<String>> {
        self.id_list(name)?.ok_or_else(|| {
            MovieGraphError::InvalidArgument(format!("missing required argument '{}'", name))
        })
    }

    /// Deserialize an optional structured argument
    pub fn optional<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match self.get(name) {
            Some(value) => serde_json::from_value(value.clone()).map(Some).map_err(|e| {
                MovieGraphError::InvalidArgument(format!("argument '{}': {}", name, e))
            }),
            None => Ok(None),
        }
    }
}

impl From<Map<String, Value>> for Arguments {
    fn from(map: Map<String, Value>) -> Self {
        Arguments(map)
    }
}

/// One node of the selection tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    pub name: String,
    #[serde(default, skip_serializing_if = "Arguments::is_empty")]
    pub arguments: Arguments,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub selection: Vec<Field>,
}

impl Field {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            alias: None,
            name: name.into(),
            arguments: Arguments::new(),
            selection: Vec::new(),
        }
    }

    pub fn with_alias<S: Into<String>>(mut self, alias: S) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_argument<S: Into<String>>(mut self, name: S, value: Value) -> Self {
        self.arguments.insert(name, value);
        self
    }

    pub fn with_selection(mut self, selection: Vec<Field>) -> Self {
        self.selection = selection;
        self
    }

    /// Key under which the field appears in the response
    pub fn response_key(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// A parsed query or mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub operation: OperationKind,
    pub selection: Vec<Field>,
}

impl Request {
    pub fn query(selection: Vec<Field>) -> Self {
        Self {
            operation: OperationKind::Query,
            selection,
        }
    }

    pub fn mutation(selection: Vec<Field>) -> Self {
        Self {
            operation: OperationKind::Mutation,
            selection,
        }
    }

    /// Single root field with its arguments and sub-selection
    pub fn root(
        operation: OperationKind,
        root_field: &str,
        arguments: Arguments,
        selection: Vec<Field>,
    ) -> Self {
        let mut field = Field::new(root_field).with_selection(selection);
        field.arguments = arguments;
        Self {
            operation,
            selection: vec![field],
        }
    }
}
