// Entity identifiers for the movie graph
//
// Movie ids arrive as integers from some clients and as strings from others.
// Every identifier is canonically a string; integer input is normalized to its
// decimal form at the request boundary (see `id_from_json`).

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new identifier from any string-like input
            pub fn new<S: Into<String>>(id: S) -> Self {
                $name(id.into())
            }

            /// Get the identifier as a string slice
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(s.to_string())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(s)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

string_id!(
    /// Identifier of a [`Movie`](crate::Movie)
    ///
    /// ```rust
    /// # use movie_graph::MovieId;
    /// let id = MovieId::from("80117715");
    /// assert_eq!(id.as_str(), "80117715");
    /// ```
    MovieId
);

string_id!(
    /// Identifier of a [`Tag`](crate::Tag)
    TagId
);

string_id!(
    /// Identifier of an [`Artwork`](crate::Artwork)
    ArtworkId
);

/// Normalizes a JSON identifier into its canonical string form.
///
/// Strings pass through, integers become their decimal representation.
/// Anything else (floats, booleans, objects) is rejected.
pub fn id_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Some(n.to_string()),
        _ => None,
    }
}
