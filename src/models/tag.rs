// Tag domain model - shared, value-like labels referenced by id

use serde::{Deserialize, Serialize};

use super::ids::TagId;

/// A label that movies reference by id.
///
/// Tags have no lifecycle beyond creation: they are seeded once and never
/// deleted, so a tag id stored on a movie always resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

impl Tag {
    pub fn new<I: Into<TagId>, S: Into<String>>(id: I, name: S) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}
