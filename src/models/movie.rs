// Movie domain model - the aggregate that owns tag references and artworks

//! # Movie Models
//!
//! - [`Movie`]: catalog entry; owns an ordered tag-id list and its artworks
//! - [`DetailsWrapper`]: optional indirection layer (description + details)
//! - [`Details`]: points back at the owning movie, tags are re-read from there
//!
//! The serialized (camelCase) form of a movie is the *source object* that the
//! executor hands to resolvers and to pass-through field access, so the field
//! names here double as the default GraphQL property names.

use serde::{Deserialize, Serialize};

use super::artwork::Artwork;
use super::ids::{MovieId, TagId};

/// A movie in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Movie {
    pub id: MovieId,
    pub title: String,

    /// Ordered tag references. Contains each tag id at most once.
    pub tag_ids: Vec<TagId>,

    /// Artworks owned exclusively by this movie
    pub artworks: Vec<Artwork>,

    pub details: Option<DetailsWrapper>,
}

/// Description plus a nested [`Details`] record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailsWrapper {
    pub description: String,
    pub details: Details,
}

/// Nested details; `id` is the owning movie's id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Details {
    pub id: MovieId,
}

impl Movie {
    pub fn new<I: Into<MovieId>, S: Into<String>>(id: I, title: S) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            tag_ids: Vec::new(),
            artworks: Vec::new(),
            details: None,
        }
    }

    /// Builder-style tag assignment; duplicate ids are dropped
    pub fn with_tags<I, T>(mut self, tag_ids: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<TagId>,
    {
        for tag_id in tag_ids {
            let tag_id = tag_id.into();
            if !self.tag_ids.contains(&tag_id) {
                self.tag_ids.push(tag_id);
            }
        }
        self
    }

    pub fn with_artworks(mut self, artworks: Vec<Artwork>) -> Self {
        self.artworks = artworks;
        self
    }

    /// Attach a details wrapper pointing back at this movie
    pub fn with_details<S: Into<String>>(mut self, description: S) -> Self {
        self.details = Some(DetailsWrapper {
            description: description.into(),
            details: Details {
                id: self.id.clone(),
            },
        });
        self
    }

    pub fn has_tag(&self, tag_id: &TagId) -> bool {
        self.tag_ids.contains(tag_id)
    }
}
