// Filter evaluator - pure artwork narrowing

//! # Filter Evaluator
//!
//! Narrows a list of artworks with an [`ArtworkFilter`]. The evaluator is a
//! pure function: it never touches the store, keeps no state between calls and
//! always works on a response-local copy, so two sibling fields filtering the
//! same collection with different arguments cannot affect each other.
//!
//! ## Semantics
//! An artwork survives if
//! `(languages empty OR language ∈ languages) AND (types empty OR type ∈ types)`.
//! Survivors keep their relative order. An identity filter returns the input
//! unchanged.

use crate::models::{Artwork, ArtworkFilter};

/// Apply a filter to a sequence of artworks, order-preserving and stable
pub fn apply(artworks: &[Artwork], filter: &ArtworkFilter) -> Vec<Artwork> {
    if filter.is_identity() {
        return artworks.to_vec();
    }
    artworks
        .iter()
        .filter(|artwork| filter.matches(artwork))
        .cloned()
        .collect()
}

/// Apply an optional filter; `None` is the identity
pub fn apply_optional(artworks: &[Artwork], filter: Option<&ArtworkFilter>) -> Vec<Artwork> {
    match filter {
        Some(filter) => apply(artworks, filter),
        None => artworks.to_vec(),
    }
}
