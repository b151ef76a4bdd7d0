// Core domain models for Movie Graph
// Plain data structures; all behavior lives in the engine

//! # Domain Models Module
//!
//! This module contains the entities of the movie graph:
//!
//! - [`Movie`] owns an ordered list of tag references and its artworks
//! - [`Tag`] is a shared label, referenced by id
//! - [`Artwork`] is immutable once seeded
//! - [`ArtworkFilter`] is the language/type inclusion-set filter
//! - [`RequestDetails`] is synthesized per resolution call
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports for Clean APIs
//! The `pub use` statements at the bottom create a flat API.
//! Users can import `use movie_graph::models::Movie` instead of
//! `use movie_graph::models::movie::Movie`.

// Identifier newtypes and boundary normalization
pub mod ids;

// Movie, DetailsWrapper, Details
pub mod movie;

// Tag
pub mod tag;

// Artwork and its fixed type codes
pub mod artwork;

// Artwork inclusion-set filter
pub mod filter;

// RequestDetails and the id generator capability
pub mod request;

pub use artwork::{Artwork, ArtworkType};
pub use filter::ArtworkFilter;
pub use ids::{id_from_json, ArtworkId, MovieId, TagId};
pub use movie::{Details, DetailsWrapper, Movie};
pub use request::{IdGenerator, RequestDetails, SequentialIdGenerator, UuidGenerator};
pub use tag::Tag;
