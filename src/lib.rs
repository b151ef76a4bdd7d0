// Movie Graph - Rust Edition
// A schema-driven query and mutation engine over an in-memory movie catalog

//! # Movie Graph Library
//!
//! This is the library root for Movie Graph, a small GraphQL-shaped resolution
//! engine that answers queries and applies mutations against an in-memory,
//! relationally linked graph of movies, tags and artworks.
//!
//! ## Core Components
//!
//! ### Domain Models
//! - [`Movie`]: a catalog entry owning its tag references and artworks
//! - [`Tag`]: a shared, lightweight label referenced by id
//! - [`Artwork`]: an immutable image record (language + type code)
//! - [`ArtworkFilter`]: inclusion sets narrowing artwork lists
//!
//! ### Engine
//! - [`InMemoryStorage`]: the authoritative data store
//! - [`ResolverRegistry`]: `(type, field)` → resolver mapping
//! - [`Executor`]: walks a selection tree against the registry
//! - [`MutationCoordinator`]: serialized, atomic tag mutations
//! - [`LatencySimulator`]: simulated backend latency
//!
//! ### Service
//! [`MovieGraph`] wires everything together and seeds the store exactly once.
//!
//! **Usage Example:**
//! ```rust,no_run
//! use movie_graph::{EngineConfig, MovieGraph};
//!
//! # async fn demo() -> movie_graph::Result<()> {
//! let graph = MovieGraph::builder()
//!     .with_config(EngineConfig::instant())
//!     .build()?;
//!
//! let response = graph
//!     .execute_document("{ movies { id title tags { id name } } }", None, None)
//!     .await;
//! println!("{}", serde_json::to_string_pretty(&response).unwrap());
//! # Ok(())
//! # }
//! ```
//!
//! ## Rust Learning Notes:
//!
//! ### Re-exports
//! `pub use` statements create shortcuts so users don't need to know the internal
//! module structure. Instead of `use movie_graph::engine::executor::Executor`,
//! users can write `use movie_graph::Executor`.

// Runtime configuration (latency, logging)
pub mod config;

// Core domain models
pub mod models;

// Storage, resolution and execution engine
pub mod engine;

// Fixture data used to seed the store
pub mod seed;

// In-process service facade
pub mod service;

pub use crate::config::{EngineConfig, LatencyConfig, LogConfig};

pub use models::{
    Artwork, ArtworkFilter, ArtworkId, ArtworkType, Details, DetailsWrapper, IdGenerator, Movie,
    MovieId, RequestDetails, SequentialIdGenerator, Tag, TagId, UuidGenerator,
};

pub use engine::{
    executor::{ErrorDescriptor, Execution, ExecutionState, Executor, PathSegment, Response},
    latency::{LatencySimulator, OperationClass},
    mutation::MutationCoordinator,
    resolver::{FnResolver, RequestContext, Resolver, ResolverRegistry},
    schema::{movie_schema, Schema, SchemaBuilder, TypeRef},
    selection::{Arguments, Field, OperationKind, Request},
    storage::{InMemoryStorage, MovieStorage},
};

pub use seed::Fixture;
pub use service::{MovieGraph, MovieGraphBuilder};

use thiserror::Error;

/// Error categories surfaced to clients.
///
/// Every [`MovieGraphError`] maps onto exactly one kind; the kind decides the
/// `extensions.code` of the error descriptor in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A movie or tag id has no matching entity
    NotFound,
    /// Malformed or missing argument
    InvalidArgument,
    /// The selection does not fit the schema
    InvalidSelection,
    /// A non-nullable field resolved to nothing
    NonNullViolation,
    /// Anything else
    InternalFailure,
}

impl ErrorKind {
    /// Machine-readable code used in response error extensions
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::InvalidArgument => "INVALID_ARGUMENT",
            ErrorKind::InvalidSelection => "INVALID_SELECTION",
            ErrorKind::NonNullViolation => "NON_NULL_VIOLATION",
            ErrorKind::InternalFailure => "INTERNAL_FAILURE",
        }
    }
}

/// Custom error types for Movie Graph operations
///
/// ## Rust Learning Notes:
///
/// ### The `thiserror` Crate
/// - `#[derive(Error)]` implements the `std::error::Error` trait
/// - `#[error("...")]` provides human-readable error messages
/// - `#[from]` enables automatic conversion from other error types
#[derive(Error, Debug)]
pub enum MovieGraphError {
    /// No movie with the given id
    #[error("Movie not found: {id}")]
    MovieNotFound { id: String },

    /// No tag with the given id
    #[error("Tag not found: {id}")]
    TagNotFound { id: String },

    /// Malformed filter, wrong argument shape, missing required argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Selection does not match the schema
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// A required field produced no value
    #[error("Cannot return null for non-nullable field {field}")]
    NonNullViolation { field: String },

    /// GraphQL document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] ::config::ConfigError),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MovieGraphError {
    /// Client-facing category of this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            MovieGraphError::MovieNotFound { .. } | MovieGraphError::TagNotFound { .. } => {
                ErrorKind::NotFound
            }
            MovieGraphError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            MovieGraphError::InvalidSelection(_) | MovieGraphError::Parse(_) => {
                ErrorKind::InvalidSelection
            }
            MovieGraphError::NonNullViolation { .. } => ErrorKind::NonNullViolation,
            MovieGraphError::Config(_)
            | MovieGraphError::Serialization(_)
            | MovieGraphError::Internal(_) => ErrorKind::InternalFailure,
        }
    }
}

impl From<tokio::task::JoinError> for MovieGraphError {
    fn from(err: tokio::task::JoinError) -> Self {
        MovieGraphError::Internal(err.to_string())
    }
}

/// Type alias for Results that use our custom error type
pub type Result<T> = std::result::Result<T, MovieGraphError>;
