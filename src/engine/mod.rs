// Movie Graph Engine
// Storage, resolution and execution

//! # Engine Module
//!
//! Everything between the domain models and a finished response lives here.
//!
//! ## Architecture Overview
//!
//! ```text
//! document ──► selection ──► validation ──► executor ──► Response
//!                                              │
//!                               resolver registry (resolvers)
//!                                 │                    │
//!                              storage ◄──────── mutation coordinator
//!                                 │
//!                              latency simulator
//! ```
//!
//! - **Domain Models**: plain data (in `models/`)
//! - **Engine Layer**: this module
//! - **Service Layer**: the [`MovieGraph`](crate::MovieGraph) facade (in `service.rs`)
//!
//! ## Rust Learning Notes:
//!
//! ### Module Organization Pattern
//! 1. Create a directory with the module name (`engine/`)
//! 2. Add a `mod.rs` file as the module root
//! 3. Declare submodules in `mod.rs`
//! 4. Re-export important types for clean API

/// Storage abstraction layer
///
/// Contains:
/// - `MovieStorage` trait definition
/// - Insertion-ordered in-memory implementation
pub mod storage;

/// Artwork filter evaluation
pub mod filter;

/// Simulated backend latency
pub mod latency;

/// Schema model and the canonical movie schema
pub mod schema;

/// Parsed request: operation kind, selection tree, arguments
pub mod selection;

/// GraphQL document parsing and lowering into a request
pub mod document;

/// Resolver trait and the `(type, field)` registry
pub mod resolver;

/// Selection/argument checks performed before execution
pub mod validation;

/// Query executor state machine and null propagation
pub mod executor;

/// Per-movie serialized tag mutations
pub mod mutation;

/// Resolvers of the canonical movie schema
pub mod resolvers;

pub use document::parse_request;
pub use executor::{ErrorDescriptor, Execution, ExecutionState, Executor, PathSegment, Response};
pub use latency::{LatencySimulator, OperationClass};
pub use mutation::MutationCoordinator;
pub use resolver::{FnResolver, RequestContext, Resolver, ResolverRegistry};
pub use resolvers::movie_registry;
pub use schema::{movie_schema, Schema, SchemaBuilder, TypeRef};
pub use selection::{Arguments, Field, OperationKind, Request};
pub use storage::{InMemoryStorage, MovieStorage};
