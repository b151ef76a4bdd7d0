// Field resolver registry
// Maps (type name, field name) pairs to resolution functions

//! # Field Resolver Registry
//!
//! A [`Resolver`] produces the value of one field given:
//! - the parent object (the JSON source object resolved so far),
//! - the field's own [`Arguments`] (never merged with parent or root arguments),
//! - the request-scoped [`RequestContext`].
//!
//! Resolvers return plain JSON. The executor completes that value against the
//! field's declared type, so a resolver for `[Movie!]!` simply returns an array
//! of movie source objects and the executor resolves each element's
//! sub-selection.
//!
//! Fields without a registered resolver fall back to reading the same-named
//! property from the parent object.
//!
//! ## Rust Learning Notes:
//!
//! ### Async Traits
//! `#[async_trait]` lets resolvers be `async fn`s behind a trait object, so a
//! resolver can await storage calls and the executor can hold
//! `Arc<dyn Resolver>` values in one map.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::engine::selection::{Arguments, OperationKind};
use crate::models::{IdGenerator, UuidGenerator};
use crate::{MovieGraphError, Result};

/// Request-scoped data shared by every resolver of one request
#[derive(Clone)]
pub struct RequestContext {
    operation: OperationKind,
    ids: Arc<dyn IdGenerator>,
}

impl RequestContext {
    pub fn new(operation: OperationKind, ids: Arc<dyn IdGenerator>) -> Self {
        Self { operation, ids }
    }

    /// Context with random UUID ids
    pub fn for_operation(operation: OperationKind) -> Self {
        Self::new(operation, Arc::new(UuidGenerator))
    }

    pub fn operation(&self) -> OperationKind {
        self.operation
    }

    pub fn ids(&self) -> &dyn IdGenerator {
        self.ids.as_ref()
    }
}

impl std::fmt::Debug for RequestContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestContext")
            .field("operation", &self.operation)
            .finish_non_exhaustive()
    }
}

#[async_trait::async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve(
        &self,
        parent: &Value,
        args: &Arguments,
        ctx: &RequestContext,
    ) -> Result<Value>;
}

/// Adapts a synchronous closure into a [`Resolver`]
pub struct FnResolver<F>(F);

impl<F> FnResolver<F>
where
    F: Fn(&Value, &Arguments, &RequestContext) -> Result<Value> + Send + Sync,
{
    pub fn new(f: F) -> Self {
        FnResolver(f)
    }
}

#[async_trait::async_trait]
impl<F> Resolver for FnResolver<F>
where
    F: Fn(&Value, &Arguments, &RequestContext) -> Result<Value> + Send + Sync,
{
    async fn resolve(
        &self,
        parent: &Value,
        args: &Arguments,
        ctx: &RequestContext,
    ) -> Result<Value> {
        (self.0)(parent, args, ctx)
    }
}

/// Pass-through resolution: the same-named property of the parent, or null
pub fn default_resolve(parent: &Value, field_name: &str) -> Value {
    parent.get(field_name).cloned().unwrap_or(Value::Null)
}

/// At most one resolver per `(type, field)` pair
#[derive(Default, Clone)]
pub struct ResolverRegistry {
    resolvers: HashMap<(String, String), Arc<dyn Resolver>>,
}

impl ResolverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resolver; a second registration for the same pair is an error
    pub fn register<R>(&mut self, type_name: &str, field_name: &str, resolver: R) -> Result<()>
    where
        R: Resolver + 'static,
    {
        self.register_arc(type_name, field_name, Arc::new(resolver))
    }

    pub fn register_arc(
        &mut self,
        type_name: &str,
        field_name: &str,
        resolver: Arc<dyn Resolver>,
    ) -> Result<()> {
        let key = (type_name.to_string(), field_name.to_string());
        if self.resolvers.contains_key(&key) {
            return Err(MovieGraphError::Internal(format!(
                "resolver for {}.{} is already registered",
                type_name, field_name
            )));
        }
        self.resolvers.insert(key, resolver);
        Ok(())
    }

    /// Convenience for closure resolvers
    pub fn register_fn<F>(&mut self, type_name: &str, field_name: &str, f: F) -> Result<()>
    where
        F: Fn(&Value, &Arguments, &RequestContext) -> Result<Value> + Send + Sync + 'static,
    {
        self.register(type_name, field_name, FnResolver::new(f))
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<Arc<dyn Resolver>> {
        self.resolvers
            .get(&(type_name.to_string(), field_name.to_string()))
            .cloned()
    }

    pub fn contains(&self, type_name: &str, field_name: &str) -> bool {
        self.resolvers
            .contains_key(&(type_name.to_string(), field_name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }
}
