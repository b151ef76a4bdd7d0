// Query executor - walks a selection tree against the resolver registry

//! # Query Executor
//!
//! ## State Machine
//!
//! ```text
//! PENDING --validation ok--> RESOLVING --root resolved--> COMPLETE
//!    |                           |
//!    +--validation failed--> FAILED <--null bubbled to root--+
//! ```
//!
//! ## Resolution
//!
//! - Fields of one selection set resolve concurrently (query) or one after the
//!   other (mutation root); the response object always lists them in the
//!   requested order.
//! - List elements resolve concurrently; each element completes its own
//!   sub-selection, and the list keeps the source order.
//! - A field absent from the selection is never resolved.
//!
//! ## Null Propagation
//!
//! Completion is driven by the field's declared type. A null in a `T!`
//! position records a `NON_NULL_VIOLATION` error (unless the resolver already
//! reported one for that field) and bubbles as [`Bubble`] to the nearest
//! nullable position, which becomes `null`. A bubble that reaches the root
//! nulls the whole `data` and fails the execution.

use futures::future::{join_all, BoxFuture, FutureExt};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

use crate::engine::latency::{LatencySimulator, OperationClass};
use crate::engine::resolver::{default_resolve, RequestContext, ResolverRegistry};
use crate::engine::schema::{Schema, TypeKind, TypeRef};
use crate::engine::selection::{Field, OperationKind, Request};
use crate::engine::validation;
use crate::{ErrorKind, MovieGraphError};

/// Lifecycle of one request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExecutionState {
    Pending,
    Resolving,
    Complete,
    Failed,
}

impl ExecutionState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ExecutionState::Complete | ExecutionState::Failed)
    }

    pub fn can_transition_to(&self, next: ExecutionState) -> bool {
        matches!(
            (self, next),
            (ExecutionState::Pending, ExecutionState::Resolving)
                | (ExecutionState::Pending, ExecutionState::Failed)
                | (ExecutionState::Resolving, ExecutionState::Complete)
                | (ExecutionState::Resolving, ExecutionState::Failed)
        )
    }
}

/// One step of a response path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Field(String),
    Index(usize),
}

/// Client-facing error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDescriptor {
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<PathSegment>,
    pub extensions: ErrorExtensions,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorExtensions {
    pub code: String,
}

impl ErrorDescriptor {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            message: message.into(),
            path: Vec::new(),
            extensions: ErrorExtensions {
                code: kind.code().to_string(),
            },
        }
    }

    pub fn from_error(error: &MovieGraphError) -> Self {
        Self::new(error.kind(), error.to_string())
    }

    pub fn with_path(mut self, path: Vec<PathSegment>) -> Self {
        self.path = path;
        self
    }

    pub fn code(&self) -> &str {
        &self.extensions.code
    }
}

/// `{ data }` or `{ errors, data: partial-or-null }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub data: Value,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDescriptor>,
}

impl Response {
    pub fn failed(errors: Vec<ErrorDescriptor>) -> Self {
        Self {
            data: Value::Null,
            errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Errors carrying the given code
    pub fn errors_with_code<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a ErrorDescriptor> {
        self.errors.iter().filter(move |e| e.code() == code)
    }
}

/// Terminal state plus the response it produced
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub state: ExecutionState,
    pub response: Response,
}

/// Marker: a null reached a non-null position and must propagate upward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bubble;

type Completion = std::result::Result<Value, Bubble>;

/// Response path shared cheaply between concurrently resolving siblings
#[derive(Debug, Clone, Default)]
struct ResponsePath(Vec<PathSegment>);

impl ResponsePath {
    fn field(&self, key: &str) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Field(key.to_string()));
        ResponsePath(segments)
    }

    fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        ResponsePath(segments)
    }

    fn to_vec(&self) -> Vec<PathSegment> {
        self.0.clone()
    }

    fn describe(&self) -> String {
        self.0
            .iter()
            .map(|s| match s {
                PathSegment::Field(name) => name.clone(),
                PathSegment::Index(i) => i.to_string(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }
}

#[derive(Default)]
struct ErrorSink(Mutex<Vec<ErrorDescriptor>>);

impl ErrorSink {
    fn push(&self, error: ErrorDescriptor) {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(error);
    }

    fn into_inner(self) -> Vec<ErrorDescriptor> {
        self.0
            .into_inner()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// Per-request bookkeeping passed down the resolution tree
struct Run<'a> {
    ctx: &'a RequestContext,
    errors: ErrorSink,
}

impl Run<'_> {
    fn record(&self, error: &MovieGraphError, path: &ResponsePath) {
        warn!(path = %path.describe(), error = %error, "field resolution failed");
        self.errors
            .push(ErrorDescriptor::from_error(error).with_path(path.to_vec()));
    }
}

#[derive(Clone)]
pub struct Executor {
    schema: Arc<Schema>,
    registry: Arc<ResolverRegistry>,
    latency: LatencySimulator,
}

impl Executor {
    pub fn new(schema: Arc<Schema>, registry: Arc<ResolverRegistry>, latency: LatencySimulator) -> Self {
        Self {
            schema,
            registry,
            latency,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Execute and return only the response
    pub async fn execute(&self, request: &Request, ctx: &RequestContext) -> Response {
        self.run(request, ctx).await.response
    }

    /// Execute, reporting the terminal state alongside the response
    pub async fn run(&self, request: &Request, ctx: &RequestContext) -> Execution {
        let mut state = ExecutionState::Pending;
        debug!(operation = %request.operation, fields = request.selection.len(), "execution pending");

        if let Err(errors) = validation::validate(&self.schema, request) {
            advance(&mut state, ExecutionState::Failed);
            return Execution {
                state,
                response: Response::failed(errors),
            };
        }

        let root_type = match request.operation {
            OperationKind::Query => Some(self.schema.query_type()),
            OperationKind::Mutation => self.schema.mutation_type(),
        };
        let root_type = match root_type {
            Some(root_type) => root_type,
            None => {
                advance(&mut state, ExecutionState::Failed);
                return Execution {
                    state,
                    response: Response::failed(vec![ErrorDescriptor::new(
                        ErrorKind::InvalidSelection,
                        "schema does not support mutations",
                    )]),
                };
            }
        };

        advance(&mut state, ExecutionState::Resolving);

        let run = Run {
            ctx,
            errors: ErrorSink::default(),
        };
        let serial = request.operation == OperationKind::Mutation;
        let root = Value::Object(Map::new());
        let result = self
            .resolve_selection_set(root_type, &root, &request.selection, ResponsePath::default(), serial, &run)
            .await;

        let errors = run.errors.into_inner();
        match result {
            Ok(data) => {
                advance(&mut state, ExecutionState::Complete);
                Execution {
                    state,
                    response: Response { data, errors },
                }
            }
            Err(Bubble) => {
                advance(&mut state, ExecutionState::Failed);
                Execution {
                    state,
                    response: Response::failed(errors),
                }
            }
        }
    }

    fn resolve_selection_set<'a>(
        &'a self,
        type_name: &'a str,
        parent: &'a Value,
        fields: &'a [Field],
        path: ResponsePath,
        serial: bool,
        run: &'a Run<'a>,
    ) -> BoxFuture<'a, Completion> {
        async move {
            let values: Vec<Completion> = if serial {
                let mut values = Vec::with_capacity(fields.len());
                for field in fields {
                    values.push(self.resolve_field(type_name, parent, field, &path, run).await);
                }
                values
            } else {
                join_all(
                    fields
                        .iter()
                        .map(|field| self.resolve_field(type_name, parent, field, &path, run)),
                )
                .await
            };

            let mut object = Map::new();
            for (field, value) in fields.iter().zip(values) {
                let value = value?;
                object.insert(field.response_key().to_string(), value);
            }
            Ok(Value::Object(object))
        }
        .boxed()
    }

    async fn resolve_field(
        &self,
        type_name: &str,
        parent: &Value,
        field: &Field,
        path: &ResponsePath,
        run: &Run<'_>,
    ) -> Completion {
        let path = path.field(field.response_key());

        if field.name == "__typename" {
            return Ok(Value::String(type_name.to_string()));
        }

        let definition = match self.schema.field(type_name, &field.name) {
            Some(definition) => definition,
            None => {
                let error = MovieGraphError::Internal(format!(
                    "no field {} on type {}",
                    field.name, type_name
                ));
                run.record(&error, &path);
                return Err(Bubble);
            }
        };

        let resolved = match self.registry.get(type_name, &field.name) {
            Some(resolver) => {
                debug!(type_name, field = %field.name, "dispatching resolver");
                let body = resolver.resolve(parent, &field.arguments, run.ctx);
                if self.schema.is_mutation_root(type_name) {
                    // mutation bodies apply their own write latency
                    body.await
                } else {
                    self.latency.before(OperationClass::Read, body).await
                }
            }
            None => Ok(default_resolve(parent, &field.name)),
        };

        match resolved {
            Ok(value) => self.complete_value(&definition.ty, value, field, path, run).await,
            Err(error) => {
                run.record(&error, &path);
                if definition.ty.is_non_null() {
                    Err(Bubble)
                } else {
                    Ok(Value::Null)
                }
            }
        }
    }

    fn complete_value<'a>(
        &'a self,
        ty: &'a TypeRef,
        value: Value,
        field: &'a Field,
        path: ResponsePath,
        run: &'a Run<'a>,
    ) -> BoxFuture<'a, Completion> {
        async move {
            match ty {
                TypeRef::NonNull(inner) => {
                    if value.is_null() {
                        let error = MovieGraphError::NonNullViolation {
                            field: path.describe(),
                        };
                        run.record(&error, &path);
                        return Err(Bubble);
                    }
                    self.complete_inner(inner, value, field, path, run).await
                }
                nullable => {
                    if value.is_null() {
                        return Ok(Value::Null);
                    }
                    // nearest nullable position absorbs bubbles from below
                    Ok(self
                        .complete_inner(nullable, value, field, path, run)
                        .await
                        .unwrap_or(Value::Null))
                }
            }
        }
        .boxed()
    }

    async fn complete_inner(
        &self,
        ty: &TypeRef,
        value: Value,
        field: &Field,
        path: ResponsePath,
        run: &Run<'_>,
    ) -> Completion {
        match ty {
            TypeRef::NonNull(_) => self.complete_value(ty, value, field, path, run).await,
            TypeRef::List(item_type) => {
                let items = match value {
                    Value::Array(items) => items,
                    other => {
                        let error = MovieGraphError::Internal(format!(
                            "expected a list for {}, got {}",
                            ty, other
                        ));
                        run.record(&error, &path);
                        return Err(Bubble);
                    }
                };
                let completed = join_all(items.into_iter().enumerate().map(|(index, item)| {
                    self.complete_value(item_type, item, field, path.index(index), run)
                }))
                .await;
                completed
                    .into_iter()
                    .collect::<std::result::Result<Vec<_>, _>>()
                    .map(Value::Array)
            }
            TypeRef::Named(name) => match self.schema.kind(name) {
                Some(TypeKind::Scalar) => match coerce_scalar(name, value) {
                    Ok(value) => Ok(value),
                    Err(error) => {
                        run.record(&error, &path);
                        Err(Bubble)
                    }
                },
                Some(TypeKind::Object(_)) => {
                    if !value.is_object() {
                        let error = MovieGraphError::Internal(format!(
                            "expected an object of type {}, got {}",
                            name, value
                        ));
                        run.record(&error, &path);
                        return Err(Bubble);
                    }
                    self.resolve_selection_set(name, &value, &field.selection, path, false, run)
                        .await
                }
                _ => {
                    let error =
                        MovieGraphError::Internal(format!("type {} cannot be an output", name));
                    run.record(&error, &path);
                    Err(Bubble)
                }
            },
        }
    }
}

fn advance(state: &mut ExecutionState, next: ExecutionState) {
    debug_assert!(state.can_transition_to(next), "{:?} -> {:?}", state, next);
    debug!(from = ?state, to = ?next, "execution state");
    *state = next;
}

/// Serialize a resolved leaf as its declared scalar
fn coerce_scalar(name: &str, value: Value) -> crate::Result<Value> {
    let mismatch = |value: &Value| {
        MovieGraphError::Internal(format!("cannot represent {} as {}", value, name))
    };
    match name {
        "ID" => crate::models::id_from_json(&value)
            .map(Value::String)
            .ok_or_else(|| mismatch(&value)),
        "String" if value.is_string() => Ok(value),
        "Boolean" if value.is_boolean() => Ok(value),
        "Int" if value.is_i64() => Ok(value),
        "String" | "Boolean" | "Int" => Err(mismatch(&value)),
        // custom scalars pass through untouched
        _ => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resolver::Resolver;
    use crate::engine::schema::{FieldDefinition, ObjectType};
    use crate::engine::selection::Arguments;
    use crate::models::SequentialIdGenerator;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn test_schema() -> Schema {
        Schema::builder("Query")
            .object(
                ObjectType::new("Query")
                    .field(FieldDefinition::new("shelf", "Shelf"))
                    .field(FieldDefinition::new("strictShelf", "Shelf!"))
                    .field(FieldDefinition::new("count", "Int!"))
                    .field(FieldDefinition::new("greeting", "String"))
                    .field(FieldDefinition::new("expensive", "String")),
            )
            .object(
                ObjectType::new("Shelf")
                    .field(FieldDefinition::new("name", "String!"))
                    .field(FieldDefinition::new("books", "[Book!]!"))
                    .field(FieldDefinition::new("looseBooks", "[Book]")),
            )
            .object(
                ObjectType::new("Book")
                    .field(FieldDefinition::new("id", "ID!"))
                    .field(FieldDefinition::new("title", "String!"))
                    .field(FieldDefinition::new("subtitle", "String")),
            )
            .build()
            .unwrap()
    }

    fn shelf(books: Value) -> Value {
        json!({"name": "fiction", "books": books.clone(), "looseBooks": books})
    }

    fn executor_with(registry: ResolverRegistry) -> Executor {
        Executor::new(
            Arc::new(test_schema()),
            Arc::new(registry),
            LatencySimulator::instant(),
        )
    }

    fn ctx() -> RequestContext {
        RequestContext::new(OperationKind::Query, Arc::new(SequentialIdGenerator::new("t")))
    }

    fn books_selection() -> Vec<Field> {
        vec![Field::new("id"), Field::new("title")]
    }

    #[tokio::test]
    async fn test_response_follows_requested_field_order() {
        let mut registry = ResolverRegistry::new();
        registry.register_fn("Query", "count", |_, _, _| Ok(json!(3))).unwrap();
        registry.register_fn("Query", "greeting", |_, _, _| Ok(json!("hi"))).unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![
            Field::new("greeting"),
            Field::new("__typename"),
            Field::new("count").with_alias("total"),
        ]);
        let execution = executor.run(&request, &ctx()).await;

        assert_eq!(execution.state, ExecutionState::Complete);
        let keys: Vec<&String> = execution.response.data.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["greeting", "__typename", "total"]);
        assert_eq!(
            execution.response.data,
            json!({"greeting": "hi", "__typename": "Query", "total": 3})
        );
    }

    #[tokio::test]
    async fn test_unselected_fields_are_never_resolved() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ResolverRegistry::new();
        let counter = calls.clone();
        registry
            .register_fn("Query", "expensive", move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!("costly"))
            })
            .unwrap();
        registry.register_fn("Query", "greeting", |_, _, _| Ok(json!("hi"))).unwrap();
        let executor = executor_with(registry);

        executor
            .execute(&Request::query(vec![Field::new("greeting")]), &ctx())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        executor
            .execute(&Request::query(vec![Field::new("expensive")]), &ctx())
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pass_through_and_nested_lists() {
        let mut registry = ResolverRegistry::new();
        registry
            .register_fn("Query", "shelf", |_, _, _| {
                Ok(shelf(json!([
                    {"id": 1, "title": "Dune", "subtitle": null},
                    {"id": "b2", "title": "Emma"}
                ])))
            })
            .unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![Field::new("shelf").with_selection(vec![
            Field::new("name"),
            Field::new("books").with_selection(vec![Field::new("id"), Field::new("subtitle")]),
        ])]);
        let response = executor.execute(&request, &ctx()).await;

        assert!(!response.has_errors());
        assert_eq!(
            response.data,
            json!({"shelf": {"name": "fiction", "books": [
                {"id": "1", "subtitle": null},
                {"id": "b2", "subtitle": null}
            ]}})
        );
    }

    #[tokio::test]
    async fn test_null_in_non_null_list_item_nulls_nearest_nullable_ancestor() {
        let mut registry = ResolverRegistry::new();
        registry
            .register_fn("Query", "shelf", |_, _, _| {
                Ok(shelf(json!([{"id": "b1", "title": "Dune"}, {"id": "b2", "title": null}])))
            })
            .unwrap();
        registry.register_fn("Query", "greeting", |_, _, _| Ok(json!("hi"))).unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![
            Field::new("shelf").with_selection(vec![
                Field::new("name"),
                Field::new("books").with_selection(books_selection()),
            ]),
            Field::new("greeting"),
        ]);
        let execution = executor.run(&request, &ctx()).await;

        // Book.title! -> Book! -> [Book!]! -> Shelf (nullable) becomes null
        assert_eq!(execution.state, ExecutionState::Complete);
        assert_eq!(execution.response.data, json!({"shelf": null, "greeting": "hi"}));
        let violations: Vec<_> = execution.response.errors_with_code("NON_NULL_VIOLATION").collect();
        assert_eq!(violations.len(), 1);
        assert_eq!(
            violations[0].path,
            vec![
                PathSegment::Field("shelf".into()),
                PathSegment::Field("books".into()),
                PathSegment::Index(1),
                PathSegment::Field("title".into()),
            ]
        );
    }

    #[tokio::test]
    async fn test_nullable_list_items_absorb_bubbles() {
        let mut registry = ResolverRegistry::new();
        registry
            .register_fn("Query", "shelf", |_, _, _| {
                Ok(shelf(json!([{"id": "b1", "title": "Dune"}, {"id": "b2", "title": null}])))
            })
            .unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![Field::new("shelf").with_selection(vec![
            Field::new("looseBooks").with_selection(books_selection()),
        ])]);
        let response = executor.execute(&request, &ctx()).await;

        assert_eq!(
            response.data,
            json!({"shelf": {"looseBooks": [{"id": "b1", "title": "Dune"}, null]}})
        );
        assert_eq!(response.errors.len(), 1);
    }

    #[tokio::test]
    async fn test_bubble_to_root_fails_execution() {
        let mut registry = ResolverRegistry::new();
        registry
            .register_fn("Query", "strictShelf", |_, _, _| {
                Err(MovieGraphError::Internal("shelf collapsed".into()))
            })
            .unwrap();
        registry.register_fn("Query", "greeting", |_, _, _| Ok(json!("hi"))).unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![
            Field::new("greeting"),
            Field::new("strictShelf").with_selection(vec![Field::new("name")]),
        ]);
        let execution = executor.run(&request, &ctx()).await;

        assert_eq!(execution.state, ExecutionState::Failed);
        assert_eq!(execution.response.data, Value::Null);
        // the resolver error is reported once, without an extra violation entry
        assert_eq!(execution.response.errors.len(), 1);
        assert_eq!(execution.response.errors[0].code(), "INTERNAL_FAILURE");
        assert_eq!(
            execution.response.errors[0].path,
            vec![PathSegment::Field("strictShelf".into())]
        );
    }

    #[tokio::test]
    async fn test_nullable_field_error_does_not_fail_siblings() {
        let mut registry = ResolverRegistry::new();
        registry
            .register_fn("Query", "greeting", |_, _, _| {
                Err(MovieGraphError::MovieNotFound { id: "9".into() })
            })
            .unwrap();
        registry.register_fn("Query", "count", |_, _, _| Ok(json!(7))).unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![Field::new("greeting"), Field::new("count")]);
        let execution = executor.run(&request, &ctx()).await;

        assert_eq!(execution.state, ExecutionState::Complete);
        assert_eq!(execution.response.data, json!({"greeting": null, "count": 7}));
        assert_eq!(execution.response.errors[0].code(), "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_scalar_mismatch_is_internal_failure() {
        let mut registry = ResolverRegistry::new();
        registry.register_fn("Query", "greeting", |_, _, _| Ok(json!(42))).unwrap();
        let executor = executor_with(registry);

        let response = executor
            .execute(&Request::query(vec![Field::new("greeting")]), &ctx())
            .await;
        assert_eq!(response.data, json!({"greeting": null}));
        assert_eq!(response.errors[0].code(), "INTERNAL_FAILURE");
    }

    #[tokio::test]
    async fn test_validation_failure_never_resolves() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut registry = ResolverRegistry::new();
        let counter = calls.clone();
        registry
            .register_fn("Query", "greeting", move |_, _, _| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(json!("hi"))
            })
            .unwrap();
        let executor = executor_with(registry);

        let request = Request::query(vec![Field::new("greeting"), Field::new("nope")]);
        let execution = executor.run(&request, &ctx()).await;

        assert_eq!(execution.state, ExecutionState::Failed);
        assert_eq!(execution.response.data, Value::Null);
        assert_eq!(execution.response.errors[0].code(), "INVALID_SELECTION");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_mutation_without_mutation_type_fails() {
        let executor = executor_with(ResolverRegistry::new());
        let execution = executor
            .run(&Request::mutation(vec![Field::new("greeting")]), &ctx())
            .await;
        assert_eq!(execution.state, ExecutionState::Failed);
    }

    struct SlowGreeting;

    #[async_trait::async_trait]
    impl Resolver for SlowGreeting {
        async fn resolve(
            &self,
            _parent: &Value,
            _args: &Arguments,
            _ctx: &RequestContext,
        ) -> crate::Result<Value> {
            tokio::time::sleep(Duration::from_millis(300)).await;
            Ok(json!("late"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_siblings_resolve_concurrently_under_latency() {
        let mut registry = ResolverRegistry::new();
        registry.register("Query", "greeting", SlowGreeting).unwrap();
        registry.register_fn("Query", "count", |_, _, _| Ok(json!(1))).unwrap();
        let executor = Executor::new(
            Arc::new(test_schema()),
            Arc::new(registry),
            LatencySimulator::new(Duration::from_millis(1000), Duration::ZERO),
        );

        let start = tokio::time::Instant::now();
        let response = executor
            .execute(
                &Request::query(vec![Field::new("greeting"), Field::new("count")]),
                &ctx(),
            )
            .await;
        let elapsed = start.elapsed();

        assert_eq!(response.data, json!({"greeting": "late", "count": 1}));
        assert!(elapsed >= Duration::from_millis(1300));
        assert!(elapsed < Duration::from_millis(2300));
    }

    #[test]
    fn test_state_transitions() {
        use ExecutionState::*;
        assert!(Pending.can_transition_to(Resolving));
        assert!(Pending.can_transition_to(Failed));
        assert!(Resolving.can_transition_to(Complete));
        assert!(!Complete.can_transition_to(Resolving));
        assert!(!Pending.can_transition_to(Complete));
        assert!(Failed.is_terminal());
        assert!(!Resolving.is_terminal());
    }

    #[test]
    fn test_response_serialization() {
        let response = Response {
            data: json!({"a": 1}),
            errors: Vec::new(),
        };
        assert_eq!(serde_json::to_value(&response).unwrap(), json!({"data": {"a": 1}}));

        let failed = Response::failed(vec![ErrorDescriptor::new(ErrorKind::NotFound, "gone")
            .with_path(vec![PathSegment::Field("movie".into()), PathSegment::Index(0)])]);
        assert_eq!(
            serde_json::to_value(&failed).unwrap(),
            json!({"data": null, "errors": [{
                "message": "gone",
                "path": ["movie", 0],
                "extensions": {"code": "NOT_FOUND"}
            }]})
        );
    }
}
