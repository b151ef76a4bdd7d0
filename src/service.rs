// In-process service facade
// Owns the seeded store and exposes query/mutation execution

//! # Movie Graph Service
//!
//! [`MovieGraph`] is the explicit replacement for a process-wide global store:
//! each instance owns one store, seeded once when it is built, and every
//! request executed through it sees that store. Tests build as many isolated
//! instances as they like.
//!
//! ```rust
//! # use movie_graph::{EngineConfig, Fixture, MovieGraph, Movie, Tag};
//! # tokio_test::block_on(async {
//! let graph = MovieGraph::builder()
//!     .with_config(EngineConfig::instant())
//!     .with_fixture(Fixture::new().tag(Tag::new("tag-1", "Drama")))
//!     .build()
//!     .unwrap();
//! let response = graph.execute_document("{ tags { id name } }", None, None).await;
//! assert_eq!(response.data["tags"][0]["name"], "Drama");
//! # });
//! ```

use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

use crate::config::EngineConfig;
use crate::engine::document::parse_request;
use crate::engine::executor::{ErrorDescriptor, Execution, ExecutionState, Executor, Response};
use crate::engine::latency::LatencySimulator;
use crate::engine::mutation::MutationCoordinator;
use crate::engine::resolver::{RequestContext, ResolverRegistry};
use crate::engine::resolvers::movie_registry;
use crate::engine::schema::{movie_schema, Schema};
use crate::engine::selection::Request;
use crate::engine::storage::{InMemoryStorage, MovieStorage};
use crate::models::{IdGenerator, UuidGenerator};
use crate::seed::Fixture;
use crate::Result;

#[derive(Clone)]
pub struct MovieGraph {
    storage: Arc<dyn MovieStorage>,
    executor: Executor,
    coordinator: MutationCoordinator,
    ids: Arc<dyn IdGenerator>,
}

impl MovieGraph {
    pub fn builder() -> MovieGraphBuilder {
        MovieGraphBuilder::default()
    }

    /// Catalog-seeded graph with the given configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::builder().with_config(config).build()
    }

    pub fn storage(&self) -> Arc<dyn MovieStorage> {
        self.storage.clone()
    }

    pub fn schema(&self) -> &Schema {
        self.executor.schema()
    }

    pub fn coordinator(&self) -> &MutationCoordinator {
        &self.coordinator
    }

    /// Execute an already parsed request
    pub async fn execute(&self, request: &Request) -> Response {
        self.run(request).await.response
    }

    /// Execute and report the terminal execution state as well
    pub async fn run(&self, request: &Request) -> Execution {
        let ctx = RequestContext::new(request.operation, self.ids.clone());
        self.executor.run(request, &ctx).await
    }

    /// Parse a GraphQL document and execute the chosen operation.
    /// Parse errors produce a failed response instead of an `Err`.
    pub async fn execute_document(
        &self,
        source: &str,
        variables: Option<&Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Response {
        self.run_document(source, variables, operation_name)
            .await
            .response
    }

    pub async fn run_document(
        &self,
        source: &str,
        variables: Option<&Map<String, Value>>,
        operation_name: Option<&str>,
    ) -> Execution {
        match parse_request(source, operation_name, variables) {
            Ok(request) => self.run(&request).await,
            Err(error) => {
                debug!(error = %error, "document rejected");
                Execution {
                    state: ExecutionState::Failed,
                    response: Response::failed(vec![ErrorDescriptor::from_error(&error)]),
                }
            }
        }
    }
}

#[derive(Default)]
pub struct MovieGraphBuilder {
    config: EngineConfig,
    fixture: Option<Fixture>,
    storage: Option<Arc<dyn MovieStorage>>,
    ids: Option<Arc<dyn IdGenerator>>,
}

impl MovieGraphBuilder {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Seed data for the store; the default is [`Fixture::catalog`]
    pub fn with_fixture(mut self, fixture: Fixture) -> Self {
        self.fixture = Some(fixture);
        self
    }

    /// Use an existing store instead of seeding a new one
    pub fn with_storage(mut self, storage: Arc<dyn MovieStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = Some(ids);
        self
    }

    pub fn build(self) -> Result<MovieGraph> {
        let storage = match self.storage {
            Some(storage) => storage,
            None => {
                let fixture = self.fixture.unwrap_or_else(Fixture::catalog);
                info!(
                    movies = fixture.movies.len(),
                    tags = fixture.tags.len(),
                    "seeding movie store"
                );
                Arc::new(InMemoryStorage::from_fixture(fixture)) as Arc<dyn MovieStorage>
            }
        };

        let latency = LatencySimulator::from_config(&self.config.latency);
        let coordinator = MutationCoordinator::new(storage.clone(), latency);
        let registry: ResolverRegistry = movie_registry(storage.clone(), coordinator.clone())?;
        let schema = movie_schema()?;
        debug!(resolvers = registry.len(), ?latency, "movie graph ready");

        Ok(MovieGraph {
            storage,
            executor: Executor::new(Arc::new(schema), Arc::new(registry), latency),
            coordinator,
            ids: self.ids.unwrap_or_else(|| Arc::new(UuidGenerator)),
        })
    }
}
