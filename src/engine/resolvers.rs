// Movie graph resolvers
// Bind the canonical schema's fields to storage reads and coordinated mutations

use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::engine::filter;
use crate::engine::mutation::MutationCoordinator;
use crate::engine::resolver::{RequestContext, Resolver, ResolverRegistry};
use crate::engine::selection::Arguments;
use crate::engine::storage::MovieStorage;
use crate::models::{id_from_json, Artwork, ArtworkFilter, Movie, MovieId, RequestDetails, TagId};
use crate::{MovieGraphError, Result};

fn to_value<T: serde::Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Source object for a movie, with its artworks narrowed by `filter`
/// Source object of a movie. `movieId` and `internalTitle` are plain
/// properties here so they resolve by pass-through, with no read latency.
fn movie_source(mut movie: Movie, filter: Option<&ArtworkFilter>) -> Result<Value> {
    if let Some(filter) = filter {
        movie.artworks = filter::apply(&movie.artworks, filter);
    }
    let mut source = to_value(&movie)?;
    if let Value::Object(object) = &mut source {
        object.insert("movieId".to_string(), Value::String(movie.id.to_string()));
        object.insert("internalTitle".to_string(), Value::String(movie.title));
    }
    Ok(source)
}

fn tag_ids(args: &Arguments) -> Result<Vec<TagId>> {
    Ok(args
        .required_id_list("tagIds")?
        .into_iter()
        .map(TagId::from)
        .collect())
}

/// Resolve tag references in list order; dangling references are skipped
async fn resolve_tags(storage: &dyn MovieStorage, ids: &[TagId]) -> Result<Value> {
    let mut tags = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(tag) = storage.get_tag(id).await? {
            tags.push(tag);
        }
    }
    to_value(&tags)
}

fn parent_tag_ids(parent: &Value, key: &str) -> Vec<TagId> {
    parent
        .get(key)
        .and_then(Value::as_array)
        .map(|ids| ids.iter().filter_map(id_from_json).map(TagId::from).collect())
        .unwrap_or_default()
}

/// `Query.movies(movieIds, filters)`
pub struct MoviesResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for MoviesResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let filter: Option<ArtworkFilter> = args.optional("filters")?;
        let movies = match args.id_list("movieIds")? {
            Some(ids) => {
                let mut seen = Vec::with_capacity(ids.len());
                let mut movies = Vec::with_capacity(ids.len());
                for id in ids.into_iter().map(MovieId::from) {
                    if seen.contains(&id) {
                        continue;
                    }
                    if let Some(movie) = self.storage.get_movie(&id).await? {
                        movies.push(movie);
                    }
                    seen.push(id);
                }
                movies
            }
            None => self.storage.list_movies().await?,
        };
        debug!(count = movies.len(), filtered = filter.is_some(), "resolved movies");
        movies
            .into_iter()
            .map(|movie| movie_source(movie, filter.as_ref()))
            .collect::<Result<Vec<_>>>()
            .map(Value::Array)
    }
}

/// `Query.movie(movieId)`: null when the id is unknown
pub struct MovieResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for MovieResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = MovieId::from(args.required_id("movieId")?);
        match self.storage.get_movie(&id).await? {
            Some(movie) => movie_source(movie, None),
            None => Ok(Value::Null),
        }
    }
}

/// `Query.tags`
pub struct TagsResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for TagsResolver {
    async fn resolve(&self, _parent: &Value, _args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        to_value(&self.storage.list_tags().await?)
    }
}

/// `Query.tag(tagId)`: null when the id is unknown
pub struct TagResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for TagResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = TagId::from(args.required_id("tagId")?);
        match self.storage.get_tag(&id).await? {
            Some(tag) => to_value(&tag),
            None => Ok(Value::Null),
        }
    }
}

/// `Query.requestDetails`: a fresh id on every call
pub struct RequestDetailsResolver;

#[async_trait::async_trait]
impl Resolver for RequestDetailsResolver {
    async fn resolve(&self, _parent: &Value, _args: &Arguments, ctx: &RequestContext) -> Result<Value> {
        to_value(&RequestDetails::generate(ctx.ids()))
    }
}

/// `Movie.tags`: the movie's tag list in its current order
pub struct MovieTagsResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for MovieTagsResolver {
    async fn resolve(&self, parent: &Value, _args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        resolve_tags(self.storage.as_ref(), &parent_tag_ids(parent, "tagIds")).await
    }
}

/// `Movie.artworks(filters)`: each invocation derives its own filtered view
pub struct MovieArtworksResolver;

#[async_trait::async_trait]
impl Resolver for MovieArtworksResolver {
    async fn resolve(&self, parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let artworks: Vec<Artwork> = match parent.get("artworks") {
            Some(artworks @ Value::Array(_)) => serde_json::from_value(artworks.clone())?,
            _ => Vec::new(),
        };
        let filter: Option<ArtworkFilter> = args.optional("filters")?;
        to_value(&filter::apply_optional(&artworks, filter.as_ref()))
    }
}

/// `Details.tags`: re-reads the owning movie, which may have been deleted
pub struct DetailsTagsResolver {
    storage: Arc<dyn MovieStorage>,
}

#[async_trait::async_trait]
impl Resolver for DetailsTagsResolver {
    async fn resolve(&self, parent: &Value, _args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = parent
            .get("id")
            .and_then(id_from_json)
            .map(MovieId::from)
            .ok_or_else(|| MovieGraphError::Internal("details without a movie id".to_string()))?;
        let movie = self
            .storage
            .get_movie(&id)
            .await?
            .ok_or_else(|| MovieGraphError::MovieNotFound { id: id.to_string() })?;
        resolve_tags(self.storage.as_ref(), &movie.tag_ids).await
    }
}

/// `Mutation.deleteMovie(movieId)`
pub struct DeleteMovieResolver {
    coordinator: MutationCoordinator,
}

#[async_trait::async_trait]
impl Resolver for DeleteMovieResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = MovieId::from(args.required_id("movieId")?);
        Ok(Value::Bool(self.coordinator.delete_movie(&id).await?))
    }
}

/// `Mutation.addTagsToMovie(movieId, tagIds)`
pub struct AddTagsResolver {
    coordinator: MutationCoordinator,
}

#[async_trait::async_trait]
impl Resolver for AddTagsResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = MovieId::from(args.required_id("movieId")?);
        let movie = self.coordinator.add_tags(&id, &tag_ids(args)?).await?;
        movie_source(movie, None)
    }
}

/// `Mutation.removeTagsFromMovie(movieId, tagIds)`
pub struct RemoveTagsResolver {
    coordinator: MutationCoordinator,
}

#[async_trait::async_trait]
impl Resolver for RemoveTagsResolver {
    async fn resolve(&self, _parent: &Value, args: &Arguments, _ctx: &RequestContext) -> Result<Value> {
        let id = MovieId::from(args.required_id("movieId")?);
        let movie = self.coordinator.remove_tags(&id, &tag_ids(args)?).await?;
        movie_source(movie, None)
    }
}

/// Registry for the canonical movie schema
pub fn movie_registry(
    storage: Arc<dyn MovieStorage>,
    coordinator: MutationCoordinator,
) -> Result<ResolverRegistry> {
    let mut registry = ResolverRegistry::new();

    registry.register("Query", "movies", MoviesResolver { storage: storage.clone() })?;
    registry.register("Query", "movie", MovieResolver { storage: storage.clone() })?;
    registry.register("Query", "tags", TagsResolver { storage: storage.clone() })?;
    registry.register("Query", "tag", TagResolver { storage: storage.clone() })?;
    registry.register("Query", "requestDetails", RequestDetailsResolver)?;

    registry.register("Movie", "tags", MovieTagsResolver { storage: storage.clone() })?;
    registry.register("Movie", "artworks", MovieArtworksResolver)?;
    registry.register("Details", "tags", DetailsTagsResolver { storage })?;

    registry.register("Mutation", "deleteMovie", DeleteMovieResolver {
        coordinator: coordinator.clone(),
    })?;
    registry.register("Mutation", "addTagsToMovie", AddTagsResolver {
        coordinator: coordinator.clone(),
    })?;
    registry.register("Mutation", "removeTagsFromMovie", RemoveTagsResolver { coordinator })?;

    Ok(registry)
}
