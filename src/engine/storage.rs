// Storage abstraction for the movie graph
// This defines the interface for reading and mutating the catalog

//! # Storage Abstraction Layer
//!
//! The data store owns the authoritative movies, tags and artworks. Every
//! other component reads through the [`MovieStorage`] trait and receives
//! owned clones, so nothing outside the store can mutate it by accident.
//!
//! ## Storage Architecture
//!
//! The storage layer follows the **Repository Pattern**:
//! - **MovieStorage trait**: the interface for all storage operations
//! - **InMemoryStorage**: insertion-ordered, process-lifetime implementation
//!
//! ## Ordering
//!
//! Both tables are [`IndexMap`]s, so `list_movies` / `list_tags` return entries
//! in insertion order. Deletion uses `shift_remove` to keep that order intact
//! for the remaining entries.
//!
//! ## Thread Safety
//!
//! - Uses `RwLock` so reads never block other reads
//! - A write holds the lock only for the duration of a single map update;
//!   serializing read-modify-write cycles per movie is the job of the
//!   [`MutationCoordinator`](crate::MutationCoordinator)
//!
//! ## Rust Learning Notes:
//!
//! ### Lock Poisoning
//! `RwLock::read()` returns `Err` if another thread panicked while holding the
//! lock. Instead of `unwrap()` we map that into a storage error and propagate
//! it with `?`.

use indexmap::IndexMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::models::{Movie, MovieId, Tag, TagId};
use crate::seed::Fixture;
use crate::{MovieGraphError, Result};

/// Storage trait for the movie catalog
///
/// ## Return Value
/// `Result<Option<T>>` means:
/// - `Ok(Some(value))`: found
/// - `Ok(None)`: no entity with that id (not an error at this layer)
/// - `Err(error)`: the operation itself failed
#[async_trait::async_trait]
pub trait MovieStorage: Send + Sync {
    /// Store a movie, replacing any previous movie with the same id.
    /// A replaced movie keeps its original position.
    async fn insert_movie(&self, movie: Movie) -> Result<Movie>;

    /// Get a movie by exact id
    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>>;

    /// All movies in insertion order
    async fn list_movies(&self) -> Result<Vec<Movie>>;

    /// Remove a movie. `true` if it existed, `false` otherwise.
    async fn delete_movie(&self, id: &MovieId) -> Result<bool>;

    /// Overwrite a movie's tag list. `None` if the movie does not exist.
    async fn replace_movie_tags(&self, id: &MovieId, tag_ids: Vec<TagId>)
        -> Result<Option<Movie>>;

    /// Store a tag, replacing any previous tag with the same id
    async fn insert_tag(&self, tag: Tag) -> Result<Tag>;

    /// Get a tag by exact id
    async fn get_tag(&self, id: &TagId) -> Result<Option<Tag>>;

    /// All tags in insertion order
    async fn list_tags(&self) -> Result<Vec<Tag>>;
}

/// In-memory storage implementation
///
/// ## Limitations
///
/// - **Not persistent**: Data is lost when process restarts
/// - **Not distributed**: Cannot share data across multiple processes
#[derive(Default)]
pub struct InMemoryStorage {
    /// Key: movie id, Value: movie. Insertion ordered.
    movies: RwLock<IndexMap<MovieId, Movie>>,

    /// Key: tag id, Value: tag. Insertion ordered.
    tags: RwLock<IndexMap<TagId, Tag>>,
}

impl InMemoryStorage {
    /// Empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store seeded from a fixture. Tags are loaded before movies.
    pub fn from_fixture(fixture: Fixture) -> Self {
        let Fixture { tags, movies } = fixture;
        debug!(tags = tags.len(), movies = movies.len(), "seeding in-memory storage");
        Self {
            movies: RwLock::new(movies.into_iter().map(|m| (m.id.clone(), m)).collect()),
            tags: RwLock::new(tags.into_iter().map(|t| (t.id.clone(), t)).collect()),
        }
    }

    fn read_movies(&self) -> Result<RwLockReadGuard<'_, IndexMap<MovieId, Movie>>> {
        self.movies
            .read()
            .map_err(|_| MovieGraphError::Internal("movie table lock poisoned".to_string()))
    }

    fn write_movies(&self) -> Result<RwLockWriteGuard<'_, IndexMap<MovieId, Movie>>> {
        self.movies
            .write()
            .map_err(|_| MovieGraphError::Internal("movie table lock poisoned".to_string()))
    }

    fn read_tags(&self) -> Result<RwLockReadGuard<'_, IndexMap<TagId, Tag>>> {
        self.tags
            .read()
            .map_err(|_| MovieGraphError::Internal("tag table lock poisoned".to_string()))
    }

    fn write_tags(&self) -> Result<RwLockWriteGuard<'_, IndexMap<TagId, Tag>>> {
        self.tags
            .write()
            .map_err(|_| MovieGraphError::Internal("tag table lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl MovieStorage for InMemoryStorage {
    async fn insert_movie(&self, movie: Movie) -> Result<Movie> {
        let mut movies = self.write_movies()?;
        movies.insert(movie.id.clone(), movie.clone());
        Ok(movie)
    }

    async fn get_movie(&self, id: &MovieId) -> Result<Option<Movie>> {
        let movies = self.read_movies()?;
        Ok(movies.get(id).cloned())
    }

    async fn list_movies(&self) -> Result<Vec<Movie>> {
        let movies = self.read_movies()?;
        Ok(movies.values().cloned().collect())
    }

    async fn delete_movie(&self, id: &MovieId) -> Result<bool> {
        let mut movies = self.write_movies()?;
        Ok(movies.shift_remove(id).is_some())
    }

    async fn replace_movie_tags(
        &self,
        id: &MovieId,
        tag_ids: Vec<TagId>,
    ) -> Result<Option<Movie>> {
        let mut movies = self.write_movies()?;
        Ok(movies.get_mut(id).map(|movie| {
            movie.tag_ids = tag_ids;
            movie.clone()
        }))
    }

    async fn insert_tag(&self, tag: Tag) -> Result<Tag> {
        let mut tags = self.write_tags()?;
        tags.insert(tag.id.clone(), tag.clone());
        Ok(tag)
    }

    async fn get_tag(&self, id: &TagId) -> Result<Option<Tag>> {
        let tags = self.read_tags()?;
        Ok(tags.get(id).cloned())
    }

    async fn list_tags(&self) -> Result<Vec<Tag>> {
        let tags = self.read_tags()?;
        Ok(tags.values().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_storage() -> InMemoryStorage {
        InMemoryStorage::from_fixture(
            Fixture::new()
                .tag(Tag::new("tag-1", "Action"))
                .tag(Tag::new("tag-2", "Drama"))
                .movie(Movie::new("3", "Third").with_tags(["tag-1"]))
                .movie(Movie::new("1", "First"))
                .movie(Movie::new("2", "Second")),
        )
    }

    fn ids(movies: &[Movie]) -> Vec<&str> {
        movies.iter().map(|m| m.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_list_movies_keeps_insertion_order() {
        let storage = create_test_storage();
        let movies = storage.list_movies().await.unwrap();
        assert_eq!(ids(&movies), vec!["3", "1", "2"]);
    }

    #[tokio::test]
    async fn test_get_movie_is_exact_match() {
        let storage = create_test_storage();
        assert_eq!(
            storage.get_movie(&MovieId::from("1")).await.unwrap().unwrap().title,
            "First"
        );
        assert!(storage.get_movie(&MovieId::from("01")).await.unwrap().is_none());
        assert!(storage.get_movie(&MovieId::from("")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_movie_reports_existence() {
        let storage = create_test_storage();
        assert!(storage.delete_movie(&MovieId::from("1")).await.unwrap());
        assert!(!storage.delete_movie(&MovieId::from("1")).await.unwrap());
        assert!(!storage.delete_movie(&MovieId::from("missing")).await.unwrap());

        let movies = storage.list_movies().await.unwrap();
        assert_eq!(ids(&movies), vec!["3", "2"]);
    }

    #[tokio::test]
    async fn test_replace_movie_tags() {
        let storage = create_test_storage();
        let updated = storage
            .replace_movie_tags(&MovieId::from("3"), vec![TagId::from("tag-2")])
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.tag_ids, vec![TagId::from("tag-2")]);

        let missing = storage
            .replace_movie_tags(&MovieId::from("missing"), vec![])
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_tags() {
        let storage = create_test_storage();
        let tags = storage.list_tags().await.unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id, TagId::from("tag-1"));
        assert_eq!(
            storage.get_tag(&TagId::from("tag-2")).await.unwrap().unwrap().name,
            "Drama"
        );
        assert!(storage.get_tag(&TagId::from("tag-9")).await.unwrap().is_none());

        storage.insert_tag(Tag::new("tag-3", "Comedy")).await.unwrap();
        assert_eq!(storage.list_tags().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_insert_movie_replaces_in_place() {
        let storage = create_test_storage();
        storage.insert_movie(Movie::new("1", "Renamed")).await.unwrap();
        let movies = storage.list_movies().await.unwrap();
        assert_eq!(ids(&movies), vec!["3", "1", "2"]);
        assert_eq!(movies[1].title, "Renamed");
    }
}
