// Mutation coordinator
// Serialized, all-or-nothing edits of a movie's tag list

//! # Mutation Coordinator
//!
//! Every mutation of a movie runs under that movie's async mutex, so two
//! concurrent `add_tags` calls on the same movie cannot lose each other's
//! update. Mutations of different movies take different mutexes and proceed
//! independently.
//!
//! ## Lifecycle of one call
//!
//! 1. A task is spawned for the body; dropping the caller's future does not
//!    cancel a mutation once it has been handed to the runtime
//! 2. The movie's gate is cloned out of the [`DashMap`] (no shard lock is held
//!    across an `.await`) and locked
//! 3. Movie and tag ids are validated, the new tag list is computed and written
//!    in one storage call
//! 4. The write latency elapses before the result is delivered
//!
//! A gate lives only as long as its movie: calls that find the movie missing,
//! and deletes, remove the map entry once no other call is holding it.
//!
//! ## Rust Learning Notes:
//!
//! ### `lock_owned`
//! `tokio::sync::Mutex::lock_owned` takes an `Arc<Mutex<_>>` and returns a guard
//! that is `'static`, which is what a spawned task needs.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::engine::latency::{LatencySimulator, OperationClass};
use crate::engine::storage::MovieStorage;
use crate::models::{Movie, MovieId, TagId};
use crate::{MovieGraphError, Result};

#[derive(Debug, Clone)]
enum TagEdit {
    Add(Vec<TagId>),
    Remove(Vec<TagId>),
}

#[derive(Clone)]
pub struct MutationCoordinator {
    storage: Arc<dyn MovieStorage>,
    gates: Arc<DashMap<MovieId, Arc<Mutex<()>>>>,
    latency: LatencySimulator,
}

impl MutationCoordinator {
    pub fn new(storage: Arc<dyn MovieStorage>, latency: LatencySimulator) -> Self {
        Self {
            storage,
            gates: Arc::new(DashMap::new()),
            latency,
        }
    }

    /// Append each tag not already present, in request order.
    /// Any unknown tag id fails the whole call before anything changes.
    pub async fn add_tags(&self, movie_id: &MovieId, tag_ids: &[TagId]) -> Result<Movie> {
        self.spawn_edit(movie_id.clone(), TagEdit::Add(tag_ids.to_vec()))
            .await
    }

    /// Remove the first occurrence of each tag; absent tags are ignored
    pub async fn remove_tags(&self, movie_id: &MovieId, tag_ids: &[TagId]) -> Result<Movie> {
        self.spawn_edit(movie_id.clone(), TagEdit::Remove(tag_ids.to_vec()))
            .await
    }

    /// `true` if the movie existed
    pub async fn delete_movie(&self, movie_id: &MovieId) -> Result<bool> {
        let this = self.clone();
        let movie_id = movie_id.clone();
        let handle = tokio::spawn(async move {
            let deleted = this
                .latency
                .after(OperationClass::Write, async {
                    let deleted = {
                        let _guard = this.gate(&movie_id).lock_owned().await;
                        this.storage.delete_movie(&movie_id).await
                    };
                    this.release(&movie_id);
                    deleted
                })
                .await?;
            if deleted {
                info!(movie_id = %movie_id, "deleted movie");
            }
            Ok(deleted)
        });
        handle.await?
    }

    fn gate(&self, movie_id: &MovieId) -> Arc<Mutex<()>> {
        self.gates
            .entry(movie_id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drop the gate of a movie that no longer exists, unless another call still holds it
    fn release(&self, movie_id: &MovieId) {
        self.gates
            .remove_if(movie_id, |_, gate| Arc::strong_count(gate) == 1);
    }

    async fn spawn_edit(&self, movie_id: MovieId, edit: TagEdit) -> Result<Movie> {
        let this = self.clone();
        let handle = tokio::spawn(async move {
            this.latency
                .after(OperationClass::Write, this.apply(&movie_id, edit))
                .await
        });
        handle.await?
    }

    async fn apply(&self, movie_id: &MovieId, edit: TagEdit) -> Result<Movie> {
        let result = {
            let _guard = self.gate(movie_id).lock_owned().await;
            self.edit_locked(movie_id, edit).await
        };
        if let Err(MovieGraphError::MovieNotFound { .. }) = result {
            self.release(movie_id);
        }
        result
    }

    async fn edit_locked(&self, movie_id: &MovieId, edit: TagEdit) -> Result<Movie> {
        debug!(movie_id = %movie_id, edit = ?edit, "applying tag edit");

        let movie = self
            .storage
            .get_movie(movie_id)
            .await?
            .ok_or_else(|| MovieGraphError::MovieNotFound {
                id: movie_id.to_string(),
            })?;

        let tags = match edit {
            TagEdit::Add(tag_ids) => {
                for tag_id in &tag_ids {
                    if self.storage.get_tag(tag_id).await?.is_none() {
                        return Err(MovieGraphError::TagNotFound {
                            id: tag_id.to_string(),
                        });
                    }
                }
                with_added(movie.tag_ids, tag_ids)
            }
            TagEdit::Remove(tag_ids) => with_removed(movie.tag_ids, &tag_ids),
        };

        let updated = self
            .storage
            .replace_movie_tags(movie_id, tags)
            .await?
            .ok_or_else(|| MovieGraphError::MovieNotFound {
                id: movie_id.to_string(),
            })?;
        info!(movie_id = %movie_id, tags = updated.tag_ids.len(), "updated movie tags");
        Ok(updated)
    }
}

fn with_added(mut current: Vec<TagId>, added: Vec<TagId>) -> Vec<TagId> {
    for tag_id in added {
        if !current.contains(&tag_id) {
            current.push(tag_id);
        }
    }
    current
}

fn with_removed(mut current: Vec<TagId>, removed: &[TagId]) -> Vec<TagId> {
    for tag_id in removed {
        if let Some(position) = current.iter().position(|t| t == tag_id) {
            current.remove(position);
        }
    }
    current
}
