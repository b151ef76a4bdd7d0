// Seed data for the in-memory store

//! # Fixtures
//!
//! A [`Fixture`] is the complete initial content of a store. The service seeds
//! exactly one store from one fixture at construction; tests build small
//! fixtures of their own with the builder methods.
//!
//! ```rust
//! # use movie_graph::{Fixture, Movie, Tag};
//! let fixture = Fixture::new()
//!     .tag(Tag::new("tag-1", "Drama"))
//!     .movie(Movie::new("1", "some movie 1").with_tags(["tag-1"]));
//! assert_eq!(fixture.movies.len(), 1);
//! ```

use crate::models::{Artwork, ArtworkType, Movie, Tag};

/// Movie ids served by the catalog
pub const CATALOG_MOVIE_IDS: [&str; 11] = [
    "80117715", "80057281", "80117456", "80229867", "80025678", "80229865", "81023035",
    "80077209", "81023174", "81023181", "70000794",
];

pub const CATALOG_LANGUAGES: [&str; 3] = ["en", "es", "fr"];

const CATALOG_TAGS: [(&str, &str); 5] = [
    ("tag-1", "Drama"),
    ("tag-2", "Comedy"),
    ("tag-3", "Thriller"),
    ("tag-4", "Documentary"),
    ("tag-5", "Animation"),
];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fixture {
    pub tags: Vec<Tag>,
    pub movies: Vec<Movie>,
}

impl Fixture {
    /// Empty fixture
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    pub fn movie(mut self, movie: Movie) -> Self {
        self.movies.push(movie);
        self
    }

    /// The default catalog: eleven movies, five tags, and for every movie one
    /// artwork per language and `BOXART`/`BILLBOARD` type
    pub fn catalog() -> Self {
        let tags = CATALOG_TAGS
            .iter()
            .map(|(id, name)| Tag::new(*id, *name))
            .collect::<Vec<_>>();

        let movies = CATALOG_MOVIE_IDS
            .iter()
            .enumerate()
            .map(|(i, id)| {
                let first = &tags[i % tags.len()];
                let second = &tags[(i + 1) % tags.len()];
                Movie::new(*id, format!("some movie {}", id))
                    .with_tags([first.id.clone(), second.id.clone()])
                    .with_artworks(catalog_artworks(id))
                    .with_details(format!("Details of movie {}", id))
            })
            .collect();

        Self { tags, movies }
    }
}

fn catalog_artworks(movie_id: &str) -> Vec<Artwork> {
    let mut artworks = Vec::new();
    for language in CATALOG_LANGUAGES {
        for artwork_type in [ArtworkType::Boxart, ArtworkType::Billboard] {
            artworks.push(Artwork::new(
                format!("{}-{}-{}", movie_id, language, artwork_type.code().to_lowercase()),
                format!("{} {} ({})", artwork_type.code(), movie_id, language),
                language,
                artwork_type,
            ));
        }
    }
    artworks
}
