// Artwork domain model - immutable image records owned by a movie

//! # Artwork Models
//!
//! An [`Artwork`] is created once when the store is seeded and never mutated
//! afterwards. Queries only ever change which artworks are *visible* in a
//! response (see the filter evaluator), never the artworks themselves.
//!
//! ## Type Codes
//! Artwork types come from a fixed set of image-type strings, modeled as the
//! [`ArtworkType`] enum. The wire form is the SCREAMING_SNAKE_CASE code.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::ids::ArtworkId;

/// Fixed set of image-type codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtworkType {
    Boxart,
    Billboard,
    StoryArt,
    TitleTreatment,
    CharacterArt,
}

impl ArtworkType {
    /// Every known type code, in declaration order
    pub const ALL: [ArtworkType; 5] = [
        ArtworkType::Boxart,
        ArtworkType::Billboard,
        ArtworkType::StoryArt,
        ArtworkType::TitleTreatment,
        ArtworkType::CharacterArt,
    ];

    /// Wire code for this type
    pub fn code(&self) -> &'static str {
        match self {
            ArtworkType::Boxart => "BOXART",
            ArtworkType::Billboard => "BILLBOARD",
            ArtworkType::StoryArt => "STORY_ART",
            ArtworkType::TitleTreatment => "TITLE_TREATMENT",
            ArtworkType::CharacterArt => "CHARACTER_ART",
        }
    }
}

impl FromStr for ArtworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArtworkType::ALL
            .iter()
            .copied()
            .find(|t| t.code() == s)
            .ok_or_else(|| format!("unknown artwork type '{}'", s))
    }
}

impl std::fmt::Display for ArtworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// An image belonging to exactly one movie
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artwork {
    pub id: ArtworkId,
    pub name: String,
    /// Language code, e.g. `en`
    pub language: String,
    #[serde(rename = "type")]
    pub artwork_type: ArtworkType,
}

impl Artwork {
    pub fn new<I, N, L>(id: I, name: N, language: L, artwork_type: ArtworkType) -> Self
    where
        I: Into<ArtworkId>,
        N: Into<String>,
        L: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            language: language.into(),
            artwork_type,
        }
    }
}
