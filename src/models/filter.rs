use serde::{Deserialize, Serialize};

use super::artwork::{Artwork, ArtworkType};

/// Inclusion sets narrowing an artwork list.
///
/// Each set is either empty (no constraint) or populated (keep only members).
/// The two sets are AND-combined. Missing keys deserialize as empty sets, unknown
/// keys and unknown type codes are rejected.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtworkFilter {
    #[serde(default, deserialize_with = "nullable_list")]
    pub languages: Vec<String>,
    #[serde(default, deserialize_with = "nullable_list")]
    pub types: Vec<ArtworkType>,
}

// `languages: null` means the same as an omitted key
fn nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ArtworkFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_languages<I, S>(mut self, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.languages = languages.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_types<I: IntoIterator<Item = ArtworkType>>(mut self, types: I) -> Self {
        self.types = types.into_iter().collect();
        self
    }

    /// Both sets empty: the filter keeps everything
    pub fn is_identity(&self) -> bool {
        self.languages.is_empty() && self.types.is_empty()
    }

    /// Whether a single artwork satisfies both inclusion sets
    pub fn matches(&self, artwork: &Artwork) -> bool {
        let language_ok =
            self.languages.is_empty() || self.languages.iter().any(|l| *l == artwork.language);
        let type_ok = self.types.is_empty() || self.types.contains(&artwork.artwork_type);
        language_ok && type_ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_defaults_and_nulls() {
        let filter: ArtworkFilter = serde_json::from_value(json!({})).unwrap();
        assert!(filter.is_identity());

        let filter: ArtworkFilter =
            serde_json::from_value(json!({"languages": ["en"], "types": null})).unwrap();
        assert_eq!(filter.languages, vec!["en".to_string()]);
        assert!(filter.types.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_malformed_filters() {
        assert!(serde_json::from_value::<ArtworkFilter>(json!({"types": ["POSTER"]})).is_err());
        assert!(serde_json::from_value::<ArtworkFilter>(json!({"languages": "en"})).is_err());
        assert!(serde_json::from_value::<ArtworkFilter>(json!({"colors": []})).is_err());
    }
}
