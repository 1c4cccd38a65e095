use serde::{Deserialize, Serialize};

/// Identifiers attached to every movie payload returned by Trakt.
///
/// `trakt` is the service's internal id. It is only ever used as a merge key
/// while reconciling an export and never ends up in the CSV.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieIds {
    pub trakt: u64,
    #[serde(default)]
    pub slug: Option<String>,
    #[serde(default)]
    pub imdb: Option<String>,
    #[serde(default)]
    pub tmdb: Option<u32>,
}

impl MovieIds {
    pub fn new(trakt: u64) -> Self {
        Self {
            trakt,
            slug: None,
            imdb: None,
            tmdb: None,
        }
    }

    pub fn with_imdb(mut self, imdb: impl Into<String>) -> Self {
        self.imdb = Some(imdb.into());
        self
    }

    pub fn with_tmdb(mut self, tmdb: u32) -> Self {
        self.tmdb = Some(tmdb);
        self
    }

    /// IMDb id with any stray slashes removed (Trakt sometimes includes them).
    /// Empty ids are treated as missing.
    pub fn normalized_imdb(&self) -> Option<String> {
        self.imdb
            .as_deref()
            .map(|id| id.replace('/', ""))
            .filter(|id| !id.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_imdb_strips_slashes() {
        let ids = MovieIds::new(1).with_imdb("/tt0111161/");
        assert_eq!(ids.normalized_imdb(), Some("tt0111161".to_string()));
    }

    #[test]
    fn test_normalized_imdb_empty_is_none() {
        let ids = MovieIds::new(1).with_imdb("");
        assert_eq!(ids.normalized_imdb(), None);
        assert_eq!(MovieIds::new(1).normalized_imdb(), None);
    }

    #[test]
    fn test_deserialize_with_null_ids() {
        let ids: MovieIds = serde_json::from_str(
            r#"{"trakt": 12601, "slug": "the-dark-knight-2008", "imdb": null, "tmdb": null}"#,
        )
        .unwrap();
        assert_eq!(ids.trakt, 12601);
        assert_eq!(ids.slug.as_deref(), Some("the-dark-knight-2008"));
        assert!(ids.imdb.is_none());
        assert!(ids.tmdb.is_none());
    }
}
