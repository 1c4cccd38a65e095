use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One exported row: a single viewing of a movie.
///
/// `rating10` is a per-movie attribute and is repeated on every viewing of
/// the same movie. `rewatch` is set on every viewing except the most recent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MovieRecord {
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<u32>,
    pub title: String,
    pub year: Option<u32>,
    pub watched_date: Option<NaiveDate>,
    pub rating10: Option<u8>,
    #[serde(default)]
    pub rewatch: bool,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>, year: Option<u32>) -> Self {
        Self {
            imdb_id: None,
            tmdb_id: None,
            title: title.into(),
            year,
            watched_date: None,
            rating10: None,
            rewatch: false,
        }
    }

    /// Copy of this record for a specific viewing. Ids, title, year and
    /// rating carry over unchanged.
    pub fn viewing(&self, watched_date: NaiveDate, rewatch: bool) -> Self {
        Self {
            watched_date: Some(watched_date),
            rewatch,
            ..self.clone()
        }
    }

    /// `yyyy-MM-dd`, or an empty string when the date is unknown.
    pub fn watched_date_string(&self) -> String {
        self.watched_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}
