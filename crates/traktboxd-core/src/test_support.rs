//! Shared fixtures for unit tests.

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;
use traktboxd_models::{DateRange, HistoryAction, HistoryEntry, MovieIds, MovieRating, WatchedMovie};
use traktboxd_sources::{SourceError, WatchSource};

/// In-memory source. Failures are stored as status codes and turned into
/// upstream errors on each call.
#[derive(Default)]
pub(crate) struct FakeSource {
    pub watched: Vec<WatchedMovie>,
    pub ratings: Vec<MovieRating>,
    pub history: HashMap<u64, Vec<HistoryEntry>>,
    pub watched_failure: Option<u16>,
    pub ratings_failure: Option<u16>,
    pub history_failures: HashMap<u64, u16>,
    history_calls: Mutex<Vec<(u64, DateRange)>>,
}

impl FakeSource {
    pub fn history_calls(&self) -> Vec<(u64, DateRange)> {
        self.history_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatchSource for FakeSource {
    fn source_name(&self) -> &str {
        "fake"
    }

    async fn get_watched_movies(&self, _user: &str) -> Result<Vec<WatchedMovie>, SourceError> {
        match self.watched_failure {
            Some(status) => Err(SourceError::upstream(status, "Watched Failure")),
            None => Ok(self.watched.clone()),
        }
    }

    async fn get_ratings(&self, _user: &str) -> Result<Vec<MovieRating>, SourceError> {
        match self.ratings_failure {
            Some(status) => Err(SourceError::upstream(status, "Not Found")),
            None => Ok(self.ratings.clone()),
        }
    }

    async fn get_history(
        &self,
        _user: &str,
        movie_id: u64,
        range: &DateRange,
    ) -> Result<Vec<HistoryEntry>, SourceError> {
        self.history_calls.lock().unwrap().push((movie_id, *range));
        if let Some(status) = self.history_failures.get(&movie_id) {
            return Err(SourceError::upstream(*status, "Service Unavailable"));
        }
        Ok(self.history.get(&movie_id).cloned().unwrap_or_default())
    }
}

pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub(crate) fn watched(trakt: u64, title: &str, plays: u32, last: (i32, u32, u32)) -> WatchedMovie {
    WatchedMovie {
        ids: MovieIds::new(trakt)
            .with_imdb(format!("tt{:07}", trakt))
            .with_tmdb(trakt as u32 + 1000),
        title: title.to_string(),
        year: Some(2000),
        plays,
        last_watched_at: Utc.with_ymd_and_hms(last.0, last.1, last.2, 22, 30, 0).unwrap(),
    }
}

pub(crate) fn viewing(id: u64, y: i32, m: u32, d: u32) -> HistoryEntry {
    HistoryEntry {
        id,
        watched_at: Utc.with_ymd_and_hms(y, m, d, 20, 0, 0).unwrap(),
        action: HistoryAction::Watch,
    }
}

pub(crate) fn rating(movie_id: u64, rating: u8) -> MovieRating {
    MovieRating {
        movie_id,
        rating,
        rated_at: None,
    }
}

