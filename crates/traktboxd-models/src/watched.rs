use crate::MovieIds;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Aggregate entry from a user's watched-movies list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WatchedMovie {
    pub ids: MovieIds,
    pub title: String,
    pub year: Option<u32>,
    pub plays: u32,
    pub last_watched_at: DateTime<Utc>,
}

impl WatchedMovie {
    pub fn movie_id(&self) -> u64 {
        self.ids.trakt
    }

    /// More than one play means the individual viewings have to be looked up
    /// in the movie's history.
    pub fn is_multi_watch(&self) -> bool {
        self.plays > 1
    }

    /// Calendar date (UTC) of the most recent play.
    pub fn last_watched_date(&self) -> NaiveDate {
        self.last_watched_at.date_naive()
    }
}
