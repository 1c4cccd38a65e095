use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Watch,
    Checkin,
    Scrobble,
    #[serde(other)]
    Unknown,
}

/// One viewing event of a movie.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryEntry {
    pub id: u64,
    pub watched_at: DateTime<Utc>,
    pub action: HistoryAction,
}

impl HistoryEntry {
    pub fn watched_date(&self) -> NaiveDate {
        self.watched_at.date_naive()
    }
}
