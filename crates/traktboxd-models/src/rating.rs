use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user's rating for one movie, on Trakt's 1-10 scale.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MovieRating {
    pub movie_id: u64,
    pub rating: u8,
    pub rated_at: Option<DateTime<Utc>>,
}
