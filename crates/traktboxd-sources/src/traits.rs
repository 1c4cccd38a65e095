use crate::error::SourceError;
use async_trait::async_trait;
use traktboxd_models::{DateRange, HistoryEntry, MovieRating, WatchedMovie};

/// Read-only access to a user's movie activity on a tracking service.
#[async_trait]
pub trait WatchSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Aggregate watched list: one entry per movie with its play count.
    async fn get_watched_movies(&self, user: &str) -> Result<Vec<WatchedMovie>, SourceError>;

    async fn get_ratings(&self, user: &str) -> Result<Vec<MovieRating>, SourceError>;

    /// Individual viewings of one movie inside `range`, oldest first.
    ///
    /// An inverted range is passed through as-is; Trakt answers it with an
    /// empty list.
    async fn get_history(
        &self,
        user: &str,
        movie_id: u64,
        range: &DateRange,
    ) -> Result<Vec<HistoryEntry>, SourceError>;
}
