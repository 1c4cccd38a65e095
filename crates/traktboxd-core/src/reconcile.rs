//! Turns a user's watched list, ratings and per-movie history into one
//! [`MovieRecord`] per viewing.
//!
//! The watched list only carries aggregate play counts. Movies played once
//! take their date straight from it; movies played more than once need a
//! history lookup to recover each viewing, and every viewing but the most
//! recent is flagged as a rewatch.

use futures::stream::{self, StreamExt, TryStreamExt};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, warn};
use traktboxd_models::{DateRange, HistoryEntry, MovieRecord};
use traktboxd_sources::{SourceError, WatchSource};

/// Build the ordered list of records for `user`.
///
/// Records come out grouped per movie in ascending internal-id order; a
/// multi-watch movie contributes a contiguous block in history order. At
/// most `history_concurrency` history requests are in flight at once. The
/// first failed request aborts the whole operation.
pub async fn collect_movie_records<S>(
    source: &S,
    user: &str,
    range: &DateRange,
    history_concurrency: usize,
) -> Result<Vec<MovieRecord>, SourceError>
where
    S: WatchSource + ?Sized,
{
    if range.is_inverted() {
        warn!(
            "Start date {:?} is after end date {:?}; {} will return no history for multi-watch movies",
            range.start,
            range.end,
            source.source_name()
        );
    }

    let watched = source.get_watched_movies(user).await?;
    let watched_count = watched.len();

    // Keyed by the service's internal id, which is only a merge key
    let mut movies: BTreeMap<u64, MovieRecord> = BTreeMap::new();
    let mut multi_watch: BTreeSet<u64> = BTreeSet::new();

    for entry in watched {
        let movie_id = entry.movie_id();
        let mut record = MovieRecord::new(entry.title.clone(), entry.year);
        record.imdb_id = entry.ids.normalized_imdb();
        record.tmdb_id = entry.ids.tmdb;

        if entry.plays == 1 {
            record.watched_date = Some(entry.last_watched_date());
        }
        if entry.is_multi_watch() {
            multi_watch.insert(movie_id);
        } else {
            multi_watch.remove(&movie_id);
        }
        movies.insert(movie_id, record);
    }

    debug!(
        "Indexed watched list: user={}, entries={}, movies={}, multi_watch={}",
        user,
        watched_count,
        movies.len(),
        multi_watch.len()
    );

    // Ratings must land on the base records before any viewing is copied from them
    let ratings = source.get_ratings(user).await?;
    let mut attached = 0;
    for rating in &ratings {
        if let Some(record) = movies.get_mut(&rating.movie_id) {
            record.rating10 = Some(rating.rating);
            attached += 1;
        }
    }
    debug!(
        "Attached ratings: user={}, ratings={}, attached={}",
        user,
        ratings.len(),
        attached
    );

    let movie_count = movies.len();
    let multi_watch = &multi_watch;
    let blocks: Vec<Vec<MovieRecord>> = stream::iter(movies)
        .map(|(movie_id, record)| async move {
            if !multi_watch.contains(&movie_id) {
                return Ok::<_, SourceError>(vec![record]);
            }
            let history = source.get_history(user, movie_id, range).await?;
            debug!(
                "Expanding history: movie_id={}, title={}, viewings={}",
                movie_id,
                record.title,
                history.len()
            );
            Ok(expand_viewings(&record, &history))
        })
        .buffered(history_concurrency.max(1))
        .try_collect()
        .await?;

    let records: Vec<MovieRecord> = blocks.into_iter().flatten().collect();

    info!(
        "Reconciled {} records from {} movies ({} multi-watch) for {}",
        records.len(),
        movie_count,
        multi_watch.len(),
        user
    );

    Ok(records)
}

/// One record per history entry, copying the movie's attributes from `base`.
///
/// `history` must be oldest first: the last entry is the most recent viewing
/// and the only one not flagged as a rewatch. Empty history yields no records.
pub fn expand_viewings(base: &MovieRecord, history: &[HistoryEntry]) -> Vec<MovieRecord> {
    let last = history.len().saturating_sub(1);
    history
        .iter()
        .enumerate()
        .map(|(i, entry)| base.viewing(entry.watched_date(), i < last))
        .collect()
}
