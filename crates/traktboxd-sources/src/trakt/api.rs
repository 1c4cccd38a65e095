use crate::error::SourceError;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::HeaderMap;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use tracing::debug;
use traktboxd_models::{DateRange, HistoryAction, HistoryEntry, MovieIds, MovieRating, WatchedMovie};

/// Largest page size Trakt accepts for history listings.
const HISTORY_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Deserialize)]
struct TraktMovie {
    #[serde(default)]
    title: Option<String>,
    year: Option<u32>,
    ids: MovieIds,
}

#[derive(Debug, Deserialize)]
struct TraktWatchedItem {
    plays: u32,
    last_watched_at: DateTime<Utc>,
    movie: TraktMovie,
}

#[derive(Debug, Deserialize)]
struct TraktRatingItem {
    #[serde(default)]
    rated_at: Option<DateTime<Utc>>,
    rating: u8,
    movie: Option<TraktMovie>,
}

#[derive(Debug, Deserialize)]
struct TraktHistoryItem {
    id: u64,
    watched_at: DateTime<Utc>,
    #[serde(default)]
    action: Option<HistoryAction>,
}

impl From<TraktWatchedItem> for WatchedMovie {
    fn from(item: TraktWatchedItem) -> Self {
        WatchedMovie {
            ids: item.movie.ids,
            title: item.movie.title.unwrap_or_default(),
            year: item.movie.year,
            plays: item.plays,
            last_watched_at: item.last_watched_at,
        }
    }
}

impl From<TraktHistoryItem> for HistoryEntry {
    fn from(item: TraktHistoryItem) -> Self {
        HistoryEntry {
            id: item.id,
            watched_at: item.watched_at,
            action: item.action.unwrap_or(HistoryAction::Watch),
        }
    }
}

fn encode_user(user: &str) -> String {
    urlencoding::encode(user).into_owned()
}

pub fn watched_movies_url(api_url: &str, user: &str) -> String {
    format!("{}/users/{}/watched/movies", api_url, encode_user(user))
}

pub fn ratings_url(api_url: &str, user: &str) -> String {
    format!("{}/users/{}/ratings/movies", api_url, encode_user(user))
}

pub fn history_url(api_url: &str, user: &str, movie_id: u64) -> String {
    format!("{}/users/{}/history/movies/{}", api_url, encode_user(user), movie_id)
}

/// Query parameters for one page of a movie's history. Range bounds are only
/// sent when present.
pub fn history_query(range: &DateRange, page: u32) -> Vec<(&'static str, String)> {
    let mut query = vec![
        ("page", page.to_string()),
        ("limit", HISTORY_PAGE_LIMIT.to_string()),
    ];
    if let Some(start) = range.start_instant() {
        query.push(("start_at", start.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    if let Some(end) = range.end_instant() {
        query.push(("end_at", end.to_rfc3339_opts(SecondsFormat::Millis, true)));
    }
    query
}

fn page_count(headers: &HeaderMap) -> u32 {
    headers
        .get("X-Pagination-Page-Count")
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse().ok())
        .unwrap_or(1)
}

fn trakt_get(client: &Client, url: &str, client_id: &str) -> RequestBuilder {
    client
        .get(url)
        .header("Content-Type", "application/json")
        .header("trakt-api-version", "2")
        .header("trakt-api-key", client_id)
}

async fn ensure_success(response: Response, what: &str) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let error_text = response.text().await.unwrap_or_default();
    debug!("Failed to fetch {}: {} - {}", what, status, error_text);
    Err(SourceError::from_status(status))
}

/// Fetch a user's watched movies (one aggregate entry per movie)
pub async fn get_watched_movies(
    client: &Client,
    api_url: &str,
    client_id: &str,
    user: &str,
) -> Result<Vec<WatchedMovie>, SourceError> {
    let url = watched_movies_url(api_url, user);
    let response = trakt_get(client, &url, client_id).send().await?;
    let response = ensure_success(response, "watched movies").await?;

    let items: Vec<TraktWatchedItem> = response.json().await?;
    let watched: Vec<WatchedMovie> = items.into_iter().map(WatchedMovie::from).collect();

    debug!(
        "Fetched Trakt watched movies: user={}, total_items={}",
        user,
        watched.len()
    );
    Ok(watched)
}

/// Fetch a user's movie ratings
pub async fn get_ratings(
    client: &Client,
    api_url: &str,
    client_id: &str,
    user: &str,
) -> Result<Vec<MovieRating>, SourceError> {
    let url = ratings_url(api_url, user);
    let response = trakt_get(client, &url, client_id).send().await?;
    let response = ensure_success(response, "ratings").await?;

    let items: Vec<TraktRatingItem> = response.json().await?;
    let mut ratings = Vec::with_capacity(items.len());
    let mut items_without_movie = 0;

    for item in items {
        let Some(movie) = item.movie else {
            items_without_movie += 1;
            continue;
        };
        ratings.push(MovieRating {
            movie_id: movie.ids.trakt,
            rating: item.rating,
            rated_at: item.rated_at,
        });
    }

    debug!(
        "Fetched Trakt ratings: user={}, total_items={}, items_without_movie={}",
        user,
        ratings.len(),
        items_without_movie
    );
    Ok(ratings)
}

/// Fetch every viewing of one movie inside `range`, following pagination.
/// Entries come back sorted oldest first.
pub async fn get_history(
    client: &Client,
    api_url: &str,
    client_id: &str,
    user: &str,
    movie_id: u64,
    range: &DateRange,
) -> Result<Vec<HistoryEntry>, SourceError> {
    let url = history_url(api_url, user, movie_id);
    let mut entries = Vec::new();
    let mut page = 1;

    loop {
        let response = trakt_get(client, &url, client_id)
            .query(&history_query(range, page))
            .send()
            .await?;
        let response = ensure_success(response, "movie history").await?;

        let total_pages = page_count(response.headers());
        let items: Vec<TraktHistoryItem> = response.json().await?;
        entries.extend(items.into_iter().map(HistoryEntry::from));

        if page >= total_pages {
            break;
        }
        page += 1;
    }

    // Trakt lists history newest first; viewings are expanded oldest first
    sort_oldest_first(&mut entries);

    debug!(
        "Fetched Trakt history: user={}, movie_id={}, entries={}, pages={}",
        user,
        movie_id,
        entries.len(),
        page
    );
    Ok(entries)
}

fn sort_oldest_first(entries: &mut [HistoryEntry]) {
    entries.sort_by_key(|entry| entry.watched_at);
}
