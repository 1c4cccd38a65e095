use crate::error::SourceError;
use crate::traits::WatchSource;
use crate::trakt::api;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use traktboxd_models::{DateRange, HistoryEntry, MovieRating, WatchedMovie};

/// Create the HTTP client used for every Trakt request
pub fn create_trakt_client() -> Client {
    Client::builder()
        .user_agent(concat!("traktboxd/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// Unauthenticated Trakt client. Public user data only needs the app's
/// client id, sent as the `trakt-api-key` header.
#[derive(Clone)]
pub struct TraktClient {
    client: Arc<Client>,
    api_url: String,
    client_id: String,
}

impl TraktClient {
    /// `api_url` is the service root, e.g. `https://api.trakt.tv`; a trailing
    /// slash is ignored.
    pub fn new(client_id: String, api_url: impl Into<String>) -> Self {
        Self {
            client: Arc::new(create_trakt_client()),
            api_url: api_url.into().trim_end_matches('/').to_string(),
            client_id,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait]
impl WatchSource for TraktClient {
    fn source_name(&self) -> &str {
        "trakt"
    }

    async fn get_watched_movies(&self, user: &str) -> Result<Vec<WatchedMovie>, SourceError> {
        api::get_watched_movies(&self.client, &self.api_url, &self.client_id, user).await
    }

    async fn get_ratings(&self, user: &str) -> Result<Vec<MovieRating>, SourceError> {
        api::get_ratings(&self.client, &self.api_url, &self.client_id, user).await
    }

    async fn get_history(
        &self,
        user: &str,
        movie_id: u64,
        range: &DateRange,
    ) -> Result<Vec<HistoryEntry>, SourceError> {
        api::get_history(&self.client, &self.api_url, &self.client_id, user, movie_id, range).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_keeps_api_url() {
        let client = TraktClient::new("id".to_string(), "https://api.trakt.tv");
        assert_eq!(client.api_url(), "https://api.trakt.tv");
        assert_eq!(client.source_name(), "trakt");
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = TraktClient::new("id".to_string(), "http://localhost:8080/");
        assert_eq!(client.api_url(), "http://localhost:8080");
    }
}
