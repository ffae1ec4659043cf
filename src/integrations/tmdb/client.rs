// src/integrations/tmdb/client.rs
//
// TMDB v3 REST client
//
// ARCHITECTURE:
// - Implements CatalogBackend over reqwest
// - Maps wire payloads to Items and page results (NO favorites merge)
// - Every failure leaves as a TransportFailure; classification happens
//   in the gateway
//
// CRITICAL RULES:
// - This is INFRASTRUCTURE, not DOMAIN
// - Never touches engine state

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{DiscoverQuery, Item, ItemId, PageResult};
use crate::error::{AppError, AppResult};
use crate::integrations::backend::{
    CatalogBackend, CreateListResponse, SessionResponse, TokenResponse, TransportFailure,
};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TmdbClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Language sent along with list creation
    pub language: String,
}

impl Default for TmdbClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            timeout_secs: 30,
            language: "en".to_string(),
        }
    }
}

/// Paged movie listing (discover and search share the shape)
#[derive(Debug, Deserialize)]
struct MovieResponse {
    #[serde(default)]
    results: Vec<Item>,
    #[serde(default)]
    total_pages: u32,
}

/// Error body TMDB sends with non-2xx statuses
#[derive(Debug, Deserialize)]
struct StatusBody {
    status_message: String,
}

pub struct TmdbClient {
    config: TmdbClientConfig,
    http_client: Client,
}

impl TmdbClient {
    pub fn new(config: TmdbClientConfig) -> AppResult<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Transport(e.into()))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Query parameters of a discover request, api key excluded
    fn discover_params(query: &DiscoverQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![("page", query.page.to_string())];
        if let Some(sort) = query.sort {
            params.push(("sort_by", sort.api_value().to_string()));
        }
        if let Some(genres) = query.genres_param() {
            params.push(("with_genres", genres));
        }
        if let Some(year) = query.release_year {
            params.push(("primary_release_year", year.to_string()));
        }
        if let Some(rating) = query.min_rating {
            params.push(("vote_average.gte", rating.to_string()));
        }
        params
    }

    /// Human-readable text for a failed response
    fn error_message(status: StatusCode, body: &str) -> String {
        match serde_json::from_str::<StatusBody>(body) {
            Ok(parsed) => parsed.status_message,
            Err(_) if body.trim().is_empty() => status.to_string(),
            Err(_) => format!("{}: {}", status, body.trim()),
        }
    }

    // ========================================================================
    // INTERNAL: Request Execution
    // ========================================================================

    async fn execute<T>(&self, request: RequestBuilder) -> Result<T, TransportFailure>
    where
        T: DeserializeOwned,
    {
        let response = request
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportFailure::status(
                status.as_u16(),
                Self::error_message(status, &body),
            ));
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| TransportFailure::Other(format!("Failed to parse TMDB response: {}", e)))
    }

    fn into_page(response: MovieResponse) -> PageResult {
        PageResult {
            items: response.results,
            total_pages: response.total_pages,
        }
    }
}

#[async_trait]
impl CatalogBackend for TmdbClient {
    async fn discover(
        &self,
        api_key: &str,
        query: &DiscoverQuery,
    ) -> Result<PageResult, TransportFailure> {
        let request = self
            .http_client
            .get(self.url("/discover/movie"))
            .query(&[("api_key", api_key)])
            .query(&Self::discover_params(query));

        let response: MovieResponse = self.execute(request).await?;
        Ok(Self::into_page(response))
    }

    async fn search(
        &self,
        api_key: &str,
        query: &str,
        page: u32,
    ) -> Result<PageResult, TransportFailure> {
        let request = self
            .http_client
            .get(self.url("/search/movie"))
            .query(&[("api_key", api_key), ("query", query)])
            .query(&[("page", page)]);

        let response: MovieResponse = self.execute(request).await?;
        Ok(Self::into_page(response))
    }

    async fn get_detail(&self, id: ItemId, api_key: &str) -> Result<Item, TransportFailure> {
        let request = self
            .http_client
            .get(self.url(&format!("/movie/{}", id)))
            .query(&[("api_key", api_key)]);

        self.execute(request).await
    }

    async fn create_token(&self, api_key: &str) -> Result<TokenResponse, TransportFailure> {
        let request = self
            .http_client
            .get(self.url("/authentication/token/new"))
            .query(&[("api_key", api_key)]);

        self.execute(request).await
    }

    async fn create_session(
        &self,
        api_key: &str,
        approved_token: &str,
    ) -> Result<SessionResponse, TransportFailure> {
        let request = self
            .http_client
            .post(self.url("/authentication/session/new"))
            .query(&[("api_key", api_key)])
            .json(&json!({ "request_token": approved_token }));

        self.execute(request).await
    }

    async fn create_list(
        &self,
        api_key: &str,
        session_id: &str,
        name: &str,
        description: &str,
    ) -> Result<CreateListResponse, TransportFailure> {
        let request = self
            .http_client
            .post(self.url("/list"))
            .query(&[("api_key", api_key), ("session_id", session_id)])
            .json(&json!({
                "name": name,
                "description": description,
                "language": self.config.language,
            }));

        self.execute(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{FilterOptions, SortOption};

    #[test]
    fn test_client_creation() {
        let client = TmdbClient::new(TmdbClientConfig::default()).unwrap();
        assert_eq!(client.base_url(), "https://api.themoviedb.org/3");
        assert_eq!(
            client.url("/discover/movie"),
            "https://api.themoviedb.org/3/discover/movie"
        );
    }

    #[test]
    fn test_trailing_slash_in_base_url() {
        let config = TmdbClientConfig {
            base_url: "http://localhost:8080/3/".to_string(),
            ..TmdbClientConfig::default()
        };
        let client = TmdbClient::new(config).unwrap();
        assert_eq!(client.url("/movie/7"), "http://localhost:8080/3/movie/7");
    }

    #[test]
    fn test_discover_params() {
        let filter = FilterOptions {
            genres: Some(vec![28, 878]),
            release_year: Some(2010),
            min_rating: Some(7.5),
        };
        let query = DiscoverQuery::new(3, SortOption::RatingDesc, &filter);

        let params = TmdbClient::discover_params(&query);

        assert_eq!(
            params,
            vec![
                ("page", "3".to_string()),
                ("sort_by", "vote_average.desc".to_string()),
                ("with_genres", "28,878".to_string()),
                ("primary_release_year", "2010".to_string()),
                ("vote_average.gte", "7.5".to_string()),
            ]
        );
    }

    #[test]
    fn test_discover_params_without_filters() {
        let query = DiscoverQuery::new(1, SortOption::default(), &FilterOptions::default());
        let params = TmdbClient::discover_params(&query);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_error_message_prefers_status_message() {
        let body = r#"{"status_code":7,"status_message":"Invalid API key: You must be granted a valid key.","success":false}"#;
        assert_eq!(
            TmdbClient::error_message(StatusCode::UNAUTHORIZED, body),
            "Invalid API key: You must be granted a valid key."
        );
    }

    #[test]
    fn test_error_message_falls_back_to_status() {
        assert_eq!(
            TmdbClient::error_message(StatusCode::BAD_GATEWAY, ""),
            "502 Bad Gateway"
        );
        assert_eq!(
            TmdbClient::error_message(StatusCode::FORBIDDEN, "<html>nope</html>"),
            "403 Forbidden: <html>nope</html>"
        );
    }

    #[test]
    fn test_movie_response_parsing() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 27205, "title": "Inception", "overview": "Cobb...", "poster_path": null, "vote_average": 8.4},
                {"id": 157336, "title": "Interstellar", "overview": "", "poster_path": "/gEU2Q.jpg", "vote_average": 8.5}
            ],
            "total_pages": 12,
            "total_results": 233
        }"#;

        let response: MovieResponse = serde_json::from_str(body).unwrap();
        let page = TmdbClient::into_page(response);

        assert_eq!(page.total_pages, 12);
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.items[1].title, "Interstellar");
        assert!(page.items.iter().all(|item| !item.is_favorite));
    }
}
