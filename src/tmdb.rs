use std::{num::NonZeroU32, sync::Arc};

use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, NotKeyed},
};
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// Movie database the catalog pulls titles from.
pub trait MovieLookup: Send + Sync {
    fn search(&self, query: &str) -> impl Future<Output = AppResult<Vec<SearchResult>>> + Send;

    fn details(&self, tmdb_id: i32) -> impl Future<Output = AppResult<MovieDetails>> + Send;
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct SearchResult {
    pub id: i32,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub original_title: String,
    #[serde(default)]
    pub release_date: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct MovieDetails {
    pub id: i32,
    pub original_title: String,
    #[serde(default)]
    pub overview: String,
    pub poster_path: Option<String>,
}

pub struct TmdbClient {
    client: reqwest::Client,
    access_token: String,
    base_url: String,
    limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl TmdbClient {
    pub fn new(client: reqwest::Client, access_token: String, base_url: String, rps: u32) -> Self {
        if access_token.trim().is_empty() {
            tracing::warn!("Using mock TMDB data - no TMDB_ACCESS_TOKEN provided");
        }

        let rps = NonZeroU32::new(rps).unwrap_or(NonZeroU32::MIN);
        let limiter = Arc::new(RateLimiter::direct(Quota::per_second(rps)));
        Self { client, access_token, base_url, limiter }
    }

    fn is_mock(&self) -> bool {
        self.access_token.trim().is_empty()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
    ) -> AppResult<T> {
        self.limiter.until_ready().await;
        let resp = req
            .bearer_auth(&self.access_token)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?
            .error_for_status()?;
        Ok(resp.json().await?)
    }
}

impl MovieLookup for TmdbClient {
    async fn search(&self, query: &str) -> AppResult<Vec<SearchResult>> {
        if self.is_mock() {
            return Ok(mock_search(query));
        }

        tracing::debug!(query, "searching TMDB");
        let req = self.client.get(self.url("search/movie")).query(&[("query", query)]);
        let resp: SearchResponse = self.get_json(req).await?;
        tracing::debug!(query, results = resp.results.len(), "TMDB search done");
        Ok(resp.results)
    }

    async fn details(&self, tmdb_id: i32) -> AppResult<MovieDetails> {
        if self.is_mock() {
            return mock_details(tmdb_id);
        }

        tracing::debug!(tmdb_id, "fetching TMDB movie details");
        let req = self.client.get(self.url(&format!("movie/{tmdb_id}")));
        self.get_json(req).await
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

const MOCK_MOVIES: &[(i32, &str, &str, &str, &str)] = &[
    (
        550,
        "Fight Club",
        "1999-10-15",
        "A ticking-time-bomb insomniac and a slippery soap salesman channel primal male aggression into a shocking new form of therapy.",
        "/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg",
    ),
    (
        603,
        "The Matrix",
        "1999-03-30",
        "Set in the 22nd century, The Matrix tells the story of a computer hacker who joins a group of underground insurgents fighting the vast and powerful computers who now rule the earth.",
        "/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg",
    ),
    (
        13,
        "Forrest Gump",
        "1994-06-23",
        "A man with a low IQ has accomplished great things in his life and been present during significant historic events.",
        "/arw2vcBveWOVZr6pxd9XTd1TdQa.jpg",
    ),
];

fn mock_search(query: &str) -> Vec<SearchResult> {
    let needle = query.trim().to_lowercase();
    MOCK_MOVIES
        .iter()
        .filter(|(_, title, ..)| needle.is_empty() || title.to_lowercase().contains(&needle))
        .map(|&(id, title, release_date, overview, poster_path)| SearchResult {
            id,
            title: title.to_string(),
            original_title: title.to_string(),
            release_date: release_date.to_string(),
            overview: overview.to_string(),
            poster_path: Some(poster_path.to_string()),
        })
        .collect()
}

fn mock_details(tmdb_id: i32) -> AppResult<MovieDetails> {
    MOCK_MOVIES
        .iter()
        .find(|(id, ..)| *id == tmdb_id)
        .map(|&(id, title, _, overview, poster_path)| MovieDetails {
            id,
            original_title: title.to_string(),
            overview: overview.to_string(),
            poster_path: Some(poster_path.to_string()),
        })
        .ok_or_else(|| AppError::External(anyhow::anyhow!("mock TMDB has no movie {tmdb_id}")))
}
