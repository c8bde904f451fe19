use crate::config::toml_config::SearchConfig;
use crate::core::{PostRecord, PostSearch, Result, SearchQuery};
use crate::utils::error::EtlError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// The v2 search endpoints reject `max_results` below this.
pub const MIN_PAGE_SIZE: usize = 10;

const TWEET_FIELDS: &str = "author_id,created_at";

/// X (Twitter) API v2 recent/full-archive search.
pub struct TwitterSearchClient {
    client: Client,
    endpoint: String,
    bearer_token: String,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Option<Vec<TweetPayload>>,
    meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
struct TweetPayload {
    id: String,
    text: String,
    author_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct SearchMeta {
    result_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ProblemResponse {
    title: Option<String>,
    detail: Option<String>,
}

impl From<TweetPayload> for PostRecord {
    fn from(tweet: TweetPayload) -> Self {
        Self {
            id: tweet.id,
            text: tweet.text,
            author_id: tweet.author_id,
            created_at: tweet.created_at,
        }
    }
}

impl TwitterSearchClient {
    pub fn new(
        endpoint: impl Into<String>,
        bearer_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            bearer_token: bearer_token.into(),
        })
    }

    /// 未設定 token 時仍建立 client，交由服務端回傳 401
    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        Self::new(
            config.endpoint.clone(),
            config.bearer_token.clone().unwrap_or_default(),
            Duration::from_secs(config.timeout_seconds),
        )
    }
}

#[async_trait]
impl PostSearch for TwitterSearchClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<PostRecord>> {
        let page_size = query.max_results.max(MIN_PAGE_SIZE).to_string();
        let start_time = query.window.start_param();
        let end_time = query.window.end_param();

        tracing::debug!("Making search request to: {}", self.endpoint);
        let response = self
            .client
            .get(&self.endpoint)
            .bearer_auth(&self.bearer_token)
            .query(&[
                ("query", query.keyword.as_str()),
                ("start_time", start_time.as_str()),
                ("end_time", end_time.as_str()),
                ("max_results", page_size.as_str()),
                ("tweet.fields", TWEET_FIELDS),
            ])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Search response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<ProblemResponse>(&body) {
                Ok(ProblemResponse {
                    title: Some(title),
                    detail: Some(detail),
                }) => format!("{}: {}", title, detail),
                Ok(ProblemResponse {
                    title: Some(title), ..
                }) => title,
                Ok(ProblemResponse {
                    detail: Some(detail),
                    ..
                }) => detail,
                _ => body,
            };
            return Err(EtlError::SearchServiceError {
                status: status.as_u16(),
                message,
            });
        }

        let payload: SearchResponse = response.json().await?;
        if let Some(count) = payload.meta.as_ref().and_then(|m| m.result_count) {
            tracing::debug!("Search service reported {} results", count);
        }

        Ok(payload
            .data
            .unwrap_or_default()
            .into_iter()
            .map(PostRecord::from)
            .collect())
    }

    fn name(&self) -> &'static str {
        "twitter-v2"
    }
}
