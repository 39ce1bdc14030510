//! Keyword research client for the DataForSEO Google Ads endpoints
//!
//! Optional enrichment: analysis works without it and the orchestrator
//! only constructs this client when both credentials are configured.

use crate::error::{Result, SeoscopeError};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_BASE_URL: &str = "https://api.dataforseo.com";

/// United States
const LOCATION_CODE: u32 = 2840;
const LANGUAGE_CODE: &str = "en";

/// Maximum number of suggestions returned to the caller
const SUGGESTION_LIMIT: usize = 20;

/// Search volume data for a single keyword
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordVolume {
    pub keyword: String,
    pub search_volume: u64,
    pub competition: String,
}

/// Client for the keywords-data live endpoints
pub struct KeywordClient {
    client: Client,
    login: String,
    password: String,
    base_url: String,
}

impl KeywordClient {
    /// Create a client with basic-auth credentials
    pub fn new(login: &str, password: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| SeoscopeError::KeywordError(format!("Client init failed: {e}")))?;

        Ok(Self {
            client,
            login: login.to_string(),
            password: password.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Point the client at a different API base URL
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    /// Related keyword suggestions for a seed keyword
    pub async fn suggestions(&self, keyword: &str) -> Result<Vec<String>> {
        info!("Fetching keyword suggestions for: {}", keyword);

        let reply: ApiReply<SuggestionResult> = self
            .post(
                "/v3/keywords_data/google_ads/keywords_for_keywords/live",
                keyword,
            )
            .await?;

        let suggestions: Vec<String> = reply
            .first_result()
            .map(|result| {
                result
                    .keyword_data
                    .iter()
                    .map(|item| item.keyword.clone())
                    .filter(|kw| !kw.is_empty())
                    .take(SUGGESTION_LIMIT)
                    .collect()
            })
            .unwrap_or_default();

        debug!("Received {} keyword suggestions", suggestions.len());
        Ok(suggestions)
    }

    /// Search volume and competition for a keyword
    pub async fn search_volume(&self, keyword: &str) -> Result<Vec<KeywordVolume>> {
        info!("Fetching search volume for: {}", keyword);

        let reply: ApiReply<VolumeEntry> =
            self.post("/v3/keywords_data/google_ads/search_volume/live", keyword)
                .await?;

        let volumes = reply
            .first_task()
            .map(|task| {
                task.result
                    .iter()
                    .map(|entry| KeywordVolume {
                        keyword: entry.keyword.clone(),
                        search_volume: entry.search_volume,
                        competition: if entry.competition.is_empty() {
                            "unknown".to_string()
                        } else {
                            entry.competition.clone()
                        },
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(volumes)
    }

    async fn post<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        keyword: &str,
    ) -> Result<ApiReply<T>> {
        let body = json!([{
            "keywords": [keyword],
            "language_code": LANGUAGE_CODE,
            "location_code": LOCATION_CODE,
        }]);

        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .basic_auth(&self.login, Some(&self.password))
            .json(&body)
            .send()
            .await
            .map_err(|e| SeoscopeError::KeywordError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SeoscopeError::KeywordError(format!(
                "Keyword API error: {status}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| SeoscopeError::KeywordError(format!("Malformed keyword reply: {e}")))
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ApiReply<T> {
    #[serde(default)]
    tasks: Vec<Task<T>>,
}

impl<T> ApiReply<T> {
    fn first_task(&self) -> Option<&Task<T>> {
        self.tasks.first()
    }

    fn first_result(&self) -> Option<&T> {
        self.first_task().and_then(|task| task.result.first())
    }
}

#[derive(Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct Task<T> {
    #[serde(default)]
    result: Vec<T>,
}

#[derive(Deserialize)]
struct SuggestionResult {
    #[serde(default)]
    keyword_data: Vec<SuggestionEntry>,
}

#[derive(Deserialize)]
struct SuggestionEntry {
    #[serde(default)]
    keyword: String,
}

#[derive(Deserialize)]
struct VolumeEntry {
    #[serde(default)]
    keyword: String,
    #[serde(default)]
    search_volume: u64,
    #[serde(default)]
    competition: String,
}
