//! Stop directory API client.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::error::StopError;
use super::table::StopRecord;
use crate::domain::{BoundingBox, StopCode};

/// Default base URL for the stop directory API.
const DEFAULT_BASE_URL: &str = "https://smartcambridge.org/api/v1";

/// One page of a stop listing.
#[derive(Debug, Deserialize)]
struct StopPage {
    results: Vec<StopRecord>,
    next: Option<String>,
}

/// Configuration for the stop directory client.
#[derive(Debug, Clone)]
pub struct StopClientConfig {
    /// Token sent as `Authorization: Token <token>`
    pub api_token: String,
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Stops requested per page of an area listing
    pub page_size: u32,
}

impl StopClientConfig {
    /// Create a new config with the given API token.
    pub fn new(api_token: impl Into<String>) -> Self {
        Self {
            api_token: api_token.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            page_size: 500,
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Client for the stop directory API.
#[derive(Debug, Clone)]
pub struct StopClient {
    http: reqwest::Client,
    base_url: String,
    page_size: u32,
}

impl StopClient {
    pub fn new(config: StopClientConfig) -> Result<Self, StopError> {
        let mut headers = HeaderMap::new();

        let token = HeaderValue::from_str(&format!("Token {}", config.api_token)).map_err(|_| {
            StopError::Api {
                status: 0,
                message: "Invalid API token format".to_string(),
            }
        })?;
        headers.insert(AUTHORIZATION, token);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout())
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url,
            page_size: config.page_size,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch every stop inside `bbox`, following pagination.
    pub async fn fetch_area(&self, bbox: &BoundingBox) -> Result<Vec<StopRecord>, StopError> {
        let mut stops = Vec::new();
        let mut page = 1;

        loop {
            debug!(bounding_box = %bbox, page, "Fetching stops page");
            let url = self.area_url(bbox, page);
            let Some(response) = self.get_json::<StopPage>(&url).await? else {
                return Err(StopError::Api {
                    status: StatusCode::NOT_FOUND.as_u16(),
                    message: format!("stop listing not found at {url}"),
                });
            };

            stops.extend(response.results);
            if response.next.is_none() {
                break;
            }
            page += 1;
        }

        Ok(stops)
    }

    /// Fetch one stop by code. Returns `Ok(None)` when the directory does
    /// not know the code.
    pub async fn fetch_stop(&self, code: &StopCode) -> Result<Option<StopRecord>, StopError> {
        debug!(stop = %code, "Fetching stop");
        self.get_json(&self.stop_url(code)).await
    }

    fn area_url(&self, bbox: &BoundingBox, page: u32) -> String {
        format!(
            "{}/transport/stops/?bounding_box={}&page_size={}&page={}",
            self.base_url, bbox, self.page_size, page
        )
    }

    fn stop_url(&self, code: &StopCode) -> String {
        format!("{}/transport/stop/{}/", self.base_url, code)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<Option<T>, StopError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(StopError::Unauthorized);
        }
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StopError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| StopError::Json {
                message: e.to_string(),
            })
    }
}
