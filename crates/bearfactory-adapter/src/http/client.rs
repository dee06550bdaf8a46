/*
[INPUT]:  HTTP configuration (base URLs, timeouts, API keys)
[OUTPUT]: Configured reqwest client ready for API calls
[POS]:    HTTP layer - core client implementation
[UPDATE]: When adding connection options or changing client behavior
[UPDATE]: 2026-08-21 Split generation and leaderboard base URLs
[UPDATE]: 2026-10-18 Keep base URL path prefixes when joining endpoints
*/

use crate::http::{FactoryError, Result};
use reqwest::header::{AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// Base URL for the Gemini generative language API
pub const GENERATION_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Model used when none is configured
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub timeout: Duration,
    pub connect_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

/// Keys for the two remote services
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub gemini_api_key: Option<String>,
    pub supabase_anon_key: Option<String>,
}

/// HTTP client for task generation and the high score table
#[derive(Debug)]
pub struct FactoryClient {
    http_client: Client,
    generation_base_url: Url,
    leaderboard_base_url: Option<Url>,
    model: String,
    credentials: Credentials,
    timeout: Duration,
}

impl FactoryClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_config_and_base_urls(config, GENERATION_BASE_URL, None)
    }

    /// Create a client pointing at explicit base URLs.
    ///
    /// The leaderboard URL is the Supabase project URL; without it the
    /// leaderboard endpoints return [`FactoryError::Config`]. Both URLs may
    /// carry a path prefix, which every endpoint is resolved under.
    pub fn with_config_and_base_urls(
        config: ClientConfig,
        generation_base_url: &str,
        leaderboard_base_url: Option<&str>,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()?;

        let leaderboard_base_url = leaderboard_base_url.map(parse_base_url).transpose()?;

        Ok(Self {
            http_client,
            generation_base_url: parse_base_url(generation_base_url)?,
            leaderboard_base_url,
            model: DEFAULT_MODEL.to_string(),
            credentials: Credentials::default(),
            timeout: config.timeout,
        })
    }

    /// Set credentials for authenticated requests
    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.credentials = credentials;
    }

    /// Get credentials
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    pub fn set_model(&mut self, model: impl Into<String>) {
        self.model = model.into();
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Whether both the leaderboard URL and its key are present
    pub fn has_leaderboard(&self) -> bool {
        self.leaderboard_base_url.is_some() && self.credentials.supabase_anon_key.is_some()
    }

    /// Build request builder for generation endpoints, keyed by query parameter
    pub(crate) fn generation_request(
        &self,
        method: Method,
        endpoint: &str,
    ) -> Result<RequestBuilder> {
        let api_key = self
            .credentials
            .gemini_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FactoryError::Config("missing Gemini API key".to_string()))?;
        let url = self.generation_base_url.join(endpoint)?;
        Ok(self
            .http_client
            .request(method, url)
            .query(&[("key", api_key)]))
    }

    /// Build request builder for PostgREST endpoints with Supabase auth headers
    pub(crate) fn leaderboard_request(
        &self,
        method: Method,
        endpoint: &str,
    ) -> Result<RequestBuilder> {
        let base = self
            .leaderboard_base_url
            .as_ref()
            .ok_or_else(|| FactoryError::Config("missing leaderboard URL".to_string()))?;
        let anon_key = self
            .credentials
            .supabase_anon_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| FactoryError::Config("missing leaderboard anon key".to_string()))?;
        let url = base.join(endpoint)?;
        Ok(self
            .http_client
            .request(method, url)
            .header("apikey", anon_key)
            .header(AUTHORIZATION, format!("Bearer {anon_key}")))
    }

    /// Send a request and decode a JSON body, mapping HTTP failures to [`FactoryError`]
    pub(crate) async fn send_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = builder.send().await.map_err(|err| self.map_send_error(err))?;
        let response = Self::check_status(response).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    fn map_send_error(&self, err: reqwest::Error) -> FactoryError {
        if err.is_timeout() {
            FactoryError::Timeout {
                duration: self.timeout.as_secs(),
            }
        } else {
            FactoryError::Http(err)
        }
    }

    async fn check_status(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse().ok())
                .unwrap_or(1);
            return Err(FactoryError::RateLimit { retry_after });
        }

        let message = response.text().await.unwrap_or_default();
        tracing::debug!(status = %status, "remote returned error status");
        Err(FactoryError::api_error(status, message))
    }
}

/// Parse a base URL, ending its path with `/` so relative endpoints
/// (`v1beta/...`, `rest/v1/...`) join under any path prefix.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}
