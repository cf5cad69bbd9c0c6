use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CheckError, Result};
use crate::types::{Assessment, ServiceInfo};

pub const DEFAULT_BASE_URL: &str = "https://api.ssllabs.com/api/v2";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The three operations the checker needs from the assessment service.
///
/// `SslLabsClient` talks HTTP; anything else (a scripted fake in tests) can stand in.
#[allow(async_fn_in_trait)]
pub trait AssessmentApi {
    /// `GET /info`
    async fn service_info(&self) -> Result<ServiceInfo>;

    /// `GET /analyze` with `startNew=on`.
    async fn start_assessment(&self, host: &str, publish: bool) -> Result<Assessment>;

    /// `GET /analyze` without `startNew`, returning the latest snapshot.
    async fn check_assessment(&self, host: &str) -> Result<Assessment>;
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// HTTP client for the SSL Labs v2 API. No retries happen here.
#[derive(Debug, Clone)]
pub struct SslLabsClient {
    base_url: String,
    http: reqwest::Client,
}

impl SslLabsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("ssllabs-check/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(CheckError::Transport)?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "sending request");
        let resp = self
            .http
            .get(&url)
            .query(query)
            .send()
            .await
            .map_err(CheckError::Transport)?;
        let status = resp.status();
        let body = resp.text().await.map_err(CheckError::Transport)?;
        if !status.is_success() {
            return Err(CheckError::UnexpectedStatus(describe_status(status, &body)));
        }
        Ok(serde_json::from_str(&body)?)
    }
}

impl AssessmentApi for SslLabsClient {
    async fn service_info(&self) -> Result<ServiceInfo> {
        self.get_json("/info", &[]).await
    }

    async fn start_assessment(&self, host: &str, publish: bool) -> Result<Assessment> {
        self.get_json("/analyze", &start_query(host, publish)).await
    }

    async fn check_assessment(&self, host: &str) -> Result<Assessment> {
        self.get_json("/analyze", &check_query(host)).await
    }
}

/// Query for a new assessment. `publish=on` is only sent when requested.
pub fn start_query(host: &str, publish: bool) -> Vec<(&'static str, &str)> {
    let mut query = vec![("host", host), ("all", "done"), ("startNew", "on")];
    if publish {
        query.push(("publish", "on"));
    }
    query
}

pub fn check_query(host: &str) -> Vec<(&'static str, &str)> {
    vec![("host", host), ("all", "done")]
}

#[derive(Deserialize)]
struct ApiErrors {
    #[serde(default)]
    errors: Vec<ApiErrorEntry>,
}

#[derive(Deserialize)]
struct ApiErrorEntry {
    #[serde(default)]
    field: Option<String>,
    #[serde(default)]
    message: String,
}

/// Status line, plus the service's `errors` messages when the body carries them.
fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
    let messages: Vec<String> = serde_json::from_str::<ApiErrors>(body)
        .map(|e| e.errors)
        .unwrap_or_default()
        .into_iter()
        .map(|e| match e.field {
            Some(field) if !field.is_empty() => format!("{field}: {}", e.message),
            _ => e.message,
        })
        .collect();
    if messages.is_empty() {
        status.to_string()
    } else {
        format!("{status} ({})", messages.join("; "))
    }
}
