use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

use crate::config::Config;

/// User-Agent carried over from earlier tracker deployments.
const USER_AGENT: &str = "Mozilla/5.0 (compatible; LFLTrackerBot/2.2)";

/// Linear backoff unit: the wait before attempt N is `RETRY_DELAY × (N-1)`.
const RETRY_DELAY: Duration = Duration::from_millis(1500);

/// Network egress path used for a request.
///
/// Some runner proxies intermittently reject requests that succeed when the
/// proxy is bypassed, so both paths are tried as an independent retry
/// dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EgressMode {
    /// Respect ambient proxy configuration (reqwest default)
    ProxyEnv,
    /// Bypass proxies entirely
    Direct,
}

impl EgressMode {
    pub fn label(&self) -> &'static str {
        match self {
            EgressMode::ProxyEnv => "proxy-env",
            EgressMode::Direct => "direct",
        }
    }
}

impl std::fmt::Display for EgressMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One pre-built HTTP client per egress mode.
#[derive(Clone)]
pub struct EgressClients {
    proxy_env: Client,
    direct: Client,
}

impl EgressClients {
    /// Trial order of the egress modes.
    pub const MODES: [EgressMode; 2] = [EgressMode::ProxyEnv, EgressMode::Direct];

    pub fn build(timeout: Duration) -> Result<Self> {
        let proxy_env = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build proxy-env HTTP client")?;
        let direct = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .no_proxy()
            .build()
            .context("Failed to build direct HTTP client")?;
        Ok(EgressClients { proxy_env, direct })
    }

    pub fn client_for(&self, mode: EgressMode) -> &Client {
        match mode {
            EgressMode::ProxyEnv => &self.proxy_env,
            EgressMode::Direct => &self.direct,
        }
    }
}

/// Transient failure classes; every variant is retried by the fetch loop.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("network error: {0}")]
    Network(reqwest::Error),
    #[error("malformed response body: {0}")]
    Decode(reqwest::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            FetchError::Timeout
        } else if err.is_decode() {
            FetchError::Decode(err)
        } else {
            FetchError::Network(err)
        }
    }
}

/// Client for the LoL Esports persisted-gw API.
///
/// Every candidate API key is tried over every egress mode with bounded
/// retries; the first success short-circuits the whole search.
pub struct EsportsClient {
    egress: EgressClients,
    api_keys: Vec<String>,
    base_url: Url,
    retry_attempts: u32,
    retry_delay: Duration,
}

impl EsportsClient {
    pub fn new(config: &Config, egress: EgressClients, api_keys: Vec<String>) -> Result<Self> {
        let base_url = Url::parse(&config.api_url)
            .with_context(|| format!("Invalid API base URL: {}", config.api_url))?;
        Ok(EsportsClient {
            egress,
            api_keys,
            base_url,
            retry_attempts: config.retry_attempts,
            retry_delay: RETRY_DELAY,
        })
    }

    /// GET an API endpoint and parse the body as JSON.
    ///
    /// Runs the key × mode × attempt search; only total exhaustion fails,
    /// wrapping the last observed error.
    pub async fn fetch_json(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<serde_json::Value> {
        let url = self.endpoint_url(endpoint, params)?;
        let op = |key_idx: usize, mode: EgressMode, _attempt: u32| {
            let client = self.egress.client_for(mode).clone();
            let url = url.clone();
            let api_key = self.api_keys[key_idx].clone();
            async move { fetch_once(&client, url, &api_key).await }
        };
        retry_search(
            &self.api_keys,
            &EgressClients::MODES,
            self.retry_attempts,
            self.retry_delay,
            op,
        )
        .await
    }

    fn endpoint_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| anyhow!("API base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .push(endpoint);
        url.query_pairs_mut().extend_pairs(params);
        Ok(url)
    }
}

async fn fetch_once(
    client: &Client,
    url: Url,
    api_key: &str,
) -> Result<serde_json::Value, FetchError> {
    let resp = client
        .get(url)
        .header("x-api-key", api_key)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(FetchError::Status(status));
    }
    Ok(resp.json::<serde_json::Value>().await?)
}

/// Sequential search over the key × egress-mode × attempt cross-product:
/// keys outer, modes middle, attempts inner, linear backoff between attempts.
///
/// The operation is injected so tests can script failure sequences without a
/// network.
async fn retry_search<T, F, Fut>(
    api_keys: &[String],
    modes: &[EgressMode],
    attempts: u32,
    delay: Duration,
    mut op: F,
) -> Result<T>
where
    F: FnMut(usize, EgressMode, u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    let mut last_error: Option<FetchError> = None;

    for (key_idx, api_key) in api_keys.iter().enumerate() {
        let hint = key_hint(api_key);
        for &mode in modes {
            for attempt in 1..=attempts {
                match op(key_idx, mode, attempt).await {
                    Ok(value) => {
                        if attempt > 1 {
                            info!("Request OK in {} mode (attempt {})", mode, attempt);
                        }
                        info!("API key accepted: {}", hint);
                        return Ok(value);
                    }
                    Err(err) => {
                        warn!(
                            "Key {} | {} attempt {}/{} failed: {}",
                            hint, mode, attempt, attempts, err
                        );
                        last_error = Some(err);
                        if attempt < attempts {
                            tokio::time::sleep(delay * attempt).await;
                        }
                    }
                }
            }
        }
    }

    let cause = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "no request was attempted".to_string());
    Err(anyhow!(
        "API unreachable after exhausting every key, egress mode and retry: {}",
        cause
    ))
}

/// Loggable tail of an API key; the key itself never reaches the logs.
fn key_hint(api_key: &str) -> String {
    let chars: Vec<char> = api_key.chars().collect();
    if chars.len() > 6 {
        format!("...{}", chars[chars.len() - 6..].iter().collect::<String>())
    } else {
        "(short)".to_string()
    }
}
