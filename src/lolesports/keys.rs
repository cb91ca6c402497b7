//! API key discovery.
//!
//! Candidates come from three sources, in priority order: a key supplied via
//! configuration, a hardcoded historical fallback, and keys harvested from
//! the public schedule page.  The scrape is speculative (a regex over
//! third-party HTML) and sits behind [`KeySource`] so it can be replaced or
//! disabled without touching the fetch core.

use anyhow::{Context, Result};
use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info, warn};

use super::client::EgressClients;

/// Historical public key, kept as a fallback while it still works.
pub const FALLBACK_API_KEY: &str = "0TvQnueqKa5mxJntVWt0w4LpLfEkrV1Ta8rQBb9Z";

/// Keys always in the candidate list, after any configured key.
const DEFAULT_API_KEYS: &[&str] = &[FALLBACK_API_KEY];

/// How the schedule page embeds its key, e.g. `"x-api-key":"..."`.
const KEY_PATTERN: &str = r#""x-api-key"\s*:\s*"([A-Za-z0-9_-]{20,})""#;

/// A source of additional API key candidates.
#[async_trait]
pub trait KeySource: Send + Sync {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Return zero or more candidate keys, in the order they should be tried.
    async fn discover_keys(&self) -> Result<Vec<String>>;
}

/// Scrapes the public LoL Esports schedule page for embedded API keys.
pub struct SchedulePageSource {
    egress: EgressClients,
    url: String,
}

impl SchedulePageSource {
    pub fn new(egress: EgressClients, url: &str) -> Self {
        SchedulePageSource {
            egress,
            url: url.to_string(),
        }
    }
}

#[async_trait]
impl KeySource for SchedulePageSource {
    fn name(&self) -> &str {
        "schedule-page"
    }

    async fn discover_keys(&self) -> Result<Vec<String>> {
        let pattern = Regex::new(KEY_PATTERN).context("Invalid API key pattern")?;

        for mode in EgressClients::MODES {
            let resp = match self.egress.client_for(mode).get(&self.url).send().await {
                Ok(r) => r,
                Err(e) => {
                    debug!("Key discovery fetch failed in {} mode: {}", mode, e);
                    continue;
                }
            };
            if !resp.status().is_success() {
                debug!(
                    "Key discovery page returned {} in {} mode",
                    resp.status(),
                    mode
                );
                continue;
            }
            let html = match resp.text().await {
                Ok(t) => t,
                Err(e) => {
                    debug!("Key discovery body unreadable in {} mode: {}", mode, e);
                    continue;
                }
            };

            let found = extract_keys(&pattern, &html);
            if !found.is_empty() {
                return Ok(found);
            }
        }

        Ok(Vec::new())
    }
}

/// All pattern captures in page order, deduplicated.
fn extract_keys(pattern: &Regex, html: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in pattern.captures_iter(html) {
        if let Some(m) = caps.get(1) {
            if !keys.iter().any(|k| k == m.as_str()) {
                keys.push(m.as_str().to_string());
            }
        }
    }
    keys
}

/// Assemble the ordered, deduplicated candidate key list.
///
/// A configured key comes first, then the built-in fallbacks, then whatever
/// the sources turn up.  Source failures are swallowed; only an empty final
/// list is fatal.  Runs once per invocation.
pub async fn discover_api_keys(
    configured: Option<&str>,
    sources: &[Box<dyn KeySource>],
) -> Result<Vec<String>> {
    collect_candidates(configured, DEFAULT_API_KEYS, sources).await
}

async fn collect_candidates(
    configured: Option<&str>,
    defaults: &[&str],
    sources: &[Box<dyn KeySource>],
) -> Result<Vec<String>> {
    let mut candidates: Vec<String> = Vec::new();

    if let Some(key) = configured {
        push_unique(&mut candidates, key.trim());
    }
    for key in defaults {
        push_unique(&mut candidates, key);
    }

    for source in sources {
        match source.discover_keys().await {
            Ok(found) => {
                if !found.is_empty() {
                    info!(
                        "{} potential API key(s) found via {}",
                        found.len(),
                        source.name()
                    );
                }
                for key in found {
                    push_unique(&mut candidates, &key);
                }
            }
            Err(e) => warn!("Key source {} failed: {}", source.name(), e),
        }
    }

    if candidates.is_empty() {
        anyhow::bail!("No API key available. Set LFL_API_KEY in the environment.");
    }
    Ok(candidates)
}

fn push_unique(candidates: &mut Vec<String>, key: &str) {
    if !key.is_empty() && !candidates.iter().any(|k| k == key) {
        candidates.push(key.to_string());
    }
}
