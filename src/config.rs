use clap::Parser;

/// LFL schedule & standings tracker
#[derive(Parser, Debug, Clone)]
#[command(name = "lfl-tracker", version, about)]
pub struct Config {
    /// LoL Esports API key (tried before the built-in fallbacks)
    #[arg(long, env = "LFL_API_KEY")]
    pub api_key: Option<String>,

    /// League ID to track (defaults to the LFL)
    #[arg(long, env = "LFL_LEAGUE_ID", default_value = "105266103462388553")]
    pub league_id: String,

    /// Locale passed to the API (`hl` query parameter)
    #[arg(long, env = "LFL_LOCALE", default_value = "fr-FR")]
    pub locale: String,

    /// LoL Esports API base URL
    #[arg(
        long,
        env = "LFL_API_URL",
        default_value = "https://esports-api.lolesports.com/persisted/gw"
    )]
    pub api_url: String,

    /// Public page scraped for embedded API keys
    #[arg(
        long,
        env = "LFL_DISCOVERY_URL",
        default_value = "https://lolesports.com/fr-FR/schedule"
    )]
    pub discovery_url: String,

    /// Skip scraping the public page for extra API keys
    #[arg(long, env = "LFL_NO_KEY_DISCOVERY", default_value = "false")]
    pub no_key_discovery: bool,

    /// Path of the persisted JSON snapshot
    #[arg(long, env = "LFL_OUTPUT", default_value = "lfl-data.json")]
    pub output: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "LFL_REQUEST_TIMEOUT_SECS", default_value = "20")]
    pub request_timeout_secs: u64,

    /// Retry attempts per API key and egress mode
    #[arg(long, env = "LFL_RETRY_ATTEMPTS", default_value = "3")]
    pub retry_attempts: u32,

    /// Overall deadline for the fetch phase in seconds
    #[arg(long, env = "LFL_DEADLINE_SECS", default_value = "300")]
    pub deadline_secs: u64,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.request_timeout_secs == 0 {
            anyhow::bail!("request_timeout_secs must be at least 1");
        }
        if self.retry_attempts == 0 {
            anyhow::bail!("retry_attempts must be at least 1");
        }
        if self.deadline_secs == 0 {
            anyhow::bail!("deadline_secs must be at least 1");
        }
        if self.output.trim().is_empty() {
            anyhow::bail!("output path must not be empty");
        }
        Ok(())
    }
}
