use anyhow::Result;
use clap::Parser;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, warn};

mod config;
mod lolesports;
mod models;
mod snapshot;
mod teams;

use config::Config;
use lolesports::{
    discover_api_keys, fetch_matches, fetch_standings, EgressClients, EsportsClient, KeySource,
    SchedulePageSource,
};
use models::Snapshot;
use snapshot::WritePlan;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    info!("LFL tracker starting (league {})", config.league_id);

    let egress = EgressClients::build(Duration::from_secs(config.request_timeout_secs))?;

    // Credential discovery runs once per invocation; no candidates at all is
    // fatal before any fetch is attempted.
    let mut key_sources: Vec<Box<dyn KeySource>> = Vec::new();
    if config.no_key_discovery {
        info!("Key discovery disabled, using configured and fallback keys only");
    } else {
        key_sources.push(Box::new(SchedulePageSource::new(
            egress.clone(),
            &config.discovery_url,
        )));
    }
    let api_keys = discover_api_keys(config.api_key.as_deref(), &key_sources).await?;
    debug!("{} candidate API key(s)", api_keys.len());

    let client = EsportsClient::new(&config, egress, api_keys)?;

    let output = Path::new(&config.output);
    let existing = snapshot::load_existing(output);

    // Schedule then standings, strictly sequential, bounded by one deadline.
    // Worst case of the retry search is keys × modes × attempts × timeout,
    // so the deadline caps the run instead of letting it compound.
    let deadline = Duration::from_secs(config.deadline_secs);
    let fetched = tokio::time::timeout(deadline, async {
        let matches = fetch_matches(&client, &config).await;
        let standings = fetch_standings(&client, &config).await;
        (matches, standings)
    })
    .await;
    let (matches, standings) = match fetched {
        Ok(pair) => pair,
        Err(_) => {
            warn!("Fetch phase exceeded the {}s deadline", config.deadline_secs);
            (None, None)
        }
    };

    match snapshot::reconcile(matches, standings, existing, chrono::Utc::now()) {
        WritePlan::KeepExisting => {
            anyhow::bail!("API unavailable and no usable fresh data: existing snapshot preserved");
        }
        WritePlan::Write(snap) => {
            snapshot::save(&snap, output)?;
            report(&snap);
            if snap.matches.is_empty() && snap.standings.is_empty() {
                anyhow::bail!(
                    "Snapshot written but holds no data; check whether the league is active"
                );
            }
        }
    }

    Ok(())
}

/// Post-run summary: what was written and where each category came from.
fn report(snap: &Snapshot) {
    info!("Snapshot written, last update {}", snap.last_update);
    info!(
        "{} match(es) [{:?}], {} standing(s) [{:?}]",
        snap.matches.len(),
        snap.scrape_status.matches_source,
        snap.standings.len(),
        snap.scrape_status.standings_source
    );
    if let Some(m) = snap.matches.first() {
        debug!(
            "First match: {} {}-{} {} | {} ({:?})",
            m.team1.name, m.team1.score, m.team2.score, m.team2.name, m.date, m.status
        );
    }
    for s in snap.standings.iter().take(3) {
        debug!(
            "{}. {} - {}W {}L ({} pts)",
            s.rank, s.team, s.wins, s.losses, s.points
        );
    }
}
