//! Standings extraction: raw `getStandings` payload → deduplicated table.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::EsportsClient;
use crate::config::Config;
use crate::models::Standing;
use crate::teams;

/// League points awarded per series win; the source never carries points.
const POINTS_PER_WIN: u32 = 3;

/// Fetch and normalize the standings.
///
/// Same tri-state contract as the schedule: `None` is a failed fetch,
/// `Some(vec![])` a legitimately empty table.
pub async fn fetch_standings(client: &EsportsClient, config: &Config) -> Option<Vec<Standing>> {
    info!("Fetching standings...");
    let params = [
        ("hl", config.locale.as_str()),
        ("leagueId", config.league_id.as_str()),
    ];
    match client.fetch_json("getStandings", &params).await {
        Ok(raw) => {
            let standings = extract_standings(&raw);
            info!("{} team(s) in standings", standings.len());
            Some(standings)
        }
        Err(e) => {
            warn!("Standings fetch failed: {e:#}");
            None
        }
    }
}

/// Flatten every stage and section into one ranking list, then normalize.
///
/// The API repeats rankings across overlapping sections; the first
/// occurrence of a (rank, team) pair wins and later duplicates are dropped.
/// Malformed entries are skipped individually.
pub fn extract_standings(raw: &Value) -> Vec<Standing> {
    let stages = match raw["data"]["standings"].as_array() {
        Some(a) => a,
        None => {
            warn!("No standings in payload");
            return Vec::new();
        }
    };

    let rankings: Vec<&Value> = stages
        .iter()
        .flat_map(|standing| standing["stages"].as_array().into_iter().flatten())
        .flat_map(|stage| stage["sections"].as_array().into_iter().flatten())
        .flat_map(|section| section["rankings"].as_array().into_iter().flatten())
        .collect();
    debug!("API returned {} ranking entries", rankings.len());

    let mut seen: HashSet<(u32, String)> = HashSet::new();
    let mut standings = Vec::new();
    for entry in rankings {
        let Some(standing) = parse_ranking(entry) else {
            continue;
        };
        if !seen.insert((standing.rank, standing.team.clone())) {
            continue;
        }
        debug!(
            "{}. {} - {}W {}L",
            standing.rank, standing.team, standing.wins, standing.losses
        );
        standings.push(standing);
    }
    standings
}

fn parse_ranking(entry: &Value) -> Option<Standing> {
    let team = entry["teams"].as_array()?.first()?["name"]
        .as_str()
        .unwrap_or("Unknown")
        .to_string();
    let wins = entry["wins"].as_u64().unwrap_or(0) as u32;
    let losses = entry["losses"].as_u64().unwrap_or(0) as u32;
    let rank = entry["ordinal"].as_u64().unwrap_or(0) as u32;
    let short = teams::short_code(&team);

    Some(Standing {
        rank,
        team,
        short,
        wins,
        losses,
        points: wins * POINTS_PER_WIN,
    })
}
