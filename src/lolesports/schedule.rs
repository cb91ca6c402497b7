//! Schedule extraction: raw `getSchedule` payload → normalized match list.

use chrono::DateTime;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::client::EsportsClient;
use crate::config::Config;
use crate::models::{Match, MatchStatus, TeamRef};
use crate::teams;

/// Events beyond this many are ignored; downstream only displays one page.
const MAX_EVENTS: usize = 15;

/// Display format for match start times ("05 Aug - 17:00").
const DATE_FORMAT: &str = "%d %b - %H:%M";

/// Placeholder for a missing team name or unparsable start time.
const UNKNOWN: &str = "TBD";

/// Fetch and normalize the schedule.
///
/// `None` means the fetch itself failed; `Some(vec![])` is a legitimately
/// empty schedule.  The distinction drives the snapshot cache fallback.
pub async fn fetch_matches(client: &EsportsClient, config: &Config) -> Option<Vec<Match>> {
    info!("Fetching matches...");
    let params = [
        ("hl", config.locale.as_str()),
        ("leagueId", config.league_id.as_str()),
    ];
    match client.fetch_json("getSchedule", &params).await {
        Ok(raw) => {
            let matches = extract_matches(&raw);
            info!("{} valid match(es) extracted", matches.len());
            Some(matches)
        }
        Err(e) => {
            warn!("Schedule fetch failed: {e:#}");
            None
        }
    }
}

/// Normalize the raw schedule payload, preserving source order and keeping
/// only the first [`MAX_EVENTS`] events.  Malformed events are skipped
/// individually; upstream data is not under our control.
pub fn extract_matches(raw: &Value) -> Vec<Match> {
    let events = match raw["data"]["schedule"]["events"].as_array() {
        Some(a) => a,
        None => {
            warn!("No events in schedule payload");
            return Vec::new();
        }
    };
    debug!("API returned {} event(s)", events.len());

    events.iter().take(MAX_EVENTS).filter_map(parse_event).collect()
}

fn parse_event(event: &Value) -> Option<Match> {
    let match_obj = event.get("match")?;
    let teams = match_obj["teams"].as_array()?;
    if teams.len() < 2 {
        return None;
    }

    let status = match event["state"].as_str().unwrap_or("unstarted") {
        "completed" => MatchStatus::Finished,
        "inProgress" => MatchStatus::Live,
        _ => MatchStatus::Scheduled,
    };

    let start_time = event["startTime"].as_str().unwrap_or_default().to_string();
    let date = format_start_time(&start_time);

    let parsed = Match {
        team1: parse_team(&teams[0]),
        team2: parse_team(&teams[1]),
        start_time: start_time.clone(),
        date_iso: start_time,
        date,
        status,
    };
    debug!(
        "{} vs {} ({:?})",
        parsed.team1.name, parsed.team2.name, parsed.status
    );
    Some(parsed)
}

fn parse_team(team: &Value) -> TeamRef {
    let name = team["name"].as_str().unwrap_or(UNKNOWN).to_string();
    let score = team["result"]["gameWins"].as_u64().unwrap_or(0) as u32;
    TeamRef {
        short: teams::short_code(&name),
        name,
        score,
    }
}

/// Render the raw ISO-8601 timestamp for display; the raw string is kept on
/// the match either way.
fn format_start_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => dt.format(DATE_FORMAT).to_string(),
        Err(_) => UNKNOWN.to_string(),
    }
}
