//! Snapshot persistence and reconciliation.
//!
//! The snapshot file is both this run's output and the next run's fallback
//! input.  Reconciliation never lets a total outage clobber a
//! last-known-good file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use crate::models::{DataSource, Match, ScrapeStatus, Snapshot, Standing};

/// Timestamp format persisted in `last_update`.
const LAST_UPDATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// What to do with the snapshot file after reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub enum WritePlan {
    /// Persist this snapshot, overwriting any prior file.
    Write(Snapshot),
    /// Both categories unavailable while a prior snapshot exists: leave the
    /// file untouched and report failure.
    KeepExisting,
}

/// Load the prior snapshot.  A missing, unreadable or corrupt file is
/// treated as "no prior snapshot".
pub fn load_existing(path: &Path) -> Option<Snapshot> {
    let contents = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            debug!("No prior snapshot at {}: {}", path.display(), e);
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(
                "Prior snapshot at {} is corrupt, ignoring it: {}",
                path.display(),
                e
            );
            None
        }
    }
}

/// Reconcile fresh fetch results against the prior snapshot.
///
/// Per category, `None` means the fetch failed outright: the prior list is
/// substituted when non-empty (provenance "cache"), otherwise the category
/// is empty and "unavailable".  `Some` is used as-is even when empty
/// (provenance "api"); an empty live result is not a failure.
pub fn reconcile(
    fresh_matches: Option<Vec<Match>>,
    fresh_standings: Option<Vec<Standing>>,
    prior: Option<Snapshot>,
    now: DateTime<Utc>,
) -> WritePlan {
    let had_prior = prior.is_some();
    let (prior_matches, prior_standings) = match prior {
        Some(p) => (p.matches, p.standings),
        None => (Vec::new(), Vec::new()),
    };

    let (matches, matches_source) = resolve_category(fresh_matches, prior_matches);
    let (standings, standings_source) = resolve_category(fresh_standings, prior_standings);

    if matches_source == DataSource::Unavailable
        && standings_source == DataSource::Unavailable
        && had_prior
    {
        warn!("API unavailable and no usable fresh data: keeping the existing file");
        return WritePlan::KeepExisting;
    }

    WritePlan::Write(Snapshot {
        last_update: now.format(LAST_UPDATE_FORMAT).to_string(),
        matches,
        standings,
        scrape_status: ScrapeStatus {
            matches_source,
            standings_source,
        },
    })
}

fn resolve_category<T>(fresh: Option<Vec<T>>, prior: Vec<T>) -> (Vec<T>, DataSource) {
    match fresh {
        Some(list) => (list, DataSource::Api),
        None if !prior.is_empty() => (prior, DataSource::Cache),
        None => (Vec::new(), DataSource::Unavailable),
    }
}

/// Write the snapshot as pretty-printed JSON, overwriting any prior content.
pub fn save(snapshot: &Snapshot, path: &Path) -> Result<()> {
    let json =
        serde_json::to_string_pretty(snapshot).context("Failed to serialize snapshot")?;
    fs::write(path, json)
        .with_context(|| format!("Failed to write snapshot to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchStatus, TeamRef};
    use chrono::TimeZone;

    fn sample_match(team1: &str, team2: &str) -> Match {
        Match {
            team1: TeamRef {
                name: team1.to_string(),
                short: crate::teams::short_code(team1),
                score: 2,
            },
            team2: TeamRef {
                name: team2.to_string(),
                short: crate::teams::short_code(team2),
                score: 0,
            },
            start_time: "2024-01-15T17:00:00Z".into(),
            date_iso: "2024-01-15T17:00:00Z".into(),
            date: "15 Jan - 17:00".into(),
            status: MatchStatus::Finished,
        }
    }

    fn sample_standing(rank: u32, team: &str) -> Standing {
        Standing {
            rank,
            team: team.to_string(),
            short: crate::teams::short_code(team),
            wins: 5,
            losses: 2,
            points: 15,
        }
    }

    fn prior_snapshot() -> Snapshot {
        Snapshot {
            last_update: "2024-01-14T12:00:00Z".into(),
            matches: vec![sample_match("Karmine Corp", "Solary")],
            standings: vec![sample_standing(1, "Karmine Corp")],
            scrape_status: ScrapeStatus {
                matches_source: DataSource::Api,
                standings_source: DataSource::Api,
            },
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 18, 30, 0).unwrap()
    }

    #[test]
    fn test_total_failure_with_prior_snapshot_aborts() {
        let plan = reconcile(None, None, Some(prior_snapshot()), now());
        assert_eq!(plan, WritePlan::KeepExisting);
    }

    #[test]
    fn test_total_failure_with_empty_prior_snapshot_still_aborts() {
        let mut prior = prior_snapshot();
        prior.matches.clear();
        prior.standings.clear();
        let plan = reconcile(None, None, Some(prior), now());
        assert_eq!(plan, WritePlan::KeepExisting);
    }

    #[test]
    fn test_total_failure_without_prior_writes_placeholder() {
        let plan = reconcile(None, None, None, now());
        let WritePlan::Write(snap) = plan else {
            panic!("expected a placeholder write");
        };
        assert!(snap.matches.is_empty());
        assert!(snap.standings.is_empty());
        assert_eq!(snap.scrape_status.matches_source, DataSource::Unavailable);
        assert_eq!(snap.scrape_status.standings_source, DataSource::Unavailable);
    }

    #[test]
    fn test_cache_substitution_for_failed_category_only() {
        // Matches fetched fine (empty, which is still a success); the
        // standings fetch failed and falls back to the prior table.
        let plan = reconcile(Some(Vec::new()), None, Some(prior_snapshot()), now());
        let WritePlan::Write(snap) = plan else {
            panic!("expected a write");
        };
        assert!(snap.matches.is_empty());
        assert_eq!(snap.scrape_status.matches_source, DataSource::Api);
        assert_eq!(snap.standings.len(), 1);
        assert_eq!(snap.standings[0].team, "Karmine Corp");
        assert_eq!(snap.scrape_status.standings_source, DataSource::Cache);
    }

    #[test]
    fn test_fresh_data_is_used_as_is_with_api_provenance() {
        let fresh_matches = vec![sample_match("Gentle Mates", "GameWard")];
        let fresh_standings = vec![sample_standing(1, "Gentle Mates")];
        let plan = reconcile(
            Some(fresh_matches.clone()),
            Some(fresh_standings.clone()),
            Some(prior_snapshot()),
            now(),
        );
        let WritePlan::Write(snap) = plan else {
            panic!("expected a write");
        };
        assert_eq!(snap.matches, fresh_matches);
        assert_eq!(snap.standings, fresh_standings);
        assert_eq!(snap.scrape_status.matches_source, DataSource::Api);
        assert_eq!(snap.scrape_status.standings_source, DataSource::Api);
        assert_eq!(snap.last_update, "2024-01-15T18:30:00Z");
    }

    #[test]
    fn test_failed_category_with_empty_prior_list_is_unavailable() {
        let mut prior = prior_snapshot();
        prior.standings.clear();
        let plan = reconcile(Some(vec![sample_match("A", "B")]), None, Some(prior), now());
        let WritePlan::Write(snap) = plan else {
            panic!("expected a write");
        };
        assert_eq!(snap.scrape_status.standings_source, DataSource::Unavailable);
        assert!(snap.standings.is_empty());
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lfl-data.json");

        let snap = prior_snapshot();
        save(&snap, &path).unwrap();
        let loaded = load_existing(&path).unwrap();
        assert_eq!(loaded, snap);
    }

    #[test]
    fn test_missing_file_is_no_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_existing(&dir.path().join("absent.json")).is_none());
    }

    #[test]
    fn test_corrupt_file_is_no_prior_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lfl-data.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(load_existing(&path).is_none());
    }

    #[test]
    fn test_save_overwrites_prior_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lfl-data.json");

        save(&prior_snapshot(), &path).unwrap();
        let mut updated = prior_snapshot();
        updated.last_update = "2024-01-16T12:00:00Z".into();
        save(&updated, &path).unwrap();

        assert_eq!(load_existing(&path).unwrap().last_update, "2024-01-16T12:00:00Z");
    }

    #[test]
    fn test_persisted_json_uses_downstream_field_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lfl-data.json");
        save(&prior_snapshot(), &path).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["last_update"].is_string());
        assert_eq!(raw["matches"][0]["startTime"], "2024-01-15T17:00:00Z");
        assert_eq!(raw["matches"][0]["team1"]["short"], "KC");
        assert_eq!(raw["matches"][0]["status"], "finished");
        assert_eq!(raw["standings"][0]["points"], 15);
        assert_eq!(raw["scrape_status"]["matches_source"], "api");
    }
}
