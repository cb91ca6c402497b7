use serde::{Deserialize, Serialize};

/// One side of a match as displayed downstream
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    /// Full team name as reported by the API
    pub name: String,
    /// 2–4 letter short code (see `teams::short_code`)
    pub short: String,
    /// Games won so far in this series (0 until play starts)
    pub score: u32,
}

/// Lifecycle of a scheduled match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Scheduled,
    Live,
    Finished,
}

/// A single schedule entry, normalized from one API event.
/// Identity is positional within the snapshot; the API exposes no stable ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub team1: TeamRef,
    pub team2: TeamRef,
    /// Raw ISO-8601 start timestamp as received
    #[serde(rename = "startTime")]
    pub start_time: String,
    /// Duplicate of the raw timestamp, kept for downstream consumers
    pub date_iso: String,
    /// Human-formatted start time ("05 Aug - 17:00"), "TBD" when unparsable
    pub date: String,
    pub status: MatchStatus,
}

/// One row of the league table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    /// Rank ordinal from the source, not necessarily contiguous
    pub rank: u32,
    pub team: String,
    pub short: String,
    pub wins: u32,
    pub losses: u32,
    /// Always wins × 3, never read from the source
    pub points: u32,
}

/// Where a snapshot category came from on this run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    /// Live fetch succeeded (an empty list still counts)
    Api,
    /// Fetch failed, list reused from the prior snapshot
    Cache,
    /// Fetch failed and no prior data existed
    Unavailable,
}

/// Per-category provenance recorded alongside the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeStatus {
    pub matches_source: DataSource,
    pub standings_source: DataSource,
}

/// The single persisted document: output of this run, fallback input of the next
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// UTC timestamp of the last successful update ("%Y-%m-%dT%H:%M:%SZ")
    pub last_update: String,
    pub matches: Vec<Match>,
    pub standings: Vec<Standing>,
    pub scrape_status: ScrapeStatus,
}
