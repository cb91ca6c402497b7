pub mod client;
pub mod keys;
pub mod schedule;
pub mod standings;

pub use client::{EgressClients, EsportsClient};
pub use keys::{discover_api_keys, KeySource, SchedulePageSource};
pub use schedule::fetch_matches;
pub use standings::fetch_standings;
