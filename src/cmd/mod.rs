pub mod completions;
pub mod config;
pub mod dose;
pub mod init;
pub mod med;
pub mod schedule;
pub mod stats;

use anyhow::Result;
use chrono::Timelike;

/// Parse an "HH:MM" reminder time into (hour, minute).
pub(crate) fn parse_time(s: &str) -> Result<(u8, u8)> {
    let t = chrono::NaiveTime::parse_from_str(s, "%H:%M")
        .map_err(|_| anyhow::anyhow!("invalid time '{s}', expected HH:MM"))?;
    Ok((t.hour() as u8, t.minute() as u8))
}
