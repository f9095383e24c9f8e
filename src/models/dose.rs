use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// DoseStatus
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DoseStatus {
    Taken,
    Missed,
    Skipped,
}

impl FromStr for DoseStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "taken" => Ok(Self::Taken),
            "missed" => Ok(Self::Missed),
            "skipped" => Ok(Self::Skipped),
            other => Err(anyhow::anyhow!("unknown dose status: {other}")),
        }
    }
}

impl fmt::Display for DoseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Taken => write!(f, "taken"),
            Self::Missed => write!(f, "missed"),
            Self::Skipped => write!(f, "skipped"),
        }
    }
}

// ---------------------------------------------------------------------------
// DoseHistory
// ---------------------------------------------------------------------------

/// One adherence record. Append-only: rows are created and deleted, never
/// updated. `schedule_id` is nulled by the store when the originating
/// schedule is deleted; the record itself survives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoseHistory {
    /// Store-assigned rowid; 0 means not yet persisted.
    pub id: i64,
    pub medication_id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<i64>,
    pub status: DoseStatus,
    pub scheduled_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_time: Option<DateTime<Utc>>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl DoseHistory {
    pub fn new(medication_id: i64, status: DoseStatus, scheduled_time: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            medication_id,
            schedule_id: None,
            status,
            scheduled_time,
            action_time: None,
            notes: String::new(),
            created_at: Utc::now(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dose_status_from_str_valid() {
        assert_eq!("taken".parse::<DoseStatus>().unwrap(), DoseStatus::Taken);
        assert_eq!("MISSED".parse::<DoseStatus>().unwrap(), DoseStatus::Missed);
        assert_eq!("skipped".parse::<DoseStatus>().unwrap(), DoseStatus::Skipped);
    }

    #[test]
    fn dose_status_from_str_invalid() {
        assert!("pending".parse::<DoseStatus>().is_err());
    }

    #[test]
    fn dose_status_display_roundtrip() {
        for s in [DoseStatus::Taken, DoseStatus::Missed, DoseStatus::Skipped] {
            let parsed: DoseStatus = s.to_string().parse().unwrap();
            assert_eq!(parsed, s);
        }
    }

    #[test]
    fn dose_status_serde_roundtrip() {
        let status = DoseStatus::Skipped;
        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"skipped\"");
        let back: DoseStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, status);
    }

    #[test]
    fn dose_history_new_defaults() {
        let when = Utc::now();
        let d = DoseHistory::new(7, DoseStatus::Taken, when);
        assert_eq!(d.id, 0);
        assert_eq!(d.medication_id, 7);
        assert_eq!(d.schedule_id, None);
        assert_eq!(d.status, DoseStatus::Taken);
        assert_eq!(d.scheduled_time, when);
        assert!(d.action_time.is_none());
        assert!(d.notes.is_empty());
    }
}
