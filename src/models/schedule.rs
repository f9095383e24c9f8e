use anyhow::bail;
use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Weekdays
// ---------------------------------------------------------------------------

/// Set of active weekdays, encoded as comma-separated day numbers
/// (1 = Monday .. 7 = Sunday). The default covers all seven days.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Weekdays(BTreeSet<u8>);

impl Weekdays {
    pub fn all() -> Self {
        Self((1..=7).collect())
    }

    pub fn contains(&self, day: u8) -> bool {
        self.0.contains(&day)
    }

    /// Whether the set is active on a calendar weekday.
    pub fn contains_weekday(&self, weekday: Weekday) -> bool {
        self.contains(weekday.number_from_monday() as u8)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl Default for Weekdays {
    fn default() -> Self {
        Self::all()
    }
}

impl FromStr for Weekdays {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Ok(Self(BTreeSet::new()));
        }
        let mut days = BTreeSet::new();
        for part in trimmed.split(',') {
            let day: u8 = match part.trim().parse() {
                Ok(d) => d,
                Err(_) => bail!("invalid weekday number: {part}"),
            };
            if !(1..=7).contains(&day) {
                bail!("weekday out of range (1-7): {day}");
            }
            days.insert(day);
        }
        Ok(Self(days))
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u8::to_string).collect();
        write!(f, "{}", parts.join(","))
    }
}

impl TryFrom<String> for Weekdays {
    type Error = anyhow::Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Weekdays> for String {
    fn from(w: Weekdays) -> Self {
        w.to_string()
    }
}

// ---------------------------------------------------------------------------
// Schedule
// ---------------------------------------------------------------------------

/// One reminder time slot for a medication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schedule {
    /// Store-assigned rowid; 0 means not yet persisted.
    pub id: i64,
    pub medication_id: i64,
    pub hour: u8,
    pub minute: u8,
    pub days: Weekdays,
    pub enabled: bool,
    pub created_at: DateTime<Utc>,
}

impl Schedule {
    pub fn new(medication_id: i64, hour: u8, minute: u8) -> Self {
        Self {
            id: 0,
            medication_id,
            hour,
            minute,
            days: Weekdays::all(),
            enabled: true,
            created_at: Utc::now(),
        }
    }

    /// "HH:MM" rendering of the slot time.
    pub fn time(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
