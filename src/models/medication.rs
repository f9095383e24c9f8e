use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// DosageUnit
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DosageUnit {
    Mg,
    Ml,
    Mcg,
    G,
    Tablet,
    Capsule,
    Drop,
    Puff,
}

impl FromStr for DosageUnit {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mg" => Ok(Self::Mg),
            "ml" => Ok(Self::Ml),
            "mcg" => Ok(Self::Mcg),
            "g" => Ok(Self::G),
            "tablet" => Ok(Self::Tablet),
            "capsule" => Ok(Self::Capsule),
            "drop" => Ok(Self::Drop),
            "puff" => Ok(Self::Puff),
            other => Err(anyhow::anyhow!("unknown dosage unit: {other}")),
        }
    }
}

impl fmt::Display for DosageUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Mg => write!(f, "mg"),
            Self::Ml => write!(f, "ml"),
            Self::Mcg => write!(f, "mcg"),
            Self::G => write!(f, "g"),
            Self::Tablet => write!(f, "tablet"),
            Self::Capsule => write!(f, "capsule"),
            Self::Drop => write!(f, "drop"),
            Self::Puff => write!(f, "puff"),
        }
    }
}

// ---------------------------------------------------------------------------
// MedicationForm
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MedicationForm {
    Tablet,
    Capsule,
    Syrup,
    Injection,
    Drops,
    Cream,
    Inhaler,
    Other,
}

impl FromStr for MedicationForm {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "tablet" => Self::Tablet,
            "capsule" => Self::Capsule,
            "syrup" => Self::Syrup,
            "injection" => Self::Injection,
            "drops" => Self::Drops,
            "cream" => Self::Cream,
            "inhaler" => Self::Inhaler,
            _ => Self::Other,
        })
    }
}

impl fmt::Display for MedicationForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tablet => write!(f, "tablet"),
            Self::Capsule => write!(f, "capsule"),
            Self::Syrup => write!(f, "syrup"),
            Self::Injection => write!(f, "injection"),
            Self::Drops => write!(f, "drops"),
            Self::Cream => write!(f, "cream"),
            Self::Inhaler => write!(f, "inhaler"),
            Self::Other => write!(f, "other"),
        }
    }
}

// ---------------------------------------------------------------------------
// MealRelation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MealRelation {
    BeforeMeal,
    AfterMeal,
    WithMeal,
    #[default]
    NoRelation,
}

impl FromStr for MealRelation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "before_meal" | "before" => Ok(Self::BeforeMeal),
            "after_meal" | "after" => Ok(Self::AfterMeal),
            "with_meal" | "with" => Ok(Self::WithMeal),
            "no_relation" | "none" => Ok(Self::NoRelation),
            other => Err(anyhow::anyhow!("unknown meal relation: {other}")),
        }
    }
}

impl fmt::Display for MealRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BeforeMeal => write!(f, "before_meal"),
            Self::AfterMeal => write!(f, "after_meal"),
            Self::WithMeal => write!(f, "with_meal"),
            Self::NoRelation => write!(f, "no_relation"),
        }
    }
}

// ---------------------------------------------------------------------------
// ParsedDosage + parse_dosage
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedDosage {
    pub raw: String,
    pub amount: Option<String>,
    pub unit: Option<DosageUnit>,
}

/// Split a raw dosage string into an amount and a recognised unit.
///
/// Handles glued (`"500mg"`), space-separated (`"2 puff"`), fraction
/// (`"1/2 tablet"`) and bare-number (`"500"`) inputs. Unrecognised unit text
/// leaves `unit` empty so callers can fall back to a configured default.
pub fn parse_dosage(input: &str) -> ParsedDosage {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ParsedDosage {
            raw: String::new(),
            amount: None,
            unit: None,
        };
    }

    match try_split(trimmed) {
        Some((amount, unit)) => ParsedDosage {
            raw: trimmed.to_string(),
            amount: Some(amount),
            unit,
        },
        None => ParsedDosage {
            raw: trimmed.to_string(),
            amount: None,
            unit: None,
        },
    }
}

fn try_split(s: &str) -> Option<(String, Option<DosageUnit>)> {
    let re = Regex::new(r"^(\d+\s*/\s*\d+|\d+\.?\d*|\.\d+)\s*(.*)$").ok()?;
    let caps = re.captures(s)?;
    let amount: String = caps[1].split_whitespace().collect();
    let unit = caps[2].trim().parse::<DosageUnit>().ok();
    Some((amount, unit))
}

// ---------------------------------------------------------------------------
// Medication
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Medication {
    /// Store-assigned rowid; 0 means not yet persisted.
    pub id: i64,
    pub name: String,
    pub dosage: String,
    pub dosage_unit: DosageUnit,
    pub form: MedicationForm,
    pub frequency: String,
    pub meal_relation: MealRelation,
    pub instructions: String,
    pub notes: String,
    pub start_date: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prescription_image_path: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Medication {
    /// Create a new active, ongoing medication with sensible defaults.
    pub fn new(
        name: impl Into<String>,
        dosage: impl Into<String>,
        dosage_unit: DosageUnit,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name: name.into(),
            dosage: dosage.into(),
            dosage_unit,
            form: MedicationForm::Other,
            frequency: String::new(),
            meal_relation: MealRelation::NoRelation,
            instructions: String::new(),
            notes: String::new(),
            start_date: now,
            end_date: None,
            prescription_image_path: None,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the regimen has ended relative to `now`.
    pub fn is_ended(&self, now: DateTime<Utc>) -> bool {
        self.end_date.is_some_and(|end| end < now)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
