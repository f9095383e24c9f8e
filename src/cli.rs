use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "rxaide", version, about = "Local-first medication reminder and adherence CLI")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as human-readable text instead of JSON
    #[arg(long = "human", short = 'H', global = true)]
    pub human: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize config and data directory
    Init,

    /// Manage medications
    Med {
        #[command(subcommand)]
        action: MedAction,
    },

    /// Manage reminder schedules
    Schedule {
        #[command(subcommand)]
        action: ScheduleAction,
    },

    /// Record and review doses
    Dose {
        #[command(subcommand)]
        action: DoseAction,
    },

    /// Adherence summary
    Stats {
        /// Keep printing updated summaries as data changes
        #[arg(long)]
        follow: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate for
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum MedAction {
    /// Add a medication, optionally with reminder slots
    Add {
        /// Medication name
        name: String,

        /// Dosage, e.g. "500mg", "2 puff" or "1/2 tablet"
        #[arg(long)]
        dosage: String,

        /// Form: tablet/capsule/syrup/injection/drops/cream/inhaler/other
        #[arg(long)]
        form: Option<String>,

        /// Free-text frequency, e.g. "Twice daily"
        #[arg(long)]
        frequency: Option<String>,

        /// Meal relation: before_meal/after_meal/with_meal/no_relation
        #[arg(long)]
        meal: Option<String>,

        /// Intake instructions, e.g. "Take with water"
        #[arg(long)]
        instructions: Option<String>,

        /// Free-text notes
        #[arg(long)]
        notes: Option<String>,

        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<NaiveDate>,

        /// End date (YYYY-MM-DD); omit for ongoing
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Path to a captured prescription image
        #[arg(long)]
        image: Option<String>,

        /// Reminder time (HH:MM); repeatable
        #[arg(long = "at")]
        at: Vec<String>,

        /// Reminder weekdays as day numbers (1=Mon..7=Sun), e.g. 1,3,5
        #[arg(long)]
        days: Option<String>,
    },

    /// List medications
    List {
        /// Include stopped medications
        #[arg(long)]
        all: bool,
    },

    /// Show one medication with its schedules
    Show {
        /// Medication id or name
        med: String,
    },

    /// Update fields of a medication
    Update {
        /// Medication id or name
        med: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        dosage: Option<String>,

        #[arg(long)]
        form: Option<String>,

        #[arg(long)]
        frequency: Option<String>,

        #[arg(long)]
        meal: Option<String>,

        #[arg(long)]
        instructions: Option<String>,

        #[arg(long)]
        notes: Option<String>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        /// Path to a captured prescription image
        #[arg(long)]
        image: Option<String>,
    },

    /// Stop (deactivate) a medication, keeping its history
    Stop {
        /// Medication id or name
        med: String,

        /// Stop date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Permanently delete a medication, its schedules and its history
    Remove {
        /// Medication id or name
        med: String,

        /// Skip confirmation
        #[arg(long, short = 'y')]
        yes: bool,
    },
}

#[derive(Subcommand)]
pub enum ScheduleAction {
    /// Add a reminder slot to a medication
    Add {
        /// Medication id or name
        med: String,

        /// Reminder time (HH:MM)
        #[arg(long)]
        at: String,

        /// Weekdays as day numbers (1=Mon..7=Sun); defaults from config
        #[arg(long)]
        days: Option<String>,
    },

    /// List schedules (all of a medication's, or every enabled one)
    List {
        /// Medication id or name
        #[arg(long)]
        med: Option<String>,
    },

    /// Enable a schedule
    Enable {
        /// Schedule id
        id: i64,
    },

    /// Disable a schedule without deleting it
    Disable {
        /// Schedule id
        id: i64,
    },

    /// Delete a schedule (dose history keeps its records)
    Remove {
        /// Schedule id
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum DoseAction {
    /// Record a taken dose
    Take {
        /// Medication id or name
        med: String,

        /// Originating schedule id
        #[arg(long)]
        schedule: Option<i64>,

        /// Scheduled time (RFC 3339), defaults to now
        #[arg(long)]
        time: Option<DateTime<Utc>>,

        /// Free-text note
        #[arg(long)]
        note: Option<String>,
    },

    /// Record a missed dose
    Miss {
        /// Medication id or name
        med: String,

        #[arg(long)]
        schedule: Option<i64>,

        /// Scheduled time (RFC 3339), defaults to now
        #[arg(long)]
        time: Option<DateTime<Utc>>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Record a deliberately skipped dose
    Skip {
        /// Medication id or name
        med: String,

        #[arg(long)]
        schedule: Option<i64>,

        /// Scheduled time (RFC 3339), defaults to now
        #[arg(long)]
        time: Option<DateTime<Utc>>,

        #[arg(long)]
        note: Option<String>,
    },

    /// Show dose history
    History {
        /// Only history for this medication (id or name)
        #[arg(long)]
        med: Option<String>,

        /// From date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,

        /// To date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Set a config value
    Set {
        /// Config key (e.g. defaults.dosage_unit, defaults.days, alias.amox)
        key: String,
        /// Config value
        value: String,
    },
}
