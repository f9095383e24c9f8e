use colored::Colorize;
use comfy_table::{Table, presets::UTF8_BORDERS_ONLY};

use crate::core::stats::StatsData;
use crate::models::dose::{DoseHistory, DoseStatus};
use crate::models::medication::Medication;
use crate::models::schedule::Schedule;

/// Pretty-print a medication list as a table.
pub fn format_med_list(meds: &[Medication], include_inactive: bool) -> String {
    if meds.is_empty() {
        return if include_inactive {
            "No medications recorded.".to_string()
        } else {
            "No active medications. Use `med add` to create one.".to_string()
        };
    }

    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["ID", "Name", "Dosage", "Form", "Frequency", "Status"]);
    for m in meds {
        let status = if m.active { "active" } else { "stopped" };
        table.add_row([
            m.id.to_string(),
            m.name.clone(),
            format!("{} {}", m.dosage, m.dosage_unit),
            m.form.to_string(),
            m.frequency.clone(),
            status.to_string(),
        ]);
    }
    table.to_string()
}

/// Detail view of a single medication.
pub fn format_med_detail(m: &Medication, schedules: &[Schedule]) -> String {
    let mut out = format!(
        "{} (id {})\n  {} {} | {} | {}\n",
        m.name.bold(),
        m.id,
        m.dosage,
        m.dosage_unit,
        m.form,
        m.meal_relation,
    );
    if !m.frequency.is_empty() {
        out.push_str(&format!("  Frequency: {}\n", m.frequency));
    }
    if !m.instructions.is_empty() {
        out.push_str(&format!("  Instructions: {}\n", m.instructions));
    }
    if !m.notes.is_empty() {
        out.push_str(&format!("  Notes: {}\n", m.notes));
    }
    out.push_str(&format!("  Started: {}", m.start_date.format("%Y-%m-%d")));
    if let Some(end) = m.end_date {
        out.push_str(&format!(" | Ends: {}", end.format("%Y-%m-%d")));
    } else {
        out.push_str(" | Ongoing");
    }
    if !m.active {
        out.push_str(&format!(" | {}", "stopped".red()));
    }
    out.push('\n');
    if let Some(ref path) = m.prescription_image_path {
        out.push_str(&format!("  Prescription image: {path}\n"));
    }
    if schedules.is_empty() {
        out.push_str("  No reminder schedules.");
    } else {
        out.push_str("  Reminders:");
        for s in schedules {
            let state = if s.enabled { "" } else { " (disabled)" };
            out.push_str(&format!("\n    [{}] {} on {}{}", s.id, s.time(), s.days, state));
        }
    }
    out
}

/// Pretty-print schedules as a table.
pub fn format_schedule_list(schedules: &[Schedule]) -> String {
    if schedules.is_empty() {
        return "No schedules.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["ID", "Medication", "Time", "Days", "Enabled"]);
    for s in schedules {
        table.add_row([
            s.id.to_string(),
            s.medication_id.to_string(),
            s.time(),
            s.days.to_string(),
            if s.enabled { "yes".to_string() } else { "no".to_string() },
        ]);
    }
    table.to_string()
}

fn colorize_status(status: DoseStatus) -> String {
    match status {
        DoseStatus::Taken => "taken".green().to_string(),
        DoseStatus::Missed => "missed".red().to_string(),
        DoseStatus::Skipped => "skipped".yellow().to_string(),
    }
}

/// Pretty-print dose history as a table, newest first.
pub fn format_history(doses: &[DoseHistory]) -> String {
    if doses.is_empty() {
        return "No dose history.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_BORDERS_ONLY);
    table.set_header(["ID", "Medication", "Scheduled", "Status", "Schedule", "Note"]);
    for d in doses {
        table.add_row([
            d.id.to_string(),
            d.medication_id.to_string(),
            d.scheduled_time.format("%Y-%m-%d %H:%M").to_string(),
            colorize_status(d.status),
            d.schedule_id.map_or("-".to_string(), |id| id.to_string()),
            d.notes.clone(),
        ]);
    }
    table.to_string()
}

/// Pretty-print the adherence summary.
pub fn format_stats(s: &StatsData) -> String {
    let mut out = format!("=== RxAide — {} ===\n", s.date);
    out.push_str(&format!(
        "Active medications: {} | Taken: {} | Missed: {} | Skipped: {}\n",
        s.active_medications,
        s.total_taken.to_string().green(),
        s.total_missed.to_string().red(),
        s.total_skipped,
    ));
    match s.adherence {
        Some(rate) => out.push_str(&format!("Adherence: {:.0}%", rate * 100.0)),
        None => out.push_str("Adherence: no doses recorded yet"),
    }
    for m in &s.medications {
        out.push_str(&format!(
            "\n  {} — taken {}, missed {}",
            m.name, m.taken, m.missed
        ));
    }
    out
}
