mod cli;
mod cmd;

use clap::Parser;
use cli::{Cli, Commands, ConfigAction, DoseAction, MedAction, ScheduleAction};
use rxaide::models::dose::DoseStatus;
use rxaide::output;
use std::process;

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let human = cli.human;

    let result = match cli.command {
        Commands::Init => cmd::init::run(human),
        Commands::Med { action } => match action {
            MedAction::Add {
                name,
                dosage,
                form,
                frequency,
                meal,
                instructions,
                notes,
                start,
                end,
                image,
                at,
                days,
            } => cmd::med::run_add(
                &name,
                &dosage,
                form.as_deref(),
                frequency.as_deref(),
                meal.as_deref(),
                instructions.as_deref(),
                notes.as_deref(),
                start,
                end,
                image.as_deref(),
                &at,
                days.as_deref(),
                human,
            ),
            MedAction::List { all } => cmd::med::run_list(all, human),
            MedAction::Show { med } => cmd::med::run_show(&med, human),
            MedAction::Update {
                med,
                name,
                dosage,
                form,
                frequency,
                meal,
                instructions,
                notes,
                start,
                end,
                image,
            } => cmd::med::run_update(
                &med,
                name.as_deref(),
                dosage.as_deref(),
                form.as_deref(),
                frequency.as_deref(),
                meal.as_deref(),
                instructions.as_deref(),
                notes.as_deref(),
                start,
                end,
                image.as_deref(),
                human,
            ),
            MedAction::Stop { med, date } => cmd::med::run_stop(&med, date, human),
            MedAction::Remove { med, yes } => cmd::med::run_remove(&med, yes, human),
        },
        Commands::Schedule { action } => match action {
            ScheduleAction::Add { med, at, days } => {
                cmd::schedule::run_add(&med, &at, days.as_deref(), human)
            }
            ScheduleAction::List { med } => cmd::schedule::run_list(med.as_deref(), human),
            ScheduleAction::Enable { id } => cmd::schedule::run_set_enabled(id, true, human),
            ScheduleAction::Disable { id } => cmd::schedule::run_set_enabled(id, false, human),
            ScheduleAction::Remove { id } => cmd::schedule::run_remove(id, human),
        },
        Commands::Dose { action } => match action {
            DoseAction::Take {
                med,
                schedule,
                time,
                note,
            } => cmd::dose::run_record(
                DoseStatus::Taken,
                &med,
                schedule,
                time,
                note.as_deref(),
                human,
            ),
            DoseAction::Miss {
                med,
                schedule,
                time,
                note,
            } => cmd::dose::run_record(
                DoseStatus::Missed,
                &med,
                schedule,
                time,
                note.as_deref(),
                human,
            ),
            DoseAction::Skip {
                med,
                schedule,
                time,
                note,
            } => cmd::dose::run_record(
                DoseStatus::Skipped,
                &med,
                schedule,
                time,
                note.as_deref(),
                human,
            ),
            DoseAction::History { med, from, to } => {
                cmd::dose::run_history(med.as_deref(), from, to, human)
            }
        },
        Commands::Stats { follow } => cmd::stats::run(follow, human),
        Commands::Config { action } => match action {
            ConfigAction::Show => cmd::config::run_show(human),
            ConfigAction::Set { key, value } => cmd::config::run_set(&key, &value),
        },
        Commands::Completions { shell } => cmd::completions::run(shell),
    };

    if let Err(e) = result {
        let err = output::error("", "general_error", &e.to_string());
        eprintln!("{}", serde_json::to_string(&err).unwrap());
        process::exit(1);
    }
}
