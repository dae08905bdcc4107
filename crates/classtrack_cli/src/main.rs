//! Launcher that prints one day's agenda from the configured planner store.
//!
//! Usage: `classtrack_cli [YYYY-MM-DD | --version]` (date defaults to today).

use chrono::{Local, NaiveDate};
use classtrack_core::db::open_db;
use classtrack_core::model::time::weekday_label;
use classtrack_core::{
    core_version, init_logging_from_config, minutes_to_time, parse_calendar_date, to_iso_date,
    AppConfig, PlannerService, SqliteKvStore,
};
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("classtrack: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), String> {
    let arg = std::env::args().nth(1);
    if matches!(arg.as_deref(), Some("--version" | "-V")) {
        println!("classtrack {}", core_version());
        return Ok(());
    }

    let config = AppConfig::from_env()?;
    std::fs::create_dir_all(&config.data_dir)
        .map_err(|err| format!("cannot create `{}`: {err}", config.data_dir.display()))?;
    if let Err(err) = init_logging_from_config(&config) {
        // Logging is optional for a read-only agenda print.
        eprintln!("classtrack: logging disabled: {err}");
    }

    let now = Local::now().naive_local();
    let date = match arg {
        Some(raw) => parse_calendar_date(&raw)
            .ok_or_else(|| format!("expected a date as YYYY-MM-DD, got `{raw}`"))?,
        None => now.date(),
    };

    let conn = open_db(&config.db_path).map_err(|err| format!("store open failed: {err}"))?;
    let store = SqliteKvStore::try_new(&conn).map_err(|err| err.to_string())?;
    let planner = PlannerService::load(store).map_err(|err| err.to_string())?;

    print_day(&planner, date);
    if let Some(next) = planner.next_class(now) {
        println!(
            "next class: {} on {} at {}",
            next.name,
            to_iso_date(next.date),
            next.start
        );
    }
    Ok(())
}

fn print_day(planner: &PlannerService<SqliteKvStore<'_>>, date: NaiveDate) {
    match planner.resolve_weekday(date) {
        Some(weekday) => println!("{} ({} schedule)", to_iso_date(date), weekday_label(weekday)),
        None => println!("{} (no school)", to_iso_date(date)),
    }

    let agenda = planner.agenda_for(date);
    if agenda.is_empty() {
        println!("  nothing scheduled");
        return;
    }
    for item in &agenda.all_day {
        println!("  all day      {}", item.title);
    }
    for block in planner.timeline_for(date) {
        println!(
            "  {}-{}  {}",
            minutes_to_time(i64::from(block.start)),
            minutes_to_time(i64::from(block.end)),
            block.item.title
        );
    }
}
