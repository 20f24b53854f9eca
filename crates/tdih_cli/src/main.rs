//! CLI probe for `tdih_core`.
//!
//! # Responsibility
//! - Verify core crate wiring (ping/version) without a host application.
//! - Run one day lookup against the configured event store.
//!
//! Usage: `tdih_cli [--config PATH] [MM-DD [YEAR]]`

use clap::Parser;
use log::info;
use std::path::PathBuf;
use std::process::ExitCode;
use tdih_core::{MonthDay, SqliteEventRepository, TdihConfig, TdihService};

/// Command-line arguments for tdih_cli
#[derive(Parser, Debug, PartialEq, Eq)]
#[command(name = "tdih_cli")]
#[command(about = "This-day-in-history lookup probe")]
#[command(version)]
struct CliArgs {
    /// TOML config file; built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Calendar day to look up, as MM-DD
    #[arg(value_parser = parse_month_day)]
    month_day: Option<MonthDay>,

    /// Year whose events rank first
    #[arg(requires = "month_day", allow_negative_numbers = true)]
    reference_year: Option<i32>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("tdih_cli: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &CliArgs) -> Result<(), String> {
    let config = match args.config.as_ref() {
        Some(path) => TdihConfig::from_file(path).map_err(|err| err.to_string())?,
        None => TdihConfig::default(),
    };
    config.logging.init()?;

    println!("tdih_core ping={}", tdih_core::ping());
    println!("tdih_core version={}", tdih_core::core_version());

    let Some(target) = args.month_day else {
        return Ok(());
    };
    let (month, day) = (target.month(), target.day());

    let conn = config.storage.open().map_err(|err| err.to_string())?;
    let repo = SqliteEventRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = TdihService::with_config(repo, config.retrieval.clone());
    let ranked = service
        .find_events(month, day, args.reference_year)
        .map_err(|err| err.to_string())?;

    info!(
        "event=cli_lookup module=cli status=ok month={month} day={day} results={}",
        ranked.len()
    );
    for item in &ranked.items {
        let marker = if item.exact_match { '*' } else { ' ' };
        println!("{marker} {} {}", item.date, item.event.title);
    }
    Ok(())
}

fn parse_month_day(value: &str) -> Result<MonthDay, String> {
    let invalid = || format!("invalid date `{value}`; expected MM-DD");
    let (month, day) = value.split_once('-').ok_or_else(invalid)?;
    let month = month.parse::<u32>().map_err(|_| invalid())?;
    let day = day.parse::<u32>().map_err(|_| invalid())?;
    MonthDay::new(month, day).map_err(|err| err.to_string())
}
