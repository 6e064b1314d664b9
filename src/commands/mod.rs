mod config_cmd;
mod diary;
mod goals;

use chrono::{Local, NaiveDate};
use clap::ValueEnum;

pub use config_cmd::ConfigCommand;
pub use diary::DiaryCommand;
pub use goals::GoalsCommand;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Parses an optional YYYY-MM-DD argument, defaulting to today.
fn parse_date(date: Option<&str>) -> Result<NaiveDate, String> {
    match date {
        Some(d) => NaiveDate::parse_from_str(d, "%Y-%m-%d")
            .map_err(|_| format!("Invalid date format '{}'. Use YYYY-MM-DD.", d)),
        None => Ok(Local::now().date_naive()),
    }
}
