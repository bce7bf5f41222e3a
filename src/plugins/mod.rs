//! Subsystem surfaces: one module per entity family, each exposing its clap
//! CLI alongside the record-store operations it wraps.

pub mod activities;
pub mod courses;
pub mod roster;
pub mod stats;

use crate::core::outcome::Refusal;
use clap::ValueEnum;
use colored::Colorize;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// clap value parser: dates are ISO `YYYY-MM-DD`, normalized through chrono.
pub(crate) fn validate_date(s: &str) -> Result<String, String> {
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map(|d| d.format("%Y-%m-%d").to_string())
        .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD", s))
}

pub(crate) fn today() -> String {
    chrono::Local::now().date_naive().format("%Y-%m-%d").to_string()
}

/// Uniform write-result line: green applied / red refused with the reason,
/// or a JSON envelope when the caller asked for it.
pub(crate) fn report_write(format: OutputFormat, action: &str, id: &str, refusal: Option<Refusal>) {
    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "status": if refusal.is_none() { "applied" } else { "refused" },
                "action": action,
                "id": id,
                "reason": refusal,
            });
            println!("{}", body);
        }
        OutputFormat::Text => match refusal {
            None => println!("{} {}: {}", "●".bright_green(), action, id.bright_white()),
            Some(r) => println!(
                "{} {}: {} ({})",
                "✗".bright_red(),
                action,
                id.bright_white(),
                r.describe()
            ),
        },
    }
}
