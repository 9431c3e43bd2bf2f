//! zdreport - incidents-per-problem CSV report for Zendesk administrators.
//!
//! Single-shot batch job: search incident tickets created in a date window,
//! count them per parent problem ticket, resolve each problem's subject,
//! and write `incidents_report.csv`.

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Local, NaiveDate};
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};
use zdr_core::aggregate::IncidentAggregator;
use zdr_core::config::{ConfigError, Credentials};
use zdr_core::report::{write_report, ReportError};
use zdr_core::types::{DateRange, InvalidDateRange};
use zdreport::client::{ClientError, ZendeskClient};
use zdreport::render;

/// CSV report of incident ticket counts per problem ticket.
///
/// Credentials can be configured in a `.env` file or overridden through the
/// optional flags.
#[derive(Parser)]
#[command(name = "zdreport", version)]
#[command(about = "CSV report of incidents per problem ticket")]
struct Cli {
    /// Zendesk subdomain (e.g. d3v-test)
    #[arg(short = 's', long, env = "SUBDOMAIN")]
    subdomain: Option<String>,

    /// Pre-generated OAuth2 token with "tickets:read write" scope
    #[arg(short = 'o', long, env = "OAUTHTOKEN")]
    oauth_token: Option<String>,

    /// Agent email address
    #[arg(short = 'u', long, env = "USERNAME")]
    username: Option<String>,

    /// Agent password
    #[arg(short = 'p', long, env = "PASSWORD")]
    password: Option<String>,

    /// API token paired with the agent email address
    #[arg(short = 't', long, env = "APITOKEN")]
    api_token: Option<String>,

    /// Lower limit of ticket creation date (YYYY-MM-DD); defaults to 70 days ago
    #[arg(long, value_parser = parse_date)]
    start: Option<NaiveDate>,

    /// Upper limit of ticket creation date (YYYY-MM-DD); defaults to today
    #[arg(long, value_parser = parse_date)]
    end: Option<NaiveDate>,

    /// Report file path
    #[arg(long, default_value = "incidents_report.csv")]
    output: PathBuf,
}

#[derive(Debug, Error)]
enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    DateRange(#[from] InvalidDateRange),

    #[error(transparent)]
    Client(#[from] ClientError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| format!("invalid date '{s}', expected YYYY-MM-DD"))
}

#[tokio::main]
async fn main() {
    // Env fallbacks come from the environment, so the .env file must be
    // loaded before clap parses.
    dotenvy::dotenv().ok();

    fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), RunError> {
    let creds = Credentials {
        subdomain: cli.subdomain,
        oauth_token: cli.oauth_token,
        email: cli.username,
        password: cli.password,
        api_token: cli.api_token,
    };
    let subdomain = creds.subdomain()?.to_string();
    let auth = creds.auth()?;

    let defaults = DateRange::default_window(Local::now().date_naive());
    let range = DateRange::new(
        cli.start.unwrap_or(defaults.start),
        cli.end.unwrap_or(defaults.end),
    )?;

    let client = ZendeskClient::new(&subdomain, auth);

    info!(start = %range.start, end = %range.end, "searching incident tickets");
    let tickets = client.search_incidents(&range).await?;
    info!(tickets = tickets.len(), "search complete");

    let mut aggregator = IncidentAggregator::new();
    for ticket in &tickets {
        aggregator.ingest(ticket);
    }

    let subjects = resolve_subjects(&client, &aggregator).await?;
    let rows = aggregator.finalize(|id| {
        subjects
            .get(&id)
            .cloned()
            .ok_or(ClientError::TicketNotFound(id))
    })?;

    write_report(&cli.output, &rows)?;
    info!(path = %cli.output.display(), rows = rows.len(), "report written");

    render::print_report(&rows, &cli.output);
    Ok(())
}

/// Resolve each distinct problem id to its subject, one lookup per group.
async fn resolve_subjects(
    client: &ZendeskClient,
    aggregator: &IncidentAggregator,
) -> Result<BTreeMap<u64, String>, ClientError> {
    let mut subjects = BTreeMap::new();
    for id in aggregator.problem_ids() {
        let subject = client.ticket_subject(id).await?;
        subjects.insert(id, subject);
    }
    info!(problems = subjects.len(), "resolved problem subjects");
    Ok(subjects)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_format() {
        assert_eq!(
            parse_date("2024-03-11").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 11).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(parse_date("11/03/2024").is_err());
        assert!(parse_date("2024-3-11x").is_err());
    }

    #[test]
    fn cli_defaults_to_fixed_output_path() {
        let cli = Cli::parse_from(["zdreport", "-s", "d3v-test", "-o", "tok"]);
        assert_eq!(cli.output, PathBuf::from("incidents_report.csv"));
    }

    #[test]
    fn cli_short_flags_match_original_tool() {
        let cli = Cli::parse_from([
            "zdreport", "-s", "d3v-test", "-u", "a@b.c", "-p", "pw", "-t", "tok",
        ]);
        assert_eq!(cli.subdomain.as_deref(), Some("d3v-test"));
        assert_eq!(cli.username.as_deref(), Some("a@b.c"));
        assert_eq!(cli.password.as_deref(), Some("pw"));
        assert_eq!(cli.api_token.as_deref(), Some("tok"));
    }
}
