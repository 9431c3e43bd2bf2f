//! Core types for the incident report job.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Literal marker used for incidents with no linked problem ticket.
pub const UNASSIGNED_MARKER: &str = "NULL";

/// A ticket as returned by the search endpoint.
///
/// The search stream is already filtered to incident tickets; `ticket_type`
/// is carried along for visibility only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: u64,
    pub created_at: DateTime<Utc>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    #[serde(default)]
    pub problem_id: Option<u64>,
    #[serde(default)]
    pub subject: Option<String>,
}

/// Aggregation key: a parent problem ticket, or the bucket for incidents
/// with no linked problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProblemGroup {
    Problem(u64),
    Unassigned,
}

impl ProblemGroup {
    /// Group key for a ticket.
    pub fn of(ticket: &Ticket) -> Self {
        match ticket.problem_id {
            Some(id) => Self::Problem(id),
            None => Self::Unassigned,
        }
    }
}

impl std::fmt::Display for ProblemGroup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Problem(id) => write!(f, "{id}"),
            Self::Unassigned => f.write_str(UNASSIGNED_MARKER),
        }
    }
}

/// One output row of the report.
///
/// Serde renames double as the CSV header: `Problem ID, Subject, Number of
/// Incidents`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    #[serde(rename = "Problem ID")]
    pub problem_id: String,
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Number of Incidents")]
    pub incidents: u64,
}

#[derive(Debug, Error)]
#[error("start date {start} is after end date {end}")]
pub struct InvalidDateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Creation-date window for the incident search, bounds exclusive on the
/// wire (`created>start created<end`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Days covered by the default window.
    pub const DEFAULT_WINDOW_DAYS: i64 = 70;

    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, InvalidDateRange> {
        if start > end {
            return Err(InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Default window ending at `today`.
    pub fn default_window(today: NaiveDate) -> Self {
        Self {
            start: today - Duration::days(Self::DEFAULT_WINDOW_DAYS),
            end: today,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket(problem_id: Option<u64>) -> Ticket {
        Ticket {
            id: 1,
            created_at: Utc::now(),
            ticket_type: Some("incident".to_string()),
            problem_id,
            subject: None,
        }
    }

    #[test]
    fn group_of_ticket_with_problem_id() {
        assert_eq!(ProblemGroup::of(&ticket(Some(42))), ProblemGroup::Problem(42));
    }

    #[test]
    fn group_of_ticket_without_problem_id() {
        assert_eq!(ProblemGroup::of(&ticket(None)), ProblemGroup::Unassigned);
    }

    #[test]
    fn group_display_uses_marker_for_unassigned() {
        assert_eq!(ProblemGroup::Problem(7).to_string(), "7");
        assert_eq!(ProblemGroup::Unassigned.to_string(), "NULL");
    }

    #[test]
    fn ticket_deserializes_null_problem_id() {
        let json = r#"{
            "id": 11,
            "created_at": "2024-03-01T09:30:00Z",
            "type": "incident",
            "problem_id": null,
            "subject": "Printer on fire"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert_eq!(ticket.id, 11);
        assert!(ticket.problem_id.is_none());
        assert_eq!(ticket.subject.as_deref(), Some("Printer on fire"));
    }

    #[test]
    fn ticket_deserializes_missing_optional_fields() {
        let json = r#"{"id": 12, "created_at": "2024-03-01T09:30:00Z"}"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.ticket_type.is_none());
        assert!(ticket.problem_id.is_none());
        assert!(ticket.subject.is_none());
    }

    #[test]
    fn date_range_rejects_inverted_bounds() {
        let start = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 4, 1).unwrap();
        let err = DateRange::new(start, end).unwrap_err();
        assert!(err.to_string().contains("2024-05-01"));
        assert!(err.to_string().contains("2024-04-01"));
    }

    #[test]
    fn date_range_accepts_single_day() {
        let day = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        let range = DateRange::new(day, day).unwrap();
        assert_eq!(range.start, range.end);
    }

    #[test]
    fn default_window_spans_70_days() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let range = DateRange::default_window(today);
        assert_eq!(range.end, today);
        assert_eq!((range.end - range.start).num_days(), 70);
    }
}
