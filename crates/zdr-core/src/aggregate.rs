//! Incidents-per-problem aggregation.
//!
//! Consumes the incident search stream, counts tickets per parent problem,
//! and builds the final labeled report rows.

use std::collections::BTreeMap;

use crate::types::{ProblemGroup, ReportRow, Ticket};

/// Sequential accumulator mapping problem tickets to incident counts.
///
/// `ingest` every ticket first, then `finalize` once to resolve subjects
/// and build the rows. Counts are kept per problem id, with a separate
/// bucket for incidents that have no linked problem.
#[derive(Debug, Default)]
pub struct IncidentAggregator {
    counts: BTreeMap<u64, u64>,
    unassigned: u64,
}

impl IncidentAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one incident against its parent problem, or against the
    /// unassigned bucket when it has none. An absent problem id is a
    /// normal case, not an error.
    pub fn ingest(&mut self, ticket: &Ticket) {
        match ProblemGroup::of(ticket) {
            ProblemGroup::Problem(id) => *self.counts.entry(id).or_insert(0) += 1,
            ProblemGroup::Unassigned => self.unassigned += 1,
        }
    }

    /// Total number of tickets ingested so far.
    pub fn total(&self) -> u64 {
        self.unassigned + self.counts.values().sum::<u64>()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Distinct problem ids seen so far, ascending. Each id appears once
    /// regardless of how many incidents reference it.
    pub fn problem_ids(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.keys().copied()
    }

    /// Build the final rows, resolving each problem's subject exactly once
    /// via `lookup`.
    ///
    /// Rows are ordered by ascending problem id. The unassigned row is
    /// always appended last, even at count 0, so the report shape is
    /// stable. The first lookup error aborts finalization; no rows are
    /// returned.
    pub fn finalize<E>(
        self,
        mut lookup: impl FnMut(u64) -> Result<String, E>,
    ) -> Result<Vec<ReportRow>, E> {
        let mut rows = Vec::with_capacity(self.counts.len() + 1);
        for (problem_id, incidents) in self.counts {
            let subject = lookup(problem_id)?;
            rows.push(ReportRow {
                problem_id: ProblemGroup::Problem(problem_id).to_string(),
                subject,
                incidents,
            });
        }
        let marker = ProblemGroup::Unassigned.to_string();
        rows.push(ReportRow {
            problem_id: marker.clone(),
            subject: marker,
            incidents: self.unassigned,
        });
        Ok(rows)
    }
}
