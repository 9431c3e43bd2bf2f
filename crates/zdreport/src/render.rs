//! Terminal output for the generated report.

use std::path::Path;

use zdr_core::types::ReportRow;

/// Print the report rows in tabular format with a summary line.
pub fn print_report(rows: &[ReportRow], path: &Path) {
    println!("{:<12}  {:<40}  {:>9}", "PROBLEM ID", "SUBJECT", "INCIDENTS");
    println!("{}", "-".repeat(65));

    let mut total = 0;
    for row in rows {
        println!(
            "{:<12}  {:<40}  {:>9}",
            row.problem_id,
            truncate(&row.subject, 40),
            row.incidents,
        );
        total += row.incidents;
    }

    println!();
    println!("{} incident(s) across {} group(s)", total, rows.len());
    println!("Report written to {}", path.display());
}

/// Truncate long text for display, keeping char boundaries intact.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
