//! Progress lines and the final report table

use std::io::{self, Write};

use colored::Colorize;
use tabled::{
    builder::Builder,
    settings::{Alignment, Modify, Style, object::Rows},
};

use super::check::{CheckResult, CheckStatus};
use super::runner::HealthCheckReport;

/// Width cleared before the summary line replaces the progress line
const PADDING: usize = 50;

/// Prints the in-progress marker for a check, without a newline
pub fn print_started(label: &str) {
    print!(" {} {} ", CheckStatus::Pending.icon(), label);
    flush_stdout();
}

/// Replaces the progress marker with the check summary
pub fn print_done(result: &CheckResult) {
    print!("\r{}\r", " ".repeat(PADDING));
    println!("{}", format_summary(result));
    flush_stdout();
}

fn flush_stdout() {
    if let Err(e) = io::stdout().flush() {
        tracing::debug!(error = %e, "Failed to flush stdout");
    }
}

/// One line with status icon and label, then one indented line per message
pub fn format_summary(result: &CheckResult) -> String {
    let mut line = format!(" {}  {} ", result.status.icon(), result.label);
    for message in &result.messages {
        line.push_str(&format!("\n     ↳ {} {}", message.kind.icon(), message.text));
    }
    line
}

/// Formats a report as a pretty table
pub fn format_report(report: &HealthCheckReport) -> String {
    let mut builder = Builder::default();

    builder.push_record(["Check", "Status", "Duration", "Messages"]);

    for result in &report.results {
        let duration_str = format!("{:.2?}", result.duration);
        builder.push_record([
            result.label.to_string(),
            result.status.as_colored_str(),
            duration_str,
            result.messages.len().to_string(),
        ]);
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    let mut output = String::new();
    output.push_str(&table.to_string());
    output.push('\n');

    output.push_str(&format_totals(report));

    output
}

/// Formats the totals section of the report
fn format_totals(report: &HealthCheckReport) -> String {
    let mut summary = String::new();

    summary.push_str(&format!("\n{}\n", "Summary".bold().underline()));
    summary.push_str(&format!("  Total checks: {}\n", report.total));
    summary.push_str(&format!("  {} Passed: {}\n", "✓".green(), report.passed));

    if report.warned > 0 {
        summary.push_str(&format!("  {} Warned: {}\n", "⚠".yellow(), report.warned));
    }

    if report.failed > 0 {
        summary.push_str(&format!("  {} Failed: {}\n", "✗".red(), report.failed));
    }

    summary.push('\n');
    let overall = match report.overall_status() {
        CheckStatus::Fail => "Overall: FAIL".red().bold(),
        CheckStatus::Warning => "Overall: WARNING".yellow().bold(),
        CheckStatus::Ok | CheckStatus::Pending => "Overall: OK".green().bold(),
    };
    summary.push_str(&format!("  {}\n", overall));

    summary
}

/// Prints a report to stdout
pub fn print_report(report: &HealthCheckReport) {
    println!("\n{}", format_report(report));
}
