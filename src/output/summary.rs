use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::report::{ResourceTotals, Resources};

use super::styling::{bright, bright_green, bright_yellow, cyan, dim};
use super::tables::{amount_cell, create_table, cyan_header};

/// Prints the resource totals as a table to stdout.
pub fn print_resource_summary(totals: &ResourceTotals, collected_at: DateTime<Utc>) {
    println!("{}", render_resource_summary(totals, collected_at));
}

/// Prints the closing message of the job-run export to stdout.
pub fn print_export_summary(path: &std::path::Path, run_count: usize, project_count: usize) {
    println!(
        "{} {} {}\n  {} {}\n  {} {}\n  {} {}",
        bright("📄"),
        bright("Job run export").underlined(),
        bright_green("✓"),
        dim("File:"),
        cyan(path.display()),
        dim("Projects scanned:"),
        bright_yellow(project_count),
        dim("Job runs written:"),
        bright_yellow(run_count),
    );
    println!(
        "  {}",
        dim("Sorted by user, created-at, project name and job name")
    );
}

fn add_section_header(output: &mut String, emoji: &str, title: &str) {
    let _ = writeln!(output, "{} {}", bright(emoji), bright(title).underlined());
}

// Rounded to a millionth to hide float noise, so small model totals stay visible.
fn format_amount(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    format!("{rounded}")
}

fn add_row(table: &mut comfy_table::Table, label: &str, resources: &Resources) {
    table.add_row(vec![
        comfy_table::Cell::new(label),
        amount_cell(format_amount(resources.cpu)),
        amount_cell(format_amount(resources.memory)),
        amount_cell(resources.gpu),
    ]);
}

fn render_resource_summary(totals: &ResourceTotals, collected_at: DateTime<Utc>) -> String {
    let mut output = String::new();

    add_section_header(&mut output, "📊", "Resource Consumption Across All Projects");
    let _ = writeln!(
        output,
        "  {} {}\n",
        dim("Collected at:"),
        dim(collected_at.format("%Y-%m-%d %H:%M UTC"))
    );

    let mut table = create_table();
    table.set_header(cyan_header(&["Category", "CPU (cores)", "Memory (GB)", "GPU (units)"]));
    add_row(&mut table, "Jobs", &totals.jobs);
    add_row(&mut table, "Applications", &totals.applications);
    add_row(&mut table, "Models", &totals.models);
    add_row(&mut table, "Total (jobs + applications)", &totals.total);

    let _ = writeln!(output, "{table}");
    let _ = writeln!(
        output,
        "  {}",
        dim("Model resources are reported separately and not included in the total.")
    );

    output
}

/// Serializes the totals for `--format json`.
pub fn render_resource_json(totals: &ResourceTotals) -> serde_json::Result<String> {
    serde_json::to_string_pretty(totals)
}
