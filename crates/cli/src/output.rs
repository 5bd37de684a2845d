//! Output formatting utilities

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use colored::Colorize;
use drift_lib::{DiffKind, DiffReport, DiffValue};
use serde::{Deserialize, Serialize};
use tabled::{settings::Style, Table, Tabled};

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text, one line per difference (default)
    #[default]
    Text,
    /// Coloured table
    Table,
    /// JSON document
    Json,
}

/// What was compared
pub struct RunInfo<'a> {
    pub namespace: &'a str,
    pub first_cluster: &'a str,
    pub second_cluster: &'a str,
}

/// Row for the differences table
#[derive(Tabled)]
struct DifferenceRow {
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Path")]
    path: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "First")]
    expected: String,
    #[tabled(rename = "Second")]
    actual: String,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    namespace: &'a str,
    first_cluster: &'a str,
    second_cluster: &'a str,
    generated_at: DateTime<Utc>,
    #[serde(flatten)]
    report: &'a DiffReport,
}

/// Print the report to stdout in the requested format
pub fn print_report(report: &DiffReport, format: OutputFormat, run: &RunInfo<'_>) -> Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", report.render_text().trim_end());
        }
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&JsonReport {
                namespace: run.namespace,
                first_cluster: run.first_cluster,
                second_cluster: run.second_cluster,
                generated_at: Utc::now(),
                report,
            })?;
            println!("{}", json);
        }
        OutputFormat::Table => print_table(report, run),
    }

    Ok(())
}

fn print_table(report: &DiffReport, run: &RunInfo<'_>) {
    println!("{}", "Namespace Drift".bold());
    println!("{}", "=".repeat(60));
    println!("Namespace: {}", run.namespace.cyan());
    println!("First:     {}", run.first_cluster.cyan());
    println!("Second:    {}", run.second_cluster.cyan());
    println!();

    if report.identical {
        print_success("OK");
        return;
    }

    let rows: Vec<DifferenceRow> = report
        .differences
        .iter()
        .map(|d| DifferenceRow {
            category: d.category.to_string(),
            path: d.path.clone(),
            kind: color_kind(d.kind),
            expected: format_value(&d.expected),
            actual: format_value(&d.actual),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{}", table);

    let summary: Vec<String> = report
        .summary()
        .iter()
        .map(|(category, n)| format!("{category}: {n}"))
        .collect();
    print_warning(&format!(
        "NOT OK: {} difference(s) ({})",
        report.differences.len(),
        summary.join(", ")
    ));
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

fn format_value(value: &DiffValue) -> String {
    match value {
        DiffValue::Absent => "-".dimmed().to_string(),
        other => other.to_string(),
    }
}

fn color_kind(kind: DiffKind) -> String {
    let label = kind.to_string();
    match kind {
        DiffKind::CountMismatch => label.magenta().to_string(),
        DiffKind::Changed => label.yellow().to_string(),
        DiffKind::Added => label.green().to_string(),
        DiffKind::Removed => label.red().to_string(),
    }
}
