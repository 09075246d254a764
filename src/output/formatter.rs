//! Output formatters for report data
//!
//! Renders report rows as an aligned table, JSON or CSV, and smoke run
//! outcomes as a summary box.

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::{ActionType, ReportData};
use crate::smoke::SmokeOutcome;

/// Widest a table cell may get before it is truncated
const MAX_CELL_WIDTH: usize = 32;

/// Output format options
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    JsonPretty,
    Csv,
}

impl OutputFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "table" => Some(OutputFormat::Table),
            "json" => Some(OutputFormat::Json),
            "json-pretty" | "jsonpretty" => Some(OutputFormat::JsonPretty),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

/// Report formatter
pub struct ReportFormatter {
    format: OutputFormat,
    colorize: bool,
}

impl ReportFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self {
            format,
            colorize: true,
        }
    }

    /// Enable or disable ANSI colours (off when stdout is not a terminal)
    pub fn with_color(mut self, enabled: bool) -> Self {
        self.colorize = enabled;
        self
    }

    /// Format the rows of a report
    pub fn format_report(&self, action: ActionType, data: &ReportData) -> Result<String> {
        let mut records = data.records(action);
        if records.is_empty() {
            records = data.any_records();
        }

        match self.format {
            OutputFormat::Table => Ok(self.format_table(action, records)),
            OutputFormat::Json => serde_json::to_string(data).context("Failed to encode report"),
            OutputFormat::JsonPretty => {
                serde_json::to_string_pretty(data).context("Failed to encode report")
            }
            OutputFormat::Csv => format_csv(records),
        }
    }

    fn format_table(&self, action: ActionType, records: &[Value]) -> String {
        if records.is_empty() {
            return format!("No {} records fetched.\n", action.name().to_lowercase());
        }

        let columns = collect_columns(records);
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| truncate(&cell(record, column), MAX_CELL_WIDTH))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].chars().count())
                    .chain(std::iter::once(column.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut output = String::new();
        let border = |left: &str, mid: &str, right: &str| {
            let segments: Vec<String> = widths.iter().map(|w| "─".repeat(w + 2)).collect();
            format!("{left}{}{right}\n", segments.join(mid))
        };

        output.push_str(&format!("\n{} ({} rows)\n", action.name(), records.len()));
        output.push_str(&border("┌", "┬", "┐"));
        output.push_str(&format_row(&columns, &widths));
        output.push_str(&border("├", "┼", "┤"));
        for row in &rows {
            output.push_str(&format_row(row, &widths));
        }
        output.push_str(&border("└", "┴", "┘"));

        output
    }

    /// Format the outcomes of a smoke run
    pub fn format_smoke(&self, outcomes: &[SmokeOutcome]) -> String {
        match self.format {
            OutputFormat::Json => serde_json::to_string(outcomes).unwrap_or_default(),
            OutputFormat::JsonPretty => serde_json::to_string_pretty(outcomes).unwrap_or_default(),
            OutputFormat::Table | OutputFormat::Csv => self.format_smoke_table(outcomes),
        }
    }

    fn format_smoke_table(&self, outcomes: &[SmokeOutcome]) -> String {
        let mut output = String::new();

        output.push_str("\n╔══════════════════════════════════════════════════════════════╗\n");
        output.push_str("║  FRG smoke run                                               ║\n");
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");

        for outcome in outcomes {
            let status = match (&outcome.error, self.colorize) {
                (None, true) => "\x1b[32m✓ PASS\x1b[0m",
                (None, false) => "✓ PASS",
                (Some(_), true) => "\x1b[31m✗ FAIL\x1b[0m",
                (Some(_), false) => "✗ FAIL",
            };
            output.push_str(&format!(
                "║  {:28} {} {:5} rows [{:>6}ms]\n",
                outcome.action.name(),
                status,
                outcome.records,
                outcome.duration_ms
            ));
            if let Some(error) = &outcome.error {
                output.push_str(&format!("║      {}\n", truncate(error, 56)));
            }
        }

        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        output.push_str("╠══════════════════════════════════════════════════════════════╣\n");
        output.push_str(&format!(
            "║  Total: {:2} | Pass: {:2} | Fail: {:2}\n",
            outcomes.len(),
            outcomes.len() - failed,
            failed
        ));
        output.push_str("╚══════════════════════════════════════════════════════════════╝\n");

        output
    }
}

fn format_row(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| {
            let pad = width.saturating_sub(cell.chars().count());
            format!(" {cell}{} ", " ".repeat(pad))
        })
        .collect();
    format!("│{}│\n", padded.join("│"))
}

/// Union of the top-level keys of all records, in first-seen order
fn collect_columns(records: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        match record {
            Value::Object(map) => {
                for key in map.keys() {
                    if !columns.contains(key) {
                        columns.push(key.clone());
                    }
                }
            }
            _ => {
                if !columns.iter().any(|c| c == "value") {
                    columns.push("value".to_string());
                }
            }
        }
    }
    columns
}

fn cell(record: &Value, column: &str) -> String {
    let value = match record {
        Value::Object(map) => map.get(column).unwrap_or(&Value::Null),
        other if column == "value" => other,
        _ => &Value::Null,
    };
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{kept}...")
}

fn format_csv(records: &[Value]) -> Result<String> {
    let columns = collect_columns(records);
    let mut writer = csv::Writer::from_writer(Vec::new());

    if !columns.is_empty() {
        writer
            .write_record(&columns)
            .context("Failed to write CSV header")?;
    }
    for record in records {
        let row: Vec<String> = columns.iter().map(|c| cell(record, c)).collect();
        writer
            .write_record(&row)
            .context("Failed to write CSV row")?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV output: {e}"))?;
    String::from_utf8(bytes).context("CSV output is not UTF-8")
}
