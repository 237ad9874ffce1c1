//! Renders scan results for the terminal or for other programs.
use crate::cli::OutputFormat;
use crate::record::MatchRecord;
use colored::*;
use serde::Serialize;
use std::path::Path;

pub const HEADERS: [&str; 4] = ["Occurrences #", "File", "Line #", "Line text"];

#[derive(Serialize)]
struct JsonReport<'a> {
    needle: &'a str,
    folder: &'a Path,
    total_records: usize,
    records: &'a [MatchRecord],
}

pub struct OutputFormatter {
    format: OutputFormat,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format_results(&self, records: &[MatchRecord], needle: &str, folder: &Path) -> String {
        match self.format {
            OutputFormat::Text => format_text(records),
            OutputFormat::Json => format_json(records, needle, folder),
            OutputFormat::Csv => format_csv(records),
        }
    }
}

/// The line column cell; filename matches have no line.
fn line_cell(record: &MatchRecord) -> String {
    record
        .line_number
        .map_or_else(|| "-".to_string(), |n| n.to_string())
}

fn format_text(records: &[MatchRecord]) -> String {
    if records.is_empty() {
        return "No matches found".yellow().to_string();
    }

    let file_width = records
        .iter()
        .map(|r| r.file.display().to_string().chars().count())
        .max()
        .unwrap_or(0)
        .max(HEADERS[1].len());

    let mut out = Vec::with_capacity(records.len() + 2);
    out.push(
        format!(
            "{:>13}  {:<file_width$}  {:>6}  {}",
            HEADERS[0], HEADERS[1], HEADERS[2], HEADERS[3]
        )
        .bold()
        .to_string(),
    );
    out.push("-".repeat(13 + 2 + file_width + 2 + 6 + 2 + 20).dimmed().to_string());

    for r in records {
        let file = format!("{:<file_width$}", r.file.display().to_string());
        let text = if r.is_file_name_match() {
            r.line_text.cyan().to_string()
        } else {
            r.line_text.clone()
        };
        out.push(format!(
            "{:>13}  {}  {:>6}  {}",
            r.occurrences.to_string().yellow().bold(),
            file.green(),
            line_cell(r),
            text
        ));
    }
    out.join("\n")
}

fn format_json(records: &[MatchRecord], needle: &str, folder: &Path) -> String {
    let report = JsonReport {
        needle,
        folder,
        total_records: records.len(),
        records,
    };
    serde_json::to_string_pretty(&report).unwrap_or_else(|e| format!("{{\"error\": \"{e}\"}}"))
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn format_csv(records: &[MatchRecord]) -> String {
    let mut out = vec![HEADERS.join(",")];
    for r in records {
        out.push(format!(
            "{},{},{},{}",
            r.occurrences,
            csv_field(&r.file.display().to_string()),
            line_cell(r),
            csv_field(&r.line_text)
        ));
    }
    out.join("\n")
}

/// One-line totals printed after the table.
pub fn summary(records: &[MatchRecord]) -> String {
    let name_hits = records.iter().filter(|r| r.is_file_name_match()).count();
    let occurrences: usize = records.iter().map(|r| r.occurrences).sum();
    format!(
        "{} {} records ({} in file names, {} occurrences)",
        "Found".green(),
        records.len(),
        name_hits,
        occurrences
    )
}
