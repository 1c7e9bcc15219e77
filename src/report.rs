//! Rendering of scan reports

use clap::ValueEnum;
use tabled::{Table, Tabled, settings::Style};

use crate::config::UP_TO_DATE_MESSAGE;
use crate::scan::outcome::{ScanEntry, ScanReport};

/// Output layout of the report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ReportFormat {
    /// Aligned table with a header row
    #[default]
    Table,
    /// One line per package
    Text,
}

#[derive(Tabled)]
struct ReportRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Type")]
    classification: String,
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Message")]
    message: String,
}

impl From<&ScanEntry> for ReportRow {
    fn from(entry: &ScanEntry) -> Self {
        Self {
            name: entry.package.name.clone(),
            classification: entry.classification.label().to_string(),
            source: entry.origin_label.clone().unwrap_or_default(),
            message: entry.outcome.message(),
        }
    }
}

pub fn render(report: &ScanReport, format: ReportFormat) -> String {
    match report {
        ScanReport::NothingToReport => UP_TO_DATE_MESSAGE.to_string(),
        ScanReport::Findings(entries) => match format {
            ReportFormat::Table => render_table(entries),
            ReportFormat::Text => render_text(entries),
        },
    }
}

fn render_table(entries: &[ScanEntry]) -> String {
    let rows: Vec<ReportRow> = entries.iter().map(ReportRow::from).collect();
    Table::new(rows).with(Style::psql()).to_string()
}

fn render_text(entries: &[ScanEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let row = ReportRow::from(entry);
            let prefix: Vec<&str> = [row.classification.as_str(), row.source.as_str()]
                .into_iter()
                .filter(|part| !part.is_empty())
                .collect();

            if prefix.is_empty() {
                format!("{}: {}", row.name, row.message)
            } else {
                format!("{} {}: {}", prefix.join(" "), row.name, row.message)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
