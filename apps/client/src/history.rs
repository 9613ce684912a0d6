//! Durable record of past submissions. Entries are prepended and never edited.

use chrono::{DateTime, Local};
use civicflow_core::Report;
use serde::{Deserialize, Serialize};

const UNKNOWN_LOCATION: &str = "Unknown Location";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportStatus {
    #[default]
    Submitted,
    Pending,
    Solved,
}

impl ReportStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "📨 Submitted",
            ReportStatus::Pending => "⏳ Pending",
            ReportStatus::Solved => "✅ Solved",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Creation time in epoch milliseconds.
    pub id: i64,
    pub date: String,
    pub category: String,
    pub location: String,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl HistoryEntry {
    pub fn from_report(report: &Report, address: &str, now: DateTime<Local>) -> Self {
        let image_url = (!report.image_url.is_empty()).then(|| report.image_url.clone());

        Self {
            id: now.timestamp_millis(),
            date: now.format("%d/%m/%Y").to_string(),
            category: clean_text(&report.category),
            location: short_location(address),
            status: ReportStatus::Submitted,
            image_url,
        }
    }
}

/// Drops Markdown emphasis and heading markers the model sometimes emits.
pub fn clean_text(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '*' | '#')).collect()
}

/// First comma-separated segment of a geocoded address.
pub fn short_location(address: &str) -> String {
    address
        .split(',')
        .next()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(UNKNOWN_LOCATION)
        .to_string()
}
