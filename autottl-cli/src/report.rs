//! Plain-text and JSON rendering of CLI results

use autottl::{human_interval, SourceId, SourceStatus, SourceSummary};
use serde::Serialize;

/// Adjusted TTL of one source, as printed by `ttl`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TtlRow {
    pub id: SourceId,
    pub ttl: i64,
    pub status: SourceStatus,
    pub human: String,
}

impl TtlRow {
    pub fn new(id: SourceId, ttl: i64, status: SourceStatus) -> Self {
        Self {
            id,
            ttl,
            status,
            human: human_interval(ttl),
        }
    }
}

/// One ranked source, as printed by `stats`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatsRow {
    #[serde(flatten)]
    pub summary: SourceSummary,
    pub status: SourceStatus,
    pub human: String,
}

impl StatsRow {
    pub fn new(summary: SourceSummary, status: SourceStatus) -> Self {
        let human = human_interval(summary.avg_ttl);
        Self {
            summary,
            status,
            human,
        }
    }
}

pub fn render_ttl_rows(rows: &[TtlRow]) -> String {
    let mut out = String::new();
    for row in rows {
        out.push_str(&format!(
            "{:<16} {:>8}  {:<6}  {}\n",
            row.id,
            row.ttl,
            row.status,
            display_human(&row.human)
        ));
    }
    out
}

pub fn render_stats_rows(rows: &[StatsRow]) -> String {
    let mut out = format!(
        "{:<16} {:<24} {:>8}  {:<6}  {}\n",
        "ID", "NAME", "AVG", "STATUS", "INTERVAL"
    );
    for row in rows {
        out.push_str(&format!(
            "{:<16} {:<24} {:>8}  {:<6}  {}\n",
            row.summary.id,
            truncate(&row.summary.name, 24),
            row.summary.avg_ttl,
            row.status,
            display_human(&row.human)
        ));
    }
    out
}

pub fn render_json<T: Serialize>(rows: &[T]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(rows)
}

fn display_human(human: &str) -> &str {
    if human.is_empty() {
        "-"
    } else {
        human
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
        cut.push('…');
        cut
    }
}
