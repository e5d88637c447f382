//! Read-only display projections over a [`PainPointView`].

use crate::ledger::PainPointView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Display band for a 0..=10 score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBadge {
    Low,
    Medium,
    High,
}

impl ScoreBadge {
    pub fn for_score(score: i64) -> Self {
        match score {
            i64::MIN..=3 => ScoreBadge::Low,
            4..=6 => ScoreBadge::Medium,
            _ => ScoreBadge::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreBadge::Low => "low",
            ScoreBadge::Medium => "medium",
            ScoreBadge::High => "high",
        }
    }
}

impl fmt::Display for ScoreBadge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelineEntry {
    pub source_id: String,
    /// Title of the pain point or sub-pain-point the event belongs to.
    pub source_title: String,
    /// True when the event belongs to a sub-pain-point.
    pub is_sub: bool,
    pub date: DateTime<Utc>,
    pub date_inferred: bool,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub demand_delta: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_delta: Option<i64>,
}

/// The view's events in display order, each labelled with its source.
pub fn timeline(view: &PainPointView) -> Vec<TimelineEntry> {
    view.all_updates
        .iter()
        .map(|e| TimelineEntry {
            source_id: e.source_id.clone(),
            source_title: view.source_title(&e.source_id).to_string(),
            is_sub: e.source_id != view.slug(),
            date: e.date,
            date_inferred: e.date_inferred,
            description: e.description.clone(),
            demand_delta: e.demand_delta,
            progress_delta: e.progress_delta,
        })
        .collect()
}

/// Signed delta for display: `+3`, `-1`, or empty when absent.
pub fn format_delta(delta: Option<i64>) -> String {
    match delta {
        Some(d) if d > 0 => format!("+{d}"),
        Some(d) => d.to_string(),
        None => String::new(),
    }
}
