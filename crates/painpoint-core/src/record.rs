//! Permissive parsing of human-edited pain-point files.
//!
//! Content files are YAML (or JSON for legacy main records) written by hand, so
//! nothing here rejects a file for a bad field. Missing or unparsable numbers
//! become 0, missing text becomes empty, and an unreadable date falls back to
//! the time of the read.

use crate::error::{PainPointError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Field aliases
// ---------------------------------------------------------------------------

pub const TITLE: &[&str] = &["title", "name"];
const DESCRIPTION: &[&str] = &["description", "summary"];
const INCONVENIENCE: &[&str] = &["inconvenience"];
const WORKAROUND: &[&str] = &["workaround"];
const LIMITATION: &[&str] = &["limitation"];
const BASE_DEMAND: &[&str] = &["baseDemandScore", "base_demand_score", "demandScore", "demand_score"];
const BASE_PROGRESS: &[&str] = &[
    "baseProgressScore",
    "base_progress_score",
    "progressScore",
    "progress_score",
];
const DEMAND_DELTA: &[&str] = &["demandDelta", "demand_delta"];
const PROGRESS_DELTA: &[&str] = &["progressDelta", "progress_delta"];
const DATE: &[&str] = &["date", "createdAt", "created_at"];
const TAGS: &[&str] = &["tags"];

// ---------------------------------------------------------------------------
// RawRecord
// ---------------------------------------------------------------------------

/// An untyped key/value document as read from the content host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord(Mapping);

impl RawRecord {
    pub fn from_yaml(text: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(text)?;
        Self::from_value(value)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        Self::from_value(value)
    }

    /// Parse by file extension: `.json` as JSON, anything else as YAML.
    pub fn parse(file_name: &str, text: &str) -> Result<Self> {
        if file_name.ends_with(".json") {
            Self::from_json(text)
        } else {
            Self::from_yaml(text)
        }
    }

    fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Mapping(map) => Ok(Self(map)),
            Value::Tagged(tagged) => Self::from_value(tagged.value),
            other => Err(PainPointError::InvalidInput(format!(
                "expected a mapping at document root, found {}",
                kind(&other)
            ))),
        }
    }

    /// First non-null value among `keys`.
    pub fn get(&self, keys: &[&str]) -> Option<&Value> {
        keys.iter()
            .filter_map(|k| self.0.get(*k))
            .find(|v| !v.is_null())
    }

    pub fn text(&self, keys: &[&str]) -> Option<String> {
        match self.get(keys)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// A score field: absent or unparsable reads as 0.
    pub fn score(&self, keys: &[&str]) -> i64 {
        self.get(keys).map(coerce_number).unwrap_or(0)
    }

    /// A delta field: absent reads as `None`, present but unparsable as `Some(0)`.
    pub fn delta(&self, keys: &[&str]) -> Option<i64> {
        self.get(keys).map(coerce_number)
    }

    pub fn date(&self, keys: &[&str]) -> Option<DateTime<Utc>> {
        self.get(keys).and_then(parse_date)
    }

    /// Tags as a YAML list, or a comma-separated string.
    pub fn tags(&self) -> BTreeSet<String> {
        let scalar = |v: &Value| match v {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        let tags: BTreeSet<String> = match self.get(TAGS) {
            Some(Value::Sequence(items)) => items.iter().filter_map(scalar).collect(),
            Some(Value::String(s)) => s.split(',').map(|t| t.trim().to_string()).collect(),
            _ => BTreeSet::new(),
        };
        tags.into_iter().filter(|t| !t.is_empty()).collect()
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Lenient numeric read: integers as-is, floats rounded, numeric strings parsed,
/// everything else 0.
pub fn coerce_number(value: &Value) -> i64 {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().and_then(round_finite))
            .unwrap_or(0),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(round_finite))
                .unwrap_or(0)
        }
        Value::Tagged(tagged) => coerce_number(&tagged.value),
        _ => 0,
    }
}

fn round_finite(f: f64) -> Option<i64> {
    // `as` saturates at the i64 bounds.
    f.is_finite().then(|| f.round() as i64)
}

/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DDTHH:MM:SS` (UTC) and
/// bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(value: &Value) -> Option<DateTime<Utc>> {
    let s = match value {
        Value::String(s) => s.trim(),
        _ => return None,
    };
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

// ---------------------------------------------------------------------------
// PainPointRecord
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPointRecord {
    pub slug: String,
    pub title: String,
    pub inconvenience: String,
    pub workaround: String,
    pub limitation: String,
    pub base_demand_score: i64,
    pub base_progress_score: i64,
    pub tags: BTreeSet<String>,
    /// First-write time on the content host.
    pub created_at: DateTime<Utc>,
}

impl PainPointRecord {
    /// Build from a raw main-record document. A missing title falls back to the slug.
    pub fn from_raw(slug: &str, raw: &RawRecord, created_at: DateTime<Utc>) -> Self {
        Self {
            slug: slug.to_string(),
            title: raw.text(TITLE).unwrap_or_else(|| slug.to_string()),
            inconvenience: raw.text(INCONVENIENCE).unwrap_or_default(),
            workaround: raw.text(WORKAROUND).unwrap_or_default(),
            limitation: raw.text(LIMITATION).unwrap_or_default(),
            base_demand_score: raw.score(BASE_DEMAND),
            base_progress_score: raw.score(BASE_PROGRESS),
            tags: raw.tags(),
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// SubPainPoint
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPainPoint {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub base_demand_score: i64,
    pub base_progress_score: i64,
    pub tags: BTreeSet<String>,
}

impl SubPainPoint {
    pub fn from_raw(slug: &str, raw: &RawRecord) -> Self {
        Self {
            slug: slug.to_string(),
            title: raw.text(TITLE).unwrap_or_else(|| slug.to_string()),
            description: raw.text(DESCRIPTION).unwrap_or_default(),
            base_demand_score: raw.score(BASE_DEMAND),
            base_progress_score: raw.score(BASE_PROGRESS),
            tags: raw.tags(),
        }
    }
}

// ---------------------------------------------------------------------------
// UpdateEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEvent {
    /// Slug of the pain point or sub-pain-point this event belongs to.
    pub source_id: String,
    pub file_name: String,
    pub date: DateTime<Utc>,
    /// True when the file carried no readable date and `date` is the read time.
    #[serde(default)]
    pub date_inferred: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_delta: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress_delta: Option<i64>,
}

impl UpdateEvent {
    pub fn from_raw(
        source_id: &str,
        file_name: &str,
        raw: &RawRecord,
        fetched_at: DateTime<Utc>,
    ) -> Self {
        let parsed = raw.date(DATE);
        Self {
            source_id: source_id.to_string(),
            file_name: file_name.to_string(),
            date: parsed.unwrap_or(fetched_at),
            date_inferred: parsed.is_none(),
            description: raw.text(DESCRIPTION).unwrap_or_default(),
            demand_delta: raw.delta(DEMAND_DELTA),
            progress_delta: raw.delta(PROGRESS_DELTA),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn non_numeric_score_reads_as_zero() {
        let raw = RawRecord::from_yaml("title: Slow sync\nbaseDemandScore: TBD\n").unwrap();
        let record = PainPointRecord::from_raw("slow-sync", &raw, now());
        assert_eq!(record.base_demand_score, 0);
        assert_eq!(record.base_progress_score, 0);
    }

    #[test]
    fn numeric_strings_and_floats_are_coerced() {
        let raw = RawRecord::from_yaml(
            "baseDemandScore: \"7\"\nbaseProgressScore: 2.6\ndemandDelta: \"+2\"\nprogressDelta: \"-1.4\"\n",
        )
        .unwrap();
        assert_eq!(raw.score(BASE_DEMAND), 7);
        assert_eq!(raw.score(BASE_PROGRESS), 3);
        assert_eq!(raw.delta(DEMAND_DELTA), Some(2));
        assert_eq!(raw.delta(PROGRESS_DELTA), Some(-1));
    }

    #[test]
    fn snake_case_aliases_are_read() {
        let raw = RawRecord::from_yaml("base_demand_score: 4\nprogress_delta: 3\n").unwrap();
        assert_eq!(raw.score(BASE_DEMAND), 4);
        assert_eq!(raw.delta(PROGRESS_DELTA), Some(3));
    }

    #[test]
    fn optional_text_defaults_to_empty() {
        let raw = RawRecord::from_yaml("title: PDF export\nworkaround: print to file\n").unwrap();
        let record = PainPointRecord::from_raw("pdf-export", &raw, now());
        assert_eq!(record.title, "PDF export");
        assert_eq!(record.workaround, "print to file");
        assert_eq!(record.inconvenience, "");
        assert_eq!(record.limitation, "");
        assert_eq!(record.created_at, now());
    }

    #[test]
    fn tags_from_list_or_csv() {
        let list = RawRecord::from_yaml("tags: [billing, ux, billing]\n").unwrap();
        assert_eq!(list.tags().into_iter().collect::<Vec<_>>(), ["billing", "ux"]);
        let csv = RawRecord::from_yaml("tags: \"ux, , mobile\"\n").unwrap();
        assert_eq!(csv.tags().into_iter().collect::<Vec<_>>(), ["mobile", "ux"]);
    }

    #[test]
    fn json_main_record() {
        let raw = RawRecord::parse("p1.json", r#"{"title": "Legacy", "baseDemandScore": 3}"#).unwrap();
        let record = PainPointRecord::from_raw("p1", &raw, now());
        assert_eq!(record.title, "Legacy");
        assert_eq!(record.base_demand_score, 3);
    }

    #[test]
    fn non_mapping_document_is_rejected() {
        assert!(RawRecord::from_yaml("- just\n- a list\n").is_err());
        assert!(RawRecord::from_yaml("key: [unclosed").is_err());
    }

    #[test]
    fn update_event_dates() {
        let raw = RawRecord::from_yaml("date: 2024-02-01\ndescription: shipped beta\ndemandDelta: -1\n")
            .unwrap();
        let event = UpdateEvent::from_raw("p1", "update-a.yaml", &raw, now());
        assert_eq!(event.date, Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap());
        assert!(!event.date_inferred);
        assert_eq!(event.demand_delta, Some(-1));
        assert_eq!(event.progress_delta, None);

        let rfc = RawRecord::from_yaml("date: \"2024-02-01T10:30:00+02:00\"\n").unwrap();
        let event = UpdateEvent::from_raw("p1", "update-b.yaml", &rfc, now());
        assert_eq!(event.date, Utc.with_ymd_and_hms(2024, 2, 1, 8, 30, 0).unwrap());
    }

    #[test]
    fn missing_date_falls_back_to_read_time() {
        let raw = RawRecord::from_yaml("description: no date here\n").unwrap();
        let event = UpdateEvent::from_raw("s1", "update-c.yaml", &raw, now());
        assert_eq!(event.date, now());
        assert!(event.date_inferred);
    }

    #[test]
    fn sub_pain_point_from_raw() {
        let raw = RawRecord::from_yaml("title: Offline mode\ndescription: no cache\nbaseDemandScore: 1\n")
            .unwrap();
        let sub = SubPainPoint::from_raw("s1", &raw);
        assert_eq!(sub.slug, "s1");
        assert_eq!(sub.title, "Offline mode");
        assert_eq!(sub.base_demand_score, 1);
    }
}
