use crate::record::{PainPointRecord, SubPainPoint, UpdateEvent};
use serde::{Deserialize, Serialize};

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 10;

/// Constrain a score to the inclusive range [0, 10].
pub fn clamp_score(value: i64) -> i64 {
    value.clamp(MIN_SCORE, MAX_SCORE)
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPainPointView {
    #[serde(flatten)]
    pub sub: SubPainPoint,
    pub current_demand_score: i64,
    pub current_progress_score: i64,
}

/// A pain point with its ledger folded in. Derived on every read, never stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPointView {
    pub record: PainPointRecord,
    pub current_demand_score: i64,
    pub current_progress_score: i64,
    #[serde(default)]
    pub sub_pain_points: Vec<SubPainPointView>,
    /// Main and sub-pain-point events, newest first.
    pub all_updates: Vec<UpdateEvent>,
}

impl PainPointView {
    pub fn slug(&self) -> &str {
        &self.record.slug
    }

    /// Title for an event's `source_id`: the parent, a sub-pain-point, or the raw id.
    pub fn source_title<'a>(&'a self, source_id: &'a str) -> &'a str {
        if source_id == self.record.slug {
            return &self.record.title;
        }
        self.sub_pain_points
            .iter()
            .find(|s| s.sub.slug == source_id)
            .map(|s| s.sub.title.as_str())
            .unwrap_or(source_id)
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// `(demand, progress)` after applying every event scoped to `source_id`.
pub fn current_scores(
    base_demand: i64,
    base_progress: i64,
    source_id: &str,
    events: &[UpdateEvent],
) -> (i64, i64) {
    let (demand, progress) = events
        .iter()
        .filter(|e| e.source_id == source_id)
        .fold((base_demand, base_progress), |(d, p), e| {
            (
                d.saturating_add(e.demand_delta.unwrap_or(0)),
                p.saturating_add(e.progress_delta.unwrap_or(0)),
            )
        });
    (clamp_score(demand), clamp_score(progress))
}

/// Fold a main record and its event streams into a view.
///
/// `None` when the record is absent: the pain point does not exist. Events are
/// concatenated main-first and stably sorted by date, newest first, so events
/// sharing a date keep their fetch order. Only events whose `source_id` is the
/// record's slug move the parent's scores.
pub fn aggregate(
    record: Option<PainPointRecord>,
    main_events: Vec<UpdateEvent>,
    sub_events: Vec<UpdateEvent>,
) -> Option<PainPointView> {
    let record = record?;

    let mut all_updates = main_events;
    all_updates.extend(sub_events);
    all_updates.sort_by(|a, b| b.date.cmp(&a.date));

    let (current_demand_score, current_progress_score) = current_scores(
        record.base_demand_score,
        record.base_progress_score,
        &record.slug,
        &all_updates,
    );

    Some(PainPointView {
        record,
        current_demand_score,
        current_progress_score,
        sub_pain_points: Vec::new(),
        all_updates,
    })
}

/// Attach sub-pain-points, each scored against its own events in the view.
pub fn attach_sub_pain_points(mut view: PainPointView, subs: Vec<SubPainPoint>) -> PainPointView {
    view.sub_pain_points = subs
        .into_iter()
        .map(|sub| {
            let (current_demand_score, current_progress_score) = current_scores(
                sub.base_demand_score,
                sub.base_progress_score,
                &sub.slug,
                &view.all_updates,
            );
            SubPainPointView {
                sub,
                current_demand_score,
                current_progress_score,
            }
        })
        .collect();
    view
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
