//! Append-only write path.
//!
//! Every operation creates exactly one new file on the content host. Nothing
//! here edits or deletes an existing file. Update files are named from the
//! write time at second resolution; two writes to the same ledger within one
//! second collide and the second is rejected upstream. Writers are expected to
//! be few per slug.

use crate::client::ContentClient;
use crate::error::{PainPointError, Result};
use crate::ledger::{MAX_SCORE, MIN_SCORE};
use crate::paths;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPainPoint {
    /// Derived from the title when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub inconvenience: String,
    #[serde(default)]
    pub workaround: String,
    #[serde(default)]
    pub limitation: String,
    #[serde(default)]
    pub base_demand_score: i64,
    #[serde(default)]
    pub base_progress_score: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSubPainPoint {
    #[serde(default)]
    pub slug: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub base_demand_score: i64,
    #[serde(default)]
    pub base_progress_score: i64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUpdate {
    pub description: String,
    #[serde(default)]
    pub demand_delta: Option<i64>,
    #[serde(default)]
    pub progress_delta: Option<i64>,
    /// Event date; the write time when omitted.
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
}

/// Which ledger an update is appended to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateTarget {
    PainPoint(String),
    SubPainPoint { parent: String, slug: String },
}

impl UpdateTarget {
    pub fn source_id(&self) -> &str {
        match self {
            UpdateTarget::PainPoint(slug) => slug,
            UpdateTarget::SubPainPoint { slug, .. } => slug,
        }
    }
}

/// A file written by the write path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Created {
    pub slug: String,
    pub path: String,
}

// ---------------------------------------------------------------------------
// File documents
// ---------------------------------------------------------------------------

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PainPointDocument<'a> {
    title: &'a str,
    inconvenience: &'a str,
    workaround: &'a str,
    limitation: &'a str,
    base_demand_score: i64,
    base_progress_score: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubPainPointDocument<'a> {
    title: &'a str,
    description: &'a str,
    base_demand_score: i64,
    base_progress_score: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tags: Vec<&'a str>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateDocument<'a> {
    date: String,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    demand_delta: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    progress_delta: Option<i64>,
}

// ---------------------------------------------------------------------------
// Validation helpers
// ---------------------------------------------------------------------------

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PainPointError::InvalidInput(format!("{field} is required")));
    }
    Ok(())
}

fn base_score(field: &str, value: i64) -> Result<i64> {
    if !(MIN_SCORE..=MAX_SCORE).contains(&value) {
        return Err(PainPointError::InvalidInput(format!(
            "{field} must be between {MIN_SCORE} and {MAX_SCORE}, got {value}"
        )));
    }
    Ok(value)
}

fn resolve_slug(explicit: Option<&str>, title: &str) -> Result<String> {
    let slug = match explicit.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => paths::slugify(title),
    };
    paths::validate_slug(&slug)?;
    Ok(slug)
}

/// A sub-pain-point's updates are keyed by its slug, so sharing the parent's
/// slug would fold them into the parent's scores.
fn distinct_from_parent(parent: &str, slug: &str) -> Result<()> {
    if parent == slug {
        return Err(PainPointError::InvalidInput(format!(
            "sub-pain-point slug '{slug}' must differ from its parent"
        )));
    }
    Ok(())
}

fn clean_tags(tags: &[String]) -> Vec<&str> {
    let mut out: Vec<&str> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .collect();
    out.sort_unstable();
    out.dedup();
    out
}

fn render_pain_point(new: &NewPainPoint) -> Result<String> {
    let doc = PainPointDocument {
        title: new.title.trim(),
        inconvenience: &new.inconvenience,
        workaround: &new.workaround,
        limitation: &new.limitation,
        base_demand_score: base_score("baseDemandScore", new.base_demand_score)?,
        base_progress_score: base_score("baseProgressScore", new.base_progress_score)?,
        tags: clean_tags(&new.tags),
    };
    Ok(serde_yaml::to_string(&doc)?)
}

fn render_sub_pain_point(new: &NewSubPainPoint) -> Result<String> {
    let doc = SubPainPointDocument {
        title: new.title.trim(),
        description: &new.description,
        base_demand_score: base_score("baseDemandScore", new.base_demand_score)?,
        base_progress_score: base_score("baseProgressScore", new.base_progress_score)?,
        tags: clean_tags(&new.tags),
    };
    Ok(serde_yaml::to_string(&doc)?)
}

fn render_update(new: &NewUpdate, written_at: DateTime<Utc>) -> Result<String> {
    let doc = UpdateDocument {
        date: new
            .date
            .unwrap_or(written_at)
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        description: new.description.trim(),
        demand_delta: new.demand_delta,
        progress_delta: new.progress_delta,
    };
    Ok(serde_yaml::to_string(&doc)?)
}

// ---------------------------------------------------------------------------
// ContentWriter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContentWriter {
    client: ContentClient,
}

impl ContentWriter {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    pub async fn create_pain_point(&self, new: &NewPainPoint) -> Result<Created> {
        required("title", &new.title)?;
        let slug = resolve_slug(new.slug.as_deref(), &new.title)?;
        let yaml = render_pain_point(new)?;
        let path = paths::main_record_path(self.client.content_root(), &slug);
        let path = self
            .client
            .put_file(&path, &yaml, &format!("Add pain point {slug}"))
            .await?;
        tracing::info!(slug = %slug, path = %path, "created pain point");
        Ok(Created { slug, path })
    }

    pub async fn create_sub_pain_point(
        &self,
        parent: &str,
        new: &NewSubPainPoint,
    ) -> Result<Created> {
        paths::validate_slug(parent)?;
        required("title", &new.title)?;
        let slug = resolve_slug(new.slug.as_deref(), &new.title)?;
        distinct_from_parent(parent, &slug)?;
        let yaml = render_sub_pain_point(new)?;
        let path = paths::sub_record_path(self.client.content_root(), parent, &slug);
        let path = self
            .client
            .put_file(&path, &yaml, &format!("Add sub-pain-point {parent}/{slug}"))
            .await?;
        tracing::info!(parent = %parent, slug = %slug, path = %path, "created sub-pain-point");
        Ok(Created { slug, path })
    }

    pub async fn append_update(&self, target: &UpdateTarget, new: &NewUpdate) -> Result<Created> {
        self.append_update_at(target, new, Utc::now()).await
    }

    /// Append an update whose file name is derived from `written_at`.
    pub async fn append_update_at(
        &self,
        target: &UpdateTarget,
        new: &NewUpdate,
        written_at: DateTime<Utc>,
    ) -> Result<Created> {
        required("description", &new.description)?;
        let root = self.client.content_root();
        let dir = match target {
            UpdateTarget::PainPoint(slug) => {
                paths::validate_slug(slug)?;
                paths::updates_dir(root, slug)
            }
            UpdateTarget::SubPainPoint { parent, slug } => {
                paths::validate_slug(parent)?;
                paths::validate_slug(slug)?;
                distinct_from_parent(parent, slug)?;
                paths::sub_updates_dir(root, parent, slug)
            }
        };
        let path = paths::join(&[&dir, &paths::update_file_name(written_at)]);
        let yaml = render_update(new, written_at)?;
        let source_id = target.source_id();
        let path = self
            .client
            .put_file(&path, &yaml, &format!("Add update to {source_id}"))
            .await?;
        tracing::info!(source_id = %source_id, path = %path, "appended update");
        Ok(Created {
            slug: source_id.to_string(),
            path,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
