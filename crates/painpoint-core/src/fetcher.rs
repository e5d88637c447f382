//! Content Fetcher: reads a pain point, its update ledger, and its
//! sub-pain-points from the content host.
//!
//! Every read degrades to `None` or an empty collection. A missing directory,
//! a 5xx, and a malformed file all look the same from here; the distinct cause
//! is logged by [`Fetched::into_option`]. Per-file fetches within a directory
//! run concurrently and are joined before anything is combined, so one bad file
//! never cancels its siblings.

use crate::client::{ContentClient, DirEntry, Fetched};
use crate::error::{PainPointError, Result};
use crate::ledger::{self, PainPointView};
use crate::paths;
use crate::record::{self, PainPointRecord, RawRecord, SubPainPoint, UpdateEvent};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// The main record file that was found, and its parsed contents.
#[derive(Debug, Clone, PartialEq)]
pub struct MainRecordFile {
    pub path: String,
    pub raw: RawRecord,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubPainPoints {
    pub sub_pain_points: Vec<SubPainPoint>,
    pub updates: Vec<UpdateEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PainPointSummary {
    pub slug: String,
    /// `None` when the folder has no readable main record.
    pub title: Option<String>,
}

// ---------------------------------------------------------------------------
// ContentFetcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ContentFetcher {
    client: ContentClient,
}

impl ContentFetcher {
    pub fn new(client: ContentClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ContentClient {
        &self.client
    }

    pub async fn fetch_directory(&self, path: &str) -> Option<Vec<DirEntry>> {
        self.client
            .list_directory(path)
            .await
            .into_option(&format!("directory {path}"))
    }

    /// Download and parse one listed file.
    async fn fetch_file(&self, entry: &DirEntry) -> Fetched<RawRecord> {
        let Some(url) = entry.download_url.as_deref() else {
            return Fetched::Malformed(format!("{} has no download url", entry.name));
        };
        match self.client.download(url).await {
            Fetched::Found(text) => match RawRecord::parse(&entry.name, &text) {
                Ok(raw) => Fetched::Found(raw),
                Err(e) => Fetched::Malformed(e.to_string()),
            },
            other => other.map(|_| RawRecord::default()),
        }
    }

    /// The main record in pain-point directory `dir`.
    ///
    /// The slug is the last path segment; the first of `<slug>.yaml`,
    /// `<slug>.yml`, `index.yaml`, `<slug>.json` present in the listing wins.
    pub async fn fetch_main_record(&self, dir: &str) -> Option<MainRecordFile> {
        let slug = dir.trim_end_matches('/').rsplit('/').next().unwrap_or(dir);
        let entries = self.fetch_directory(dir).await?;
        let entry = paths::main_record_candidates(slug)
            .iter()
            .find_map(|name| entries.iter().find(|e| e.is_file() && &e.name == name))?;
        let path = if entry.path.is_empty() {
            paths::join(&[dir, &entry.name])
        } else {
            entry.path.clone()
        };
        self.fetch_file(entry)
            .await
            .into_option(&format!("main record {path}"))
            .map(|raw| MainRecordFile { path, raw })
    }

    pub async fn fetch_update_events(&self, dir: &str, source_id: &str) -> Vec<UpdateEvent> {
        self.fetch_update_events_at(dir, source_id, Utc::now()).await
    }

    /// Events in `dir`; files without a date take `fetched_at`.
    async fn fetch_update_events_at(
        &self,
        dir: &str,
        source_id: &str,
        fetched_at: DateTime<Utc>,
    ) -> Vec<UpdateEvent> {
        let Some(entries) = self.fetch_directory(dir).await else {
            return Vec::new();
        };
        let fetches = entries
            .iter()
            .filter(|e| e.is_file() && paths::is_yaml_file(&e.name))
            .map(|entry| async move {
                self.fetch_file(entry)
                    .await
                    .into_option(&format!("update {dir}/{}", entry.name))
                    .map(|raw| UpdateEvent::from_raw(source_id, &entry.name, &raw, fetched_at))
            });
        let events: Vec<UpdateEvent> = join_all(fetches).await.into_iter().flatten().collect();
        tracing::debug!(dir = %dir, source_id = %source_id, count = events.len(), "fetched updates");
        events
    }

    pub async fn fetch_sub_pain_points(&self, content_root: &str, parent_slug: &str) -> SubPainPoints {
        self.fetch_sub_pain_points_at(content_root, parent_slug, Utc::now())
            .await
    }

    /// Files directly under `sub-pain-points/` are records; each subdirectory
    /// holds that sub-item's own `updates/` folder.
    async fn fetch_sub_pain_points_at(
        &self,
        content_root: &str,
        parent_slug: &str,
        fetched_at: DateTime<Utc>,
    ) -> SubPainPoints {
        let dir = paths::sub_pain_points_dir(content_root, parent_slug);
        let Some(entries) = self.fetch_directory(&dir).await else {
            return SubPainPoints::default();
        };

        // A sub-item named after its parent would share the parent's source id.
        let shares_parent = |name: &str| {
            let clash = name == parent_slug;
            if clash {
                tracing::warn!(
                    parent = %parent_slug,
                    entry = %name,
                    "sub-pain-point shares its parent's slug; skipped"
                );
            }
            clash
        };

        let records = entries
            .iter()
            .filter(|e| e.is_file() && paths::is_yaml_file(&e.name))
            .filter(|e| !shares_parent(paths::file_stem(&e.name)))
            .map(|entry| {
                let dir = &dir;
                async move {
                    let slug = paths::file_stem(&entry.name);
                    self.fetch_file(entry)
                        .await
                        .into_option(&format!("sub-pain-point {dir}/{}", entry.name))
                        .map(|raw| SubPainPoint::from_raw(slug, &raw))
                }
            });
        let updates = entries
            .iter()
            .filter(|e| e.is_dir() && !shares_parent(&e.name))
            .map(|entry| {
                let updates_dir = paths::join(&[&dir, &entry.name, paths::UPDATES_DIR]);
                async move {
                    self.fetch_update_events_at(&updates_dir, &entry.name, fetched_at)
                        .await
                }
            });

        let (records, updates) = futures::join!(join_all(records), join_all(updates));
        SubPainPoints {
            sub_pain_points: records.into_iter().flatten().collect(),
            updates: updates.into_iter().flatten().collect(),
        }
    }

    /// Time of the oldest revision touching `file_path`; now when unknown.
    pub async fn fetch_creation_date(&self, file_path: &str) -> DateTime<Utc> {
        self.client
            .oldest_commit_date(file_path)
            .await
            .into_option(&format!("history of {file_path}"))
            .unwrap_or_else(Utc::now)
    }

    /// Read and aggregate one pain point.
    ///
    /// A missing main record is [`PainPointError::NotFound`]; everything else
    /// that fails is left out of the view.
    pub async fn load_pain_point(&self, slug: &str) -> Result<PainPointView> {
        paths::validate_slug(slug)?;
        let fetched_at = Utc::now();
        let root = self.client.content_root();
        let dir = paths::pain_point_dir(root, slug);
        let updates_dir = paths::updates_dir(root, slug);

        let (main, main_events, subs) = futures::join!(
            self.fetch_main_record(&dir),
            self.fetch_update_events_at(&updates_dir, slug, fetched_at),
            self.fetch_sub_pain_points_at(root, slug, fetched_at)
        );

        let record = match main {
            Some(file) => {
                let created_at = self.fetch_creation_date(&file.path).await;
                Some(PainPointRecord::from_raw(slug, &file.raw, created_at))
            }
            None => None,
        };

        let view = ledger::aggregate(record, main_events, subs.updates)
            .ok_or_else(|| PainPointError::NotFound(slug.to_string()))?;
        tracing::info!(
            slug = %slug,
            demand = view.current_demand_score,
            progress = view.current_progress_score,
            updates = view.all_updates.len(),
            subs = subs.sub_pain_points.len(),
            "loaded pain point"
        );
        Ok(ledger::attach_sub_pain_points(view, subs.sub_pain_points))
    }

    /// Every folder under the content root whose name is a valid slug, with
    /// its title when readable.
    pub async fn list_pain_points(&self) -> Vec<PainPointSummary> {
        let root = self.client.content_root();
        let Some(entries) = self.fetch_directory(root).await else {
            return Vec::new();
        };
        let summaries = entries
            .iter()
            .filter(|e| e.is_dir())
            .filter(|e| match paths::validate_slug(&e.name) {
                Ok(()) => true,
                Err(_) => {
                    tracing::warn!(folder = %e.name, "folder name is not a valid slug; not listed");
                    false
                }
            })
            .map(|entry| {
                let dir = paths::pain_point_dir(root, &entry.name);
                async move {
                    let title = self
                        .fetch_main_record(&dir)
                        .await
                        .and_then(|file| file.raw.text(record::TITLE));
                    PainPointSummary {
                        slug: entry.name.clone(),
                        title,
                    }
                }
            });
        join_all(summaries).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
