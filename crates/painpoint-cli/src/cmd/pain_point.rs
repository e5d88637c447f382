use crate::output::{print_fields, print_json, print_table};
use clap::Args;
use painpoint_core::fetcher::ContentFetcher;
use painpoint_core::ledger::{PainPointView, SubPainPointView};
use painpoint_core::view::{format_delta, timeline, ScoreBadge, TimelineEntry};
use painpoint_core::writer::{ContentWriter, NewPainPoint};
use painpoint_core::PainPointError;
use std::path::Path;

#[derive(Args)]
pub struct ShowArgs {
    pub slug: String,
    /// Show only this sub-pain-point and its updates
    #[arg(long)]
    pub sub: Option<String>,
}

#[derive(Args)]
pub struct CreateArgs {
    /// Pain point title
    #[arg(long)]
    pub title: String,
    /// Slug; derived from the title when omitted
    #[arg(long)]
    pub slug: Option<String>,
    #[arg(long, default_value = "")]
    pub inconvenience: String,
    #[arg(long, default_value = "")]
    pub workaround: String,
    #[arg(long, default_value = "")]
    pub limitation: String,
    /// Base demand score (0-10)
    #[arg(long = "demand", default_value_t = 0, allow_negative_numbers = true)]
    pub base_demand: i64,
    /// Base progress score (0-10)
    #[arg(long = "progress", default_value_t = 0, allow_negative_numbers = true)]
    pub base_progress: i64,
    /// Tag (repeatable: --tag billing --tag ux)
    #[arg(long = "tag")]
    pub tags: Vec<String>,
}

// ---------------------------------------------------------------------------
// list
// ---------------------------------------------------------------------------

pub fn list(root: &Path, token: Option<String>, json: bool) -> anyhow::Result<()> {
    let fetcher = ContentFetcher::new(super::client(root, token)?);
    let summaries = super::runtime()?.block_on(fetcher.list_pain_points());

    if json {
        return print_json(&summaries);
    }
    if summaries.is_empty() {
        println!("No pain points.");
        return Ok(());
    }
    let rows = summaries
        .into_iter()
        .map(|s| vec![s.slug, s.title.unwrap_or_else(|| "(unreadable)".to_string())])
        .collect();
    print_table(&["SLUG", "TITLE"], rows);
    Ok(())
}

// ---------------------------------------------------------------------------
// show
// ---------------------------------------------------------------------------

pub fn show(root: &Path, token: Option<String>, args: ShowArgs, json: bool) -> anyhow::Result<()> {
    let fetcher = ContentFetcher::new(super::client(root, token)?);
    let view = super::runtime()?.block_on(fetcher.load_pain_point(&args.slug))?;
    let entries = timeline(&view);

    if let Some(sub_slug) = args.sub {
        let Some(sub) = view.sub_pain_points.iter().find(|s| s.sub.slug == sub_slug) else {
            return Err(PainPointError::SubPainPointNotFound {
                parent: args.slug,
                slug: sub_slug,
            }
            .into());
        };
        let entries: Vec<_> = entries.into_iter().filter(|e| e.source_id == sub_slug).collect();
        if json {
            return print_json(&serde_json::json!({
                "parent": view.slug(),
                "subPainPoint": sub,
                "timeline": entries,
            }));
        }
        print_sub(sub);
        print_timeline(&entries);
        return Ok(());
    }

    if json {
        return print_json(&serde_json::json!({
            "view": view,
            "timeline": entries,
        }));
    }
    print_view(&view);
    print_timeline(&entries);
    Ok(())
}

fn score_cell(score: i64) -> String {
    format!("{score} ({})", ScoreBadge::for_score(score))
}

fn print_view(view: &PainPointView) {
    let r = &view.record;
    print_fields(&[
        ("title", r.title.clone()),
        ("slug", r.slug.clone()),
        ("created", r.created_at.format("%Y-%m-%d").to_string()),
        (
            "demand",
            format!("{} (base {})", score_cell(view.current_demand_score), r.base_demand_score),
        ),
        (
            "progress",
            format!("{} (base {})", score_cell(view.current_progress_score), r.base_progress_score),
        ),
        ("inconvenience", r.inconvenience.clone()),
        ("workaround", r.workaround.clone()),
        ("limitation", r.limitation.clone()),
        ("tags", r.tags.iter().cloned().collect::<Vec<_>>().join(", ")),
    ]);

    if !view.sub_pain_points.is_empty() {
        println!();
        let rows = view
            .sub_pain_points
            .iter()
            .map(|s| {
                vec![
                    s.sub.slug.clone(),
                    s.sub.title.clone(),
                    score_cell(s.current_demand_score),
                    score_cell(s.current_progress_score),
                ]
            })
            .collect();
        print_table(&["SUB", "TITLE", "DEMAND", "PROGRESS"], rows);
    }
}

fn print_sub(sub: &SubPainPointView) {
    print_fields(&[
        ("title", sub.sub.title.clone()),
        ("slug", sub.sub.slug.clone()),
        ("demand", score_cell(sub.current_demand_score)),
        ("progress", score_cell(sub.current_progress_score)),
        ("description", sub.sub.description.clone()),
    ]);
}

fn print_timeline(entries: &[TimelineEntry]) {
    println!();
    if entries.is_empty() {
        println!("No updates.");
        return;
    }
    let rows = entries
        .iter()
        .map(|e| {
            let date = e.date.format("%Y-%m-%d").to_string();
            vec![
                if e.date_inferred { format!("{date}?") } else { date },
                e.source_title.clone(),
                format_delta(e.demand_delta),
                format_delta(e.progress_delta),
                e.description.clone(),
            ]
        })
        .collect();
    print_table(&["DATE", "SOURCE", "DEMAND", "PROGRESS", "DESCRIPTION"], rows);
}

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

pub fn create(root: &Path, token: Option<String>, args: CreateArgs, json: bool) -> anyhow::Result<()> {
    let writer = ContentWriter::new(super::client(root, token)?);
    let new = NewPainPoint {
        slug: args.slug,
        title: args.title,
        inconvenience: args.inconvenience,
        workaround: args.workaround,
        limitation: args.limitation,
        base_demand_score: args.base_demand,
        base_progress_score: args.base_progress,
        tags: args.tags,
    };
    let created = super::runtime()?.block_on(writer.create_pain_point(&new))?;

    if json {
        print_json(&created)?;
    } else {
        println!("Created pain point '{}' at {}", created.slug, created.path);
    }
    Ok(())
}
