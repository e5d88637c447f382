use crate::output::print_json;
use chrono::{DateTime, Utc};
use clap::Args;
use painpoint_core::writer::{ContentWriter, NewUpdate, UpdateTarget};
use std::path::Path;

#[derive(Args)]
pub struct UpdateArgs {
    /// Pain point slug
    pub slug: String,
    /// Append to this sub-pain-point's ledger instead
    #[arg(long)]
    pub sub: Option<String>,
    /// What happened
    #[arg(long)]
    pub description: String,
    /// Change to the demand score
    #[arg(long = "demand", allow_negative_numbers = true)]
    pub demand_delta: Option<i64>,
    /// Change to the progress score
    #[arg(long = "progress", allow_negative_numbers = true)]
    pub progress_delta: Option<i64>,
    /// Event date (RFC 3339 or YYYY-MM-DD); defaults to now
    #[arg(long, value_parser = super::parse_date_arg)]
    pub date: Option<DateTime<Utc>>,
}

pub fn run(root: &Path, token: Option<String>, args: UpdateArgs, json: bool) -> anyhow::Result<()> {
    let writer = ContentWriter::new(super::client(root, token)?);
    let target = match args.sub {
        Some(sub) => UpdateTarget::SubPainPoint {
            parent: args.slug,
            slug: sub,
        },
        None => UpdateTarget::PainPoint(args.slug),
    };
    let new = NewUpdate {
        description: args.description,
        demand_delta: args.demand_delta,
        progress_delta: args.progress_delta,
        date: args.date,
    };
    let created = super::runtime()?.block_on(writer.append_update(&target, &new))?;

    if json {
        print_json(&created)?;
    } else {
        println!("Appended update to '{}' at {}", created.slug, created.path);
    }
    Ok(())
}
