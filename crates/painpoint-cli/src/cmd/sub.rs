use crate::output::print_json;
use clap::Subcommand;
use painpoint_core::writer::{ContentWriter, NewSubPainPoint};
use std::path::Path;

#[derive(Subcommand)]
pub enum SubSubcommand {
    /// Create a sub-pain-point under a pain point
    Create {
        /// Parent pain point slug
        parent: String,
        #[arg(long)]
        title: String,
        /// Slug; derived from the title when omitted
        #[arg(long)]
        slug: Option<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Base demand score (0-10)
        #[arg(long = "demand", default_value_t = 0, allow_negative_numbers = true)]
        base_demand: i64,
        /// Base progress score (0-10)
        #[arg(long = "progress", default_value_t = 0, allow_negative_numbers = true)]
        base_progress: i64,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
}

pub fn run(
    root: &Path,
    token: Option<String>,
    subcmd: SubSubcommand,
    json: bool,
) -> anyhow::Result<()> {
    match subcmd {
        SubSubcommand::Create {
            parent,
            title,
            slug,
            description,
            base_demand,
            base_progress,
            tags,
        } => {
            let writer = ContentWriter::new(super::client(root, token)?);
            let new = NewSubPainPoint {
                slug,
                title,
                description,
                base_demand_score: base_demand,
                base_progress_score: base_progress,
                tags,
            };
            let created =
                super::runtime()?.block_on(writer.create_sub_pain_point(&parent, &new))?;
            if json {
                print_json(&created)?;
            } else {
                println!(
                    "Created sub-pain-point '{parent}/{}' at {}",
                    created.slug, created.path
                );
            }
            Ok(())
        }
    }
}
