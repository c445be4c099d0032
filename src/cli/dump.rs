//! CLI entry-point for dumping candidate entities with their probabilities.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{instrument, warn};

use datasheet_eval::{
    candidates::{
        self,
        mapper::{EntityMapper, Relation},
    },
    config::Settings,
    data::probs::{self, ScoredEntity, WriteMode},
    entity::Attribute,
};

use crate::cli::PolicyArgs;

/// Args for the `dump` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSON-lines candidate export with per-candidate probabilities.
    #[arg(long)]
    pub candidates: PathBuf,
    /// Attribute the candidates describe.
    #[arg(long, value_enum)]
    pub attribute: Attribute,
    /// Output CSV; defaults to `<outputs>/<attr>_probs.csv`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Append to the output instead of replacing it.
    #[arg(long)]
    pub append: bool,
    #[command(flatten)]
    pub policy: PolicyArgs,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let policy = args.policy.resolve(&settings);
    let mapper = EntityMapper::new(Relation::single(args.attribute), &policy);
    let candidates = candidates::read_candidates(&args.candidates)
        .with_context(|| format!("reading {}", args.candidates.display()))?;

    let mut rows = Vec::new();
    for candidate in &candidates {
        match mapper.map(candidate) {
            Ok(entities) => rows.extend(entities.into_iter().map(|entity| ScoredEntity {
                entity,
                probability: candidate.probability,
            })),
            Err(err) => warn!(%err, "skipping candidate"),
        }
    }

    let out = args
        .out
        .clone()
        .unwrap_or_else(|| settings.join_output(format!("{}_probs.csv", args.attribute)));
    probs::write_probabilities(&out, &rows, args.attribute, WriteMode::from_append(args.append))?;
    Ok(())
}
