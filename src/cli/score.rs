//! CLI entry-point for sweeping a candidate export against gold.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{debug, info, instrument, warn};

use datasheet_eval::{
    candidates::{self, mapper::EntityMapper},
    config::Settings,
    data::{gold, probs::WriteMode},
    report::{self, Mismatch, ScoreSummary},
    scoring::sweep::{self, SweepConfig},
};

use crate::cli::{self as shared, PolicyArgs, RelationArgs};

/// Args for the `score` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// JSON-lines candidate export with per-candidate probabilities.
    #[arg(long)]
    pub candidates: PathBuf,
    /// Gold CSV files (comma separated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub gold: Vec<PathBuf>,
    /// PDF directory or filename CSV restricting the scored corpus.
    #[arg(long)]
    pub documents: Option<PathBuf>,
    #[command(flatten)]
    pub relation: RelationArgs,
    #[command(flatten)]
    pub policy: PolicyArgs,
    /// Override the number of thresholds swept.
    #[arg(long)]
    pub points: Option<usize>,
    /// Discrepancy report path; defaults to `<outputs>/<attr>_discrepancies.csv`.
    #[arg(long)]
    pub discrepancies: Option<PathBuf>,
    /// Append to the discrepancy report instead of replacing it.
    #[arg(long)]
    pub append: bool,
    /// Print a JSON summary to stdout.
    #[arg(long)]
    pub json: bool,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let policy = args.policy.resolve(&settings);
    let config = SweepConfig {
        points: args.points.unwrap_or(settings.sweep.points),
    };
    let label = args.relation.label();

    let documents = shared::load_documents(args.documents.as_deref())?;
    let gold = shared::load_gold(&args.gold, &args.relation, documents.as_ref(), &policy)?;
    let candidates = candidates::read_candidates(&args.candidates)
        .with_context(|| format!("reading {}", args.candidates.display()))?;
    let candidates: Vec<_> = match &documents {
        Some(docs) => candidates
            .into_iter()
            .filter(|c| docs.contains(&c.document.to_uppercase()))
            .collect(),
        None => candidates,
    };
    info!(candidates = candidates.len(), gold = gold.len(), "scoring candidates");

    let mapper = EntityMapper::new(args.relation.relation(), &policy);
    let outcome = sweep::sweep(
        &candidates,
        |c| c.probability,
        |c| mapper.map(c),
        &gold,
        &config,
    )?;
    if let Some(reason) = &outcome.aborted {
        warn!(%reason, evaluated = outcome.evaluated, "sweep stopped early");
    }

    report::log_score(&label, outcome.threshold, &outcome.score);
    for entity in &outcome.score.false_positives {
        let sources: Vec<f64> = mapper
            .candidates_for(entity, &candidates)
            .iter()
            .map(|c| c.probability)
            .collect();
        debug!(%entity, probabilities = ?sources, "false positive sources");
    }
    if args.json {
        println!("{}", ScoreSummary::from_outcome(&label, &outcome).to_json()?);
    }

    let path = args
        .discrepancies
        .clone()
        .unwrap_or_else(|| settings.join_output(format!("{label}_discrepancies.csv")));
    report::write_discrepancies(
        &path,
        &outcome.score.false_positives,
        Mismatch::FalsePositive,
        &gold::values_by_document(gold.iter()),
        WriteMode::from_append(args.append),
    )?;
    report::write_discrepancies(
        &path,
        &outcome.score.false_negatives,
        Mismatch::FalseNegative,
        &gold::values_by_document(&outcome.predictions),
        WriteMode::Append,
    )?;
    Ok(())
}
