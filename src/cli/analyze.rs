//! CLI entry-point for the dev/test/analysis probability-dump sweep.

use std::{
    collections::HashSet,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use datasheet_eval::{
    config::Settings,
    data::{
        documents,
        gold::{self, GoldPolicy, GoldSet},
        probs::{self, ScoredEntity, WriteMode},
    },
    entity::Attribute,
    report::{self, Mismatch, ScoreSummary},
    scoring::sweep::{self, SweepConfig, SweepOutcome},
};

/// Args for the `analyze` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Attribute the probability dumps hold.
    #[arg(long, value_enum, default_value = "typ_gbp")]
    pub attribute: Attribute,
    /// Dev probability dump; defaults to `<data>/<attr>_dev_probs.csv`.
    #[arg(long)]
    pub dev_probs: Option<PathBuf>,
    /// Test probability dump; defaults to `<data>/<attr>_test_probs.csv`.
    #[arg(long)]
    pub test_probs: Option<PathBuf>,
    /// Analysis discrepancy report; defaults to `<outputs>/<attr>_analysis_discrepancies.csv`.
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Override the number of thresholds swept.
    #[arg(long)]
    pub points: Option<usize>,
    /// Do not admit the doubled value of `±x` gold readings.
    #[arg(long)]
    pub no_plus_minus_doubling: bool,
    /// Print JSON summaries to stdout.
    #[arg(long)]
    pub json: bool,
}

fn file_stem(attribute: Attribute) -> &'static str {
    match attribute {
        Attribute::TypGbp => "gain",
        Attribute::TypSupplyCurrent => "current",
        other => other.as_str(),
    }
}

struct Split {
    name: &'static str,
    gold: GoldSet,
    rows: Vec<ScoredEntity>,
}

fn load_split(
    settings: &Settings,
    name: &'static str,
    probs_path: PathBuf,
    attribute: Attribute,
    policy: &GoldPolicy,
) -> Result<Split> {
    let filenames = documents::filenames_from_dir(&settings.join_data(format!("{name}/pdf")))
        .with_context(|| format!("listing {name} pdfs"))?;
    let gold = gold::load_attribute_gold(
        &[settings.join_data(format!("{name}/{name}_gold.csv"))],
        attribute,
        None,
        policy,
    )?
    .filter_documents(&filenames)
    .ensure_non_empty()?;
    let rows = probs::read_probabilities(&probs_path, attribute)
        .with_context(|| format!("reading {}", probs_path.display()))?;
    Ok(Split { name, gold, rows })
}

fn sweep_rows(rows: &[ScoredEntity], gold: &GoldSet, config: &SweepConfig) -> Result<SweepOutcome> {
    Ok(sweep::sweep(
        rows,
        |row| row.probability,
        |row| Ok(vec![row.entity.clone()]),
        gold,
        config,
    )?)
}

fn report_split(
    label: &str,
    outcome: &SweepOutcome,
    gold: &GoldSet,
    json: bool,
) -> Result<()> {
    info!(
        documents = documents::documents_of(&outcome.predictions).len(),
        "entity set size"
    );
    info!(documents = gold.documents().len(), "gold set size");
    report::log_score(label, outcome.threshold, &outcome.score);
    if json {
        println!("{}", ScoreSummary::from_outcome(label, outcome).to_json()?);
    }
    Ok(())
}

fn write_report(path: &Path, outcome: &SweepOutcome, gold: &GoldSet) -> Result<()> {
    report::write_discrepancies(
        path,
        &outcome.score.false_positives,
        Mismatch::FalsePositive,
        &gold::values_by_document(gold.iter()),
        WriteMode::Overwrite,
    )?;
    report::write_discrepancies(
        path,
        &outcome.score.false_negatives,
        Mismatch::FalseNegative,
        &gold::values_by_document(&outcome.predictions),
        WriteMode::Append,
    )?;
    Ok(())
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let attribute = args.attribute;
    let stem = file_stem(attribute);
    let mut policy = settings.gold_policy;
    if args.no_plus_minus_doubling {
        policy.plus_minus_doubling = false;
    }
    let config = SweepConfig {
        points: args.points.unwrap_or(settings.sweep.points),
    };
    let discrepancy_path = args
        .out
        .clone()
        .unwrap_or_else(|| settings.join_output(format!("{stem}_analysis_discrepancies.csv")));
    info!(%attribute, path = %discrepancy_path.display(), "scoring analysis dataset");

    let dev = load_split(
        &settings,
        "dev",
        args.dev_probs
            .clone()
            .unwrap_or_else(|| settings.join_data(format!("{stem}_dev_probs.csv"))),
        attribute,
        &policy,
    )?;
    let test = load_split(
        &settings,
        "test",
        args.test_probs
            .clone()
            .unwrap_or_else(|| settings.join_data(format!("{stem}_test_probs.csv"))),
        attribute,
        &policy,
    )?;

    let filenames_path = settings.join_data("analysis/filenames.csv");
    let analysis_filenames = documents::filenames_from_file(&filenames_path)?;
    info!(documents = analysis_filenames.len(), "analysis dataset size");
    let analysis_gold = gold::load_attribute_gold(
        &[settings.join_data("analysis/our_gold.csv")],
        attribute,
        None,
        &policy,
    )?
    .filter_documents(&analysis_filenames)
    .ensure_non_empty()?;

    // Analysis predictions are the dev and test rows restricted to gold documents.
    let gold_documents: HashSet<String> = analysis_gold.documents().into_iter().collect();
    let analysis_rows: Vec<ScoredEntity> = dev
        .rows
        .iter()
        .chain(test.rows.iter())
        .filter(|row| gold_documents.contains(&row.entity.document))
        .cloned()
        .collect();

    let test_outcome = sweep_rows(&test.rows, &test.gold, &config)?;
    report_split(test.name, &test_outcome, &test.gold, args.json)?;

    let dev_outcome = sweep_rows(&dev.rows, &dev.gold, &config)?;
    report_split(dev.name, &dev_outcome, &dev.gold, args.json)?;
    write_report(
        &settings.join_output(format!("{}_discrepancies.csv", dev.name)),
        &dev_outcome,
        &dev.gold,
    )?;

    let outcome = sweep_rows(&analysis_rows, &analysis_gold, &config)?;
    report_split("analysis", &outcome, &analysis_gold, args.json)?;
    write_report(&discrepancy_path, &outcome, &analysis_gold)?;
    Ok(())
}
