//! Command-line interface wiring for datasheet-eval.

use std::{collections::HashSet, path::Path};

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use datasheet_eval::{
    candidates::mapper::Relation,
    config::Settings,
    data::{
        documents,
        gold::{self, GoldPolicy, GoldSet, Pairing},
    },
    entity::Attribute,
};

pub mod analyze;
pub mod dump;
pub mod gold_cmd;
pub mod score;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Datasheet extraction scoring", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Analyze(args) => analyze::run(args, settings),
            Commands::Score(args) => score::run(args, settings),
            Commands::Dump(args) => dump::run(args, settings),
            Commands::Gold(args) => gold_cmd::run(args, settings),
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Sweep dev/test/analysis probability dumps against gold.
    Analyze(analyze::Args),
    /// Sweep a candidate export against gold and report discrepancies.
    Score(score::Args),
    /// Write a candidate export as an entity/probability CSV.
    Dump(dump::Args),
    /// Inspect a gold set.
    Gold(gold_cmd::Args),
}

/// Which relation a candidate export or gold set describes.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct RelationArgs {
    /// Score a single attribute.
    #[arg(long, value_enum)]
    pub attribute: Option<Attribute>,
    /// Score op-amp (gain-bandwidth, supply current) pairs.
    #[arg(long)]
    pub paired: bool,
}

impl RelationArgs {
    pub fn relation(&self) -> Relation {
        match self.attribute {
            Some(attribute) => Relation::single(attribute),
            None => Relation::GainCurrent,
        }
    }

    pub fn label(&self) -> String {
        match self.attribute {
            Some(attribute) => attribute.to_string(),
            None => "typ_gbp+typ_supply_current".to_string(),
        }
    }
}

/// Overrides for the gold normalisation policy.
#[derive(Debug, Clone, Args)]
pub struct PolicyArgs {
    /// How gain and current readings are paired.
    #[arg(long, value_enum)]
    pub pairing: Option<Pairing>,
    /// Do not admit the doubled value of `±x` readings.
    #[arg(long)]
    pub no_plus_minus_doubling: bool,
}

impl PolicyArgs {
    pub fn resolve(&self, settings: &Settings) -> GoldPolicy {
        let mut policy = settings.gold_policy;
        if let Some(pairing) = self.pairing {
            policy.pairing = pairing;
        }
        if self.no_plus_minus_doubling {
            policy.plus_minus_doubling = false;
        }
        policy
    }
}

/// Document list from a PDF directory or a filename CSV.
pub fn load_documents(path: Option<&Path>) -> Result<Option<HashSet<String>>> {
    path.map(|p| {
        documents::load_documents(p).with_context(|| format!("loading documents from {}", p.display()))
    })
    .transpose()
}

/// Load the gold set for `relation`, failing when it is empty.
pub fn load_gold<P: AsRef<Path>>(
    paths: &[P],
    relation: &RelationArgs,
    documents: Option<&HashSet<String>>,
    policy: &GoldPolicy,
) -> Result<GoldSet> {
    let gold = match relation.attribute {
        Some(attribute) => gold::load_attribute_gold(paths, attribute, documents, policy),
        None => gold::load_paired_gold(paths, documents, policy),
    }
    .context("loading gold")?;
    Ok(gold.ensure_non_empty()?)
}
