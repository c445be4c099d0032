//! CLI entry-point for inspecting a gold set.

use std::{collections::BTreeMap, path::PathBuf};

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use datasheet_eval::config::Settings;

use crate::cli::{self as shared, PolicyArgs, RelationArgs};

/// Args for the `gold` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Gold CSV files (comma separated).
    #[arg(long, value_delimiter = ',', required = true)]
    pub gold: Vec<PathBuf>,
    /// PDF directory or filename CSV restricting the corpus.
    #[arg(long)]
    pub documents: Option<PathBuf>,
    #[command(flatten)]
    pub relation: RelationArgs,
    #[command(flatten)]
    pub policy: PolicyArgs,
    /// Print every entity instead of per-document counts.
    #[arg(long)]
    pub list: bool,
}

#[instrument(skip(settings))]
pub fn run(args: Args, settings: Settings) -> Result<()> {
    let policy = args.policy.resolve(&settings);
    let documents = shared::load_documents(args.documents.as_deref())?;
    let gold = shared::load_gold(&args.gold, &args.relation, documents.as_ref(), &policy)?;

    let mut entities: Vec<_> = gold.iter().collect();
    entities.sort();
    if args.list {
        for entity in &entities {
            println!("{}\t{}", entity.document, entity.value);
        }
    } else {
        let mut per_document: BTreeMap<&str, usize> = BTreeMap::new();
        for entity in &entities {
            *per_document.entry(entity.document.as_str()).or_insert(0) += 1;
        }
        for (document, count) in &per_document {
            println!("{document}\t{count}");
        }
    }
    info!(
        relation = %args.relation.label(),
        documents = gold.documents().len(),
        entities = gold.len(),
        "gold set summary"
    );
    Ok(())
}
