//! Runtime configuration utilities for datasheet-eval.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Serialize;

use crate::{
    data::gold::{GoldPolicy, Pairing},
    scoring::sweep::{SweepConfig, DEFAULT_POINTS},
};

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Root folder holding gold CSVs, PDF listings and probability dumps.
    pub data_dir: PathBuf,
    /// Root folder for discrepancy reports and dumps.
    pub outputs_dir: PathBuf,
    /// Threshold grid used when a command does not override it.
    pub sweep: SweepConfig,
    /// Gold and prediction normalisation rules.
    pub gold_policy: GoldPolicy,
    /// Optional plain-text copy of the log.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let outputs_dir = env::var("OUTPUTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./outputs"));
        let points = env::var("SWEEP_POINTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .filter(|&n: &usize| n > 0)
            .unwrap_or(DEFAULT_POINTS);
        let plus_minus_doubling = env::var("GOLD_PLUS_MINUS_DOUBLING")
            .ok()
            .and_then(|v| parse_flag(&v))
            .unwrap_or(true);
        let pairing = match env::var("GOLD_PAIRING") {
            Ok(value) => value
                .parse::<Pairing>()
                .map_err(anyhow::Error::msg)
                .context("parsing GOLD_PAIRING")?,
            Err(_) => Pairing::default(),
        };
        let log_file = env::var("LOG_FILE").ok().map(PathBuf::from);

        std::fs::create_dir_all(&outputs_dir).context("creating outputs dir")?;

        Ok(Self {
            data_dir,
            outputs_dir,
            sweep: SweepConfig { points },
            gold_policy: GoldPolicy {
                plus_minus_doubling,
                pairing,
            },
            log_file,
        })
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_output<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.outputs_dir.join(path)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
