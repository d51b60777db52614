//! Core data structures for the fundamentals pipeline.
//!
//! Defines the snapshot written to disk, per-ticker valuation records and
//! the statistics reported at the end of a run.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Valuation fields for one ticker.
///
/// `dy12m` and `pl` are placeholders kept for consumers of the snapshot;
/// this pipeline never fills them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValuationRecord {
    pub ticker: String,
    pub vp: Option<f64>,
    pub dy12m: Option<f64>,
    pub pl: Option<f64>,
}

impl ValuationRecord {
    pub fn new(ticker: impl Into<String>, vp: Option<f64>) -> Self {
        Self {
            ticker: ticker.into(),
            vp,
            dy12m: None,
            pl: None,
        }
    }
}

/// Output document.
///
/// Exactly one of `competence` (single-file pipeline) and `reference_date`
/// (split-file pipeline) is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub updated_at: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub competence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_date: Option<String>,
    pub items: Vec<ValuationRecord>,
}

/// Which upstream layout the run reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PipelineVariant {
    /// One table carrying identifier, date, share count and net assets
    Single,
    /// General table for share count, complement or assets/liabilities for net assets
    Split,
}

/// Processing statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub year: i32,
    pub reference_date: String,
    pub source: String,
    pub tickers_total: usize,
    pub tickers_filled: usize,
    pub output_path: PathBuf,
    pub processing_time_ms: u128,
}
