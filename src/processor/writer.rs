//! Snapshot assembly and JSON output
//!
//! Builds one record per mapped ticker, in mapping order, and overwrites the
//! snapshot file. Tickers without a computed value get `null`.

use crate::error::Result;
use crate::mapping::TickerMapping;
use crate::models::{PipelineVariant, Snapshot, ValuationRecord};
use crate::processor::join::JoinOutcome;
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Assemble the snapshot for a finished join.
pub fn build_snapshot(
    mapping: &TickerMapping,
    outcome: &JoinOutcome,
    variant: PipelineVariant,
    updated_at: NaiveDate,
) -> Snapshot {
    let items = mapping
        .iter()
        .map(|(ticker, identifier)| {
            ValuationRecord::new(ticker, outcome.value_per_share.get(identifier).copied())
        })
        .collect();

    let (competence, reference_date) = match variant {
        PipelineVariant::Single => (Some(outcome.reference_date.clone()), None),
        PipelineVariant::Split => (None, Some(outcome.reference_date.clone())),
    };

    Snapshot {
        updated_at: updated_at.format("%Y-%m-%d").to_string(),
        source: outcome.source.clone(),
        competence,
        reference_date,
        items,
    }
}

/// Number of records with a value-per-share
pub fn filled_count(snapshot: &Snapshot) -> usize {
    snapshot.items.iter().filter(|r| r.vp.is_some()).count()
}

/// Overwrite `path` with the pretty-printed snapshot.
pub fn write_snapshot(path: &Path, snapshot: &Snapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_string_pretty(snapshot)?;
    json.push('\n');
    fs::write(path, json)?;

    debug!("Wrote {} records to {}", snapshot.items.len(), path.display());
    Ok(())
}
