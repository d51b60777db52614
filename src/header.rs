//! Header row analysis for CVM disclosure tables.
//!
//! Resolves logical columns (identifier, reference date, share count, net
//! assets) to positional indices using the candidate tables in
//! [`crate::constants::columns`]. Indices are resolved once per table.

use crate::constants::ColumnCandidates;
use crate::error::{FundError, Result};
use std::path::Path;
use tracing::debug;

/// Find the column matching one of the candidates.
///
/// Headers are upper-cased before comparison. Exact candidates win over
/// substring candidates, and within each list the first candidate that
/// matches anything wins.
pub fn locate_column(headers: &[String], exact: &[&str], substring: &[&str]) -> Option<usize> {
    let upper: Vec<String> = headers.iter().map(|h| h.to_uppercase()).collect();

    exact
        .iter()
        .find_map(|cand| upper.iter().position(|h| h.as_str() == *cand))
        .or_else(|| {
            substring
                .iter()
                .find_map(|cand| upper.iter().position(|h| h.contains(*cand)))
        })
}

/// Resolved column positions for one table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    /// Column index per requested logical column, in request order
    indices: Vec<(&'static str, usize)>,
}

impl ColumnLayout {
    /// Resolve every requested column or fail with the raw header row.
    pub fn detect(
        path: &Path,
        headers: &[String],
        wanted: &[ColumnCandidates],
    ) -> Result<Self> {
        let mut indices = Vec::with_capacity(wanted.len());
        let mut missing = Vec::new();

        for candidates in wanted {
            match locate_column(headers, candidates.exact, candidates.substring) {
                Some(idx) => indices.push((candidates.name, idx)),
                None => missing.push(candidates.name.to_string()),
            }
        }

        if !missing.is_empty() {
            return Err(FundError::SchemaDetection {
                path: path.to_path_buf(),
                missing,
                headers: headers.to_vec(),
            });
        }

        debug!("Resolved columns for {}: {:?}", path.display(), indices);

        Ok(Self { indices })
    }
}

/// Resolve a fixed set of columns into positional indices, in request order.
pub fn resolve_columns<const N: usize>(
    path: &Path,
    headers: &[String],
    wanted: &[ColumnCandidates; N],
) -> Result<[usize; N]> {
    let layout = ColumnLayout::detect(path, headers, wanted)?;

    let mut positions = [0usize; N];
    for (slot, (_, idx)) in positions.iter_mut().zip(&layout.indices) {
        *slot = *idx;
    }
    Ok(positions)
}
