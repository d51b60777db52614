//! Ticker to fund identifier mapping.
//!
//! Loaded once from `fii_cnpj_map.json`:
//!
//! ```json
//! { "items": [ { "ticker": "ABCD11", "cnpj": "11.111.111/0001-11" } ] }
//! ```

use crate::error::{FundError, Result};
use crate::field_parsers::normalize_identifier;
use serde::Deserialize;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Default, Deserialize)]
struct MappingFile {
    #[serde(default)]
    items: Vec<MappingEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct MappingEntry {
    #[serde(default)]
    ticker: Option<Value>,
    #[serde(default)]
    cnpj: Option<Value>,
}

/// Text of a scalar entry field. Numbers are rendered (CNPJs are sometimes
/// stored unquoted); anything else counts as empty.
fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    }
}

/// Ordered, ticker-unique association of tickers to identifiers.
///
/// Re-inserting a ticker replaces its identifier but keeps its original
/// position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickerMapping {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl TickerMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a pair after normalization. Returns `false` when either side
    /// is empty once normalized.
    pub fn insert(&mut self, ticker: &str, identifier: &str) -> bool {
        let ticker = ticker.trim().to_uppercase();
        let identifier = normalize_identifier(Some(identifier));
        if ticker.is_empty() || identifier.is_empty() {
            return false;
        }

        match self.positions.get(&ticker) {
            Some(&pos) => self.entries[pos].1 = identifier,
            None => {
                self.positions.insert(ticker.clone(), self.entries.len());
                self.entries.push((ticker, identifier));
            }
        }
        true
    }

    /// (ticker, identifier) pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(t, c)| (t.as_str(), c.as_str()))
    }

    /// Identifiers the scans are restricted to
    pub fn wanted_set(&self) -> HashSet<String> {
        self.entries.iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse mapping JSON text. Fails when no usable pair remains.
pub fn parse_mapping(text: &str) -> Result<TickerMapping> {
    let file: MappingFile = serde_json::from_str(text)
        .map_err(|e| FundError::configuration(format!("Invalid mapping JSON: {e}")))?;

    let mut mapping = TickerMapping::new();
    let mut skipped = 0usize;
    for entry in &file.items {
        let ticker = field_text(entry.ticker.as_ref());
        let cnpj = field_text(entry.cnpj.as_ref());
        if !mapping.insert(&ticker, &cnpj) {
            skipped += 1;
        }
    }

    if skipped > 0 {
        debug!("Skipped {} mapping entries without ticker or CNPJ", skipped);
    }

    if mapping.is_empty() {
        return Err(FundError::configuration(
            "Mapping has no entry with both ticker and CNPJ filled in",
        ));
    }

    Ok(mapping)
}

/// Load the mapping file from disk.
pub fn load_mapping(path: &Path) -> Result<TickerMapping> {
    if !path.exists() {
        return Err(FundError::configuration(format!(
            "Mapping file not found: {} (create it with ticker/cnpj items)",
            path.display()
        )));
    }

    let text = fs::read_to_string(path).map_err(|e| {
        FundError::configuration(format!("Cannot read mapping {}: {e}", path.display()))
    })?;
    let mapping = parse_mapping(&text)?;

    info!("Loaded {} tickers from {}", mapping.len(), path.display());
    Ok(mapping)
}
