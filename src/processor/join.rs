//! Two-pass join over the disclosure tables.
//!
//! Pass 1 finds the most recent reference date among rows of wanted
//! identifiers. Pass 2 takes that date as input and returns a fresh map of
//! values keyed by (identifier, date). Neither pass mutates shared state.

use crate::constants::{columns, file_roles, sources};
use crate::error::{FundError, Result};
use crate::field_parsers::{normalize_identifier, parse_locale_number};
use crate::header::resolve_columns;
use crate::table::{DelimitedTable, field};
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Positive values keyed by (identifier, reference date)
pub type ValueMap = HashMap<(String, String), f64>;

/// Value-per-share per identifier for the discovered date
#[derive(Debug, Clone, PartialEq)]
pub struct JoinOutcome {
    pub reference_date: String,
    pub source: String,
    pub value_per_share: HashMap<String, f64>,
}

fn reference_date_of(row: &[String], date_col: usize) -> &str {
    field(row, date_col).unwrap_or_default().trim()
}

/// Pass 1: the greatest reference date, compared as strings, among rows
/// whose identifier is wanted.
pub fn discover_reference_date(
    table: &DelimitedTable,
    id_col: usize,
    date_col: usize,
    wanted: &HashSet<String>,
) -> Result<String> {
    let mut latest: Option<&str> = None;

    for row in &table.rows {
        let id = normalize_identifier(field(row, id_col));
        if !wanted.contains(&id) {
            continue;
        }
        let date = reference_date_of(row, date_col);
        if !date.is_empty() && latest.is_none_or(|current| date > current) {
            latest = Some(date);
        }
    }

    latest
        .map(str::to_string)
        .ok_or_else(|| FundError::NoMatchingRows {
            path: table.path.clone(),
        })
}

/// Pass 2: positive values of `value_col` at exactly `reference_date`.
///
/// Rows with an unparseable or non-positive value are dropped. A later row
/// for the same key replaces an earlier one.
pub fn extract_values(
    table: &DelimitedTable,
    [id_col, date_col, value_col]: [usize; 3],
    wanted: &HashSet<String>,
    reference_date: &str,
) -> ValueMap {
    let mut values = ValueMap::new();

    for row in &table.rows {
        let id = normalize_identifier(field(row, id_col));
        if !wanted.contains(&id) {
            continue;
        }
        let date = reference_date_of(row, date_col);
        if date != reference_date {
            continue;
        }
        match parse_locale_number(field(row, value_col)) {
            Some(value) if value > 0.0 => {
                values.insert((id, date.to_string()), value);
            }
            _ => {}
        }
    }

    values
}

/// Value-per-share for every identifier with both quantities at `reference_date`
pub fn combine_value_per_share(
    shares: &ValueMap,
    net_assets: &ValueMap,
    reference_date: &str,
) -> HashMap<String, f64> {
    shares
        .iter()
        .filter(|((_, date), _)| date == reference_date)
        .filter_map(|(key, &share_count)| {
            let assets = *net_assets.get(key)?;
            let vp = assets / share_count;
            (share_count > 0.0 && vp.is_finite()).then(|| (key.0.clone(), vp))
        })
        .collect()
}

/// Single-file layout: net assets and share count come from the same row.
pub fn join_single_table(
    table: &DelimitedTable,
    wanted: &HashSet<String>,
) -> Result<JoinOutcome> {
    let [id_col, date_col, assets_col, shares_col] = resolve_columns(
        &table.path,
        &table.headers,
        &[
            columns::IDENTIFIER,
            columns::REFERENCE_DATE,
            columns::NET_ASSETS,
            columns::SHARE_COUNT,
        ],
    )?;

    let reference_date = discover_reference_date(table, id_col, date_col, wanted)?;
    info!("Most recent reference date: {}", reference_date);

    let mut value_per_share = HashMap::new();
    for row in &table.rows {
        let id = normalize_identifier(field(row, id_col));
        if !wanted.contains(&id) || reference_date_of(row, date_col) != reference_date {
            continue;
        }

        let (Some(assets), Some(shares)) = (
            parse_locale_number(field(row, assets_col)),
            parse_locale_number(field(row, shares_col)),
        ) else {
            continue;
        };
        if shares <= 0.0 {
            continue;
        }

        let vp = assets / shares;
        if vp.is_finite() && vp > 0.0 {
            value_per_share.insert(id, vp);
        }
    }

    Ok(JoinOutcome {
        reference_date,
        source: sources::SINGLE_FILE.to_string(),
        value_per_share,
    })
}

/// A supplementary table that may carry net asset value
#[derive(Debug, Clone)]
pub struct NetAssetCandidate {
    pub role: &'static str,
    pub path: PathBuf,
}

/// Net asset values taken from the first candidate that yields any
#[derive(Debug, Clone)]
pub struct ResolvedNetAssets {
    pub role: &'static str,
    pub values: ValueMap,
}

/// Walk the candidates in order and keep the first non-empty extraction.
///
/// Candidates whose table is empty or whose columns cannot be detected are
/// skipped. When every candidate failed detection the last detection error
/// is returned so the header row reaches the user.
pub fn resolve_net_assets(
    candidates: &[NetAssetCandidate],
    delimiter: char,
    wanted: &HashSet<String>,
    reference_date: &str,
) -> Result<ResolvedNetAssets> {
    let mut tried = Vec::new();
    let mut last_detection_error = None;
    let mut any_readable = false;

    for candidate in candidates {
        tried.push(candidate.role.to_string());

        let table = match DelimitedTable::read(&candidate.path, delimiter) {
            Ok(table) => table,
            Err(e @ FundError::EmptyTable { .. }) => {
                warn!("Skipping {} table: {}", candidate.role, e);
                continue;
            }
            Err(e) => return Err(e),
        };

        let cols = match resolve_columns(
            &table.path,
            &table.headers,
            &[
                columns::IDENTIFIER,
                columns::REFERENCE_DATE,
                columns::NET_ASSETS,
            ],
        ) {
            Ok(cols) => cols,
            Err(e) => {
                warn!("Skipping {} table: {}", candidate.role, e);
                last_detection_error = Some(e);
                continue;
            }
        };
        any_readable = true;

        let values = extract_values(&table, cols, wanted, reference_date);
        debug!(
            "{} table: {} net asset values at {}",
            candidate.role,
            values.len(),
            reference_date
        );
        if !values.is_empty() {
            return Ok(ResolvedNetAssets {
                role: candidate.role,
                values,
            });
        }
        warn!(
            "{} table has no net asset values for {}",
            candidate.role, reference_date
        );
    }

    match last_detection_error {
        Some(e) if !any_readable => Err(e),
        _ => Err(FundError::UnresolvedNetAssetSource { tried }),
    }
}

/// Split layout: share count from the general table, net assets from the
/// complement table or, failing that, the assets/liabilities table.
pub fn join_split_tables(
    general: &DelimitedTable,
    candidates: &[NetAssetCandidate],
    delimiter: char,
    wanted: &HashSet<String>,
) -> Result<JoinOutcome> {
    let general_cols: [usize; 3] = resolve_columns(
        &general.path,
        &general.headers,
        &[
            columns::IDENTIFIER,
            columns::REFERENCE_DATE,
            columns::SHARE_COUNT,
        ],
    )?;

    let reference_date =
        discover_reference_date(general, general_cols[0], general_cols[1], wanted)?;
    info!("Most recent reference date: {}", reference_date);

    let shares = extract_values(general, general_cols, wanted, &reference_date);
    debug!("{} share counts at {}", shares.len(), reference_date);

    let net_assets = resolve_net_assets(candidates, delimiter, wanted, &reference_date)?;
    info!("Net asset values taken from the {} table", net_assets.role);

    let value_per_share = combine_value_per_share(&shares, &net_assets.values, &reference_date);

    Ok(JoinOutcome {
        reference_date,
        source: source_label(net_assets.role).to_string(),
        value_per_share,
    })
}

fn source_label(net_asset_role: &str) -> &'static str {
    if net_asset_role == file_roles::COMPLEMENT {
        sources::GENERAL_AND_COMPLEMENT
    } else {
        sources::GENERAL_AND_ASSETS_LIABILITIES
    }
}
