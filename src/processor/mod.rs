//! Main processing pipeline.
//!
//! Orchestrates a complete run: mapping load, archive fetch with year
//! fallback, the two-pass join and the snapshot write. Every step runs to
//! completion before the next starts, and nothing is written unless every
//! step succeeded.

pub mod join;
pub mod writer;

#[cfg(test)]
pub mod tests;

use self::join::{JoinOutcome, NetAssetCandidate, join_single_table, join_split_tables};
use crate::archive::{
    ArchiveSource, FetchedArchive, HttpArchiveSource, LocalArchiveSource, SelectedFiles,
    fetch_first_available,
};
use crate::config::FundConfig;
use crate::constants::{SCRATCH_PREFIX, file_roles};
use crate::error::Result;
use crate::mapping::{TickerMapping, load_mapping};
use crate::models::ProcessingStats;
use crate::table::DelimitedTable;

use chrono::Utc;
use colored::*;
use std::time::Instant;
use tracing::info;

/// Processor for one fundamentals run
#[derive(Debug)]
pub struct FundamentalsProcessor {
    config: FundConfig,
}

impl FundamentalsProcessor {
    pub fn new(config: FundConfig) -> Self {
        Self { config }
    }

    /// Run against the configured source: a local archive directory when
    /// one is set, HTTP otherwise.
    pub async fn process(&self) -> Result<ProcessingStats> {
        match &self.config.archive_dir {
            Some(dir) => {
                let source = LocalArchiveSource::new(dir);
                self.process_with_source(&source).await
            }
            None => {
                let source =
                    HttpArchiveSource::new(&self.config.url_template, self.config.timeout_secs)?
                        .with_progress(self.config.show_progress);
                self.process_with_source(&source).await
            }
        }
    }

    /// Run against an explicit archive source.
    pub async fn process_with_source<S: ArchiveSource>(
        &self,
        source: &S,
    ) -> Result<ProcessingStats> {
        let start_time = Instant::now();
        let mapping_path = self.config.mapping_path();
        let output_path = self.config.output_path();

        // The mapping is validated before any network access
        let mapping = load_mapping(&mapping_path)?;

        let mut builder = tempfile::Builder::new();
        builder.prefix(SCRATCH_PREFIX);
        let scratch = match &self.config.scratch_parent {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };

        // Kept directories survive failed runs as well
        let (scratch_path, _scratch_guard) = if self.config.keep_scratch {
            let kept = scratch.keep();
            info!("Keeping scratch directory {}", kept.display());
            (kept, None)
        } else {
            info!("Scratch directory: {}", scratch.path().display());
            (scratch.path().to_path_buf(), Some(scratch))
        };

        let years = self.config.candidate_years();
        let fetched =
            fetch_first_available(source, &years, &scratch_path, self.config.variant).await?;

        let outcome = self.join(&fetched, &mapping)?;

        let snapshot = writer::build_snapshot(
            &mapping,
            &outcome,
            self.config.variant,
            Utc::now().date_naive(),
        );
        writer::write_snapshot(&output_path, &snapshot)?;

        let stats = ProcessingStats {
            year: fetched.year,
            reference_date: outcome.reference_date,
            source: outcome.source,
            tickers_total: snapshot.items.len(),
            tickers_filled: writer::filled_count(&snapshot),
            output_path,
            processing_time_ms: start_time.elapsed().as_millis(),
        };
        info!(
            "VP filled for {}/{} tickers",
            stats.tickers_filled, stats.tickers_total
        );

        Ok(stats)
    }

    fn join(&self, fetched: &FetchedArchive, mapping: &TickerMapping) -> Result<JoinOutcome> {
        let wanted = mapping.wanted_set();
        let delimiter = self.config.delimiter;

        match &fetched.files {
            SelectedFiles::Single { table } => {
                let table = DelimitedTable::read(table, delimiter)?;
                join_single_table(&table, &wanted)
            }
            SelectedFiles::Split {
                general,
                complement,
                assets_liabilities,
            } => {
                let general = DelimitedTable::read(general, delimiter)?;

                let candidates: Vec<NetAssetCandidate> = [
                    (file_roles::COMPLEMENT, complement),
                    (file_roles::ASSETS_LIABILITIES, assets_liabilities),
                ]
                .into_iter()
                .filter_map(|(role, path)| {
                    path.clone().map(|path| NetAssetCandidate { role, path })
                })
                .collect();

                join_split_tables(&general, &candidates, delimiter, &wanted)
            }
        }
    }
}

/// Print the end-of-run summary
pub fn print_summary(stats: &ProcessingStats) {
    println!("\n{}", "Fundamentals Summary".bright_green().bold());
    println!(
        "  {} {}",
        "Archive year:".bright_cyan(),
        stats.year.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "Reference date:".bright_cyan(),
        stats.reference_date.bright_white()
    );
    println!("  {} {}", "Source:".bright_cyan(), stats.source);
    let filled = format!("{}/{}", stats.tickers_filled, stats.tickers_total);
    if stats.tickers_filled < stats.tickers_total {
        println!(
            "  {} {} {}",
            "VP filled:".bright_cyan(),
            filled.bright_yellow().bold(),
            "(others left null)".bright_black()
        );
    } else {
        println!("  {} {}", "VP filled:".bright_cyan(), filled.bright_white().bold());
    }
    println!(
        "  {} {}",
        "Output:".bright_cyan(),
        stats.output_path.display()
    );
    println!(
        "  {} {}ms",
        "Time elapsed:".bright_cyan(),
        stats.processing_time_ms.to_string().bright_white()
    );
}
