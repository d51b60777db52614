//! Configuration for a fundamentals run.
//!
//! Defaults mirror the repository layout (`data/fii_cnpj_map.json` in,
//! `data/fiis_fundamentals.json` out) and the public CVM archive location.

use crate::constants::{
    DEFAULT_DATA_DIR, DEFAULT_DELIMITER, DEFAULT_URL_TEMPLATE, MAPPING_FILE_NAME,
    OUTPUT_FILE_NAME,
};
use crate::models::PipelineVariant;
use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Global configuration for a fundamentals run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FundConfig {
    /// Directory holding the mapping and the snapshot
    pub data_dir: PathBuf,

    /// Explicit mapping path (defaults to `data_dir/fii_cnpj_map.json`)
    pub mapping_path: Option<PathBuf>,

    /// Explicit snapshot path (defaults to `data_dir/fiis_fundamentals.json`)
    pub output_path: Option<PathBuf>,

    /// Upstream layout to read
    pub variant: PipelineVariant,

    /// Archive URL with a `{year}` placeholder
    pub url_template: String,

    /// Only try this year instead of the current and previous years
    pub year: Option<i32>,

    /// Read `inf_mensal_fii_{year}.zip` from this directory instead of HTTP
    pub archive_dir: Option<PathBuf>,

    /// Download timeout in seconds (none by default)
    pub timeout_secs: Option<u64>,

    /// Keep the scratch extraction directory after the run, failed or not
    pub keep_scratch: bool,

    /// Create the scratch directory here instead of the system temp dir
    pub scratch_parent: Option<PathBuf>,

    /// Show download progress bars
    pub show_progress: bool,

    /// Field delimiter of the disclosure files
    pub delimiter: char,
}

impl Default for FundConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            mapping_path: None,
            output_path: None,
            variant: PipelineVariant::Split,
            url_template: DEFAULT_URL_TEMPLATE.to_string(),
            year: None,
            archive_dir: None,
            timeout_secs: None,
            keep_scratch: false,
            scratch_parent: None,
            show_progress: true,
            delimiter: DEFAULT_DELIMITER,
        }
    }
}

impl FundConfig {
    /// Set the data directory
    pub fn with_data_dir(mut self, data_dir: impl Into<PathBuf>) -> Self {
        self.data_dir = data_dir.into();
        self
    }

    /// Set an explicit mapping path
    pub fn with_mapping_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mapping_path = Some(path.into());
        self
    }

    /// Set an explicit snapshot path
    pub fn with_output_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(path.into());
        self
    }

    /// Select the upstream layout
    pub fn with_variant(mut self, variant: PipelineVariant) -> Self {
        self.variant = variant;
        self
    }

    /// Override the archive URL template
    pub fn with_url_template(mut self, template: impl Into<String>) -> Self {
        self.url_template = template.into();
        self
    }

    /// Pin the archive year
    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    /// Read archives from a local directory
    pub fn with_archive_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.archive_dir = Some(dir.into());
        self
    }

    /// Bound the download time
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Keep the scratch directory for inspection
    pub fn with_keep_scratch(mut self) -> Self {
        self.keep_scratch = true;
        self
    }

    /// Place the scratch directory under `dir`
    pub fn with_scratch_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_parent = Some(dir.into());
        self
    }

    /// Disable progress bars
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    pub fn mapping_path(&self) -> PathBuf {
        self.mapping_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(MAPPING_FILE_NAME))
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(OUTPUT_FILE_NAME))
    }

    /// Years to try, in order: the pinned year, or this year then last year
    pub fn candidate_years(&self) -> Vec<i32> {
        match self.year {
            Some(year) => vec![year],
            None => {
                let current = Utc::now().year();
                vec![current, current - 1]
            }
        }
    }
}
