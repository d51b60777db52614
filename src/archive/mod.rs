//! Yearly archive retrieval.
//!
//! An [`ArchiveSource`] places the archive for a year in a scratch
//! directory; [`fetch_first_available`] walks the candidate years in order,
//! extracting and selecting tables for each, and stops at the first year
//! for which the whole sequence succeeds.

pub mod discovery;
pub mod download;

pub use discovery::SelectedFiles;

use self::discovery::{extract_archive, list_tabular_files, select_files};
use crate::constants::{ARCHIVE_FILE_TEMPLATE, YEAR_PLACEHOLDER};
use crate::error::{FundError, Result};
use crate::models::PipelineVariant;
use reqwest::Client;
use std::future::Future;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::task;
use tracing::{info, warn};

/// Somewhere a yearly archive can be fetched from
pub trait ArchiveSource {
    /// Put the archive for `year` inside `dest_dir` and return its path.
    fn fetch(&self, year: i32, dest_dir: &Path) -> impl Future<Output = Result<PathBuf>>;
}

/// Downloads archives over HTTP from a URL template
#[derive(Debug, Clone)]
pub struct HttpArchiveSource {
    client: Client,
    url_template: String,
    show_progress: bool,
}

impl HttpArchiveSource {
    pub fn new(url_template: impl Into<String>, timeout_secs: Option<u64>) -> Result<Self> {
        Ok(Self {
            client: download::build_client(timeout_secs)?,
            url_template: url_template.into(),
            show_progress: true,
        })
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn url_for(&self, year: i32) -> String {
        self.url_template
            .replace(YEAR_PLACEHOLDER, &year.to_string())
    }
}

impl ArchiveSource for HttpArchiveSource {
    fn fetch(&self, year: i32, dest_dir: &Path) -> impl Future<Output = Result<PathBuf>> {
        async move {
            let url = self.url_for(year);
            let dest = dest_dir.join(archive_file_name(year));
            info!("Downloading {}", url);
            download::download_to_file(&self.client, &url, &dest, self.show_progress).await?;
            Ok(dest)
        }
    }
}

/// Reads archives already present in a local directory
#[derive(Debug, Clone)]
pub struct LocalArchiveSource {
    dir: PathBuf,
}

impl LocalArchiveSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ArchiveSource for LocalArchiveSource {
    fn fetch(&self, year: i32, dest_dir: &Path) -> impl Future<Output = Result<PathBuf>> {
        async move {
            let name = archive_file_name(year);
            let src = self.dir.join(&name);
            let dest = dest_dir.join(&name);
            info!("Copying {}", src.display());
            fs::copy(&src, &dest).await?;
            Ok(dest)
        }
    }
}

/// `inf_mensal_fii_{year}.zip`
pub fn archive_file_name(year: i32) -> String {
    ARCHIVE_FILE_TEMPLATE.replace(YEAR_PLACEHOLDER, &year.to_string())
}

/// Tables selected from the archive of one year
#[derive(Debug, Clone)]
pub struct FetchedArchive {
    pub year: i32,
    pub files: SelectedFiles,
}

/// Fetch, extract and select tables for a single year.
async fn fetch_year<S: ArchiveSource>(
    source: &S,
    year: i32,
    attempt_dir: &Path,
    variant: PipelineVariant,
) -> Result<SelectedFiles> {
    fs::create_dir_all(attempt_dir).await?;
    let zip_path = source.fetch(year, attempt_dir).await?;

    let extract_dir = attempt_dir.join("extracted");
    let files = task::spawn_blocking(move || {
        extract_archive(&zip_path, &extract_dir)?;
        list_tabular_files(&extract_dir)
    })
    .await
    .map_err(std::io::Error::other)??;

    info!("Found {} tabular files for {}", files.len(), year);
    select_files(&files, variant)
}

/// Try each year in order; the first year that fully succeeds wins.
///
/// Every attempt works in its own subdirectory of `scratch_dir`, so a
/// failed year leaves nothing behind for the next one to pick up.
pub async fn fetch_first_available<S: ArchiveSource>(
    source: &S,
    years: &[i32],
    scratch_dir: &Path,
    variant: PipelineVariant,
) -> Result<FetchedArchive> {
    let mut last_error = None;

    for &year in years {
        let attempt_dir = scratch_dir.join(year.to_string());
        match fetch_year(source, year, &attempt_dir, variant).await {
            Ok(files) => {
                info!("Using archive for {}: {:?}", year, files);
                return Ok(FetchedArchive { year, files });
            }
            Err(e) => {
                warn!("Failed to fetch or read archive for {}: {}", year, e);
                last_error = Some(e);
            }
        }
    }

    let source_error = last_error
        .unwrap_or_else(|| FundError::configuration("No candidate years to fetch"));
    Err(FundError::SourceUnavailable {
        attempts: years.to_vec(),
        source: Box::new(source_error),
    })
}
