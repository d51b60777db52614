//! Error handling for the fundamentals pipeline.
//!
//! Every fatal condition of a run maps to one variant here. Row-level data
//! problems (unparseable or non-positive numbers) are never errors; they are
//! dropped where they are read.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FundError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Every candidate year failed. The last year's error is kept as
    /// `source`, so a `MissingRequiredFile` or `Http` failure from the
    /// fetch stage arrives wrapped here, never as its own variant. Match on
    /// the boxed `source` to inspect it.
    #[error("Source unavailable after trying {attempts:?}: {source}")]
    SourceUnavailable {
        attempts: Vec<i32>,
        #[source]
        source: Box<FundError>,
    },

    #[error("Missing required {role} file in archive (available: {available:?})")]
    MissingRequiredFile {
        role: String,
        available: Vec<String>,
    },

    #[error("Could not detect columns {missing:?} in {path} - headers: {headers:?}")]
    SchemaDetection {
        path: PathBuf,
        missing: Vec<String>,
        headers: Vec<String>,
    },

    #[error("No rows match the mapped identifiers in {path}")]
    NoMatchingRows { path: PathBuf },

    #[error("Table has no data rows: {path}")]
    EmptyTable { path: PathBuf },

    #[error("No net asset value source could be resolved (tried {tried:?})")]
    UnresolvedNetAssetSource { tried: Vec<String> },
}

impl FundError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, FundError>;
