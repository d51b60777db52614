//! FII Fundamentals Library
//!
//! Builds a per-ticker fundamentals snapshot for Brazilian real-estate
//! investment funds from the CVM monthly disclosure archives.
//!
//! This library provides tools for:
//! - Downloading the yearly disclosure archive with previous-year fallback
//! - Decoding Latin-1, semicolon-delimited tables with Brazilian number formats
//! - Resolving identifier, date, share count and net asset columns by header
//! - Joining share counts with net assets at the most recent reference date
//! - Writing a JSON snapshot keyed by ticker

pub mod archive;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod field_parsers;
pub mod header;
pub mod mapping;
pub mod models;
pub mod processor;
pub mod table;

// Re-export commonly used types
pub use config::FundConfig;
pub use error::{FundError, Result};
pub use models::{PipelineVariant, ProcessingStats, Snapshot, ValuationRecord};
pub use processor::FundamentalsProcessor;
