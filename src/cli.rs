//! Command-line interface components.

use crate::config::FundConfig;
use crate::constants::{DEFAULT_DATA_DIR, DEFAULT_URL_TEMPLATE};
use crate::models::PipelineVariant;
use clap::Parser;
use std::path::PathBuf;
use tracing::debug;

#[derive(Parser, Debug)]
#[command(name = "fii_fundamentals")]
#[command(about = "Build the FII fundamentals snapshot from CVM monthly disclosures")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Args {
    /// Directory holding fii_cnpj_map.json and fiis_fundamentals.json
    #[arg(long, value_name = "DIR", default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Mapping file (defaults to DATA_DIR/fii_cnpj_map.json)
    #[arg(short, long, value_name = "PATH")]
    pub mapping: Option<PathBuf>,

    /// Snapshot file (defaults to DATA_DIR/fiis_fundamentals.json)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Upstream layout to read
    #[arg(long, value_enum, default_value_t = PipelineVariant::Split)]
    pub variant: PipelineVariant,

    /// Archive URL with a {year} placeholder
    #[arg(long, value_name = "URL", default_value = DEFAULT_URL_TEMPLATE)]
    pub url_template: String,

    /// Only try this archive year
    #[arg(long)]
    pub year: Option<i32>,

    /// Read inf_mensal_fii_{year}.zip from this directory instead of downloading
    #[arg(long, value_name = "DIR")]
    pub archive_dir: Option<PathBuf>,

    /// Download timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout_secs: Option<u64>,

    /// Keep the extraction directory after the run
    #[arg(long)]
    pub keep_scratch: bool,

    /// Parent directory for the extraction directory (system temp dir by default)
    #[arg(long, value_name = "DIR")]
    pub scratch_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

impl Args {
    /// Map the flags onto a run configuration
    pub fn to_config(&self) -> FundConfig {
        let mut config = FundConfig::default()
            .with_data_dir(&self.data_dir)
            .with_variant(self.variant)
            .with_url_template(&self.url_template);

        if let Some(path) = &self.mapping {
            config = config.with_mapping_path(path);
        }
        if let Some(path) = &self.output {
            config = config.with_output_path(path);
        }
        if let Some(year) = self.year {
            config = config.with_year(year);
        }
        if let Some(dir) = &self.archive_dir {
            config = config.with_archive_dir(dir);
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout_secs(secs);
        }
        if self.keep_scratch {
            config = config.with_keep_scratch();
        }
        if let Some(dir) = &self.scratch_dir {
            config = config.with_scratch_parent(dir);
        }
        if self.quiet {
            config = config.without_progress();
        }

        config
    }

    /// Log level from `-v` count, `error` when quiet
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

/// Install the tracing subscriber. `RUST_LOG` overrides the flag level.
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("fii_fundamentals={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["fii_fundamentals"]);
        let config = args.to_config();

        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.variant, PipelineVariant::Split);
        assert_eq!(config.url_template, DEFAULT_URL_TEMPLATE);
        assert_eq!(config.year, None);
        assert!(config.show_progress);
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_flags_map_onto_config() {
        let args = Args::parse_from([
            "fii_fundamentals",
            "--data-dir",
            "/tmp/fii",
            "--output",
            "/tmp/out.json",
            "--variant",
            "single",
            "--year",
            "2023",
            "--archive-dir",
            "/tmp/archives",
            "--timeout-secs",
            "30",
            "--keep-scratch",
            "--scratch-dir",
            "/tmp/scratch",
            "--quiet",
        ]);
        let config = args.to_config();

        assert_eq!(config.mapping_path(), PathBuf::from("/tmp/fii/fii_cnpj_map.json"));
        assert_eq!(config.output_path(), PathBuf::from("/tmp/out.json"));
        assert_eq!(config.variant, PipelineVariant::Single);
        assert_eq!(config.year, Some(2023));
        assert_eq!(config.archive_dir, Some(PathBuf::from("/tmp/archives")));
        assert_eq!(config.timeout_secs, Some(30));
        assert!(config.keep_scratch);
        assert_eq!(config.scratch_parent, Some(PathBuf::from("/tmp/scratch")));
        assert!(!config.show_progress);
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_verbosity_levels() {
        assert_eq!(Args::parse_from(["x", "-v"]).get_log_level(), "info");
        assert_eq!(Args::parse_from(["x", "-vv"]).get_log_level(), "debug");
        assert_eq!(Args::parse_from(["x", "-vvv"]).get_log_level(), "trace");
        assert!(Args::try_parse_from(["x", "-v", "--quiet"]).is_err());
    }
}
