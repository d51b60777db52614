use anyhow::Context;
use clap::Parser;
use fii_fundamentals::FundamentalsProcessor;
use fii_fundamentals::cli::{Args, setup_logging};
use fii_fundamentals::processor::print_summary;
use std::process;

fn main() {
    let args = Args::parse();
    setup_logging(&args);

    let result = run(&args);

    match result {
        Ok(()) => process::exit(0),
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("Failed to create async runtime")?;

    let processor = FundamentalsProcessor::new(args.to_config());
    let stats = runtime.block_on(processor.process())?;

    if !args.quiet {
        print_summary(&stats);
    }
    Ok(())
}
