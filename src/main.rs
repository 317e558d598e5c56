use std::io;

use anyhow::Result;
use clap::Parser;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

use rwlist::config::{BenchConfig, CliArgs, Prompter};
use rwlist::harness;

fn setup_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        Level::ERROR
    } else if verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };

    // stdout belongs to the prompts and the report
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(io::stderr)
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("failed to set up logging: {}", e);
    }
}

fn run() -> Result<()> {
    let args = CliArgs::parse();
    setup_logging(args.verbose, args.quiet);

    let stdin = io::stdin();
    let mut prompter = Prompter::new(stdin.lock(), io::stdout());
    let config = BenchConfig::from_cli(&args, &mut prompter)
        .map_err(|e| anyhow::anyhow!("Configuration error: {}", e))?;

    for report in harness::run(&config) {
        println!("{}", report);
        if report.failed_workers > 0 {
            println!("({} worker(s) did not run to completion)", report.failed_workers);
        }
    }
    Ok(())
}

fn main() {
    if let Err(e) = run() {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}
