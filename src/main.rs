//! Rust Transfer Engine CLI
//!
//! Runs a file of funds transfers against a seeded set of accounts.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- --accounts accounts.csv transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --strategy sync transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --batch-size 500 --max-concurrent 8 transfers.csv > balances.csv
//! cargo run -- --accounts accounts.csv --transactions-out log.csv --log-json transfers.csv > balances.csv
//! ```
//!
//! Final balances are written to stdout; logs go to stderr.
//!
//! # Processing Strategies
//!
//! - **sync**: One transfer at a time, in file order
//! - **async**: Concurrent transfers within each batch (default)
//!
//! # Exit Codes
//!
//! - 0: Success (rejected transfers included)
//! - 1: Fatal error (missing arguments, unreadable file, invalid seed account, etc.)

use rust_transfer_engine::cli;
use rust_transfer_engine::io::write_transactions_csv;
use rust_transfer_engine::logging;
use rust_transfer_engine::strategy::{self, RunReport};
use std::fs::File;
use std::io::BufWriter;
use std::process;

fn run(args: &cli::CliArgs) -> Result<RunReport, String> {
    let batch = if args.strategy == cli::StrategyType::Async {
        Some(args.to_batch_config())
    } else {
        None
    };
    let strategy = strategy::create_strategy(args.strategy, batch, args.to_engine_config());

    let mut output = std::io::stdout();
    let report = strategy.process(&args.accounts_file, &args.input_file, &mut output)?;

    if let Some(path) = &args.transactions_out {
        let file = File::create(path)
            .map_err(|e| format!("Failed to create file '{}': {}", path.display(), e))?;
        write_transactions_csv(&report.transactions, &mut BufWriter::new(file))?;
    }

    Ok(report)
}

fn main() {
    let args = cli::parse_args();

    if let Err(e) = logging::init_logging(&args.log_level, args.log_json) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    if let Err(e) = run(&args) {
        tracing::error!(error = %e, "Run failed");
        process::exit(1);
    }
}
