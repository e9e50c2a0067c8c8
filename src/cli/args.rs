use crate::config::EngineConfig;
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Run funds transfers between accounts and report final balances
#[derive(Parser, Debug)]
#[command(name = "transfer-engine")]
#[command(
    about = "Run funds transfers between accounts and report final balances",
    long_about = None
)]
pub struct CliArgs {
    /// Transfers CSV file path (sender,receiver,amount)
    #[arg(value_name = "TRANSFERS", help = "Path to the transfers CSV file")]
    pub input_file: PathBuf,

    /// Seed accounts CSV file path (id,name,email,balance)
    #[arg(
        long = "accounts",
        value_name = "FILE",
        help = "Path to the accounts CSV file used to seed balances"
    )]
    pub accounts_file: PathBuf,

    /// Processing strategy to use for running transfers
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transfers per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of transfers per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Maximum number of transfers in flight (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Maximum number of transfers running concurrently (default: CPU cores)"
    )]
    pub max_concurrent: Option<usize>,

    /// Bounded wait for each account lock
    #[arg(
        long = "lock-timeout-ms",
        value_name = "MILLIS",
        default_value_t = EngineConfig::DEFAULT_LOCK_TIMEOUT_MS,
        help = "Milliseconds to wait for an account lock before aborting a transfer"
    )]
    pub lock_timeout_ms: u64,

    /// Also write the transaction log to this file
    #[arg(long = "transactions-out", value_name = "FILE")]
    pub transactions_out: Option<PathBuf>,

    /// Include system failure detail in logged rejection messages
    #[arg(long = "expose-errors")]
    pub expose_errors: bool,

    /// Log level used when RUST_LOG is not set
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "info")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long = "log-json")]
    pub log_json: bool,
}

/// Available processing strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Missing values take their defaults; zero values fall back to the
    /// defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent.unwrap_or(default.max_concurrent),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create the engine configuration from CLI arguments
    pub fn to_engine_config(&self) -> EngineConfig {
        EngineConfig::new(self.lock_timeout_ms, self.expose_errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::path::Path;

    #[rstest]
    #[case::default_strategy(&["program", "--accounts", "a.csv", "t.csv"], StrategyType::Async)]
    #[case::explicit_sync(&["program", "--accounts", "a.csv", "--strategy", "sync", "t.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "--accounts", "a.csv", "t.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[test]
    fn test_paths_and_defaults() {
        let parsed = CliArgs::try_parse_from(["program", "--accounts", "a.csv", "t.csv"]).unwrap();

        assert_eq!(parsed.input_file, Path::new("t.csv"));
        assert_eq!(parsed.accounts_file, Path::new("a.csv"));
        assert_eq!(parsed.transactions_out, None);
        assert_eq!(parsed.log_level, "info");
        assert!(!parsed.log_json);
        assert_eq!(parsed.to_engine_config(), EngineConfig::default());
    }

    #[rstest]
    #[case::batch_size(&["program", "--accounts", "a.csv", "--batch-size", "2000", "t.csv"], 2000, num_cpus::get())]
    #[case::max_concurrent(&["program", "--accounts", "a.csv", "--max-concurrent", "8", "t.csv"], 1000, 8)]
    #[case::no_options(&["program", "--accounts", "a.csv", "t.csv"], 1000, num_cpus::get())]
    #[case::zero_batch_size(&["program", "--accounts", "a.csv", "--batch-size", "0", "t.csv"], 1000, num_cpus::get())]
    #[case::zero_max_concurrent(&["program", "--accounts", "a.csv", "--max-concurrent", "0", "t.csv"], 1000, num_cpus::get())]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent, expected_max_concurrent);
    }

    #[rstest]
    #[case::custom(&["program", "--accounts", "a.csv", "--lock-timeout-ms", "250", "--expose-errors", "t.csv"], 250, true)]
    #[case::zero_timeout(&["program", "--accounts", "a.csv", "--lock-timeout-ms", "0", "t.csv"], EngineConfig::DEFAULT_LOCK_TIMEOUT_MS, false)]
    fn test_engine_config_conversion(
        #[case] args: &[&str],
        #[case] expected_timeout: u64,
        #[case] expected_expose: bool,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_engine_config();

        assert_eq!(config.lock_timeout_ms, expected_timeout);
        assert_eq!(config.expose_failure_detail, expected_expose);
    }

    #[test]
    fn test_logging_and_output_flags() {
        let parsed = CliArgs::try_parse_from([
            "program",
            "--accounts",
            "a.csv",
            "--transactions-out",
            "tx.csv",
            "--log-level",
            "debug",
            "--log-json",
            "t.csv",
        ])
        .unwrap();

        assert_eq!(parsed.transactions_out.as_deref(), Some(Path::new("tx.csv")));
        assert_eq!(parsed.log_level, "debug");
        assert!(parsed.log_json);
    }

    #[rstest]
    #[case::missing_input(&["program", "--accounts", "a.csv"])]
    #[case::missing_accounts(&["program", "t.csv"])]
    #[case::invalid_strategy(&["program", "--accounts", "a.csv", "--strategy", "invalid", "t.csv"])]
    #[case::invalid_timeout(&["program", "--accounts", "a.csv", "--lock-timeout-ms", "soon", "t.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
