//! CLI argument definitions for sunfetch.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `query` | Run a batch of forecast targets against a data source |
//! | `test` | Check connectivity of a data source |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--forecast-solar-key` | `false` | A Forecast.Solar key is stored in the relay |
//! | `--solcast-key` | `false` | A Solcast key is stored in the relay |
//!
//! # Examples
//!
//! ```bash
//! sunfetch query --config datasource.json --targets targets.json --pretty
//! SUNFETCH_SOLCAST_KEY_SET=1 sunfetch test --config solcast.json
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Solar forecast retrieval CLI
#[derive(Debug, Parser)]
#[command(
    name = "sunfetch",
    author,
    version,
    about = "Solar production forecast retrieval",
    long_about = "Fetches solar production forecasts through a credential-injecting relay, \
normalizes them into ordered time series and prints the result as JSON.\n\
\n\
Logging goes to stderr and is controlled by SUNFETCH_LOG (default: warn)."
)]
pub struct Cli {
    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Mark the Forecast.Solar key as present in secure storage.
    ///
    /// Also set by SUNFETCH_FORECAST_SOLAR_KEY_SET.
    #[arg(long, global = true)]
    pub forecast_solar_key: bool,

    /// Mark the Solcast key as present in secure storage.
    ///
    /// Also set by SUNFETCH_SOLCAST_KEY_SET.
    #[arg(long, global = true)]
    pub solcast_key: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run query targets and print one series or error per target.
    Query(QueryArgs),
    /// Issue one uncached request with the configured defaults.
    Test(TestArgs),
}

#[derive(Debug, Args)]
pub struct QueryArgs {
    /// Data-source configuration file (JSON).
    #[arg(long)]
    pub config: PathBuf,

    /// File holding a JSON array of query targets.
    #[arg(long)]
    pub targets: PathBuf,

    /// Start of the dashboard time range (RFC 3339).
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End of the dashboard time range (RFC 3339).
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct TestArgs {
    /// Data-source configuration file (JSON).
    #[arg(long)]
    pub config: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_requires_config_and_targets() {
        let cli = Cli::try_parse_from([
            "sunfetch",
            "query",
            "--config",
            "source.json",
            "--targets",
            "targets.json",
            "--pretty",
        ])
        .expect("valid arguments");

        assert!(cli.pretty);
        match cli.command {
            Command::Query(args) => {
                assert_eq!(args.config, PathBuf::from("source.json"));
                assert!(args.from.is_none());
            }
            Command::Test(_) => panic!("expected query command"),
        }
        assert!(Cli::try_parse_from(["sunfetch", "query", "--config", "source.json"]).is_err());
    }

    #[test]
    fn time_range_bounds_come_in_pairs() {
        let result = Cli::try_parse_from([
            "sunfetch",
            "query",
            "--config",
            "a.json",
            "--targets",
            "b.json",
            "--from",
            "2025-07-06T00:00:00Z",
        ]);

        assert!(result.is_err());
    }
}
