mod query;
mod check;

use std::env;
use std::path::Path;

use serde_json::Value;
use sunfetch_core::{DataSourceConfig, ForecastService, SecureFlags};

use crate::cli::{Cli, Command};
use crate::error::CliError;

const FORECAST_SOLAR_KEY_ENV: &str = "SUNFETCH_FORECAST_SOLAR_KEY_SET";
const SOLCAST_KEY_ENV: &str = "SUNFETCH_SOLCAST_KEY_SET";

/// Rendered command output and whether any part of it failed.
pub struct CommandOutcome {
    pub data: Value,
    pub failed: bool,
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let secure_flags = secure_flags(cli);

    match &cli.command {
        Command::Query(args) => {
            let service = build_service(&args.config, secure_flags)?;
            query::run(args, &service).await
        }
        Command::Test(args) => {
            let service = build_service(&args.config, secure_flags)?;
            check::run(&service).await
        }
    }
}

fn build_service(config: &Path, secure_flags: SecureFlags) -> Result<ForecastService, CliError> {
    let config = DataSourceConfig::load(config)?;
    tracing::debug!(
        provider = %config.provider,
        locations = config.locations.len(),
        "loaded data source config"
    );
    Ok(ForecastService::builder(config)
        .with_secure_flags(secure_flags)
        .build())
}

fn secure_flags(cli: &Cli) -> SecureFlags {
    SecureFlags {
        forecast_solar_key: cli.forecast_solar_key || env_flag(FORECAST_SOLAR_KEY_ENV),
        solcast_key: cli.solcast_key || env_flag(SOLCAST_KEY_ENV),
    }
}

fn env_flag(name: &str) -> bool {
    env::var(name)
        .map(|value| is_truthy(&value))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
