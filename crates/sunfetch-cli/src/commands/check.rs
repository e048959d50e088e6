use sunfetch_core::ForecastService;

use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(service: &ForecastService) -> Result<CommandOutcome, CliError> {
    let report = service.test_connectivity().await;
    Ok(CommandOutcome {
        failed: !report.is_success(),
        data: serde_json::to_value(report)?,
    })
}
