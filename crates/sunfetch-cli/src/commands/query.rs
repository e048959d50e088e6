use std::fs;

use serde::Serialize;
use sunfetch_core::{ForecastService, QueryDescriptor, TargetResult, TimeRange, TimeSeries};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::cli::QueryArgs;
use crate::error::CliError;

use super::CommandOutcome;

#[derive(Debug, Serialize)]
struct QueryResponseData {
    results: Vec<TargetOutput>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum TargetOutput {
    Ok {
        #[serde(flatten)]
        series: TimeSeries,
    },
    Error {
        #[serde(rename = "refId")]
        ref_id: String,
        code: &'static str,
        message: String,
    },
}

impl From<TargetResult> for TargetOutput {
    fn from(result: TargetResult) -> Self {
        match result {
            Ok(series) => Self::Ok { series },
            Err(failure) => Self::Error {
                code: failure.error.code(),
                message: failure.error.message().to_owned(),
                ref_id: failure.ref_id,
            },
        }
    }
}

pub async fn run(args: &QueryArgs, service: &ForecastService) -> Result<CommandOutcome, CliError> {
    let content = fs::read_to_string(&args.targets)?;
    let descriptors: Vec<QueryDescriptor> = serde_json::from_str(&content)?;
    let time_range = time_range(args.from.as_deref(), args.to.as_deref())?;

    let results = service.run_query(&descriptors, time_range).await;
    let failed = results.iter().any(Result::is_err);
    let data = serde_json::to_value(QueryResponseData {
        results: results.into_iter().map(TargetOutput::from).collect(),
    })?;

    Ok(CommandOutcome { data, failed })
}

fn time_range(from: Option<&str>, to: Option<&str>) -> Result<Option<TimeRange>, CliError> {
    let (Some(from), Some(to)) = (from, to) else {
        return Ok(None);
    };

    let from = parse_instant(from)?;
    let to = parse_instant(to)?;
    if from > to {
        return Err(CliError::Command(String::from(
            "--from must not be later than --to",
        )));
    }
    Ok(Some(TimeRange { from, to }))
}

fn parse_instant(raw: &str) -> Result<OffsetDateTime, CliError> {
    OffsetDateTime::parse(raw, &Rfc3339)
        .map_err(|error| CliError::Command(format!("invalid RFC 3339 time '{raw}': {error}")))
}
