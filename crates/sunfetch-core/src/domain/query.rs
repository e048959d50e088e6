use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, Duration};

use crate::domain::location::InlineLocation;
use crate::{ProviderId, ValidationError};

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Canonical metric catalogue.
///
/// The string form of each metric is the key it is stored under in a
/// [`CanonicalResult`](crate::CanonicalResult).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Metric {
    /// Instantaneous power in watts.
    #[serde(rename = "watts", alias = "power")]
    Power,
    /// Energy accumulated since the start of the day, in watt hours.
    #[serde(rename = "watt_hours", alias = "cumulativeEnergy")]
    CumulativeEnergy,
    /// Energy produced within each reporting period, in watt hours.
    #[serde(rename = "watt_hours_period", alias = "periodEnergy")]
    PeriodEnergy,
    /// Daily energy totals, keyed by calendar date.
    #[serde(rename = "watt_hours_day", alias = "dailyEnergy")]
    DailyEnergy,
    /// Measured or modelled past production from the history endpoint.
    #[serde(rename = "historical_watt_hours", alias = "historicalEnergy")]
    HistoricalEnergy,
}

/// Legacy key the history series is also exposed under.
pub const LEGACY_HISTORY_KEY: &str = "watt_hours_history";

impl Metric {
    pub const FORECAST: [Self; 4] = [
        Self::Power,
        Self::PeriodEnergy,
        Self::CumulativeEnergy,
        Self::DailyEnergy,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Power => "watts",
            Self::CumulativeEnergy => "watt_hours",
            Self::PeriodEnergy => "watt_hours_period",
            Self::DailyEnergy => "watt_hours_day",
            Self::HistoricalEnergy => "historical_watt_hours",
        }
    }
}

impl Display for Metric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "watts" | "power" => Ok(Self::Power),
            "watt_hours" | "cumulativeEnergy" => Ok(Self::CumulativeEnergy),
            "watt_hours_period" | "periodEnergy" => Ok(Self::PeriodEnergy),
            "watt_hours_day" | "dailyEnergy" => Ok(Self::DailyEnergy),
            "historical_watt_hours" | "historicalEnergy" => Ok(Self::HistoricalEnergy),
            other => Err(ValidationError::InvalidMetric {
                value: other.to_owned(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    #[default]
    Forecast,
    Historical,
}

impl DataType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Forecast => "forecast",
            Self::Historical => "historical",
        }
    }
}

impl FromStr for DataType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "forecast" => Ok(Self::Forecast),
            "historical" | "history" => Ok(Self::Historical),
            other => Err(ValidationError::InvalidDataType {
                value: other.to_owned(),
            }),
        }
    }
}

/// Day selection applied to a canonical result before it is emitted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ForecastPeriod {
    #[default]
    Today,
    Tomorrow,
    /// `today + n` for n in 2..=6.
    DayPlus(u8),
    All,
}

impl ForecastPeriod {
    /// Day offset relative to today, or `None` for [`ForecastPeriod::All`].
    pub const fn offset_days(self) -> Option<i64> {
        match self {
            Self::Today => Some(0),
            Self::Tomorrow => Some(1),
            Self::DayPlus(n) => Some(n as i64),
            Self::All => None,
        }
    }

    pub fn label(self) -> String {
        match self {
            Self::Today => String::from("today"),
            Self::Tomorrow => String::from("tomorrow"),
            Self::DayPlus(n) => format!("day{n}"),
            Self::All => String::from("all"),
        }
    }
}

impl FromStr for ForecastPeriod {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "today" => return Ok(Self::Today),
            "tomorrow" => return Ok(Self::Tomorrow),
            "all" => return Ok(Self::All),
            _ => {}
        }

        normalized
            .strip_prefix("day")
            .map(|rest| rest.trim_start_matches('+'))
            .and_then(|digits| digits.parse::<u8>().ok())
            .filter(|offset| (2..=6).contains(offset))
            .map(Self::DayPlus)
            .ok_or(ValidationError::InvalidForecastPeriod {
                value: value.to_owned(),
            })
    }
}

impl TryFrom<String> for ForecastPeriod {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ForecastPeriod> for String {
    fn from(value: ForecastPeriod) -> Self {
        value.label()
    }
}

impl Display for ForecastPeriod {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.label())
    }
}

/// Inclusive calendar date range used by the history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange", into = "RawDateRange")]
pub struct DateRange {
    start: Date,
    end: Date,
}

#[derive(Serialize, Deserialize)]
struct RawDateRange {
    start: String,
    end: String,
}

impl DateRange {
    pub fn new(start: Date, end: Date) -> Result<Self, ValidationError> {
        if start > end {
            return Err(ValidationError::InvertedDateRange {
                start: format_date(start),
                end: format_date(end),
            });
        }
        Ok(Self { start, end })
    }

    pub fn parse(start: &str, end: &str) -> Result<Self, ValidationError> {
        Self::new(parse_date(start)?, parse_date(end)?)
    }

    /// The seven days leading up to and including `today`.
    pub fn trailing_week(today: Date) -> Self {
        Self {
            start: today.saturating_sub(Duration::days(7)),
            end: today,
        }
    }

    pub const fn start(&self) -> Date {
        self.start
    }

    pub const fn end(&self) -> Date {
        self.end
    }

    pub fn start_str(&self) -> String {
        format_date(self.start)
    }

    pub fn end_str(&self) -> String {
        format_date(self.end)
    }
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = ValidationError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        Self::parse(&raw.start, &raw.end)
    }
}

impl From<DateRange> for RawDateRange {
    fn from(range: DateRange) -> Self {
        Self {
            start: range.start_str(),
            end: range.end_str(),
        }
    }
}

pub fn parse_date(value: &str) -> Result<Date, ValidationError> {
    Date::parse(value.trim(), DATE_FORMAT).map_err(|_| ValidationError::InvalidDate {
        value: value.to_owned(),
    })
}

pub fn format_date(date: Date) -> String {
    let (year, month, day) = date.to_calendar_date();
    format!("{year:04}-{:02}-{day:02}", u8::from(month))
}

/// A single visualization target as handed over by the hosting collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryDescriptor {
    pub ref_id: String,
    /// Overrides the data source's configured provider for this target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderId>,
    pub metric: Metric,
    #[serde(default)]
    pub data_type: DataType,
    #[serde(default)]
    pub forecast_period: ForecastPeriod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    /// Forces the inline parameters even when `location_id` is set.
    #[serde(default)]
    pub use_custom_location: bool,
    #[serde(default)]
    pub custom_location: InlineLocation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_range: Option<DateRange>,
}

impl QueryDescriptor {
    pub fn new(ref_id: impl Into<String>, metric: Metric) -> Self {
        Self {
            ref_id: ref_id.into(),
            provider: None,
            metric,
            data_type: DataType::Forecast,
            forecast_period: ForecastPeriod::Today,
            location_id: None,
            use_custom_location: false,
            custom_location: InlineLocation::default(),
            site_id: None,
            date_range: None,
        }
    }

    pub fn with_provider(mut self, provider: ProviderId) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_period(mut self, period: ForecastPeriod) -> Self {
        self.forecast_period = period;
        self
    }

    pub fn with_location_id(mut self, location_id: impl Into<String>) -> Self {
        self.location_id = Some(location_id.into());
        self
    }

    pub fn with_custom_location(mut self, location: InlineLocation) -> Self {
        self.use_custom_location = true;
        self.custom_location = location;
        self
    }

    pub fn with_site_id(mut self, site_id: impl Into<String>) -> Self {
        self.site_id = Some(site_id.into());
        self
    }

    pub fn historical(mut self, date_range: Option<DateRange>) -> Self {
        self.data_type = DataType::Historical;
        self.date_range = date_range;
        self
    }
}
