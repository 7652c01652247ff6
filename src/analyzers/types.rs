//! Data types used by the aggregation pipeline.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::analyzers::quality::QualityLabel;

/// Name of the timestamp column in raw input and of the date column in output.
pub const TIMESTAMP_COLUMN: &str = "DATETIMEDATA";

/// Literal format every raw timestamp must match.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Format of the per-day identifier in the quality output.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The six measured parameters carried through aggregation, in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Parameter {
    #[serde(rename = "O3")]
    O3,
    #[serde(rename = "WS")]
    Ws,
    #[serde(rename = "TEMP")]
    Temp,
    #[serde(rename = "RH")]
    Rh,
    #[serde(rename = "WD")]
    Wd,
    #[serde(rename = "PM25")]
    Pm25,
}

impl Parameter {
    pub const ALL: [Parameter; 6] = [
        Parameter::O3,
        Parameter::Ws,
        Parameter::Temp,
        Parameter::Rh,
        Parameter::Wd,
        Parameter::Pm25,
    ];

    /// Column header used in both raw and aggregated CSV files.
    pub fn column(self) -> &'static str {
        match self {
            Parameter::O3 => "O3",
            Parameter::Ws => "WS",
            Parameter::Temp => "TEMP",
            Parameter::Rh => "RH",
            Parameter::Wd => "WD",
            Parameter::Pm25 => "PM25",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

impl FromStr for Parameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.column().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown parameter '{s}'"))
    }
}

/// One optional value per tracked [`Parameter`]. `None` is a missing measurement.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Measurements([Option<f64>; 6]);

impl Measurements {
    pub fn get(&self, parameter: Parameter) -> Option<f64> {
        self.0[parameter.index()]
    }

    pub fn set(&mut self, parameter: Parameter, value: Option<f64>) {
        self.0[parameter.index()] = value;
    }

    pub fn with(mut self, parameter: Parameter, value: f64) -> Self {
        self.set(parameter, Some(value));
        self
    }

    /// Iterates `(parameter, value)` pairs in output order.
    pub fn iter(&self) -> impl Iterator<Item = (Parameter, Option<f64>)> + '_ {
        Parameter::ALL.into_iter().map(|p| (p, self.get(p)))
    }
}

/// A single timestamped row from a raw readings file.
#[derive(Debug, Clone, PartialEq)]
pub struct RawReading {
    pub timestamp: NaiveDateTime,
    pub values: Measurements,
}

impl RawReading {
    pub fn new(timestamp: NaiveDateTime, values: Measurements) -> Self {
        Self { timestamp, values }
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// One calendar day of averaged readings with its PM2.5 quality label.
#[derive(Debug, Clone, PartialEq)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub means: Measurements,
    pub pm25_label: QualityLabel,
}

impl DailyAggregate {
    pub fn pm25(&self) -> Option<f64> {
        self.means.get(Parameter::Pm25)
    }
}
