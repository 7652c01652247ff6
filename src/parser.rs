//! CSV readers for raw readings and for previously written quality files.

use std::fs::File;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime, Timelike};
use csv::StringRecord;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use tracing::debug;

use crate::analyzers::types::{
    DATE_FORMAT, DailyAggregate, Measurements, Parameter, RawReading, TIMESTAMP_COLUMN,
    TIMESTAMP_FORMAT,
};
use crate::error::{QualityError, Result};

/// Field values that count as a missing measurement rather than a parse failure.
const MISSING_TOKENS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Row shape of a raw readings file. Unknown columns are skipped by serde and
/// absent tracked columns default to missing.
#[derive(Debug, Deserialize)]
struct RawRow {
    #[serde(rename = "DATETIMEDATA")]
    timestamp: String,
    #[serde(rename = "O3", default, deserialize_with = "measurement")]
    o3: Option<f64>,
    #[serde(rename = "WS", default, deserialize_with = "measurement")]
    ws: Option<f64>,
    #[serde(rename = "TEMP", default, deserialize_with = "measurement")]
    temp: Option<f64>,
    #[serde(rename = "RH", default, deserialize_with = "measurement")]
    rh: Option<f64>,
    #[serde(rename = "WD", default, deserialize_with = "measurement")]
    wd: Option<f64>,
    #[serde(rename = "PM25", default, deserialize_with = "measurement")]
    pm25: Option<f64>,
}

impl RawRow {
    fn into_reading(self, line: Option<u64>) -> Result<RawReading> {
        let timestamp = parse_timestamp(&self.timestamp).ok_or_else(|| {
            QualityError::parse(
                line,
                format!(
                    "timestamp {:?} does not match {TIMESTAMP_FORMAT}",
                    self.timestamp
                ),
            )
        })?;

        let mut values = Measurements::default();
        values.set(Parameter::O3, self.o3);
        values.set(Parameter::Ws, self.ws);
        values.set(Parameter::Temp, self.temp);
        values.set(Parameter::Rh, self.rh);
        values.set(Parameter::Wd, self.wd);
        values.set(Parameter::Pm25, self.pm25);

        Ok(RawReading::new(timestamp, values))
    }
}

/// Row shape of a `quality_of_*` file.
#[derive(Debug, Deserialize)]
struct QualityRow {
    #[serde(rename = "DATETIMEDATA")]
    date: String,
    #[serde(rename = "O3", default, deserialize_with = "measurement")]
    o3: Option<f64>,
    #[serde(rename = "WS", default, deserialize_with = "measurement")]
    ws: Option<f64>,
    #[serde(rename = "TEMP", default, deserialize_with = "measurement")]
    temp: Option<f64>,
    #[serde(rename = "RH", default, deserialize_with = "measurement")]
    rh: Option<f64>,
    #[serde(rename = "WD", default, deserialize_with = "measurement")]
    wd: Option<f64>,
    #[serde(rename = "PM25", default, deserialize_with = "measurement")]
    pm25: Option<f64>,
    #[serde(rename = "PM25_label")]
    label: String,
}

fn measurement<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => parse_measurement(&s).map_err(serde::de::Error::custom),
    }
}

/// Parses one numeric field, mapping the missing-value tokens (and NaN) to `None`.
pub fn parse_measurement(field: &str) -> std::result::Result<Option<f64>, String> {
    let field = field.trim();
    if MISSING_TOKENS.contains(&field) {
        return Ok(None);
    }
    match field.parse::<f64>() {
        Ok(v) if v.is_nan() => Ok(None),
        Ok(v) => Ok(Some(v)),
        Err(_) => Err(format!("{field:?} is not a number")),
    }
}

/// True when `field` is exactly `DDDD-DD-DD DD:DD:DD`.
fn has_timestamp_shape(field: &str) -> bool {
    let bytes = field.as_bytes();
    bytes.len() == 19
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            10 => *b == b' ',
            13 | 16 => *b == b':',
            _ => b.is_ascii_digit(),
        })
}

/// Parses a timestamp in the literal `YYYY-MM-DD HH:MM:SS` format.
///
/// chrono alone accepts unpadded fields, a sign, and a leap second, so the
/// shape is checked first and leap seconds are rejected after.
pub fn parse_timestamp(field: &str) -> Option<NaiveDateTime> {
    let field = field.trim();
    if !has_timestamp_shape(field) {
        return None;
    }
    NaiveDateTime::parse_from_str(field, TIMESTAMP_FORMAT)
        .ok()
        .filter(|ts| ts.nanosecond() < 1_000_000_000)
}

fn open_reader(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| QualityError::io(path, e))?;
    let mut rdr = csv::Reader::from_reader(file);

    let headers = rdr
        .headers()
        .map_err(|e| QualityError::from_csv(path, e))?;
    if !headers.iter().any(|h| h == TIMESTAMP_COLUMN) {
        return Err(QualityError::parse(
            Some(1),
            format!("missing {TIMESTAMP_COLUMN} column"),
        ));
    }

    Ok(rdr)
}

/// Deserializes every record, pairing each with the line it starts on.
fn read_rows<T: DeserializeOwned>(path: &Path) -> Result<Vec<(Option<u64>, T)>> {
    let mut rdr = open_reader(path)?;
    let headers = rdr
        .headers()
        .map_err(|e| QualityError::from_csv(path, e))?
        .clone();

    let mut rows = Vec::new();
    let mut record = StringRecord::new();
    while rdr
        .read_record(&mut record)
        .map_err(|e| QualityError::from_csv(path, e))?
    {
        let line = record.position().map(|p| p.line());
        let row = record
            .deserialize(Some(&headers))
            .map_err(|e| QualityError::parse(line, e.to_string()))?;
        rows.push((line, row));
    }

    Ok(rows)
}

/// Reads every row of a raw readings CSV.
///
/// # Errors
///
/// Fails on the first malformed timestamp or numeric field; nothing is
/// returned for a partially valid file.
pub fn read_readings(path: &Path) -> Result<Vec<RawReading>> {
    let readings = read_rows::<RawRow>(path)?
        .into_iter()
        .map(|(line, row)| row.into_reading(line))
        .collect::<Result<Vec<_>>>()?;

    debug!(path = %path.display(), rows = readings.len(), "Raw readings loaded");
    Ok(readings)
}

/// Reads a quality file produced by [`crate::output::write_quality`].
pub fn read_quality(path: &Path) -> Result<Vec<DailyAggregate>> {
    let mut days = Vec::new();

    for (line, row) in read_rows::<QualityRow>(path)? {
        let date = NaiveDate::parse_from_str(row.date.trim(), DATE_FORMAT).map_err(|_| {
            QualityError::parse(line, format!("date {:?} does not match {DATE_FORMAT}", row.date))
        })?;
        let pm25_label = row
            .label
            .parse()
            .map_err(|e: String| QualityError::parse(line, e))?;

        let mut means = Measurements::default();
        means.set(Parameter::O3, row.o3);
        means.set(Parameter::Ws, row.ws);
        means.set(Parameter::Temp, row.temp);
        means.set(Parameter::Rh, row.rh);
        means.set(Parameter::Wd, row.wd);
        means.set(Parameter::Pm25, row.pm25);

        days.push(DailyAggregate {
            date,
            means,
            pm25_label,
        });
    }

    Ok(days)
}
