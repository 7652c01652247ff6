//! Output formatting and persistence.
//!
//! Writes daily quality tables and fetched station records as CSV, and logs
//! views as pretty-printed JSON.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use tracing::{debug, info};

use crate::analyzers::types::{DATE_FORMAT, DailyAggregate, Parameter, TIMESTAMP_COLUMN};
use crate::error::QualityError;
use crate::services::history_api::StationRecord;

/// Prefix of the file a quality run writes next to its input.
pub const QUALITY_PREFIX: &str = "quality_of_";

/// Derives `quality_of_<name>` in the same directory as `input`.
pub fn quality_output_path(input: &Path) -> Result<PathBuf, QualityError> {
    let name = input.file_name().ok_or_else(|| {
        QualityError::io(
            input,
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "input has no file name"),
        )
    })?;

    let mut out_name = std::ffi::OsString::from(QUALITY_PREFIX);
    out_name.push(name);
    Ok(input.with_file_name(out_name))
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.2}")).unwrap_or_default()
}

/// Renders the daily quality table as CSV bytes.
///
/// Columns are `DATETIMEDATA,O3,WS,TEMP,RH,WD,PM25,PM25_label`; numbers use
/// two decimals and missing means are written as empty fields.
pub fn render_quality(days: &[DailyAggregate]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = Writer::from_writer(Vec::new());

    let mut header = vec![TIMESTAMP_COLUMN];
    header.extend(Parameter::ALL.iter().map(|p| p.column()));
    header.push("PM25_label");
    writer.write_record(&header)?;

    for day in days {
        let mut record = vec![day.date.format(DATE_FORMAT).to_string()];
        record.extend(day.means.iter().map(|(_, v)| format_value(v)));
        record.push(day.pm25_label.to_string());
        writer.write_record(&record)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

/// Writes the daily quality table to `path` in a single write.
///
/// The whole file is rendered in memory first, so a failure never leaves a
/// half-written table behind from this call.
pub fn write_quality(path: &Path, days: &[DailyAggregate]) -> Result<(), QualityError> {
    let bytes = render_quality(days).map_err(|e| QualityError::from_csv(path, e))?;
    fs::write(path, bytes).map_err(|e| QualityError::io(path, e))?;

    info!(path = %path.display(), days = days.len(), "Quality table written");
    Ok(())
}

fn json_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None | Some(serde_json::Value::Null) => String::new(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Writes fetched station history as a raw readings CSV.
///
/// Columns are `DATETIMEDATA`, then `params` in request order, then
/// `stationID`. Overwrites any existing file.
pub fn write_station_records(path: &str, params: &[String], records: &[StationRecord]) -> Result<()> {
    debug!(path, rows = records.len(), "Writing station records");

    let mut writer = WriterBuilder::new().has_headers(false).from_path(path)?;

    let mut header = vec![TIMESTAMP_COLUMN.to_string()];
    header.extend(params.iter().cloned());
    header.push("stationID".to_string());
    writer.write_record(&header)?;

    for record in records {
        let mut row = vec![record.timestamp.clone()];
        row.extend(params.iter().map(|p| json_cell(record.values.get(p))));
        row.push(record.station_id.clone());
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl std::fmt::Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::quality::QualityLabel;
    use crate::analyzers::types::Measurements;
    use chrono::NaiveDate;
    use serde_json::json;
    use std::env;

    fn temp_path(name: &str) -> String {
        format!("{}/{}", env::temp_dir().display(), name)
    }

    fn day(date: &str, pm25: Option<f64>) -> DailyAggregate {
        let mut means = Measurements::default();
        means.set(Parameter::Pm25, pm25);
        DailyAggregate {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            means,
            pm25_label: QualityLabel::from_pm25(pm25),
        }
    }

    #[test]
    fn test_quality_output_path_prefixes_file_name() {
        let out = quality_output_path(Path::new("team_project/model_real.csv")).unwrap();
        assert_eq!(out, Path::new("team_project/quality_of_model_real.csv"));

        let out = quality_output_path(Path::new("data.csv")).unwrap();
        assert_eq!(out, Path::new("quality_of_data.csv"));
    }

    #[test]
    fn test_quality_output_path_rejects_dir() {
        assert!(quality_output_path(Path::new("/")).is_err());
    }

    #[test]
    fn test_render_quality_layout() {
        let days = vec![day("2024-02-01", Some(25.0)), day("2024-02-02", None)];

        let text = String::from_utf8(render_quality(&days).unwrap()).unwrap();

        assert_eq!(
            text,
            "DATETIMEDATA,O3,WS,TEMP,RH,WD,PM25,PM25_label\n\
             2024-02-01,,,,,,25.00,very good\n\
             2024-02-02,,,,,,,Unknown\n"
        );
    }

    #[test]
    fn test_format_value_two_decimals() {
        assert_eq!(format_value(Some(100.0)), "100.00");
        assert_eq!(format_value(Some(3.14159)), "3.14");
        assert_eq!(format_value(None), "");
    }

    #[test]
    fn test_write_station_records() {
        let path = temp_path("air_quality_test_station_records.csv");
        let _ = fs::remove_file(&path);

        let params = vec!["PM25".to_string(), "O3".to_string()];
        let records = vec![StationRecord {
            station_id: "44t".to_string(),
            timestamp: "2024-02-01 00:00:00".to_string(),
            values: [
                ("PM25".to_string(), json!(21.5)),
                ("O3".to_string(), serde_json::Value::Null),
            ]
            .into_iter()
            .collect(),
        }];

        write_station_records(&path, &params, &records).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "DATETIMEDATA,PM25,O3,stationID\n2024-02-01 00:00:00,21.5,,44t\n"
        );

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_print_json_does_not_panic() {
        print_json(&json!({"PM25": 25.0})).unwrap();
    }
}
