//! Trait and types for interacting with a station history provider.

use anyhow::Result;
use serde_json::{Map, Value};

/// Parameters requested when the caller does not name any.
pub const DEFAULT_PARAMS: &str = "PM25,PM10,O3,CO,NO2,SO2,WS,TEMP,RH,WD";

/// A request for one station's historical readings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryQuery {
    pub station_id: String,
    pub params: Vec<String>,
    /// Sampling type understood by the provider, `hr` for hourly.
    pub data_type: String,
    /// Inclusive start date, `YYYY-MM-DD`.
    pub start_date: String,
    /// Inclusive end date, `YYYY-MM-DD`.
    pub end_date: String,
    pub start_hour: String,
    pub end_hour: String,
}

impl HistoryQuery {
    pub fn new(station_id: impl Into<String>) -> Self {
        Self {
            station_id: station_id.into(),
            params: split_params(DEFAULT_PARAMS),
            data_type: "hr".to_string(),
            start_date: "2023-12-29".to_string(),
            end_date: "2024-03-05".to_string(),
            start_hour: "00".to_string(),
            end_hour: "23".to_string(),
        }
    }

    pub fn with_params(mut self, params: Vec<String>) -> Self {
        self.params = params;
        self
    }

    pub fn with_dates(mut self, start_date: &str, end_date: &str) -> Self {
        self.start_date = start_date.to_string();
        self.end_date = end_date.to_string();
        self
    }

    /// The parameter list as the provider expects it, comma separated.
    pub fn param_list(&self) -> String {
        self.params.join(",")
    }
}

/// Splits a comma-separated parameter list, dropping blanks.
pub fn split_params(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// One timestamped row of a station's history.
#[derive(Debug, Clone, PartialEq)]
pub struct StationRecord {
    pub station_id: String,
    /// `DATETIMEDATA` exactly as the provider sent it.
    pub timestamp: String,
    /// Parameter name to JSON scalar; `null` for a missing reading.
    pub values: Map<String, Value>,
}

/// Abstraction over a station history provider (e.g., air4thai).
#[async_trait::async_trait]
pub trait HistoryApi {
    /// Returns all records for the query's station and date range.
    async fn station_history(&self, query: &HistoryQuery) -> Result<Vec<StationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_query() {
        let q = HistoryQuery::new("44t");
        assert_eq!(q.param_list(), DEFAULT_PARAMS);
        assert_eq!(q.data_type, "hr");
        assert_eq!((q.start_hour.as_str(), q.end_hour.as_str()), ("00", "23"));
    }

    #[test]
    fn test_split_params_trims_and_drops_blanks() {
        assert_eq!(split_params(" PM25, O3,,WS "), vec!["PM25", "O3", "WS"]);
        assert!(split_params("").is_empty());
    }
}
