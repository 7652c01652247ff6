use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::analyzers::types::TIMESTAMP_COLUMN;
use crate::fetch::{HttpClient, fetch_bytes};
use crate::services::history_api::{HistoryApi, HistoryQuery, StationRecord};

pub const DEFAULT_BASE_URL: &str = "http://air4thai.com/forweb/getHistoryData.php";

#[derive(Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    stations: Vec<StationPayload>,
}

#[derive(Deserialize)]
struct StationPayload {
    #[serde(rename = "stationID")]
    station_id: String,
    #[serde(default)]
    data: Vec<Map<String, Value>>,
}

pub struct Air4ThaiClient<C> {
    http: C,
    base_url: String,
}

impl<C: HttpClient> Air4ThaiClient<C> {
    pub fn new(http: C, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// Builds the history request URL for `query`.
    pub fn history_url(&self, query: &HistoryQuery) -> Result<Url> {
        Url::parse_with_params(
            &self.base_url,
            &[
                ("stationID", query.station_id.as_str()),
                ("param", query.param_list().as_str()),
                ("type", query.data_type.as_str()),
                ("sdate", query.start_date.as_str()),
                ("edate", query.end_date.as_str()),
                ("stime", query.start_hour.as_str()),
                ("etime", query.end_hour.as_str()),
            ],
        )
        .with_context(|| format!("invalid history base URL '{}'", self.base_url))
    }
}

/// Decodes a history payload, tagging every record with its station id.
///
/// Only the first station in the payload is used.
pub fn parse_history(bytes: &[u8]) -> Result<Vec<StationRecord>> {
    let response: HistoryResponse =
        serde_json::from_slice(bytes).context("Failed to parse history response")?;

    let station = response
        .stations
        .into_iter()
        .next()
        .ok_or_else(|| anyhow::anyhow!("History response contains no stations"))?;

    station
        .data
        .into_iter()
        .map(|mut values| {
            let timestamp = match values.remove(TIMESTAMP_COLUMN) {
                Some(Value::String(s)) => s,
                other => anyhow::bail!("record without a {TIMESTAMP_COLUMN} string: {other:?}"),
            };
            Ok(StationRecord {
                station_id: station.station_id.clone(),
                timestamp,
                values,
            })
        })
        .collect()
}

#[async_trait]
impl<C: HttpClient> HistoryApi for Air4ThaiClient<C> {
    #[tracing::instrument(skip(self), fields(station_id = %query.station_id))]
    async fn station_history(&self, query: &HistoryQuery) -> Result<Vec<StationRecord>> {
        let url = self.history_url(query)?;
        debug!(%url, "Requesting station history");

        let bytes = fetch_bytes(&self.http, url.as_str())
            .await
            .with_context(|| format!("History request failed for station '{}'", query.station_id))?;

        let records = parse_history(&bytes)?;
        info!(rows = records.len(), "Station history received");
        Ok(records)
    }
}
