//! Dashboard views: pure functions from a dataset and filter to the series
//! and summary statistics a presentation layer renders.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

use crate::analyzers::analyzer::Dataset;
use crate::analyzers::types::{Parameter, RawReading};
use crate::analyzers::utility::{mean, quantile, round2, sample_stddev};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    #[default]
    Line,
    Bar,
    Scatter,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ChartKind::Line => "line",
            ChartKind::Bar => "bar",
            ChartKind::Scatter => "scatter",
        })
    }
}

impl FromStr for ChartKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "line" => Ok(ChartKind::Line),
            "bar" => Ok(ChartKind::Bar),
            "scatter" => Ok(ChartKind::Scatter),
            other => Err(format!("unknown chart type '{other}'")),
        }
    }
}

/// What the dashboard controls select.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewFilter {
    pub parameter: Parameter,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub chart: ChartKind,
}

/// `describe()`-style statistics, each rounded to two decimals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub min: Option<f64>,
    #[serde(rename = "25%")]
    pub p25: Option<f64>,
    #[serde(rename = "50%")]
    pub p50: Option<f64>,
    #[serde(rename = "75%")]
    pub p75: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Point {
    pub timestamp: NaiveDateTime,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ParameterView {
    pub parameter: Parameter,
    pub chart: ChartKind,
    pub title: String,
    pub points: Vec<Point>,
    pub summary: Summary,
}

/// Readings between `start 00:00:00` and `end 00:00:00` inclusive, sorted by
/// timestamp.
pub fn filter_range(readings: &[RawReading], start: NaiveDate, end: NaiveDate) -> Vec<&RawReading> {
    let lo = start.and_hms_opt(0, 0, 0).unwrap_or_default();
    let hi = end.and_hms_opt(0, 0, 0).unwrap_or_default();

    let mut selected: Vec<&RawReading> = readings
        .iter()
        .filter(|r| r.timestamp >= lo && r.timestamp <= hi)
        .collect();
    selected.sort_by_key(|r| r.timestamp);
    selected
}

/// Summary statistics over `values`.
///
/// Standard deviation is the sample deviation and percentiles interpolate
/// linearly. Empty input leaves every statistic but `count` missing.
pub fn describe(values: &[f64]) -> Summary {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let avg = mean(&sorted);
    let std = avg.and_then(|m| sample_stddev(&sorted, m));

    Summary {
        count: sorted.len(),
        mean: avg.map(round2),
        std: std.map(round2),
        min: sorted.first().copied().map(round2),
        p25: quantile(&sorted, 0.25).map(round2),
        p50: quantile(&sorted, 0.5).map(round2),
        p75: quantile(&sorted, 0.75).map(round2),
        max: sorted.last().copied().map(round2),
    }
}

/// Builds the chart series and statistics for one parameter over a date range.
pub fn parameter_view(dataset: &Dataset, filter: &ViewFilter) -> ParameterView {
    let selected = filter_range(dataset.readings(), filter.start, filter.end);

    let points: Vec<Point> = selected
        .iter()
        .map(|r| Point {
            timestamp: r.timestamp,
            value: r.values.get(filter.parameter),
        })
        .collect();
    let present: Vec<f64> = points.iter().filter_map(|p| p.value).collect();

    ParameterView {
        parameter: filter.parameter,
        chart: filter.chart,
        title: format!("{} over Time", filter.parameter),
        summary: describe(&present),
        points,
    }
}
