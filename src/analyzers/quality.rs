use std::fmt;
use std::str::FromStr;

use serde::Serialize;

/// Categorical air-quality tier derived from a day's average PM2.5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum QualityLabel {
    #[serde(rename = "very good")]
    VeryGood,
    #[serde(rename = "good")]
    Good,
    #[serde(rename = "medium")]
    Medium,
    #[serde(rename = "bad")]
    Bad,
    #[serde(rename = "very bad")]
    VeryBad,
    #[serde(rename = "Unknown")]
    Unknown,
}

impl QualityLabel {
    pub const ALL: [QualityLabel; 6] = [
        QualityLabel::VeryGood,
        QualityLabel::Good,
        QualityLabel::Medium,
        QualityLabel::Bad,
        QualityLabel::VeryBad,
        QualityLabel::Unknown,
    ];

    /// Converts an average PM2.5 value into a quality label.
    ///
    /// Thresholds are checked in order and the first match wins, so a
    /// boundary value belongs to the lower tier.
    ///
    /// | Average PM2.5 | Label     |
    /// |---------------|-----------|
    /// | <= 25         | very good |
    /// | <= 37         | good      |
    /// | <= 50         | medium    |
    /// | <= 90         | bad       |
    /// | > 90          | very bad  |
    /// | missing / NaN | Unknown   |
    pub fn from_pm25(avg: Option<f64>) -> Self {
        match avg {
            Some(v) if v <= 25.0 => QualityLabel::VeryGood,
            Some(v) if v <= 37.0 => QualityLabel::Good,
            Some(v) if v <= 50.0 => QualityLabel::Medium,
            Some(v) if v <= 90.0 => QualityLabel::Bad,
            Some(v) if v > 90.0 => QualityLabel::VeryBad,
            _ => QualityLabel::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QualityLabel::VeryGood => "very good",
            QualityLabel::Good => "good",
            QualityLabel::Medium => "medium",
            QualityLabel::Bad => "bad",
            QualityLabel::VeryBad => "very bad",
            QualityLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for QualityLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QualityLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QualityLabel::ALL
            .into_iter()
            .find(|label| label.as_str() == s)
            .ok_or_else(|| format!("unknown quality label '{s}'"))
    }
}
