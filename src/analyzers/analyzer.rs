use std::path::{Path, PathBuf};

use tracing::info;

use crate::analyzers::aggregate::aggregate_daily;
use crate::analyzers::types::{DailyAggregate, RawReading};
use crate::error::Result;
use crate::output::{quality_output_path, write_quality};
use crate::parser::read_readings;

/// A loaded set of raw readings and the file they came from.
///
/// Every computation takes the dataset explicitly; nothing is cached between
/// calls.
#[derive(Debug, Clone)]
pub struct Dataset {
    source: PathBuf,
    readings: Vec<RawReading>,
}

impl Dataset {
    pub fn new(source: impl Into<PathBuf>, readings: Vec<RawReading>) -> Self {
        Self {
            source: source.into(),
            readings,
        }
    }

    /// Reads the whole raw readings file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let readings = read_readings(path)?;
        Ok(Self::new(path, readings))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn readings(&self) -> &[RawReading] {
        &self.readings
    }

    pub fn daily(&self) -> Vec<DailyAggregate> {
        aggregate_daily(&self.readings)
    }
}

/// Aggregates the raw readings at `input` into daily quality rows and writes
/// them to `quality_of_<name>` next to the input.
///
/// Returns the path written. Any parse or I/O failure aborts before the
/// output file is touched.
#[tracing::instrument(skip(input), fields(input = %input.display()))]
pub fn run_daily_quality(input: &Path) -> Result<PathBuf> {
    let output = quality_output_path(input)?;
    let dataset = Dataset::load(input)?;
    let days = dataset.daily();

    write_quality(&output, &days)?;

    info!(
        readings = dataset.readings().len(),
        days = days.len(),
        output = %output.display(),
        "Daily quality aggregation complete"
    );
    Ok(output)
}
