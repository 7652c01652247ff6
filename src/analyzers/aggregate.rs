use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::debug;

use crate::analyzers::quality::QualityLabel;
use crate::analyzers::types::{DailyAggregate, Measurements, Parameter, RawReading};

/// Running per-parameter sums and non-missing counts for one calendar day.
///
/// Sums are Kahan-compensated so a day whose exact decimal mean sits on a
/// label threshold does not drift past it.
#[derive(Default)]
struct DayAccumulator {
    sums: [f64; 6],
    compensations: [f64; 6],
    counts: [usize; 6],
}

impl DayAccumulator {
    fn push(&mut self, values: &Measurements) {
        for (i, (_, value)) in values.iter().enumerate() {
            if let Some(v) = value.filter(|v| !v.is_nan()) {
                let y = v - self.compensations[i];
                let t = self.sums[i] + y;
                self.compensations[i] = (t - self.sums[i]) - y;
                self.sums[i] = t;
                self.counts[i] += 1;
            }
        }
    }

    fn means(&self) -> Measurements {
        let mut means = Measurements::default();
        for (i, parameter) in Parameter::ALL.into_iter().enumerate() {
            let mean = (self.counts[i] > 0).then(|| self.sums[i] / self.counts[i] as f64);
            means.set(parameter, mean);
        }
        means
    }
}

/// Resamples raw readings to one [`DailyAggregate`] per calendar day.
///
/// Input order does not matter. Each parameter is averaged over its
/// non-missing values for the day; a day with none stays missing rather than
/// becoming zero. Output is sorted by ascending date with one row per day
/// that has at least one reading.
pub fn aggregate_daily(readings: &[RawReading]) -> Vec<DailyAggregate> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for reading in readings {
        days.entry(reading.date()).or_default().push(&reading.values);
    }

    debug!(readings = readings.len(), days = days.len(), "Grouped readings by day");

    days.into_iter()
        .map(|(date, acc)| {
            let means = acc.means();
            DailyAggregate {
                date,
                means,
                pm25_label: QualityLabel::from_pm25(means.get(Parameter::Pm25)),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap()
    }

    fn pm25(s: &str, value: f64) -> RawReading {
        RawReading::new(ts(s), Measurements::default().with(Parameter::Pm25, value))
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_empty_input_yields_no_days() {
        assert!(aggregate_daily(&[]).is_empty());
    }

    #[test]
    fn test_worked_example() {
        let readings = vec![
            pm25("2024-02-01 00:00:00", 20.0),
            pm25("2024-02-01 12:00:00", 30.0),
            pm25("2024-02-02 00:00:00", 100.0),
        ];

        let days = aggregate_daily(&readings);

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, date("2024-02-01"));
        assert_eq!(days[0].pm25(), Some(25.0));
        assert_eq!(days[0].pm25_label, QualityLabel::VeryGood);
        assert_eq!(days[1].date, date("2024-02-02"));
        assert_eq!(days[1].pm25(), Some(100.0));
        assert_eq!(days[1].pm25_label, QualityLabel::VeryBad);
    }

    #[test]
    fn test_unsorted_input_is_sorted_by_date() {
        let readings = vec![
            pm25("2024-02-03 08:00:00", 10.0),
            pm25("2024-02-01 23:59:59", 40.0),
            pm25("2024-02-03 01:00:00", 20.0),
            pm25("2024-02-02 00:00:00", 60.0),
        ];

        let days = aggregate_daily(&readings);
        let dates: Vec<_> = days.iter().map(|d| d.date).collect();

        assert_eq!(
            dates,
            vec![date("2024-02-01"), date("2024-02-02"), date("2024-02-03")]
        );
        assert_eq!(days[2].pm25(), Some(15.0));
    }

    #[test]
    fn test_missing_values_are_skipped_not_zeroed() {
        let readings = vec![
            RawReading::new(
                ts("2024-02-01 00:00:00"),
                Measurements::default()
                    .with(Parameter::Pm25, 30.0)
                    .with(Parameter::Temp, 28.0),
            ),
            RawReading::new(
                ts("2024-02-01 01:00:00"),
                Measurements::default().with(Parameter::Temp, 30.0),
            ),
        ];

        let days = aggregate_daily(&readings);

        assert_eq!(days[0].pm25(), Some(30.0));
        assert_eq!(days[0].means.get(Parameter::Temp), Some(29.0));
        assert_eq!(days[0].means.get(Parameter::O3), None);
        assert_eq!(days[0].pm25_label, QualityLabel::Good);
    }

    #[test]
    fn test_day_without_pm25_is_unknown() {
        let readings = vec![RawReading::new(
            ts("2024-02-01 00:00:00"),
            Measurements::default().with(Parameter::Ws, 1.2),
        )];

        let days = aggregate_daily(&readings);

        assert_eq!(days.len(), 1);
        assert_eq!(days[0].pm25(), None);
        assert_eq!(days[0].pm25_label, QualityLabel::Unknown);
        assert_eq!(days[0].means.get(Parameter::Ws), Some(1.2));
    }

    #[test]
    fn test_label_uses_unrounded_average() {
        // (25.0 + 25.02) / 2 = 25.01, which formats as 25.01 and is above the first tier
        let readings = vec![
            pm25("2024-02-01 00:00:00", 25.0),
            pm25("2024-02-01 01:00:00", 25.02),
        ];

        let days = aggregate_daily(&readings);

        assert_eq!(days[0].pm25_label, QualityLabel::Good);
    }

    fn day_label(values: &[f64]) -> QualityLabel {
        let readings: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let ts = format!("2024-02-01 {:02}:{:02}:00", i / 60, i % 60);
                pm25(&ts, *v)
            })
            .collect();

        let days = aggregate_daily(&readings);
        assert_eq!(days.len(), 1);
        days[0].pm25_label
    }

    #[test]
    fn test_mean_exactly_on_25_stays_very_good() {
        let values = [
            32.6, 39.4, 4.7, 1.4, 41.8, 21.6, 38.1, 0.1, 22.3, 36.1, 11.4, 47.3, 45.1, 1.5, 1.3,
            27.1, 53.2,
        ];

        let readings: Vec<_> = values
            .iter()
            .enumerate()
            .map(|(i, v)| pm25(&format!("2024-02-01 {i:02}:00:00"), *v))
            .collect();
        let days = aggregate_daily(&readings);

        assert_eq!(days[0].pm25(), Some(25.0));
        assert_eq!(days[0].pm25_label, QualityLabel::VeryGood);
    }

    #[test]
    fn test_averaged_boundaries_belong_to_lower_tier() {
        let on_25 = [22.9, 1.4, 11.5, 8.9, 29.2, 43.1, 39.9, 39.9, 40.8, 12.4];
        let on_37 = [41.5, 62.9, 43.7, 16.1, 20.8];
        let on_50 = [
            23.5, 72.5, 8.5, 17.0, 91.1, 21.3, 75.9, 60.0, 84.1, 36.8, 34.0, 29.1, 96.2,
        ];
        let on_90 = [
            77.4, 45.0, 79.1, 96.9, 2.0, 150.5, 30.9, 87.4, 142.8, 167.9, 175.7, 3.4, 124.5,
            104.4, 106.8, 24.9, 110.4,
        ];

        assert_eq!(day_label(&on_25), QualityLabel::VeryGood);
        assert_eq!(day_label(&on_37), QualityLabel::Good);
        assert_eq!(day_label(&on_50), QualityLabel::Medium);
        assert_eq!(day_label(&on_90), QualityLabel::Bad);
    }

    #[test]
    fn test_averaged_values_just_above_boundaries() {
        assert_eq!(day_label(&[25.0, 25.02]), QualityLabel::Good);
        assert_eq!(day_label(&[37.0, 37.02]), QualityLabel::Medium);
        assert_eq!(day_label(&[50.0, 50.02]), QualityLabel::Bad);
        assert_eq!(day_label(&[90.0, 90.02]), QualityLabel::VeryBad);
    }
}
