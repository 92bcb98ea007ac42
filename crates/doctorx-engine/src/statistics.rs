//! Descriptive statistics over a reading series.

use serde::Serialize;

/// Summary of the values present in a series.
///
/// An empty series (or one where no reading carries a value) yields all
/// zeros rather than an error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ReadingStatistics {
    /// Arithmetic mean, rounded to two decimal places and kept within `[min, max]`.
    pub average: f64,
    pub min: f64,
    pub max: f64,
    /// `max - min`.
    pub range: f64,
    /// Number of readings that carried a value.
    pub count: usize,
}

/// Rounds to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Summarizes the present values of a series, skipping readings without one.
pub fn summarize<I>(values: I) -> ReadingStatistics
where
    I: IntoIterator<Item = Option<f64>>,
{
    let present: Vec<f64> = values.into_iter().flatten().collect();
    if present.is_empty() {
        return ReadingStatistics::default();
    }

    let min = present.iter().copied().fold(f64::INFINITY, f64::min);
    let max = present.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = present.iter().sum::<f64>() / present.len() as f64;

    ReadingStatistics {
        average: round2(mean).clamp(min, max),
        min,
        max,
        range: max - min,
        count: present.len(),
    }
}
