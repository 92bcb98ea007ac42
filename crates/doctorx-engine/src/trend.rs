//! Text block for a single-metric trend request.

use doctorx_core::{TrendAnalysisRequest, TrendReading};
use serde::Serialize;

use crate::statistics::ReadingStatistics;

/// The statistics object returned to trend-analysis clients.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendStatistics {
    pub average: f64,
    pub min: f64,
    pub max: f64,
    pub total_readings: usize,
}

impl From<ReadingStatistics> for TrendStatistics {
    fn from(stats: ReadingStatistics) -> Self {
        Self {
            average: stats.average,
            min: stats.min,
            max: stats.max,
            total_readings: stats.count,
        }
    }
}

fn data_point(reading: &TrendReading) -> String {
    let date = reading.date.as_deref().unwrap_or("N/A");
    let value = reading
        .value
        .map(|v| v.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let unit = reading.unit.as_deref().unwrap_or("");
    let line = format!("- Date: {} | Value: {} {}", date, value, unit);
    format!("{}\n", line.trim_end())
}

/// Builds the prompt combining the raw series and its statistics.
///
/// The statistical summary is omitted when no reading carried a value.
pub fn build_trend_prompt(request: &TrendAnalysisRequest, stats: &ReadingStatistics) -> String {
    let mut out = format!(
        "\n## TREND ANALYSIS REQUEST\n\n\
         **Patient ID:** {}\n\
         **Metric Type:** {}\n\
         **Time Range:** Last {} days\n\
         **Total Readings:** {}\n\n\
         ### DATA POINTS:\n",
        request.patient_id,
        request.metric_type,
        request.time_range,
        request.readings.len(),
    );

    for reading in &request.readings {
        out.push_str(&data_point(reading));
    }

    if stats.count > 0 {
        out.push_str(&format!(
            "\n### STATISTICAL SUMMARY:\n\
             - Average: {:.2}\n\
             - Minimum: {:.2}\n\
             - Maximum: {:.2}\n\
             - Range: {:.2}\n",
            stats.average, stats.min, stats.max, stats.range,
        ));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::summarize;

    fn reading(date: &str, value: Option<f64>, unit: Option<&str>) -> TrendReading {
        TrendReading {
            date: Some(date.into()),
            value,
            unit: unit.map(String::from),
        }
    }

    fn request(readings: Vec<TrendReading>) -> TrendAnalysisRequest {
        TrendAnalysisRequest {
            patient_id: "p-3".into(),
            metric_type: "blood_pressure".into(),
            time_range: 30,
            readings,
        }
    }

    #[test]
    fn prompt_lists_points_and_statistics() {
        let request = request(vec![
            reading("2025-01-01", Some(120.0), Some("mmHg")),
            reading("2025-01-02", Some(130.0), Some("mmHg")),
            reading("2025-01-03", Some(110.0), Some("mmHg")),
        ]);
        let stats = summarize(request.readings.iter().map(|r| r.value));
        let prompt = build_trend_prompt(&request, &stats);

        assert!(prompt.contains("**Metric Type:** blood_pressure\n"));
        assert!(prompt.contains("**Time Range:** Last 30 days\n"));
        assert!(prompt.contains("**Total Readings:** 3\n"));
        assert!(prompt.contains("- Date: 2025-01-02 | Value: 130 mmHg\n"));
        assert!(prompt.contains(
            "### STATISTICAL SUMMARY:\n- Average: 120.00\n- Minimum: 110.00\n- Maximum: 130.00\n- Range: 20.00\n"
        ));
    }

    #[test]
    fn valueless_series_has_no_statistics_block() {
        let request = request(vec![reading("2025-01-01", None, None)]);
        let stats = summarize(request.readings.iter().map(|r| r.value));
        let prompt = build_trend_prompt(&request, &stats);

        assert!(prompt.contains("- Date: 2025-01-01 | Value: N/A\n"));
        assert!(prompt.contains("**Total Readings:** 1\n"));
        assert!(!prompt.contains("STATISTICAL SUMMARY"));
    }

    #[test]
    fn response_statistics_count_only_valued_readings() {
        let stats = summarize([Some(4.0), None, Some(6.0)]);
        let response = TrendStatistics::from(stats);
        assert_eq!(response.total_readings, 2);
        assert_eq!(response.average, 5.0);
    }
}
