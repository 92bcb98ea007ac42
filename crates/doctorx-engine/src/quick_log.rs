//! Echo of a single logged reading.
//!
//! Nothing is persisted; the entry is stamped and handed back so a future
//! store can slot in behind the same endpoint.

use chrono::NaiveDateTime;
use doctorx_core::{QuickLogEntry, QuickLogRequest};

use crate::iso_timestamp;

/// A stamped log entry plus the confirmation shown to the user.
#[derive(Debug, Clone)]
pub struct QuickLogOutcome {
    pub message: String,
    pub entry: QuickLogEntry,
}

/// Title-cases words, upper-casing each letter that follows a non-letter.
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_is_letter = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            match prev_is_letter {
                true => out.extend(c.to_lowercase()),
                false => out.extend(c.to_uppercase()),
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }
    out
}

/// Stamps the request with `now` and builds the confirmation message.
pub fn quick_log(request: QuickLogRequest, now: NaiveDateTime) -> QuickLogOutcome {
    let message = format!(
        "{} logged successfully",
        title_case(&request.metric_type.replace('_', " "))
    );
    let entry = QuickLogEntry {
        patient_id: request.patient_id,
        metric_type: request.metric_type,
        value: request.value,
        unit: request.unit,
        context: request.context,
        timestamp: iso_timestamp(now),
    };
    QuickLogOutcome { message, entry }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn title_case_matches_word_boundaries() {
        assert_eq!(title_case("blood glucose"), "Blood Glucose");
        assert_eq!(title_case("HEART rate"), "Heart Rate");
        assert_eq!(title_case("spo2 level"), "Spo2 Level");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn outcome_echoes_request_with_timestamp() {
        let now = NaiveDate::from_ymd_opt(2025, 2, 1).unwrap().and_hms_opt(7, 30, 0).unwrap();
        let outcome = quick_log(
            QuickLogRequest {
                patient_id: "p-2".into(),
                metric_type: "blood_glucose".into(),
                value: 104.0,
                unit: "mg/dL".into(),
                context: Some("Fasting".into()),
            },
            now,
        );

        assert_eq!(outcome.message, "Blood Glucose logged successfully");
        assert_eq!(outcome.entry.patient_id, "p-2");
        assert_eq!(outcome.entry.value, 104.0);
        assert_eq!(outcome.entry.context.as_deref(), Some("Fasting"));
        assert_eq!(outcome.entry.timestamp, "2025-02-01T07:30:00.000000");
    }
}
