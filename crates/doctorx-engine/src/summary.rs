//! Text report of a tracking submission.
//!
//! The report is the model's only view of the data, so the layout is fixed:
//! header, blood pressure, blood glucose, heart rate, weight, oxygen
//! saturation, thyroid panels (thyroid condition only), symptoms, lifestyle,
//! medications. Empty collections produce no header at all.

use chrono::NaiveDateTime;
use doctorx_core::{BloodPressureReading, HealthTrackingSubmission, Medication, VitalReading};

/// How a vital's primary value is printed.
#[derive(Clone, Copy)]
enum ValueStyle {
    /// `Value: 95 mg/dL`
    WithUnit,
    /// `Value: 97%`
    Percent,
}

/// Returns the field only when it holds text.
fn present(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

fn push_optional(segments: &mut Vec<String>, label: &str, field: &Option<String>) {
    if let Some(value) = present(field) {
        segments.push(format!("{}: {}", label, value));
    }
}

fn blood_pressure_line(reading: &BloodPressureReading) -> String {
    let mut segments = vec![
        format!("Date: {}", reading.date),
        format!("Systolic: {} mmHg", reading.systolic),
        format!("Diastolic: {} mmHg", reading.diastolic),
    ];
    if let Some(pulse) = reading.pulse {
        segments.push(format!("Pulse: {} bpm", pulse));
    }
    push_optional(&mut segments, "Context", &reading.context);
    push_optional(&mut segments, "Notes", &reading.notes);
    format!("- {}\n", segments.join(" | "))
}

fn vital_line(reading: &VitalReading, style: ValueStyle) -> String {
    let value = match style {
        ValueStyle::WithUnit => format!("Value: {} {}", reading.value, reading.unit),
        ValueStyle::Percent => format!("Value: {}%", reading.value),
    };
    let mut segments = vec![format!("Date: {}", reading.date), value];
    push_optional(&mut segments, "Context", &reading.context);
    push_optional(&mut segments, "Notes", &reading.notes);
    format!("- {}\n", segments.join(" | "))
}

/// Renders a free-form medication key, substituting `default` when absent.
fn medication_field(field: &Option<serde_json::Value>, default: &str) -> String {
    match field {
        None | Some(serde_json::Value::Null) => default.to_string(),
        Some(serde_json::Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn medication_line(med: &Medication) -> String {
    format!(
        "- {} - {} - {}\n",
        medication_field(&med.name, "Unknown"),
        medication_field(&med.dosage, "N/A"),
        medication_field(&med.frequency, "N/A"),
    )
}

fn push_vitals(out: &mut String, header: &str, readings: &[VitalReading], style: ValueStyle) {
    if readings.is_empty() {
        return;
    }
    out.push_str(&format!("\n### {}:\n", header));
    for reading in readings {
        out.push_str(&vital_line(reading, style));
    }
}

fn push_text(out: &mut String, header: &str, text: &Option<String>) {
    if let Some(text) = present(text) {
        out.push_str(&format!("\n### {}:\n{}\n", header, text));
    }
}

/// Builds the text report handed to the tracking agent.
pub fn build_tracking_summary(submission: &HealthTrackingSubmission, now: NaiveDateTime) -> String {
    let mut out = format!(
        "\n## PATIENT HEALTH TRACKING DATA\n\n\
         **Patient ID:** {}\n\
         **Primary Condition:** {}\n\
         **Analysis Date:** {}\n\n",
        submission.patient_id,
        submission.condition,
        now.format("%Y-%m-%d %H:%M:%S"),
    );

    if !submission.blood_pressure.is_empty() {
        out.push_str("\n### BLOOD PRESSURE READINGS:\n");
        for reading in &submission.blood_pressure {
            out.push_str(&blood_pressure_line(reading));
        }
    }

    push_vitals(&mut out, "BLOOD GLUCOSE READINGS", &submission.blood_glucose, ValueStyle::WithUnit);
    push_vitals(&mut out, "HEART RATE READINGS", &submission.heart_rate, ValueStyle::WithUnit);
    push_vitals(&mut out, "WEIGHT READINGS", &submission.weight, ValueStyle::WithUnit);
    push_vitals(
        &mut out,
        "OXYGEN SATURATION (SpO₂) READINGS",
        &submission.oxygen_saturation,
        ValueStyle::Percent,
    );

    if submission.is_thyroid() {
        push_vitals(&mut out, "TSH LEVELS", &submission.tsh, ValueStyle::WithUnit);
        push_vitals(&mut out, "T3 LEVELS", &submission.t3, ValueStyle::WithUnit);
        push_vitals(&mut out, "FREE T4 LEVELS", &submission.t4, ValueStyle::WithUnit);
    }

    push_text(&mut out, "REPORTED SYMPTOMS", &submission.symptoms);
    push_text(&mut out, "LIFESTYLE MODIFICATIONS", &submission.lifestyle_changes);

    if !submission.medications.is_empty() {
        out.push_str("\n### CURRENT MEDICATIONS:\n");
        for med in &submission.medications {
            out.push_str(&medication_line(med));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 20).unwrap().and_hms_opt(9, 15, 0).unwrap()
    }

    fn vital(date: &str, value: f64, unit: &str) -> VitalReading {
        VitalReading {
            date: date.into(),
            value,
            unit: unit.into(),
            context: None,
            notes: None,
        }
    }

    fn bp(systolic: f64, diastolic: f64) -> BloodPressureReading {
        BloodPressureReading {
            date: "2025-01-20T08:00:00".into(),
            systolic,
            diastolic,
            pulse: None,
            context: None,
            notes: None,
        }
    }

    #[test]
    fn hypertension_submission_renders_bp_section_only() {
        let mut submission = HealthTrackingSubmission::new("p-1", "Hypertension");
        submission.blood_pressure.push(bp(145.0, 95.0));

        let summary = build_tracking_summary(&submission, now());

        assert!(summary.contains("### BLOOD PRESSURE READINGS:"));
        assert!(summary.contains(
            "- Date: 2025-01-20T08:00:00 | Systolic: 145 mmHg | Diastolic: 95 mmHg\n"
        ));
        assert!(!summary.contains("BLOOD GLUCOSE"));
        assert!(!summary.contains("TSH"));
        assert!(!summary.contains("MEDICATIONS"));
    }

    #[test]
    fn header_carries_patient_condition_and_time() {
        let summary = build_tracking_summary(&HealthTrackingSubmission::new("p-9", "General"), now());
        assert_eq!(
            summary,
            "\n## PATIENT HEALTH TRACKING DATA\n\n\
             **Patient ID:** p-9\n\
             **Primary Condition:** General\n\
             **Analysis Date:** 2025-01-20 09:15:00\n\n"
        );
    }

    #[test]
    fn optional_fields_follow_fixed_order() {
        let mut submission = HealthTrackingSubmission::new("p", "Hypertension");
        let mut reading = bp(120.0, 80.0);
        reading.pulse = Some(72);
        reading.context = Some("Morning".into());
        reading.notes = Some("After coffee".into());
        submission.blood_pressure.push(reading);

        let summary = build_tracking_summary(&submission, now());
        assert!(summary.contains(
            "Systolic: 120 mmHg | Diastolic: 80 mmHg | Pulse: 72 bpm | Context: Morning | Notes: After coffee\n"
        ));
    }

    #[test]
    fn empty_optional_text_is_omitted() {
        let mut submission = HealthTrackingSubmission::new("p", "Diabetes");
        let mut reading = vital("2025-01-20T07:00:00", 98.5, "mg/dL");
        reading.context = Some(String::new());
        reading.notes = Some("Fasting".into());
        submission.blood_glucose.push(reading);
        submission.symptoms = Some(String::new());

        let summary = build_tracking_summary(&submission, now());
        assert!(summary.contains("- Date: 2025-01-20T07:00:00 | Value: 98.5 mg/dL | Notes: Fasting\n"));
        assert!(!summary.contains("Context:"));
        assert!(!summary.contains("SYMPTOMS"));
    }

    #[test]
    fn thyroid_panels_need_thyroid_condition() {
        let mut submission = HealthTrackingSubmission::new("p", "Diabetes");
        submission.tsh.push(vital("2025-01-01", 5.2, "mIU/L"));
        assert!(!build_tracking_summary(&submission, now()).contains("TSH"));

        submission.condition = "thyroid".into();
        submission.t4.push(vital("2025-01-01", 1.1, "ng/dL"));
        let summary = build_tracking_summary(&submission, now());
        assert!(summary.contains("### TSH LEVELS:\n- Date: 2025-01-01 | Value: 5.2 mIU/L\n"));
        assert!(summary.contains("### FREE T4 LEVELS:"));
        assert!(!summary.contains("### T3 LEVELS:"));
    }

    #[test]
    fn sections_appear_in_fixed_order() {
        let mut submission = HealthTrackingSubmission::new("p", "Thyroid");
        submission.medications.push(Medication::default());
        submission.lifestyle_changes = Some("Reduced salt".into());
        submission.symptoms = Some("Fatigue".into());
        submission.t3.push(vital("d", 3.1, "pg/mL"));
        submission.oxygen_saturation.push(vital("d", 97.0, "%"));
        submission.weight.push(vital("d", 70.0, "kg"));
        submission.heart_rate.push(vital("d", 64.0, "bpm"));
        submission.blood_glucose.push(vital("d", 95.0, "mg/dL"));
        submission.blood_pressure.push(bp(118.0, 76.0));

        let summary = build_tracking_summary(&submission, now());
        let order = [
            "BLOOD PRESSURE",
            "BLOOD GLUCOSE",
            "HEART RATE",
            "WEIGHT",
            "OXYGEN SATURATION",
            "T3 LEVELS",
            "REPORTED SYMPTOMS",
            "LIFESTYLE MODIFICATIONS",
            "CURRENT MEDICATIONS",
        ];
        let positions: Vec<usize> = order.iter().map(|h| summary.find(h).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]), "{:?}", positions);
        assert!(summary.contains("| Value: 97%\n"));
    }

    #[test]
    fn medications_substitute_missing_keys() {
        let mut submission = HealthTrackingSubmission::new("p", "Diabetes");
        submission.medications.push(Medication {
            name: Some(serde_json::json!("Metformin")),
            dosage: Some(serde_json::json!(500)),
            frequency: None,
        });
        submission.medications.push(Medication::default());

        let summary = build_tracking_summary(&submission, now());
        assert!(summary.contains("### CURRENT MEDICATIONS:\n- Metformin - 500 - N/A\n- Unknown - N/A - N/A\n"));
    }

    #[test]
    fn readings_keep_submission_order() {
        let mut submission = HealthTrackingSubmission::new("p", "General");
        submission.weight.push(vital("2025-01-03", 71.0, "kg"));
        submission.weight.push(vital("2025-01-01", 72.0, "kg"));

        let summary = build_tracking_summary(&submission, now());
        assert!(summary.find("2025-01-03").unwrap() < summary.find("2025-01-01").unwrap());
    }
}
