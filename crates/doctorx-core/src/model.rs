//! Request payloads for the health-tracking endpoints.

use serde::{Deserialize, Deserializer, Serialize};

/// Trend window used when a request omits `time_range`.
pub const DEFAULT_TIME_RANGE_DAYS: u32 = 30;

/// Treats an explicit JSON `null` the same as a missing collection.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn default_time_range() -> u32 {
    DEFAULT_TIME_RANGE_DAYS
}

/// A single timestamped measurement of a vital sign.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VitalReading {
    /// ISO timestamp as submitted (e.g. "2025-01-20T10:30:00").
    pub date: String,
    pub value: f64,
    pub unit: String,
    /// Measurement context such as "Fasting" or "At rest".
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A blood pressure measurement with optional pulse.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BloodPressureReading {
    pub date: String,
    pub systolic: f64,
    pub diastolic: f64,
    #[serde(default)]
    pub pulse: Option<u32>,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// A medication entry. Keys are free-form on the wire, so each is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Medication {
    #[serde(default)]
    pub name: Option<serde_json::Value>,
    #[serde(default)]
    pub dosage: Option<serde_json::Value>,
    #[serde(default)]
    pub frequency: Option<serde_json::Value>,
}

/// The full set of a patient's readings for one analysis request.
///
/// Collections keep the order in which they were submitted; nothing is
/// sorted or deduplicated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthTrackingSubmission {
    pub patient_id: String,
    /// "Diabetes", "Hypertension", "Thyroid", "General", or anything else.
    pub condition: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub blood_pressure: Vec<BloodPressureReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub blood_glucose: Vec<VitalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub heart_rate: Vec<VitalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub weight: Vec<VitalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub oxygen_saturation: Vec<VitalReading>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tsh: Vec<VitalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub t3: Vec<VitalReading>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub t4: Vec<VitalReading>,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub medications: Vec<Medication>,

    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default, alias = "lifestyle")]
    pub lifestyle_changes: Option<String>,
}

impl HealthTrackingSubmission {
    /// Creates an empty submission for the given patient and condition.
    pub fn new(patient_id: impl Into<String>, condition: impl Into<String>) -> Self {
        Self {
            patient_id: patient_id.into(),
            condition: condition.into(),
            blood_pressure: Vec::new(),
            blood_glucose: Vec::new(),
            heart_rate: Vec::new(),
            weight: Vec::new(),
            oxygen_saturation: Vec::new(),
            tsh: Vec::new(),
            t3: Vec::new(),
            t4: Vec::new(),
            medications: Vec::new(),
            symptoms: None,
            lifestyle_changes: None,
        }
    }

    /// Returns `true` when the thyroid panels should be reported.
    pub fn is_thyroid(&self) -> bool {
        self.condition.eq_ignore_ascii_case("thyroid")
    }
}

/// One point of a trend series. Every key may be missing on the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TrendReading {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Series submitted for trend insights.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnalysisRequest {
    pub patient_id: String,
    /// "blood_pressure", "blood_glucose", "weight", ...
    pub metric_type: String,
    /// Window in days.
    #[serde(default = "default_time_range")]
    pub time_range: u32,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub readings: Vec<TrendReading>,
}

/// A single reading logged from a quick-entry client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLogRequest {
    pub patient_id: String,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    #[serde(default)]
    pub context: Option<String>,
}

/// The echoed log entry, stamped with the time it was received.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuickLogEntry {
    pub patient_id: String,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub context: Option<String>,
    pub timestamp: String,
}
