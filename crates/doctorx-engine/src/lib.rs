//! Deterministic request assembly and response extraction.
//!
//! Everything the gateway does that does not involve the hosted model lives
//! here, as pure functions over request-scoped values:
//!
//! - [`summarize`] — Mean/min/max/range over a reading series
//! - [`build_tracking_summary`] — Text report of a tracking submission
//! - [`build_trend_prompt`] — Text block for a single-metric trend request
//! - [`extract_report_data`] — Recover the JSON object embedded in a model reply
//! - [`quick_log`] — Stamp and echo a single logged reading
//!
//! # Example
//!
//! ```rust
//! use doctorx_engine::{extract_report_data, summarize};
//!
//! let stats = summarize([Some(120.0), None, Some(110.0), Some(130.0)]);
//! assert_eq!(stats.count, 3);
//! assert_eq!(stats.average, 120.0);
//!
//! let data = extract_report_data("Here you go: {\"summary\": \"normal\"}");
//! assert!(!data.is_fallback());
//! ```

mod extract;
mod quick_log;
mod statistics;
mod summary;
mod trend;

pub use extract::{
    extract_report_data, locate_json_span, report_extraction_prompt, ExtractedReportData,
    ExtractionFallback, EXTRACTION_ERROR,
};
pub use quick_log::{quick_log, title_case, QuickLogOutcome};
pub use statistics::{round2, summarize, ReadingStatistics};
pub use summary::build_tracking_summary;
pub use trend::{build_trend_prompt, TrendStatistics};

use chrono::NaiveDateTime;

/// Formats a local timestamp as ISO 8601 with microseconds.
pub fn iso_timestamp(now: NaiveDateTime) -> String {
    now.format("%Y-%m-%dT%H:%M:%S%.6f").to_string()
}
