//! Schedule records and per-document extraction results.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::carrier::Carrier;
use super::vessel_name::normalize_vessel_name;

/// Placeholder for a field the source did not provide.
pub const TBA: &str = "TBA";

/// Placeholder voyage used when a layout carries no voyage column.
pub const NO_VOYAGE: &str = "-";

/// One parsed shipping schedule.
///
/// The vessel name is normalized at construction; empty fields become
/// [`TBA`]. After construction the only mutation is [`ScheduleRecord::swap_dates`].
///
/// # Examples
///
/// ```
/// use schedule_extract::domain::ScheduleRecord;
///
/// let record = ScheduleRecord::new("DANUM175", "602N", Some("16 Jan 2026"), None);
/// assert_eq!(record.vessel, "DANUM 175");
/// assert_eq!(record.eta, "TBA");
/// assert!(record.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRecord {
    pub vessel: String,
    pub voyage: String,
    pub etd: String,
    pub eta: String,
    pub carrier: Option<Carrier>,
    pub confidence: f64,
}

impl ScheduleRecord {
    /// Create a record, normalizing the vessel name and filling placeholders.
    pub fn new(
        vessel: impl AsRef<str>,
        voyage: impl AsRef<str>,
        etd: Option<&str>,
        eta: Option<&str>,
    ) -> Self {
        Self {
            vessel: or_tba(&normalize_vessel_name(vessel.as_ref())),
            voyage: or_tba(voyage.as_ref().trim()),
            etd: or_tba(etd.unwrap_or_default().trim()),
            eta: or_tba(eta.unwrap_or_default().trim()),
            carrier: None,
            confidence: 1.0,
        }
    }

    /// Set the carrier that produced this record.
    pub fn with_carrier(mut self, carrier: Option<Carrier>) -> Self {
        self.carrier = carrier;
        self
    }

    /// Set the extraction confidence, clamped to `0.0..=1.0`.
    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        self
    }

    /// Whether the record names a vessel and at least one date.
    pub fn is_valid(&self) -> bool {
        self.vessel != TBA && (self.etd != TBA || self.eta != TBA)
    }

    /// Exchange departure and arrival.
    pub fn swap_dates(&mut self) {
        std::mem::swap(&mut self.etd, &mut self.eta);
    }
}

impl fmt::Display for ScheduleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {}", self.vessel, self.voyage)
    }
}

fn or_tba(s: &str) -> String {
    if s.is_empty() {
        TBA.to_string()
    } else {
        s.to_string()
    }
}

/// The outcome of extracting schedules from one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ParseResult {
    pub schedules: Vec<ScheduleRecord>,
    pub carrier: Option<Carrier>,
    pub source_file: Option<String>,
    pub raw_text: Vec<String>,
    /// Share of schedules that are valid; 0.0 when there are none.
    pub confidence: f64,
    /// Diagnostics collected along the way. Never fatal.
    pub errors: Vec<String>,
}

impl ParseResult {
    /// Whether any schedule was extracted.
    pub fn has_schedules(&self) -> bool {
        !self.schedules.is_empty()
    }

    /// Schedules that pass [`ScheduleRecord::is_valid`].
    pub fn valid_schedules(&self) -> Vec<&ScheduleRecord> {
        self.schedules.iter().filter(|s| s.is_valid()).collect()
    }
}
