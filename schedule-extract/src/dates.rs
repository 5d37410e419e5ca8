//! Schedule date parsing and ETD/ETA reconciliation.
//!
//! Carriers print dates in a handful of textual forms ("16 Jan 2026, 19:00",
//! "11-Jan-2026", "15 Jan"). OCR sometimes reads the departure and arrival
//! columns in the wrong order; [`reconcile`] puts them back when both dates
//! can be understood.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use tracing::trace;

use crate::domain::{ScheduleRecord, TBA};

/// Year assumed for dates printed without one. A leap year, so "29 Feb" parses.
const REFERENCE_YEAR: i32 = 2000;

/// If a year-less arrival appears more than this many days before the
/// departure, it is taken to be in the following year.
const ROLLOVER_THRESHOLD_DAYS: i64 = 180;

/// A recognised date layout.
struct Grammar {
    format: &'static str,
    has_year: bool,
    has_time: bool,
}

/// Accepted layouts, tried in order. `%B` accepts short and long month names
/// in any case. Year-less layouts end in `%Y` because the reference year is
/// appended to the input before parsing.
const GRAMMARS: [Grammar; 7] = [
    Grammar { format: "%d %B %Y, %H:%M", has_year: true, has_time: true },
    Grammar { format: "%d %B %Y %H:%M", has_year: true, has_time: true },
    Grammar { format: "%d %B %Y", has_year: true, has_time: false },
    Grammar { format: "%d-%B-%Y", has_year: true, has_time: false },
    Grammar { format: "%d %B, %H:%M %Y", has_year: false, has_time: true },
    Grammar { format: "%d %B %H:%M %Y", has_year: false, has_time: true },
    Grammar { format: "%d %B %Y", has_year: false, has_time: false },
];

/// A parsed schedule date. Year-less input carries [`REFERENCE_YEAR`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleDate {
    pub datetime: NaiveDateTime,
    pub has_year: bool,
}

impl ScheduleDate {
    /// Parse a date string under the first grammar that accepts it.
    ///
    /// Returns `None` for the `TBA` placeholder and for anything no grammar
    /// understands.
    ///
    /// # Examples
    ///
    /// ```
    /// use schedule_extract::dates::ScheduleDate;
    ///
    /// let d = ScheduleDate::parse("16 Jan 2026, 19:00").unwrap();
    /// assert!(d.has_year);
    /// assert_eq!(d.datetime.to_string(), "2026-01-16 19:00:00");
    ///
    /// assert!(ScheduleDate::parse("15 JAN").is_some());
    /// assert!(ScheduleDate::parse("next tuesday").is_none());
    /// ```
    pub fn parse(s: &str) -> Option<Self> {
        let input = s.split_whitespace().collect::<Vec<_>>().join(" ");
        if input.is_empty() || input.eq_ignore_ascii_case(TBA) {
            return None;
        }

        GRAMMARS.iter().find_map(|grammar| parse_with(&input, grammar))
    }

    /// The same instant moved to another year, if that date exists there.
    fn in_year(self, year: i32) -> Option<Self> {
        let date = self.datetime.date().with_year(year)?;
        Some(Self {
            datetime: date.and_time(self.datetime.time()),
            has_year: self.has_year,
        })
    }
}

fn parse_with(input: &str, grammar: &Grammar) -> Option<ScheduleDate> {
    let datetime = if grammar.has_year {
        parse_datetime(input, grammar)?
    } else {
        let with_year = format!("{input} {REFERENCE_YEAR}");
        parse_datetime(&with_year, grammar)?
    };

    Some(ScheduleDate {
        datetime,
        has_year: grammar.has_year,
    })
}

fn parse_datetime(input: &str, grammar: &Grammar) -> Option<NaiveDateTime> {
    if grammar.has_time {
        NaiveDateTime::parse_from_str(input, grammar.format).ok()
    } else {
        NaiveDate::parse_from_str(input, grammar.format)
            .ok()
            .map(|d| d.and_time(NaiveTime::MIN))
    }
}

/// Put a record's departure before its arrival.
///
/// Swaps `etd` and `eta` when both parse and the departure is later than the
/// arrival. If either side cannot be parsed the record is left untouched.
/// Returns whether a swap happened.
///
/// # Examples
///
/// ```
/// use schedule_extract::dates::reconcile;
/// use schedule_extract::domain::ScheduleRecord;
///
/// let mut record =
///     ScheduleRecord::new("SKY PEACE", "602S", Some("10 Feb 2026"), Some("01 Jan 2026"));
/// assert!(reconcile(&mut record));
/// assert_eq!(record.etd, "01 Jan 2026");
/// assert_eq!(record.eta, "10 Feb 2026");
/// ```
pub fn reconcile(record: &mut ScheduleRecord) -> bool {
    let (Some(etd), Some(eta)) = (
        ScheduleDate::parse(&record.etd),
        ScheduleDate::parse(&record.eta),
    ) else {
        return false;
    };

    let Some((etd, eta)) = align_years(etd, eta) else {
        return false;
    };

    if etd.datetime > eta.datetime {
        trace!(
            vessel = %record.vessel,
            etd = %record.etd,
            eta = %record.eta,
            "Swapping reversed ETD/ETA"
        );
        record.swap_dates();
        return true;
    }

    false
}

/// Give year-less dates a year consistent with their partner.
fn align_years(etd: ScheduleDate, eta: ScheduleDate) -> Option<(ScheduleDate, ScheduleDate)> {
    match (etd.has_year, eta.has_year) {
        (true, true) => Some((etd, eta)),
        (true, false) => Some((etd, eta.in_year(etd.datetime.year())?)),
        (false, true) => Some((etd.in_year(eta.datetime.year())?, eta)),
        (false, false) => {
            let gap = etd.datetime.signed_duration_since(eta.datetime);
            if gap > TimeDelta::days(ROLLOVER_THRESHOLD_DAYS) {
                Some((etd, eta.in_year(eta.datetime.year() + 1)?))
            } else {
                Some((etd, eta))
            }
        }
    }
}
