//! CMA-CGM / CNC layout: `Vessel NAME` and `Voyage Ref.` fields, with dates
//! printed after a weekday (`Sunday, 11-Jan-2026`).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Carrier, NO_VOYAGE, ScheduleRecord, TBA};
use crate::vessels::VesselResolver;

use super::ScheduleParser;
use super::patterns::{MONTHS, collapse, dedup_by_key, plausible_vessel};

/// `Vessel DANUM 175 CO2 ...` or `Main Vessel: CNC JUPITER`
static VESSEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)\b(?:(?i:main)[ \t]+)?(?i:vessel)[ \t]*:?[ \t]+([A-Z][A-Z0-9 \t\.\-]{2,30}?)(?:[ \t]+CO2\b.*)?[ \t]*$",
    )
    .expect("vessel regex pattern is valid and should compile")
});

/// `Voyage Ref. 0KBN4N1MA`
static VOYAGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bVoyage[ \t]+Ref\.?[ \t]*:?[ \t]*([A-Z0-9]{3,12})\b")
        .expect("voyage regex pattern is valid and should compile")
});

/// `Sunday, 11-Jan-2026`
static WEEKDAY_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?:Mon|Tues|Wednes|Thurs|Fri|Satur|Sun)day[, \t]+(\d{{1,2}})-((?:{MONTHS})[a-z]*)-(\d{{4}})\b"
    ))
    .expect("weekday date regex pattern is valid and should compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct CmaParser;

impl CmaParser {
    fn vessels(text: &str) -> Vec<String> {
        let names: Vec<String> = VESSEL
            .captures_iter(text)
            .map(|caps| collapse(&caps[1]).to_uppercase())
            .filter(|name| plausible_vessel(name))
            .collect();
        dedup_by_key(names, |name: &String| name.to_lowercase())
    }

    fn voyages(text: &str) -> Vec<String> {
        let voyages: Vec<String> = VOYAGE
            .captures_iter(text)
            .map(|caps| caps[1].to_uppercase())
            .collect();
        dedup_by_key(voyages, |v: &String| v.to_lowercase())
    }

    /// Weekday dates as `11 Jan 2026`.
    fn dates(text: &str) -> Vec<String> {
        let dates: Vec<String> = WEEKDAY_DATE
            .captures_iter(text)
            .map(|caps| format!("{} {} {}", &caps[1], &caps[2], &caps[3]))
            .collect();
        dedup_by_key(dates, |d: &String| d.to_lowercase())
    }
}

impl ScheduleParser for CmaParser {
    fn name(&self) -> &'static str {
        "CMA-CGM"
    }

    fn carrier(&self) -> Option<Carrier> {
        Some(Carrier::CmaCgm)
    }

    fn can_parse(&self, text: &str) -> bool {
        VESSEL.is_match(text) && WEEKDAY_DATE.is_match(text)
    }

    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord> {
        let text = lines.join("\n");
        let vessels = Self::vessels(&text);
        let voyages = Self::voyages(&text);
        let dates = Self::dates(&text);

        dates
            .chunks_exact(2)
            .enumerate()
            .map(|(i, pair)| {
                let vessel = vessels
                    .get(i)
                    .map(|v| self.normalize_vessel(v, resolver))
                    .unwrap_or_else(|| TBA.to_string());
                let voyage = voyages.get(i).map(String::as_str).unwrap_or(NO_VOYAGE);
                ScheduleRecord::new(vessel, voyage, Some(pair[0].as_str()), Some(pair[1].as_str()))
                    .with_carrier(self.carrier())
            })
            .collect()
    }
}
