//! Fallback for layouts no carrier parser recognises.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Carrier, NO_VOYAGE, ScheduleRecord, TBA};
use crate::vessels::VesselResolver;

use super::ScheduleParser;
use super::patterns::{DATE_ONLY, DATE_TIME, MONTHS, collapse, format_date_time, plausible_vessel};

/// Vessel templates, most specific first: `NAME / VOY`, `Vessel: NAME`, `M/V NAME`.
static VESSEL_TEMPLATES: Lazy<[Regex; 3]> = Lazy::new(|| {
    [
        r"(?i)\b([A-Z][A-Z \t\.\-]{2,25}?)[ \t]*/[ \t]*(\d{3,4}[A-Z]?)\b",
        r"(?i)\bVessel[ \t:]+([A-Z][A-Z0-9 \t\.\-]{2,25})",
        r"(?i)\bM/V[ \t]+([A-Z][A-Z \t\.\-]{2,30})",
    ]
    .map(|pattern| Regex::new(pattern).expect("vessel template regex pattern is valid and should compile"))
});

/// `11-Jan-2026`
static DASHED_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}}-(?:{MONTHS})-\d{{4}})\b"))
        .expect("dashed date regex pattern is valid and should compile")
});

#[derive(Debug, Clone, Copy, Default)]
pub struct GenericParser;

impl GenericParser {
    /// (vessel, voyage) from the first template that yields a usable name.
    fn vessels(text: &str) -> Vec<(String, String)> {
        VESSEL_TEMPLATES
            .iter()
            .map(|template| {
                template
                    .captures_iter(text)
                    .filter_map(|caps| {
                        let name = collapse(&caps[1]);
                        if !plausible_vessel(&name) {
                            return None;
                        }
                        let voyage = caps
                            .get(2)
                            .map(|m| m.as_str().to_uppercase())
                            .unwrap_or_else(|| NO_VOYAGE.to_string());
                        Some((name, voyage))
                    })
                    .collect::<Vec<_>>()
            })
            .find(|found| !found.is_empty())
            .unwrap_or_default()
    }

    /// Dates from the first template with any match.
    fn dates(text: &str) -> Vec<String> {
        let with_time: Vec<String> = DATE_TIME
            .captures_iter(text)
            .map(|caps| format_date_time(&caps[1], &caps[2]))
            .collect();
        if !with_time.is_empty() {
            return with_time;
        }

        let plain: Vec<String> = DATE_ONLY
            .captures_iter(text)
            .map(|caps| collapse(&caps[1]))
            .collect();
        if !plain.is_empty() {
            return plain;
        }

        DASHED_DATE
            .captures_iter(text)
            .map(|caps| caps[1].replace('-', " "))
            .collect()
    }
}

impl ScheduleParser for GenericParser {
    fn name(&self) -> &'static str {
        "GENERIC"
    }

    fn carrier(&self) -> Option<Carrier> {
        None
    }

    fn can_parse(&self, _text: &str) -> bool {
        true
    }

    /// Vessel *i* takes dates 2i and 2i+1. Vessels past the last date get
    /// TBA dates.
    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord> {
        let text = lines.join("\n");
        let vessels = Self::vessels(&text);
        let dates = Self::dates(&text);

        let mut seen: Vec<(String, String)> = Vec::new();
        let mut records = Vec::new();

        for (i, (raw_name, voyage)) in vessels.iter().enumerate() {
            let etd = dates.get(2 * i).map(String::as_str);
            let vessel = self.normalize_vessel(raw_name, resolver);
            let key = (vessel.clone(), etd.unwrap_or(TBA).to_string());
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let eta = dates.get(2 * i + 1).map(String::as_str);
            records.push(ScheduleRecord::new(vessel, voyage, etd, eta));
        }

        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vessels::ResolverConfig;

    fn resolver() -> VesselResolver {
        VesselResolver::offline(ResolverConfig::default().without_cache())
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn always_accepts() {
        assert!(GenericParser.can_parse("any text"));
        assert!(GenericParser.can_parse(""));
    }

    #[test]
    fn vessel_label_with_plain_dates() {
        let records = GenericParser.parse(
            &lines(&["Vessel: EVERGOLDEN", "ETD 05 Mar 2026", "ETA 30 Mar 2026"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.vessel, "EVER GOLDEN");
        assert_eq!(r.voyage, NO_VOYAGE);
        assert_eq!(r.etd, "05 Mar 2026");
        assert_eq!(r.eta, "30 Mar 2026");
        assert_eq!(r.carrier, None);
    }

    #[test]
    fn mv_template_with_dashed_dates() {
        let records = GenericParser.parse(
            &lines(&["M/V ONE HARMONY", "11-Jan-2026 to 25-Jan-2026"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "ONE HARMONY");
        assert_eq!(records[0].etd, "11 Jan 2026");
        assert_eq!(records[0].eta, "25 Jan 2026");
    }

    #[test]
    fn slash_template_takes_voyage() {
        let records = GenericParser.parse(
            &lines(&["hamburg express / 045w", "02 Apr 2026, 08:00"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "HAMBURG EXPRESS");
        assert_eq!(records[0].voyage, "045W");
        assert_eq!(records[0].eta, TBA);
    }

    #[test]
    fn first_matching_template_wins() {
        let vessels = GenericParser::vessels("SKY PEACE / 602S\nVessel: EVER GOLDEN");
        assert_eq!(vessels, vec![("SKY PEACE".to_string(), "602S".to_string())]);
    }

    #[test]
    fn vessels_without_dates_get_placeholders() {
        let records = GenericParser.parse(
            &lines(&["SKY PEACE / 602S", "EVER GOLDEN / 611N", "05 Mar 2026 12 Mar 2026"]),
            &resolver(),
        );
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].vessel, "SKY PEACE");
        assert_eq!(records[0].etd, "05 Mar 2026");
        assert_eq!(records[0].eta, "12 Mar 2026");

        let r = &records[1];
        assert_eq!(r.vessel, "EVER GOLDEN");
        assert_eq!(r.voyage, "611N");
        assert_eq!(r.etd, TBA);
        assert_eq!(r.eta, TBA);
        assert!(!r.is_valid());
    }

    #[test]
    fn vessel_without_any_date_is_kept() {
        let records = GenericParser.parse(&lines(&["M/V ONE HARMONY"]), &resolver());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "ONE HARMONY");
        assert_eq!(records[0].etd, TBA);
    }

    #[test]
    fn nothing_to_find() {
        let records =
            GenericParser.parse(&lines(&["Hello world", "This is not a schedule"]), &resolver());
        assert!(records.is_empty());
    }
}
