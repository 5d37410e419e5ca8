//! Maersk layout: `VESSEL / VOYAGE` headers followed by departure and
//! arrival timestamps.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Carrier, ScheduleRecord};
use crate::vessels::VesselResolver;

use super::ScheduleParser;
use super::patterns::{
    DATE_ONLY, DATE_TIME, collapse, dedup_by_key, format_date_time, plausible_vessel,
    strip_leading_label,
};

/// `SPIL NISAKA / 602N`
static SLASH_VESSEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z][A-Za-z0-9 \t\.\-]{2,25}?)[ \t]*/[ \t]*(\d{3,4}[A-Z])\b")
        .expect("slash vessel regex pattern is valid and should compile")
});

/// `SPIL NISAKA 602N`. Only trusted when a timestamp is also present.
static SPACE_VESSEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Z0-9\.\-]*(?:[ \t]+[A-Z0-9][A-Z0-9\.\-]*){0,4})[ \t]+(\d{3,4}[A-Z])\b")
        .expect("space vessel regex pattern is valid and should compile")
});

/// The longest known trailing run of `name`'s tokens, or `name` itself when
/// it is known or no suffix is. Peels place names off `Jakarta SPIL NISAKA`.
fn known_suffix(name: &str, resolver: &VesselResolver) -> String {
    if resolver.is_known(name) {
        return name.to_string();
    }
    let tokens: Vec<&str> = name.split_whitespace().collect();
    (1..tokens.len())
        .map(|start| tokens[start..].join(" "))
        .find(|suffix| resolver.is_known(suffix))
        .unwrap_or_else(|| name.to_string())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MaerskParser;

impl MaerskParser {
    /// Vessel/voyage pairs in order of appearance, keyed by voyage.
    fn vessels(&self, text: &str, resolver: &VesselResolver) -> Vec<(String, String)> {
        let pattern: &Regex = if SLASH_VESSEL.is_match(text) {
            &SLASH_VESSEL
        } else if DATE_TIME.is_match(text) {
            &SPACE_VESSEL
        } else {
            return Vec::new();
        };

        let candidates: Vec<(String, String)> = pattern
            .captures_iter(text)
            .filter_map(|caps| {
                let name = known_suffix(&strip_leading_label(&collapse(&caps[1])), resolver);
                if !plausible_vessel(&name) {
                    return None;
                }
                Some((caps[2].to_uppercase(), name))
            })
            .collect();

        dedup_by_key(candidates, |(voyage, _)| voyage.clone())
            .into_iter()
            .map(|(voyage, name)| (voyage, self.normalize_vessel(&name, resolver)))
            .collect()
    }

    /// Distinct timestamps in order. Plain dates are used only when no
    /// timestamp exists at all.
    fn dates(text: &str) -> Vec<String> {
        let mut dates: Vec<String> = DATE_TIME
            .captures_iter(text)
            .map(|caps| format_date_time(&caps[1], &caps[2]))
            .collect();
        if dates.is_empty() {
            dates = DATE_ONLY
                .captures_iter(text)
                .map(|caps| collapse(&caps[1]))
                .collect();
        }
        dedup_by_key(dates, String::clone)
    }
}

impl ScheduleParser for MaerskParser {
    fn name(&self) -> &'static str {
        "MAERSK"
    }

    fn carrier(&self) -> Option<Carrier> {
        Some(Carrier::Maersk)
    }

    fn can_parse(&self, text: &str) -> bool {
        SLASH_VESSEL.is_match(text) || (SPACE_VESSEL.is_match(text) && DATE_TIME.is_match(text))
    }

    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord> {
        let text = lines.join("\n");
        let vessels = self.vessels(&text, resolver);
        let dates = Self::dates(&text);

        vessels
            .into_iter()
            .enumerate()
            .map(|(i, (voyage, vessel))| {
                let etd = dates.get(2 * i).map(String::as_str);
                let eta = dates.get(2 * i + 1).map(String::as_str);
                ScheduleRecord::new(vessel, voyage, etd, eta).with_carrier(self.carrier())
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TBA;
    use crate::vessels::ResolverConfig;

    fn resolver() -> VesselResolver {
        VesselResolver::offline(ResolverConfig::default().without_cache())
    }

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn slash_layout() {
        let records = MaerskParser.parse(
            &lines(&["SPIL NISAKA / 602N", "16 Jan 2026, 19:00", "24 Jan 2026, 08:00"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.vessel, "SPIL NISAKA");
        assert_eq!(r.voyage, "602N");
        assert_eq!(r.etd, "16 Jan 2026, 19:00");
        assert_eq!(r.eta, "24 Jan 2026, 08:00");
        assert_eq!(r.carrier, Some(Carrier::Maersk));
    }

    #[test]
    fn several_vessels_take_date_pairs_in_order() {
        let records = MaerskParser.parse(
            &lines(&[
                "SPIL NISAKA / 602N",
                "16 Jan 2026, 19:00  24 Jan 2026, 08:00",
                "SKYPEACE / 603S",
                "20 Jan 2026, 10:00",
                "28 Jan 2026, 06:00",
                "JULIUS-S. / 604N",
            ]),
            &resolver(),
        );
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].vessel, "SKY PEACE");
        assert_eq!(records[1].etd, "20 Jan 2026, 10:00");
        assert_eq!(records[1].eta, "28 Jan 2026, 06:00");
        assert_eq!(records[2].vessel, "JULIUS-S.");
        assert_eq!(records[2].etd, TBA);
        assert_eq!(records[2].eta, TBA);
    }

    #[test]
    fn repeated_voyage_and_dates_are_collapsed() {
        let records = MaerskParser.parse(
            &lines(&[
                "SPIL NISAKA / 602N",
                "16 Jan 2026, 19:00",
                "SPIL NISAKA / 602N",
                "16 Jan 2026, 19:00",
                "24 Jan 2026, 08:00",
            ]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].eta, "24 Jan 2026, 08:00");
    }

    #[test]
    fn space_layout_needs_timestamp() {
        let with_time = lines(&["SKY PEACE 602S 18 Jan 2026, 10:00 05 Feb 2026, 22:00"]);
        assert!(MaerskParser.can_parse(&with_time.join("\n")));
        let records = MaerskParser.parse(&with_time, &resolver());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "SKY PEACE");
        assert_eq!(records[0].voyage, "602S");
        assert_eq!(records[0].eta, "05 Feb 2026, 22:00");

        let without = lines(&["SKY PEACE 602S 18Jan 05Feb"]);
        assert!(!MaerskParser.can_parse(&without.join("\n")));
        assert!(MaerskParser.parse(&without, &resolver()).is_empty());
    }

    #[test]
    fn header_words_are_not_vessels() {
        let records = MaerskParser.parse(
            &lines(&["VESSEL VOYAGE 602N", "16 Jan 2026, 19:00"]),
            &resolver(),
        );
        assert!(records.is_empty());
    }

    #[test]
    fn label_on_the_vessel_line() {
        let records = MaerskParser.parse(
            &lines(&[
                "Route Jakarta SPIL NISAKA / 602N",
                "16 Jan 2026, 19:00",
                "24 Jan 2026, 08:00",
            ]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "SPIL NISAKA");
        assert_eq!(records[0].voyage, "602N");
        assert_eq!(records[0].etd, "16 Jan 2026, 19:00");

        let records = MaerskParser.parse(
            &lines(&["Service: MAERSK KINLOSS / 611W", "02 Feb 2026, 08:00"]),
            &resolver(),
        );
        assert_eq!(records[0].vessel, "MAERSK KINLOSS");
    }

    #[test]
    fn voyage_must_end_in_letter() {
        assert!(!MaerskParser.can_parse("SPIL NISAKA / 602"));
    }

    #[test]
    fn plain_dates_when_no_timestamps() {
        let records = MaerskParser.parse(
            &lines(&["VESSEL/VOYAGE: SPIL NISAKA / 501S", "ETD: 20 Jan 2026", "ETA: 10 Feb 2026"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].vessel, "SPIL NISAKA");
        assert_eq!(records[0].etd, "20 Jan 2026");
        assert_eq!(records[0].eta, "10 Feb 2026");
    }

    #[test]
    fn lowercase_voyage_letter_rejected() {
        assert!(!MaerskParser.can_parse("hello / 123n"));
    }
}
