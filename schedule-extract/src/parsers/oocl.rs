//! OOCL layout.
//!
//! OOCL rows are read line by line: each `VESSEL 0125N` line takes its dates
//! from the densest date line at or just above it. The first date on such a
//! line is the cut-off, so with three or more dates the departure is the
//! second and the arrival the last.

use chrono::{Datelike, NaiveDate, TimeDelta};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::{Carrier, ScheduleRecord};
use crate::vessels::VesselResolver;

use super::ScheduleParser;
use super::patterns::{MONTHS, collapse, plausible_vessel};

/// How many lines above a vessel line are searched for dates.
const LOOKBACK_LINES: usize = 5;

/// Departure is assumed this many days after the CY cut-off.
const CUTOFF_TO_DEPARTURE_DAYS: i64 = 3;

/// Non-leap year used for arithmetic on year-less dates.
const ARITHMETIC_YEAR: i32 = 2001;

/// `OOCL TEXAS 0125N`; an all-digit code ending in 8 is a misread `S`.
static VESSEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([A-Z][A-Z\.\-]+(?:[ \t]+[A-Z][A-Z\.\-]*){0,3})[ \t]+(\d{3,4}[A-Z]|\d{3,4}8)\b")
        .expect("vessel line regex pattern is valid and should compile")
});

/// `15 Jan`, `15Jan 2026`, `15 Jan 2026 23:00`
static DAY_MONTH: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}})[ \t]*((?:{MONTHS})[a-z]*)\.?(?:[ \t]+(\d{{4}}))?(?:[, \t]+(\d{{1,2}}:\d{{2}}))?"
    ))
    .expect("day-month regex pattern is valid and should compile")
});

#[derive(Debug, Clone, PartialEq, Eq)]
struct DateToken {
    day: u32,
    month: String,
    year: Option<i32>,
    time: Option<String>,
}

impl DateToken {
    /// `15 Jan 2026, 23:00`, dropping the parts that were not printed.
    fn render(&self) -> String {
        let mut out = format!("{:02} {}", self.day, self.month);
        if let Some(year) = self.year {
            out.push_str(&format!(" {year}"));
        }
        if let Some(time) = &self.time {
            out.push_str(&format!(", {time}"));
        }
        out
    }

    fn plus_days(&self, days: i64) -> Option<Self> {
        let abbrev: String = self.month.chars().take(3).collect();
        let year = self.year.unwrap_or(ARITHMETIC_YEAR);
        let date = NaiveDate::parse_from_str(&format!("{} {abbrev} {year}", self.day), "%d %b %Y")
            .ok()?
            .checked_add_signed(TimeDelta::days(days))?;

        Some(Self {
            day: date.day(),
            month: date.format("%b").to_string(),
            year: self.year.map(|_| date.year()),
            time: self.time.clone(),
        })
    }
}

fn date_tokens(line: &str) -> Vec<DateToken> {
    DAY_MONTH
        .captures_iter(line)
        .filter_map(|caps| {
            let day: u32 = caps[1].parse().ok()?;
            if !(1..=31).contains(&day) {
                return None;
            }
            Some(DateToken {
                day,
                month: caps[2].to_string(),
                year: caps.get(3).and_then(|m| m.as_str().parse().ok()),
                time: caps.get(4).map(|m| m.as_str().to_string()),
            })
        })
        .collect()
}

fn is_cutoff_line(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("cy cut") || lower.contains("cut-off") || lower.contains("cutoff")
}

/// Undo common OCR damage to a voyage code.
///
/// A trailing `8` on an all-digit code is a misread `S`, and a leading
/// extra digit on a four-digit code is dropped: `01258` → `0125S` → `125S`.
fn repair_voyage(raw: &str) -> String {
    let mut voyage = raw.to_uppercase();

    if voyage.chars().all(|c| c.is_ascii_digit()) && voyage.ends_with('8') {
        voyage.pop();
        voyage.push('S');
    }

    let chars: Vec<char> = voyage.chars().collect();
    if chars.len() == 5 && chars[..4].iter().all(char::is_ascii_digit) && chars[4].is_ascii_alphabetic() {
        voyage = chars[1..].iter().collect();
    }

    voyage
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OoclParser;

impl OoclParser {
    fn vessel_on(line: &str) -> Option<(String, String)> {
        VESSEL_LINE.captures_iter(line).find_map(|caps| {
            let name = collapse(&caps[1]);
            plausible_vessel(&name).then(|| (name, repair_voyage(&caps[2])))
        })
    }

    /// ETD and ETA for the vessel on line `at`.
    fn dates_for(
        lines: &[String],
        vessels: &[Option<(String, String)>],
        at: usize,
    ) -> (Option<String>, Option<String>) {
        let mut best: Option<Vec<DateToken>> = None;
        let mut cutoff: Option<DateToken> = None;

        for j in (at.saturating_sub(LOOKBACK_LINES)..=at).rev() {
            if j != at && vessels[j].is_some() {
                break;
            }
            if is_cutoff_line(&lines[j]) {
                if cutoff.is_none() {
                    cutoff = date_tokens(&lines[j]).into_iter().next();
                }
                continue;
            }
            let tokens = date_tokens(&lines[j]);
            if !tokens.is_empty() && best.as_ref().is_none_or(|b| tokens.len() > b.len()) {
                best = Some(tokens);
            }
        }

        match best {
            Some(tokens) if tokens.len() >= 3 => (
                Some(tokens[1].render()),
                tokens.last().map(DateToken::render),
            ),
            Some(tokens) if tokens.len() == 2 => {
                (Some(tokens[0].render()), Some(tokens[1].render()))
            }
            Some(tokens) => (tokens.first().map(DateToken::render), None),
            None => (
                cutoff
                    .and_then(|c| c.plus_days(CUTOFF_TO_DEPARTURE_DAYS))
                    .map(|d| d.render()),
                None,
            ),
        }
    }
}

impl ScheduleParser for OoclParser {
    fn name(&self) -> &'static str {
        "OOCL"
    }

    fn carrier(&self) -> Option<Carrier> {
        Some(Carrier::Oocl)
    }

    fn can_parse(&self, text: &str) -> bool {
        let lower = text.to_lowercase();
        lower.contains("oocl") || lower.contains("cy cut-off")
    }

    fn parse(&self, lines: &[String], resolver: &VesselResolver) -> Vec<ScheduleRecord> {
        let vessels: Vec<Option<(String, String)>> =
            lines.iter().map(|line| Self::vessel_on(line)).collect();

        let mut seen: Vec<(String, String)> = Vec::new();
        let mut records = Vec::new();

        for (at, found) in vessels.iter().enumerate() {
            let Some((raw_name, voyage)) = found else {
                continue;
            };
            let name = self.normalize_vessel(raw_name, resolver);
            let key = (name.clone(), voyage.clone());
            if seen.contains(&key) {
                continue;
            }
            seen.push(key);

            let (etd, eta) = Self::dates_for(lines, &vessels, at);
            records.push(
                ScheduleRecord::new(name, voyage, etd.as_deref(), eta.as_deref())
                    .with_carrier(self.carrier()),
            );
        }

        records
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
    fn voyage_repair() {
        assert_eq!(repair_voyage("0125N"), "125N");
        assert_eq!(repair_voyage("125N"), "125N");
        assert_eq!(repair_voyage("1238"), "123S");
        assert_eq!(repair_voyage("01258"), "125S");
        assert_eq!(repair_voyage("125s"), "125S");
    }

    #[test]
    fn date_tokens_on_a_line() {
        let tokens = date_tokens("Tue 13 Jan 12:00  15Jan 2026 23:00  45 Jan  31 Jan.");
        let rendered: Vec<String> = tokens.iter().map(DateToken::render).collect();
        assert_eq!(rendered, vec!["13 Jan, 12:00", "15 Jan 2026, 23:00", "31 Jan"]);
    }

    #[test]
    fn three_dates_take_second_and_last() {
        let records = OoclParser.parse(
            &lines(&[
                "CY Cut-off: 12 Jan 2026 12:00",
                "13 Jan 2026 09:00 15 Jan 2026 23:00 28 Jan 2026 06:00",
                "OOCL TEXAS 0125N",
            ]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
        let r = &records[0];
        assert_eq!(r.vessel, "OOCL TEXAS");
        assert_eq!(r.voyage, "125N");
        assert_eq!(r.etd, "15 Jan 2026, 23:00");
        assert_eq!(r.eta, "28 Jan 2026, 06:00");
        assert_eq!(r.carrier, Some(Carrier::Oocl));
    }

    #[test]
    fn window_stops_at_previous_vessel() {
        let records = OoclParser.parse(
            &lines(&[
                "13 Jan 23:00 20 Jan 06:00",
                "KOTA LAYANG 1238",
                "16 Jan 10:00",
                "OOCL TEXAS 0125N",
            ]),
            &resolver(),
        );
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].vessel, "KOTA LAYANG");
        assert_eq!(records[0].voyage, "123S");
        assert_eq!(records[0].etd, "13 Jan, 23:00");
        assert_eq!(records[0].eta, "20 Jan, 06:00");

        assert_eq!(records[1].etd, "16 Jan, 10:00");
        assert_eq!(records[1].eta, TBA);
    }

    #[test]
    fn densest_line_wins_and_nearest_breaks_ties() {
        let records = OoclParser.parse(
            &lines(&[
                "01 Jan 02 Jan",
                "05 Jan 09 Jan",
                "OOCL TEXAS 0125N",
            ]),
            &resolver(),
        );
        assert_eq!(records[0].etd, "05 Jan");
        assert_eq!(records[0].eta, "09 Jan");
    }

    #[test]
    fn cutoff_fallback_adds_three_days() {
        let records = OoclParser.parse(
            &lines(&["CY Cut-off 12 Jan 2026", "OOCL TEXAS 0125N"]),
            &resolver(),
        );
        assert_eq!(records[0].etd, "15 Jan 2026");
        assert_eq!(records[0].eta, TBA);

        let records =
            OoclParser.parse(&lines(&["CY Cut-off 28 Feb", "OOCL TEXAS 0125N"]), &resolver());
        assert_eq!(records[0].etd, "03 Mar");
    }

    #[test]
    fn no_dates_at_all() {
        let records = OoclParser.parse(&lines(&["OOCL TEXAS 0125N"]), &resolver());
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].etd, TBA);
        assert!(!records[0].is_valid());
    }

    #[test]
    fn repeated_vessel_lines_collapse() {
        let records = OoclParser.parse(
            &lines(&["OOCL TEXAS 0125N", "13 Jan 15 Jan", "OOCL TEXAS 0125N"]),
            &resolver(),
        );
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn recognises_layout() {
        assert!(OoclParser.can_parse("CY Cut-off: 15 Jan\nVessel Voyage: OOCL TEXAS 0125N"));
        assert!(!OoclParser.can_parse("VESSEL/VOYAGE: DANUM 175 / 602N"));
    }
}
