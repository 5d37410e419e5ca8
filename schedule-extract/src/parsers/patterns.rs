//! Pieces shared by the carrier parsers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Month abbreviations as a regex alternation. Long names are covered by a
/// trailing `[a-z]*` at the use site.
pub(crate) const MONTHS: &str = "Jan|Feb|Mar|Apr|May|Jun|Jul|Aug|Sep|Oct|Nov|Dec";

/// Words that show up next to voyage codes in table headers and labels.
/// A candidate vessel name containing one of these is a header, not a ship.
const STOP_WORDS: [&str; 28] = [
    "VESSEL", "VOYAGE", "PORT", "SERVICE", "ROUTE", "TERMINAL", "DEPARTURE", "ARRIVAL", "ETD",
    "ETA", "TRANSIT", "CUT", "CUTOFF", "CLOSING", "DATE", "TIME", "JAN", "FEB", "MAR", "APR",
    "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// `DD Mon YYYY` with no time.
pub(crate) static DATE_ONLY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)\b(\d{{1,2}}[ \t]+(?:{MONTHS})[a-z]*[ \t]+\d{{4}})\b"))
        .expect("date regex pattern is valid and should compile")
});

/// `DD Mon YYYY, HH:MM`; the comma is optional.
pub(crate) static DATE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)\b(\d{{1,2}}[ \t]+(?:{MONTHS})[a-z]*[ \t]+\d{{4}})[, \t]+(\d{{1,2}}:\d{{2}})"
    ))
    .expect("date-time regex pattern is valid and should compile")
});

/// Whether a candidate name is, or contains, a header word.
pub(crate) fn contains_stop_word(name: &str) -> bool {
    name.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|t| !t.is_empty())
        .any(|token| {
            let token = token.to_ascii_uppercase();
            STOP_WORDS.contains(&token.as_str())
        })
}

/// Whether a normalized candidate looks like a vessel name.
pub(crate) fn plausible_vessel(name: &str) -> bool {
    name.chars().filter(|c| c.is_alphanumeric()).count() >= 3 && !contains_stop_word(name)
}

/// Drop a label run into the front of a candidate name: every token up to
/// and including the last header word. `Route: SPIL NISAKA` → `SPIL NISAKA`.
pub(crate) fn strip_leading_label(name: &str) -> String {
    let tokens: Vec<&str> = name.split_whitespace().collect();
    let start = tokens
        .iter()
        .rposition(|token| contains_stop_word(token))
        .map_or(0, |i| i + 1);
    tokens[start..].join(" ")
}

/// `DD Mon YYYY, HH:MM` with whitespace collapsed.
pub(crate) fn format_date_time(date: &str, time: &str) -> String {
    format!("{}, {}", collapse(date), time)
}

pub(crate) fn collapse(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep the first occurrence of each value, comparing with `key`.
pub(crate) fn dedup_by_key<T, K: PartialEq>(items: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    let mut seen: Vec<K> = Vec::new();
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        let k = key(&item);
        if !seen.contains(&k) {
            seen.push(k);
            out.push(item);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_labels_are_stripped() {
        assert_eq!(strip_leading_label("Route: SPIL NISAKA"), "SPIL NISAKA");
        assert_eq!(strip_leading_label("Route Jakarta SPIL NISAKA"), "Jakarta SPIL NISAKA");
        assert_eq!(strip_leading_label("SKY PEACE"), "SKY PEACE");
        assert_eq!(strip_leading_label("VESSEL VOYAGE"), "");
        assert_eq!(strip_leading_label("PORTLAND EXPRESS"), "PORTLAND EXPRESS");
    }

    #[test]
    fn stop_words_are_token_based() {
        assert!(contains_stop_word("VESSEL NAME"));
        assert!(contains_stop_word("etd"));
        assert!(contains_stop_word("PORT/KLANG"));
        // Substrings of longer words don't count
        assert!(!contains_stop_word("PORTLAND EXPRESS"));
        assert!(!contains_stop_word("SPIL NISAKA"));
    }

    #[test]
    fn plausible_vessels() {
        assert!(plausible_vessel("SKY PEACE"));
        assert!(!plausible_vessel("AB"));
        assert!(!plausible_vessel("VOYAGE"));
    }

    #[test]
    fn date_time_matches() {
        let caps = DATE_TIME.captures("ETD 16 Jan 2026, 19:00 local").unwrap();
        assert_eq!(format_date_time(&caps[1], &caps[2]), "16 Jan 2026, 19:00");

        let caps = DATE_TIME.captures("16  january 2026 7:30").unwrap();
        assert_eq!(format_date_time(&caps[1], &caps[2]), "16 january 2026, 7:30");

        assert!(DATE_TIME.captures("16 Jan 2026").is_none());
    }

    #[test]
    fn date_only_matches() {
        let found: Vec<_> = DATE_ONLY
            .captures_iter("ETD: 20 Jan 2026 ETA: 10 Feb 2026")
            .map(|c| c[1].to_string())
            .collect();
        assert_eq!(found, vec!["20 Jan 2026", "10 Feb 2026"]);
    }

    #[test]
    fn dedup_keeps_first() {
        let items = vec!["a", "B", "A", "b", "c"];
        let out = dedup_by_key(items, |s| s.to_lowercase());
        assert_eq!(out, vec!["a", "B", "c"]);
    }
}
