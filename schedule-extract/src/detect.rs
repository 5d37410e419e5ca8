//! Carrier detection.
//!
//! Screenshots are usually saved with a one-letter carrier prefix
//! (`m_schedule.png` for Maersk). When the prefix is missing, the carrier is
//! guessed from keywords in the OCR text.

use std::path::Path;

use crate::domain::Carrier;

/// Keyword signatures, in tie-break order.
const SIGNATURES: [(Carrier, &[&str]); 7] = [
    (Carrier::Maersk, &["maersk", "vessel/voyage", "/voyage"]),
    (Carrier::Oocl, &["oocl", "cy cut-off", "laden pickup"]),
    (Carrier::CmaCgm, &["cma", "cnc", "vessel"]),
    (Carrier::Evergreen, &["evergreen", "service"]),
    (Carrier::Msc, &["msc", "m/v"]),
    (Carrier::One, &["one", "ocean network"]),
    (Carrier::HapagLloyd, &["hapag", "lloyd"]),
];

/// Detect the carrier from a screenshot filename prefix.
///
/// Looks at the basename: if its second character is `_`, the first character
/// is looked up in the carrier prefix table (case-insensitive).
///
/// # Examples
///
/// ```
/// use schedule_extract::detect::by_filename;
/// use schedule_extract::domain::Carrier;
///
/// assert_eq!(by_filename("m_schedule.png"), Some(Carrier::Maersk));
/// assert_eq!(by_filename("/tmp/shots/C_week3.png"), Some(Carrier::CmaCgm));
/// assert_eq!(by_filename("schedule.png"), None);
/// ```
pub fn by_filename(name: &str) -> Option<Carrier> {
    let basename = Path::new(name)
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let mut chars = basename.chars();
    let prefix = chars.next()?;
    if chars.next()? != '_' {
        return None;
    }

    Carrier::from_prefix(prefix)
}

/// Detect the carrier from OCR text by keyword scoring.
///
/// Each carrier scores one point per signature keyword found in the text
/// (case-insensitive). The highest score wins; ties go to the carrier listed
/// first. Returns `None` when nothing scores.
///
/// # Examples
///
/// ```
/// use schedule_extract::detect::by_content;
/// use schedule_extract::domain::Carrier;
///
/// assert_eq!(by_content("VESSEL/VOYAGE: DANUM 175 / 602N"), Some(Carrier::Maersk));
/// assert_eq!(by_content("Random text without keywords"), None);
/// ```
pub fn by_content(text: &str) -> Option<Carrier> {
    let lower = text.to_lowercase();

    let mut best: Option<(Carrier, usize)> = None;
    for (carrier, keywords) in SIGNATURES {
        let score = keywords.iter().filter(|kw| lower.contains(*kw)).count();
        if score == 0 {
            continue;
        }
        if best.is_none_or(|(_, top)| score > top) {
            best = Some((carrier, score));
        }
    }

    best.map(|(carrier, _)| carrier)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filename_prefixes() {
        assert_eq!(by_filename("m_schedule.png"), Some(Carrier::Maersk));
        assert_eq!(by_filename("o_schedule.png"), Some(Carrier::Oocl));
        assert_eq!(by_filename("c_schedule.png"), Some(Carrier::CmaCgm));
        assert_eq!(by_filename("X_misc.jpg"), Some(Carrier::Other));
    }

    #[test]
    fn filename_without_prefix() {
        assert_eq!(by_filename("schedule.png"), None);
        assert_eq!(by_filename("mm_schedule.png"), None);
        assert_eq!(by_filename("q_schedule.png"), None);
        assert_eq!(by_filename(""), None);
        assert_eq!(by_filename("m"), None);
    }

    #[test]
    fn filename_uses_basename() {
        assert_eq!(by_filename("shots/o_2026/m_week.png"), Some(Carrier::Maersk));
        assert_eq!(by_filename("m_dir/schedule.png"), None);
    }

    #[test]
    fn content_maersk() {
        assert_eq!(
            by_content("VESSEL/VOYAGE: DANUM 175 / 602N"),
            Some(Carrier::Maersk)
        );
    }

    #[test]
    fn content_oocl() {
        assert_eq!(
            by_content("CY Cut-off: 15 Jan 2026\nOOCL TEXAS 0125N"),
            Some(Carrier::Oocl)
        );
    }

    #[test]
    fn content_cma() {
        assert_eq!(
            by_content("Vessel CNC JUPITER\nVoyage Ref: 602N"),
            Some(Carrier::CmaCgm)
        );
    }

    #[test]
    fn content_unknown() {
        assert_eq!(by_content("Random text without carrier keywords"), None);
        assert_eq!(by_content(""), None);
    }

    #[test]
    fn content_tie_goes_to_first_listed() {
        // One point each for MAERSK and CMA-CGM.
        assert_eq!(by_content("maersk cnc"), Some(Carrier::Maersk));
        // One point each for EVERGREEN and MSC.
        assert_eq!(by_content("service m/v"), Some(Carrier::Evergreen));
    }

    #[test]
    fn content_strict_maximum_wins() {
        // CMA-CGM scores 2, MAERSK 1.
        assert_eq!(by_content("maersk cma vessel"), Some(Carrier::CmaCgm));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Detection is total and deterministic
        #[test]
        fn content_deterministic(s in "\\PC{0,200}") {
            prop_assert_eq!(by_content(&s), by_content(&s));
        }

        /// A single-letter prefix never matches without the underscore
        #[test]
        fn filename_requires_underscore(c in "[a-z]", rest in "[a-z0-9.]{1,12}") {
            let name = format!("{c}{rest}");
            prop_assert_eq!(by_filename(&name), None);
        }
    }
}
