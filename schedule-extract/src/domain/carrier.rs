//! Shipping line (carrier) identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A known shipping line.
///
/// The set is closed: every carrier the detector or a parser can report is
/// listed here. `Other` is what the `x_` filename prefix maps to.
///
/// # Examples
///
/// ```
/// use schedule_extract::domain::Carrier;
///
/// assert_eq!(Carrier::CmaCgm.as_str(), "CMA-CGM");
/// assert_eq!(Carrier::from_prefix('M'), Some(Carrier::Maersk));
/// assert_eq!(Carrier::from_prefix('q'), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Carrier {
    #[serde(rename = "MAERSK")]
    Maersk,
    #[serde(rename = "OOCL")]
    Oocl,
    #[serde(rename = "CMA-CGM")]
    CmaCgm,
    #[serde(rename = "HAPAG-LLOYD")]
    HapagLloyd,
    #[serde(rename = "EVERGREEN")]
    Evergreen,
    #[serde(rename = "ONE")]
    One,
    #[serde(rename = "YANG-MING")]
    YangMing,
    #[serde(rename = "MSC")]
    Msc,
    #[serde(rename = "ZIM")]
    Zim,
    #[serde(rename = "WAN-HAI")]
    WanHai,
    #[serde(rename = "PIL")]
    Pil,
    #[serde(rename = "OTHER")]
    Other,
}

/// Filename prefix table, in lookup order.
const PREFIXES: [(char, Carrier); 12] = [
    ('m', Carrier::Maersk),
    ('o', Carrier::Oocl),
    ('c', Carrier::CmaCgm),
    ('h', Carrier::HapagLloyd),
    ('e', Carrier::Evergreen),
    ('n', Carrier::One),
    ('y', Carrier::YangMing),
    ('s', Carrier::Msc),
    ('z', Carrier::Zim),
    ('w', Carrier::WanHai),
    ('p', Carrier::Pil),
    ('x', Carrier::Other),
];

impl Carrier {
    /// Returns the carrier identifier as used in records and hints.
    pub fn as_str(&self) -> &'static str {
        match self {
            Carrier::Maersk => "MAERSK",
            Carrier::Oocl => "OOCL",
            Carrier::CmaCgm => "CMA-CGM",
            Carrier::HapagLloyd => "HAPAG-LLOYD",
            Carrier::Evergreen => "EVERGREEN",
            Carrier::One => "ONE",
            Carrier::YangMing => "YANG-MING",
            Carrier::Msc => "MSC",
            Carrier::Zim => "ZIM",
            Carrier::WanHai => "WAN-HAI",
            Carrier::Pil => "PIL",
            Carrier::Other => "OTHER",
        }
    }

    /// Look up a carrier by its single-character filename prefix.
    ///
    /// Case-insensitive.
    pub fn from_prefix(c: char) -> Option<Self> {
        let c = c.to_ascii_lowercase();
        PREFIXES
            .iter()
            .find(|(prefix, _)| *prefix == c)
            .map(|(_, carrier)| *carrier)
    }

    /// Parse a carrier identifier (e.g. "CMA-CGM"), case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        PREFIXES
            .iter()
            .map(|(_, carrier)| *carrier)
            .find(|carrier| carrier.as_str().eq_ignore_ascii_case(s))
    }
}

impl fmt::Display for Carrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_lookup_is_case_insensitive() {
        assert_eq!(Carrier::from_prefix('o'), Some(Carrier::Oocl));
        assert_eq!(Carrier::from_prefix('O'), Some(Carrier::Oocl));
        assert_eq!(Carrier::from_prefix('x'), Some(Carrier::Other));
    }

    #[test]
    fn unknown_prefix() {
        assert_eq!(Carrier::from_prefix('a'), None);
        assert_eq!(Carrier::from_prefix('1'), None);
        assert_eq!(Carrier::from_prefix('_'), None);
    }

    #[test]
    fn parse_roundtrip() {
        for (_, carrier) in PREFIXES {
            assert_eq!(Carrier::parse(carrier.as_str()), Some(carrier));
        }
        assert_eq!(Carrier::parse("hapag-lloyd"), Some(Carrier::HapagLloyd));
        assert_eq!(Carrier::parse("CMA"), None);
    }

    #[test]
    fn serializes_as_identifier() {
        let json = serde_json::to_string(&Carrier::WanHai).unwrap();
        assert_eq!(json, "\"WAN-HAI\"");
        let back: Carrier = serde_json::from_str("\"CMA-CGM\"").unwrap();
        assert_eq!(back, Carrier::CmaCgm);
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", Carrier::YangMing), "YANG-MING");
    }
}
