//! Built-in vessel table, used when no store or cache is available.

/// Canonical name and known OCR variants.
pub(crate) const SEED_VESSELS: [(&str, &[&str]); 10] = [
    ("DANUM 175", &["DANUM175", "OANUM 175", "DANUM I75"]),
    ("CNC JUPITER", &["CNCJUPITER", "CNC JUPTER"]),
    ("SPIL NISAKA", &["SPILNISAKA"]),
    ("JULIUS-S.", &["JULIUS S", "JULIUS-S", "JULTUS"]),
    ("SKY PEACE", &["SKYPEACE"]),
    ("MARTIN SCHULTE", &["MARTINSCHULTE"]),
    ("COSCO ISTANBUL", &["COSCOISTANBUL"]),
    ("EVER GOLDEN", &["EVERGOLDEN"]),
    ("ONE HARMONY", &["ONEHARMONY"]),
    ("HAMBURG EXPRESS", &["HAMBURGEXPRESS"]),
];

/// Stable id for a vessel that has no store-assigned id.
///
/// ```
/// use schedule_extract::vessels::slug_id;
///
/// assert_eq!(slug_id("JULIUS-S."), "julius_s");
/// assert_eq!(slug_id("DANUM 175"), "danum_175");
/// ```
pub fn slug_id(name: &str) -> String {
    name.to_lowercase()
        .replace('.', "")
        .replace([' ', '-'], "_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn seed_ids_are_unique() {
        let ids: HashSet<String> = SEED_VESSELS.iter().map(|(name, _)| slug_id(name)).collect();
        assert_eq!(ids.len(), SEED_VESSELS.len());
    }

    #[test]
    fn seed_aliases_are_upper_case() {
        for (_, aliases) in SEED_VESSELS {
            for alias in aliases {
                assert_eq!(*alias, alias.to_uppercase());
            }
        }
    }
}
