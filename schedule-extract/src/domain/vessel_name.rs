//! Vessel name normalization.

/// Normalize a raw vessel name.
///
/// Trims the input, inserts a space wherever a letter is directly followed by
/// a digit (OCR tends to drop that space), and collapses runs of whitespace
/// into a single space. Normalization is idempotent.
///
/// # Examples
///
/// ```
/// use schedule_extract::domain::normalize_vessel_name;
///
/// assert_eq!(normalize_vessel_name("DANUM175"), "DANUM 175");
/// assert_eq!(normalize_vessel_name("  SKY   PEACE "), "SKY PEACE");
/// assert_eq!(normalize_vessel_name("DANUM 175"), "DANUM 175");
/// ```
pub fn normalize_vessel_name(raw: &str) -> String {
    let mut spaced = String::with_capacity(raw.len() + 4);
    let mut prev: Option<char> = None;

    for c in raw.chars() {
        if let Some(p) = prev
            && p.is_alphabetic()
            && c.is_ascii_digit()
        {
            spaced.push(' ');
        }
        spaced.push(c);
        prev = Some(c);
    }

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}
