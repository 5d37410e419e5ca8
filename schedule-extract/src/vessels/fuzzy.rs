//! Fuzzy string similarity for vessel names.
//!
//! The score is an Indel ratio (`2 * LCS / (len_a + len_b)`, scaled to 0–100)
//! computed over the whitespace tokens of each string sorted alphabetically,
//! so word order does not matter: "PEACE SKY" scores 100 against "SKY PEACE".

/// Token-order-insensitive similarity in `0.0..=100.0`.
///
/// # Examples
///
/// ```
/// use schedule_extract::vessels::token_sort_ratio;
///
/// assert_eq!(token_sort_ratio("PEACE SKY", "SKY PEACE"), 100.0);
/// assert!(token_sort_ratio("CNC JUPTER", "CNC JUPITER") > 90.0);
/// assert!(token_sort_ratio("HELLO", "SKY PEACE") < 50.0);
/// ```
pub fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> Vec<char> {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ").chars().collect()
}

fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 0.0;
    }
    let lcs = lcs_len(a, b);
    100.0 * (2 * lcs) as f64 / total as f64
}

/// Length of the longest common subsequence, two-row dynamic programming.
fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];

    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}
