//! Levenshtein edit distance and fuzzy name matching
//!
//! `levenshtein` is the classic dynamic program over Unicode scalar values:
//!
//! ```text
//! dp[i][0] = i
//! dp[0][j] = j
//! dp[i][j] = dp[i-1][j-1]                                   if a[i-1] == b[j-1]
//!          = 1 + min(dp[i-1][j-1], dp[i-1][j], dp[i][j-1])  otherwise
//! ```
//!
//! Only two rows of the table are kept, so memory is O(|b|).

/// Minimum number of single-character insertions, deletions or substitutions
/// turning `a` into `b`
///
/// # Example
///
/// ```
/// use cairn::edit_distance::levenshtein;
///
/// assert_eq!(levenshtein("kitten", "sitting"), 3);
/// assert_eq!(levenshtein("", "abc"), 3);
/// ```
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j]
            } else {
                1 + prev[j].min(prev[j + 1]).min(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in `[0, 1]`: `1 - distance / max(len(a), len(b))`
///
/// Two empty strings are identical (1.0).
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

/// Candidate selected by [`closest_match`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match<'a> {
    /// Candidate as passed in (original casing)
    pub candidate: &'a str,
    /// Edit distance after normalization
    pub distance: usize,
}

/// Closest candidate to `query` within `max_distance` edits
///
/// Comparison is case-insensitive and ignores surrounding whitespace. Ties go
/// to the earliest candidate. Returns `None` if every candidate is further
/// than `max_distance`.
///
/// # Example
///
/// ```
/// use cairn::edit_distance::closest_match;
///
/// let licenses = ["MIT", "Apache-2.0", "GPL-3.0"];
/// let found = closest_match(" apache-2 ", &licenses, 2).unwrap();
/// assert_eq!(found.candidate, "Apache-2.0");
/// assert_eq!(found.distance, 2);
/// ```
pub fn closest_match<'a, S: AsRef<str>>(
    query: &str,
    candidates: &'a [S],
    max_distance: usize,
) -> Option<Match<'a>> {
    let query = normalize(query);
    let mut best: Option<Match<'a>> = None;

    for candidate in candidates {
        let candidate = candidate.as_ref();
        let distance = levenshtein(&query, &normalize(candidate));
        if distance > max_distance {
            continue;
        }
        if best.map_or(true, |b| distance < b.distance) {
            best = Some(Match {
                candidate,
                distance,
            });
        }
    }

    best
}

fn normalize(s: &str) -> String {
    s.trim().to_lowercase()
}
