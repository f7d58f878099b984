//! Edit-distance scoring used to rescue near-miss text queries.

/// Classic Levenshtein edit distance.
///
/// Insertion, deletion and substitution each cost 1. Computed over Unicode
/// scalar values with a full `(len(b)+1) x (len(a)+1)` distance matrix.
pub fn levenshtein(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // matrix[i][j] = distance between b[..i] and a[..j]
    let mut matrix = vec![vec![0usize; a.len() + 1]; b.len() + 1];

    for (i, row) in matrix.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=a.len() {
        matrix[0][j] = j;
    }

    for i in 1..=b.len() {
        for j in 1..=a.len() {
            matrix[i][j] = if b[i - 1] == a[j - 1] {
                matrix[i - 1][j - 1]
            } else {
                (matrix[i - 1][j - 1] + 1)
                    .min(matrix[i][j - 1] + 1)
                    .min(matrix[i - 1][j] + 1)
            };
        }
    }

    matrix[b.len()][a.len()]
}

/// Similarity in `[0, 1]`: `(maxLen - levenshtein) / maxLen`.
///
/// Two empty strings are identical (`1.0`).
pub fn similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }

    let distance = levenshtein(a, b);
    (max_len - distance) as f64 / max_len as f64
}

/// Whether `term` is close enough to `value` to count as a fuzzy hit.
pub fn is_fuzzy_match(value: &str, term: &str, threshold: f64) -> bool {
    similarity(value, term) >= threshold
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kitten_sitting() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
    }

    #[test]
    fn empty_operands() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("abc", ""), 3);
        assert_eq!(levenshtein("", ""), 0);
    }

    #[test]
    fn identical() {
        assert_eq!(levenshtein("abc", "abc"), 0);
        assert!((similarity("abc", "abc") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn no_transpositions() {
        // A transposition costs two substitutions
        assert_eq!(levenshtein("ab", "ba"), 2);
    }

    #[test]
    fn counts_chars_not_bytes() {
        assert_eq!(levenshtein("café", "cafe"), 1);
        assert!((similarity("café", "cafe") - 0.75).abs() < 1e-9);
    }

    #[test]
    fn similarity_of_empty_strings() {
        assert!((similarity("", "") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("", "abc").abs() < f64::EPSILON);
    }

    #[test]
    fn dissimilar_strings_score_low() {
        assert!(similarity("abc", "xyz") <= 0.34);
    }

    #[test]
    fn fuzzy_threshold_is_inclusive() {
        // 1 edit over 10 chars
        assert!(is_fuzzy_match("seattlewa", "seattlewax", 0.9));
        assert!(!is_fuzzy_match("seattlewa", "seattlewax", 0.91));
    }
}
