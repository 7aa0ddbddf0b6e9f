//! "Did you mean" candidate ranking for undefined-reference diagnostics.
//!
//! The validator hands this module an unknown name and the candidate pool
//! for the reference kind (page names, field names of one page, action
//! names of one container). Ranking is independent of validator control
//! flow so it can be tested on plain string slices.

/// Maximum number of candidates attached to a single diagnostic.
pub const MAX_SUGGESTIONS: usize = 3;

/// Maximum edit distance for a candidate to qualify as "close".
pub const MAX_EDIT_DISTANCE: usize = 2;

/// Shortest name length considered for substring matching. Below this,
/// substring containment matches too much to be useful.
const MIN_SUBSTRING_LEN: usize = 3;

/// Return up to [`MAX_SUGGESTIONS`] candidates similar to `unknown`,
/// closest first.
///
/// Similarity is case-insensitive: a candidate qualifies when its edit
/// distance to the unknown name is at most [`MAX_EDIT_DISTANCE`], or when
/// one name contains the other and the shorter side has at least three
/// characters. Ties are broken alphabetically so output is deterministic.
///
/// # Example
///
/// ```
/// use vero::suggest::suggest;
///
/// let pages = ["HomePage", "LoginPage", "CartPage"];
/// assert_eq!(suggest("HomPage", pages), vec!["HomePage".to_string()]);
/// ```
pub fn suggest<'a, I>(unknown: &str, candidates: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let needle = unknown.to_lowercase();

    let mut ranked: Vec<(usize, &str)> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let hay = candidate.to_lowercase();
            let distance = edit_distance(&needle, &hay);
            if distance <= MAX_EDIT_DISTANCE || is_substring_match(&needle, &hay) {
                Some((distance, candidate))
            } else {
                None
            }
        })
        .collect();

    ranked.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));
    ranked
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|(_, name)| name.to_string())
        .collect()
}

/// Containment in either direction, guarded by a minimum length on the
/// shorter side.
fn is_substring_match(a: &str, b: &str) -> bool {
    let shorter = a.len().min(b.len());
    shorter >= MIN_SUBSTRING_LEN && (a.contains(b) || b.contains(a))
}

/// Levenshtein distance over character sequences, two-row formulation.
fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0usize; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            let insertion = current[j] + 1;
            let deletion = prev[j + 1] + 1;
            current[j + 1] = substitution.min(insertion).min(deletion);
        }
        std::mem::swap(&mut prev, &mut current);
    }

    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_distance_basic() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("homepage", "homepage"), 0);
        assert_eq!(edit_distance("hompage", "homepage"), 1);
    }

    #[test]
    fn test_one_character_typo_is_suggested() {
        let pages = ["HomePage", "LoginPage", "CheckoutPage"];
        let got = suggest("HomPage", pages);
        assert_eq!(got, vec!["HomePage".to_string()]);
    }

    #[test]
    fn test_case_is_ignored() {
        let got = suggest("homepage", ["HomePage"]);
        assert_eq!(got, vec!["HomePage".to_string()]);
    }

    #[test]
    fn test_distance_cutoff_excludes_far_names() {
        let got = suggest("settings", ["CartPage", "LoginPage"]);
        assert!(got.is_empty());
    }

    #[test]
    fn test_substring_match_qualifies() {
        // Distance 5, but "login" is contained in "LoginPage".
        let got = suggest("login", ["LoginPage", "CartPage"]);
        assert_eq!(got, vec!["LoginPage".to_string()]);
    }

    #[test]
    fn test_short_fragments_do_not_substring_match() {
        let got = suggest("xy", ["ProxyPage"]);
        assert!(got.is_empty());
    }

    #[test]
    fn test_at_most_three_suggestions() {
        let candidates = ["page1", "page2", "page3", "page4", "page5"];
        let got = suggest("page", candidates);
        assert_eq!(got.len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn test_closest_first_then_alphabetical() {
        let got = suggest("user", ["users", "laser", "used"]);
        // "used" and "users" are distance 1, "laser" is distance 2.
        assert_eq!(
            got,
            vec!["used".to_string(), "users".to_string(), "laser".to_string()]
        );
    }
}
