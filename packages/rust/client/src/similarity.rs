//! Fuzzy matching between a user query and candidate article titles.

/// Similarity of `query` to `candidate` in `[0, 1]`.
///
/// The larger of two measures over normalized text:
/// - token coverage: the share of query tokens that equal, or are a prefix of
///   at least three characters of, some candidate token (`einstein` fully
///   covers `Albert Einstein`)
/// - edit similarity: `1 - levenshtein / longer length`, which tolerates typos
pub fn similarity(query: &str, candidate: &str) -> f64 {
    let query = normalize(query);
    let candidate = normalize(candidate);
    if query.is_empty() || candidate.is_empty() {
        return 0.0;
    }

    token_coverage(&query, &candidate).max(edit_similarity(&query, &candidate))
}

/// Lower-case, replace non-alphanumerics with spaces, collapse whitespace.
fn normalize(s: &str) -> String {
    let mapped: String = s
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn token_coverage(query: &str, candidate: &str) -> f64 {
    let candidate_tokens: Vec<&str> = candidate.split_whitespace().collect();
    let query_tokens: Vec<&str> = query.split_whitespace().collect();

    let covered = query_tokens
        .iter()
        .filter(|token| {
            candidate_tokens.iter().any(|c| {
                c == *token || (token.chars().count() >= 3 && c.starts_with(**token))
            })
        })
        .count();

    covered as f64 / query_tokens.len() as f64
}

fn edit_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization() {
        assert_eq!(normalize("  Albert   EINSTEIN! "), "albert einstein");
        assert_eq!(normalize("Jean-Paul Sartre"), "jean paul sartre");
    }

    #[test]
    fn surname_covers_full_title() {
        assert_eq!(similarity("Einstein", "Albert Einstein"), 1.0);
        assert_eq!(similarity("einst", "Albert Einstein"), 1.0);
        assert_eq!(similarity("Napoleon", "Napoleon III"), 1.0);
    }

    #[test]
    fn short_prefixes_do_not_count() {
        assert_eq!(token_coverage("al", "albert einstein"), 0.0);
    }

    #[test]
    fn typos_are_tolerated() {
        assert_eq!(levenshtein("einstien", "einstein"), 2);
        assert!(similarity("Einstien", "Einstein") >= 0.75);
    }

    #[test]
    fn unrelated_titles_score_low() {
        assert!(similarity("Xyzzyqqplonk123", "Albert Einstein") < 0.5);
        assert_eq!(similarity("", "Albert Einstein"), 0.0);
        assert_eq!(similarity("!!!", "Albert Einstein"), 0.0);
    }

    #[test]
    fn levenshtein_basics() {
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("same", "same"), 0);
    }
}
