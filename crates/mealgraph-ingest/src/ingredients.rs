//! Ingredient frequency listing.

use std::collections::HashMap;

/// Distinct names sorted by descending frequency, ties alphabetical.
pub fn rank_by_frequency<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    for name in names {
        *counts.entry(name.as_ref().to_string()).or_insert(0) += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
    ranked.into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frequency_then_alphabetical() {
        let ranked = rank_by_frequency(["a", "b", "a", "c", "b", "a"]);
        assert_eq!(ranked, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_ties_are_alphabetical() {
        let ranked = rank_by_frequency(["pepper", "basil", "salt", "basil", "pepper", "salt"]);
        assert_eq!(ranked, vec!["basil", "pepper", "salt"]);
    }

    #[test]
    fn test_empty() {
        assert!(rank_by_frequency(Vec::<String>::new()).is_empty());
    }
}
