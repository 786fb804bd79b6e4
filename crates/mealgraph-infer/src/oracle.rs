//! Scoring oracle trait.
//!
//! An oracle answers `(?, relation, tail)` queries: given a relation and an
//! attribute node label, it scores every candidate head node. It is a black
//! box to the ranking code; implementations:
//! - `EmbeddingOracle`: exported translational/bilinear embedding table
//! - `ObservedEdgeOracle`: scores heads by whether the triple was observed

use mealgraph_core::Result;

/// One scored node in an oracle answer.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredNode {
    /// `type_value` node label.
    pub label: String,
    /// Raw, unnormalized score. Higher is better.
    pub score: f64,
}

impl ScoredNode {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Oracle answer for one query, best first.
pub type RankedList = Vec<ScoredNode>;

/// Trait for scoring back-ends. Implementations are immutable once built.
pub trait ScoringOracle: Send + Sync {
    /// Score every candidate head for `(?, relation, tail)`, best first.
    fn predict_heads(&self, relation: &str, tail: &str) -> Result<RankedList>;

    /// Short back-end name for logs and status.
    fn name(&self) -> &'static str;
}

/// Sort best-first with ascending-label tie-break. Non-finite scores sink
/// to the end.
pub(crate) fn sort_ranked(list: &mut RankedList) {
    list.sort_by(|a, b| {
        b.score
            .is_finite()
            .cmp(&a.score.is_finite())
            .then_with(|| b.score.total_cmp(&a.score))
            .then_with(|| a.label.cmp(&b.label))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_ranked_ties_by_label() {
        let mut list = vec![
            ScoredNode::new("recipe_9", 1.0),
            ScoredNode::new("recipe_2", 1.0),
            ScoredNode::new("recipe_5", 3.0),
        ];
        sort_ranked(&mut list);
        let labels: Vec<&str> = list.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["recipe_5", "recipe_2", "recipe_9"]);
    }

    #[test]
    fn test_sort_ranked_with_nan_scores() {
        let mut list: RankedList = (0..200)
            .map(|i| {
                let score = if i % 3 == 0 { f64::NAN } else { i as f64 };
                ScoredNode::new(format!("recipe_{}", i), score)
            })
            .collect();
        sort_ranked(&mut list);

        assert_eq!(list[0].label, "recipe_199");
        assert_eq!(list[1].label, "recipe_197");
        let first_nan = list.iter().position(|n| n.score.is_nan()).unwrap();
        assert_eq!(first_nan, 200 - 67);
        assert!(list[first_nan..].iter().all(|n| n.score.is_nan()));
    }
}
