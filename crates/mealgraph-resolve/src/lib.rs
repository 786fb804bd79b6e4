//! Resolvers — turn user preferences into a ranked list of recipe ids.
//!
//! `criteria` maps a preference bundle to weighted `(relation, tail)`
//! queries; `aggregate` runs them against the scoring oracle and merges the
//! answers under AND/OR semantics.

pub mod aggregate;
pub mod criteria;

pub use aggregate::{
    normalize_scores, score_criterion, weigh, CriteriaAggregator, MergeAccumulator, MergeMode,
    ScoredRecipe,
};
pub use criteria::{map_preferences_to_criteria, Criterion, Preferences, WeightConfig};
