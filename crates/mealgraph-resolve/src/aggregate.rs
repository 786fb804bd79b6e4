//! Multi-criteria aggregation: normalize, weight, merge, rank.
//!
//! Each criterion yields one oracle answer. Answers are min-max normalized,
//! scaled by the criterion weight and folded in criterion order:
//! - `And`: inner join on node label, scores summed
//! - `Or`: outer join, absent rows count as 0, scores summed
//!
//! Only recipe nodes with a finite score survive into the final ranking.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use mealgraph_core::{Error, Result};
use mealgraph_graph::GraphNode;
use mealgraph_infer::{RankedList, ScoringOracle};

use crate::criteria::Criterion;

/// How per-criterion answers are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeMode {
    /// Recipe must appear in every answer.
    #[default]
    And,
    /// Recipe may appear in any answer.
    Or,
}

impl MergeMode {
    pub fn from_flexible(flexible: bool) -> Self {
        if flexible {
            Self::Or
        } else {
            Self::And
        }
    }
}

/// Min-max normalize scores into `[0, 1]`. When every score is equal
/// (including a single row) all become 0. Non-finite scores take no part in
/// the range and normalize to 0.
pub fn normalize_scores(scores: &[f64]) -> Vec<f64> {
    let (min, max) = scores
        .iter()
        .filter(|s| s.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &s| {
            (lo.min(s), hi.max(s))
        });
    let range = max - min;
    scores
        .iter()
        .map(|&s| {
            if s.is_finite() && range > 0.0 {
                (s - min) / range
            } else {
                0.0
            }
        })
        .collect()
}

/// Normalize and weight one oracle answer. Rows with a non-finite raw score
/// are dropped; a label repeated within the answer keeps its first row.
pub fn weigh(list: &RankedList, weight: f64) -> HashMap<String, f64> {
    let rows: Vec<_> = list.iter().filter(|n| n.score.is_finite()).collect();
    if rows.len() < list.len() {
        debug!("Dropped {} non-finite scores", list.len() - rows.len());
    }
    let raw: Vec<f64> = rows.iter().map(|n| n.score).collect();
    let normalized = normalize_scores(&raw);

    let mut seen = HashSet::with_capacity(rows.len());
    let mut weighted = HashMap::with_capacity(rows.len());
    for (node, score) in rows.into_iter().zip(normalized) {
        if seen.insert(node.label.as_str()) {
            weighted.insert(node.label.clone(), score * weight);
        }
    }
    weighted
}

/// Query the oracle for one criterion and weigh the answer.
pub fn score_criterion(
    oracle: &dyn ScoringOracle,
    criterion: &Criterion,
) -> Result<HashMap<String, f64>> {
    let list = oracle.predict_heads(criterion.relation.as_str(), &criterion.tail)?;
    debug!(
        "Criterion ({}, {}) returned {} rows",
        criterion.relation,
        criterion.tail,
        list.len()
    );
    Ok(weigh(&list, criterion.weight))
}

/// A ranked recipe with its merged score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecipe {
    pub id: i64,
    pub label: String,
    pub score: f64,
}

/// Running merge of weighted answers.
#[derive(Debug)]
pub struct MergeAccumulator {
    mode: MergeMode,
    merged: Option<HashMap<String, f64>>,
    folded: usize,
}

impl MergeAccumulator {
    pub fn new(mode: MergeMode) -> Self {
        Self {
            mode,
            merged: None,
            folded: 0,
        }
    }

    /// Merge the next weighted answer. The answer is consumed.
    pub fn fold(&mut self, weighted: HashMap<String, f64>) {
        self.folded += 1;
        let Some(merged) = self.merged.as_mut() else {
            self.merged = Some(weighted);
            return;
        };
        match self.mode {
            MergeMode::And => {
                merged.retain(|label, score| match weighted.get(label) {
                    Some(s) => {
                        *score += s;
                        true
                    }
                    None => false,
                });
            }
            MergeMode::Or => {
                for (label, s) in weighted {
                    *merged.entry(label).or_insert(0.0) += s;
                }
            }
        }
    }

    /// Number of answers folded so far.
    pub fn folded(&self) -> usize {
        self.folded
    }

    /// Recipe rows, best first, ties by ascending label. Rows whose merged
    /// score is not finite are dropped.
    pub fn into_scored(self) -> Vec<ScoredRecipe> {
        let mut scored: Vec<ScoredRecipe> = self
            .merged
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, score)| score.is_finite())
            .filter_map(|(label, score)| {
                let id = GraphNode::decode(&label).ok()?.recipe_id()?;
                Some(ScoredRecipe { id, label, score })
            })
            .collect();
        scored.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then_with(|| a.label.cmp(&b.label))
        });
        scored
    }

    /// Top `top_k` recipe ids as strings.
    pub fn finish(self, top_k: usize) -> Vec<String> {
        let mut scored = self.into_scored();
        scored.truncate(top_k);
        scored.into_iter().map(|r| r.id.to_string()).collect()
    }
}

/// Runs criteria against an oracle and merges the answers.
#[derive(Debug, Clone)]
pub struct CriteriaAggregator {
    fan_out: usize,
}

impl CriteriaAggregator {
    /// `fan_out` bounds concurrent oracle calls per request (minimum 1).
    pub fn new(fan_out: usize) -> Self {
        Self {
            fan_out: fan_out.max(1),
        }
    }

    pub fn fan_out(&self) -> usize {
        self.fan_out
    }

    /// Rank with oracle calls on the blocking pool, at most `fan_out` in
    /// flight. Answers are folded in criterion order. Returns
    /// `Error::Cancelled` once `cancel` fires; criteria not yet started are
    /// never run.
    pub async fn rank_concurrent(
        &self,
        oracle: Arc<dyn ScoringOracle>,
        criteria: Vec<Criterion>,
        top_k: usize,
        mode: MergeMode,
        cancel: CancellationToken,
    ) -> Result<Vec<String>> {
        let total = criteria.len();
        let calls = criteria.into_iter().map(|criterion| {
            let oracle = oracle.clone();
            let cancel = cancel.clone();
            async move {
                if cancel.is_cancelled() {
                    return (criterion, Err(Error::Cancelled));
                }
                let query = criterion.clone();
                let joined =
                    tokio::task::spawn_blocking(move || score_criterion(oracle.as_ref(), &query))
                        .await;
                let outcome = match joined {
                    Ok(result) => result,
                    Err(e) => Err(Error::Internal(format!("criterion task failed: {}", e))),
                };
                (criterion, outcome)
            }
        });
        let mut answers = futures::stream::iter(calls).buffered(self.fan_out);

        let mut acc = MergeAccumulator::new(mode);
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                next = answers.next() => next,
            };
            let Some((criterion, outcome)) = next else {
                break;
            };
            match outcome {
                Ok(weighted) => acc.fold(weighted),
                Err(Error::Cancelled) => return Err(Error::Cancelled),
                Err(e) => log_skipped(&criterion, &e),
            }
        }

        log_outcome(acc.folded(), total, mode);
        Ok(acc.finish(top_k))
    }
}

impl Default for CriteriaAggregator {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Oracle misses for one value are expected; anything else is worth an error.
fn log_skipped(criterion: &Criterion, err: &Error) {
    if err.is_recoverable() {
        warn!(
            "Skipping criterion ({}, {}): {}",
            criterion.relation, criterion.tail, err
        );
    } else {
        error!(
            "Skipping criterion ({}, {}) after failure: {}",
            criterion.relation, criterion.tail, err
        );
    }
}

fn log_outcome(folded: usize, total: usize, mode: MergeMode) {
    if folded == 0 && total > 0 {
        warn!("No criterion produced a usable answer ({} attempted)", total);
    } else {
        info!("Merged {}/{} criteria ({:?})", folded, total, mode);
    }
}
