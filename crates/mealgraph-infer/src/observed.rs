//! Observed-edge oracle: scores a head 1.0 when the queried triple exists
//! in the exported graph and 0.0 otherwise.
//!
//! Used when no embedding table has been exported. Summed over criteria it
//! ranks recipes by how many requested attributes they carry.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use mealgraph_core::{Error, Result};
use mealgraph_graph::Triple;

use crate::oracle::{sort_ranked, RankedList, ScoredNode, ScoringOracle};
use crate::vocabulary::Vocabulary;

pub struct ObservedEdgeOracle {
    vocabulary: Arc<Vocabulary>,
    /// `(relation id, tail id)` → head ids.
    heads_by_query: HashMap<(usize, usize), HashSet<usize>>,
    /// Every entity seen as a head, ascending id.
    candidates: Vec<usize>,
}

impl ObservedEdgeOracle {
    pub fn new(vocabulary: Arc<Vocabulary>, triples: &[Triple]) -> Self {
        let mut heads_by_query: HashMap<(usize, usize), HashSet<usize>> = HashMap::new();
        let mut candidates = HashSet::new();
        for t in triples {
            let (Some(h), Some(r), Some(tail)) = (
                vocabulary.entity_id(&t.head),
                vocabulary.relation_id(&t.relation),
                vocabulary.entity_id(&t.tail),
            ) else {
                continue;
            };
            heads_by_query.entry((r, tail)).or_default().insert(h);
            candidates.insert(h);
        }
        let mut candidates: Vec<usize> = candidates.into_iter().collect();
        candidates.sort_unstable();
        Self {
            vocabulary,
            heads_by_query,
            candidates,
        }
    }
}

impl ScoringOracle for ObservedEdgeOracle {
    fn predict_heads(&self, relation: &str, tail: &str) -> Result<RankedList> {
        let fail = |reason: &str| Error::Prediction {
            relation: relation.to_string(),
            tail: tail.to_string(),
            reason: reason.to_string(),
        };
        let r = self
            .vocabulary
            .relation_id(relation)
            .ok_or_else(|| fail("unknown relation"))?;
        let t = self
            .vocabulary
            .entity_id(tail)
            .ok_or_else(|| fail("unknown entity"))?;

        let matched = self.heads_by_query.get(&(r, t));
        let mut list: RankedList = self
            .candidates
            .iter()
            .filter_map(|&h| {
                let label = self.vocabulary.entity(h)?;
                let hit = matched.is_some_and(|m| m.contains(&h));
                Some(ScoredNode::new(label, if hit { 1.0 } else { 0.0 }))
            })
            .collect();
        sort_ranked(&mut list);
        Ok(list)
    }

    fn name(&self) -> &'static str {
        "observed-edge"
    }
}
