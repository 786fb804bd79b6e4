//! Embedding-table oracle.
//!
//! Consumes an exported table of entity and relation vectors:
//!
//! ```json
//! { "model": "transe", "entities": { "recipe_1": [..] }, "relations": { "hasDietType": [..] } }
//! ```
//!
//! Rows are aligned with the triple vocabulary at load time; every
//! vocabulary label must have a vector.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use ndarray::{Array1, Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::info;

use mealgraph_core::{Error, Result};

use crate::oracle::{sort_ranked, RankedList, ScoredNode, ScoringOracle};
use crate::vocabulary::Vocabulary;

/// Interaction function the table was trained with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringModel {
    /// `-‖h + r - t‖₂`
    TransE,
    /// `Σ h ⊙ r ⊙ t`
    DistMult,
}

#[derive(Debug, Deserialize)]
struct EmbeddingTable {
    model: ScoringModel,
    entities: HashMap<String, Vec<f32>>,
    relations: HashMap<String, Vec<f32>>,
}

pub struct EmbeddingOracle {
    model: ScoringModel,
    vocabulary: Arc<Vocabulary>,
    /// One row per vocabulary entity.
    entities: Array2<f32>,
    /// One row per vocabulary relation.
    relations: Array2<f32>,
}

impl EmbeddingOracle {
    /// Load an exported embedding table and align it with `vocabulary`.
    pub fn load(path: &Path, vocabulary: Arc<Vocabulary>) -> Result<Self> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| Error::OracleLoad(format!("{}: {}", path.display(), e)))?;
        let table: EmbeddingTable = serde_json::from_str(&data)
            .map_err(|e| Error::OracleLoad(format!("{}: {}", path.display(), e)))?;
        let oracle = Self::from_table(table, vocabulary)?;
        info!(
            "Embedding oracle loaded: model={:?}, entities={}, dim={}, path={}",
            oracle.model,
            oracle.entities.nrows(),
            oracle.dimension(),
            path.display()
        );
        Ok(oracle)
    }

    /// Build from in-memory vectors.
    pub fn from_vectors(
        model: ScoringModel,
        entities: HashMap<String, Vec<f32>>,
        relations: HashMap<String, Vec<f32>>,
        vocabulary: Arc<Vocabulary>,
    ) -> Result<Self> {
        Self::from_table(
            EmbeddingTable {
                model,
                entities,
                relations,
            },
            vocabulary,
        )
    }

    fn from_table(table: EmbeddingTable, vocabulary: Arc<Vocabulary>) -> Result<Self> {
        let dim = table
            .entities
            .values()
            .next()
            .map(Vec::len)
            .filter(|d| *d > 0)
            .ok_or_else(|| Error::OracleLoad("embedding table has no entity vectors".into()))?;

        let entities = align(&table.entities, vocabulary.entities(), dim, "entity")?;
        let relations = align(&table.relations, vocabulary.relations(), dim, "relation")?;

        Ok(Self {
            model: table.model,
            vocabulary,
            entities,
            relations,
        })
    }

    pub fn dimension(&self) -> usize {
        self.entities.ncols()
    }

    pub fn model(&self) -> ScoringModel {
        self.model
    }

    fn score_all(&self, r: ArrayView1<f32>, t: ArrayView1<f32>) -> Array1<f32> {
        match self.model {
            ScoringModel::TransE => {
                // h + r - t = h - (t - r)
                let target = &t - &r;
                self.entities
                    .outer_iter()
                    .map(|h| {
                        let diff = &h - &target;
                        -diff.dot(&diff).sqrt()
                    })
                    .collect()
            }
            ScoringModel::DistMult => {
                let query = &r * &t;
                self.entities.dot(&query)
            }
        }
    }
}

/// Stack vectors into rows ordered like `labels`.
fn align(
    vectors: &HashMap<String, Vec<f32>>,
    labels: &[String],
    dim: usize,
    what: &str,
) -> Result<Array2<f32>> {
    let mut flat = Vec::with_capacity(labels.len() * dim);
    for label in labels {
        let v = vectors
            .get(label)
            .ok_or_else(|| Error::OracleLoad(format!("no vector for {} '{}'", what, label)))?;
        if v.len() != dim {
            return Err(Error::OracleLoad(format!(
                "{} '{}' has dimension {}, expected {}",
                what,
                label,
                v.len(),
                dim
            )));
        }
        flat.extend_from_slice(v);
    }
    Array2::from_shape_vec((labels.len(), dim), flat)
        .map_err(|e| Error::OracleLoad(e.to_string()))
}

impl ScoringOracle for EmbeddingOracle {
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

        let scores = self.score_all(self.relations.row(r), self.entities.row(t));
        let mut list: RankedList = self
            .vocabulary
            .entities()
            .iter()
            .zip(scores.iter())
            .filter(|(_, s)| s.is_finite())
            .map(|(label, &s)| ScoredNode::new(label.as_str(), f64::from(s)))
            .collect();
        sort_ranked(&mut list);
        Ok(list)
    }

    fn name(&self) -> &'static str {
        "embedding"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mealgraph_graph::Triple;

    fn vocab() -> Arc<Vocabulary> {
        Arc::new(Vocabulary::from_triples(&[
            Triple::new("recipe_1", "hasDietType", "diet_type_Vegan"),
            Triple::new("recipe_2", "hasDietType", "diet_type_Vegan"),
        ]))
    }

    fn vectors(pairs: &[(&str, [f32; 2])]) -> HashMap<String, Vec<f32>> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_vec()))
            .collect()
    }

    #[test]
    fn test_transe_prefers_translated_head() {
        // recipe_1 + r lands exactly on the tail; recipe_2 is half a unit away.
        let oracle = EmbeddingOracle::from_vectors(
            ScoringModel::TransE,
            vectors(&[
                ("recipe_1", [0.0, 0.0]),
                ("recipe_2", [0.5, 0.0]),
                ("diet_type_Vegan", [0.0, 1.0]),
            ]),
            vectors(&[("hasDietType", [0.0, 1.0])]),
            vocab(),
        )
        .unwrap();

        let list = oracle.predict_heads("hasDietType", "diet_type_Vegan").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list[0].label, "recipe_1");
        assert_eq!(list[0].score, 0.0);
        assert_eq!(list[1].label, "recipe_2");
        assert!((list[1].score + 0.5).abs() < 1e-6);
        assert_eq!(list[2].label, "diet_type_Vegan");
    }

    #[test]
    fn test_distmult_scores() {
        let oracle = EmbeddingOracle::from_vectors(
            ScoringModel::DistMult,
            vectors(&[
                ("recipe_1", [1.0, 0.0]),
                ("recipe_2", [3.0, 0.0]),
                ("diet_type_Vegan", [1.0, 1.0]),
            ]),
            vectors(&[("hasDietType", [1.0, 1.0])]),
            vocab(),
        )
        .unwrap();

        let list = oracle.predict_heads("hasDietType", "diet_type_Vegan").unwrap();
        assert_eq!(list[0].label, "recipe_2");
        assert_eq!(list[0].score, 3.0);
        assert_eq!(list[1].label, "diet_type_Vegan");
        assert_eq!(list[1].score, 2.0);
        assert_eq!(list[2].label, "recipe_1");
    }

    #[test]
    fn test_missing_vector_fails_load() {
        let err = EmbeddingOracle::from_vectors(
            ScoringModel::TransE,
            vectors(&[("recipe_1", [0.0, 0.0])]),
            vectors(&[("hasDietType", [0.0, 1.0])]),
            vocab(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, Error::OracleLoad(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("embeddings.json");
        let table = serde_json::json!({
            "model": "transe",
            "entities": {
                "recipe_1": [0.0, 0.0],
                "recipe_2": [1.0, 0.0],
                "diet_type_Vegan": [0.0, 1.0],
                "ingredient_unused": [5.0, 5.0],
            },
            "relations": { "hasDietType": [0.0, 1.0] },
        });
        std::fs::write(&path, table.to_string()).unwrap();

        let oracle = EmbeddingOracle::load(&path, vocab()).unwrap();
        assert_eq!(oracle.dimension(), 2);
        assert_eq!(oracle.model(), ScoringModel::TransE);
        assert!(oracle.predict_heads("hasDietType", "recipe_9").is_err());
    }
}
