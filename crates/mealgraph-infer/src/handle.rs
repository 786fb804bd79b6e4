//! Loaded oracle plus its vocabulary, and the loader that builds one from
//! exported artifacts.

use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use mealgraph_core::{Error, Result};
use mealgraph_graph::load_triples;

use crate::embedding::EmbeddingOracle;
use crate::observed::ObservedEdgeOracle;
use crate::oracle::{RankedList, ScoringOracle};
use crate::vocabulary::Vocabulary;

/// Immutable, shareable oracle state. Never mutated after construction.
pub struct OracleHandle {
    oracle: Box<dyn ScoringOracle>,
    vocabulary: Arc<Vocabulary>,
    loaded_at: DateTime<Utc>,
}

impl OracleHandle {
    pub fn new(oracle: Box<dyn ScoringOracle>, vocabulary: Arc<Vocabulary>) -> Self {
        Self {
            oracle,
            vocabulary,
            loaded_at: Utc::now(),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn backend(&self) -> &'static str {
        self.oracle.name()
    }

    pub fn loaded_at(&self) -> DateTime<Utc> {
        self.loaded_at
    }
}

impl ScoringOracle for OracleHandle {
    fn predict_heads(&self, relation: &str, tail: &str) -> Result<RankedList> {
        self.oracle.predict_heads(relation, tail)
    }

    fn name(&self) -> &'static str {
        self.oracle.name()
    }
}

/// Build the best available oracle from exported artifacts.
///
/// The triples export is required. If an embedding table exists it is
/// used; otherwise scoring falls back to observed edges.
pub fn load_oracle(triples_path: &Path, embeddings_path: &Path) -> Result<OracleHandle> {
    let triples = load_triples(triples_path).map_err(|e| {
        Error::OracleLoad(format!("triples {}: {}", triples_path.display(), e))
    })?;
    if triples.is_empty() {
        return Err(Error::OracleLoad(format!(
            "triples {} contains no rows",
            triples_path.display()
        )));
    }

    let vocabulary = Arc::new(Vocabulary::from_triples(&triples));
    info!(
        "Vocabulary built: {} entities, {} relations",
        vocabulary.num_entities(),
        vocabulary.num_relations()
    );

    let oracle: Box<dyn ScoringOracle> = if embeddings_path.exists() {
        Box::new(EmbeddingOracle::load(embeddings_path, vocabulary.clone())?)
    } else {
        warn!(
            "Embedding table {} not found. Falling back to observed-edge scoring.",
            embeddings_path.display()
        );
        Box::new(ObservedEdgeOracle::new(vocabulary.clone(), &triples))
    };

    Ok(OracleHandle::new(oracle, vocabulary))
}
