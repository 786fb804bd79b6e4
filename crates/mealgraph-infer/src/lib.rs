//! MealGraph Infer — scoring oracle contract, back-ends, and lifecycle.
//!
//! The oracle scores candidate head nodes for a `(?, relation, tail)` query.
//! Back-ends are chosen at load time:
//! - `EmbeddingOracle` when an exported embedding table is present
//! - `ObservedEdgeOracle` otherwise
//!
//! `OracleManager` owns the loaded handle and guarantees at most one load
//! in flight.

pub mod embedding;
pub mod handle;
pub mod manager;
pub mod observed;
pub mod oracle;
pub mod vocabulary;

pub use embedding::{EmbeddingOracle, ScoringModel};
pub use handle::{load_oracle, OracleHandle};
pub use manager::{LoadPhase, OracleManager, OracleStatus};
pub use observed::ObservedEdgeOracle;
pub use oracle::{RankedList, ScoredNode, ScoringOracle};
pub use vocabulary::Vocabulary;
