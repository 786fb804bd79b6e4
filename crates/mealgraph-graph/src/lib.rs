//! Recipe knowledge graph: node model, label codec, builder, triples.
//!
//! Records become a petgraph `DiGraph` whose nodes are deduplicated by
//! `(type, normalized value)`. Each edge is also flattened into a
//! `type_value` triple, which is the vocabulary the scoring oracle is
//! trained and queried against.

pub mod builder;
pub mod health;
pub mod node;
pub mod record;
pub mod relation;
pub mod triples;

pub use builder::{GraphBuilder, GraphExport, GraphStats, RecipeGraph};
pub use health::map_health_attribute;
pub use node::{is_placeholder, split_clean, GraphNode, NodeKind};
pub use record::{Record, REQUIRED_COLUMNS};
pub use relation::Relation;
pub use triples::{load_triples, read_triples, save_triples, write_triples, Triple};
