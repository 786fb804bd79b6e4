//! Recipe table ingestion, record projection and lookups.

pub mod catalog;
pub mod ingredients;

pub use catalog::{parse_recipe_id, RecipeCatalog};
pub use ingredients::rank_by_frequency;
