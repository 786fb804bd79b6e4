//! Shared application state.

use std::sync::Arc;

use mealgraph_core::{Error, MealGraphConfig, Result};
use mealgraph_infer::{OracleHandle, OracleManager};
use mealgraph_ingest::RecipeCatalog;
use mealgraph_resolve::CriteriaAggregator;

/// Shared application state accessible from all route handlers.
pub struct AppState {
    pub config: MealGraphConfig,
    pub catalog: RecipeCatalog,
    /// Distinct ingredient names, computed once at startup.
    pub ingredients: Vec<String>,
    pub oracle: Arc<OracleManager>,
    pub aggregator: CriteriaAggregator,
}

impl AppState {
    pub fn new(config: MealGraphConfig, catalog: RecipeCatalog, oracle: OracleManager) -> Self {
        let ingredients = catalog.unique_ingredients();
        let aggregator = CriteriaAggregator::new(config.fan_out);
        Self {
            config,
            catalog,
            ingredients,
            oracle: Arc::new(oracle),
            aggregator,
        }
    }

    /// Get the oracle, loading it on the blocking pool if needed.
    pub async fn oracle_handle(&self) -> Result<Arc<OracleHandle>> {
        if let Some(handle) = self.oracle.current() {
            return Ok(handle);
        }
        let manager = self.oracle.clone();
        tokio::task::spawn_blocking(move || manager.get())
            .await
            .map_err(|e| Error::Internal(format!("oracle load task failed: {}", e)))?
    }

    /// Administrative reload on the blocking pool.
    pub async fn reload_oracle(&self) -> Result<Arc<OracleHandle>> {
        let manager = self.oracle.clone();
        tokio::task::spawn_blocking(move || manager.reload())
            .await
            .map_err(|e| Error::Internal(format!("oracle reload task failed: {}", e)))?
    }
}
