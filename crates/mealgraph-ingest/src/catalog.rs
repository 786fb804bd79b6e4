//! Recipe catalog: the parsed recipe table.
//!
//! Keeps every column of every row so recipe lookups can return the full
//! record, and projects the attribute columns into [`Record`]s for the
//! graph builder.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use tracing::{debug, info, warn};

use mealgraph_core::{Error, Result};
use mealgraph_graph::node::{is_placeholder, split_clean};
use mealgraph_graph::record::{
    Record, COL_COOKING_METHOD, COL_CUISINE_REGION, COL_DIET_TYPES, COL_HEALTHY_TYPE,
    COL_INGREDIENTS, COL_MEAL_TYPE, COL_RECIPE_ID, REQUIRED_COLUMNS,
};

use crate::ingredients::rank_by_frequency;

/// Parse a recipe id. Accepts integers and zero-fraction floats (`123.0`).
pub fn parse_recipe_id(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(id) = trimmed.parse::<i64>() {
        return Some(id);
    }
    let value = trimmed.parse::<f64>().ok()?;
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

/// In-memory recipe table.
pub struct RecipeCatalog {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    by_id: HashMap<i64, usize>,
}

impl RecipeCatalog {
    /// Catalog with no columns and no rows.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            by_id: HashMap::new(),
        }
    }

    /// Load the recipe table from a CSV file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading recipes from {}", path.display());
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(std::io::BufReader::new(file))?;
        info!(
            "Loaded {} recipes with {} attributes",
            catalog.len(),
            catalog.columns.len()
        );
        Ok(catalog)
    }

    /// Parse a recipe table from any CSV reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut input = csv::ReaderBuilder::new()
            .flexible(true)
            .from_reader(reader);

        let columns: Vec<String> = input
            .headers()
            .map_err(|e| Error::Csv(e.to_string()))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for (row_idx, result) in input.records().enumerate() {
            match result {
                Ok(record) => {
                    let mut row: Vec<String> = record.iter().map(str::to_string).collect();
                    row.resize(columns.len(), String::new());
                    rows.push(row);
                }
                Err(e) => {
                    let err = Error::UnparsableRecord {
                        row: row_idx + 1,
                        reason: e.to_string(),
                    };
                    warn!("Skipping row: {}", err);
                }
            }
        }

        let mut catalog = Self {
            columns,
            rows,
            by_id: HashMap::new(),
        };
        catalog.index_ids();
        Ok(catalog)
    }

    fn index_ids(&mut self) {
        let Some(id_col) = self.column(COL_RECIPE_ID) else {
            warn!("'{}' column not found; recipe lookup disabled", COL_RECIPE_ID);
            return;
        };
        for (idx, row) in self.rows.iter().enumerate() {
            if let Some(id) = parse_recipe_id(&row[id_col]) {
                // First occurrence wins
                self.by_id.entry(id).or_insert(idx);
            }
        }
    }

    fn column(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Project the attribute columns into records.
    ///
    /// Fails with `MissingDataColumn` if any required column is absent.
    /// Rows whose id cannot be parsed, and repeated ids, are skipped.
    pub fn records(&self) -> Result<Vec<Record>> {
        let missing: Vec<String> = REQUIRED_COLUMNS
            .iter()
            .filter(|c| self.column(c).is_none())
            .map(|c| c.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(Error::MissingDataColumn(missing));
        }

        let col = |name: &str| self.column(name).unwrap_or_default();
        let id_col = col(COL_RECIPE_ID);
        let cooking_col = col(COL_COOKING_METHOD);
        let diet_col = col(COL_DIET_TYPES);
        let meal_col = col(COL_MEAL_TYPE);
        let health_col = col(COL_HEALTHY_TYPE);
        let cuisine_col = col(COL_CUISINE_REGION);
        let ingredient_col = col(COL_INGREDIENTS);

        let mut seen = std::collections::HashSet::new();
        let mut records = Vec::with_capacity(self.rows.len());
        let mut skipped = 0usize;

        for (row_idx, row) in self.rows.iter().enumerate() {
            let Some(id) = parse_recipe_id(&row[id_col]) else {
                let err = Error::UnparsableRecord {
                    row: row_idx + 1,
                    reason: format!("invalid {} '{}'", COL_RECIPE_ID, row[id_col]),
                };
                warn!("Skipping record: {}", err);
                skipped += 1;
                continue;
            };
            if !seen.insert(id) {
                debug!("Duplicate recipe id {} at row {}", id, row_idx + 1);
                skipped += 1;
                continue;
            }
            records.push(Record {
                id,
                cooking_method: Record::field(Some(&row[cooking_col])),
                diet_types: Record::field(Some(&row[diet_col])),
                meal_type: Record::field(Some(&row[meal_col])),
                health_type: Record::field(Some(&row[health_col])),
                cuisine_region: Record::field(Some(&row[cuisine_col])),
                ingredient_names: Record::field(Some(&row[ingredient_col])),
            });
        }

        if skipped > 0 {
            warn!("Skipped {} of {} recipe rows", skipped, self.rows.len());
        }
        Ok(records)
    }

    /// Full row for a recipe id given as text.
    ///
    /// Malformed and unknown ids both yield `RecipeNotFound`.
    pub fn recipe(&self, raw_id: &str) -> Result<serde_json::Map<String, serde_json::Value>> {
        let idx = raw_id
            .trim()
            .parse::<i64>()
            .ok()
            .and_then(|id| self.by_id.get(&id).copied())
            .ok_or_else(|| Error::RecipeNotFound(raw_id.to_string()))?;

        let row = &self.rows[idx];
        Ok(self
            .columns
            .iter()
            .zip(row.iter())
            .map(|(name, cell)| (name.clone(), cell_value(cell)))
            .collect())
    }

    /// Distinct ingredient names by descending frequency, ties alphabetical.
    pub fn unique_ingredients(&self) -> Vec<String> {
        let Some(col) = self.column(COL_INGREDIENTS) else {
            warn!("'{}' column not found", COL_INGREDIENTS);
            return Vec::new();
        };
        let names = self
            .rows
            .iter()
            .filter(|row| !is_placeholder(&row[col]))
            .flat_map(|row| split_clean(&row[col], ';'));
        let ranked = rank_by_frequency(names);
        info!("{} unique ingredients found", ranked.len());
        ranked
    }
}

/// Typed JSON value for a raw cell: blanks and NaN become null, numbers
/// become numbers.
fn cell_value(cell: &str) -> serde_json::Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
        return serde_json::Value::Null;
    }
    if let Ok(i) = trimmed.parse::<i64>() {
        return serde_json::Value::from(i);
    }
    if let Ok(f) = trimmed.parse::<f64>() {
        if let Some(n) = serde_json::Number::from_f64(f) {
            return serde_json::Value::Number(n);
        }
    }
    serde_json::Value::String(cell.to_string())
}
