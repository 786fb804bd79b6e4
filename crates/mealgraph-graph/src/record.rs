//! Attributed recipe records, the input of the graph builder.

use serde::{Deserialize, Serialize};

use crate::node::is_placeholder;

pub const COL_RECIPE_ID: &str = "RecipeId";
pub const COL_COOKING_METHOD: &str = "Cooking_Method";
pub const COL_DIET_TYPES: &str = "Diet_Types";
pub const COL_MEAL_TYPE: &str = "meal_type";
pub const COL_HEALTHY_TYPE: &str = "Healthy_Type";
pub const COL_CUISINE_REGION: &str = "CuisineRegion";
pub const COL_INGREDIENTS: &str = "BestUsdaIngredientName";

/// Columns every recipe table must carry.
pub const REQUIRED_COLUMNS: [&str; 7] = [
    COL_RECIPE_ID,
    COL_COOKING_METHOD,
    COL_DIET_TYPES,
    COL_MEAL_TYPE,
    COL_HEALTHY_TYPE,
    COL_CUISINE_REGION,
    COL_INGREDIENTS,
];

/// Immutable recipe attributes. List-valued fields keep their raw delimited
/// text; the builder splits them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    pub cooking_method: Option<String>,
    /// Comma-delimited.
    pub diet_types: Option<String>,
    /// Comma-delimited.
    pub meal_type: Option<String>,
    /// Comma-delimited.
    pub health_type: Option<String>,
    pub cuisine_region: Option<String>,
    /// Semicolon-delimited.
    pub ingredient_names: Option<String>,
}

impl Record {
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Normalize a raw cell: placeholders become `None`.
    pub fn field(raw: Option<&str>) -> Option<String> {
        raw.filter(|v| !is_placeholder(v)).map(|v| v.trim().to_string())
    }

    pub fn with_cooking_method(mut self, v: &str) -> Self {
        self.cooking_method = Self::field(Some(v));
        self
    }

    pub fn with_diet_types(mut self, v: &str) -> Self {
        self.diet_types = Self::field(Some(v));
        self
    }

    pub fn with_meal_type(mut self, v: &str) -> Self {
        self.meal_type = Self::field(Some(v));
        self
    }

    pub fn with_health_type(mut self, v: &str) -> Self {
        self.health_type = Self::field(Some(v));
        self
    }

    pub fn with_cuisine_region(mut self, v: &str) -> Self {
        self.cuisine_region = Self::field(Some(v));
        self
    }

    pub fn with_ingredients(mut self, v: &str) -> Self {
        self.ingredient_names = Self::field(Some(v));
        self
    }
}
