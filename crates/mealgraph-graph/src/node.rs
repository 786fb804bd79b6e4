//! Graph node model and the `type_value` label codec.
//!
//! Every node serializes to `"{type}_{value}"` (e.g. `ingredient_tomato`,
//! `meal_type_dinner`, `recipe_42`). The same labels make up the oracle's
//! vocabulary, so the graph builder and the criteria mapper both construct
//! nodes through the normalizing constructors here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use mealgraph_core::{Error, Result};

/// Values that mean "no value" in the recipe table.
const PLACEHOLDERS: [&str; 2] = ["unknown", "nan"];

/// Whether a raw attribute value is semantically absent.
pub fn is_placeholder(raw: &str) -> bool {
    let trimmed = raw.trim();
    trimmed.is_empty() || PLACEHOLDERS.iter().any(|p| trimmed.eq_ignore_ascii_case(p))
}

/// Split a delimited list, dropping blanks and placeholders.
pub fn split_clean(raw: &str, delimiter: char) -> Vec<&str> {
    raw.split(delimiter)
        .map(str::trim)
        .filter(|part| !is_placeholder(part))
        .collect()
}

/// Node type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Recipe,
    CookingMethod,
    CuisineRegion,
    DietType,
    MealType,
    HealthAttribute,
    Ingredient,
}

impl NodeKind {
    pub const ALL: [NodeKind; 7] = [
        Self::Recipe,
        Self::CookingMethod,
        Self::CuisineRegion,
        Self::DietType,
        Self::MealType,
        Self::HealthAttribute,
        Self::Ingredient,
    ];

    /// Label prefix for this kind.
    pub fn tag(self) -> &'static str {
        match self {
            Self::Recipe => "recipe",
            Self::CookingMethod => "cooking_method",
            Self::CuisineRegion => "cuisine_region",
            Self::DietType => "diet_type",
            Self::MealType => "meal_type",
            Self::HealthAttribute => "health_attribute",
            Self::Ingredient => "ingredient",
        }
    }

    /// Whether values of this kind are lower-cased on construction.
    fn folds_case(self) -> bool {
        matches!(self, Self::CookingMethod | Self::Ingredient)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A node in the recipe knowledge graph.
///
/// Identity is `(kind, normalized value)`; derive-based equality and hashing
/// give canonical deduplication for free.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GraphNode {
    Recipe(i64),
    CookingMethod(String),
    CuisineRegion(String),
    DietType(String),
    MealType(String),
    HealthAttribute(String),
    Ingredient(String),
}

impl GraphNode {
    pub fn recipe(id: i64) -> Self {
        Self::Recipe(id)
    }

    /// Build an attribute node from a raw value. Returns `None` for
    /// placeholders and for `NodeKind::Recipe` (use [`GraphNode::recipe`]).
    pub fn attribute(kind: NodeKind, raw: &str) -> Option<Self> {
        if is_placeholder(raw) {
            return None;
        }
        let trimmed = raw.trim();
        let value = if kind.folds_case() {
            trimmed.to_lowercase()
        } else {
            trimmed.to_string()
        };
        match kind {
            NodeKind::Recipe => None,
            NodeKind::CookingMethod => Some(Self::CookingMethod(value)),
            NodeKind::CuisineRegion => Some(Self::CuisineRegion(value)),
            NodeKind::DietType => Some(Self::DietType(value)),
            NodeKind::MealType => Some(Self::MealType(value)),
            NodeKind::HealthAttribute => Some(Self::HealthAttribute(value)),
            NodeKind::Ingredient => Some(Self::Ingredient(value)),
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Recipe(_) => NodeKind::Recipe,
            Self::CookingMethod(_) => NodeKind::CookingMethod,
            Self::CuisineRegion(_) => NodeKind::CuisineRegion,
            Self::DietType(_) => NodeKind::DietType,
            Self::MealType(_) => NodeKind::MealType,
            Self::HealthAttribute(_) => NodeKind::HealthAttribute,
            Self::Ingredient(_) => NodeKind::Ingredient,
        }
    }

    /// Normalized value without the type prefix.
    pub fn value(&self) -> String {
        match self {
            Self::Recipe(id) => id.to_string(),
            Self::CookingMethod(v)
            | Self::CuisineRegion(v)
            | Self::DietType(v)
            | Self::MealType(v)
            | Self::HealthAttribute(v)
            | Self::Ingredient(v) => v.clone(),
        }
    }

    pub fn recipe_id(&self) -> Option<i64> {
        match self {
            Self::Recipe(id) => Some(*id),
            _ => None,
        }
    }

    /// Encode to the `type_value` label.
    pub fn label(&self) -> String {
        format!("{}_{}", self.kind().tag(), self.value())
    }

    /// Decode a `type_value` label back into a node.
    pub fn decode(label: &str) -> Result<Self> {
        for kind in NodeKind::ALL {
            let Some(value) = label
                .strip_prefix(kind.tag())
                .and_then(|rest| rest.strip_prefix('_'))
            else {
                continue;
            };
            if kind == NodeKind::Recipe {
                return value
                    .trim()
                    .parse::<i64>()
                    .map(Self::Recipe)
                    .map_err(|_| Error::InvalidLabel(label.to_string()));
            }
            return Self::attribute(kind, value)
                .ok_or_else(|| Error::InvalidLabel(label.to_string()));
        }
        Err(Error::InvalidLabel(label.to_string()))
    }
}

impl fmt::Display for GraphNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.kind().tag(), self.value())
    }
}

impl FromStr for GraphNode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
