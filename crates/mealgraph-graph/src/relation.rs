//! Relation names used on graph edges and oracle queries.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Edge relation between a recipe and one of its attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Relation {
    #[serde(rename = "usesCookingMethod")]
    UsesCookingMethod,
    #[serde(rename = "hasCuisineRegion")]
    HasCuisineRegion,
    #[serde(rename = "hasDietType")]
    HasDietType,
    #[serde(rename = "isForMealType")]
    IsForMealType,
    #[serde(rename = "containsIngredient")]
    ContainsIngredient,
    HasProteinLevel,
    HasCarbLevel,
    HasFatLevel,
    HasSaturatedFatLevel,
    HasCalorieLevel,
    HasSodiumLevel,
    HasSugarLevel,
    HasFiberLevel,
    HasCholesterolLevel,
    HasHealthAttribute,
}

impl Relation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UsesCookingMethod => "usesCookingMethod",
            Self::HasCuisineRegion => "hasCuisineRegion",
            Self::HasDietType => "hasDietType",
            Self::IsForMealType => "isForMealType",
            Self::ContainsIngredient => "containsIngredient",
            Self::HasProteinLevel => "HasProteinLevel",
            Self::HasCarbLevel => "HasCarbLevel",
            Self::HasFatLevel => "HasFatLevel",
            Self::HasSaturatedFatLevel => "HasSaturatedFatLevel",
            Self::HasCalorieLevel => "HasCalorieLevel",
            Self::HasSodiumLevel => "HasSodiumLevel",
            Self::HasSugarLevel => "HasSugarLevel",
            Self::HasFiberLevel => "HasFiberLevel",
            Self::HasCholesterolLevel => "HasCholesterolLevel",
            Self::HasHealthAttribute => "HasHealthAttribute",
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
