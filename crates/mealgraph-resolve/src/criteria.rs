//! Preference bundle → ordered scoring criteria.

use serde::{Deserialize, Serialize};

use mealgraph_core::{Error, Result};
use mealgraph_graph::{map_health_attribute, GraphNode, NodeKind, Relation};

fn default_weight() -> f64 {
    1.0
}

/// Per-category criterion weights. Unknown keys are ignored on input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightConfig {
    #[serde(default = "default_weight")]
    pub cooking_method: f64,
    #[serde(default = "default_weight")]
    pub cuisine_region: f64,
    #[serde(default = "default_weight")]
    pub diet_types: f64,
    #[serde(default = "default_weight")]
    pub meal_type: f64,
    #[serde(default = "default_weight")]
    pub ingredients: f64,
    #[serde(default = "default_weight")]
    pub healthy_type: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            cooking_method: 1.0,
            cuisine_region: 1.0,
            diet_types: 1.0,
            meal_type: 1.0,
            ingredients: 1.0,
            healthy_type: 1.0,
        }
    }
}

impl WeightConfig {
    /// Reject negative or non-finite weights.
    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("cooking_method", self.cooking_method),
            ("cuisine_region", self.cuisine_region),
            ("diet_types", self.diet_types),
            ("meal_type", self.meal_type),
            ("ingredients", self.ingredients),
            ("healthy_type", self.healthy_type),
        ];
        for (name, w) in weights {
            if !w.is_finite() || w < 0.0 {
                return Err(Error::InvalidRequest(format!(
                    "weight '{}' must be a finite number >= 0, got {}",
                    name, w
                )));
            }
        }
        Ok(())
    }
}

/// What the user asked for.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    #[serde(default)]
    pub cooking_method: Option<String>,
    #[serde(default)]
    pub diet_types: Vec<String>,
    #[serde(default)]
    pub meal_type: Vec<String>,
    #[serde(default)]
    pub health_types: Vec<String>,
    #[serde(default)]
    pub cuisine_region: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<String>,
}

impl Preferences {
    /// True when no field carries a usable value.
    pub fn is_empty(&self) -> bool {
        map_preferences_to_criteria(self, &WeightConfig::default()).is_empty()
    }
}

/// One `(?, relation, tail)` query with its weight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Criterion {
    /// `type_value` label of the attribute node.
    pub tail: String,
    pub relation: Relation,
    pub weight: f64,
}

impl Criterion {
    fn new(node: GraphNode, relation: Relation, weight: f64) -> Self {
        Self {
            tail: node.label(),
            relation,
            weight,
        }
    }
}

/// Build criteria in the fixed order cooking method, diet types, meal
/// types, health types, cuisine region, ingredients. Blank and placeholder
/// values are skipped.
pub fn map_preferences_to_criteria(prefs: &Preferences, weights: &WeightConfig) -> Vec<Criterion> {
    let mut criteria = Vec::new();

    if let Some(node) = prefs
        .cooking_method
        .as_deref()
        .and_then(|v| GraphNode::attribute(NodeKind::CookingMethod, v))
    {
        criteria.push(Criterion::new(
            node,
            Relation::UsesCookingMethod,
            weights.cooking_method,
        ));
    }

    for v in &prefs.diet_types {
        if let Some(node) = GraphNode::attribute(NodeKind::DietType, v) {
            criteria.push(Criterion::new(node, Relation::HasDietType, weights.diet_types));
        }
    }

    for v in &prefs.meal_type {
        if let Some(node) = GraphNode::attribute(NodeKind::MealType, v) {
            criteria.push(Criterion::new(node, Relation::IsForMealType, weights.meal_type));
        }
    }

    for v in &prefs.health_types {
        if let Some(node) = GraphNode::attribute(NodeKind::HealthAttribute, v) {
            let relation = map_health_attribute(v);
            criteria.push(Criterion::new(node, relation, weights.healthy_type));
        }
    }

    if let Some(node) = prefs
        .cuisine_region
        .as_deref()
        .and_then(|v| GraphNode::attribute(NodeKind::CuisineRegion, v))
    {
        criteria.push(Criterion::new(
            node,
            Relation::HasCuisineRegion,
            weights.cuisine_region,
        ));
    }

    for v in &prefs.ingredients {
        if let Some(node) = GraphNode::attribute(NodeKind::Ingredient, v) {
            criteria.push(Criterion::new(
                node,
                Relation::ContainsIngredient,
                weights.ingredients,
            ));
        }
    }

    criteria
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_order_and_relations() {
        let prefs = Preferences {
            cooking_method: Some("Baking".into()),
            diet_types: vec!["Vegan".into(), "Keto".into()],
            meal_type: vec!["dinner".into()],
            health_types: vec!["Low Sodium".into()],
            cuisine_region: Some("Italian".into()),
            ingredients: vec!["Tomato".into()],
        };
        let criteria = map_preferences_to_criteria(&prefs, &WeightConfig::default());
        let pairs: Vec<(&str, Relation)> = criteria
            .iter()
            .map(|c| (c.tail.as_str(), c.relation))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("cooking_method_baking", Relation::UsesCookingMethod),
                ("diet_type_Vegan", Relation::HasDietType),
                ("diet_type_Keto", Relation::HasDietType),
                ("meal_type_dinner", Relation::IsForMealType),
                ("health_attribute_Low Sodium", Relation::HasSodiumLevel),
                ("cuisine_region_Italian", Relation::HasCuisineRegion),
                ("ingredient_tomato", Relation::ContainsIngredient),
            ]
        );
        assert!(criteria.iter().all(|c| c.weight == 1.0));
    }

    #[test]
    fn test_blank_elements_skipped() {
        let prefs = Preferences {
            cooking_method: Some("  ".into()),
            diet_types: vec!["".into(), "unknown".into(), " Vegan ".into()],
            ..Default::default()
        };
        let criteria = map_preferences_to_criteria(&prefs, &WeightConfig::default());
        assert_eq!(criteria.len(), 1);
        assert_eq!(criteria[0].tail, "diet_type_Vegan");
    }

    #[test]
    fn test_empty_preferences() {
        assert!(Preferences::default().is_empty());
        let prefs = Preferences {
            ingredients: vec!["nan".into()],
            ..Default::default()
        };
        assert!(prefs.is_empty());
    }

    #[test]
    fn test_weights_applied_per_category() {
        let weights = WeightConfig {
            ingredients: 2.0,
            healthy_type: 0.5,
            ..Default::default()
        };
        let prefs = Preferences {
            health_types: vec!["spicy".into()],
            ingredients: vec!["garlic".into()],
            ..Default::default()
        };
        let criteria = map_preferences_to_criteria(&prefs, &weights);
        assert_eq!(criteria[0].relation, Relation::HasHealthAttribute);
        assert_eq!(criteria[0].weight, 0.5);
        assert_eq!(criteria[1].weight, 2.0);
    }

    #[test]
    fn test_weight_config_deserialize_defaults_and_ignores_unknown() {
        let w: WeightConfig =
            serde_json::from_str(r#"{"ingredients": 3.0, "spiciness": 9.0}"#).unwrap();
        assert_eq!(w.ingredients, 3.0);
        assert_eq!(w.cooking_method, 1.0);
        assert!(w.validate().is_ok());
    }

    #[test]
    fn test_negative_weight_rejected() {
        let w = WeightConfig {
            meal_type: -1.0,
            ..Default::default()
        };
        assert!(matches!(w.validate(), Err(Error::InvalidRequest(_))));
        let w = WeightConfig {
            diet_types: f64::NAN,
            ..Default::default()
        };
        assert!(w.validate().is_err());
    }
}
