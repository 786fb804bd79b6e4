//! Health descriptor → relation classifier.

use crate::relation::Relation;

/// Ordered substring rules. `saturated_fat` sits ahead of the plain `fat`
/// rule, and the `fat` rule additionally refuses anything mentioning
/// "saturated".
const RULES: [(&str, Relation); 9] = [
    ("protein", Relation::HasProteinLevel),
    ("carb", Relation::HasCarbLevel),
    ("saturated_fat", Relation::HasSaturatedFatLevel),
    ("fat", Relation::HasFatLevel),
    ("calorie", Relation::HasCalorieLevel),
    ("sodium", Relation::HasSodiumLevel),
    ("sugar", Relation::HasSugarLevel),
    ("fiber", Relation::HasFiberLevel),
    ("cholesterol", Relation::HasCholesterolLevel),
];

/// Map a free-text health descriptor (e.g. "Low Carb") to its relation.
///
/// Case-insensitive; spaces and hyphens count as underscores, so
/// "saturated fat" and "Saturated-Fat" both hit the saturated-fat rule.
pub fn map_health_attribute(descriptor: &str) -> Relation {
    let text: String = descriptor
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c == ' ' || c == '-' { '_' } else { c })
        .collect();

    for (needle, relation) in RULES {
        if !text.contains(needle) {
            continue;
        }
        if relation == Relation::HasFatLevel && text.contains("saturated") {
            continue;
        }
        return relation;
    }
    Relation::HasHealthAttribute
}
