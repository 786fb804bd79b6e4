//! Knowledge graph backend using petgraph, and the record → graph builder.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use mealgraph_core::Result;

use crate::health::map_health_attribute;
use crate::node::{split_clean, GraphNode, NodeKind};
use crate::record::Record;
use crate::relation::Relation;
use crate::triples::Triple;

/// How an attribute's raw text is turned into node values.
#[derive(Debug, Clone, Copy)]
enum Cardinality {
    Scalar,
    List(char),
}

/// Where an attribute's relation comes from.
#[derive(Debug, Clone, Copy)]
enum RelationSource {
    Static(Relation),
    HealthMapped,
}

struct AttributeSpec {
    kind: NodeKind,
    relation: RelationSource,
    cardinality: Cardinality,
    select: fn(&Record) -> Option<&str>,
}

/// Attributes in per-record processing order.
const ATTRIBUTES: [AttributeSpec; 6] = [
    AttributeSpec {
        kind: NodeKind::CookingMethod,
        relation: RelationSource::Static(Relation::UsesCookingMethod),
        cardinality: Cardinality::Scalar,
        select: |r| r.cooking_method.as_deref(),
    },
    AttributeSpec {
        kind: NodeKind::CuisineRegion,
        relation: RelationSource::Static(Relation::HasCuisineRegion),
        cardinality: Cardinality::Scalar,
        select: |r| r.cuisine_region.as_deref(),
    },
    AttributeSpec {
        kind: NodeKind::HealthAttribute,
        relation: RelationSource::HealthMapped,
        cardinality: Cardinality::List(','),
        select: |r| r.health_type.as_deref(),
    },
    AttributeSpec {
        kind: NodeKind::DietType,
        relation: RelationSource::Static(Relation::HasDietType),
        cardinality: Cardinality::List(','),
        select: |r| r.diet_types.as_deref(),
    },
    AttributeSpec {
        kind: NodeKind::MealType,
        relation: RelationSource::Static(Relation::IsForMealType),
        cardinality: Cardinality::List(','),
        select: |r| r.meal_type.as_deref(),
    },
    AttributeSpec {
        kind: NodeKind::Ingredient,
        relation: RelationSource::Static(Relation::ContainsIngredient),
        cardinality: Cardinality::List(';'),
        select: |r| r.ingredient_names.as_deref(),
    },
];

/// Directed recipe knowledge graph with canonical node deduplication.
pub struct RecipeGraph {
    graph: DiGraph<GraphNode, Relation>,
    node_index: HashMap<GraphNode, NodeIndex>,
}

impl RecipeGraph {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_index: HashMap::new(),
        }
    }

    /// Return the index of `node`, inserting it on first sight.
    pub fn ensure_node(&mut self, node: GraphNode) -> NodeIndex {
        if let Some(&idx) = self.node_index.get(&node) {
            return idx;
        }
        let idx = self.graph.add_node(node.clone());
        self.node_index.insert(node, idx);
        idx
    }

    /// Add an edge. Parallel edges are kept.
    pub fn add_edge(&mut self, head: NodeIndex, relation: Relation, tail: NodeIndex) {
        self.graph.add_edge(head, tail, relation);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges in insertion order as `(head, relation, tail)`.
    pub fn edges(&self) -> impl Iterator<Item = (&GraphNode, Relation, &GraphNode)> {
        self.graph
            .edge_references()
            .map(|e| (&self.graph[e.source()], *e.weight(), &self.graph[e.target()]))
    }

    /// Outgoing `(relation, attribute)` pairs of a node.
    pub fn attributes_of(&self, node: &GraphNode) -> Vec<(Relation, &GraphNode)> {
        let Some(&idx) = self.node_index.get(node) else {
            return Vec::new();
        };
        let mut out: Vec<(Relation, &GraphNode)> = self
            .graph
            .edges(idx)
            .map(|e| (*e.weight(), &self.graph[e.target()]))
            .collect();
        // petgraph walks adjacency lists newest-first
        out.reverse();
        out
    }

    /// Ids of recipes with no attribute edge. No criterion can ever rank them.
    pub fn isolated_recipes(&self) -> Vec<i64> {
        self.nodes()
            .filter(|n| n.kind() == NodeKind::Recipe && self.attributes_of(n).is_empty())
            .filter_map(GraphNode::recipe_id)
            .collect()
    }

    /// Get graph statistics.
    pub fn stats(&self) -> GraphStats {
        let mut nodes_by_kind = BTreeMap::new();
        for node in self.graph.node_weights() {
            *nodes_by_kind.entry(node.kind()).or_insert(0) += 1;
        }
        GraphStats {
            node_count: self.graph.node_count(),
            edge_count: self.graph.edge_count(),
            nodes_by_kind,
        }
    }

    /// Serializable node/edge listing.
    pub fn export(&self) -> GraphExport {
        GraphExport {
            nodes: self
                .nodes()
                .map(|n| ExportNode {
                    label: n.label(),
                    node_type: n.kind(),
                    value: n.value(),
                })
                .collect(),
            edges: self
                .edges()
                .map(|(h, r, t)| ExportEdge {
                    source: h.label(),
                    relation: r,
                    target: t.label(),
                })
                .collect(),
        }
    }

    /// Write the node/edge listing as pretty JSON.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let data = serde_json::to_string_pretty(&self.export())?;
        std::fs::write(path, data)?;
        info!(
            "Saved graph with {} nodes to {}",
            self.node_count(),
            path.display()
        );
        Ok(())
    }
}

impl Default for RecipeGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphStats {
    pub node_count: usize,
    pub edge_count: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportNode {
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: NodeKind,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportEdge {
    pub source: String,
    pub relation: Relation,
    pub target: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<ExportNode>,
    pub edges: Vec<ExportEdge>,
}

/// Builds a [`RecipeGraph`] and its triple list from records.
pub struct GraphBuilder {
    graph: RecipeGraph,
    triples: Vec<Triple>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self {
            graph: RecipeGraph::new(),
            triples: Vec::new(),
        }
    }

    /// Build the graph and triples for a full record collection.
    pub fn build<'a, I>(records: I) -> (RecipeGraph, Vec<Triple>)
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut builder = Self::new();
        let mut count = 0usize;
        for record in records {
            builder.add_record(record);
            count += 1;
        }
        let (graph, triples) = builder.finish();
        info!(
            "Created graph from {} recipes: {} nodes, {} edges",
            count,
            graph.node_count(),
            graph.edge_count()
        );
        (graph, triples)
    }

    /// Add one record's recipe node, attribute nodes, edges and triples.
    pub fn add_record(&mut self, record: &Record) {
        let recipe = GraphNode::recipe(record.id);
        let recipe_label = recipe.label();
        let recipe_idx = self.graph.ensure_node(recipe);

        for spec in &ATTRIBUTES {
            let Some(raw) = (spec.select)(record) else {
                continue;
            };
            let values: Vec<&str> = match spec.cardinality {
                Cardinality::Scalar => vec![raw],
                Cardinality::List(delimiter) => split_clean(raw, delimiter),
            };
            for value in values {
                let Some(node) = GraphNode::attribute(spec.kind, value) else {
                    continue;
                };
                let relation = match spec.relation {
                    RelationSource::Static(r) => r,
                    RelationSource::HealthMapped => map_health_attribute(value),
                };
                let tail_label = node.label();
                let tail_idx = self.graph.ensure_node(node);
                self.graph.add_edge(recipe_idx, relation, tail_idx);
                self.triples
                    .push(Triple::new(recipe_label.clone(), relation.as_str(), tail_label));
            }
        }
        debug!("Added recipe {} to graph", record.id);
    }

    pub fn finish(self) -> (RecipeGraph, Vec<Triple>) {
        (self.graph, self.triples)
    }
}

impl Default for GraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        vec![
            Record::new(1)
                .with_cooking_method("Oven")
                .with_diet_types("Vegetarian, Gluten Free")
                .with_meal_type("dinner")
                .with_health_type("Low Carb, saturated_fat_low")
                .with_cuisine_region("Mediterranean Europe")
                .with_ingredients("Tomato; mozzarella ;basil"),
            Record::new(2)
                .with_cooking_method("oven")
                .with_diet_types("Vegetarian")
                .with_meal_type("lunch,dinner")
                .with_cuisine_region("East Asia")
                .with_ingredients("tomato;rice"),
        ]
    }

    #[test]
    fn test_shared_attributes_share_nodes() {
        let records = sample_records();
        let (graph, triples) = GraphBuilder::build(&records);

        // 2 recipes + oven + 2 regions + 2 health + 2 diets + 2 meals + 4 ingredients
        assert_eq!(graph.node_count(), 15);
        assert_eq!(graph.edge_count(), triples.len());

        let oven = GraphNode::attribute(NodeKind::CookingMethod, "oven").unwrap();
        assert_eq!(graph.nodes().filter(|n| **n == oven).count(), 1);
        let oven_edges = graph
            .edges()
            .filter(|(_, r, t)| *r == Relation::UsesCookingMethod && **t == oven)
            .count();
        assert_eq!(oven_edges, 2);

        let stats = graph.stats();
        assert_eq!(stats.nodes_by_kind[&NodeKind::Recipe], 2);
        assert_eq!(stats.nodes_by_kind[&NodeKind::Ingredient], 4);
    }

    #[test]
    fn test_unknown_values_produce_nothing() {
        let records = vec![Record {
            id: 9,
            cooking_method: Some("unknown".into()),
            diet_types: Some(" , unknown".into()),
            meal_type: None,
            health_type: Some("".into()),
            cuisine_region: Some("NaN".into()),
            ingredient_names: Some("salt;unknown;".into()),
        }];
        let (graph, triples) = GraphBuilder::build(&records);

        assert!(triples
            .iter()
            .all(|t| t.relation != Relation::UsesCookingMethod.as_str()));
        assert_eq!(triples.len(), 1);
        assert_eq!(triples[0].tail, "ingredient_salt");
        assert_eq!(graph.node_count(), 2);
        assert!(graph.isolated_recipes().is_empty());
    }

    #[test]
    fn test_isolated_recipes() {
        let mut records = sample_records();
        records.push(Record::new(5).with_cooking_method("unknown"));
        records.push(Record::new(6));
        let (graph, _) = GraphBuilder::build(&records);
        assert_eq!(graph.isolated_recipes(), vec![5, 6]);
    }

    #[test]
    fn test_health_relations_are_mapped() {
        let records = sample_records();
        let (_, triples) = GraphBuilder::build(&records);
        let health: Vec<(&str, &str)> = triples
            .iter()
            .filter(|t| t.tail.starts_with("health_attribute_"))
            .map(|t| (t.relation.as_str(), t.tail.as_str()))
            .collect();
        assert_eq!(
            health,
            vec![
                ("HasCarbLevel", "health_attribute_Low Carb"),
                ("HasSaturatedFatLevel", "health_attribute_saturated_fat_low"),
            ]
        );
    }

    #[test]
    fn test_triple_order_follows_attribute_order() {
        let records = vec![sample_records().remove(0)];
        let (_, triples) = GraphBuilder::build(&records);
        let relations: Vec<&str> = triples.iter().map(|t| t.relation.as_str()).collect();
        assert_eq!(
            relations,
            vec![
                "usesCookingMethod",
                "hasCuisineRegion",
                "HasCarbLevel",
                "HasSaturatedFatLevel",
                "hasDietType",
                "hasDietType",
                "isForMealType",
                "containsIngredient",
                "containsIngredient",
                "containsIngredient",
            ]
        );
        assert!(triples.iter().all(|t| t.head == "recipe_1"));
    }

    #[test]
    fn test_build_is_idempotent() {
        let records = sample_records();
        let (g1, t1) = GraphBuilder::build(&records);
        let (g2, t2) = GraphBuilder::build(&records);
        assert_eq!(t1, t2);
        assert_eq!(g1.node_count(), g2.node_count());
        let n1: Vec<_> = g1.nodes().cloned().collect();
        let n2: Vec<_> = g2.nodes().cloned().collect();
        assert_eq!(n1, n2);
    }

    #[test]
    fn test_attributes_of_recipe() {
        let records = sample_records();
        let (graph, _) = GraphBuilder::build(&records);
        let attrs = graph.attributes_of(&GraphNode::recipe(2));
        let labels: Vec<String> = attrs.iter().map(|(_, n)| n.label()).collect();
        assert_eq!(
            labels,
            vec![
                "cooking_method_oven",
                "cuisine_region_East Asia",
                "diet_type_Vegetarian",
                "meal_type_lunch",
                "meal_type_dinner",
                "ingredient_tomato",
                "ingredient_rice",
            ]
        );
        assert!(graph.attributes_of(&GraphNode::recipe(99)).is_empty());
    }

    #[test]
    fn test_export_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("graph.json");
        let (graph, _) = GraphBuilder::build(&sample_records());
        graph.save_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["nodes"].as_array().unwrap().len(), graph.node_count());
        assert_eq!(value["nodes"][0]["label"], "recipe_1");
        assert_eq!(value["nodes"][0]["type"], "recipe");
        assert_eq!(value["edges"][0]["relation"], "usesCookingMethod");
    }
}
