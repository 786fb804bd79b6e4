//! Entity and relation vocabulary built from exported triples.

use std::collections::{BTreeSet, HashMap};

use mealgraph_graph::Triple;

/// Label ↔ id index over the entities and relations of a triple set.
///
/// Labels are sorted before ids are assigned, so the same triples always
/// give the same ids.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    entities: Vec<String>,
    entity_ids: HashMap<String, usize>,
    relations: Vec<String>,
    relation_ids: HashMap<String, usize>,
}

impl Vocabulary {
    pub fn from_triples(triples: &[Triple]) -> Self {
        let mut entities = BTreeSet::new();
        let mut relations = BTreeSet::new();
        for t in triples {
            entities.insert(t.head.as_str());
            entities.insert(t.tail.as_str());
            relations.insert(t.relation.as_str());
        }
        let entities: Vec<String> = entities.into_iter().map(str::to_string).collect();
        let relations: Vec<String> = relations.into_iter().map(str::to_string).collect();
        Self {
            entity_ids: index(&entities),
            relation_ids: index(&relations),
            entities,
            relations,
        }
    }

    pub fn entity_id(&self, label: &str) -> Option<usize> {
        self.entity_ids.get(label).copied()
    }

    pub fn relation_id(&self, label: &str) -> Option<usize> {
        self.relation_ids.get(label).copied()
    }

    pub fn entity(&self, id: usize) -> Option<&str> {
        self.entities.get(id).map(String::as_str)
    }

    pub fn entities(&self) -> &[String] {
        &self.entities
    }

    pub fn relations(&self) -> &[String] {
        &self.relations
    }

    pub fn num_entities(&self) -> usize {
        self.entities.len()
    }

    pub fn num_relations(&self) -> usize {
        self.relations.len()
    }
}

fn index(labels: &[String]) -> HashMap<String, usize> {
    labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.clone(), i))
        .collect()
}
