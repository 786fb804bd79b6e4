//! Flattened `(Head, Relation, Tail)` triples and their CSV form.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use mealgraph_core::{Error, Result};

use crate::node::GraphNode;

/// String projection of one graph edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triple {
    #[serde(rename = "Head")]
    pub head: String,
    #[serde(rename = "Relation")]
    pub relation: String,
    #[serde(rename = "Tail")]
    pub tail: String,
}

impl Triple {
    pub fn new(head: impl Into<String>, relation: impl Into<String>, tail: impl Into<String>) -> Self {
        Self {
            head: head.into(),
            relation: relation.into(),
            tail: tail.into(),
        }
    }

    /// Decode head and tail back into typed nodes.
    pub fn nodes(&self) -> Result<(GraphNode, GraphNode)> {
        Ok((GraphNode::decode(&self.head)?, GraphNode::decode(&self.tail)?))
    }
}

fn csv_error(e: csv::Error) -> Error {
    Error::Csv(e.to_string())
}

/// Write triples as CSV with a `Head,Relation,Tail` header.
pub fn write_triples<W: Write>(writer: W, triples: &[Triple]) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    for triple in triples {
        out.serialize(triple).map_err(csv_error)?;
    }
    out.flush()?;
    Ok(())
}

/// Save triples to a CSV file.
pub fn save_triples(path: &Path, triples: &[Triple]) -> Result<()> {
    info!("Saving {} triples to {}", triples.len(), path.display());
    let file = std::fs::File::create(path)?;
    write_triples(std::io::BufWriter::new(file), triples)
}

/// Read triples from CSV. Fields are trimmed; rows of the wrong arity fail.
pub fn read_triples<R: Read>(reader: R) -> Result<Vec<Triple>> {
    let mut input = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut triples = Vec::new();
    for row in input.deserialize::<Triple>() {
        triples.push(row.map_err(csv_error)?);
    }
    Ok(triples)
}

/// Load triples from a CSV file.
pub fn load_triples(path: &Path) -> Result<Vec<Triple>> {
    let file = std::fs::File::open(path)?;
    let triples = read_triples(std::io::BufReader::new(file))?;
    info!("Loaded {} triples from {}", triples.len(), path.display());
    Ok(triples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::GraphBuilder;
    use crate::record::Record;

    #[test]
    fn test_export_shape() {
        let records = vec![Record::new(3)
            .with_meal_type("dinner")
            .with_ingredients("Garlic")];
        let (_, triples) = GraphBuilder::build(&records);

        let mut buf = Vec::new();
        write_triples(&mut buf, &triples).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "Head,Relation,Tail",
                "recipe_3,isForMealType,meal_type_dinner",
                "recipe_3,containsIngredient,ingredient_garlic",
            ]
        );
    }

    #[test]
    fn test_file_roundtrip_decodes_to_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("triples.csv");
        let records = vec![Record::new(5).with_cuisine_region("North America, South")];
        let (_, triples) = GraphBuilder::build(&records);

        save_triples(&path, &triples).unwrap();
        let loaded = load_triples(&path).unwrap();
        assert_eq!(loaded, triples);

        let (head, tail) = loaded[0].nodes().unwrap();
        assert_eq!(head, GraphNode::recipe(5));
        assert_eq!(tail.value(), "North America, South");
    }

    #[test]
    fn test_read_rejects_short_rows() {
        let data = "Head,Relation,Tail\nrecipe_1,hasDietType\n";
        assert!(read_triples(data.as_bytes()).is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_triples(Path::new("/nonexistent/triples.csv")).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }
}
