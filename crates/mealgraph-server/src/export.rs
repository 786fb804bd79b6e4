//! Offline graph export: recipe table → knowledge graph → training artifacts.
//!
//! Writes into the output directory:
//! - `triples.csv` (`Head,Relation,Tail`) for oracle training
//! - `graph.json` (nodes and edges) for inspection

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use tracing::{error, info, warn};

use mealgraph_graph::{save_triples, GraphBuilder, NodeKind};
use mealgraph_ingest::RecipeCatalog;

/// Result of an export run.
#[derive(Debug, Default)]
pub struct ExportReport {
    pub rows: usize,
    pub recipes: usize,
    pub nodes: usize,
    pub edges: usize,
    pub nodes_by_kind: BTreeMap<NodeKind, usize>,
    /// Recipes left without any attribute edge.
    pub isolated_recipes: Vec<i64>,
    pub triples_path: Option<PathBuf>,
    pub graph_path: Option<PathBuf>,
    pub errors: Vec<String>,
}

impl ExportReport {
    pub fn succeeded(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Build the graph from `csv` and write the artifacts into `out_dir`.
pub fn run_export(csv: &Path, out_dir: &Path) -> ExportReport {
    let mut report = ExportReport::default();

    let catalog = match RecipeCatalog::load(csv) {
        Ok(c) => c,
        Err(e) => {
            report.errors.push(format!("Failed to read {}: {}", csv.display(), e));
            return report;
        }
    };
    report.rows = catalog.len();

    let records = match catalog.records() {
        Ok(r) => r,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };
    report.recipes = records.len();

    let (graph, triples) = GraphBuilder::build(&records);
    let stats = graph.stats();
    report.nodes = stats.node_count;
    report.edges = stats.edge_count;
    report.nodes_by_kind = stats.nodes_by_kind;
    report.isolated_recipes = graph.isolated_recipes();
    if !report.isolated_recipes.is_empty() {
        warn!(
            "{} recipes have no usable attributes and can never be recommended",
            report.isolated_recipes.len()
        );
    }

    if let Err(e) = std::fs::create_dir_all(out_dir) {
        report
            .errors
            .push(format!("Failed to create {}: {}", out_dir.display(), e));
        return report;
    }

    let triples_path = out_dir.join("triples.csv");
    match save_triples(&triples_path, &triples) {
        Ok(()) => report.triples_path = Some(triples_path),
        Err(e) => report.errors.push(format!("Failed to write triples: {}", e)),
    }

    let graph_path = out_dir.join("graph.json");
    match graph.save_json(&graph_path) {
        Ok(()) => report.graph_path = Some(graph_path),
        Err(e) => report.errors.push(format!("Failed to write graph: {}", e)),
    }

    if report.succeeded() {
        info!(
            "Exported {} triples from {} recipes to {}",
            triples.len(),
            report.recipes,
            out_dir.display()
        );
    } else {
        error!("Graph export finished with {} errors", report.errors.len());
    }
    report
}

pub fn print_report(report: &ExportReport) {
    println!("=== MealGraph Export Report ===");
    println!();
    println!("Table rows:         {}", report.rows);
    println!("Recipes:            {}", report.recipes);
    println!("Nodes:              {}", report.nodes);
    println!("Edges:              {}", report.edges);
    for (kind, count) in &report.nodes_by_kind {
        println!("  {:<18}{}", kind.tag(), count);
    }
    if !report.isolated_recipes.is_empty() {
        println!("Isolated recipes:   {}", report.isolated_recipes.len());
    }
    if let Some(p) = &report.triples_path {
        println!("Triples:            {}", p.display());
    }
    if let Some(p) = &report.graph_path {
        println!("Graph:              {}", p.display());
    }

    if !report.errors.is_empty() {
        println!();
        println!("Errors:");
        for e in &report.errors {
            println!("  - {}", e);
        }
    }

    println!();
    if report.succeeded() {
        println!("Status: EXPORTED");
    } else {
        println!("Status: EXPORT FAILED");
    }
}
