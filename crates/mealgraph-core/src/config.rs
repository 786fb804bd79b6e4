//! Configuration and data file locations.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Paths to the MealGraph data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Recipe table (`data/recipes.csv`).
    pub recipes_csv: PathBuf,
    /// Exported knowledge-graph triples the oracle was trained on (`data/triples.csv`).
    pub triples_csv: PathBuf,
    /// Exported embedding table (`data/embedding/embeddings.json`).
    pub embeddings: PathBuf,
}

impl DataPaths {
    /// Default layout under a root directory.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        Self {
            recipes_csv: root.join("recipes.csv"),
            triples_csv: root.join("triples.csv"),
            embeddings: root.join("embedding").join("embeddings.json"),
            root,
        }
    }
}

/// Top-level MealGraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealGraphConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data file paths.
    pub data_paths: DataPaths,
    /// Maximum number of oracle calls in flight for one request.
    pub fan_out: usize,
    /// Load the oracle at startup instead of on first request.
    pub preload: bool,
}

impl MealGraphConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_lookup(data_dir, |key| std::env::var(key).ok())
    }

    /// Create configuration from an arbitrary key lookup. A set but
    /// unparsable `PORT` or `MEALGRAPH_FAN_OUT` is an error.
    pub fn from_lookup<F>(data_dir: impl AsRef<Path>, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(v) => v
                .trim()
                .parse::<u16>()
                .map_err(|e| Error::Config(format!("PORT={:?}: {}", v, e)))?,
            None => 8000,
        };

        let mut data_paths = DataPaths::new(data_dir);
        if let Some(p) = lookup("MEALGRAPH_RECIPES_CSV") {
            data_paths.recipes_csv = PathBuf::from(p);
        }
        if let Some(p) = lookup("MEALGRAPH_TRIPLES_CSV") {
            data_paths.triples_csv = PathBuf::from(p);
        }
        if let Some(p) = lookup("MEALGRAPH_EMBEDDINGS") {
            data_paths.embeddings = PathBuf::from(p);
        }

        let fan_out = match lookup("MEALGRAPH_FAN_OUT") {
            Some(v) => match v.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                Ok(_) => {
                    return Err(Error::Config(
                        "MEALGRAPH_FAN_OUT must be at least 1".into(),
                    ))
                }
                Err(e) => {
                    return Err(Error::Config(format!(
                        "MEALGRAPH_FAN_OUT={:?}: {}",
                        v, e
                    )))
                }
            },
            None => default_fan_out(),
        };

        let preload = lookup("MEALGRAPH_PRELOAD")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "0" | "false" | "no" | "off"))
            .unwrap_or(true);

        Ok(Self {
            port,
            data_paths,
            fan_out,
            preload,
        })
    }
}

fn default_fan_out() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
