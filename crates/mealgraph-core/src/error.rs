//! Error types for MealGraph.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The recipe table lacks one or more required columns. Fatal for a build.
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingDataColumn(Vec<String>),

    /// A single record could not be normalized. Callers skip it and continue.
    #[error("Unparsable record at row {row}: {reason}")]
    UnparsableRecord { row: usize, reason: String },

    /// The scoring oracle could not be loaded.
    #[error("Oracle load failed: {0}")]
    OracleLoad(String),

    /// The oracle failed to score one criterion.
    #[error("Prediction failed for ({relation}, {tail}): {reason}")]
    Prediction {
        relation: String,
        tail: String,
        reason: String,
    },

    #[error("At least one search criterion must be provided")]
    NoCriteria,

    #[error("Recipe with ID {0} not found")]
    RecipeNotFound(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Request cancelled")]
    Cancelled,

    #[error("Invalid node label: {0}")]
    InvalidLabel(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether the condition is local to one record or criterion and the
    /// surrounding operation should keep going.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnparsableRecord { .. } | Self::Prediction { .. } | Self::InvalidLabel(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_lists_all() {
        let err = Error::MissingDataColumn(vec!["RecipeId".into(), "meal_type".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required columns: RecipeId, meal_type"
        );
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(Error::UnparsableRecord {
            row: 3,
            reason: "bad id".into()
        }
        .is_recoverable());
        assert!(Error::Prediction {
            relation: "hasDietType".into(),
            tail: "diet_type_Vegan".into(),
            reason: "unknown entity".into(),
        }
        .is_recoverable());
        assert!(!Error::OracleLoad("missing file".into()).is_recoverable());
        assert!(!Error::MissingDataColumn(vec![]).is_recoverable());
    }
}
