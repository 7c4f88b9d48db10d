//! Error types for the KGQuest core library.

use thiserror::Error;

/// Top-level error type for graph loading, dataset parsing and composition.
#[derive(Error, Debug)]
pub enum KgError {
    /// An example references a game code with no loaded knowledge graph.
    #[error("No knowledge graph loaded for game '{0}'")]
    MissingGameGraph(String),

    /// A dataset line is absent required fields or has the wrong shape.
    #[error("Malformed record on line {line}: {reason}")]
    MalformedRecord {
        /// 1-based line number within the JSONL file.
        line: usize,
        /// Deserializer message.
        reason: String,
    },

    /// A traversed node is missing an attribute needed to phrase it.
    #[error("Graph node '{node}' is missing required attribute '{attribute}'")]
    TraversalInconsistency {
        /// Entity name of the offending node.
        node: String,
        /// Attribute that could not be found.
        attribute: &'static str,
    },

    /// A graph file could not be parsed.
    #[error("Failed to parse graph {path}: {reason}")]
    GraphParse {
        /// File (or source label) being parsed.
        path: String,
        /// Parser message.
        reason: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, KgError>;
