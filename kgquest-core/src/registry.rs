//! Read-only registry of knowledge graphs, one per game code.
//!
//! Built once at startup and passed by reference to whatever composes
//! backgrounds. Nothing mutates it after construction.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{KgError, Result};
use crate::graph::{KnowledgeGraph, graphml};

/// File extension of graph files picked up by [`GraphRegistry::load_dir`].
pub const GRAPH_EXTENSION: &str = "graphml";

/// Knowledge graphs keyed by game code (e.g. "TESO", "BG1").
#[derive(Debug, Clone, Default)]
pub struct GraphRegistry {
    graphs: HashMap<String, KnowledgeGraph>,
}

impl GraphRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert, mostly for tests and embedding callers.
    #[must_use]
    pub fn with_graph(mut self, game: impl Into<String>, graph: KnowledgeGraph) -> Self {
        self.graphs.insert(game.into(), graph);
        self
    }

    /// Load every `*.graphml` file in `dir`, keyed by file stem.
    ///
    /// # Errors
    /// Returns an error if the directory or one of its entries cannot be
    /// read, a graph file name is not valid UTF-8, or any graph file fails
    /// to parse.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == GRAPH_EXTENSION) {
                paths.push(path);
            }
        }
        paths.sort();

        let mut graphs = HashMap::new();
        for path in paths {
            let Some(game) = path.file_stem().and_then(|s| s.to_str()) else {
                return Err(KgError::GraphParse {
                    path: path.display().to_string(),
                    reason: "file stem is not valid UTF-8, no game code".to_string(),
                });
            };
            let graph = graphml::read_file(&path)?;
            debug!(
                game,
                nodes = graph.node_count(),
                edges = graph.edge_count(),
                "Loaded knowledge graph"
            );
            graphs.insert(game.to_string(), graph);
        }

        info!(
            dir = %dir.display(),
            games = graphs.len(),
            "Graph registry loaded"
        );
        Ok(Self { graphs })
    }

    /// Graph for a game, if loaded.
    #[must_use]
    pub fn get(&self, game: &str) -> Option<&KnowledgeGraph> {
        self.graphs.get(game)
    }

    /// Graph for a game.
    ///
    /// # Errors
    /// Returns [`KgError::MissingGameGraph`] if the game was never loaded.
    pub fn require(&self, game: &str) -> Result<&KnowledgeGraph> {
        self.get(game)
            .ok_or_else(|| KgError::MissingGameGraph(game.to_string()))
    }

    /// Number of loaded games.
    #[must_use]
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Whether no games are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Loaded game codes, sorted.
    #[must_use]
    pub fn games(&self) -> Vec<&str> {
        let mut games: Vec<&str> = self.graphs.keys().map(String::as_str).collect();
        games.sort_unstable();
        games
    }
}
