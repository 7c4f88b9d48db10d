//! Core record types shared by the dataset loader, the composer and the
//! prompt assembler.
//!
//! All types are serializable and match the line-delimited JSON layout of
//! the quest datasets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Identifier of a quest example. Datasets use either numbers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleId {
    /// Numeric identifier.
    Number(u64),
    /// Free-form identifier.
    Text(String),
}

impl fmt::Display for ExampleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<u64> for ExampleId {
    fn from(n: u64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ExampleId {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

// ---------------------------------------------------------------------------
// Entity knowledge records ("kbs")
// ---------------------------------------------------------------------------

/// One explicit relation of an annotated entity, stored in JSON as a
/// `[label, target]` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "(String, String)", into = "(String, String)")]
pub struct KbRelation {
    /// Relation type, e.g. "present in".
    pub label: String,
    /// Entity name on the far side of the relation.
    pub target: String,
}

impl KbRelation {
    /// Create a relation.
    #[must_use]
    pub fn new(label: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target: target.into(),
        }
    }
}

impl From<(String, String)> for KbRelation {
    fn from((label, target): (String, String)) -> Self {
        Self { label, target }
    }
}

impl From<KbRelation> for (String, String) {
    fn from(rel: KbRelation) -> Self {
        (rel.label, rel.target)
    }
}

/// An entity the example's author marked as directly relevant to the quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityKnowledgeRecord {
    /// Entity name, also its node id in the game graph.
    pub name: String,
    /// Free-text description. Equal to `name` when none exists.
    pub description: String,
    /// Category, e.g. "character" or "location".
    #[serde(rename = "type")]
    pub kind: String,
    /// Known relations in annotation order.
    #[serde(default)]
    pub relations: Vec<KbRelation>,
}

impl EntityKnowledgeRecord {
    /// Create a record with no relations.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        kind: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            kind: kind.into(),
            relations: Vec::new(),
        }
    }

    /// Builder-style helper that appends a relation.
    #[must_use]
    pub fn with_relation(mut self, label: impl Into<String>, target: impl Into<String>) -> Self {
        self.relations.push(KbRelation::new(label, target));
        self
    }
}

// ---------------------------------------------------------------------------
// Quest examples
// ---------------------------------------------------------------------------

/// A single training or inference record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestExample {
    /// Dataset identifier.
    pub id: ExampleId,
    /// Game code, the key into the graph registry (e.g. "TESO", "BG1").
    pub game: String,
    /// Plot points in narrative order.
    pub plots: Vec<String>,
    /// Explicitly annotated entities.
    pub kbs: Vec<EntityKnowledgeRecord>,
    /// Target quest fields in source order (title, objective, tasks, ...).
    pub quest: Map<String, Value>,
}

impl QuestExample {
    /// Plots joined with newlines, as they appear in the prompt.
    #[must_use]
    pub fn plots_text(&self) -> String {
        self.plots.join("\n")
    }
}

// ---------------------------------------------------------------------------
// Prompt modes
// ---------------------------------------------------------------------------

/// How much knowledge-graph context a prompt carries (`TRAIN_TYPE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrainType {
    /// Plots only.
    NoKg,
    /// Plots plus a linearized text background.
    #[default]
    TextKg,
    /// Tree-structured background. Rendering is not provided; prompts are
    /// assembled without a background.
    TreeKg,
}

impl TrainType {
    /// All modes.
    #[must_use]
    pub fn all() -> &'static [TrainType] {
        &[Self::NoKg, Self::TextKg, Self::TreeKg]
    }

    /// Whether this mode prepends a composed text background.
    #[must_use]
    pub fn uses_text_background(self) -> bool {
        matches!(self, Self::TextKg)
    }
}

impl fmt::Display for TrainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NoKg => "no_kg",
            Self::TextKg => "text_kg",
            Self::TreeKg => "tree_kg",
        };
        write!(f, "{name}")
    }
}

impl FromStr for TrainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no_kg" => Ok(Self::NoKg),
            "text_kg" => Ok(Self::TextKg),
            "tree_kg" => Ok(Self::TreeKg),
            _ => Err(format!("unknown train type: '{s}'")),
        }
    }
}
