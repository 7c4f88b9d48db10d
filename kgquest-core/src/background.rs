//! Background composition: linearize knowledge-graph facts into prose.
//!
//! A background has two parts:
//!
//! 1. **Explicit entities.** Each annotated [`EntityKnowledgeRecord`] is
//!    introduced ("X is a character."), described, and followed by a random
//!    sample of `depth - 1` of its relations (all of them when `depth <= 0`).
//! 2. **Implicit entities.** Every graph node whose name occurs in the plots
//!    seeds a depth-first walk of at most `depth` hops. Each new edge
//!    introduces its endpoints and, for a few known labels, states the
//!    relation.
//!
//! [`CompletedSets`] guarantees that no entity is introduced twice and no
//! entity pair is related twice, in either direction.

use std::collections::HashSet;

use rand::Rng;
use rand::seq::index;
use tracing::debug;

use crate::error::Result;
use crate::graph::{KnowledgeGraph, TraversedEdge};
use crate::registry::GraphRegistry;
use crate::types::{EntityKnowledgeRecord, KbRelation, QuestExample};

/// Header prefixed to every composed background.
pub const BACKGROUND_HEADER: &str = "### Background:\n";

/// Relation label rendered as "<a> is connected to <b>".
pub const LABEL_CONNECTED_TO: &str = "connected to";
/// Relation label rendered as "<a> is present in <b>".
pub const LABEL_PRESENT_IN: &str = "present in";
/// Relation label rendered as "<item> is held by <owner>".
pub const LABEL_HELD_BY: &str = "held by";

// ---------------------------------------------------------------------------
// Dedup bookkeeping
// ---------------------------------------------------------------------------

/// Entities and entity pairs already written during one composition.
#[derive(Debug, Clone, Default)]
pub struct CompletedSets {
    nodes: HashSet<String>,
    relations: HashSet<(String, String)>,
}

impl CompletedSets {
    /// Empty sets.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that an entity has been introduced.
    pub fn mark_node(&mut self, name: &str) {
        self.nodes.insert(name.to_string());
    }

    /// Whether an entity has been introduced.
    #[must_use]
    pub fn has_node(&self, name: &str) -> bool {
        self.nodes.contains(name)
    }

    /// Record a relation between `a` and `b`. Direction is ignored.
    pub fn mark_relation(&mut self, a: &str, b: &str) {
        self.relations.insert(unordered(a, b));
    }

    /// Whether `a` and `b` have been related in either direction.
    #[must_use]
    pub fn has_relation(&self, a: &str, b: &str) -> bool {
        self.relations.contains(&unordered(a, b))
    }

    /// Number of introduced entities.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of related pairs.
    #[must_use]
    pub fn relation_count(&self) -> usize {
        self.relations.len()
    }
}

fn unordered(a: &str, b: &str) -> (String, String) {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

// ---------------------------------------------------------------------------
// Composer
// ---------------------------------------------------------------------------

/// Composes the "Background" prompt section for quest examples.
///
/// `depth` plays two roles: it bounds how many explicit relations are
/// sampled per annotated entity (`depth - 1`) and how many hops the
/// implicit graph walk may take (`depth`). Non-positive depth keeps every
/// explicit relation and skips the graph walk.
#[derive(Debug, Clone, Copy)]
pub struct BackgroundComposer<'r> {
    registry: &'r GraphRegistry,
    depth: i32,
}

impl<'r> BackgroundComposer<'r> {
    /// Create a composer over a loaded registry.
    #[must_use]
    pub fn new(registry: &'r GraphRegistry, depth: i32) -> Self {
        Self { registry, depth }
    }

    /// The configured depth.
    #[must_use]
    pub fn depth(&self) -> i32 {
        self.depth
    }

    /// Compose the background for one example, including the header.
    ///
    /// Relation sampling draws from `rng`; a seeded generator makes the
    /// output reproducible.
    ///
    /// # Errors
    /// Returns [`crate::KgError::MissingGameGraph`] if the example's game is
    /// not in the registry, and [`crate::KgError::TraversalInconsistency`]
    /// if a walked node lacks its `type` or `description`.
    pub fn compose<R: Rng + ?Sized>(&self, example: &QuestExample, rng: &mut R) -> Result<String> {
        let graph = self.registry.require(&example.game)?;
        let mut completed = CompletedSets::new();
        let mut background = String::new();

        for kb in &example.kbs {
            self.describe_known_entity(kb, &mut completed, &mut background, rng);
        }

        // A depth of 1 still walks one hop here even though it samples no
        // explicit relations.
        if self.depth > 0 {
            self.describe_mentioned_entities(graph, example, &mut completed, &mut background)?;
        }

        debug!(
            id = %example.id,
            game = %example.game,
            depth = self.depth,
            entities = completed.node_count(),
            relations = completed.relation_count(),
            "Composed background"
        );

        Ok(format!("{BACKGROUND_HEADER}{background}"))
    }

    fn describe_known_entity<R: Rng + ?Sized>(
        &self,
        kb: &EntityKnowledgeRecord,
        completed: &mut CompletedSets,
        out: &mut String,
        rng: &mut R,
    ) {
        let name = kb.name.as_str();
        out.push_str(&format!("{name} is a {}. ", kb.kind));
        if kb.description != kb.name {
            out.push_str(&format!("{name} is {}. ", kb.description));
        }

        for relation in self.select_relations(kb, rng) {
            out.push_str(&format!("{name} is {} {}. ", relation.label, relation.target));
            completed.mark_relation(name, &relation.target);
        }

        out.push('\n');
        completed.mark_node(name);
    }

    fn select_relations<'k, R: Rng + ?Sized>(
        &self,
        kb: &'k EntityKnowledgeRecord,
        rng: &mut R,
    ) -> Vec<&'k KbRelation> {
        let Ok(budget) = usize::try_from(self.depth) else {
            return kb.relations.iter().collect();
        };
        if budget == 0 {
            return kb.relations.iter().collect();
        }
        let amount = (budget - 1).min(kb.relations.len());
        index::sample(rng, kb.relations.len(), amount)
            .into_iter()
            .map(|i| &kb.relations[i])
            .collect()
    }

    fn describe_mentioned_entities(
        &self,
        graph: &KnowledgeGraph,
        example: &QuestExample,
        completed: &mut CompletedSets,
        out: &mut String,
    ) -> Result<()> {
        let plots = example.plots_text().to_lowercase();
        let depth_limit = usize::try_from(self.depth).unwrap_or(0);

        for node in graph.nodes() {
            if !plots.contains(&node.to_lowercase()) {
                continue;
            }
            for edge in graph.dfs_edges(node, depth_limit) {
                describe_edge(graph, edge, completed, out)?;
            }
        }
        Ok(())
    }
}

fn describe_edge(
    graph: &KnowledgeGraph,
    edge: TraversedEdge<'_>,
    completed: &mut CompletedSets,
    out: &mut String,
) -> Result<()> {
    let TraversedEdge { source, target, label } = edge;
    if completed.has_relation(source, target) {
        return Ok(());
    }

    introduce(graph, source, completed, out)?;
    introduce(graph, target, completed, out)?;

    if let Some(sentence) = phrase_relation(graph, source, target, label)? {
        out.push_str(&sentence);
    }
    out.push('\n');
    completed.mark_relation(source, target);
    Ok(())
}

fn introduce(
    graph: &KnowledgeGraph,
    name: &str,
    completed: &mut CompletedSets,
    out: &mut String,
) -> Result<()> {
    if completed.has_node(name) {
        return Ok(());
    }
    let kind = graph.node_type(name)?;
    let description = graph.node_description(name)?;
    out.push_str(&format!("{name} is a {kind}. "));
    if description != name {
        out.push_str(&format!("{name} is {description}. "));
    }
    completed.mark_node(name);
    out.push('\n');
    Ok(())
}

/// Sentence for a walked edge, or `None` for labels with no phrasing.
fn phrase_relation(
    graph: &KnowledgeGraph,
    source: &str,
    target: &str,
    label: &str,
) -> Result<Option<String>> {
    let sentence = match label {
        LABEL_CONNECTED_TO => format!("{source} is connected to {target}. "),
        LABEL_PRESENT_IN => {
            // FIXME: the location branch names the target on both sides.
            if graph.node_type(source)? == "location" {
                format!("{target} is present in {target}. ")
            } else {
                format!("{source} is present in {target}. ")
            }
        }
        LABEL_HELD_BY => {
            if graph.node_type(source)? == "character" {
                format!("{target} is held by {source}. ")
            } else {
                format!("{source} is held by {target}. ")
            }
        }
        _ => return Ok(None),
    };
    Ok(Some(sentence))
}
