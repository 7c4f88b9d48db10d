//! # KGQuest Core Library
//!
//! Game-agnostic building blocks for knowledge-graph conditioned quest
//! generation.
//!
//! Every game ships a [`KnowledgeGraph`] of entities (characters, locations,
//! items) and typed relations between them. Each training or inference
//! example ([`QuestExample`]) carries plot points, a handful of
//! author-curated entity records, and the target quest. The
//! [`BackgroundComposer`] linearizes the relevant part of the graph into a
//! natural-language "Background" section:
//!
//! - **Phase A**: describe the explicitly annotated entities, sampling
//!   `depth - 1` of their relations.
//! - **Phase B**: find graph nodes mentioned in the plots and walk their
//!   outgoing edges depth-first, up to `depth` hops.
//!
//! Composition never repeats an entity introduction or a relation pair.
//! The only non-determinism is relation sampling, which always draws from
//! a caller-supplied random source.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod background;
pub mod config;
pub mod dataset;
pub mod error;
pub mod graph;
pub mod registry;
pub mod types;

pub use background::{BackgroundComposer, CompletedSets, BACKGROUND_HEADER};
pub use config::KgQuestConfig;
pub use error::KgError;
pub use graph::KnowledgeGraph;
pub use registry::GraphRegistry;
pub use types::*;
