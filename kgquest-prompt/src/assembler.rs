//! Prompt assembly: join background, plots, instruction and quest blocks.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use kgquest_core::{BackgroundComposer, ExampleId, GraphRegistry, QuestExample, TrainType};

use crate::error::Result;
use crate::quest;

/// Header of the plots block.
pub const PLOTS_HEADER: &str = "### Plots:\n";
/// Instruction placed between the context and the quest.
pub const INSTRUCTION: &str = "The quest related to the above information is as follows:";
/// Marker closing every quest.
pub const END_MARKER: &str = "### End";
/// Separator between prompt sections.
pub const SECTION_SEPARATOR: &str = "\n\n";

/// Text produced for one example.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSample {
    /// Originating example.
    pub id: ExampleId,
    /// Training: the full text. Inference: the prompt up to the instruction.
    pub text: String,
    /// Inference only: the expected completion (quest block and end marker).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// Builds training and inference prompts.
#[derive(Debug, Clone, Copy)]
pub struct PromptAssembler<'r> {
    composer: BackgroundComposer<'r>,
    train_type: TrainType,
}

impl<'r> PromptAssembler<'r> {
    /// Create an assembler for a prompt mode and KG depth.
    #[must_use]
    pub fn new(registry: &'r GraphRegistry, train_type: TrainType, depth: i32) -> Self {
        Self {
            composer: BackgroundComposer::new(registry, depth),
            train_type,
        }
    }

    /// The prompt mode.
    #[must_use]
    pub fn train_type(&self) -> TrainType {
        self.train_type
    }

    /// Assemble one example.
    ///
    /// Training samples carry everything in `text`. Inference samples stop
    /// `text` at the instruction and put the quest in `output`.
    ///
    /// # Errors
    /// Returns an error if background composition fails or a quest field is
    /// malformed.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        example: &QuestExample,
        for_training: bool,
        rng: &mut R,
    ) -> Result<PromptSample> {
        let background = if self.train_type.uses_text_background() {
            self.composer.compose(example, rng)?
        } else {
            String::new()
        };
        let plots = format!("{PLOTS_HEADER}{}", example.plots_text());
        let quest = quest::render_quest(&example.quest)?;

        let sample = if for_training {
            PromptSample {
                id: example.id.clone(),
                text: join_sections(&[&background, &plots, INSTRUCTION, &quest, END_MARKER]),
                output: None,
            }
        } else {
            PromptSample {
                id: example.id.clone(),
                text: join_sections(&[&background, &plots, INSTRUCTION]),
                output: Some(join_sections(&[&quest, END_MARKER])),
            }
        };

        debug!(
            id = %example.id,
            mode = %self.train_type,
            for_training,
            chars = sample.text.len(),
            "Assembled prompt"
        );
        Ok(sample)
    }

    /// Assemble every example, stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first error encountered.
    pub fn assemble_all<R: Rng + ?Sized>(
        &self,
        examples: &[QuestExample],
        for_training: bool,
        rng: &mut R,
    ) -> Result<Vec<PromptSample>> {
        let samples = examples
            .iter()
            .map(|ex| self.assemble(ex, for_training, rng))
            .collect::<Result<Vec<_>>>()?;
        info!(
            mode = %self.train_type,
            depth = self.composer.depth(),
            for_training,
            samples = samples.len(),
            "Assembled prompts"
        );
        Ok(samples)
    }
}

/// Join the non-empty sections with a blank line between each.
#[must_use]
pub fn join_sections(sections: &[&str]) -> String {
    sections
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgquest_core::graph::NodeAttributes;
    use kgquest_core::{EntityKnowledgeRecord, KnowledgeGraph};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use serde_json::json;

    fn registry() -> GraphRegistry {
        let mut g = KnowledgeGraph::new();
        g.add_node("Delilah", NodeAttributes::new("character", "the leader of the Brigmore Witches"));
        g.add_node("Brigmore Manor", NodeAttributes::new("location", "a lair for the city's outlaws"));
        g.add_edge("Delilah", "Brigmore Manor", "present in");
        GraphRegistry::new().with_graph("DH", g)
    }

    fn example() -> QuestExample {
        QuestExample {
            id: ExampleId::Number(3),
            game: "DH".to_string(),
            plots: vec!["Delilah returns.".to_string(), "The manor stirs.".to_string()],
            kbs: vec![
                EntityKnowledgeRecord::new("Delilah", "the leader of the Brigmore Witches", "character")
                    .with_relation("present in", "Brigmore Manor"),
            ],
            quest: json!({"title": "the witch", "tasks": ["find her", "stop her", "report"]})
                .as_object()
                .cloned()
                .expect("object"),
        }
    }

    fn rng() -> StdRng {
        StdRng::seed_from_u64(3)
    }

    #[test]
    fn training_prompt_with_text_kg() {
        let reg = registry();
        let sample = PromptAssembler::new(&reg, TrainType::TextKg, 2)
            .assemble(&example(), true, &mut rng())
            .expect("assemble");
        assert_eq!(
            sample.text,
            "### Background:\nDelilah is a character. Delilah is the leader of the Brigmore Witches. \
             Delilah is present in Brigmore Manor. \n\
             \n\n\
             ### Plots:\nDelilah returns.\nThe manor stirs.\n\n\
             The quest related to the above information is as follows:\n\n\
             ### Quest:\nTitle: The witch\nTasks: \n Find her\n Stop her\n\n\n\
             ### End"
        );
        assert!(sample.output.is_none());
    }

    #[test]
    fn no_kg_omits_background() {
        let reg = registry();
        let sample = PromptAssembler::new(&reg, TrainType::NoKg, 2)
            .assemble(&example(), true, &mut rng())
            .expect("assemble");
        assert!(sample.text.starts_with(PLOTS_HEADER));
        assert!(!sample.text.contains("### Background:"));
        assert!(sample.text.ends_with(END_MARKER));
    }

    #[test]
    fn tree_kg_assembles_without_background() {
        let reg = registry();
        let tree = PromptAssembler::new(&reg, TrainType::TreeKg, 2)
            .assemble(&example(), true, &mut rng())
            .expect("assemble");
        let plain = PromptAssembler::new(&reg, TrainType::NoKg, 2)
            .assemble(&example(), true, &mut rng())
            .expect("assemble");
        assert_eq!(tree, plain);
    }

    #[test]
    fn inference_splits_prompt_and_expected_output() {
        let reg = registry();
        let sample = PromptAssembler::new(&reg, TrainType::TextKg, 2)
            .assemble(&example(), false, &mut rng())
            .expect("assemble");
        assert!(sample.text.starts_with("### Background:\n"));
        assert!(sample.text.ends_with(INSTRUCTION));
        assert!(!sample.text.contains("### Quest:"));
        assert_eq!(
            sample.output.as_deref(),
            Some("### Quest:\nTitle: The witch\nTasks: \n Find her\n Stop her\n\n\n### End")
        );
    }

    #[test]
    fn no_kg_never_needs_a_graph() {
        let empty = GraphRegistry::new();
        let sample = PromptAssembler::new(&empty, TrainType::NoKg, 2)
            .assemble(&example(), true, &mut rng())
            .expect("assemble");
        assert!(sample.text.contains("### Quest:"));
        assert!(
            PromptAssembler::new(&empty, TrainType::TextKg, 2)
                .assemble(&example(), true, &mut rng())
                .is_err()
        );
    }

    #[test]
    fn join_skips_empty_sections() {
        assert_eq!(join_sections(&["", "a", "", "b"]), "a\n\nb");
        assert_eq!(join_sections(&[]), "");
    }

    #[test]
    fn inference_sample_serializes_output_only_when_present() {
        let training = PromptSample {
            id: ExampleId::Number(1),
            text: "t".to_string(),
            output: None,
        };
        assert_eq!(serde_json::to_string(&training).expect("json"), r#"{"id":1,"text":"t"}"#);
    }
}
