//! Dataset-level operations behind the CLI subcommands.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{info, warn};

use kgquest_core::dataset::{self, Split};
use kgquest_core::{GraphRegistry, KgQuestConfig};
use kgquest_prompt::length::{self, WhitespaceCounter};
use kgquest_prompt::{PromptAssembler, results};

/// Random source for relation sampling: seeded when configured.
pub fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Load the graph registry when the prompt mode needs one.
pub fn load_registry(config: &KgQuestConfig) -> Result<GraphRegistry> {
    if !config.kg.train_type.uses_text_background() {
        info!(mode = %config.kg.train_type, "Prompt mode uses no graph; skipping registry");
        return Ok(GraphRegistry::new());
    }
    load_graphs(config)
}

/// Load every graph in the configured directory.
pub fn load_graphs(config: &KgQuestConfig) -> Result<GraphRegistry> {
    let dir = &config.data.graph_dir;
    let registry = GraphRegistry::load_dir(dir)
        .with_context(|| format!("loading graphs from {}", dir.display()))?;
    if registry.is_empty() {
        warn!(dir = %dir.display(), "No .graphml files found");
    }
    Ok(registry)
}

/// Assemble every example of a split and write the samples as JSONL.
///
/// Returns the number of samples written.
pub fn write_prompts(
    config: &KgQuestConfig,
    registry: &GraphRegistry,
    split: Split,
    for_training: bool,
    out: &Path,
    rng: &mut StdRng,
) -> Result<usize> {
    let examples = dataset::load_split(&config.data.dataset_dir, split)
        .with_context(|| format!("loading {split} split"))?;
    let assembler = PromptAssembler::new(registry, config.kg.train_type, config.kg.depth);
    let mut samples = assembler.assemble_all(&examples, for_training, rng)?;

    // Word count stands in for tokenizer length here.
    if let Some(max_len) = config.data.max_prompt_tokens {
        length::retain_within(&mut samples, &WhitespaceCounter, max_len);
    }

    let mut writer = BufWriter::new(
        File::create(out).with_context(|| format!("creating {}", out.display()))?,
    );
    for sample in &samples {
        serde_json::to_writer(&mut writer, sample)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;

    info!(
        split = %split,
        out = %out.display(),
        samples = samples.len(),
        "Wrote prompt samples"
    );
    Ok(samples.len())
}

/// Compose the background of a single example, looked up by id.
pub fn background_for(
    config: &KgQuestConfig,
    registry: &GraphRegistry,
    split: Split,
    id: &str,
    rng: &mut StdRng,
) -> Result<String> {
    let examples = dataset::load_split(&config.data.dataset_dir, split)
        .with_context(|| format!("loading {split} split"))?;
    let Some(example) = examples.iter().find(|ex| ex.id.to_string() == id) else {
        bail!("no example with id '{id}' in the {split} split");
    };
    let composer = kgquest_core::BackgroundComposer::new(registry, config.kg.depth);
    Ok(composer.compose(example, rng)?)
}

/// Re-render a results JSONL file as its `.txt` dump. Returns the dump path.
pub fn dump_results(results_path: &Path) -> Result<PathBuf> {
    let records = results::read_results(results_path)
        .with_context(|| format!("reading {}", results_path.display()))?;
    let txt_path = results_path.with_extension("txt");
    std::fs::write(&txt_path, results::render_dump(&records))
        .with_context(|| format!("writing {}", txt_path.display()))?;
    info!(
        path = %txt_path.display(),
        records = records.len(),
        "Rendered results dump"
    );
    Ok(txt_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgquest_core::TrainType;
    use kgquest_prompt::{PromptSample, ResultRecord, ResultsWriter};

    const GRAPH: &str = r#"<graphml>
  <key id="d0" for="node" attr.name="type"/>
  <key id="d1" for="node" attr.name="description"/>
  <key id="d2" for="edge" attr.name="label"/>
  <graph>
    <node id="Delilah"><data key="d0">character</data><data key="d1">the leader of the Brigmore Witches</data></node>
    <node id="Brigmore Manor"><data key="d0">location</data><data key="d1">a lair for the city's outlaws</data></node>
    <edge source="Delilah" target="Brigmore Manor"><data key="d2">present in</data></edge>
  </graph>
</graphml>"#;

    const SPLIT: &str = concat!(
        r#"{"id": 1, "game": "DH", "plots": ["Delilah waits in Brigmore Manor."], "kbs": [], "quest": {"title": "the manor", "tasks": ["go", "report"]}}"#,
        "\n",
        r#"{"id": "long", "game": "DH", "plots": ["one two three four five six seven eight nine ten eleven twelve"], "kbs": [], "quest": {"title": "x"}}"#,
        "\n",
    );

    fn setup(mode: TrainType) -> (tempfile::TempDir, KgQuestConfig) {
        let dir = tempfile::tempdir().expect("tempdir");
        let kg = dir.path().join("kg");
        let data = dir.path().join("data");
        std::fs::create_dir_all(&kg).expect("mkdir");
        std::fs::create_dir_all(&data).expect("mkdir");
        std::fs::write(kg.join("DH.graphml"), GRAPH).expect("graph");
        std::fs::write(data.join("train.jsonl"), SPLIT).expect("train");
        std::fs::write(data.join("val.jsonl"), SPLIT).expect("val");

        let mut config = KgQuestConfig::default();
        config.kg.train_type = mode;
        config.data.graph_dir = kg;
        config.data.dataset_dir = data;
        (dir, config)
    }

    fn read_samples(path: &Path) -> Vec<PromptSample> {
        std::fs::read_to_string(path)
            .expect("read")
            .lines()
            .map(|l| serde_json::from_str(l).expect("sample"))
            .collect()
    }

    #[test]
    fn training_prompts_are_written_as_jsonl() {
        let (dir, config) = setup(TrainType::TextKg);
        let registry = load_registry(&config).expect("registry");
        let out = dir.path().join("train_prompts.jsonl");

        let n = write_prompts(&config, &registry, Split::Train, true, &out, &mut make_rng(Some(1)))
            .expect("write");
        assert_eq!(n, 2);
        let samples = read_samples(&out);
        assert!(samples[0].text.starts_with("### Background:\n"));
        assert!(samples[0].text.contains("Delilah is present in Brigmore Manor. "));
        assert!(samples[0].text.ends_with("### End"));
        assert!(samples.iter().all(|s| s.output.is_none()));
    }

    #[test]
    fn inference_prompts_carry_expected_output() {
        let (dir, config) = setup(TrainType::NoKg);
        let registry = load_registry(&config).expect("registry");
        assert!(registry.is_empty());
        let out = dir.path().join("val_prompts.jsonl");

        write_prompts(&config, &registry, Split::Val, false, &out, &mut make_rng(Some(1)))
            .expect("write");
        let samples = read_samples(&out);
        assert_eq!(
            samples[0].output.as_deref(),
            Some("### Quest:\nTitle: The manor\nTasks: \n Go\n\n\n### End")
        );
    }

    #[test]
    fn over_length_prompts_are_filtered() {
        let (dir, mut config) = setup(TrainType::NoKg);
        config.data.max_prompt_tokens = Some(28);
        let out = dir.path().join("filtered.jsonl");

        let n = write_prompts(&config, &GraphRegistry::new(), Split::Train, true, &out, &mut make_rng(None))
            .expect("write");
        assert_eq!(n, 1);
        assert_eq!(read_samples(&out)[0].id.to_string(), "1");
    }

    #[test]
    fn prompt_limit_counts_words() {
        // The first sample's training text is 26 words and far more characters.
        let (dir, mut config) = setup(TrainType::NoKg);
        let out = dir.path().join("limit.jsonl");
        let registry = GraphRegistry::new();

        config.data.max_prompt_tokens = Some(27);
        let kept = write_prompts(&config, &registry, Split::Train, true, &out, &mut make_rng(None))
            .expect("write");
        assert_eq!(kept, 1);

        config.data.max_prompt_tokens = Some(26);
        let kept = write_prompts(&config, &registry, Split::Train, true, &out, &mut make_rng(None))
            .expect("write");
        assert_eq!(kept, 0);
    }

    #[test]
    fn background_lookup_by_id() {
        let (_dir, config) = setup(TrainType::TextKg);
        let registry = load_registry(&config).expect("registry");
        let text = background_for(&config, &registry, Split::Train, "1", &mut make_rng(Some(5)))
            .expect("background");
        assert!(text.contains("Brigmore Manor is a location. "));

        let err = background_for(&config, &registry, Split::Train, "404", &mut make_rng(Some(5)))
            .expect_err("missing id");
        assert!(err.to_string().contains("404"));
    }

    #[test]
    fn dump_rerenders_results() {
        let dir = tempfile::tempdir().expect("tempdir");
        let stem = dir.path().join("results");
        let mut writer = ResultsWriter::create(&stem).expect("create");
        writer
            .write(&ResultRecord {
                input: "in".to_string(),
                output_gen: "gen".to_string(),
                output_actual: "ref".to_string(),
            })
            .expect("write");
        writer.finish().expect("finish");
        std::fs::remove_file(stem.with_extension("txt")).expect("rm");

        let txt = dump_results(&stem.with_extension("jsonl")).expect("dump");
        let content = std::fs::read_to_string(txt).expect("read");
        assert!(content.starts_with("INPUT:\nin\n\nGENERATED:\ngen\n\nACTUAL:\nref\n"));
    }
}
