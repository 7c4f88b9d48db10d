//! Inference result files.
//!
//! Every run writes two files next to each other: `<stem>.jsonl` with one
//! [`ResultRecord`] per line, and `<stem>.txt` with the same records laid
//! out for reading.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::assembler::PromptSample;
use crate::error::{PromptError, Result};

/// Rule line between records in the text dump.
pub const DUMP_RULE: &str = "==================================================";

/// One generated quest next to the prompt and the reference quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Prompt fed to the model.
    pub input: String,
    /// Model completion.
    pub output_gen: String,
    /// Reference completion from the dataset.
    pub output_actual: String,
}

impl ResultRecord {
    /// Pair an inference sample with the text generated for it.
    #[must_use]
    pub fn from_sample(sample: &PromptSample, generated: impl Into<String>) -> Self {
        Self {
            input: sample.text.clone(),
            output_gen: generated.into(),
            output_actual: sample.output.clone().unwrap_or_default(),
        }
    }

    /// Human-readable block for the text dump, rule line included.
    #[must_use]
    pub fn to_dump(&self) -> String {
        format!(
            "INPUT:\n{}\n\nGENERATED:\n{}\n\nACTUAL:\n{}\n{DUMP_RULE}\n",
            self.input, self.output_gen, self.output_actual
        )
    }
}

/// Writes the `.jsonl` / `.txt` pair for a results stem.
#[derive(Debug)]
pub struct ResultsWriter {
    jsonl: BufWriter<File>,
    txt: BufWriter<File>,
    jsonl_path: PathBuf,
    written: usize,
}

impl ResultsWriter {
    /// Create (truncating) `<stem>.jsonl` and `<stem>.txt`.
    ///
    /// # Errors
    /// Returns an error if either file cannot be created.
    pub fn create(stem: impl AsRef<Path>) -> Result<Self> {
        let stem = stem.as_ref();
        let jsonl_path = stem.with_extension("jsonl");
        let txt_path = stem.with_extension("txt");
        Ok(Self {
            jsonl: BufWriter::new(File::create(&jsonl_path)?),
            txt: BufWriter::new(File::create(&txt_path)?),
            jsonl_path,
            written: 0,
        })
    }

    /// Append one record to both files.
    ///
    /// # Errors
    /// Returns an error on serialization or write failure.
    pub fn write(&mut self, record: &ResultRecord) -> Result<()> {
        serde_json::to_writer(&mut self.jsonl, record)?;
        self.jsonl.write_all(b"\n")?;
        self.txt.write_all(record.to_dump().as_bytes())?;
        self.written += 1;
        Ok(())
    }

    /// Flush both files and return the number of records written.
    ///
    /// # Errors
    /// Returns an error if flushing fails.
    pub fn finish(mut self) -> Result<usize> {
        self.jsonl.flush()?;
        self.txt.flush()?;
        info!(
            path = %self.jsonl_path.display(),
            records = self.written,
            "Wrote inference results"
        );
        Ok(self.written)
    }
}

/// Read a results `.jsonl` file back.
///
/// # Errors
/// Returns an error if the file cannot be read or a line is not a record.
pub fn read_results(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>> {
    let content = std::fs::read_to_string(path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str::<ResultRecord>(line).map_err(PromptError::from))
        .collect()
}

/// Render records as the text dump.
#[must_use]
pub fn render_dump(records: &[ResultRecord]) -> String {
    records.iter().map(ResultRecord::to_dump).collect()
}
