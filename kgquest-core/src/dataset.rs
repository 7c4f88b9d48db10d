//! Line-delimited JSON quest datasets.
//!
//! A dataset directory holds one file per split (`train.jsonl`,
//! `val.jsonl`), one [`QuestExample`] per line. Blank lines are skipped;
//! anything else that fails to deserialize rejects the whole file.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::info;

use crate::error::{KgError, Result};
use crate::types::QuestExample;

/// Dataset partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Split {
    /// Training partition.
    Train,
    /// Validation partition.
    Val,
}

impl Split {
    /// File name of this split inside a dataset directory.
    #[must_use]
    pub fn filename(self) -> &'static str {
        match self {
            Self::Train => "train.jsonl",
            Self::Val => "val.jsonl",
        }
    }

    /// Full path of this split under `dir`.
    #[must_use]
    pub fn path_in(self, dir: &Path) -> PathBuf {
        dir.join(self.filename())
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Train => "train",
            Self::Val => "val",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Split {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "train" => Ok(Self::Train),
            "val" => Ok(Self::Val),
            _ => Err(format!("unknown split: '{s}'")),
        }
    }
}

/// Parse JSONL text into examples.
///
/// # Errors
/// Returns [`KgError::MalformedRecord`] with the 1-based line number of the
/// first record that does not deserialize.
pub fn parse_jsonl(content: &str) -> Result<Vec<QuestExample>> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| KgError::MalformedRecord {
                line: i + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}

/// Load one split from a dataset directory.
///
/// # Errors
/// Returns an error if the split file cannot be read or contains a
/// malformed record.
pub fn load_split(dir: impl AsRef<Path>, split: Split) -> Result<Vec<QuestExample>> {
    let path = split.path_in(dir.as_ref());
    let content = std::fs::read_to_string(&path)?;
    let examples = parse_jsonl(&content)?;
    info!(
        split = %split,
        path = %path.display(),
        examples = examples.len(),
        "Loaded dataset split"
    );
    Ok(examples)
}
