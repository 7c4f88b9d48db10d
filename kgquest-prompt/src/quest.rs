//! Quest block rendering.
//!
//! Quest records are free-form maps, but only three kinds of field exist as
//! far as the prompt is concerned; [`QuestField`] makes that explicit.

use serde_json::{Map, Value};

use crate::error::{PromptError, Result};

/// Header of the quest block.
pub const QUEST_HEADER: &str = "### Quest:\n";

const DESCRIPTION_FIELD: &str = "description";
const TASKS_FIELD: &str = "tasks";

/// A quest field, classified by how it renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuestField<'a> {
    /// Long-form description. Never rendered.
    Description,
    /// Task list. Every task but the last is rendered.
    Tasks(Vec<&'a str>),
    /// Any other field, rendered as `Name: Value`.
    Scalar {
        /// Field name.
        name: &'a str,
        /// Field value.
        value: &'a str,
    },
}

impl<'a> QuestField<'a> {
    /// Classify one `(name, value)` entry of a quest record.
    ///
    /// # Errors
    /// Returns [`PromptError::MalformedQuest`] if `tasks` is not a list of
    /// strings or any other field is not a string.
    pub fn classify(name: &'a str, value: &'a Value) -> Result<Self> {
        match name {
            DESCRIPTION_FIELD => Ok(Self::Description),
            TASKS_FIELD => {
                let items = value
                    .as_array()
                    .ok_or_else(|| malformed(name, "expected a list of strings"))?;
                let tasks = items
                    .iter()
                    .map(|t| t.as_str().ok_or_else(|| malformed(name, "expected a list of strings")))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Self::Tasks(tasks))
            }
            _ => {
                let value = value
                    .as_str()
                    .ok_or_else(|| malformed(name, "expected a string"))?;
                Ok(Self::Scalar { name, value })
            }
        }
    }

    /// Render this field's lines.
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Description => String::new(),
            Self::Tasks(tasks) => {
                let mut out = String::from("Tasks: \n");
                // The last task is never shown.
                let shown = tasks.len().saturating_sub(1);
                for task in &tasks[..shown] {
                    out.push(' ');
                    out.push_str(&capitalize(task));
                    out.push('\n');
                }
                out
            }
            Self::Scalar { name, value } => {
                format!("{}: {}\n", capitalize(name), capitalize(value))
            }
        }
    }
}

fn malformed(field: &str, reason: &str) -> PromptError {
    PromptError::MalformedQuest {
        field: field.to_string(),
        reason: reason.to_string(),
    }
}

/// Render the fields of a quest record in their stored order, without the
/// header.
///
/// # Errors
/// Returns [`PromptError::MalformedQuest`] for a field of the wrong shape.
pub fn render_fields(quest: &Map<String, Value>) -> Result<String> {
    let mut out = String::new();
    for (name, value) in quest {
        out.push_str(&QuestField::classify(name, value)?.render());
    }
    Ok(out)
}

/// Render the full quest block, header included.
///
/// # Errors
/// Returns [`PromptError::MalformedQuest`] for a field of the wrong shape.
pub fn render_quest(quest: &Map<String, Value>) -> Result<String> {
    Ok(format!("{QUEST_HEADER}{}", render_fields(quest)?))
}

/// Upper-case the first character and lower-case the rest.
#[must_use]
pub fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
