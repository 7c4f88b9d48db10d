//! Prompt-length filtering.
//!
//! Real token counts come from the model's tokenizer, which lives outside
//! this crate. [`TokenCounter`] is the seam; [`WhitespaceCounter`] is a
//! rough stand-in for tooling and tests.

use tracing::info;

use crate::assembler::PromptSample;

/// Counts tokens in a prompt.
pub trait TokenCounter {
    /// Number of tokens `text` encodes to.
    fn count(&self, text: &str) -> usize;
}

/// Counts whitespace-separated words.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhitespaceCounter;

impl TokenCounter for WhitespaceCounter {
    fn count(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }
}

impl<F> TokenCounter for F
where
    F: Fn(&str) -> usize,
{
    fn count(&self, text: &str) -> usize {
        self(text)
    }
}

/// Keep only samples whose prompt `text` is shorter than `max_len` tokens.
///
/// Returns the number of samples dropped.
pub fn retain_within<C: TokenCounter + ?Sized>(
    samples: &mut Vec<PromptSample>,
    counter: &C,
    max_len: usize,
) -> usize {
    let before = samples.len();
    samples.retain(|s| counter.count(&s.text) < max_len);
    let dropped = before - samples.len();
    if dropped > 0 {
        info!(dropped, kept = samples.len(), max_len, "Filtered over-length prompts");
    }
    dropped
}
