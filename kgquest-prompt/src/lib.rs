//! # kgquest-prompt: Prompt Assembly for KGQuest
//!
//! Turns a [`kgquest_core::QuestExample`] into the text a tokenizer sees:
//!
//! ```text
//! ### Background:        (text_kg only)
//! <composed facts>
//!
//! ### Plots:
//! <plot points>
//!
//! The quest related to the above information is as follows:
//!
//! ### Quest:             (training prompt, or inference `output`)
//! <quest fields>
//!
//! ### End
//! ```
//!
//! Tokenization, training and generation are external; this crate stops at
//! text. It also provides the length-filter seam and the writer for
//! inference results.

pub mod assembler;
pub mod error;
pub mod length;
pub mod quest;
pub mod results;

pub use assembler::{PromptAssembler, PromptSample};
pub use error::PromptError;
pub use length::{TokenCounter, WhitespaceCounter};
pub use results::{ResultRecord, ResultsWriter};
