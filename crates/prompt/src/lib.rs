//! Prompt system for the grounded answering service.
//!
//! - A built-in grounded answer prompt with abstention rules
//! - YAML overrides loaded from the workspace
//! - Handlebars rendering of the first attempt and the length retry

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::{build_answer_prompt, build_retry_prompt};
pub use loader::{load_answer_prompt, load_prompt};
pub use types::{BuiltPrompt, PromptDefinition, ANSWER_PROMPT_ID};
